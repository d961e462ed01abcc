use crate::store::{SecureModule, Store};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// SecureSession
// ---------------------------------------------------------------------------

/// Session-scoped view of the secure modules. A private copy of the
/// store's `secure_mods` is taken when the console starts; unlocks mutate
/// only this copy and are discarded at session end. That one-way flow is
/// deliberate: every console restart begins fully locked again, whatever
/// earlier sessions unlocked.
#[derive(Debug, Clone)]
pub struct SecureSession {
    modules: BTreeMap<String, SecureModule>,
}

impl SecureSession {
    pub fn from_store(store: &Store) -> Self {
        Self {
            modules: store.data.secure_mods.clone(),
        }
    }

    /// Present a secret for a module. Returns true and unlocks the working
    /// copy only when both the module exists and the secret matches.
    pub fn unlock(&mut self, name: &str, secret: &str) -> bool {
        match self.modules.get_mut(name) {
            Some(module) if module.secret == secret => {
                module.locked = false;
                tracing::info!(module = name, "secure module unlocked for this session");
                true
            }
            _ => false,
        }
    }

    /// Unknown modules report as locked: a gated action on a module the
    /// store never defined must not run.
    pub fn is_locked(&self, name: &str) -> bool {
        self.modules.get(name).map_or(true, |m| m.locked)
    }

    pub fn modules(&self) -> impl Iterator<Item = (&str, &SecureModule)> {
        self.modules.iter().map(|(k, v)| (k.as_str(), v))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;
    use tempfile::TempDir;

    fn store_with_fire_module(dir: &TempDir) -> Store {
        let mut store = Store::open(&dir.path().join("store.yaml")).unwrap();
        store.data.secure_mods.insert(
            "fire".into(),
            SecureModule {
                locked: true,
                secret: "hunter2".into(),
                description: "arms the fire command".into(),
            },
        );
        store
    }

    #[test]
    fn wrong_secret_stays_locked() {
        let dir = TempDir::new().unwrap();
        let store = store_with_fire_module(&dir);
        let mut session = SecureSession::from_store(&store);

        assert!(!session.unlock("fire", "wrong"));
        assert!(session.is_locked("fire"));
    }

    #[test]
    fn matching_secret_unlocks_session_copy_only() {
        let dir = TempDir::new().unwrap();
        let mut store = store_with_fire_module(&dir);
        store.flush().unwrap();

        let mut session = SecureSession::from_store(&store);
        assert!(session.unlock("fire", "hunter2"));
        assert!(!session.is_locked("fire"));

        // The store on disk is untouched: a fresh session starts locked.
        let reopened = Store::open(store.path()).unwrap();
        assert!(reopened.data.secure_mods["fire"].locked);
        assert!(SecureSession::from_store(&reopened).is_locked("fire"));
    }

    #[test]
    fn unknown_module_is_locked() {
        let dir = TempDir::new().unwrap();
        let store = store_with_fire_module(&dir);
        let mut session = SecureSession::from_store(&store);
        assert!(session.is_locked("launch-codes"));
        assert!(!session.unlock("launch-codes", "anything"));
    }
}
