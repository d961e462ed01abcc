use crate::error::VolleyError;
use crate::lifecycle::{self, StateCell};
use crate::types::LauncherId;
use serde::Serialize;
use std::collections::BTreeSet;
use std::thread::JoinHandle;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Launcher
// ---------------------------------------------------------------------------

/// One registered launcher and its background control thread. The thread
/// runs the polling lifecycle loop and owns the liveness signal; the fleet
/// only ever requests transitions.
#[derive(Debug)]
pub struct Launcher {
    pub id: LauncherId,
    state: StateCell,
    handle: Option<JoinHandle<()>>,
}

impl Launcher {
    fn spawn(id: LauncherId, tick: Duration) -> Self {
        let state = StateCell::new();
        let thread_state = state.clone();
        let handle = std::thread::spawn(move || lifecycle::run_loop(&thread_state, tick, || {}));
        state.start();
        Self {
            id,
            state,
            handle: Some(handle),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    fn shutdown(&mut self) {
        self.state.kill();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

// ---------------------------------------------------------------------------
// FleetSnapshot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct LauncherInfo {
    pub id: LauncherId,
    pub alive: bool,
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FleetSnapshot {
    pub launchers: Vec<LauncherInfo>,
}

// ---------------------------------------------------------------------------
// Fleet
// ---------------------------------------------------------------------------

/// The ordered collection of known launchers and the enabled set. Ids are
/// sequential in registration order and stable for the process lifetime;
/// there is no hot-unplug handling.
#[derive(Debug)]
pub struct Fleet {
    launchers: Vec<Launcher>,
    enabled: BTreeSet<LauncherId>,
    tick: Duration,
}

impl Fleet {
    pub fn new(tick: Duration) -> Self {
        Self {
            launchers: Vec::new(),
            enabled: BTreeSet::new(),
            tick,
        }
    }

    /// Register the next launcher, assigning the next sequential id and
    /// starting its control thread.
    pub fn register(&mut self) -> LauncherId {
        let id = LauncherId(self.launchers.len() as u32);
        self.launchers.push(Launcher::spawn(id, self.tick));
        tracing::info!(launcher = id.0, "registered launcher");
        id
    }

    /// Register every discovered device, logging a `DeviceNotFound` per
    /// slot that discovery came up short on. The process continues with
    /// fewer launchers.
    pub fn register_discovered(&mut self, found: usize, expected: usize) {
        for _ in 0..found {
            self.register();
        }
        for slot in found..expected {
            tracing::warn!(slot, "{}", VolleyError::DeviceNotFound(slot));
        }
        tracing::info!("{found} device(s) detected");
    }

    pub fn len(&self) -> usize {
        self.launchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.launchers.is_empty()
    }

    pub fn contains(&self, id: LauncherId) -> bool {
        id.index() < self.launchers.len()
    }

    /// Idempotent. Enabling an unknown id is refused.
    pub fn enable(&mut self, id: LauncherId) -> crate::error::Result<()> {
        if !self.contains(id) {
            return Err(VolleyError::LauncherNotFound(id.0));
        }
        if self.enabled.insert(id) {
            tracing::info!(launcher = id.0, "enabled launcher");
        }
        Ok(())
    }

    /// Idempotent; disabling an id that is not enabled is a no-op.
    pub fn disable(&mut self, id: LauncherId) {
        if self.enabled.remove(&id) {
            tracing::info!(launcher = id.0, "disabled launcher");
        }
    }

    pub fn is_enabled(&self, id: LauncherId) -> bool {
        self.enabled.contains(&id)
    }

    /// Enabled ids in registration order.
    pub fn enabled_members(&self) -> Vec<LauncherId> {
        self.launchers
            .iter()
            .map(|l| l.id)
            .filter(|id| self.enabled.contains(id))
            .collect()
    }

    pub fn snapshot(&self) -> FleetSnapshot {
        FleetSnapshot {
            launchers: self
                .launchers
                .iter()
                .map(|l| LauncherInfo {
                    id: l.id,
                    alive: l.is_alive(),
                    enabled: self.enabled.contains(&l.id),
                })
                .collect(),
        }
    }

    /// Request `Dying` on every control thread and join them.
    pub fn shutdown(&mut self) {
        for launcher in &mut self.launchers {
            launcher.shutdown();
        }
    }
}

impl Drop for Fleet {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
