use crate::error::{Result, VolleyError};
use crate::types::{LauncherId, TargetId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One entry of the append-only launch log. The last entry is the sole
/// input to the readiness gate's cooldown computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchRecord {
    pub launcher: LauncherId,
    /// Where the fire request came from (e.g. the requester's address).
    pub source: String,
    pub timestamp: DateTime<Utc>,
    /// Targets correlated to this launch, possibly empty.
    pub crashed: Vec<TargetId>,
}

/// An abstract objective on the board. `signature` is the exact textual
/// prefix the sensor daemon logs when the building's contact pin closes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Building {
    pub crashed: bool,
    pub flag: String,
    pub signature: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecureModule {
    pub locked: bool,
    pub secret: String,
    #[serde(default)]
    pub description: String,
}

// ---------------------------------------------------------------------------
// StoreData
// ---------------------------------------------------------------------------

/// The durable game state, exactly the keyed layout every process shares.
///
/// Write ownership is by convention, not enforced: the console is the sole
/// steady-state writer of `remaining_missiles`, `launches`, `buildings`,
/// `flags_given` and `light_status`; the light daemon only reads
/// `light_status`; the sensor daemon never touches the store at all.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreData {
    #[serde(default)]
    pub remaining_missiles: Vec<u32>,
    #[serde(default)]
    pub launches: Vec<LaunchRecord>,
    #[serde(default)]
    pub buildings: BTreeMap<TargetId, Building>,
    #[serde(default)]
    pub light_status: bool,
    #[serde(default)]
    pub secure_mods: BTreeMap<String, SecureModule>,
    #[serde(default)]
    pub flags_given: Vec<String>,
    #[serde(default)]
    pub login_flag: Option<String>,
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// A file-backed handle on [`StoreData`]. Every participating process opens
/// its own handle; there is no cross-process mutual exclusion. Writes stay
/// in memory until [`Store::flush`], which rewrites the backing file
/// atomically.
#[derive(Debug)]
pub struct Store {
    path: PathBuf,
    pub data: StoreData,
}

impl Store {
    /// Open the store at `path`. A missing file opens as empty data (the
    /// first flush creates it); an unreadable or unparsable file is
    /// `StoreUnavailable`, fatal to the opening process.
    pub fn open(path: &Path) -> Result<Self> {
        let data = if path.exists() {
            let raw = std::fs::read_to_string(path).map_err(|e| VolleyError::StoreUnavailable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
            serde_yaml::from_str(&raw).map_err(|e| VolleyError::StoreUnavailable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?
        } else {
            StoreData::default()
        };
        Ok(Self {
            path: path.to_path_buf(),
            data,
        })
    }

    /// Force durability of all writes made so far.
    pub fn flush(&self) -> Result<()> {
        let raw = serde_yaml::to_string(&self.data)?;
        crate::io::atomic_write(&self.path, raw.as_bytes())
    }

    /// Re-read the backing file, discarding in-memory state. Reader
    /// processes call this once per poll tick to observe the writer's
    /// latest flush.
    pub fn reload(&mut self) -> Result<()> {
        *self = Self::open(&self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // ---------------------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------------------

    pub fn remaining(&self, id: LauncherId) -> u32 {
        self.data
            .remaining_missiles
            .get(id.index())
            .copied()
            .unwrap_or(0)
    }

    pub fn last_launch(&self) -> Option<&LaunchRecord> {
        self.data.launches.last()
    }

    pub fn total_remaining(&self) -> u32 {
        self.data.remaining_missiles.iter().sum()
    }

    // ---------------------------------------------------------------------------
    // Mutations (console-owned fields)
    // ---------------------------------------------------------------------------

    /// Append a launch record and consume one unit of the launcher's
    /// capacity. Capacity never goes below zero.
    pub fn record_launch(
        &mut self,
        launcher: LauncherId,
        source: &str,
        timestamp: DateTime<Utc>,
        crashed: Vec<TargetId>,
    ) {
        if let Some(left) = self.data.remaining_missiles.get_mut(launcher.index()) {
            *left = left.saturating_sub(1);
        }
        self.data.launches.push(LaunchRecord {
            launcher,
            source: source.to_string(),
            timestamp,
            crashed,
        });
    }

    /// Flag a building as crashed. Returns the flag text the first time the
    /// building transitions to crashed; re-marking an already-crashed
    /// building is a no-op so the reward is never emitted twice.
    pub fn mark_crashed(&mut self, id: TargetId) -> Option<String> {
        let building = self.data.buildings.get_mut(&id)?;
        if building.crashed {
            return None;
        }
        building.crashed = true;
        let flag = building.flag.clone();
        self.data.flags_given.push(flag.clone());
        Some(flag)
    }

    pub fn set_light(&mut self, on: bool) {
        self.data.light_status = on;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
