use crate::config::Config;
use crate::correlate::{Correlator, TargetDescriptor};
use crate::error::Result;
use crate::fleet::{Fleet, FleetSnapshot};
use crate::readiness;
use crate::store::{LaunchRecord, Store};
use crate::transport::{Command, Transport};
use crate::types::{LauncherId, TargetId};
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Fire outcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LauncherStatus {
    /// The launcher fired. `flags` holds the reward for each target newly
    /// crashed by this launch; `matched` may name already-crashed targets
    /// that earn nothing further.
    Fired {
        matched: Vec<TargetId>,
        flags: Vec<String>,
    },
    /// No capacity left; the launcher was not actuated.
    Skipped,
    /// The transport or the crash analysis reported a fault. The action is
    /// treated as attempted with unknown outcome.
    Faulted { message: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct LauncherFireResult {
    pub id: LauncherId,
    #[serde(flatten)]
    pub status: LauncherStatus,
    pub remaining: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FireOutcome {
    /// The readiness gate held the batch back. Nothing was touched.
    Refused { time_left_seconds: i64 },
    Fired { results: Vec<LauncherFireResult> },
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Ties fleet, readiness gate, correlator and store together and drives
/// the fire protocol. Fire requests within a process are strictly
/// sequential: `fire` takes `&mut self`, so two cannot race the gate.
pub struct Orchestrator<T: Transport> {
    pub fleet: Fleet,
    pub store: Store,
    correlator: Correlator,
    transport: T,
    cooldown_seconds: u32,
}

impl<T: Transport> Orchestrator<T> {
    pub fn new(
        fleet: Fleet,
        store: Store,
        correlator: Correlator,
        transport: T,
        cooldown_seconds: u32,
    ) -> Self {
        Self {
            fleet,
            store,
            correlator,
            transport,
            cooldown_seconds,
        }
    }

    /// Open the store, discover and register launchers, and wire the
    /// correlator, all from one config. The usual entry point for the
    /// console process.
    pub fn bootstrap(root: &Path, config: &Config, transport: T) -> Result<Self> {
        let store = Store::open(&config.store_path(root))?;
        let mut fleet = Fleet::new(Duration::from_millis(config.tick_ms));
        fleet.register_discovered(transport.device_count(), config.expected_launchers);
        let correlator = Correlator::new(
            config.sensor_log_path(root),
            config.settle_seconds,
            config.recent_window_seconds,
        );
        Ok(Self::new(
            fleet,
            store,
            correlator,
            transport,
            config.cooldown_seconds,
        ))
    }

    // ---------------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------------

    pub fn time_left(&self) -> i64 {
        readiness::time_left(
            Utc::now(),
            self.store.last_launch().map(|l| l.timestamp),
            self.cooldown_seconds,
        )
    }

    pub fn is_ready(&self) -> bool {
        readiness::is_ready(
            Utc::now(),
            self.store.last_launch().map(|l| l.timestamp),
            self.cooldown_seconds,
        )
    }

    pub fn status(&self) -> FleetSnapshot {
        self.fleet.snapshot()
    }

    pub fn remaining_capacity(&self) -> BTreeMap<LauncherId, u32> {
        (0..self.fleet.len() as u32)
            .map(LauncherId)
            .map(|id| (id, self.store.remaining(id)))
            .collect()
    }

    pub fn launch_history(&self) -> &[LaunchRecord] {
        &self.store.data.launches
    }

    // ---------------------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------------------

    pub fn enable(&mut self, id: LauncherId) -> Result<()> {
        self.fleet.enable(id)
    }

    pub fn disable(&mut self, id: LauncherId) {
        self.fleet.disable(id);
    }

    /// Move every enabled launcher, clamping nothing: the caller validates
    /// durations. Faults are surfaced per call since a move touches only
    /// one device at a time.
    pub fn move_enabled(&self, direction: crate::types::Direction, duration: Duration) -> Result<()> {
        for id in self.fleet.enabled_members() {
            self.transport.send(id, Command::Move(direction, duration))?;
        }
        Ok(())
    }

    /// The fire protocol. One batch over all enabled launchers in
    /// registration order, then a single flush. A flush failure fails the
    /// whole request: the capacity bookkeeping on disk can no longer be
    /// trusted.
    pub fn fire(&mut self, source: &str) -> Result<FireOutcome> {
        if !self.is_ready() {
            let time_left = self.time_left();
            tracing::warn!(time_left, "launchers not ready");
            return Ok(FireOutcome::Refused {
                time_left_seconds: time_left,
            });
        }

        let mut results = Vec::new();
        for id in self.fleet.enabled_members() {
            if self.store.remaining(id) == 0 {
                tracing::info!(launcher = id.0, "skipping launcher with no missiles left");
                results.push(LauncherFireResult {
                    id,
                    status: LauncherStatus::Skipped,
                    remaining: 0,
                });
                continue;
            }

            tracing::info!(launcher = id.0, "firing");
            let fired_at = Utc::now();
            let status = match self.transport.send(id, Command::Fire) {
                Ok(()) => {
                    tracing::info!(launcher = id.0, "analyzing crashes");
                    // The missile already left: a failed log read must not
                    // abort the batch, or capacity bookkeeping drifts from
                    // the hardware.
                    match self.correlator.correlate(&self.candidates()) {
                        Ok(matched) => {
                            let mut flags = Vec::new();
                            for target in &matched {
                                if let Some(flag) = self.store.mark_crashed(*target) {
                                    flags.push(flag);
                                }
                            }
                            LauncherStatus::Fired {
                                matched: matched.into_iter().collect(),
                                flags,
                            }
                        }
                        Err(e) => {
                            tracing::error!(launcher = id.0, error = %e, "crash analysis failed");
                            LauncherStatus::Faulted {
                                message: format!("crash analysis failed: {e}"),
                            }
                        }
                    }
                }
                Err(e) => {
                    // Attempted, outcome unknown: capacity is still
                    // consumed and the launch still logged, but no
                    // correlation happens and the rest of the batch
                    // continues.
                    tracing::error!(launcher = id.0, error = %e, "actuation fault");
                    LauncherStatus::Faulted {
                        message: e.to_string(),
                    }
                }
            };

            let crashed = match &status {
                LauncherStatus::Fired { matched, .. } => matched.clone(),
                _ => Vec::new(),
            };
            self.store.record_launch(id, source, fired_at, crashed);
            results.push(LauncherFireResult {
                id,
                status,
                remaining: self.store.remaining(id),
            });
        }

        self.store.flush()?;
        Ok(FireOutcome::Fired { results })
    }

    /// Every building is a candidate, crashed ones included: re-matching an
    /// already-crashed target still counts as matched, it just earns no
    /// further flag.
    fn candidates(&self) -> Vec<TargetDescriptor> {
        self.store
            .data
            .buildings
            .iter()
            .map(|(id, b)| TargetDescriptor {
                id: *id,
                signature: b.signature.clone(),
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
