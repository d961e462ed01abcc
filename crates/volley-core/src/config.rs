use crate::error::{Result, VolleyError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Tunables shared by the console and the daemons. Loaded from
/// `<root>/volley.yaml`; every field has a default so a missing file or a
/// partial file both work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Minimum seconds between the start of one fire batch and the next.
    #[serde(default = "default_cooldown")]
    pub cooldown_seconds: u32,

    /// Delay before reading the sensor log, letting the sensor daemon flush
    /// pending writes.
    #[serde(default = "default_settle")]
    pub settle_seconds: u32,

    /// Sensor events older than this at read time are ignored.
    #[serde(default = "default_recent_window")]
    pub recent_window_seconds: u32,

    /// Poll cadence of the light daemon.
    #[serde(default = "default_light_poll")]
    pub light_poll_ms: u64,

    /// Tick of the per-launcher control threads' lifecycle loop.
    #[serde(default = "default_tick")]
    pub tick_ms: u64,

    /// How many launcher devices discovery should find. Finding fewer is
    /// logged per missing slot, not fatal.
    #[serde(default = "default_expected_launchers")]
    pub expected_launchers: usize,

    /// Upper bound accepted for a directional move duration.
    #[serde(default = "default_max_move")]
    pub max_move_ms: u64,

    /// Move duration used when the console command gives none.
    #[serde(default = "default_move")]
    pub default_move_ms: u64,

    /// Shared store file, relative to the root unless absolute.
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    /// Sensor event log appended by the sensor daemon.
    #[serde(default = "default_sensor_log_path")]
    pub sensor_log_path: PathBuf,
}

fn default_cooldown() -> u32 {
    3
}

fn default_settle() -> u32 {
    2
}

fn default_recent_window() -> u32 {
    10
}

fn default_light_poll() -> u64 {
    2000
}

fn default_tick() -> u64 {
    20
}

fn default_expected_launchers() -> usize {
    2
}

fn default_max_move() -> u64 {
    3000
}

fn default_move() -> u64 {
    20
}

fn default_store_path() -> PathBuf {
    PathBuf::from("volley.store.yaml")
}

fn default_sensor_log_path() -> PathBuf {
    PathBuf::from("logs/sensor.log")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cooldown_seconds: default_cooldown(),
            settle_seconds: default_settle(),
            recent_window_seconds: default_recent_window(),
            light_poll_ms: default_light_poll(),
            tick_ms: default_tick(),
            expected_launchers: default_expected_launchers(),
            max_move_ms: default_max_move(),
            default_move_ms: default_move(),
            store_path: default_store_path(),
            sensor_log_path: default_sensor_log_path(),
        }
    }
}

pub const CONFIG_FILE: &str = "volley.yaml";

impl Config {
    pub fn path(root: &Path) -> PathBuf {
        root.join(CONFIG_FILE)
    }

    /// Load from `<root>/volley.yaml`, falling back to defaults when the
    /// file does not exist.
    pub fn load(root: &Path) -> Result<Self> {
        let path = Self::path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        let config: Config = serde_yaml::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&Self::path(root), data.as_bytes())
    }

    pub fn validate(&self) -> Result<()> {
        if self.recent_window_seconds == 0 {
            return Err(VolleyError::InvalidArgument(
                "recent_window_seconds must be positive".into(),
            ));
        }
        if self.tick_ms == 0 || self.light_poll_ms == 0 {
            return Err(VolleyError::InvalidArgument(
                "poll intervals must be positive".into(),
            ));
        }
        if self.default_move_ms > self.max_move_ms {
            return Err(VolleyError::InvalidArgument(
                "default_move_ms exceeds max_move_ms".into(),
            ));
        }
        Ok(())
    }

    pub fn store_path(&self, root: &Path) -> PathBuf {
        if self.store_path.is_absolute() {
            self.store_path.clone()
        } else {
            root.join(&self.store_path)
        }
    }

    pub fn sensor_log_path(&self, root: &Path) -> PathBuf {
        if self.sensor_log_path.is_absolute() {
            self.sensor_log_path.clone()
        } else {
            root.join(&self.sensor_log_path)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.cooldown_seconds, 3);
        assert_eq!(config.recent_window_seconds, 10);
        assert_eq!(config.tick_ms, 20);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(Config::path(dir.path()), "cooldown_seconds: 30\n").unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.cooldown_seconds, 30);
        assert_eq!(config.settle_seconds, 2);
    }

    #[test]
    fn roundtrip() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.expected_launchers = 4;
        config.save(dir.path()).unwrap();
        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.expected_launchers, 4);
    }

    #[test]
    fn zero_window_rejected() {
        let config = Config {
            recent_window_seconds: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn paths_resolve_relative_to_root() {
        let config = Config::default();
        let root = Path::new("/srv/volley");
        assert_eq!(
            config.store_path(root),
            PathBuf::from("/srv/volley/volley.store.yaml")
        );
        assert_eq!(
            config.sensor_log_path(root),
            PathBuf::from("/srv/volley/logs/sensor.log")
        );
    }
}
