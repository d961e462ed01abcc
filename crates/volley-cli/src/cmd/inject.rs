use anyhow::Context;
use chrono::Utc;
use std::path::Path;
use volley_core::config::Config;
use volley_core::eventlog;

/// Append a line to the sensor event log, timestamped now. This is the
/// debug-side counterpart of the sensor daemon's writer, used to exercise
/// correlation without the physical rig.
pub fn run(root: &Path, message: &str) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let path = config.sensor_log_path(root);
    eventlog::append_event(&path, "volley-cli", "INFO", message, Utc::now())
        .context("failed to append event")?;
    println!("Appended to {}", path.display());
    Ok(())
}
