use anyhow::{bail, Context};
use std::path::Path;
use volley_core::config::Config;
use volley_core::store::Store;

/// One-shot light toggle. Writes and flushes immediately so the light
/// daemon picks the change up on its next poll.
pub fn run(root: &Path, state: &str) -> anyhow::Result<()> {
    let on = match state {
        "on" => true,
        "off" => false,
        other => bail!("invalid light state '{other}': use on|off"),
    };

    let config = Config::load(root).context("failed to load config")?;
    let mut store =
        Store::open(&config.store_path(root)).context("failed to open the shared store")?;
    store.set_light(on);
    store.flush().context("failed to flush store")?;

    println!("Light is turned {state}");
    Ok(())
}
