use anyhow::Context;
use std::path::Path;
use volley_core::config::Config;
use volley_core::store::{Building, SecureModule, Store};
use volley_core::types::TargetId;

/// Seed `volley.yaml`, the shared store and the sensor log directory.
/// Idempotent: an existing config or store is left untouched so re-running
/// init never wipes game state. Operators edit the seeded flags and the
/// fire secret in the store file before opening the game.
pub fn run(root: &Path) -> anyhow::Result<()> {
    let config_path = Config::path(root);
    let config = if config_path.exists() {
        Config::load(root).context("failed to load existing config")?
    } else {
        let config = Config::default();
        config.save(root).context("failed to write config")?;
        config
    };

    let store_path = config.store_path(root);
    if store_path.exists() {
        println!("Store already present: {}", store_path.display());
    } else {
        let mut store = Store::open(&store_path).context("failed to open store")?;
        seed(&mut store, config.expected_launchers);
        store.flush().context("failed to write store")?;
        println!("Seeded store: {}", store_path.display());
    }

    if let Some(log_dir) = config.sensor_log_path(root).parent() {
        std::fs::create_dir_all(log_dir).context("failed to create log directory")?;
    }

    println!("Initialized volley at {}", root.display());
    println!("Next: volley console");
    Ok(())
}

fn seed(store: &mut Store, launchers: usize) {
    store.data.remaining_missiles = vec![3; launchers];
    store.data.buildings.insert(
        TargetId(0),
        Building {
            crashed: false,
            flag: "FLAG-BUILDING-1-CHANGEME".into(),
            signature: "Building #1 crashed".into(),
        },
    );
    store.data.buildings.insert(
        TargetId(1),
        Building {
            crashed: false,
            flag: "FLAG-BUILDING-2-CHANGEME".into(),
            signature: "Building #2 crashed".into(),
        },
    );
    store.data.secure_mods.insert(
        "fire".into(),
        SecureModule {
            locked: true,
            secret: "CHANGEME".into(),
            description: "Arms the fire command".into(),
        },
    );
    store.data.login_flag = Some("FLAG-CONSOLE-CHANGEME".into());
    store.data.light_status = false;
}
