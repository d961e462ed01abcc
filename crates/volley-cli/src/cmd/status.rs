use crate::output::{print_json, Table};
use anyhow::Context;
use chrono::Utc;
use std::path::Path;
use volley_core::config::Config;
use volley_core::readiness;
use volley_core::store::Store;
use volley_core::types::LauncherId;

/// One-shot status view over the shared store. Reads only: this command
/// may run while the console process owns the writer role.
pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let store =
        Store::open(&config.store_path(root)).context("failed to open the shared store")?;

    let time_left = readiness::time_left(
        Utc::now(),
        store.last_launch().map(|l| l.timestamp),
        config.cooldown_seconds,
    );

    if json {
        print_json(&serde_json::json!({
            "missiles_left": store.total_remaining(),
            "remaining_per_launcher": store.data.remaining_missiles,
            "launches": store.data.launches.len(),
            "time_left_seconds": time_left,
            "light_status": store.data.light_status,
            "buildings_crashed": store
                .data
                .buildings
                .values()
                .filter(|b| b.crashed)
                .count(),
        }))?;
        return Ok(());
    }

    println!("Missiles left:   {}", store.total_remaining());
    println!("Launches so far: {}", store.data.launches.len());
    println!("Time to ready:   {time_left}s");
    println!("Light is on?:    {}", store.data.light_status);
    println!();

    let mut capacity = Table::new(&["LAUNCHER", "MISSILES"]);
    for (i, left) in store.data.remaining_missiles.iter().enumerate() {
        capacity.row(vec![LauncherId(i as u32).to_string(), left.to_string()]);
    }
    capacity.print();
    println!();

    let mut modules = Table::new(&["MODULE", "STATE", "DESCRIPTION"]);
    for (name, m) in &store.data.secure_mods {
        modules.row(vec![
            name.clone(),
            if m.locked { "locked" } else { "unlocked" }.to_string(),
            m.description.clone(),
        ]);
    }
    modules.print();
    Ok(())
}
