use crate::output::{print_json, Table};
use anyhow::Context;
use std::path::Path;
use volley_core::config::Config;
use volley_core::store::Store;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let store =
        Store::open(&config.store_path(root)).context("failed to open the shared store")?;

    if json {
        print_json(&store.data.launches)?;
        return Ok(());
    }

    if store.data.launches.is_empty() {
        println!("No launches yet.");
        return Ok(());
    }

    let mut table = Table::new(&["LAUNCHER", "SOURCE", "DATE", "CRASHED"]);
    for l in &store.data.launches {
        table.row(vec![
            l.launcher.to_string(),
            l.source.clone(),
            l.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            l.crashed
                .iter()
                .map(|t| t.to_string())
                .collect::<Vec<_>>()
                .join(" "),
        ]);
    }
    table.print();
    Ok(())
}
