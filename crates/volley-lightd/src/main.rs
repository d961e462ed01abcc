use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use volley_core::config::Config;
use volley_core::io;
use volley_core::lifecycle::{self, StateCell};
use volley_core::store::Store;
use volley_lightd::{LightController, LogSink};

#[derive(Parser)]
#[command(
    name = "volley-lightd",
    about = "Light control daemon — polls the shared store and drives the cavern light",
    version
)]
struct Cli {
    /// Project root holding volley.yaml and the shared store
    #[arg(long, env = "VOLLEY_ROOT", default_value = ".")]
    root: PathBuf,

    /// Poll interval override in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Write a pid file at startup
    #[arg(long)]
    pid_file: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_target(false)
        .init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(&cli.root).context("failed to load config")?;
    let interval = Duration::from_millis(cli.interval_ms.unwrap_or(config.light_poll_ms));

    // Store open failure is fatal at startup: a daemon that cannot read the
    // store has nothing to drive.
    let store = Store::open(&config.store_path(&cli.root))
        .context("failed to open the shared store")?;

    if let Some(pid_file) = &cli.pid_file {
        io::write_pid_file(pid_file).context("failed to write pid file")?;
    }

    let mut controller = LightController::new(store, LogSink::default());
    let state = StateCell::new();

    // Ctrl-c requests `Dying`; the poll loop observes it on its next tick
    // and exits through the lifecycle rather than being torn down mid-poll.
    let watcher = state.clone();
    ctrlc::set_handler(move || {
        tracing::info!("shutdown requested");
        watcher.kill();
    })
    .context("failed to install shutdown handler")?;

    state.start();
    tracing::info!(interval_ms = interval.as_millis() as u64, "light daemon running");
    lifecycle::run_loop(&state, interval, || controller.poll());
    tracing::info!("light daemon stopped");
    Ok(())
}
