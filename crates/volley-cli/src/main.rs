mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "volley",
    about = "Launcher fleet control console — fire, correlate crashes, manage the shared game state",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from volley.yaml)
    #[arg(long, global = true, env = "VOLLEY_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed the config, the shared store and the log directory
    Init,

    /// Enter the interactive control console
    Console,

    /// Show general state, capacity and secure modules
    Status,

    /// List the launch log
    History,

    /// Turn the cavern light on or off
    Light {
        /// "on" or "off"
        state: String,
    },

    /// Append a line to the sensor event log (debug rig for correlation)
    InjectEvent {
        /// Free-text message, e.g. "Building #1 crashed"
        message: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = tracing::Level::WARN;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Console => cmd::console::run(&root),
        Commands::Status => cmd::status::run(&root, cli.json),
        Commands::History => cmd::history::run(&root, cli.json),
        Commands::Light { state } => cmd::light::run(&root, &state),
        Commands::InjectEvent { message } => cmd::inject::run(&root, &message),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
