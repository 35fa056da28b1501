mod app;
mod config;
mod error;
mod exec;
mod logging;
mod panel;
mod settings;
mod snapshot;
mod supervisor;
mod ui;
mod widgets;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use config::Config;
use settings::{Settings, SharedSettings};
use snapshot::SharedSnapshot;

#[derive(Parser, Debug)]
#[command(name = "harmony_top")]
#[command(about = "A TUI for monitoring a Harmony blockchain node", long_about = None)]
struct Args {
    /// Environment tag: `local`, `ec2`, anything else uses the defaults
    #[arg(long, default_value = "")]
    env: String,

    /// Runtime settings file (TOML), re-read with `r`
    #[arg(long, default_value = "harmony_top.toml")]
    settings: PathBuf,

    /// Directory for the dashboard's own log file
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _logging = logging::init_logging(&args.log_dir)
        .with_context(|| format!("Failed to set up logging in {}", args.log_dir.display()))?;

    let config = Config::select(&args.env);
    info!(
        environment = config.environment.name(),
        log_path = %config.log_path.display(),
        node_binary_path = %config.node_binary_path.display(),
        blockchain_poll = ?config.blockchain_poll_interval,
        system_stats_poll = ?config.system_stats_poll_interval,
        "Starting harmony_top"
    );

    let settings = SharedSettings::from_file(Settings::seeded_from(&config), args.settings);
    // Filled in by the node poller; the dashboard only reads it.
    let snapshot = SharedSnapshot::default();

    // Initialize terminal
    let terminal = ratatui::init();

    let app = app::App::new(config, settings, snapshot);
    let result = app.run(terminal).await;

    // Restore terminal
    ratatui::restore();

    if let Err(e) = &result {
        error!(error = %e, "Dashboard stopped");
    }
    result
}
