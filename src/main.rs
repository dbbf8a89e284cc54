//! Filter Presets - manage filter presets from the command line
//!
//! # Usage
//!
//! ```bash
//! # Build a selection and save it
//! filter-presets filter toggle --tag anime --tag anime --base-model "SDXL*"
//! filter-presets preset create --name "No anime SDXL"
//!
//! # Apply it later, expanding SDXL* against a catalog
//! filter-presets --catalog catalog.json preset apply --name "No anime SDXL"
//! ```

use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use filter_presets::cli::{ConfigArgs, FilterArgs, GlobalArgs, PresetArgs};
use filter_presets::config::Config;
use filter_presets::constants::APP_BINARY_NAME;

/// Filter Presets - save and apply filter selections per context
#[derive(Parser, Debug)]
#[command(name = APP_BINARY_NAME, author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage presets
    Preset(PresetArgs),
    /// Inspect and change the live filter selection
    Filter(FilterArgs),
    /// Manage configuration
    Config(ConfigArgs),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let loaded = Config::load();
    let level = match (&loaded, cli.global.verbose) {
        (_, true) => "debug".to_string(),
        (Ok(config), false) => config.logging.level.clone(),
        (Err(_), false) => "info".to_string(),
    };

    // Logs go to stderr so `--json` output stays machine readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = loaded.unwrap_or_else(|e| {
        warn!(error = %format!("{e:#}"), "failed to load configuration, using defaults");
        Config::default()
    });

    let result = match &cli.command {
        Command::Preset(args) => args.execute(&cli.global, &config).await,
        Command::Filter(args) => args.execute(&cli.global, &config),
        Command::Config(args) => args.execute(&cli.global),
    };

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("Error: {}", e.message);
            }
            std::process::ExitCode::from(e.code as u8)
        }
    }
}
