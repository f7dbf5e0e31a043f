//! namesync CLI
//!
//! Pushes device names from Firewalla (the authoritative platform) to
//! UniFi Network.
//!
//! # Commands
//!
//! - `sync` - Run one reconciliation pass
//! - `daemon` - Run now, then on a fixed interval until interrupted
//! - `check-config` - Validate configuration and print it with secrets redacted
//! - `version` - Show version information
//!
//! Every setting can be given as a flag or through its environment
//! variable (`UNIFI_HOST`, `FIREWALLA_API_TOKEN`, `DRY_RUN`, ...).

mod commands;
mod settings;

use clap::{Parser, Subcommand};
use settings::{LogLevel, OutputFormat, Settings, SettingsArgs};
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Sync device names from Firewalla to UniFi Network.
#[derive(Parser, Debug)]
#[command(name = "namesync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    settings: SettingsArgs,

    /// Enable verbose output (forces debug logging)
    #[arg(global = true, short, long)]
    verbose: bool,

    /// Output format
    #[arg(global = true, short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one reconciliation pass
    Sync,

    /// Run now, then every SYNC_INTERVAL_MINUTES until Ctrl+C
    Daemon,

    /// Validate configuration and print it with secrets redacted
    CheckConfig,

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Commands::Version = cli.command {
        println!("namesync v{}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        cli.settings.log_level
    };
    init_logging(level);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Fatal error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), settings::CliError> {
    let settings = Settings::from_args(&cli.settings, cli.verbose)?;

    match cli.command {
        Commands::Sync => {
            settings.log_startup();
            commands::sync::run(&settings, cli.format).await
        }
        Commands::Daemon => {
            settings.log_startup();
            commands::daemon::run(&settings, cli.format).await
        }
        Commands::CheckConfig => commands::check_config::run(&settings, cli.format),
        Commands::Version => Ok(()),
    }
}

/// Logs go to stderr so JSON output on stdout stays clean.
fn init_logging(level: LogLevel) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level.as_str()))
        .with_writer(std::io::stderr)
        .init();
}
