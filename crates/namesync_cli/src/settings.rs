//! Runtime settings assembled from flags and environment variables.

use clap::{ArgAction, Args, ValueEnum};
use namesync_clients::{ClientError, FirewallaConfig, HttpConfig, UnifiConfig};
use namesync_engine::{RunConfig, RunMode, SyncError, Verbosity};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Errors surfaced by the command-line runner.
#[derive(Error, Debug)]
pub enum CliError {
    /// Required settings were not provided.
    #[error("Missing required environment variables: {}", .0.join(", "))]
    MissingSettings(Vec<&'static str>),

    /// The scheduling interval is longer than the daemon can wait.
    #[error("SYNC_INTERVAL_MINUTES must be at most {MAX_INTERVAL_MINUTES}, got {0}")]
    InvalidInterval(u64),

    /// A client rejected its configuration.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// A reconciliation run failed.
    #[error(transparent)]
    Sync(#[from] SyncError),

    /// Output could not be encoded.
    #[error("failed to encode output: {0}")]
    Output(#[from] serde_json::Error),
}

/// Longest accepted interval between scheduled runs: one year.
pub const MAX_INTERVAL_MINUTES: u64 = 365 * 24 * 60;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// JSON on stdout.
    Json,
}

/// Log level accepted by `LOG_LEVEL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogLevel {
    /// Everything, including per-request and per-device detail.
    Debug,
    /// Progress and summary.
    #[default]
    Info,
    /// Warnings and errors only.
    Warn,
    /// Errors only.
    Error,
}

impl LogLevel {
    /// Directive understood by `EnvFilter`.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// Engine report verbosity matching this level.
    pub fn verbosity(self) -> Verbosity {
        match self {
            LogLevel::Debug => Verbosity::Verbose,
            LogLevel::Info => Verbosity::Normal,
            LogLevel::Warn | LogLevel::Error => Verbosity::Quiet,
        }
    }
}

/// Connection and scheduling settings. Every one can come from a flag or
/// its environment variable.
#[derive(Args, Debug, Clone)]
pub struct SettingsArgs {
    /// UniFi Network integration API base URL
    #[arg(long, global = true, env = "UNIFI_HOST")]
    pub unifi_host: Option<String>,

    /// UniFi API key
    #[arg(long, global = true, env = "UNIFI_API_KEY", hide_env_values = true)]
    pub unifi_api_key: Option<String>,

    /// UniFi site UUID
    #[arg(long, global = true, env = "UNIFI_SITE_ID")]
    pub unifi_site_id: Option<String>,

    /// Firewalla MSP API base URL
    #[arg(long, global = true, env = "FIREWALLA_HOST")]
    pub firewalla_host: Option<String>,

    /// Firewalla personal access token
    #[arg(long, global = true, env = "FIREWALLA_API_TOKEN", hide_env_values = true)]
    pub firewalla_api_token: Option<String>,

    /// Restrict Firewalla requests to one box
    #[arg(long, global = true, env = "FIREWALLA_BOX_ID")]
    pub firewalla_box_id: Option<String>,

    /// Minutes between scheduled runs (0 runs once)
    #[arg(long, global = true, env = "SYNC_INTERVAL_MINUTES", default_value_t = 60)]
    pub interval_minutes: u64,

    /// Compute and report changes without applying them
    #[arg(
        long,
        global = true,
        env = "DRY_RUN",
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value = "false",
        default_missing_value = "true",
        value_parser = parse_dry_run
    )]
    pub dry_run: bool,

    /// Log level
    #[arg(
        long,
        global = true,
        env = "LOG_LEVEL",
        value_enum,
        ignore_case = true,
        default_value_t = LogLevel::Info
    )]
    pub log_level: LogLevel,

    /// HTTP request timeout in seconds
    #[arg(long, global = true, env = "HTTP_TIMEOUT_SECS", default_value_t = 30)]
    pub http_timeout_secs: u64,
}

/// Only `true` and `1` enable simulate mode.
fn parse_dry_run(value: &str) -> Result<bool, String> {
    let value = value.trim();
    Ok(value.eq_ignore_ascii_case("true") || value == "1")
}

/// Validated settings for a run.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Master platform connection.
    pub firewalla: FirewallaConfig,
    /// Follower platform connection.
    pub unifi: UnifiConfig,
    /// Minutes between scheduled runs; 0 runs once.
    pub interval_minutes: u64,
    /// Engine configuration.
    pub run: RunConfig,
    /// Effective log level.
    pub log_level: LogLevel,
}

impl Settings {
    /// Builds and validates settings. `verbose` forces debug logging.
    pub fn from_args(args: &SettingsArgs, verbose: bool) -> Result<Self, CliError> {
        let required = [
            ("UNIFI_HOST", &args.unifi_host),
            ("UNIFI_API_KEY", &args.unifi_api_key),
            ("UNIFI_SITE_ID", &args.unifi_site_id),
            ("FIREWALLA_HOST", &args.firewalla_host),
            ("FIREWALLA_API_TOKEN", &args.firewalla_api_token),
        ];
        let missing: Vec<&'static str> = required
            .iter()
            .filter(|(_, value)| value.as_deref().map_or(true, str::is_empty))
            .map(|(key, _)| *key)
            .collect();
        if !missing.is_empty() {
            return Err(CliError::MissingSettings(missing));
        }
        if args.interval_minutes > MAX_INTERVAL_MINUTES {
            return Err(CliError::InvalidInterval(args.interval_minutes));
        }

        let http = HttpConfig::default().with_timeout(Duration::from_secs(args.http_timeout_secs));
        let value = |field: &Option<String>| field.clone().unwrap_or_default();

        let mut firewalla = FirewallaConfig::new(
            value(&args.firewalla_host),
            value(&args.firewalla_api_token),
        )
        .with_http(http.clone());
        if let Some(box_id) = &args.firewalla_box_id {
            firewalla = firewalla.with_box_id(box_id.clone());
        }
        firewalla.validate()?;

        let unifi = UnifiConfig::new(
            value(&args.unifi_host),
            value(&args.unifi_api_key),
            value(&args.unifi_site_id),
        )
        .with_http(http);
        unifi.validate()?;

        let log_level = if verbose {
            LogLevel::Debug
        } else {
            args.log_level
        };

        Ok(Self {
            firewalla,
            unifi,
            interval_minutes: args.interval_minutes,
            run: RunConfig::new(RunMode::from_dry_run(args.dry_run))
                .with_verbosity(log_level.verbosity()),
            log_level,
        })
    }

    /// Time between scheduled runs, or `None` to run once.
    pub fn interval(&self) -> Option<Duration> {
        (self.interval_minutes > 0)
            .then(|| Duration::from_secs(self.interval_minutes.saturating_mul(60)))
    }

    /// Logs the effective configuration, without secrets.
    pub fn log_startup(&self) {
        info!("Firewalla-UniFi Network Sync starting...");
        info!("Firewalla host: {}", self.firewalla.host);
        if let Some(box_id) = &self.firewalla.box_id {
            info!("Firewalla box: {box_id}");
        }
        info!("UniFi host: {}", self.unifi.host);
        info!("UniFi site ID: {}", self.unifi.site_id);
        info!("Sync interval: {} minutes", self.interval_minutes);
        info!("Dry run: {}", self.run.mode.is_simulate());
    }
}
