//! Check-config command implementation.

use crate::settings::{CliError, OutputFormat, Settings};
use serde::Serialize;

const REDACTED: &str = "<redacted>";

/// Effective configuration with secrets redacted.
#[derive(Debug, Serialize)]
pub struct ConfigView<'a> {
    /// Firewalla base URL.
    pub firewalla_host: &'a str,
    /// Always redacted.
    pub firewalla_api_token: &'static str,
    /// Box scope, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firewalla_box_id: Option<&'a str>,
    /// UniFi base URL.
    pub unifi_host: &'a str,
    /// Always redacted.
    pub unifi_api_key: &'static str,
    /// UniFi site UUID.
    pub unifi_site_id: &'a str,
    /// Minutes between scheduled runs.
    pub sync_interval_minutes: u64,
    /// Whether runs only simulate.
    pub dry_run: bool,
    /// Effective log level.
    pub log_level: &'static str,
    /// HTTP timeout in seconds.
    pub http_timeout_secs: u64,
}

impl<'a> From<&'a Settings> for ConfigView<'a> {
    fn from(settings: &'a Settings) -> Self {
        Self {
            firewalla_host: &settings.firewalla.host,
            firewalla_api_token: REDACTED,
            firewalla_box_id: settings.firewalla.box_id.as_deref(),
            unifi_host: &settings.unifi.host,
            unifi_api_key: REDACTED,
            unifi_site_id: &settings.unifi.site_id,
            sync_interval_minutes: settings.interval_minutes,
            dry_run: settings.run.mode.is_simulate(),
            log_level: settings.log_level.as_str(),
            http_timeout_secs: settings.unifi.http.timeout.as_secs(),
        }
    }
}

/// Runs the check-config command. Validation already happened while the
/// settings were built.
pub fn run(settings: &Settings, format: OutputFormat) -> Result<(), CliError> {
    let view = ConfigView::from(settings);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&view)?),
        OutputFormat::Text => print_text(&view),
    }

    Ok(())
}

fn print_text(view: &ConfigView<'_>) {
    println!("Configuration OK");
    println!();
    println!("Firewalla:");
    println!("  Host:      {}", view.firewalla_host);
    println!("  API token: {}", view.firewalla_api_token);
    println!("  Box:       {}", view.firewalla_box_id.unwrap_or("(all)"));
    println!();
    println!("UniFi:");
    println!("  Host:      {}", view.unifi_host);
    println!("  API key:   {}", view.unifi_api_key);
    println!("  Site ID:   {}", view.unifi_site_id);
    println!();
    println!("Sync:");
    if view.sync_interval_minutes == 0 {
        println!("  Interval:  run once");
    } else {
        println!("  Interval:  {} minutes", view.sync_interval_minutes);
    }
    println!("  Dry run:   {}", view.dry_run);
    println!("  Log level: {}", view.log_level);
    println!("  Timeout:   {}s", view.http_timeout_secs);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::LogLevel;
    use namesync_clients::{FirewallaConfig, UnifiConfig};
    use namesync_engine::RunConfig;

    #[test]
    fn view_redacts_secrets() {
        let settings = Settings {
            firewalla: FirewallaConfig::new("https://fw.example.com", "fw-secret")
                .with_box_id("box-1"),
            unifi: UnifiConfig::new(
                "https://unifi.example.com",
                "unifi-secret",
                "550e8400-e29b-41d4-a716-446655440000",
            ),
            interval_minutes: 15,
            run: RunConfig::simulate(),
            log_level: LogLevel::Warn,
        };

        let json = serde_json::to_string(&ConfigView::from(&settings)).unwrap();

        assert!(!json.contains("fw-secret"));
        assert!(!json.contains("unifi-secret"));
        assert!(json.contains("\"firewalla_box_id\":\"box-1\""));
        assert!(json.contains("\"dry_run\":true"));
        assert!(json.contains("\"log_level\":\"warn\""));
        assert!(json.contains("\"http_timeout_secs\":30"));
    }
}
