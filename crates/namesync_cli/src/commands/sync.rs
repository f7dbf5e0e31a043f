//! One-shot sync command.

use crate::settings::{CliError, OutputFormat, Settings};
use namesync_clients::{FirewallaClient, UnifiClient};
use namesync_engine::{ReconcileEngine, RunMode, RunReport, RunSummary, UpdateOutcome};
use serde::Serialize;

/// The engine wired to the real platforms.
pub type Engine = ReconcileEngine<FirewallaClient, UnifiClient>;

/// Run result as printed with `--format json`.
#[derive(Debug, Serialize)]
pub struct RunOutput<'a> {
    /// Live or simulate.
    pub mode: RunMode,
    /// Number of planned updates.
    pub planned: usize,
    /// Duration in milliseconds.
    pub duration_ms: u64,
    /// Aggregated counts.
    pub summary: &'a RunSummary,
    /// Per-update outcomes.
    pub outcomes: &'a [UpdateOutcome],
}

impl<'a> From<&'a RunReport> for RunOutput<'a> {
    fn from(report: &'a RunReport) -> Self {
        Self {
            mode: report.mode,
            planned: report.planned,
            duration_ms: u64::try_from(report.duration.as_millis()).unwrap_or(u64::MAX),
            summary: &report.summary,
            outcomes: &report.outcomes,
        }
    }
}

/// Builds an engine from validated settings.
pub fn build_engine(settings: &Settings) -> Result<Engine, CliError> {
    let master = FirewallaClient::new(&settings.firewalla)?;
    let follower = UnifiClient::new(&settings.unifi)?;
    Ok(ReconcileEngine::new(settings.run.clone(), master, follower))
}

/// Prints a finished run. Text mode relies on the engine's own report
/// lines; JSON mode writes the run to stdout.
pub fn print_report(report: &RunReport, format: OutputFormat) -> Result<(), CliError> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&RunOutput::from(report))?);
    }
    Ok(())
}

/// Runs the sync command.
pub async fn run(settings: &Settings, format: OutputFormat) -> Result<(), CliError> {
    let engine = build_engine(settings)?;
    let report = engine.run().await?;
    print_report(&report, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use namesync_engine::{DeviceRecord, MockFollowerTarget, MockMasterSource, RunConfig};

    #[tokio::test]
    async fn json_output_shape() {
        let master = MockMasterSource::new(vec![
            DeviceRecord::new("fw1", "aa:bb:cc:dd:ee:01").with_name("Living Room TV")
        ]);
        let follower = MockFollowerTarget::new(vec![
            DeviceRecord::new("u1", "AA:BB:CC:DD:EE:01").with_name("Old TV Name")
        ]);
        let report = ReconcileEngine::new(RunConfig::simulate(), master, follower)
            .run()
            .await
            .unwrap();

        let value = serde_json::to_value(RunOutput::from(&report)).unwrap();

        assert_eq!(value["mode"], "simulate");
        assert_eq!(value["planned"], 1);
        assert_eq!(value["summary"]["updated_count"], 1);
        assert_eq!(value["outcomes"][0]["follower_id"], "u1");
        assert_eq!(value["outcomes"][0]["new_name"], "Living Room TV");
    }
}
