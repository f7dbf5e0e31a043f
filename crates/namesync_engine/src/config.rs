//! Configuration for reconciliation runs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Whether updates are pushed to the follower platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Apply updates to the follower platform.
    #[default]
    Live,
    /// Record what would change without contacting the follower.
    Simulate,
}

impl RunMode {
    /// Maps a dry-run flag to a run mode.
    pub fn from_dry_run(dry_run: bool) -> Self {
        if dry_run {
            RunMode::Simulate
        } else {
            RunMode::Live
        }
    }

    /// Returns true for simulate mode.
    pub fn is_simulate(&self) -> bool {
        matches!(self, RunMode::Simulate)
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Live => f.write_str("live"),
            RunMode::Simulate => f.write_str("simulate"),
        }
    }
}

/// How much progress detail a run reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    /// Summary, warnings and errors only.
    Quiet,
    /// Progress lines and each applied change.
    #[default]
    Normal,
    /// Also every planning decision.
    Verbose,
}

impl FromStr for Verbosity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "quiet" => Ok(Verbosity::Quiet),
            "normal" => Ok(Verbosity::Normal),
            "verbose" => Ok(Verbosity::Verbose),
            other => Err(format!("unknown verbosity: {other}")),
        }
    }
}

/// Configuration for a reconciliation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunConfig {
    /// Live or simulated updates.
    pub mode: RunMode,
    /// Report verbosity.
    pub verbosity: Verbosity,
}

impl RunConfig {
    /// Creates a new run configuration.
    pub fn new(mode: RunMode) -> Self {
        Self {
            mode,
            verbosity: Verbosity::default(),
        }
    }

    /// Creates a simulate-mode configuration.
    pub fn simulate() -> Self {
        Self::new(RunMode::Simulate)
    }

    /// Sets the run mode.
    pub fn with_mode(mut self, mode: RunMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the report verbosity.
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }
}
