//! Operator-facing report output.
//!
//! The engine never writes to a global logger for run output. It hands
//! leveled lines to a [`ReportSink`] supplied by the caller.

use parking_lot::RwLock;
use std::fmt;

/// Severity of a report line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReportLevel {
    /// Planning detail.
    Debug,
    /// Progress and summary.
    Info,
    /// Something the operator should look at.
    Warn,
    /// A failed update or run.
    Error,
}

impl fmt::Display for ReportLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ReportLevel::Debug => "DEBUG",
            ReportLevel::Info => "INFO",
            ReportLevel::Warn => "WARN",
            ReportLevel::Error => "ERROR",
        };
        f.write_str(label)
    }
}

/// Destination for run report lines.
pub trait ReportSink: Send + Sync {
    /// Emits one report line.
    fn emit(&self, level: ReportLevel, message: &str);
}

/// Forwards report lines to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ReportSink for TracingSink {
    fn emit(&self, level: ReportLevel, message: &str) {
        match level {
            ReportLevel::Debug => tracing::debug!(target: "namesync::report", "{message}"),
            ReportLevel::Info => tracing::info!(target: "namesync::report", "{message}"),
            ReportLevel::Warn => tracing::warn!(target: "namesync::report", "{message}"),
            ReportLevel::Error => tracing::error!(target: "namesync::report", "{message}"),
        }
    }
}

/// Collects report lines in memory. Useful in tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: RwLock<Vec<(ReportLevel, String)>>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every captured line.
    pub fn lines(&self) -> Vec<(ReportLevel, String)> {
        self.lines.read().clone()
    }

    /// Returns the messages captured at `level`.
    pub fn messages_at(&self, level: ReportLevel) -> Vec<String> {
        self.lines
            .read()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    /// Returns true if any captured line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.read().iter().any(|(_, m)| m.contains(needle))
    }

    /// Discards captured lines.
    pub fn clear(&self) {
        self.lines.write().clear();
    }
}

impl ReportSink for MemorySink {
    fn emit(&self, level: ReportLevel, message: &str) {
        self.lines.write().push((level, message.to_string()));
    }
}
