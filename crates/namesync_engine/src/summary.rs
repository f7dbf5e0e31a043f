//! Per-update outcomes and the run summary.

use crate::matcher::MatchSet;
use crate::report::{ReportLevel, ReportSink};
use serde::Serialize;

/// Placeholder for failed updates that carry no error detail.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Result of one guarded update attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateOutcome {
    /// Whether the update was applied (or would have been, in simulate mode).
    pub success: bool,
    /// Follower record identifier.
    pub follower_id: String,
    /// Follower hardware address as reported.
    pub mac_address: String,
    /// Name before the update.
    pub old_name: Option<String>,
    /// Name the update set.
    pub new_name: String,
    /// Why the update failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl UpdateOutcome {
    /// Records a successful update.
    pub fn succeeded(
        follower_id: impl Into<String>,
        mac_address: impl Into<String>,
        old_name: Option<String>,
        new_name: impl Into<String>,
    ) -> Self {
        Self {
            success: true,
            follower_id: follower_id.into(),
            mac_address: mac_address.into(),
            old_name,
            new_name: new_name.into(),
            error_detail: None,
        }
    }

    /// Turns this outcome into a failure with the given detail.
    pub fn into_failure(mut self, detail: impl Into<String>) -> Self {
        self.success = false;
        self.error_detail = Some(detail.into());
        self
    }
}

/// Counts and errors for one reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Follower records fetched.
    pub total_follower_records: usize,
    /// Followers matched to a master.
    pub matched_count: usize,
    /// Updates that succeeded.
    pub updated_count: usize,
    /// Updates that failed.
    pub failed_count: usize,
    /// Followers without a master.
    pub skipped_count: usize,
    /// One message per failed update.
    pub error_messages: Vec<String>,
}

impl RunSummary {
    /// Aggregates a run's counts from its matches and outcomes.
    pub fn summarize(
        total_follower_records: usize,
        matches: &MatchSet<'_>,
        outcomes: &[UpdateOutcome],
    ) -> Self {
        let matched_count = matches.len();
        let (succeeded, failed): (Vec<&UpdateOutcome>, Vec<&UpdateOutcome>) =
            outcomes.iter().partition(|o| o.success);

        Self {
            total_follower_records,
            matched_count,
            updated_count: succeeded.len(),
            failed_count: failed.len(),
            skipped_count: total_follower_records.saturating_sub(matched_count),
            error_messages: failed
                .iter()
                .map(|o| {
                    o.error_detail
                        .clone()
                        .unwrap_or_else(|| UNKNOWN_ERROR.to_string())
                })
                .collect(),
        }
    }

    /// Returns true if every attempted update succeeded.
    pub fn is_clean(&self) -> bool {
        self.failed_count == 0
    }

    /// Renders the operator report.
    pub fn render(&self, sink: &dyn ReportSink) {
        sink.emit(ReportLevel::Info, "=== Sync Summary ===");
        sink.emit(
            ReportLevel::Info,
            &format!("Total follower devices: {}", self.total_follower_records),
        );
        sink.emit(
            ReportLevel::Info,
            &format!("Matched with master: {}", self.matched_count),
        );
        sink.emit(
            ReportLevel::Info,
            &format!("Successfully updated: {}", self.updated_count),
        );
        sink.emit(
            ReportLevel::Info,
            &format!("Failed updates: {}", self.failed_count),
        );
        sink.emit(
            ReportLevel::Info,
            &format!("Skipped (no match): {}", self.skipped_count),
        );

        if !self.error_messages.is_empty() {
            sink.emit(ReportLevel::Warn, "Errors encountered:");
            for message in &self.error_messages {
                sink.emit(ReportLevel::Warn, &format!("  - {message}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceRecord;
    use crate::matcher::match_devices;
    use crate::report::MemorySink;

    fn outcome(id: &str) -> UpdateOutcome {
        UpdateOutcome::succeeded(id, "aa:bb:cc:dd:ee:ff", Some("Old".into()), "New")
    }

    #[test]
    fn summarizes_counts() {
        let masters = vec![
            DeviceRecord::new("fw1", "aa:bb:cc:dd:ee:ff").with_name("A"),
            DeviceRecord::new("fw2", "11:22:33:44:55:66").with_name("B"),
        ];
        let followers = vec![
            DeviceRecord::new("u1", "aa:bb:cc:dd:ee:ff"),
            DeviceRecord::new("u2", "11:22:33:44:55:66"),
            DeviceRecord::new("u3", "99:88:77:66:55:44"),
        ];
        let matches = match_devices(&masters, &followers);
        let outcomes = vec![
            outcome("u1"),
            outcome("u2").into_failure("UniFi API error: 500"),
        ];

        let summary = RunSummary::summarize(followers.len(), &matches, &outcomes);

        assert_eq!(summary.total_follower_records, 3);
        assert_eq!(summary.matched_count, 2);
        assert_eq!(summary.updated_count, 1);
        assert_eq!(summary.failed_count, 1);
        assert_eq!(summary.skipped_count, 1);
        assert_eq!(summary.error_messages, vec!["UniFi API error: 500"]);
        assert!(!summary.is_clean());
    }

    #[test]
    fn missing_detail_becomes_unknown_error() {
        let mut failed = outcome("u1");
        failed.success = false;

        let summary = RunSummary::summarize(1, &MatchSet::new(), &[failed]);

        assert_eq!(summary.error_messages, vec![UNKNOWN_ERROR]);
    }

    #[test]
    fn renders_report_lines() {
        let summary = RunSummary {
            total_follower_records: 2,
            matched_count: 1,
            updated_count: 0,
            failed_count: 1,
            skipped_count: 1,
            error_messages: vec!["boom".into()],
        };
        let sink = MemorySink::new();

        summary.render(&sink);

        let info = sink.messages_at(ReportLevel::Info);
        assert_eq!(info[0], "=== Sync Summary ===");
        assert!(info.contains(&"Total follower devices: 2".to_string()));
        assert!(info.contains(&"Skipped (no match): 1".to_string()));
        assert_eq!(
            sink.messages_at(ReportLevel::Warn),
            vec!["Errors encountered:", "  - boom"]
        );
    }

    #[test]
    fn clean_summary_has_no_warnings() {
        let summary = RunSummary::summarize(0, &MatchSet::new(), &[]);
        let sink = MemorySink::new();

        summary.render(&sink);

        assert!(summary.is_clean());
        assert!(sink.messages_at(ReportLevel::Warn).is_empty());
    }
}
