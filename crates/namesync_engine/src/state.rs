//! Reconciliation run state machine.

use crate::config::{RunConfig, RunMode, Verbosity};
use crate::error::{SyncError, SyncResult};
use crate::guard::{check_changes, FieldChanges};
use crate::matcher::match_devices;
use crate::planner::{plan_updates, PlannedUpdate};
use crate::platform::{FollowerTarget, MasterSource};
use crate::report::{ReportLevel, ReportSink, TracingSink};
use crate::summary::{RunSummary, UpdateOutcome};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// The stage a reconciliation run is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// No run has started yet.
    Idle,
    /// Fetching both inventories.
    Fetching,
    /// Joining the inventories on MAC address.
    Matching,
    /// Deciding which followers need a new name.
    Planning,
    /// Guarding and applying each planned update.
    Applying,
    /// Building and rendering the summary.
    Summarizing,
    /// The last run completed.
    Done,
    /// The last run failed while fetching.
    Failed,
    /// The last run was cancelled between stages.
    Cancelled,
}

impl RunState {
    /// Returns true while a run is in progress.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            RunState::Fetching
                | RunState::Matching
                | RunState::Planning
                | RunState::Applying
                | RunState::Summarizing
        )
    }

    /// Returns true if a new run may start.
    pub fn can_start_run(&self) -> bool {
        !self.is_active()
    }
}

/// Everything a completed run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Mode the run executed in.
    pub mode: RunMode,
    /// Number of updates the planner proposed.
    pub planned: usize,
    /// One outcome per planned update, in plan order.
    pub outcomes: Vec<UpdateOutcome>,
    /// Aggregated counts.
    pub summary: RunSummary,
    /// Wall-clock duration of the run.
    pub duration: Duration,
}

/// Pushes master display names onto the follower platform.
///
/// Each call to [`ReconcileEngine::run`] is independent: both inventories
/// are fetched fresh and nothing carries over to the next run.
pub struct ReconcileEngine<M: MasterSource, F: FollowerTarget> {
    config: RunConfig,
    master: Arc<M>,
    follower: Arc<F>,
    sink: Arc<dyn ReportSink>,
    state: RwLock<RunState>,
    cancelled: AtomicBool,
}

impl<M: MasterSource, F: FollowerTarget> ReconcileEngine<M, F> {
    /// Creates an engine that reports through `tracing`.
    pub fn new(config: RunConfig, master: M, follower: F) -> Self {
        Self::with_shared(config, Arc::new(master), Arc::new(follower))
    }

    /// Creates an engine over platform clients that are shared elsewhere.
    pub fn with_shared(config: RunConfig, master: Arc<M>, follower: Arc<F>) -> Self {
        Self {
            config,
            master,
            follower,
            sink: Arc::new(TracingSink),
            state: RwLock::new(RunState::Idle),
            cancelled: AtomicBool::new(false),
        }
    }

    /// Replaces the report sink.
    pub fn with_sink(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Returns the run configuration.
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Gets the current state.
    pub fn state(&self) -> RunState {
        *self.state.read()
    }

    /// Requests cancellation. The current run stops at the next stage
    /// boundary before applying; an applying stage already under way
    /// finishes and is summarized.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Clears a previous cancellation request.
    pub fn reset_cancel(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }

    /// Returns true if cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn set_state(&self, state: RunState) {
        *self.state.write() = state;
    }

    /// Moves to `next` unless cancellation was requested.
    fn advance(&self, next: RunState) -> SyncResult<()> {
        if self.is_cancelled() {
            return Err(self.abort_cancelled());
        }
        self.set_state(next);
        Ok(())
    }

    /// Enters `Fetching`, refusing to overlap a run already in progress.
    fn begin(&self) -> SyncResult<()> {
        {
            let mut state = self.state.write();
            if !state.can_start_run() {
                return Err(SyncError::InvalidStateTransition {
                    from: format!("{:?}", *state),
                    to: format!("{:?}", RunState::Fetching),
                });
            }
            if !self.is_cancelled() {
                *state = RunState::Fetching;
                return Ok(());
            }
        }
        Err(self.abort_cancelled())
    }

    fn abort_cancelled(&self) -> SyncError {
        self.set_state(RunState::Cancelled);
        self.report(ReportLevel::Warn, "Sync operation cancelled");
        SyncError::Cancelled
    }

    fn report(&self, level: ReportLevel, message: &str) {
        let threshold = match self.config.verbosity {
            Verbosity::Quiet => ReportLevel::Warn,
            Verbosity::Normal => ReportLevel::Info,
            Verbosity::Verbose => ReportLevel::Debug,
        };
        if level >= threshold {
            self.sink.emit(level, message);
        }
    }

    /// Performs one full reconciliation run.
    ///
    /// Fails only if a fetch fails or the run is cancelled. Failed updates
    /// are recorded in the returned report and never abort the run.
    pub async fn run(&self) -> SyncResult<RunReport> {
        let start = Instant::now();
        self.begin()?;
        self.report(ReportLevel::Info, "Starting sync operation...");
        if self.config.mode.is_simulate() {
            self.report(
                ReportLevel::Info,
                "DRY RUN MODE - No changes will be persisted",
            );
        }

        let fetched = tokio::try_join!(
            self.master.fetch_inventory(),
            self.follower.fetch_inventory()
        );
        let (masters, followers) = match fetched {
            Ok(inventories) => inventories,
            Err(e) => {
                self.set_state(RunState::Failed);
                self.report(ReportLevel::Error, &format!("Sync operation failed: {e}"));
                return Err(e);
            }
        };
        self.report(
            ReportLevel::Info,
            &format!(
                "Fetched {} devices from {} and {} from {}",
                masters.len(),
                self.master.platform(),
                followers.len(),
                self.follower.platform()
            ),
        );

        self.advance(RunState::Matching)?;
        let matches = match_devices(&masters, &followers);
        self.report(
            ReportLevel::Info,
            &format!(
                "Matched {} devices between {} and {}",
                matches.len(),
                self.master.platform(),
                self.follower.platform()
            ),
        );

        self.advance(RunState::Planning)?;
        let planned = plan_updates(&matches);
        for update in &planned {
            self.report(
                ReportLevel::Debug,
                &format!(
                    "Device {}: {} name \"{}\" -> {} name \"{}\"",
                    update.mac,
                    self.follower.platform(),
                    update.follower.name_or_placeholder(),
                    self.master.platform(),
                    update.proposed_name
                ),
            );
        }
        self.report(
            ReportLevel::Info,
            &format!("Found {} devices that need name updates", planned.len()),
        );
        if planned.is_empty() {
            self.report(ReportLevel::Info, "No updates needed");
        }

        // Once applying starts the stage runs to completion, so every write
        // made to the follower shows up in the outcomes and the summary. A
        // cancellation requested meanwhile stops the next run instead.
        self.advance(RunState::Applying)?;
        let mut outcomes = Vec::with_capacity(planned.len());
        for update in &planned {
            outcomes.push(self.apply(update).await);
        }

        self.set_state(RunState::Summarizing);
        let summary = RunSummary::summarize(followers.len(), &matches, &outcomes);
        summary.render(self.sink.as_ref());
        if summary.is_clean() {
            self.report(ReportLevel::Info, "Sync completed successfully");
        } else {
            self.report(
                ReportLevel::Warn,
                &format!(
                    "Sync completed with {} failed updates",
                    summary.failed_count
                ),
            );
        }

        self.set_state(RunState::Done);
        Ok(RunReport {
            mode: self.config.mode,
            planned: planned.len(),
            outcomes,
            summary,
            duration: start.elapsed(),
        })
    }

    /// Guards and applies one planned update, converting any failure into
    /// a failed outcome.
    async fn apply(&self, update: &PlannedUpdate<'_>) -> UpdateOutcome {
        let follower = update.follower;
        let outcome = UpdateOutcome::succeeded(
            &follower.id,
            &follower.mac_address,
            follower.name.clone(),
            &update.proposed_name,
        );
        let changes = FieldChanges::rename(&update.proposed_name);

        match self.guarded_apply(update, &changes).await {
            Ok(()) => outcome,
            Err(e) => {
                self.report(
                    ReportLevel::Error,
                    &format!(
                        "Failed to update device {}: {}",
                        follower.mac_address, e
                    ),
                );
                outcome.into_failure(e.to_string())
            }
        }
    }

    async fn guarded_apply(
        &self,
        update: &PlannedUpdate<'_>,
        changes: &FieldChanges,
    ) -> SyncResult<()> {
        let follower = update.follower;
        check_changes(follower, changes)?;

        let transition = format!(
            "{}: \"{}\" -> \"{}\"",
            follower.mac_address,
            follower.name_or_placeholder(),
            update.proposed_name
        );
        if self.config.mode.is_simulate() {
            self.report(
                ReportLevel::Info,
                &format!("[DRY RUN] Would update device {transition}"),
            );
            return Ok(());
        }

        self.report(ReportLevel::Info, &format!("Updating device {transition}"));
        self.follower.apply_update(&follower.id, changes).await?;
        Ok(())
    }
}
