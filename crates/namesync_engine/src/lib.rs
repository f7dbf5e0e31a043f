//! # namesync engine
//!
//! Reconciles device display names between an authoritative platform
//! (the master) and a platform whose names are corrected (the follower).
//!
//! This crate provides:
//! - MAC address normalization
//! - Matching of the two inventories on normalized MAC
//! - Change planning (master name wins whenever it has one)
//! - A safety guard that only ever lets `name` through
//! - Run summaries and an injectable report sink
//! - The run state machine (fetching → matching → planning → applying →
//!   summarizing → done)
//!
//! ## Key Invariants
//!
//! - The master is authoritative, but only when its name is non-empty
//! - Only the `name` field of a follower record is ever modified
//! - A fetch failure aborts the run; an update failure never does
//! - Nothing is carried from one run to the next
//!
//! ## Example
//!
//! ```
//! use namesync_engine::{
//!     DeviceRecord, MockFollowerTarget, MockMasterSource, ReconcileEngine, RunConfig,
//! };
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let master = MockMasterSource::new(vec![
//!     DeviceRecord::new("fw1", "aa:bb:cc:dd:ee:ff").with_name("Living Room TV"),
//! ]);
//! let follower = MockFollowerTarget::new(vec![
//!     DeviceRecord::new("u1", "AA-BB-CC-DD-EE-FF").with_name("Old TV Name"),
//! ]);
//!
//! let engine = ReconcileEngine::new(RunConfig::simulate(), master, follower);
//! let report = engine.run().await.unwrap();
//! assert_eq!(report.summary.updated_count, 1);
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod config;
mod device;
mod error;
mod guard;
mod mac;
mod matcher;
mod planner;
mod platform;
mod report;
mod state;
mod summary;

pub use config::{RunConfig, RunMode, Verbosity};
pub use device::{DeviceRecord, FollowerRecord, MasterRecord};
pub use error::{SyncError, SyncResult};
pub use guard::{check_changes, FieldChanges, ALLOWED_FIELDS};
pub use mac::{is_canonical_mac, normalize_mac};
pub use matcher::{match_devices, MatchSet, MatchedPair};
pub use planner::{plan_updates, proposed_name, PlannedUpdate};
pub use platform::{FollowerTarget, MasterSource, MockFollowerTarget, MockMasterSource};
pub use report::{MemorySink, ReportLevel, ReportSink, TracingSink};
pub use state::{ReconcileEngine, RunReport, RunState};
pub use summary::{RunSummary, UpdateOutcome, UNKNOWN_ERROR};
