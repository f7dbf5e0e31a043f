//! Capability interfaces for the two platforms.

use crate::device::{FollowerRecord, MasterRecord};
use crate::error::{SyncError, SyncResult};
use crate::guard::FieldChanges;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// The authoritative platform.
///
/// Implementations handle authentication and pagination; the engine only
/// sees the full inventory.
#[async_trait]
pub trait MasterSource: Send + Sync {
    /// Short platform name used in errors and reports.
    fn platform(&self) -> &str;

    /// Fetches every device known to the platform.
    async fn fetch_inventory(&self) -> SyncResult<Vec<MasterRecord>>;
}

/// The platform whose names are corrected.
#[async_trait]
pub trait FollowerTarget: Send + Sync {
    /// Short platform name used in errors and reports.
    fn platform(&self) -> &str;

    /// Fetches every device known to the platform.
    async fn fetch_inventory(&self) -> SyncResult<Vec<FollowerRecord>>;

    /// Applies already-guarded field changes to one record.
    async fn apply_update(
        &self,
        follower_id: &str,
        changes: &FieldChanges,
    ) -> SyncResult<FollowerRecord>;
}

/// An in-memory master platform for testing.
#[derive(Debug, Default)]
pub struct MockMasterSource {
    records: Mutex<Vec<MasterRecord>>,
    fetch_error: Mutex<Option<SyncError>>,
    fetch_calls: AtomicUsize,
}

impl MockMasterSource {
    /// Creates a mock serving `records`.
    pub fn new(records: Vec<MasterRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Default::default()
        }
    }

    /// Makes every fetch fail with `error`.
    pub fn fail_fetch_with(&self, error: SyncError) {
        *self.fetch_error.lock() = Some(error);
    }

    /// Returns how many times the inventory was fetched.
    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MasterSource for MockMasterSource {
    fn platform(&self) -> &str {
        "mock-master"
    }

    async fn fetch_inventory(&self) -> SyncResult<Vec<MasterRecord>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.fetch_error.lock().clone() {
            return Err(err);
        }
        Ok(self.records.lock().clone())
    }
}

/// An in-memory follower platform for testing.
///
/// Successful updates are applied to the stored records, so a second run
/// sees the corrected names.
#[derive(Debug, Default)]
pub struct MockFollowerTarget {
    records: Mutex<Vec<FollowerRecord>>,
    fetch_error: Mutex<Option<SyncError>>,
    update_failures: Mutex<HashMap<String, String>>,
    applied: Mutex<Vec<(String, FieldChanges)>>,
}

impl MockFollowerTarget {
    /// Creates a mock serving `records`.
    pub fn new(records: Vec<FollowerRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Default::default()
        }
    }

    /// Makes every fetch fail with `error`.
    pub fn fail_fetch_with(&self, error: SyncError) {
        *self.fetch_error.lock() = Some(error);
    }

    /// Makes updates to `follower_id` fail with `message`.
    pub fn fail_update_for(&self, follower_id: impl Into<String>, message: impl Into<String>) {
        self.update_failures
            .lock()
            .insert(follower_id.into(), message.into());
    }

    /// Returns every update call received, in order.
    pub fn applied(&self) -> Vec<(String, FieldChanges)> {
        self.applied.lock().clone()
    }

    /// Returns how many update calls were received.
    pub fn apply_calls(&self) -> usize {
        self.applied.lock().len()
    }

    /// Returns the current stored records.
    pub fn records(&self) -> Vec<FollowerRecord> {
        self.records.lock().clone()
    }
}

#[async_trait]
impl FollowerTarget for MockFollowerTarget {
    fn platform(&self) -> &str {
        "mock-follower"
    }

    async fn fetch_inventory(&self) -> SyncResult<Vec<FollowerRecord>> {
        if let Some(err) = self.fetch_error.lock().clone() {
            return Err(err);
        }
        Ok(self.records.lock().clone())
    }

    async fn apply_update(
        &self,
        follower_id: &str,
        changes: &FieldChanges,
    ) -> SyncResult<FollowerRecord> {
        self.applied
            .lock()
            .push((follower_id.to_string(), changes.clone()));

        if let Some(message) = self.update_failures.lock().get(follower_id) {
            return Err(SyncError::update(follower_id, message.clone()));
        }

        let mut records = self.records.lock();
        let record = records
            .iter_mut()
            .find(|r| r.id == follower_id)
            .ok_or_else(|| SyncError::update(follower_id, "404 Not Found"))?;
        if let Some(name) = changes.name() {
            record.name = Some(name.to_string());
        }
        Ok(record.clone())
    }
}
