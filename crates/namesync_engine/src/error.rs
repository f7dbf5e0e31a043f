//! Error types for the reconciliation engine.

use thiserror::Error;

/// Result type for engine operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur during a reconciliation run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// Fetching an inventory from one of the platforms failed.
    #[error("failed to fetch inventory from {platform}: {message}")]
    Fetch {
        /// Platform the fetch was issued against.
        platform: String,
        /// Error message.
        message: String,
        /// Whether a later attempt may succeed.
        retryable: bool,
    },

    /// A proposed change touches fields outside the allowed set.
    #[error(
        "attempted to modify disallowed fields: {}. Only \"name\" field is allowed for safety",
        .fields.join(", ")
    )]
    PolicyViolation {
        /// The offending field names.
        fields: Vec<String>,
    },

    /// A proposed field value has the wrong shape.
    #[error("invalid value for field {field}: {reason}")]
    InvalidValue {
        /// Field name.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// The follower platform rejected or failed an update.
    #[error("failed to update {follower_id}: {message}")]
    Update {
        /// Follower record identifier.
        follower_id: String,
        /// Error message.
        message: String,
    },

    /// The run was cancelled between stages.
    #[error("run cancelled")]
    Cancelled,

    /// Invalid state transition.
    #[error("invalid state transition from {from} to {to}")]
    InvalidStateTransition {
        /// Current state.
        from: String,
        /// Attempted target state.
        to: String,
    },
}

impl SyncError {
    /// Creates a retryable fetch error.
    pub fn fetch_retryable(platform: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            platform: platform.into(),
            message: message.into(),
            retryable: true,
        }
    }

    /// Creates a non-retryable fetch error.
    pub fn fetch_fatal(platform: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            platform: platform.into(),
            message: message.into(),
            retryable: false,
        }
    }

    /// Creates an update error for a follower record.
    pub fn update(follower_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Update {
            follower_id: follower_id.into(),
            message: message.into(),
        }
    }

    /// Returns true if this error can be retried on a later run.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Fetch { retryable, .. } => *retryable,
            SyncError::Update { .. } => true,
            _ => false,
        }
    }

    /// Returns true if this error aborts a whole run rather than a single update.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SyncError::Fetch { .. } | SyncError::Cancelled | SyncError::InvalidStateTransition { .. }
        )
    }
}
