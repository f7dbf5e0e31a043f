//! Error types for the platform clients.

use namesync_engine::SyncError;
use reqwest::StatusCode;
use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors raised by the platform API clients.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The API answered with a non-success status.
    #[error("{platform} API error: {status} - {body}")]
    Status {
        /// Platform name.
        platform: &'static str,
        /// HTTP status.
        status: StatusCode,
        /// Response body, as text.
        body: String,
    },

    /// The request could not be sent or the response not read.
    #[error("{platform} API request failed: {source}")]
    Request {
        /// Platform name.
        platform: &'static str,
        /// Underlying HTTP error.
        #[source]
        source: reqwest::Error,
    },

    /// The response body did not have the expected shape.
    #[error("{platform} API returned an unexpected body: {message}")]
    Decode {
        /// Platform name.
        platform: &'static str,
        /// Decoder message.
        message: String,
    },

    /// Client configuration is invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ClientError {
    /// Returns the platform the error came from, if any.
    pub fn platform(&self) -> Option<&'static str> {
        match self {
            ClientError::Status { platform, .. }
            | ClientError::Request { platform, .. }
            | ClientError::Decode { platform, .. } => Some(*platform),
            ClientError::InvalidConfig(_) => None,
        }
    }

    /// Returns the HTTP status, if the API answered.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true if repeating the request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Status { status, .. } => is_retryable_status(*status),
            ClientError::Request { source, .. } => source.is_timeout() || source.is_connect(),
            ClientError::Decode { .. } | ClientError::InvalidConfig(_) => false,
        }
    }

    /// Converts into the engine's fetch error.
    pub fn into_fetch_error(self) -> SyncError {
        let platform = self.platform().unwrap_or("unknown");
        SyncError::Fetch {
            platform: platform.to_string(),
            retryable: self.is_retryable(),
            message: self.to_string(),
        }
    }

    /// Converts into the engine's update error for `follower_id`.
    pub fn into_update_error(self, follower_id: &str) -> SyncError {
        SyncError::update(follower_id, self.to_string())
    }
}

/// Statuses worth retrying: rate limiting and server-side failures.
pub(crate) fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_error(status: StatusCode) -> ClientError {
        ClientError::Status {
            platform: "UniFi",
            status,
            body: "nope".into(),
        }
    }

    #[test]
    fn retryable_statuses() {
        assert!(status_error(StatusCode::TOO_MANY_REQUESTS).is_retryable());
        assert!(status_error(StatusCode::BAD_GATEWAY).is_retryable());
        assert!(!status_error(StatusCode::UNAUTHORIZED).is_retryable());
        assert!(!status_error(StatusCode::NOT_FOUND).is_retryable());
        assert!(!ClientError::InvalidConfig("x".into()).is_retryable());
    }

    #[test]
    fn error_display() {
        let err = status_error(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.to_string(),
            "UniFi API error: 500 Internal Server Error - nope"
        );
    }

    #[test]
    fn converts_to_engine_errors() {
        match status_error(StatusCode::SERVICE_UNAVAILABLE).into_fetch_error() {
            SyncError::Fetch {
                platform,
                retryable,
                message,
            } => {
                assert_eq!(platform, "UniFi");
                assert!(retryable);
                assert!(message.contains("503"));
            }
            other => panic!("expected fetch error, got {other:?}"),
        }

        let err = status_error(StatusCode::FORBIDDEN).into_update_error("u1");
        assert_eq!(
            err,
            SyncError::update("u1", "UniFi API error: 403 Forbidden - nope")
        );
    }
}
