//! Error types at the fetch, notify and storage boundaries.

use std::path::PathBuf;
use thiserror::Error;

/// Why a fetch produced no usable payload. Always retriable on the next cycle.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection refused, DNS failure, reset
    #[error("Network error: {0}")]
    Network(String),

    /// Source answered with a non-success status
    #[error("Source returned status {status}")]
    Status { status: u16 },

    #[error("Fetch timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Anti-bot interstitial or explicit refusal
    #[error("Blocked by site: {0}")]
    Blocked(String),

    #[error("Source returned an empty payload")]
    EmptyPayload,

    /// Proxy or browser answered in an unexpected shape
    #[error("Unexpected response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => FetchError::Status {
                status: status.as_u16(),
            },
            None => FetchError::Network(err.to_string()),
        }
    }
}

/// Why a notification was not confirmed sent.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Credentials refused by the delivery channel
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Transport error: {0}")]
    Transport(String),

    /// Channel accepted the connection but refused the message
    #[error("Message rejected: {0}")]
    Rejected(String),

    #[error("Notification timed out after {0:?}")]
    Timeout(std::time::Duration),
}

impl NotifyError {
    /// Map a non-success HTTP status from a delivery API.
    pub fn from_status(status: reqwest::StatusCode, body: String) -> Self {
        match status.as_u16() {
            401 | 403 => NotifyError::Auth(format!("{}: {}", status, body)),
            _ => NotifyError::Rejected(format!("{}: {}", status, body)),
        }
    }
}

/// Persisted seen-set could not be read or written.
#[derive(Debug, Error)]
#[error("Seen listings store {path}: {source}")]
pub struct StoreError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}
