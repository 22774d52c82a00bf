//! Error types for synchronization and local storage
//!
//! `SyncError` is `Clone` so a single in-flight request can fan its outcome
//! out to every caller awaiting it.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncError {
    /// No response was reachable (offline, DNS, refused, timed out)
    #[error("Network unreachable: {0}")]
    NetworkUnreachable(String),

    /// Non-2xx response or an undecodable body
    #[error("{message}")]
    Server {
        status: Option<u16>,
        message: String,
    },

    /// A status update failed and was rolled back
    #[error("Failed to update user status: {message}")]
    MutationFailure { message: String, network: bool },

    /// Superseded by a mutation or torn down with the view
    #[error("Request cancelled")]
    Cancelled,
}

impl SyncError {
    pub fn server(status: Option<u16>, message: impl Into<String>) -> Self {
        SyncError::Server {
            status,
            message: message.into(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, SyncError::Cancelled)
    }

    /// Wrap the cause of a failed status update.
    pub fn into_mutation_failure(self, network: bool) -> Self {
        match self {
            SyncError::MutationFailure { .. } => self,
            SyncError::NetworkUnreachable(message) => {
                SyncError::MutationFailure {
                    message,
                    network: true,
                }
            }
            other => SyncError::MutationFailure {
                message: other.to_string(),
                network,
            },
        }
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() || err.is_request() {
            SyncError::NetworkUnreachable(err.to_string())
        } else if err.is_decode() {
            SyncError::server(None, format!("Invalid response: {err}"))
        } else {
            SyncError::server(err.status().map(|s| s.as_u16()), err.to_string())
        }
    }
}

/// Local key/value storage failures. Never surfaced past the preference
/// store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Storage quota exceeded")]
    QuotaExceeded,

    #[error("Failed to read from storage")]
    ReadFailed(#[source] std::io::Error),

    #[error("Failed to write to storage")]
    WriteFailed(#[source] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_cause_keeps_network_flag_on_mutation() {
        let err = SyncError::NetworkUnreachable("connection refused".into())
            .into_mutation_failure(false);
        assert_eq!(err, SyncError::MutationFailure {
            message: "connection refused".into(),
            network: true,
        });
    }

    #[test]
    fn server_message_is_shown_raw() {
        let err = SyncError::server(Some(500), "database is down");
        assert_eq!(err.to_string(), "database is down");
    }
}
