//! Error types for the watchlist client core.
//!
//! # Design
//! The three remote outcomes a screen must distinguish get one variant each:
//! the call never completed, the server said no, or the server said yes in a
//! shape we cannot read. `Serialization` covers the only local failure, an
//! outgoing payload that cannot be encoded.
//!
//! Every variant owns plain strings so errors can be cloned into resource
//! snapshots and handed across the FFI boundary.

use thiserror::Error;

/// Errors produced while building requests, executing them, or parsing
/// their responses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request did not complete: connection refused, DNS, timeout.
    #[error("network failure: {0}")]
    NetworkFailure(String),

    /// The server answered with a non-2xx status. `message` is the JSON
    /// `message` field of the body when there is one, else the raw body.
    #[error("HTTP {status}: {message}")]
    RemoteRejection { status: u16, message: String },

    /// A 2xx response whose body is not the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// HTTP status of a rejection, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::RemoteRejection { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::NetworkFailure(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_display_carries_server_message() {
        let err = ApiError::RemoteRejection {
            status: 500,
            message: "db error".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 500: db error");
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn network_failure_has_no_status() {
        let err = ApiError::NetworkFailure("timed out".to_string());
        assert!(err.is_network());
        assert_eq!(err.status(), None);
        assert_eq!(err.to_string(), "network failure: timed out");
    }
}
