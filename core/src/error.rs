//! Error types for the SharePoint list client.
//!
//! # Design
//! A non-success status from the backend is the only failure this crate
//! raises on its own: `OperationFailed` keeps the raw response body so the
//! caller sees whatever SharePoint said. Everything else is a lower-level
//! failure passed through with its original message.

use std::fmt;

use thiserror::Error;

/// The list operation a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Metadata,
    Create,
    Read,
    Update,
    Delete,
    ContextInfo,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Metadata => "Metadata",
            Operation::Create => "Create",
            Operation::Read => "Get",
            Operation::Update => "Update",
            Operation::Delete => "Delete",
            Operation::ContextInfo => "Context info",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend answered with a non-2xx status.
    #[error("{operation} failed: {body}")]
    OperationFailed {
        operation: Operation,
        status: u16,
        body: String,
    },

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body was not the expected JSON shape.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// No request digest could be obtained.
    #[error("request digest unavailable: {0}")]
    Token(String),
}

impl ApiError {
    /// HTTP status of an `OperationFailed`, if that is what this is.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::OperationFailed { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_failed_message_carries_body() {
        let err = ApiError::OperationFailed {
            operation: Operation::Update,
            status: 500,
            body: "Conflict".to_string(),
        };
        assert_eq!(err.to_string(), "Update failed: Conflict");
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn read_failures_are_reported_as_get() {
        let err = ApiError::OperationFailed {
            operation: Operation::Read,
            status: 404,
            body: "List does not exist".to_string(),
        };
        assert_eq!(err.to_string(), "Get failed: List does not exist");
    }

    #[test]
    fn pass_through_errors_have_no_status() {
        assert_eq!(ApiError::Token("missing".to_string()).status(), None);
    }
}
