//! Client error types
//!
//! Every failure falls into one of three categories: the transport failed,
//! the payload was rejected client-side, or the backend rejected the call.

use thiserror::Error;

use super::session::SessionError;
use crate::validation::ValidationErrors;

/// Errors that can occur when talking to the POS backend
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Not logged in or session expired")]
    Unauthorized,

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Session storage error: {0}")]
    Session(#[from] SessionError),
}

/// Coarse category used to pick how a failure is shown to the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Validation,
    Rejected,
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Unavailable(_)
            | ClientError::Timeout
            | ClientError::Request(_)
            | ClientError::Decode(_)
            | ClientError::Session(_) => ErrorKind::Transport,
            ClientError::Validation(_) => ErrorKind::Validation,
            ClientError::Unauthorized | ClientError::ApiError { .. } => ErrorKind::Rejected,
        }
    }

    /// HTTP status for backend rejections
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::ApiError { status, .. } => Some(*status),
            ClientError::Unauthorized => Some(401),
            _ => None,
        }
    }

    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_connect() {
            ClientError::Unavailable(err.to_string())
        } else if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Request(err)
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(ClientError::Timeout.kind(), ErrorKind::Transport);
        assert_eq!(ClientError::Unauthorized.kind(), ErrorKind::Rejected);
        assert_eq!(
            ClientError::Validation(ValidationErrors::default()).kind(),
            ErrorKind::Validation
        );

        let rejected = ClientError::ApiError {
            status: 409,
            message: "Insufficient stock".to_string(),
        };
        assert_eq!(rejected.kind(), ErrorKind::Rejected);
        assert_eq!(rejected.status(), Some(409));
        assert_eq!(rejected.to_string(), "API error 409: Insufficient stock");
    }
}
