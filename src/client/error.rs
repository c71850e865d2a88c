//! Client error types.

use http::StatusCode;
use thiserror::Error;

use crate::auth::error::AuthError;

/// Client error type.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No valid session token; the request was not sent.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Server returned a non-success status.
    #[error("API error ({status}): {body}")]
    Api {
        status: StatusCode,
        body: String,
    },

    /// JSON deserialization failed.
    #[error("JSON error: {0}")]
    Decode(#[from] serde_json::Error),

    /// A `{"value": ...}` envelope came back without a value.
    #[error("response has no value")]
    EmptyValue,

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Status of an API error response, if that is what this is.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Auth(AuthError::BadStatus(status)) => Some(*status),
            _ => None,
        }
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, ClientError::Auth(_)) || self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Api { status, .. } if *status == StatusCode::NOT_FOUND)
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
