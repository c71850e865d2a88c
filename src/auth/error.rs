//! Session token errors.

use std::sync::Arc;

use http::header::InvalidHeaderValue;
use http::StatusCode;
use thiserror::Error;

/// Errors from creating or attaching a session token.
///
/// All of them are terminal for the call that triggered them; nothing here
/// is retried internally. Cheap to clone: callers that waited on a failed
/// refresh receive a copy of its error.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// The token request could not be built.
    #[error("failed to create session token request: {0}")]
    RequestConstructionFailed(#[source] Arc<reqwest::Error>),

    /// The token request did not complete.
    #[error("failed to send session token request: {0}")]
    TransportFailed(#[source] Arc<reqwest::Error>),

    /// The token endpoint answered with something other than 200.
    #[error("session token request failed with status {0}")]
    BadStatus(StatusCode),

    #[error("failed to read session token response body: {0}")]
    BodyReadFailed(#[source] Arc<reqwest::Error>),

    #[error("failed to parse session token response body: {0}")]
    BodyParseFailed(#[source] Arc<serde_json::Error>),

    /// The response parsed but lacks the named field.
    #[error("session token response is missing '{0}'")]
    EmptyResponse(&'static str),

    #[error("failed to parse session token expiration date '{value}': {source}")]
    MalformedExpiry {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// The token cannot be encoded as an `Authorization` header.
    #[error("session token is not a valid header value: {0}")]
    InvalidHeader(#[source] Arc<InvalidHeaderValue>),
}

impl From<InvalidHeaderValue> for AuthError {
    fn from(err: InvalidHeaderValue) -> Self {
        AuthError::InvalidHeader(Arc::new(err))
    }
}

impl AuthError {
    /// Short label used for metrics and logs.
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::RequestConstructionFailed(_) => "request_construction",
            AuthError::TransportFailed(_) => "transport",
            AuthError::BadStatus(_) => "bad_status",
            AuthError::BodyReadFailed(_) => "body_read",
            AuthError::BodyParseFailed(_) => "body_parse",
            AuthError::EmptyResponse(_) => "empty_response",
            AuthError::MalformedExpiry { .. } => "malformed_expiry",
            AuthError::InvalidHeader(_) => "invalid_header",
        }
    }
}
