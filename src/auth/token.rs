use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Session token and its absolute expiry.
///
/// Serializes as `{"token": "...", "expiresAt": "<rfc3339>"}` so an issued
/// token can be stored and handed back through `TokenManager::set_token`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    #[serde(rename = "token")]
    value: String,
    expires_at: DateTime<Utc>,
}

impl Token {
    pub fn new(value: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self { value: value.into(), expires_at }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Valid iff `now` is strictly before the expiry.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    /// Like [`Token::is_valid_at`], treating the token as expired `margin` early.
    pub fn is_valid_with_margin(&self, now: DateTime<Utc>, margin: TimeDelta) -> bool {
        now.checked_add_signed(margin)
            .is_some_and(|shifted| self.is_valid_at(shifted))
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("value", &"***")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
