use std::path::PathBuf;

use chrono::{DateTime, Months, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://tripletex.no/v2";

/// ================================
/// Client-wide settings
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub token_duration: TokenDuration,
    /// refresh this many seconds before the token expires, 0 when absent
    pub refresh_margin_seconds: Option<u64>,
    pub timeout_ms: Option<u64>,
    /// where the CLI keeps the session token between runs
    pub token_file: Option<PathBuf>,
    pub retry: Option<RetryConfig>,
    pub logging: Option<LoggingConfig>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token_duration: TokenDuration::default(),
            refresh_margin_seconds: None,
            timeout_ms: None,
            token_file: None,
            retry: None,
            logging: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetryConfig {
    pub attempts: Option<u32>,
    /// will be mutiply by 2 on every attempt until max_delay_ms
    pub base_delay_ms: Option<u64>,
    /// invariant: >= base_delay_ms
    pub max_delay_ms: Option<u64>,
}

/// ================================
/// Token lifetime requested on refresh
/// ================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TokenDuration {
    /// Calendar months, so month length differences are absorbed.
    Months { months: u32 },
    Days { days: u32 },
    Seconds { seconds: u64 },
}

impl Default for TokenDuration {
    fn default() -> Self {
        TokenDuration::Months { months: 1 }
    }
}

impl TokenDuration {
    /// Desired expiry for a token issued at `now`.
    pub fn expires_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let expires_at = match *self {
            TokenDuration::Months { months } => now.checked_add_months(Months::new(months)),
            TokenDuration::Days { days } => {
                TimeDelta::try_days(days as i64).and_then(|delta| now.checked_add_signed(delta))
            }
            TokenDuration::Seconds { seconds } => i64::try_from(seconds)
                .ok()
                .and_then(TimeDelta::try_seconds)
                .and_then(|delta| now.checked_add_signed(delta)),
        };
        expires_at.unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// ================================
/// Logging
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String, // allowed: trace, debug, info, warn, error
    pub format: LogFormat,
}

impl LoggingConfig {
    pub fn new(level: String, format: LogFormat) -> Self {
        Self { level, format }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Compact,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
