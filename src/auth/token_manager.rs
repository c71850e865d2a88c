//! Session token lifecycle.
//!
//! [`TokenManager`] holds the credentials and at most one [`Token`]. Before a
//! request goes out, [`TokenManager::intercept`] makes sure the token is
//! valid, creating a new one through `PUT /token/session/:create` when it is
//! not, and attaches it as `Authorization: Basic base64("0:<token>")`.
//!
//! Refreshes are single-flight: callers that find the token invalid queue on
//! a refresh gate. A caller that waited while another refresh ran takes that
//! refresh's outcome, token or error, instead of making its own call, so a
//! burst of requests on an expired token produces one HTTP call.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use chrono::TimeDelta;
use http::header::{HeaderValue, AUTHORIZATION};
use http::StatusCode;
use parking_lot::RwLock;
use reqwest::{Client, RequestBuilder};
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::auth::credentials::Credentials;
use crate::auth::error::AuthError;
use crate::auth::session::{CreateSessionQuery, SessionTokenResponse, SESSION_CREATE_PATH};
use crate::auth::token::Token;
use crate::config::settings::{TokenDuration, DEFAULT_BASE_URL};
use crate::helpers::time::{format_date, get_instant, margin_from_std, now, parse_date};
use crate::observability::metrics::{get_metrics, get_metrics_sync};

/// Basic auth username for a plain company session.
pub const SESSION_USERNAME: &str = "0";

/// Token endpoint and lifetime settings.
#[derive(Debug, Clone)]
pub struct TokenSettings {
    /// API root, e.g. `https://tripletex.no/v2`.
    pub base_url: String,
    /// Lifetime requested for new tokens.
    pub token_duration: TokenDuration,
    /// Treat tokens as expired this long before their expiry.
    pub refresh_margin: Duration,
}

impl Default for TokenSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token_duration: TokenDuration::default(),
            refresh_margin: Duration::ZERO,
        }
    }
}

/// Result of the last completed refresh, handed to callers that waited on it.
type RefreshOutcome = Option<Result<Token, AuthError>>;

#[derive(Debug)]
pub struct TokenManager {
    credentials: Credentials,
    http: Client,
    base_url: String,
    token_duration: TokenDuration,
    refresh_margin: TimeDelta,
    token: RwLock<Option<Token>>,
    refresh_gate: Mutex<RefreshOutcome>,
    // bumped under `refresh_gate` each time a refresh completes
    refresh_generation: AtomicU64,
}

impl TokenManager {
    pub fn new(credentials: Credentials, http: Client, settings: TokenSettings) -> Self {
        Self {
            credentials,
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            token_duration: settings.token_duration,
            refresh_margin: margin_from_std(settings.refresh_margin),
            token: RwLock::new(None),
            refresh_gate: Mutex::new(None),
            refresh_generation: AtomicU64::new(0),
        }
    }

    /// Start from an already issued token instead of creating one on first use.
    pub fn with_token(self, token: Token) -> Self {
        debug!(expires_at = %token.expires_at(), "starting with a previously issued session token");
        self.set_token(token);
        self
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Whether a token is held and has not reached its expiry.
    pub fn is_valid(&self) -> bool {
        self.token
            .read()
            .as_ref()
            .is_some_and(|token| token.is_valid_with_margin(now(), self.refresh_margin))
    }

    /// Copy of the current token, valid or not.
    pub fn get_token(&self) -> Option<Token> {
        self.token.read().clone()
    }

    /// Replace the current token, e.g. with one restored from storage.
    pub fn set_token(&self, token: Token) {
        if let Some(metrics) = get_metrics_sync() {
            metrics.token_expiry_unix.set(token.expires_at().timestamp());
        }
        *self.token.write() = Some(token);
    }

    pub fn clear_token(&self) {
        *self.token.write() = None;
    }

    /// Create a new session token, whether or not the current one is valid.
    ///
    /// On failure the current token is left as it was.
    pub async fn refresh(&self) -> Result<(), AuthError> {
        let mut last = self.refresh_gate.lock().await;
        self.refresh_locked(&mut last).await.map(|_| ())
    }

    /// Refresh only if [`TokenManager::is_valid`] is false.
    pub async fn ensure_valid(&self) -> Result<(), AuthError> {
        self.valid_token().await.map(|_| ())
    }

    /// `Authorization` header for the current token, refreshing first if needed.
    pub async fn authorization_header(&self) -> Result<HeaderValue, AuthError> {
        let token = self.valid_token().await?;
        let username = match self.credentials.client_id() {
            Some(client_id) => client_id.to_string(),
            None => SESSION_USERNAME.to_string(),
        };
        basic_auth_header(&username, token.value())
    }

    /// Authenticate `request`. If this fails the request is never sent.
    pub async fn intercept(&self, request: RequestBuilder) -> Result<RequestBuilder, AuthError> {
        let header = self.authorization_header().await?;
        get_metrics().await.intercepted_requests.inc();
        Ok(request.header(AUTHORIZATION, header))
    }

    async fn valid_token(&self) -> Result<Token, AuthError> {
        if let Some(token) = self.current_valid_token() {
            return Ok(token);
        }

        let seen = self.refresh_generation.load(Ordering::Acquire);
        let mut last = self.refresh_gate.lock().await;
        if let Some(token) = self.current_valid_token() {
            debug!("session token refreshed by a concurrent caller");
            return Ok(token);
        }
        // a refresh completed while we waited: share its outcome
        if self.refresh_generation.load(Ordering::Acquire) != seen {
            if let Some(outcome) = last.as_ref() {
                debug!("reusing outcome of a concurrent session token refresh");
                return outcome.clone();
            }
        }
        self.refresh_locked(&mut last).await
    }

    fn current_valid_token(&self) -> Option<Token> {
        self.token
            .read()
            .as_ref()
            .filter(|token| token.is_valid_with_margin(now(), self.refresh_margin))
            .cloned()
    }

    /// `last` is the guarded slot of `refresh_gate`.
    async fn refresh_locked(&self, last: &mut RefreshOutcome) -> Result<Token, AuthError> {
        let metrics = get_metrics().await;
        let start = get_instant();
        metrics.token_refresh_requests.inc();

        let result = self.create_session_token().await;
        metrics.token_refresh_duration.observe(start.elapsed().as_secs_f64());

        match &result {
            Ok(token) => {
                info!(expires_at = %token.expires_at(), "session token refreshed");
                metrics.token_expiry_unix.set(token.expires_at().timestamp());
                *self.token.write() = Some(token.clone());
            }
            Err(err) => {
                error!(reason = err.reason(), error = %err, "session token refresh failed");
                metrics.token_refresh_failures.with_label_values(&[err.reason()]).inc();
            }
        }

        *last = Some(result.clone());
        self.refresh_generation.fetch_add(1, Ordering::Release);
        result
    }

    async fn create_session_token(&self) -> Result<Token, AuthError> {
        let expiration_date = format_date(self.token_duration.expires_from(now()));
        let url = format!("{}{}", self.base_url, SESSION_CREATE_PATH);
        debug!(url = %url, expiration_date = %expiration_date, "creating session token");

        let request = self
            .http
            .put(&url)
            .query(&CreateSessionQuery {
                consumer_token: self.credentials.consumer_token(),
                employee_token: self.credentials.employee_token(),
                expiration_date: &expiration_date,
            })
            .build()
            .map_err(|e| AuthError::RequestConstructionFailed(Arc::new(e)))?;

        let response = self.http.execute(request).await.map_err(|e| AuthError::TransportFailed(Arc::new(e)))?;
        if response.status() != StatusCode::OK {
            return Err(AuthError::BadStatus(response.status()));
        }

        let body = response.bytes().await.map_err(|e| AuthError::BodyReadFailed(Arc::new(e)))?;
        let parsed: SessionTokenResponse =
            serde_json::from_slice(&body).map_err(|e| AuthError::BodyParseFailed(Arc::new(e)))?;

        let session = parsed.value.ok_or(AuthError::EmptyResponse("value"))?;
        let expiration_date = session
            .expiration_date
            .ok_or(AuthError::EmptyResponse("expirationDate"))?;
        let value = session.token.ok_or(AuthError::EmptyResponse("token"))?;

        let expires_at = parse_date(&expiration_date).map_err(|source| AuthError::MalformedExpiry {
            value: expiration_date.clone(),
            source,
        })?;

        Ok(Token::new(value, expires_at))
    }
}

/// `Basic base64("<username>:<password>")`, marked sensitive.
pub fn basic_auth_header(username: &str, password: &str) -> Result<HeaderValue, AuthError> {
    let encoded = base64::engine::general_purpose::STANDARD.encode(format!("{}:{}", username, password));
    let mut header = HeaderValue::from_str(&format!("Basic {}", encoded))?;
    header.set_sensitive(true);
    Ok(header)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn manager() -> TokenManager {
        TokenManager::new(
            Credentials::new("consumer", "employee"),
            Client::new(),
            TokenSettings {
                base_url: "http://127.0.0.1:9".to_string(),
                ..TokenSettings::default()
            },
        )
    }

    #[test]
    fn basic_header_encoding() {
        let header = basic_auth_header("0", "token").unwrap();
        assert_eq!(header.to_str().unwrap(), "Basic MDp0b2tlbg==");
        assert!(header.is_sensitive());
    }

    #[test]
    fn no_token_is_invalid() {
        let manager = manager();
        assert!(!manager.is_valid());
        assert!(manager.get_token().is_none());
    }

    #[test]
    fn set_get_and_clear() {
        let manager = manager();
        let token = Token::new("abc", Utc::now() + TimeDelta::hours(1));
        manager.set_token(token.clone());
        assert!(manager.is_valid());
        assert_eq!(manager.get_token(), Some(token));

        manager.clear_token();
        assert!(!manager.is_valid());
    }

    #[test]
    fn expired_token_is_invalid() {
        let manager = manager().with_token(Token::new("abc", Utc::now() - TimeDelta::seconds(1)));
        assert!(!manager.is_valid());
        assert!(manager.get_token().is_some());
    }

    #[test]
    fn restored_token_sets_expiry_gauge() {
        let expires_at = Utc::now() + TimeDelta::days(40);
        let _manager = manager().with_token(Token::new("abc", expires_at));

        let gauge = &get_metrics_sync().expect("metrics").token_expiry_unix;
        assert_eq!(gauge.get(), expires_at.timestamp());
    }

    #[test]
    fn refresh_margin_is_applied() {
        let manager = TokenManager::new(
            Credentials::new("consumer", "employee"),
            Client::new(),
            TokenSettings {
                refresh_margin: Duration::from_secs(600),
                ..TokenSettings::default()
            },
        )
        .with_token(Token::new("abc", Utc::now() + TimeDelta::minutes(5)));
        assert!(!manager.is_valid());
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let manager = TokenManager::new(
            Credentials::new("c", "e"),
            Client::new(),
            TokenSettings {
                base_url: "https://tripletex.no/v2/".to_string(),
                ..TokenSettings::default()
            },
        );
        assert_eq!(manager.base_url, "https://tripletex.no/v2");
    }
}
