use std::time::Duration;

use reqwest::Client;

use crate::auth::token::Token;
use crate::auth::token_manager::TokenSettings;
use crate::client::error::{ClientError, Result};
use crate::config::settings::{Settings, TokenDuration, DEFAULT_BASE_URL};

/// Everything optional about a [`TripletexClient`](crate::client::TripletexClient).
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    /// API root. Defaults to `https://tripletex.no/v2`.
    pub base_url: Option<String>,
    /// Transport. Defaults to a fresh `reqwest::Client` honouring `timeout`.
    pub http_client: Option<Client>,
    /// Per-request timeout of the default transport. Ignored with `http_client`.
    pub timeout: Option<Duration>,
    /// Lifetime requested for new session tokens. Defaults to one calendar month.
    pub token_duration: Option<TokenDuration>,
    /// Treat tokens as expired this long before their expiry. Defaults to zero.
    pub refresh_margin: Option<Duration>,
    /// Previously issued token to start with.
    pub token: Option<Token>,
}

impl ClientOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            base_url: Some(settings.base_url.clone()),
            http_client: None,
            timeout: settings.timeout_ms.map(Duration::from_millis),
            token_duration: Some(settings.token_duration),
            refresh_margin: settings.refresh_margin_seconds.map(Duration::from_secs),
            token: None,
        }
    }

    pub(crate) fn base_url(&self) -> String {
        self.base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string()
    }

    pub(crate) fn http_client(&self) -> Result<Client> {
        if let Some(client) = &self.http_client {
            return Ok(client.clone());
        }
        let mut builder = Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        builder
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {}", e)))
    }

    pub(crate) fn token_settings(&self) -> TokenSettings {
        TokenSettings {
            base_url: self.base_url(),
            token_duration: self.token_duration.unwrap_or_default(),
            refresh_margin: self.refresh_margin.unwrap_or(Duration::ZERO),
        }
    }
}
