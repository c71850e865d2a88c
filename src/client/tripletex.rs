//! Authenticated access to the Tripletex API.

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::auth::credentials::Credentials;
use crate::auth::token_manager::TokenManager;
use crate::client::error::{ClientError, Result};
use crate::client::options::ClientOptions;
use crate::client::response::{ListResponse, ResponseWrapper, WhoAmI};
use crate::observability::metrics::get_metrics;

const WHO_AM_I_PATH: &str = "/token/session/>whoAmI";

/// Tripletex API client.
///
/// Every request goes through the [`TokenManager`], which creates or reuses
/// the session token and sets the `Authorization` header. Clones share the
/// token.
///
/// # Example
///
/// ```no_run
/// use tripletex::auth::Credentials;
/// use tripletex::client::{ClientOptions, TripletexClient};
/// use tripletex::fields::FieldsBuilder;
///
/// # async fn example() -> tripletex::client::Result<()> {
/// let client = TripletexClient::new(
///     Credentials::new("consumer-token", "employee-token"),
///     ClientOptions::default(),
/// )?;
///
/// let fields = FieldsBuilder::new().add("id").add("name");
/// let customers = client
///     .get_values::<serde_json::Value, _>("/customer", &[("fields", fields.to_string())])
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TripletexClient {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    http: reqwest::Client,
    base_url: String,
    auth: TokenManager,
}

impl TripletexClient {
    pub fn new(credentials: Credentials, options: ClientOptions) -> Result<Self> {
        let http = options.http_client()?;
        let mut auth = TokenManager::new(credentials, http.clone(), options.token_settings());
        if let Some(token) = options.token.clone() {
            auth = auth.with_token(token);
        }

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                base_url: options.base_url(),
                auth,
            }),
        })
    }

    /// Session token state shared by every request of this client.
    pub fn auth(&self) -> &TokenManager {
        &self.inner.auth
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.inner.base_url, path.trim_start_matches('/'))
    }

    /// Authenticated request builder for `path` below the base url.
    pub async fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let request = self.inner.http.request(method, self.url(path));
        Ok(self.inner.auth.intercept(request).await?)
    }

    /// GET an endpoint answering `{"value": T}`.
    pub async fn get_value<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let request = self.request(Method::GET, path).await?.query(query);
        let wrapped: ResponseWrapper<T> = self.send(Method::GET, request).await?;
        wrapped.value.ok_or(ClientError::EmptyValue)
    }

    /// GET a search endpoint answering `{"values": [T]}`.
    pub async fn get_values<T, Q>(&self, path: &str, query: &Q) -> Result<ListResponse<T>>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let request = self.request(Method::GET, path).await?.query(query);
        self.send(Method::GET, request).await
    }

    /// Identity behind the current session token.
    pub async fn who_am_i(&self) -> Result<WhoAmI> {
        self.get_value(WHO_AM_I_PATH, &[] as &[(&str, &str)]).await
    }

    async fn send<T: DeserializeOwned>(&self, method: Method, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        get_metrics()
            .await
            .api_requests
            .with_label_values(&[method.as_str(), response.status().as_str()])
            .inc();
        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let status = response.status();
        debug!(status = %status, url = %response.url(), "api response");

        if status.is_success() {
            let body = response.bytes().await?;
            return Ok(serde_json::from_slice(&body)?);
        }

        let body = response.text().await.unwrap_or_default();
        warn!(status = %status, "api request failed");
        Err(ClientError::Api { status, body })
    }
}
