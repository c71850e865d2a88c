// tests/common/mod.rs
pub use serde_json::json;

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use httpmock::Method::PUT;
use httpmock::{Mock, MockServer};
use reqwest::Client;

use crate::auth::session::SESSION_CREATE_PATH;
use crate::auth::{Credentials, Token, TokenManager, TokenSettings};
use crate::client::{ClientOptions, TripletexClient};

pub const CONSUMER_TOKEN: &str = "consumer-abc";
pub const EMPLOYEE_TOKEN: &str = "employee-xyz";
pub const SESSION_TOKEN: &str = "session-token";
/// `base64("0:session-token")`
pub const SESSION_BASIC: &str = "Basic MDpzZXNzaW9uLXRva2Vu";

pub fn build_reqwest_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}

pub fn credentials() -> Credentials {
    Credentials::new(CONSUMER_TOKEN, EMPLOYEE_TOKEN)
}

pub fn manager(server: &MockServer) -> TokenManager {
    manager_with(server, credentials())
}

pub fn manager_with(server: &MockServer, credentials: Credentials) -> TokenManager {
    TokenManager::new(
        credentials,
        build_reqwest_client(),
        TokenSettings {
            base_url: server.base_url(),
            ..TokenSettings::default()
        },
    )
}

pub fn client(server: &MockServer, token: Option<Token>) -> TripletexClient {
    let options = ClientOptions {
        base_url: Some(server.base_url()),
        http_client: Some(build_reqwest_client()),
        token,
        ..ClientOptions::default()
    };
    TripletexClient::new(credentials(), options).expect("client")
}

pub fn valid_token(value: &str) -> Token {
    Token::new(value, Utc::now() + TimeDelta::days(1))
}

pub fn expired_token(value: &str) -> Token {
    Token::new(value, Utc::now() - TimeDelta::days(1))
}

/// `YYYY-MM-DD` a week from now; parses to a future midnight.
pub fn future_date() -> String {
    (Utc::now() + TimeDelta::days(7)).format("%Y-%m-%d").to_string()
}

pub fn midnight(date: &str) -> DateTime<Utc> {
    crate::helpers::time::parse_date(date).expect("date")
}

pub fn session_body(token: &str, expiration_date: &str) -> serde_json::Value {
    json!({
        "value": {
            "id": 1,
            "token": token,
            "expirationDate": expiration_date,
            "consumerToken": { "id": 2 },
            "employeeToken": { "id": 3 }
        }
    })
}

/// Session create endpoint answering 200 with `token`.
pub async fn mock_session<'a>(server: &'a MockServer, token: &str) -> Mock<'a> {
    let body = session_body(token, &future_date());
    server
        .mock_async(|when, then| {
            when.method(PUT).path(SESSION_CREATE_PATH);
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(body);
        })
        .await
}

/// Session create endpoint answering `status` with a raw `body`.
pub async fn mock_session_raw<'a>(server: &'a MockServer, status: u16, body: &str) -> Mock<'a> {
    let body = body.to_string();
    server
        .mock_async(|when, then| {
            when.method(PUT).path(SESSION_CREATE_PATH);
            then.status(status)
                .header("Content-Type", "application/json")
                .body(body);
        })
        .await
}
