//! Wire types of `PUT /token/session/:create`.

use serde::{Deserialize, Serialize};

use crate::client::response::ResponseWrapper;

pub const SESSION_CREATE_PATH: &str = "/token/session/:create";

/// Query string of the create call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateSessionQuery<'a> {
    pub consumer_token: &'a str,
    pub employee_token: &'a str,
    /// `YYYY-MM-DD`
    pub expiration_date: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SessionToken {
    pub token: Option<String>,
    pub expiration_date: Option<String>,
}

pub(crate) type SessionTokenResponse = ResponseWrapper<SessionToken>;
