use std::fmt;

/// Consumer/employee token pair used to create session tokens.
///
/// Immutable once built. `Debug` never prints the token values.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    consumer_token: String,
    employee_token: String,
    client_id: Option<i64>,
}

impl Credentials {
    /// `consumer_token` identifies the application, `employee_token` the company user.
    pub fn new(consumer_token: impl Into<String>, employee_token: impl Into<String>) -> Self {
        Self {
            consumer_token: consumer_token.into(),
            employee_token: employee_token.into(),
            client_id: None,
        }
    }

    /// Act on behalf of the accountant client `client_id`.
    ///
    /// Without this, requests always authenticate as username `0`. With it,
    /// `client_id` is sent as the Basic username instead of `0`, which is how
    /// Tripletex selects the client an accountant token acts for. Session
    /// token creation is unchanged.
    pub fn with_accountant_client(mut self, client_id: i64) -> Self {
        self.client_id = Some(client_id);
        self
    }

    pub fn consumer_token(&self) -> &str {
        &self.consumer_token
    }

    pub fn employee_token(&self) -> &str {
        &self.employee_token
    }

    pub fn client_id(&self) -> Option<i64> {
        self.client_id
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_token", &"***")
            .field("employee_token", &"***")
            .field("client_id", &self.client_id)
            .finish()
    }
}
