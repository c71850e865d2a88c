//! Session token authentication.

pub mod credentials;
pub mod error;
pub mod session;
pub mod token;
pub mod token_manager;
pub mod token_store;

pub use credentials::Credentials;
pub use error::AuthError;
pub use token::Token;
pub use token_manager::{TokenManager, TokenSettings};
pub use token_store::FileTokenStore;
