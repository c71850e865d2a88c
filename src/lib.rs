//! # Tripletex client core
//!
//! Session token handling and field selection for the Tripletex REST API.
//!
//! Modules:
//! - `auth`: credentials, session token lifecycle and request authentication
//! - `fields`: builder for the `fields` query parameter
//! - `client`: authenticated request helpers on top of `auth`
//! - `config`: YAML configuration for the command line tool

pub mod auth;
pub mod client;
pub mod config;
pub mod fields;
pub mod helpers;
pub mod observability;
pub mod resilience;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::auth::{AuthError, Credentials, Token, TokenManager};
pub use crate::client::{ClientError, ClientOptions, TripletexClient};
pub use crate::fields::{Fields, FieldsBuilder, Member};
