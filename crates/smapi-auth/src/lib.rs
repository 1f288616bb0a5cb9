//! Login with Amazon (LWA) token management for the Skill Management API
//!
//! Exchanges client credentials for bearer tokens and caches them per
//! credential set. The exchange runs over the injected `Transport`, so this
//! crate has no opinion about the HTTP stack.
//!
//! Token flow:
//! 1. Caller builds `Credentials` with a `Grant` (refresh token or client credentials)
//! 2. `TokenProvider::access_token()` returns the cached token while it is
//!    outside the refresh skew
//! 3. Otherwise exactly one caller runs `token::exchange()`; concurrent callers
//!    wait for it and share the outcome
//! 4. `AccessToken::authorization_header()` renders the `Bearer` header value

pub mod constants;
pub mod credentials;
pub mod error;
pub mod provider;
pub mod token;

pub use constants::*;
pub use credentials::{Credentials, Grant};
pub use error::{Error, Result};
pub use provider::TokenProvider;
pub use token::{AccessToken, TokenResponse, exchange};
