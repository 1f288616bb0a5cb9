//! Shared types for the SMAPI client workspace
//!
//! Holds the pieces every other crate leans on: the `Secret` wrapper that
//! keeps OAuth material out of logs, the client configuration file, and the
//! error type for loading it.

mod config;
mod error;
mod secret;

pub use config::{
    ApiConfig, AuthConfig, ClientConfig, DEFAULT_API_ENDPOINT, DEFAULT_TOKEN_ENDPOINT,
    TransportConfig,
};
pub use error::{Error, Result};
pub use secret::Secret;
