//! Configuration error types

use thiserror::Error;

/// Errors raised while loading or validating client configuration.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    /// An endpoint setting that is not an http(s) URL
    #[error("{field} must start with http:// or https://, got: {value}")]
    InvalidEndpoint { field: String, value: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result alias using common Error
pub type Result<T> = std::result::Result<T, Error>;
