//! Error types for token acquisition

/// Errors from the LWA token exchange.
///
/// `Clone` so that a single failed exchange can be handed to every caller
/// that was waiting on it.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("token request failed: {0}")]
    Http(String),

    #[error("token endpoint returned {status}: {body}")]
    TokenEndpoint { status: u16, body: String },

    #[error("credentials rejected ({status}): {body}")]
    InvalidCredentials { status: u16, body: String },

    #[error("token endpoint rate limited ({status}): {body}")]
    RateLimited { status: u16, body: String },

    #[error("malformed token response: {0}")]
    MalformedResponse(String),

    #[error("invalid credentials configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Upstream HTTP status, when the token endpoint answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::TokenEndpoint { status, .. }
            | Error::InvalidCredentials { status, .. }
            | Error::RateLimited { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Upstream response body, when the token endpoint answered.
    pub fn body(&self) -> Option<&str> {
        match self {
            Error::TokenEndpoint { body, .. }
            | Error::InvalidCredentials { body, .. }
            | Error::RateLimited { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// Result alias for auth operations.
pub type Result<T> = std::result::Result<T, Error>;
