//! Error taxonomy for API invocations
//!
//! Callers see one error type per operation regardless of which stage failed:
//! - `Auth`: the token exchange failed (nothing was sent to the API)
//! - `InvalidRequest`: the route could not be built (nothing was sent at all)
//! - `Service`: dispatch happened; see `ServiceErrorKind` for whether a
//!   response arrived and how it was classified
//!
//! `E` is the operation's declared error payload type.

use bytes::Bytes;
use transport::{HeaderMap, TransportError};

use crate::models::ErrorBody;

/// How a post-dispatch failure came about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceErrorKind {
    /// No response was received (timeout, connection failure, unreadable body)
    Transport,
    /// The status matched a non-2xx entry of the response table
    Status,
    /// The status matched no entry of the response table
    Unmapped,
    /// The status matched a 2xx entry but the body did not decode
    Decode,
}

/// A failure after the request was handed to the transport.
///
/// `status` and `body` are always the raw upstream values, even when decoding
/// the typed error payload failed.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ServiceError<E> {
    pub kind: ServiceErrorKind,
    pub status: Option<u16>,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub payload: Option<E>,
    pub message: String,
}

impl<E> ServiceError<E> {
    pub(crate) fn transport(error: TransportError) -> Self {
        Self {
            kind: ServiceErrorKind::Transport,
            status: None,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            payload: None,
            message: format!("no response received: {error}"),
        }
    }

    /// Raw body decoded lossily as UTF-8.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// A route that cannot be turned into a request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct RequestError(pub String);

/// Errors from `ServiceInvoker::invoke` and the operations built on it.
#[derive(Debug, thiserror::Error)]
pub enum Error<E = ErrorBody> {
    #[error(transparent)]
    Auth(#[from] smapi_auth::Error),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Service(ServiceError<E>),
}

impl<E> From<RequestError> for Error<E> {
    fn from(error: RequestError) -> Self {
        Error::InvalidRequest(error.0)
    }
}

impl<E> From<ServiceError<E>> for Error<E> {
    fn from(error: ServiceError<E>) -> Self {
        Error::Service(error)
    }
}

impl<E> Error<E> {
    /// Upstream HTTP status from the API or the token endpoint.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Auth(e) => e.status(),
            Error::InvalidRequest(_) => None,
            Error::Service(e) => e.status,
        }
    }

    /// Raw API response body, if a response was received.
    pub fn raw_body(&self) -> Option<&[u8]> {
        match self {
            Error::Service(e) if e.kind != ServiceErrorKind::Transport => Some(&e.body),
            _ => None,
        }
    }

    /// Decoded error payload declared for the response status.
    pub fn payload(&self) -> Option<&E> {
        match self {
            Error::Service(e) => e.payload.as_ref(),
            _ => None,
        }
    }

    pub fn kind(&self) -> Option<ServiceErrorKind> {
        match self {
            Error::Service(e) => Some(e.kind),
            _ => None,
        }
    }

    /// Whether the request failed without any response from the API.
    pub fn is_transport(&self) -> bool {
        self.kind() == Some(ServiceErrorKind::Transport)
    }
}

/// Result alias for API operations.
pub type Result<T, E = ErrorBody> = std::result::Result<T, Error<E>>;
