//! Status-driven response dispatch
//!
//! Each operation declares an ordered table of `(status, typed?, description)`
//! entries. Resolution scans the table in order and uses the first entry whose
//! status equals the actual status:
//!
//! - 2xx entry, typed: body decoded into the success type
//! - 2xx entry, untyped (202/204): empty payload, body ignored
//! - non-2xx entry: `ServiceError` of kind `Status`, with the body decoded into
//!   the error type when the entry is typed and decoding succeeds
//! - no entry: `ServiceError` of kind `Unmapped`
//!
//! Raw status and raw body are preserved on every failure path.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use tracing::debug;
use transport::{HeaderMap, HttpResponse, header};

use crate::error::{Error, RequestError, ServiceError, ServiceErrorKind};

/// One documented outcome of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseEntry {
    pub status: u16,
    /// Whether the body for this status carries a payload to decode
    pub typed: bool,
    pub description: &'static str,
}

impl ResponseEntry {
    pub const fn typed(status: u16, description: &'static str) -> Self {
        Self {
            status,
            typed: true,
            description,
        }
    }

    pub const fn empty(status: u16, description: &'static str) -> Self {
        Self {
            status,
            typed: false,
            description,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Ordered response entries for one operation.
pub type ResponseTable = [ResponseEntry];

/// A successful API call.
#[derive(Debug, Clone)]
pub struct InvocationResult<T> {
    pub status: u16,
    pub headers: HeaderMap,
    /// Decoded body, `None` for untyped entries or empty bodies
    pub payload: Option<T>,
    pub body: Bytes,
}

impl<T> InvocationResult<T> {
    pub fn into_payload(self) -> Option<T> {
        self.payload
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Entity tag for a later conditional update.
    pub fn etag(&self) -> Option<&str> {
        self.headers
            .get(header::ETAG)
            .and_then(|v| v.to_str().ok())
    }
}

/// Reject tables that cannot describe a successful call.
pub fn check_table(table: &ResponseTable) -> Result<(), RequestError> {
    if table.iter().any(ResponseEntry::is_success) {
        Ok(())
    } else {
        Err(RequestError(
            "response table declares no success status".into(),
        ))
    }
}

/// Resolve a raw response against `table`.
pub fn resolve<T, E>(
    response: HttpResponse,
    table: &ResponseTable,
) -> Result<InvocationResult<T>, Error<E>>
where
    T: DeserializeOwned,
    E: DeserializeOwned,
{
    let HttpResponse {
        status,
        headers,
        body,
    } = response;

    let Some(entry) = table.iter().find(|entry| entry.status == status) else {
        debug!(status, "status not declared by operation");
        return Err(Error::Service(ServiceError {
            kind: ServiceErrorKind::Unmapped,
            status: Some(status),
            headers,
            body,
            payload: None,
            message: format!("unexpected status {status} from service"),
        }));
    };

    let has_body = !body.trim_ascii().is_empty();

    if entry.is_success() {
        let payload = if entry.typed && has_body {
            match serde_json::from_slice::<T>(&body) {
                Ok(payload) => Some(payload),
                Err(e) => {
                    return Err(Error::Service(ServiceError {
                        kind: ServiceErrorKind::Decode,
                        status: Some(status),
                        headers,
                        body,
                        payload: None,
                        message: format!("failed to decode {status} response body: {e}"),
                    }));
                }
            }
        } else {
            None
        };
        return Ok(InvocationResult {
            status,
            headers,
            payload,
            body,
        });
    }

    let payload = if entry.typed && has_body {
        serde_json::from_slice::<E>(&body)
            .inspect_err(|e| debug!(status, error = %e, "error body did not match declared type"))
            .ok()
    } else {
        None
    };

    Err(Error::Service(ServiceError {
        kind: ServiceErrorKind::Status,
        status: Some(status),
        headers,
        body,
        payload,
        message: format!("service returned {status}: {}", entry.description),
    }))
}
