//! reqwest-backed transport
//!
//! Forwards a prepared request and returns the upstream response verbatim,
//! including error status codes. Error statuses are not transport failures;
//! only the absence of a response is.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tracing::{debug, warn};

use crate::{HttpRequest, HttpResponse, Result, Transport, TransportError};

/// Production transport over a shared `reqwest::Client`.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport with request and connect timeouts.
    ///
    /// Redirects are not followed; a 3xx is returned like any other status.
    pub fn new(timeout: Duration, connect_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| TransportError::Request(format!("building HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Wrap an existing client (shares its connection pool).
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    fn execute(
        &self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse>> + Send + '_>> {
        Box::pin(async move {
            let HttpRequest {
                method,
                url,
                headers,
                body,
            } = request;

            debug!(%method, %url, "sending request");

            let mut builder = self.client.request(method.clone(), &url).headers(headers);
            if let Some(body) = body {
                builder = builder.body(body);
            }

            let response = builder.send().await.map_err(|e| {
                warn!(%method, %url, error = %e, "request failed before a response arrived");
                classify(e)
            })?;

            let status = response.status().as_u16();
            let headers = response.headers().clone();
            let body = response
                .bytes()
                .await
                .map_err(|e| TransportError::Body(e.to_string()))?;

            debug!(%method, %url, status, bytes = body.len(), "received response");

            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        })
    }
}

fn classify(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout(error.to_string())
    } else if error.is_connect() {
        TransportError::Connect(error.to_string())
    } else {
        TransportError::Request(error.to_string())
    }
}
