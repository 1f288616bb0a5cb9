//! LWA token exchange
//!
//! Both grant types POST a form to the token endpoint and receive the same
//! JSON shape back. `expires_in` is a delta in seconds; it is converted to an
//! absolute monotonic instant at the moment the response arrives.

use std::time::Duration;

use common::Secret;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, instrument, warn};
use transport::{HeaderValue, HttpRequest, Method, Transport, header};

use crate::constants::FORM_CONTENT_TYPE;
use crate::credentials::Credentials;
use crate::error::{Error, Result};

/// Response body from the token endpoint.
#[derive(Deserialize, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Seconds until the access token expires (delta, not absolute)
    pub expires_in: u64,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    /// Present on refresh responses; credentials are immutable so it is not stored
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl std::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .field("token_type", &self.token_type)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// A bearer token with its absolute expiry.
///
/// The token string never leaves this type except as an `Authorization`
/// header value.
#[derive(Debug, Clone)]
pub struct AccessToken {
    value: Secret<String>,
    expires_at: Instant,
    /// Validity window as issued; caps the refresh skew for short-lived tokens
    lifetime: Duration,
    scope: Option<String>,
}

impl AccessToken {
    /// Token valid from now until `expires_at`.
    pub fn new(value: impl Into<Secret<String>>, expires_at: Instant, scope: Option<String>) -> Self {
        Self {
            value: value.into(),
            expires_at,
            lifetime: expires_at.saturating_duration_since(Instant::now()),
            scope,
        }
    }

    fn from_response(response: TokenResponse, received_at: Instant) -> Self {
        let lifetime = Duration::from_secs(response.expires_in);
        Self {
            value: response.access_token.into(),
            expires_at: received_at + lifetime,
            lifetime,
            scope: response.scope,
        }
    }

    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// The skew actually applied: `skew`, capped at half the token's lifetime.
    pub fn effective_skew(&self, skew: Duration) -> Duration {
        skew.min(self.lifetime / 2)
    }

    /// Whether the token may still be handed out at `now`.
    ///
    /// A token is withdrawn `effective_skew` before it expires, so one issued
    /// with a lifetime shorter than `skew` is still reused for the first half
    /// of that lifetime.
    pub fn is_usable_at(&self, now: Instant, skew: Duration) -> bool {
        now + self.effective_skew(skew) < self.expires_at
    }

    /// `Bearer <token>` header value, marked sensitive.
    pub fn authorization_header(&self) -> Result<HeaderValue> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", self.value.expose()))
            .map_err(|e| Error::MalformedResponse(format!("access token is not a valid header: {e}")))?;
        value.set_sensitive(true);
        Ok(value)
    }
}

/// Perform one token exchange against `endpoint`.
///
/// 400/401/403 mean the client or grant was rejected, 429 means the endpoint
/// is throttling us; neither is retried here.
#[instrument(skip_all, fields(client_id = %credentials.client_id(), grant_type = credentials.grant().grant_type()))]
pub async fn exchange(
    transport: &dyn Transport,
    endpoint: &str,
    credentials: &Credentials,
) -> Result<AccessToken> {
    let mut request = HttpRequest::new(Method::POST, endpoint);
    request.headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
    request.headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
    request.body = Some(credentials.form_body().into_bytes());

    let response = transport
        .execute(request)
        .await
        .map_err(|e| Error::Http(e.to_string()))?;
    let received_at = Instant::now();

    if !response.is_success() {
        let status = response.status;
        let body = response.body_text();
        warn!(status, "token endpoint rejected exchange");
        return Err(match status {
            429 => Error::RateLimited { status, body },
            400 | 401 | 403 => Error::InvalidCredentials { status, body },
            _ => Error::TokenEndpoint { status, body },
        });
    }

    let parsed: TokenResponse = serde_json::from_slice(&response.body)
        .map_err(|e| Error::MalformedResponse(format!("invalid token response: {e}")))?;
    if parsed.access_token.is_empty() {
        return Err(Error::MalformedResponse("empty access_token".into()));
    }
    if parsed.expires_in == 0 {
        return Err(Error::MalformedResponse("token expires_in is 0".into()));
    }

    debug!(expires_in = parsed.expires_in, "token exchange succeeded");
    Ok(AccessToken::from_response(parsed, received_at))
}
