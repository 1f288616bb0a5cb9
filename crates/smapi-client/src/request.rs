//! Turns a `RouteDescriptor` into a transport-ready request
//!
//! Building is split in two so that a malformed route is rejected before any
//! network traffic, including the token exchange: `prepare` does everything
//! except authentication, `PreparedRequest::authorize` adds the bearer token.

use serde::Serialize;
use smapi_auth::AccessToken;
use transport::{HeaderName, HeaderValue, HttpRequest, header};
use tracing::warn;

use crate::error::RequestError;
use crate::route::RouteDescriptor;

/// Default `User-Agent` for every API request.
pub const USER_AGENT: &str = concat!("smapi-client-rust/", env!("CARGO_PKG_VERSION"));

const JSON: &str = "application/json";

#[derive(Debug, Clone)]
pub struct RequestBuilder {
    base_url: String,
    user_agent: String,
}

/// A fully resolved request still missing its `Authorization` header.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    request: HttpRequest,
}

impl RequestBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            user_agent: USER_AGENT.to_string(),
        }
    }

    /// Append a caller identifier to the default user agent.
    pub fn with_user_agent_suffix(mut self, suffix: &str) -> Self {
        if !suffix.trim().is_empty() {
            self.user_agent = format!("{USER_AGENT} {}", suffix.trim());
        }
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Resolve path, query, headers and body. No I/O.
    pub fn prepare<B: Serialize>(
        &self,
        mut route: RouteDescriptor<B>,
    ) -> Result<PreparedRequest, RequestError> {
        let path = route.resolve_path()?;

        let mut url = url::Url::parse(&format!("{}{}", self.base_url.trim_end_matches('/'), path))
            .map_err(|e| RequestError(format!("invalid request URL for `{path}`: {e}")))?;
        let pairs = route.query_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }

        let mut request = HttpRequest::new(route.method().clone(), String::from(url));

        for (name, value) in route.headers() {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| RequestError(format!("invalid header name `{name}`: {e}")))?;
            if header_name == header::AUTHORIZATION {
                warn!(header = %name, "ignoring caller-supplied authorization header");
                continue;
            }
            let header_value = HeaderValue::from_str(value)
                .map_err(|e| RequestError(format!("invalid value for header `{name}`: {e}")))?;
            request.headers.insert(header_name, header_value);
        }

        request.headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(JSON));
        request.headers.insert(header::ACCEPT, HeaderValue::from_static(JSON));
        request.headers.insert(
            header::USER_AGENT,
            HeaderValue::from_str(&self.user_agent)
                .map_err(|e| RequestError(format!("invalid user agent: {e}")))?,
        );

        if let Some(body) = route.take_body() {
            let encoded = serde_json::to_vec(&body)
                .map_err(|e| RequestError(format!("failed to encode request body: {e}")))?;
            request.body = Some(encoded);
        }

        Ok(PreparedRequest { request })
    }

    /// `prepare` followed by `authorize`.
    pub fn build<B: Serialize>(
        &self,
        route: RouteDescriptor<B>,
        token: &AccessToken,
    ) -> Result<HttpRequest, RequestError> {
        self.prepare(route)?.authorize(token)
    }
}

impl PreparedRequest {
    pub fn request(&self) -> &HttpRequest {
        &self.request
    }

    /// Attach `Authorization: Bearer <token>`.
    pub fn authorize(mut self, token: &AccessToken) -> Result<HttpRequest, RequestError> {
        let value = token
            .authorization_header()
            .map_err(|e| RequestError(e.to_string()))?;
        self.request.headers.insert(header::AUTHORIZATION, value);
        Ok(self.request)
    }
}
