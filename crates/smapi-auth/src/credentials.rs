//! LWA client credentials and grant parameters
//!
//! A `Credentials` value is immutable once built. Each distinct
//! credentials + grant pair gets its own `TokenProvider` and therefore its own
//! cached token.

use common::Secret;

use crate::constants::{GRANT_TYPE_CLIENT_CREDENTIALS, GRANT_TYPE_REFRESH_TOKEN};
use crate::error::{Error, Result};

/// OAuth2 grant used to obtain access tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Grant {
    /// Exchange a long-lived refresh token (user-delegated access)
    RefreshToken(Secret<String>),
    /// Service-to-service access for a fixed scope, e.g. `alexa::ask:skills:readwrite`
    ClientCredentials { scope: String },
}

impl Grant {
    /// Value of the `grant_type` form parameter.
    pub fn grant_type(&self) -> &'static str {
        match self {
            Grant::RefreshToken(_) => GRANT_TYPE_REFRESH_TOKEN,
            Grant::ClientCredentials { .. } => GRANT_TYPE_CLIENT_CREDENTIALS,
        }
    }
}

/// Client identity plus grant parameters for the LWA token endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    client_id: String,
    client_secret: Secret<String>,
    grant: Grant,
}

impl Credentials {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<Secret<String>>,
        grant: Grant,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            grant,
        }
    }

    /// Credentials for the `refresh_token` grant.
    pub fn refresh_token(
        client_id: impl Into<String>,
        client_secret: impl Into<Secret<String>>,
        refresh_token: impl Into<Secret<String>>,
    ) -> Self {
        Self::new(
            client_id,
            client_secret,
            Grant::RefreshToken(refresh_token.into()),
        )
    }

    /// Credentials for the `client_credentials` grant.
    pub fn client_credentials(
        client_id: impl Into<String>,
        client_secret: impl Into<Secret<String>>,
        scope: impl Into<String>,
    ) -> Self {
        Self::new(
            client_id,
            client_secret,
            Grant::ClientCredentials {
                scope: scope.into(),
            },
        )
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn grant(&self) -> &Grant {
        &self.grant
    }

    /// Reject empty identifiers and grant parameters before any exchange.
    pub fn validate(&self) -> Result<()> {
        if self.client_id.trim().is_empty() {
            return Err(Error::InvalidConfig("client_id is empty".into()));
        }
        if self.client_secret.is_empty() {
            return Err(Error::InvalidConfig("client_secret is empty".into()));
        }
        match &self.grant {
            Grant::RefreshToken(token) if token.is_empty() => {
                Err(Error::InvalidConfig("refresh_token is empty".into()))
            }
            Grant::ClientCredentials { scope } if scope.trim().is_empty() => Err(
                Error::InvalidConfig("client_credentials grant requires a scope".into()),
            ),
            _ => Ok(()),
        }
    }

    /// Form body for the token endpoint, parameters in a stable order.
    pub(crate) fn form_body(&self) -> String {
        let mut form = url::form_urlencoded::Serializer::new(String::new());
        form.append_pair("grant_type", self.grant.grant_type());
        match &self.grant {
            Grant::RefreshToken(token) => {
                form.append_pair("refresh_token", token.expose());
            }
            Grant::ClientCredentials { scope } => {
                form.append_pair("scope", scope);
            }
        }
        form.append_pair("client_id", &self.client_id);
        form.append_pair("client_secret", self.client_secret.expose());
        form.finish()
    }
}
