//! LWA token endpoint constants

/// Login with Amazon token endpoint for both grant types.
pub const TOKEN_ENDPOINT: &str = common::DEFAULT_TOKEN_ENDPOINT;

/// Default margin before expiry at which a cached token is refreshed.
pub const DEFAULT_REFRESH_SKEW_SECS: u64 = 60;

pub const GRANT_TYPE_REFRESH_TOKEN: &str = "refresh_token";

pub const GRANT_TYPE_CLIENT_CREDENTIALS: &str = "client_credentials";

/// Content type of token exchange requests.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
