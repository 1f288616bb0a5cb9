//! Client configuration types and loading
//!
//! Precedence: env vars > config file > defaults. Only endpoints, timeouts and
//! the refresh skew live here; OAuth credentials are supplied by the caller
//! and never read from this file.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Default Skill Management API base URL.
pub const DEFAULT_API_ENDPOINT: &str = "https://api.amazonalexa.com";

/// Default Login with Amazon token endpoint.
pub const DEFAULT_TOKEN_ENDPOINT: &str = "https://api.amazon.com/auth/o2/token";

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub transport: TransportConfig,
}

/// API endpoint settings
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_endpoint")]
    pub endpoint: String,
    /// Appended to the default `User-Agent` value when set
    #[serde(default)]
    pub user_agent: Option<String>,
}

/// Token endpoint settings
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_token_endpoint")]
    pub token_endpoint: String,
    /// Seconds before expiry at which a cached token is treated as expired
    #[serde(default = "default_refresh_skew")]
    pub refresh_skew_secs: u64,
}

/// HTTP transport settings
#[derive(Debug, Clone, Deserialize)]
pub struct TransportConfig {
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_api_endpoint() -> String {
    DEFAULT_API_ENDPOINT.to_string()
}

fn default_token_endpoint() -> String {
    DEFAULT_TOKEN_ENDPOINT.to_string()
}

fn default_refresh_skew() -> u64 {
    60
}

fn default_timeout() -> u64 {
    60
}

fn default_connect_timeout() -> u64 {
    10
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_api_endpoint(),
            user_agent: None,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_endpoint: default_token_endpoint(),
            refresh_skew_secs: default_refresh_skew(),
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl AuthConfig {
    pub fn refresh_skew(&self) -> Duration {
        Duration::from_secs(self.refresh_skew_secs)
    }
}

impl TransportConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl ClientConfig {
    /// Load configuration from a TOML file, then overlay environment variables.
    ///
    /// `SMAPI_ENDPOINT` replaces `api.endpoint` and `SMAPI_TOKEN_ENDPOINT`
    /// replaces `auth.token_endpoint`.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: ClientConfig = toml::from_str(&contents)?;

        if let Ok(endpoint) = std::env::var("SMAPI_ENDPOINT") {
            config.api.endpoint = endpoint;
        }
        if let Ok(endpoint) = std::env::var("SMAPI_TOKEN_ENDPOINT") {
            config.auth.token_endpoint = endpoint;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check endpoint schemes and non-zero timeouts.
    pub fn validate(&self) -> Result<()> {
        require_http_url("api.endpoint", &self.api.endpoint)?;
        require_http_url("auth.token_endpoint", &self.auth.token_endpoint)?;

        if self.transport.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be greater than 0".into()));
        }
        if self.transport.connect_timeout_secs == 0 {
            return Err(Error::Config(
                "connect_timeout_secs must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Resolve config file path from CLI arg or SMAPI_CONFIG env var.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("SMAPI_CONFIG") {
            return PathBuf::from(p);
        }
        PathBuf::from("smapi.toml")
    }
}

fn require_http_url(field: &str, value: &str) -> Result<()> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(Error::InvalidEndpoint {
            field: field.to_string(),
            value: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Serializes tests that mutate environment variables.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// SAFETY: Callers must hold ENV_MUTEX to prevent concurrent env mutation.
    unsafe fn set_env(key: &str, val: &str) {
        unsafe { std::env::set_var(key, val) };
    }

    unsafe fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) };
    }

    fn write_config(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("smapi.toml");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn empty_file_uses_defaults() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe {
            remove_env("SMAPI_ENDPOINT");
            remove_env("SMAPI_TOKEN_ENDPOINT");
        }
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "");

        let config = ClientConfig::load(&path).unwrap();
        assert_eq!(config.api.endpoint, DEFAULT_API_ENDPOINT);
        assert_eq!(config.auth.token_endpoint, DEFAULT_TOKEN_ENDPOINT);
        assert_eq!(config.auth.refresh_skew(), Duration::from_secs(60));
        assert_eq!(config.transport.timeout(), Duration::from_secs(60));
        assert_eq!(config.transport.connect_timeout(), Duration::from_secs(10));
        assert!(config.api.user_agent.is_none());
    }

    #[test]
    fn explicit_values_override_defaults() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe {
            remove_env("SMAPI_ENDPOINT");
            remove_env("SMAPI_TOKEN_ENDPOINT");
        }
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"
[api]
endpoint = "https://api.eu.amazonalexa.com"
user_agent = "skill-deployer/1.2"

[auth]
refresh_skew_secs = 30

[transport]
timeout_secs = 15
"#,
        );

        let config = ClientConfig::load(&path).unwrap();
        assert_eq!(config.api.endpoint, "https://api.eu.amazonalexa.com");
        assert_eq!(config.api.user_agent.as_deref(), Some("skill-deployer/1.2"));
        assert_eq!(config.auth.refresh_skew_secs, 30);
        assert_eq!(config.transport.timeout_secs, 15);
        assert_eq!(config.transport.connect_timeout_secs, 10);
    }

    #[test]
    fn env_overrides_endpoints() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "[api]\nendpoint = \"https://from-file.example\"\n");

        unsafe {
            set_env("SMAPI_ENDPOINT", "http://127.0.0.1:9000");
            set_env("SMAPI_TOKEN_ENDPOINT", "http://127.0.0.1:9001/auth/o2/token");
        }
        let result = ClientConfig::load(&path);
        unsafe {
            remove_env("SMAPI_ENDPOINT");
            remove_env("SMAPI_TOKEN_ENDPOINT");
        }

        let config = result.unwrap();
        assert_eq!(config.api.endpoint, "http://127.0.0.1:9000");
        assert_eq!(
            config.auth.token_endpoint,
            "http://127.0.0.1:9001/auth/o2/token"
        );
    }

    #[test]
    fn rejects_non_http_endpoint() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe {
            remove_env("SMAPI_ENDPOINT");
            remove_env("SMAPI_TOKEN_ENDPOINT");
        }
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "[auth]\ntoken_endpoint = \"ftp://api.amazon.com\"\n");

        let err = ClientConfig::load(&path).unwrap_err();
        assert!(
            matches!(&err, Error::InvalidEndpoint { field, value }
                if field == "auth.token_endpoint" && value == "ftp://api.amazon.com"),
            "got: {err}"
        );
    }

    #[test]
    fn rejects_zero_timeout() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe {
            remove_env("SMAPI_ENDPOINT");
            remove_env("SMAPI_TOKEN_ENDPOINT");
        }
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "[transport]\ntimeout_secs = 0\n");

        let err = ClientConfig::load(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = ClientConfig::load(Path::new("/nonexistent/smapi.toml")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn resolve_path_prefers_cli_arg() {
        let path = ClientConfig::resolve_path(Some("/etc/smapi/custom.toml"));
        assert_eq!(path, PathBuf::from("/etc/smapi/custom.toml"));
    }
}
