//! Configuration for the Prometheus backend connection
//!
//! Configuration is resolved once at startup and is immutable afterwards.
//! Sources, lowest priority first:
//! 1. Built-in defaults
//! 2. `promcp.toml` in the working directory
//! 3. The file named by `PROMCP_CONFIG_PATH` (or an explicit path)
//! 4. `PROMETHEUS_URL` / `PROMETHEUS_TIMEOUT` environment variables
//!
//! A bearer credential is read from `PROMETHEUS_AUTH_TOKEN` and is never
//! loaded from a file.

use crate::error::{PromcpError, Result};
use reqwest::header::{HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "promcp.toml";

/// Environment variable naming an additional config file
pub const CONFIG_PATH_ENV: &str = "PROMCP_CONFIG_PATH";

/// Environment variable holding the bearer credential
pub const AUTH_TOKEN_ENV: &str = "PROMETHEUS_AUTH_TOKEN";

/// Default backend base URL
pub const DEFAULT_URL: &str = "http://localhost:9090";

/// Default request timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

const REDACTED: &str = "<redacted>";

/// Prometheus backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrometheusConfig {
    /// Absolute base URL of the backend (no trailing slash after loading)
    pub url: String,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Extra request headers, merged over the defaults
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Bearer credential, injected as an `Authorization` header
    #[serde(skip)]
    pub auth_token: Option<String>,
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl Default for PrometheusConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            timeout: DEFAULT_TIMEOUT_MS,
            headers: BTreeMap::new(),
            auth_token: None,
        }
    }
}

impl PrometheusConfig {
    /// Create a configuration for the given base URL with default settings
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the timeout in milliseconds
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout = timeout_ms;
        self
    }

    /// Add an extra header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set the bearer credential
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Load configuration from files and environment variables.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if any source is malformed or the
    /// resolved configuration fails validation.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration, additionally merging an explicit config file.
    ///
    /// The explicit file must exist; the implicit ones are optional.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        use figment::{
            Figment,
            providers::{Env, Format, Serialized, Toml},
        };

        let mut figment = Figment::from(Serialized::defaults(PrometheusConfig::default()))
            .merge(Toml::file(DEFAULT_CONFIG_FILE));

        if let Ok(env_path) = std::env::var(CONFIG_PATH_ENV) {
            figment = figment.merge(Toml::file(env_path));
        }

        if let Some(path) = path {
            if !path.exists() {
                return Err(PromcpError::Configuration(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("PROMETHEUS_").only(&["url", "timeout"]));

        let mut config: PrometheusConfig = figment.extract().map_err(|e| {
            PromcpError::Configuration(format!("Failed to load configuration: {}", e))
        })?;

        config.auth_token = std::env::var(AUTH_TOKEN_ENV)
            .ok()
            .filter(|token| !token.is_empty());

        config.validate()?;
        config.url = config.url.trim_end_matches('/').to_string();
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not an absolute http(s) URL, the
    /// timeout is zero, or a header name/value is not valid HTTP.
    pub fn validate(&self) -> Result<()> {
        let parsed = reqwest::Url::parse(&self.url).map_err(|e| {
            PromcpError::Configuration(format!("Invalid Prometheus URL '{}': {}", self.url, e))
        })?;

        if !matches!(parsed.scheme(), "http" | "https") || parsed.cannot_be_a_base() {
            return Err(PromcpError::Configuration(format!(
                "Prometheus URL must be an absolute http(s) URL: {}",
                self.url
            )));
        }

        if self.timeout == 0 {
            return Err(PromcpError::Configuration(
                "Timeout must be a positive number of milliseconds".to_string(),
            ));
        }

        for (name, value) in self.resolved_headers() {
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                PromcpError::Configuration(format!("Invalid header name '{}': {}", name, e))
            })?;
            HeaderValue::from_str(&value).map_err(|e| {
                PromcpError::Configuration(format!("Invalid value for header '{}': {}", name, e))
            })?;
        }

        Ok(())
    }

    /// Timeout as a `Duration`
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_millis(self.timeout)
    }

    /// Headers sent with every request.
    ///
    /// `Accept: application/json` is the base, the bearer credential is
    /// layered on top, and configured headers override both.
    pub fn resolved_headers(&self) -> BTreeMap<String, String> {
        let mut headers = BTreeMap::new();
        headers.insert("Accept".to_string(), "application/json".to_string());

        if let Some(ref token) = self.auth_token {
            headers.insert("Authorization".to_string(), format!("Bearer {}", token));
        }

        for (name, value) in &self.headers {
            // Header names are case-insensitive; drop a differently-cased default
            headers.retain(|existing, _| !existing.eq_ignore_ascii_case(name));
            headers.insert(name.clone(), value.clone());
        }

        headers
    }

    /// Resolved headers with credential values masked, for logging
    pub fn redacted_headers(&self) -> BTreeMap<String, String> {
        redact_headers(&self.resolved_headers())
    }
}

/// Mask credential-bearing header values
pub fn redact_headers(headers: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    headers
        .iter()
        .map(|(name, value)| {
            if is_sensitive_header(name) {
                (name.clone(), REDACTED.to_string())
            } else {
                (name.clone(), value.clone())
            }
        })
        .collect()
}

fn is_sensitive_header(name: &str) -> bool {
    name.eq_ignore_ascii_case("authorization")
        || name.eq_ignore_ascii_case("proxy-authorization")
        || name.eq_ignore_ascii_case("cookie")
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults() {
        Jail::expect_with(|_jail| {
            let config = PrometheusConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.url, DEFAULT_URL);
            assert_eq!(config.timeout, DEFAULT_TIMEOUT_MS);
            assert!(config.auth_token.is_none());
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides() {
        Jail::expect_with(|jail| {
            jail.set_env("PROMETHEUS_URL", "http://prom.internal:9090/");
            jail.set_env("PROMETHEUS_TIMEOUT", "5000");
            jail.set_env("PROMETHEUS_AUTH_TOKEN", "s3cret");

            let config = PrometheusConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.url, "http://prom.internal:9090");
            assert_eq!(config.timeout, 5000);
            assert_eq!(config.timeout_duration(), Duration::from_millis(5000));

            let headers = config.resolved_headers();
            assert_eq!(headers["Authorization"], "Bearer s3cret");
            assert_eq!(headers["Accept"], "application/json");
            assert_eq!(config.redacted_headers()["Authorization"], REDACTED);
            Ok(())
        });
    }

    #[test]
    fn test_toml_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                DEFAULT_CONFIG_FILE,
                r#"
                url = "https://metrics.example.com"
                timeout = 1500

                [headers]
                X-Scope-OrgID = "tenant-a"
                "#,
            )?;

            let config = PrometheusConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.url, "https://metrics.example.com");
            assert_eq!(config.timeout, 1500);
            assert_eq!(config.resolved_headers()["X-Scope-OrgID"], "tenant-a");
            Ok(())
        });
    }

    #[test]
    fn test_env_beats_file() {
        Jail::expect_with(|jail| {
            jail.create_file(DEFAULT_CONFIG_FILE, r#"url = "http://from-file:9090""#)?;
            jail.set_env("PROMETHEUS_URL", "http://from-env:9090");

            let config = PrometheusConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.url, "http://from-env:9090");
            Ok(())
        });
    }

    #[test]
    fn test_rejects_relative_url() {
        Jail::expect_with(|jail| {
            jail.set_env("PROMETHEUS_URL", "localhost/prometheus");
            assert!(PrometheusConfig::load().is_err());
            Ok(())
        });
    }

    #[test]
    fn test_rejects_zero_timeout() {
        Jail::expect_with(|jail| {
            jail.set_env("PROMETHEUS_TIMEOUT", "0");
            let err = PrometheusConfig::load().unwrap_err();
            assert!(err.to_string().contains("Timeout"));
            Ok(())
        });
    }

    #[test]
    fn test_missing_explicit_file() {
        Jail::expect_with(|_jail| {
            let err = PrometheusConfig::load_from(Some(Path::new("nope.toml"))).unwrap_err();
            assert!(matches!(err, PromcpError::Configuration(_)));
            Ok(())
        });
    }

    #[test]
    fn test_configured_header_overrides_default() {
        let config = PrometheusConfig::new("http://localhost:9090")
            .with_auth_token("abc")
            .with_header("accept", "application/vnd.custom+json");

        let headers = config.resolved_headers();
        assert_eq!(headers.len(), 2);
        assert_eq!(headers["accept"], "application/vnd.custom+json");
        assert_eq!(headers["Authorization"], "Bearer abc");
    }

    #[test]
    fn test_invalid_header_value() {
        let config = PrometheusConfig::new("http://localhost:9090").with_header("X-Bad", "line\nbreak");
        assert!(config.validate().is_err());
    }
}
