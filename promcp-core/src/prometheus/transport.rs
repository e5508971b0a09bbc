//! HTTP transport to the Prometheus backend
//!
//! The transport performs exactly one GET per request and hands every HTTP
//! status back to the caller; it never turns a status code into an error.

use super::types::BackendRequest;
use crate::config::{PrometheusConfig, redact_headers};
use crate::error::{PromcpError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::collections::BTreeMap;
use std::time::Duration;

/// Raw HTTP reply from the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    /// HTTP status code
    pub status: u16,
    /// Canonical reason phrase for the status
    pub reason: String,
    /// Response body
    pub body: String,
}

impl HttpReply {
    /// Create a reply, filling in the canonical reason phrase
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        let reason = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|code| code.canonical_reason())
            .unwrap_or_default()
            .to_string();

        Self {
            status,
            reason,
            body: body.into(),
        }
    }

    /// Create a 200 reply with a JSON body
    pub fn ok_json(body: &serde_json::Value) -> Self {
        Self::new(200, body.to_string())
    }
}

/// Transport failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Connection, DNS, TLS, timeout or body-read failure
    #[error("{0}")]
    Network(String),

    /// Any other failure (e.g. a request that could not be built)
    #[error("{0}")]
    Other(String),
}

/// Seam between the query adapter and the network
#[async_trait]
pub trait QueryTransport: Send + Sync {
    /// Issue one GET for `request`
    async fn get(&self, request: &BackendRequest) -> std::result::Result<HttpReply, TransportError>;
}

/// `reqwest`-backed transport
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    logged_headers: BTreeMap<String, String>,
}

impl std::fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("headers", &self.logged_headers)
            .finish()
    }
}

impl ReqwestTransport {
    /// Build a transport from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a header is not valid HTTP or the
    /// client cannot be constructed.
    pub fn new(config: &PrometheusConfig) -> Result<Self> {
        let resolved = config.resolved_headers();

        let mut headers = HeaderMap::new();
        for (name, value) in &resolved {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                PromcpError::Configuration(format!("Invalid header name '{}': {}", name, e))
            })?;
            let mut header_value = HeaderValue::from_str(value).map_err(|e| {
                PromcpError::Configuration(format!("Invalid value for header '{}': {}", name, e))
            })?;
            if header_name == reqwest::header::AUTHORIZATION {
                header_value.set_sensitive(true);
            }
            headers.insert(header_name, header_value);
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout_duration())
            .default_headers(headers)
            .build()
            .map_err(|e| {
                PromcpError::Configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            timeout: config.timeout_duration(),
            logged_headers: redact_headers(&resolved),
        })
    }

    /// Backend base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl QueryTransport for ReqwestTransport {
    async fn get(&self, request: &BackendRequest) -> std::result::Result<HttpReply, TransportError> {
        let url = request.url(&self.base_url);

        tracing::debug!(
            url = %url,
            params = ?request.params,
            timeout_ms = self.timeout.as_millis() as u64,
            headers = ?self.logged_headers,
            "Making request to Prometheus"
        );

        let response = self
            .client
            .get(&url)
            .query(&request.params)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        let body = response.text().await.map_err(classify)?;

        tracing::debug!(
            status = status.as_u16(),
            reason = status.canonical_reason().unwrap_or_default(),
            body_len = body.len(),
            "Response received"
        );

        Ok(HttpReply {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        })
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    tracing::error!(
        error = %err,
        url = ?err.url().map(|u| u.as_str()),
        timeout = err.is_timeout(),
        connect = err.is_connect(),
        "Request to Prometheus failed"
    );

    if err.is_builder() {
        TransportError::Other(err.to_string())
    } else {
        TransportError::Network(err.to_string())
    }
}
