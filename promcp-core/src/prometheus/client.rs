//! Prometheus query adapter

use super::transport::{HttpReply, QueryTransport, ReqwestTransport, TransportError};
use super::types::{BackendRequest, ErrorType, QueryDescriptor, QueryEnvelope};
use crate::config::PrometheusConfig;
use crate::error::Result;
use serde_json::Value;
use std::sync::Arc;

/// Translates query descriptors into backend calls and normalizes the outcome.
///
/// Holds no mutable state; concurrent calls are independent.
#[derive(Clone)]
pub struct PrometheusClient {
    transport: Arc<dyn QueryTransport>,
}

impl std::fmt::Debug for PrometheusClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrometheusClient").finish_non_exhaustive()
    }
}

impl PrometheusClient {
    /// Create a client talking HTTP to the configured backend.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be built.
    pub fn new(config: &PrometheusConfig) -> Result<Self> {
        tracing::info!(
            url = %config.url,
            timeout_ms = config.timeout,
            headers = ?config.redacted_headers(),
            "Initializing Prometheus client"
        );

        let transport = ReqwestTransport::new(config)?;
        Ok(Self::with_transport(Arc::new(transport)))
    }

    /// Create a client over any transport
    pub fn with_transport(transport: Arc<dyn QueryTransport>) -> Self {
        Self { transport }
    }

    /// Run a query and return exactly one envelope.
    ///
    /// Range queries missing a bound fail with `validation_error` before
    /// any request is sent. Transport failures become `network_error`;
    /// HTTP statuses >= 400 and unparseable bodies become `unknown`.
    pub async fn query(&self, descriptor: &QueryDescriptor) -> QueryEnvelope {
        tracing::debug!(
            query = %descriptor.query,
            query_type = %descriptor.query_type,
            start = ?descriptor.start,
            end = ?descriptor.end,
            step = ?descriptor.step,
            "Query params received"
        );

        let request = match BackendRequest::from_descriptor(descriptor) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(error = %e, missing = ?e.missing, "Rejected query descriptor");
                return QueryEnvelope::failure(ErrorType::ValidationError, e.to_string());
            }
        };

        match self.transport.get(&request).await {
            Ok(reply) => normalize(reply),
            Err(TransportError::Network(message)) => QueryEnvelope::failure(
                ErrorType::NetworkError,
                format!("Network error: {}", message),
            ),
            Err(TransportError::Other(message)) => {
                QueryEnvelope::failure(ErrorType::Unknown, message)
            }
        }
    }
}

fn normalize(reply: HttpReply) -> QueryEnvelope {
    if reply.status >= 400 {
        tracing::error!(
            status = reply.status,
            reason = %reply.reason,
            body = %reply.body,
            "Prometheus returned an error status"
        );
        return QueryEnvelope::failure(
            ErrorType::Unknown,
            format!("HTTP {}: {}", reply.status, reply.reason),
        );
    }

    match serde_json::from_str::<Value>(&reply.body) {
        Ok(body) => QueryEnvelope::Forwarded(body),
        Err(e) => {
            tracing::error!(error = %e, body = %reply.body, "Unparseable Prometheus response");
            QueryEnvelope::failure(
                ErrorType::Unknown,
                format!("Failed to parse Prometheus response: {}", e),
            )
        }
    }
}
