//! `prometheus_query` tool

use super::result::{ToolError, ToolErrorKind, ValidationError};
use super::tool::{Tool, ToolExecutionContext, ToolMetadata, ToolSchema};
use crate::prometheus::{ErrorType, PrometheusClient, QueryDescriptor};
use async_trait::async_trait;
use serde_json::{Value, json};

/// Tool name as exposed over MCP
pub const PROMETHEUS_QUERY_TOOL: &str = "prometheus_query";

/// Runs PromQL through a [`PrometheusClient`] and returns the envelope
pub struct PrometheusQueryTool {
    metadata: ToolMetadata,
    client: PrometheusClient,
}

impl PrometheusQueryTool {
    pub fn new(client: PrometheusClient) -> Self {
        Self {
            metadata: ToolMetadata::new(
                PROMETHEUS_QUERY_TOOL,
                "Execute PromQL queries against Prometheus",
            )
            .with_returns("The Prometheus API response, or {status, error, errorType} on failure"),
            client,
        }
    }
}

#[async_trait]
impl Tool for PrometheusQueryTool {
    fn metadata(&self) -> &ToolMetadata {
        &self.metadata
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new(json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "PromQL expression" },
                "type": { "type": "string", "enum": ["instant", "range"] },
                "start": { "type": "string", "description": "Range start (RFC 3339 or unix timestamp)" },
                "end": { "type": "string", "description": "Range end (RFC 3339 or unix timestamp)" },
                "step": { "type": "string", "description": "Range step (duration or seconds)" }
            },
            "required": ["query", "type"]
        }))
    }

    async fn execute(&self, args: Value, ctx: &ToolExecutionContext) -> Result<Value, ToolError> {
        let descriptor: QueryDescriptor = serde_json::from_value(args).map_err(|e| {
            ToolError::validation(vec![ValidationError::new("arguments", e.to_string())])
        })?;

        let envelope = self.client.query(&descriptor).await;

        tracing::debug!(
            request_id = ?ctx.request_id,
            status = ?envelope.status(),
            error_type = ?envelope.error_type(),
            "Query finished"
        );

        let value = envelope
            .to_value()
            .map_err(|e| ToolError::internal(format!("Failed to serialize envelope: {}", e)))?;

        // A rejected descriptor fails the invocation; other failures are results
        if envelope.error_type() == Some(ErrorType::ValidationError) {
            let message = envelope.error_message().unwrap_or_default().to_string();
            return Err(ToolError::new(ToolErrorKind::Validation, message).with_context(value));
        }

        Ok(value)
    }
}
