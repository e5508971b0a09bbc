//! Tests for the tools module

use super::*;
use crate::prometheus::{
    BackendRequest, HttpReply, PrometheusClient, QueryTransport, TransportError,
};
use crate::system::SystemInfoProvider;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Answers every request with the same outcome and counts calls
struct StaticTransport {
    outcome: Result<HttpReply, TransportError>,
    calls: AtomicUsize,
}

impl StaticTransport {
    fn new(outcome: Result<HttpReply, TransportError>) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl QueryTransport for StaticTransport {
    async fn get(&self, _request: &BackendRequest) -> Result<HttpReply, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}

fn query_tool(transport: Arc<StaticTransport>) -> PrometheusQueryTool {
    PrometheusQueryTool::new(PrometheusClient::with_transport(transport))
}

#[tokio::test]
async fn test_query_tool_returns_backend_body() {
    let body = json!({"status": "success", "data": {"resultType": "vector", "result": []}});
    let transport = StaticTransport::new(Ok(HttpReply::ok_json(&body)));
    let tool = query_tool(transport.clone());

    let value = tool
        .execute(json!({"query": "up", "type": "instant"}), &ToolExecutionContext::new())
        .await
        .unwrap();

    assert_eq!(value, body);
    assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_query_tool_network_error_is_a_result() {
    let transport = StaticTransport::new(Err(TransportError::Network("connection refused".into())));
    let tool = query_tool(transport);

    let value = tool
        .execute(json!({"query": "up", "type": "instant"}), &ToolExecutionContext::new())
        .await
        .unwrap();

    assert_eq!(value["status"], "error");
    assert_eq!(value["errorType"], "network_error");
    assert_eq!(value["error"], "Network error: connection refused");
}

#[tokio::test]
async fn test_query_tool_range_validation_fails_invocation() {
    let transport = StaticTransport::new(Ok(HttpReply::ok_json(&json!({}))));
    let tool = query_tool(transport.clone());

    let err = tool
        .execute(json!({"query": "up", "type": "range"}), &ToolExecutionContext::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind, ToolErrorKind::Validation);
    assert_eq!(err.message, "Range queries require start, end, and step parameters");
    assert_eq!(err.context.unwrap()["errorType"], "validation_error");
    assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_registry_duplicate_detection() {
    let mut registry = ToolRegistry::new();
    let transport = StaticTransport::new(Ok(HttpReply::ok_json(&json!({}))));

    registry.register(Arc::new(query_tool(transport.clone()))).unwrap();
    let err = registry.register(Arc::new(query_tool(transport))).unwrap_err();

    assert!(matches!(err, RegistryError::DuplicateTool(ref name) if name == PROMETHEUS_QUERY_TOOL));
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_registry_validates_against_schema() {
    let mut registry = ToolRegistry::new();
    let transport = StaticTransport::new(Ok(HttpReply::ok_json(&json!({}))));
    registry.register(Arc::new(query_tool(transport))).unwrap();

    assert!(registry
        .validate_args(PROMETHEUS_QUERY_TOOL, &json!({"query": "up", "type": "instant"}))
        .is_ok());

    let err = registry
        .validate_args(PROMETHEUS_QUERY_TOOL, &json!({"query": "up", "type": "matrix"}))
        .unwrap_err();
    assert!(err.to_string().starts_with("Validation error: type: "));

    assert!(matches!(
        registry.validate_args("missing", &Value::Null),
        Err(RegistryError::NotFound(_))
    ));
}

#[test]
fn test_mcp_listing() {
    let mut registry = ToolRegistry::new();
    registry
        .register_all(SystemTool::all(SystemInfoProvider::new()))
        .unwrap();

    assert_eq!(registry.names(), vec!["cpu_info", "memory_info", "system_info"]);

    let listed = registry.mcp_tools();
    assert_eq!(listed.len(), 3);
    assert!(listed.iter().all(|tool| tool.input_schema["type"] == "object"));
}

#[tokio::test]
async fn test_memory_tool_executes() {
    let tool = SystemTool::new(SystemMetric::Memory, SystemInfoProvider::new());
    let value = tool
        .execute(Value::Null, &ToolExecutionContext::new())
        .await
        .unwrap();

    assert!(value["total"].as_u64().unwrap() > 0);
    assert!(value["usedPercentage"].is_string());
}

struct BrokenSchemaTool {
    metadata: ToolMetadata,
}

#[async_trait]
impl Tool for BrokenSchemaTool {
    fn metadata(&self) -> &ToolMetadata {
        &self.metadata
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new(json!({"type": "object", "required": "query"}))
    }

    async fn execute(&self, _args: Value, _ctx: &ToolExecutionContext) -> Result<Value, ToolError> {
        Ok(Value::Null)
    }
}

#[test]
fn test_registry_rejects_uncompilable_schema() {
    let mut registry = ToolRegistry::new();
    let err = registry
        .register(Arc::new(BrokenSchemaTool {
            metadata: ToolMetadata::new("broken", "Declares a malformed schema"),
        }))
        .unwrap_err();

    assert!(matches!(err, RegistryError::InvalidSchema { ref tool, .. } if tool == "broken"));
    assert!(registry.is_empty());
}

#[test]
fn test_registry_reports_missing_query() {
    let mut registry = ToolRegistry::new();
    let transport = StaticTransport::new(Ok(HttpReply::ok_json(&json!({}))));
    registry.register(Arc::new(query_tool(transport))).unwrap();

    let err = registry
        .validate_args(PROMETHEUS_QUERY_TOOL, &json!({"type": "instant", "start": 1}))
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("arguments: "));
    assert!(message.contains("query"));
    assert!(message.contains("start: "));
}
