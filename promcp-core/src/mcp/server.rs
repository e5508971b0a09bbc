//! MCP Server Implementation
//!
//! The main server that handles MCP requests and dispatches to tools.

use super::protocol::*;
use super::transport::Transport;
use crate::tools::{RegistryError, Tool, ToolExecutionContext, ToolRegistry};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

/// MCP Server configuration
#[derive(Debug, Clone)]
pub struct McpServerConfig {
    /// Server name
    pub name: String,
    /// Server version
    pub version: String,
}

impl Default for McpServerConfig {
    fn default() -> Self {
        Self {
            name: "promcp".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// MCP Server state
pub struct McpServer {
    config: McpServerConfig,
    tools: ToolRegistry,
}

impl std::fmt::Debug for McpServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpServer")
            .field("config", &self.config)
            .field("tools", &self.tools)
            .finish()
    }
}

impl McpServer {
    /// Create a new MCP server builder
    pub fn builder() -> McpServerBuilder {
        McpServerBuilder::new()
    }

    /// Server configuration
    pub fn config(&self) -> &McpServerConfig {
        &self.config
    }

    /// Registered tools
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Handle an incoming message.
    ///
    /// Returns `None` for notifications, which never get a response.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let Some(id) = request.id.clone() else {
            tracing::debug!(method = %request.method, "Received notification");
            return None;
        };

        if request.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::error(id, JsonRpcError::invalid_request()));
        }

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id, request.params),
            "ping" => JsonRpcResponse::success(id, serde_json::json!({})),
            "tools/list" => self.handle_tools_list(id),
            "tools/call" => self.handle_tools_call(id, request.params).await,
            method => {
                tracing::debug!(method = %method, "Unknown method");
                JsonRpcResponse::error(id, JsonRpcError::method_not_found())
            }
        };

        Some(response)
    }

    /// Handle initialize request
    fn handle_initialize(&self, id: RequestId, params: Option<Value>) -> JsonRpcResponse {
        let params: InitializeParams = match parse_params(params, "initialize") {
            Ok(params) => params,
            Err(error) => return JsonRpcResponse::error(id, error),
        };

        tracing::info!(
            client = %params.client_info.name,
            client_version = %params.client_info.version,
            protocol_version = %params.protocol_version,
            "Client connected"
        );

        let result = InitializeResult {
            protocol_version: MCP_PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability { list_changed: false }),
            },
            server_info: ServerInfo {
                name: self.config.name.clone(),
                version: self.config.version.clone(),
            },
        };

        to_response(id, result)
    }

    /// Handle tools/list request
    fn handle_tools_list(&self, id: RequestId) -> JsonRpcResponse {
        let tools = self
            .tools
            .mcp_tools()
            .into_iter()
            .map(|t| McpTool {
                name: t.name,
                description: t.description,
                input_schema: t.input_schema,
            })
            .collect();

        to_response(id, ToolsListResult { tools })
    }

    /// Handle tools/call request
    async fn handle_tools_call(&self, id: RequestId, params: Option<Value>) -> JsonRpcResponse {
        let params: ToolCallParams = match parse_params(params, "tool call") {
            Ok(params) => params,
            Err(error) => return JsonRpcResponse::error(id, error),
        };

        let tool = match self.tools.get(&params.name) {
            Some(t) => Arc::clone(t),
            None => {
                return JsonRpcResponse::error(id, JsonRpcError::tool_not_found(&params.name));
            }
        };

        if let Err(e) = self.tools.validate_args(&params.name, &params.arguments) {
            tracing::warn!(tool = %params.name, error = %e, "Rejected tool arguments");
            let message = match e {
                RegistryError::ValidationError(msg) => {
                    format!("Invalid arguments for tool '{}': {}", params.name, msg)
                }
                other => other.to_string(),
            };
            return JsonRpcResponse::error(id, JsonRpcError::invalid_params(message));
        }

        tracing::info!(tool = %params.name, request_id = %id, "Calling tool");

        let ctx = ToolExecutionContext::new().with_request_id(id.to_string());
        let result = match tool.execute(params.arguments, &ctx).await {
            Ok(value) => match serde_json::to_string_pretty(&value) {
                Ok(text) => ToolCallResult::text(text),
                Err(e) => ToolCallResult::error(e.to_string()),
            },
            Err(error) => {
                tracing::error!(tool = %params.name, error = %error, "Tool call failed");
                ToolCallResult::error(error.message)
            }
        };

        to_response(id, result)
    }

    /// Run the server until the transport closes
    pub async fn run<T: Transport>(&self, mut transport: T) -> crate::error::Result<()> {
        tracing::info!(
            name = %self.config.name,
            version = %self.config.version,
            tools = ?self.tools.names(),
            "MCP server running"
        );

        while let Some(request) = transport.receive().await? {
            if let Some(response) = self.handle_request(request).await {
                transport.send(response).await?;
            }
        }

        tracing::info!("Input closed, shutting down");
        Ok(())
    }
}

fn parse_params<T: DeserializeOwned>(
    params: Option<Value>,
    what: &str,
) -> Result<T, JsonRpcError> {
    let params =
        params.ok_or_else(|| JsonRpcError::invalid_params(format!("Missing {} params", what)))?;
    serde_json::from_value(params)
        .map_err(|e| JsonRpcError::invalid_params(format!("Invalid {} params: {}", what, e)))
}

fn to_response(id: RequestId, result: impl serde::Serialize) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(id, JsonRpcError::internal_error(e.to_string())),
    }
}

/// Builder for MCP Server
#[derive(Default)]
pub struct McpServerBuilder {
    config: McpServerConfig,
    tools: ToolRegistry,
}

impl McpServerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.config.version = version.into();
        self
    }

    pub fn with_tools(mut self, registry: ToolRegistry) -> Self {
        self.tools = registry;
        self
    }

    /// Register a tool, failing on a duplicate name
    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Result<Self, RegistryError> {
        self.tools.register(tool)?;
        Ok(self)
    }

    pub fn build(self) -> McpServer {
        McpServer {
            config: self.config,
            tools: self.tools,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::transport::MemoryTransport;
    use crate::tools::{ToolError, ToolErrorKind, ToolMetadata, ToolSchema};
    use async_trait::async_trait;

    struct EchoTool {
        metadata: ToolMetadata,
    }

    impl EchoTool {
        fn new() -> Self {
            Self {
                metadata: ToolMetadata::new("echo", "Echoes back the input"),
            }
        }
    }

    #[async_trait]
    impl Tool for EchoTool {
        fn metadata(&self) -> &ToolMetadata {
            &self.metadata
        }

        fn schema(&self) -> ToolSchema {
            ToolSchema::new(serde_json::json!({
                "type": "object",
                "properties": {
                    "message": { "type": "string" }
                },
                "required": ["message"]
            }))
        }

        async fn execute(
            &self,
            args: Value,
            _ctx: &ToolExecutionContext,
        ) -> Result<Value, ToolError> {
            let message = args["message"].as_str().unwrap_or_default();
            if message == "fail" {
                return Err(ToolError::new(ToolErrorKind::Validation, "told to fail"));
            }
            Ok(serde_json::json!({ "echo": message }))
        }
    }

    fn echo_server() -> McpServer {
        McpServer::builder()
            .with_tool(Arc::new(EchoTool::new()))
            .unwrap()
            .build()
    }

    #[tokio::test]
    async fn test_initialize() {
        let server = McpServer::builder().name("test-server").version("1.0.0").build();

        let request = JsonRpcRequest::new(1i64, "initialize").with_params(serde_json::json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "capabilities": {},
            "clientInfo": { "name": "test-client", "version": "1.0" }
        }));

        let response = server.handle_request(request).await.unwrap();
        assert!(response.error.is_none());

        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], MCP_PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], "test-server");
        assert!(result["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn test_initialize_requires_params() {
        let server = echo_server();
        let response = server
            .handle_request(JsonRpcRequest::new(1i64, "initialize"))
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, -32602);
    }

    #[tokio::test]
    async fn test_tools_list() {
        let server = echo_server();

        let response = server
            .handle_request(JsonRpcRequest::new(1i64, "tools/list"))
            .await
            .unwrap();

        let result = response.result.unwrap();
        let tools = result["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0]["name"], "echo");
        assert_eq!(tools[0]["inputSchema"]["required"][0], "message");
    }

    #[tokio::test]
    async fn test_tools_call_pretty_prints_result() {
        let server = echo_server();

        let request = JsonRpcRequest::new(1i64, "tools/call").with_params(serde_json::json!({
            "name": "echo",
            "arguments": { "message": "hello" }
        }));

        let response = server.handle_request(request).await.unwrap();
        let result: ToolCallResult = serde_json::from_value(response.result.unwrap()).unwrap();

        assert!(result.is_error.is_none());
        assert_eq!(result.content[0].as_text(), "{\n  \"echo\": \"hello\"\n}");
    }

    #[tokio::test]
    async fn test_tools_call_error_sets_is_error() {
        let server = echo_server();

        let request = JsonRpcRequest::new(1i64, "tools/call").with_params(serde_json::json!({
            "name": "echo",
            "arguments": { "message": "fail" }
        }));

        let response = server.handle_request(request).await.unwrap();
        let result: ToolCallResult = serde_json::from_value(response.result.unwrap()).unwrap();

        assert_eq!(result.is_error, Some(true));
        assert_eq!(result.content[0].as_text(), "told to fail");
    }

    #[tokio::test]
    async fn test_tools_call_invalid_arguments() {
        let server = echo_server();

        let request = JsonRpcRequest::new(1i64, "tools/call").with_params(serde_json::json!({
            "name": "echo",
            "arguments": { "message": 42 }
        }));

        let response = server.handle_request(request).await.unwrap();
        let error = response.error.unwrap();
        assert_eq!(error.code, -32602);
        assert!(error.message.starts_with("Invalid arguments for tool 'echo': message: "));
    }

    #[tokio::test]
    async fn test_tools_call_unknown_tool() {
        let server = echo_server();

        let request = JsonRpcRequest::new(1i64, "tools/call")
            .with_params(serde_json::json!({ "name": "nope", "arguments": {} }));

        let response = server.handle_request(request).await.unwrap();
        assert_eq!(response.error.unwrap().code, -32002);
    }

    #[tokio::test]
    async fn test_notification_gets_no_response() {
        let server = echo_server();
        let response = server
            .handle_request(JsonRpcRequest::notification("notifications/initialized"))
            .await;
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn test_method_not_found() {
        let server = echo_server();
        let response = server
            .handle_request(JsonRpcRequest::new(1i64, "resources/list"))
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, -32601);
    }

    #[tokio::test]
    async fn test_wrong_jsonrpc_version() {
        let server = echo_server();
        let mut request = JsonRpcRequest::new(1i64, "ping");
        request.jsonrpc = "1.0".to_string();

        let response = server.handle_request(request).await.unwrap();
        assert_eq!(response.error.unwrap().code, -32600);
    }

    #[tokio::test]
    async fn test_duplicate_tool_rejected_by_builder() {
        let result = McpServer::builder()
            .with_tool(Arc::new(EchoTool::new()))
            .unwrap()
            .with_tool(Arc::new(EchoTool::new()));
        assert!(matches!(result, Err(RegistryError::DuplicateTool(_))));
    }

    #[tokio::test]
    async fn test_run_over_memory_transport() {
        let server = echo_server();
        let mut transport = MemoryTransport::new();
        transport.push_request(JsonRpcRequest::notification("notifications/initialized"));
        transport.push_request(JsonRpcRequest::new(1i64, "ping"));
        transport.push_request(JsonRpcRequest::new(2i64, "tools/list"));

        // `run` consumes the transport, so drive the loop by hand
        while let Some(request) = transport.receive().await.unwrap() {
            if let Some(response) = server.handle_request(request).await {
                transport.send(response).await.unwrap();
            }
        }

        let ids: Vec<RequestId> = transport.responses().iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids, vec![RequestId::Number(1), RequestId::Number(2)]);
    }
}
