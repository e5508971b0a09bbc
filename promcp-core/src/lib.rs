//! # promcp
//!
//! MCP tool servers for metrics, speaking JSON-RPC 2.0 over stdio:
//! - `prometheus_query` forwards PromQL to a Prometheus server and returns
//!   its response, or a structured error envelope
//! - `system_info`, `cpu_info` and `memory_info` report on the local host
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use promcp_core::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = PrometheusConfig::load()?;
//!     let client = PrometheusClient::new(&config)?;
//!
//!     let server = McpServer::builder()
//!         .name("prometheus-mcp")
//!         .with_tool(Arc::new(PrometheusQueryTool::new(client)))
//!         .map_err(|e| PromcpError::Tool(e.to_string()))?
//!         .build();
//!
//!     server.run(StdioTransport::stdio()).await
//! }
//! ```
//!
//! Logs go to stderr; stdout carries protocol frames only.

pub mod config;
pub mod error;
pub mod mcp;
pub mod prometheus;
pub mod system;
pub mod tools;

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::PrometheusConfig;
    pub use crate::error::{PromcpError, Result};
    pub use crate::mcp::{McpServer, McpServerBuilder, StdioTransport, Transport};
    pub use crate::prometheus::{PrometheusClient, QueryDescriptor, QueryEnvelope, QueryType};
    pub use crate::system::SystemInfoProvider;
    pub use crate::tools::{
        PrometheusQueryTool, SystemMetric, SystemTool, Tool, ToolError, ToolRegistry,
    };
}
