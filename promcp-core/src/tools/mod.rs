//! Tool system
//!
//! Tools are what the MCP server exposes. Each one declares a JSON Schema for
//! its arguments; the registry checks arguments against it before the tool
//! runs.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use promcp_core::config::PrometheusConfig;
//! use promcp_core::prometheus::PrometheusClient;
//! use promcp_core::tools::{PrometheusQueryTool, ToolRegistry};
//!
//! # fn build() -> Result<(), Box<dyn std::error::Error>> {
//! let client = PrometheusClient::new(&PrometheusConfig::default())?;
//! let mut registry = ToolRegistry::new();
//! registry.register(Arc::new(PrometheusQueryTool::new(client)))?;
//! # Ok(())
//! # }
//! ```

mod prometheus;
mod registry;
mod result;
mod system;
mod tool;

pub use prometheus::{PROMETHEUS_QUERY_TOOL, PrometheusQueryTool};
pub use registry::{McpToolInfo, RegistryError, ToolRegistry};
pub use result::{ToolError, ToolErrorKind, ValidationError};
pub use system::{SystemMetric, SystemTool};
pub use tool::{ArgsValidator, BoxedTool, Tool, ToolExecutionContext, ToolMetadata, ToolSchema};

#[cfg(test)]
mod tests;
