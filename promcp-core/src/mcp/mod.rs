//! Model Context Protocol (MCP) server
//!
//! JSON-RPC 2.0 over newline-delimited stdio. The server answers
//! `initialize`, `ping`, `tools/list` and `tools/call`; notifications are
//! accepted silently.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use promcp_core::mcp::{McpServer, StdioTransport};
//! use promcp_core::system::SystemInfoProvider;
//! use promcp_core::tools::{SystemTool, ToolRegistry};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let mut registry = ToolRegistry::new();
//! registry.register_all(SystemTool::all(SystemInfoProvider::new()))?;
//!
//! let server = McpServer::builder()
//!     .name("system-info-mcp")
//!     .with_tools(registry)
//!     .build();
//!
//! server.run(StdioTransport::stdio()).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # References
//!
//! - [MCP Specification](https://modelcontextprotocol.io/specification)

mod protocol;
mod server;
mod transport;

pub use protocol::*;
pub use server::{McpServer, McpServerBuilder, McpServerConfig};
pub use transport::{LineTransport, MemoryTransport, StdioTransport, Transport};
