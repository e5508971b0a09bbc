//! Tool Registry for tool registration and lookup
//!
//! The `ToolRegistry` provides:
//! - Tool registration with duplicate detection
//! - Lookup by name with schema validation
//! - Metadata exposure for MCP tool listing
//!
//! # Example
//!
//! ```rust,ignore
//! use promcp_core::tools::ToolRegistry;
//!
//! let mut registry = ToolRegistry::new();
//! registry.register(Arc::new(PrometheusQueryTool::new(client)))?;
//!
//! let tool = registry.get("prometheus_query").unwrap();
//! ```

use super::tool::{ArgsValidator, Tool};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Error type for registry operations
#[derive(Debug, Clone)]
pub enum RegistryError {
    /// Tool with this name already exists
    DuplicateTool(String),
    /// Tool not found
    NotFound(String),
    /// The tool's declared schema does not compile
    InvalidSchema { tool: String, message: String },
    /// Arguments failed the tool's schema
    ValidationError(String),
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::DuplicateTool(name) => {
                write!(f, "Tool '{}' is already registered", name)
            }
            RegistryError::NotFound(name) => {
                write!(f, "Tool '{}' not found", name)
            }
            RegistryError::InvalidSchema { tool, message } => {
                write!(f, "Tool '{}' has an invalid input schema: {}", tool, message)
            }
            RegistryError::ValidationError(msg) => {
                write!(f, "Validation error: {}", msg)
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// A registered tool with its compiled argument schema
struct RegisteredTool {
    tool: Arc<dyn Tool>,
    validator: ArgsValidator,
}

/// Registry of tools keyed by name, listed in name order
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, RegisteredTool>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tools.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ToolRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool
    ///
    /// The tool's schema is compiled once here.
    ///
    /// Returns an error if a tool with the same name is already registered
    /// or its schema is not valid JSON Schema.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), RegistryError> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(RegistryError::DuplicateTool(name));
        }

        let validator = tool
            .schema()
            .compile()
            .map_err(|message| RegistryError::InvalidSchema {
                tool: name.clone(),
                message,
            })?;

        self.tools.insert(name, RegisteredTool { tool, validator });
        Ok(())
    }

    /// Register multiple tools at once
    ///
    /// Fails if any tool name is duplicated.
    pub fn register_all(&mut self, tools: Vec<Arc<dyn Tool>>) -> Result<(), RegistryError> {
        for tool in tools {
            self.register(tool)?;
        }
        Ok(())
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name).map(|entry| &entry.tool)
    }

    /// Check if a tool is registered
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Get all tool names
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    /// Get the number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Get tools for MCP listing
    pub fn mcp_tools(&self) -> Vec<McpToolInfo> {
        self.tools
            .values()
            .map(|RegisteredTool { tool, .. }| McpToolInfo {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                input_schema: tool.schema().parameters,
            })
            .collect()
    }

    /// Validate arguments against a tool's schema
    pub fn validate_args(&self, tool_name: &str, args: &Value) -> Result<(), RegistryError> {
        let entry = self
            .tools
            .get(tool_name)
            .ok_or_else(|| RegistryError::NotFound(tool_name.to_string()))?;

        if let Err(errors) = entry.validator.check(args) {
            let error_messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            return Err(RegistryError::ValidationError(error_messages.join(", ")));
        }

        Ok(())
    }
}

/// Tool information for MCP listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpToolInfo {
    /// Tool name
    pub name: String,
    /// Tool description
    pub description: String,
    /// JSON Schema for input
    pub input_schema: Value,
}
