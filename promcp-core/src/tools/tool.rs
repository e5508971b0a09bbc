//! Tool trait and metadata definitions
//!
//! Each tool declares its name, a JSON Schema for its arguments, and its
//! execution logic. Arguments are checked against the schema before
//! `execute` is called.

use super::result::{ToolError, ValidationError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Tool metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolMetadata {
    /// Tool name (unique identifier)
    pub name: String,

    /// Human-readable description
    pub description: String,

    /// What the tool returns
    pub returns: String,
}

impl ToolMetadata {
    /// Create new metadata with required fields
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            returns: "Tool-specific result".to_string(),
        }
    }

    /// Set return description
    pub fn with_returns(mut self, returns: impl Into<String>) -> Self {
        self.returns = returns.into();
        self
    }
}

/// JSON Schema for tool parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    /// JSON Schema for input parameters
    pub parameters: Value,
}

impl ToolSchema {
    /// Create a schema from a JSON Schema value
    pub fn new(parameters: Value) -> Self {
        Self { parameters }
    }

    /// Create an empty schema (tool takes no parameters)
    pub fn empty() -> Self {
        Self {
            parameters: serde_json::json!({
                "type": "object",
                "properties": {}
            }),
        }
    }

    /// Compile the schema for repeated argument checks.
    ///
    /// # Errors
    ///
    /// Returns the compiler's message if `parameters` is not a valid JSON
    /// Schema.
    pub fn compile(&self) -> Result<ArgsValidator, String> {
        let validator = jsonschema::options()
            .build(&self.parameters)
            .map_err(|e| e.to_string())?;
        Ok(ArgsValidator { validator })
    }

    /// Compile and check in one step
    pub fn check(&self, args: &Value) -> Result<(), Vec<ValidationError>> {
        self.compile()
            .map_err(|e| vec![ValidationError::new("schema", e)])?
            .check(args)
    }
}

/// A compiled [`ToolSchema`]
#[derive(Debug)]
pub struct ArgsValidator {
    validator: jsonschema::Validator,
}

impl ArgsValidator {
    /// Check arguments, reporting every violation.
    ///
    /// `null` arguments count as `{}`. Violations at the top level are
    /// reported against `arguments`; nested ones against their JSON Pointer
    /// without the leading `/`.
    pub fn check(&self, args: &Value) -> Result<(), Vec<ValidationError>> {
        let empty = Value::Object(Map::new());
        let args = if args.is_null() { &empty } else { args };

        let errors: Vec<ValidationError> = self
            .validator
            .iter_errors(args)
            .map(|error| {
                let path = error.instance_path.to_string();
                let field = match path.trim_start_matches('/') {
                    "" => "arguments".to_string(),
                    field => field.to_string(),
                };
                ValidationError::new(field, error.to_string())
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Context provided to tool execution
#[derive(Debug, Clone, Default)]
pub struct ToolExecutionContext {
    /// JSON-RPC request id, for log correlation
    pub request_id: Option<String>,
}

impl ToolExecutionContext {
    /// Create a new context
    pub fn new() -> Self {
        Self::default()
    }

    /// Set request ID
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

/// Core tool trait
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get tool metadata
    fn metadata(&self) -> &ToolMetadata;

    /// Get tool name (convenience method)
    fn name(&self) -> &str {
        &self.metadata().name
    }

    /// Get tool description (convenience method)
    fn description(&self) -> &str {
        &self.metadata().description
    }

    /// Get the JSON schema for this tool's parameters
    fn schema(&self) -> ToolSchema;

    /// Execute the tool with arguments already checked against its schema
    async fn execute(&self, args: Value, ctx: &ToolExecutionContext) -> Result<Value, ToolError>;
}

/// Type alias for shared tools
pub type BoxedTool = Arc<dyn Tool>;
