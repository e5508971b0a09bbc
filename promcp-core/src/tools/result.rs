//! Tool error model
//!
//! Tools return a JSON value on success. Failures carry a kind so the
//! protocol layer can tell caller mistakes from tool faults.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Structured tool error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolError {
    /// Error kind
    pub kind: ToolErrorKind,

    /// Human-readable error message
    pub message: String,

    /// Additional context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

impl ToolError {
    /// Create a new tool error
    pub fn new(kind: ToolErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: None,
        }
    }

    /// Add context
    pub fn with_context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self
    }

    /// Create a validation error from field errors
    pub fn validation(errors: Vec<ValidationError>) -> Self {
        Self {
            kind: ToolErrorKind::Validation,
            message: format!(
                "Validation failed: {}",
                errors
                    .iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join("; ")
            ),
            context: Some(serde_json::to_value(&errors).unwrap_or_default()),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Internal, message)
    }
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.kind, self.message)
    }
}

impl std::error::Error for ToolError {}

impl From<crate::error::PromcpError> for ToolError {
    fn from(err: crate::error::PromcpError) -> Self {
        ToolError::internal(err.to_string())
    }
}

/// Error kind taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolErrorKind {
    /// Arguments were rejected (fix the call)
    Validation,

    /// The tool could not produce a result
    Internal,
}

/// Validation error for a specific field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Field path (e.g., "type")
    pub field: String,

    /// Error message
    pub message: String,
}

impl ValidationError {
    /// Create a new validation error
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[cfg(test)]
mod result_tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let errors = vec![
            ValidationError::new("query", "is required"),
            ValidationError::new("type", "must be one of: instant, range"),
        ];
        let error = ToolError::validation(errors);

        assert_eq!(error.kind, ToolErrorKind::Validation);
        assert_eq!(
            error.message,
            "Validation failed: query: is required; type: must be one of: instant, range"
        );
        assert!(error.context.is_some());
    }

    #[test]
    fn test_display() {
        let error = ToolError::internal("boom");
        assert_eq!(error.to_string(), "[Internal] boom");
    }
}
