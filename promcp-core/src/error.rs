//! Error types for promcp operations

/// Result type for promcp operations
pub type Result<T> = std::result::Result<T, PromcpError>;

/// Error types for the promcp servers
#[derive(Debug, thiserror::Error)]
pub enum PromcpError {
    /// Configuration error (fatal at startup)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Transport (stdio) error
    #[error("Transport error: {0}")]
    Transport(String),

    /// Tool registration or execution error
    #[error("Tool error: {0}")]
    Tool(String),

    /// Host metrics could not be read
    #[error("System info error: {0}")]
    SystemInfo(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for PromcpError {
    fn from(s: String) -> Self {
        PromcpError::Other(s)
    }
}

impl From<&str> for PromcpError {
    fn from(s: &str) -> Self {
        PromcpError::Other(s.to_string())
    }
}

impl From<figment::Error> for PromcpError {
    fn from(err: figment::Error) -> Self {
        PromcpError::Configuration(err.to_string())
    }
}
