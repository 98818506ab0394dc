//! Error types for kali-mcp
//!
//! Centralized error handling using thiserror. Tool-level failures never
//! reach this type: they are folded into failure-flagged tool results.

use thiserror::Error;

/// All error types that can occur outside of tool execution
#[derive(Debug, Error)]
pub enum KaliMcpError {
    /// Configuration could not be read or is invalid
    #[error("Config error: {0}")]
    Config(String),

    /// stdio transport failure (read/write/framing)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Tool registry or context setup error
    #[error("Tool error: {0}")]
    Tool(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML config parse error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for kali-mcp operations
pub type Result<T> = std::result::Result<T, KaliMcpError>;
