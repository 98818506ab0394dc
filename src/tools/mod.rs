//! Tool system - descriptors, dispatch, and the shell-backed tool set
//!
//! Every tool advertises a name, description and JSON input schema, and is
//! registered once at startup in an immutable [`ToolRegistry`].

mod burp;
mod context;
mod encoding;
mod http;
mod packages;
mod registry;
mod security;
mod shell;

pub use burp::{
    BurpEdition, BurpHealthCheckTool, BurpScanTool, BurpSettings, BurpStartTool, CreateRepeaterTabTool,
    GetBurpConfigTool, SendToIntruderTool, SetBurpConfigTool, SetProxyInterceptTool, SetTaskEngineTool,
};
pub use context::{ToolContext, ToolError};
#[cfg(test)]
pub(crate) use context::test_context;
pub use encoding::{Base64DecodeTool, Base64EncodeTool, RandomStringTool, UrlDecodeTool, UrlEncodeTool};
pub use http::{Http1RequestTool, Http2RequestTool};
pub use packages::ListKaliToolsTool;
pub use registry::ToolRegistry;
pub use security::{ListSecurityCategoriesTool, RunSecurityToolTool, SECURITY_CATEGORIES};
pub use shell::{CommandOutput, ShellRunner};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tool that can be called through `tools/call`
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (unique within the registry)
    fn name(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    /// JSON Schema for input parameters
    fn input_schema(&self) -> Value;

    /// Execute the tool
    async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError>;
}

/// Result from tool execution
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    pub content: String,
    pub is_error: bool,
}

impl ToolResult {
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: false,
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: true,
        }
    }
}

/// Tool descriptor as advertised by `tools/list`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Deserialize tool arguments, treating an absent mapping as empty
pub(crate) fn parse_input<T: DeserializeOwned>(tool: &str, input: Value) -> Result<T, ToolError> {
    let input = if input.is_null() {
        Value::Object(Default::default())
    } else {
        input
    };
    serde_json::from_value(input).map_err(|e| ToolError::InvalidInput {
        tool: tool.to_string(),
        message: e.to_string(),
    })
}
