//! Tool execution context - shared resources handed to every tool call

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use super::burp::BurpSettings;
use super::shell::ShellRunner;
use crate::config::Config;
use crate::error::{KaliMcpError, Result};

/// Execution context for tools
///
/// Built once at startup and shared by all in-flight requests. The only
/// mutable piece is the Burp settings block.
#[derive(Clone)]
pub struct ToolContext {
    /// Runs command lines through the configured shell
    pub shell: ShellRunner,

    /// Command producing the dpkg-style package listing
    pub package_query: String,

    /// Professional edition executable
    pub burp_executable: String,

    /// Community edition executable
    pub burp_community_executable: String,

    /// Port `burp_start` falls back to when the caller names none
    pub burp_default_port: u16,

    /// Runtime-editable Burp settings (`burp_get_config` / `burp_set_config`)
    pub burp_settings: Arc<RwLock<BurpSettings>>,

    /// Client for the raw HTTP tools
    pub http: reqwest::Client,

    /// Response bodies longer than this are truncated
    pub max_body_chars: usize,

    /// Upper bound for `generate_random_string`
    pub max_random_length: usize,
}

impl ToolContext {
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.http.timeout_ms))
            .build()
            .map_err(|e| KaliMcpError::Tool(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            shell: ShellRunner::from_config(&config.shell),
            package_query: config.packages.query_command.clone(),
            burp_executable: config.burp.executable.clone(),
            burp_community_executable: config.burp.community_executable.clone(),
            burp_default_port: config.burp.port,
            burp_settings: Arc::new(RwLock::new(BurpSettings::from(&config.burp))),
            http,
            max_body_chars: config.http.max_body_chars,
            max_random_length: config.encoding.max_random_length,
        })
    }
}

/// Context over a POSIX `sh` with config tweaks applied, for unit tests
#[cfg(test)]
pub(crate) fn test_context(configure: impl FnOnce(&mut Config)) -> ToolContext {
    let mut config = Config::default();
    config.shell.program = "sh".to_string();
    configure(&mut config);
    ToolContext::from_config(&config).expect("test context")
}

/// Errors that can occur during tool execution
///
/// These never cross the transport: the registry turns them into
/// failure-flagged results.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Invalid arguments for {tool}: {message}")]
    InvalidInput { tool: String, message: String },

    #[error("Failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command timed out after {timeout_ms}ms: {command}")]
    Timeout { command: String, timeout_ms: u64 },

    #[error("Unknown tool: {name}")]
    UnknownTool { name: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_context_from_default_config() {
        let ctx = ToolContext::from_config(&Config::default()).unwrap();

        assert_eq!(ctx.package_query, "dpkg -l");
        assert_eq!(ctx.burp_executable, "burpsuite");
        assert_eq!(ctx.max_body_chars, 5000);

        let settings = ctx.burp_settings.read().await;
        assert_eq!(settings.port, 9876);
        assert_eq!(settings.host, "localhost");
    }

    #[test]
    fn test_error_messages() {
        let err = ToolError::UnknownTool {
            name: "nope".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown tool: nope");

        let err = ToolError::Timeout {
            command: "sleep 10".to_string(),
            timeout_ms: 100,
        };
        assert_eq!(err.to_string(), "Command timed out after 100ms: sleep 10");
    }
}
