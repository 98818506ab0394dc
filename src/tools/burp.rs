//! Burp Suite tools - health check, launch, scan and control actions
//!
//! `burp_start` and `burp_scan` build shell command lines by concatenating
//! caller-supplied paths, URLs and scope entries verbatim. The control actions
//! (repeater, intruder, proxy intercept, task engine) pass an argv instead.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Tool, ToolContext, ToolError, ToolResult, parse_input};
use crate::config::BurpConfig;

/// Runtime-editable Burp integration settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BurpSettings {
    pub enabled: bool,
    pub port: u16,
    pub host: String,
    pub allow_config_edit: bool,
}

impl From<&BurpConfig> for BurpSettings {
    fn from(config: &BurpConfig) -> Self {
        Self {
            enabled: config.enabled,
            port: config.port,
            host: config.host.clone(),
            allow_config_edit: config.allow_config_edit,
        }
    }
}

/// Which Burp Suite executable to launch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BurpEdition {
    #[default]
    Professional,
    Community,
}

impl BurpEdition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Professional => "professional",
            Self::Community => "community",
        }
    }
}

/// Resolve `executable` against `PATH`
pub fn locate_executable(executable: &str) -> Option<std::path::PathBuf> {
    which::which(executable).ok()
}

// =============================================================================
// burp_health_check
// =============================================================================

pub struct BurpHealthCheckTool;

#[async_trait]
impl Tool for BurpHealthCheckTool {
    fn name(&self) -> &'static str {
        "burp_health_check"
    }

    fn description(&self) -> &'static str {
        "Check if Burp Suite is installed and accessible"
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _input: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        match locate_executable(&ctx.burp_executable) {
            Some(path) => Ok(ToolResult::success(format!(
                "Burp Suite is installed at: {}",
                path.display()
            ))),
            None => {
                log::warn!("{} not found in PATH", ctx.burp_executable);
                Ok(ToolResult::error("Burp Suite is not installed or not in PATH."))
            }
        }
    }
}

// =============================================================================
// burp_start
// =============================================================================

#[derive(Debug, Default, Deserialize)]
struct BurpStartInput {
    #[serde(default)]
    version: BurpEdition,
    #[serde(default)]
    config: Option<String>,
    #[serde(default)]
    headless: bool,
    #[serde(default)]
    port: Option<u16>,
}

/// Build the launch command line for `edition`
pub fn build_start_command(
    executable: &str,
    community_executable: &str,
    edition: BurpEdition,
    config: Option<&str>,
    headless: bool,
) -> String {
    let mut command = match edition {
        BurpEdition::Professional => executable.to_string(),
        BurpEdition::Community => community_executable.to_string(),
    };

    if let Some(config) = config.filter(|c| !c.is_empty()) {
        command.push_str(&format!(" --config-file={}", config));
    }

    if headless {
        command.push_str(" --headless");
    }

    command
}

pub struct BurpStartTool;

#[async_trait]
impl Tool for BurpStartTool {
    fn name(&self) -> &'static str {
        "burp_start"
    }

    fn description(&self) -> &'static str {
        "Start Burp Suite with specified options"
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "version": {
                    "type": "string",
                    "enum": ["professional", "community"],
                    "default": "professional",
                    "description": "Burp Suite edition to launch"
                },
                "config": {
                    "type": "string",
                    "description": "Path to a Burp Suite configuration file"
                },
                "headless": {
                    "type": "boolean",
                    "default": false,
                    "description": "Run without the graphical interface"
                },
                "port": {
                    "type": "integer",
                    "description": "Port the Burp MCP integration listens on; omitted resets it to the configured default"
                }
            }
        })
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let input: BurpStartInput = parse_input(self.name(), input)?;
        let command = build_start_command(
            &ctx.burp_executable,
            &ctx.burp_community_executable,
            input.version,
            input.config.as_deref(),
            input.headless,
        );

        let (host, port) = {
            let mut settings = ctx.burp_settings.write().await;
            settings.port = input.port.unwrap_or(ctx.burp_default_port);
            (settings.host.clone(), settings.port)
        };

        match ctx.shell.spawn_detached(&command) {
            Ok(pid) => {
                log::info!("Burp Suite {} started (pid {:?})", input.version.as_str(), pid);
                Ok(ToolResult::success(format!(
                    "Burp Suite {} started successfully with command: {}\nMCP server running on http://{}:{}",
                    input.version.as_str(),
                    command,
                    host,
                    port
                )))
            }
            Err(e) => {
                log::error!("Failed to start Burp Suite: {}", e);
                Ok(ToolResult::error(format!(
                    "Failed to start Burp Suite: {}\nCommand: {}",
                    e, command
                )))
            }
        }
    }
}

// =============================================================================
// burp_scan
// =============================================================================

#[derive(Debug, Default, Deserialize)]
struct BurpScanInput {
    #[serde(default)]
    target: Option<String>,
    #[serde(default)]
    config: Option<String>,
    #[serde(default)]
    output: Option<String>,
    #[serde(default)]
    scope: Option<Vec<String>>,
    #[serde(default = "default_scan_type")]
    scan_type: String,
}

fn default_scan_type() -> String {
    "passive".to_string()
}

/// Build the headless scan command line against `target`
pub fn build_scan_command(
    executable: &str,
    target: &str,
    scan_type: &str,
    config: Option<&str>,
    output: Option<&str>,
    scope: &[String],
) -> String {
    let mut command = format!(
        "{} --headless --target={} --scan-type={}",
        executable, target, scan_type
    );

    if let Some(config) = config.filter(|c| !c.is_empty()) {
        command.push_str(&format!(" --config-file={}", config));
    }

    if let Some(output) = output.filter(|o| !o.is_empty()) {
        command.push_str(&format!(" --report-output={}", output));
    }

    if !scope.is_empty() {
        command.push_str(&format!(" --scope-include={}", scope.join(",")));
    }

    command
}

pub struct BurpScanTool;

#[async_trait]
impl Tool for BurpScanTool {
    fn name(&self) -> &'static str {
        "burp_scan"
    }

    fn description(&self) -> &'static str {
        "Run a vulnerability scan with Burp Suite"
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "target": {
                    "type": "string",
                    "description": "Target URL to scan"
                },
                "config": {
                    "type": "string",
                    "description": "Path to a Burp Suite configuration file"
                },
                "output": {
                    "type": "string",
                    "description": "Path for the scan report"
                },
                "scope": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "URL patterns the scan may touch"
                },
                "scan_type": {
                    "type": "string",
                    "default": "passive",
                    "description": "Scan mode passed to Burp Suite"
                }
            },
            "required": ["target"]
        })
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let input: BurpScanInput = parse_input(self.name(), input)?;

        let Some(target) = input.target.as_deref().filter(|t| !t.is_empty()) else {
            return Ok(ToolResult::error("Error: Target URL is required"));
        };

        let command = build_scan_command(
            &ctx.burp_executable,
            target,
            &input.scan_type,
            input.config.as_deref(),
            input.output.as_deref(),
            input.scope.as_deref().unwrap_or_default(),
        );

        let output = ctx.shell.run(&command).await?;
        if !output.success() {
            log::error!("Burp Suite scan failed: {}", output.stderr.trim_end());
            return Ok(ToolResult::error(format!(
                "Burp Suite scan failed: {}\nCommand: {}",
                output.stderr, command
            )));
        }

        log::info!("Burp Suite scan completed");
        Ok(ToolResult::success(format!(
            "Burp Suite scan completed successfully. Output:\n{}",
            output.stdout
        )))
    }
}

// =============================================================================
// burp_get_config / burp_set_config
// =============================================================================

pub struct GetBurpConfigTool;

#[async_trait]
impl Tool for GetBurpConfigTool {
    fn name(&self) -> &'static str {
        "burp_get_config"
    }

    fn description(&self) -> &'static str {
        "Get Burp Suite MCP server configuration"
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _input: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let settings = ctx.burp_settings.read().await;
        Ok(ToolResult::success(
            serde_json::to_string_pretty(&*settings).unwrap_or_default(),
        ))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SetBurpConfigInput {
    #[serde(default)]
    enabled: Option<bool>,
    #[serde(default)]
    port: Option<u16>,
    #[serde(default)]
    host: Option<String>,
    #[serde(default)]
    allow_config_edit: Option<bool>,
}

pub struct SetBurpConfigTool;

#[async_trait]
impl Tool for SetBurpConfigTool {
    fn name(&self) -> &'static str {
        "burp_set_config"
    }

    fn description(&self) -> &'static str {
        "Set Burp Suite MCP server configuration"
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "enabled": { "type": "boolean" },
                "port": { "type": "integer" },
                "host": { "type": "string" },
                "allowConfigEdit": { "type": "boolean" }
            }
        })
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let input: SetBurpConfigInput = parse_input(self.name(), input)?;

        let mut settings = ctx.burp_settings.write().await;
        if let Some(enabled) = input.enabled {
            settings.enabled = enabled;
        }
        if let Some(port) = input.port {
            settings.port = port;
        }
        if let Some(host) = input.host {
            settings.host = host;
        }
        if let Some(allow) = input.allow_config_edit {
            settings.allow_config_edit = allow;
        }

        log::info!("Burp config updated");
        Ok(ToolResult::success(format!(
            "Burp Suite MCP server configuration updated:\n{}",
            serde_json::to_string_pretty(&*settings).unwrap_or_default()
        )))
    }
}

// =============================================================================
// Control actions (argv, no shell)
// =============================================================================

/// Requests echoed back in results are cut to this many characters
const REQUEST_PREVIEW_CHARS: usize = 500;

fn preview(request: &str) -> String {
    request.chars().take(REQUEST_PREVIEW_CHARS).collect()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TabRequestInput {
    #[serde(default)]
    request: Option<String>,
    #[serde(default)]
    tab_name: Option<String>,
}

fn tab_request_schema(default_tab: &str) -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "request": {
                "type": "string",
                "description": "Raw HTTP request"
            },
            "tabName": {
                "type": "string",
                "default": default_tab,
                "description": "Name of the tab to create"
            }
        },
        "required": ["request"]
    })
}

pub struct CreateRepeaterTabTool;

#[async_trait]
impl Tool for CreateRepeaterTabTool {
    fn name(&self) -> &'static str {
        "create_repeater_tab"
    }

    fn description(&self) -> &'static str {
        "Creates a new Repeater tab with specified HTTP request and optional tab name"
    }

    fn input_schema(&self) -> Value {
        tab_request_schema("MCP Request")
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let input: TabRequestInput = parse_input(self.name(), input)?;
        let Some(request) = input.request.filter(|r| !r.is_empty()) else {
            return Ok(ToolResult::error("Error: Request content is required"));
        };
        let tab_name = input.tab_name.unwrap_or_else(|| "MCP Request".to_string());

        let args = vec![
            "--repeater".to_string(),
            "--request".to_string(),
            request.clone(),
            "--tab-name".to_string(),
            tab_name.clone(),
        ];
        let output = ctx.shell.run_argv(&ctx.burp_executable, &args).await?;
        if !output.success() {
            log::error!("Failed to create Repeater tab: {}", output.stderr.trim_end());
            return Ok(ToolResult::error(format!(
                "Failed to create Repeater tab: {}",
                output.stderr
            )));
        }

        log::info!("Repeater tab created: {}", tab_name);
        Ok(ToolResult::success(format!(
            "Repeater tab \"{}\" created successfully with request:\n{}...",
            tab_name,
            preview(&request)
        )))
    }
}

pub struct SendToIntruderTool;

#[async_trait]
impl Tool for SendToIntruderTool {
    fn name(&self) -> &'static str {
        "send_to_intruder"
    }

    fn description(&self) -> &'static str {
        "Sends an HTTP request to Intruder with specified HTTP request and optional tab name"
    }

    fn input_schema(&self) -> Value {
        tab_request_schema("MCP Intruder")
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let input: TabRequestInput = parse_input(self.name(), input)?;
        let Some(request) = input.request.filter(|r| !r.is_empty()) else {
            return Ok(ToolResult::error("Error: Request content is required"));
        };
        let tab_name = input.tab_name.unwrap_or_else(|| "MCP Intruder".to_string());

        let args = vec![
            "--intruder".to_string(),
            "--request".to_string(),
            request.clone(),
            "--tab-name".to_string(),
            tab_name.clone(),
        ];
        let output = ctx.shell.run_argv(&ctx.burp_executable, &args).await?;
        if !output.success() {
            log::error!("Failed to send to Intruder: {}", output.stderr.trim_end());
            return Ok(ToolResult::error(format!(
                "Failed to send to Intruder: {}",
                output.stderr
            )));
        }

        log::info!("Sent to Intruder: {}", tab_name);
        Ok(ToolResult::success(format!(
            "Request sent to Intruder tab \"{}\" successfully:\n{}...",
            tab_name,
            preview(&request)
        )))
    }
}

#[derive(Debug, Deserialize)]
struct InterceptInput {
    intercepting: bool,
}

pub struct SetProxyInterceptTool;

#[async_trait]
impl Tool for SetProxyInterceptTool {
    fn name(&self) -> &'static str {
        "set_proxy_intercept_state"
    }

    fn description(&self) -> &'static str {
        "Enables or disables Burp Proxy Intercept"
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "intercepting": { "type": "boolean" }
            },
            "required": ["intercepting"]
        })
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let input: InterceptInput = parse_input(self.name(), input)?;
        let action = if input.intercepting { "enable" } else { "disable" };

        let args = vec!["--proxy-intercept".to_string(), action.to_string()];
        let output = ctx.shell.run_argv(&ctx.burp_executable, &args).await?;
        if !output.success() {
            log::error!("Failed to set proxy intercept: {}", output.stderr.trim_end());
            return Ok(ToolResult::error(format!(
                "Failed to set proxy intercept state: {}",
                output.stderr
            )));
        }

        let state = if input.intercepting { "enabled" } else { "disabled" };
        log::info!("Proxy intercept {}", state);
        Ok(ToolResult::success(format!("Proxy intercept has been {}", state)))
    }
}

#[derive(Debug, Deserialize)]
struct TaskEngineInput {
    running: bool,
}

pub struct SetTaskEngineTool;

#[async_trait]
impl Tool for SetTaskEngineTool {
    fn name(&self) -> &'static str {
        "set_task_execution_engine_state"
    }

    fn description(&self) -> &'static str {
        "Sets state of Burp's task execution engine (paused or unpaused)"
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "running": { "type": "boolean" }
            },
            "required": ["running"]
        })
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let input: TaskEngineInput = parse_input(self.name(), input)?;
        let action = if input.running { "resume" } else { "pause" };

        let args = vec!["--task-engine".to_string(), action.to_string()];
        let output = ctx.shell.run_argv(&ctx.burp_executable, &args).await?;
        if !output.success() {
            log::error!("Failed to set task engine state: {}", output.stderr.trim_end());
            return Ok(ToolResult::error(format!(
                "Failed to set task execution engine state: {}",
                output.stderr
            )));
        }

        let state = if input.running { "running" } else { "paused" };
        log::info!("Task engine {}", state);
        Ok(ToolResult::success(format!("Task execution engine is now {}", state)))
    }
}
