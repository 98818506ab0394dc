//! Generic security tool invocation and category listing

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::{Tool, ToolContext, ToolError, ToolResult, parse_input};

/// Categories advertised by `list_security_categories`
pub const SECURITY_CATEGORIES: [&str; 10] = [
    "information-gathering",
    "vulnerability-scanning",
    "web-application-testing",
    "password-attacks",
    "network-sniffing",
    "wireless-attacks",
    "exploitation",
    "post-exploitation",
    "forensics",
    "reporting",
];

#[derive(Debug, Default, Deserialize)]
struct RunSecurityToolInput {
    #[serde(default)]
    tool: Option<String>,
    #[serde(default)]
    arguments: Option<Vec<String>>,
    #[serde(default)]
    target: Option<String>,
}

/// `<tool> [<target>] [<arguments...>]`, joined with spaces and unescaped
pub fn build_tool_command(tool: &str, target: Option<&str>, arguments: &[String]) -> String {
    let mut command = tool.to_string();

    if let Some(target) = target.filter(|t| !t.is_empty()) {
        command.push(' ');
        command.push_str(target);
    }

    if !arguments.is_empty() {
        command.push(' ');
        command.push_str(&arguments.join(" "));
    }

    command
}

pub struct RunSecurityToolTool;

#[async_trait]
impl Tool for RunSecurityToolTool {
    fn name(&self) -> &'static str {
        "run_security_tool"
    }

    fn description(&self) -> &'static str {
        "Run a specified security tool with arguments"
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "tool": {
                    "type": "string",
                    "description": "Executable to run (e.g. nmap, nikto, sqlmap)"
                },
                "arguments": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Arguments appended after the target"
                },
                "target": {
                    "type": "string",
                    "description": "Host, URL or range placed directly after the tool name"
                }
            },
            "required": ["tool"]
        })
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let input: RunSecurityToolInput = parse_input(self.name(), input)?;
        let Some(tool) = input.tool.as_deref().filter(|t| !t.is_empty()) else {
            return Ok(ToolResult::error("Error: Tool name is required"));
        };

        let command = build_tool_command(
            tool,
            input.target.as_deref(),
            input.arguments.as_deref().unwrap_or_default(),
        );

        let output = ctx.shell.run(&command).await?;
        if !output.success() {
            log::error!("Error running tool {}: {}", tool, output.stderr.trim_end());
            return Ok(ToolResult::error(format!(
                "Error running tool {}: {}\nCommand: {}",
                tool, output.stderr, command
            )));
        }

        log::info!("Tool {} completed successfully", tool);
        Ok(ToolResult::success(format!(
            "Tool {} completed successfully. Output:\n{}",
            tool, output.stdout
        )))
    }
}

pub struct ListSecurityCategoriesTool;

#[async_trait]
impl Tool for ListSecurityCategoriesTool {
    fn name(&self) -> &'static str {
        "list_security_categories"
    }

    fn description(&self) -> &'static str {
        "List available security tool categories"
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _input: Value, _ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let body = serde_json::json!({ "categories": SECURITY_CATEGORIES });
        Ok(ToolResult::success(serde_json::to_string_pretty(&body).unwrap_or_default()))
    }
}
