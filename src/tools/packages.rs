//! list_kali_tools - enumerate installed packages from the dpkg database

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Tool, ToolContext, ToolError, ToolResult, parse_input};

#[derive(Debug, Default, Deserialize)]
struct ListKaliToolsInput {
    #[serde(default)]
    category: Option<String>,
}

#[derive(Debug, Serialize)]
struct PackageListing {
    total: usize,
    tools: Vec<String>,
    message: String,
}

/// Build the listing pipeline over `query`
///
/// The category is interpolated unescaped inside double quotes.
pub fn build_list_command(query: &str, category: Option<&str>) -> String {
    match category.filter(|c| !c.is_empty()) {
        Some(category) => format!(
            "{} | grep -i \"{}\" | grep \"^ii\" | awk '{{print $2}}'",
            query, category
        ),
        None => format!("{} | grep \"^ii\" | awk '{{print $2}}'", query),
    }
}

/// Split pipeline output into package names, dropping blank lines
pub fn parse_package_names(stdout: &str) -> Vec<String> {
    stdout
        .trim()
        .lines()
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

pub struct ListKaliToolsTool;

#[async_trait]
impl Tool for ListKaliToolsTool {
    fn name(&self) -> &'static str {
        "list_kali_tools"
    }

    fn description(&self) -> &'static str {
        "List available Kali Linux security and penetration testing tools installed on system"
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "category": {
                    "type": "string",
                    "description": "Filter tools by category (e.g., information-gathering, vulnerability-analysis, web-applications, password-attacks, exploitation, etc.)"
                }
            }
        })
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let input: ListKaliToolsInput = parse_input(self.name(), input)?;
        let command = build_list_command(&ctx.package_query, input.category.as_deref());

        let output = match ctx.shell.run(&command).await {
            Ok(output) => output,
            Err(e) => {
                log::error!("Command failed: {}: {}", command, e);
                return Ok(ToolResult::error(format!(
                    "Error listing Kali tools: {}\nCommand: {}\nStderr: ",
                    e, command
                )));
            }
        };

        if !output.success() {
            log::error!("Command failed: {} (exit {:?})", command, output.code);
            log::error!("Stderr: {}", output.stderr.trim_end());
            return Ok(ToolResult::error(format!(
                "Error listing Kali tools: Command failed with exit code {}\nCommand: {}\nStderr: {}",
                output.code.map_or_else(|| "none".to_string(), |c| c.to_string()),
                command,
                output.stderr
            )));
        }

        let tools = parse_package_names(&output.stdout);
        let listing = PackageListing {
            total: tools.len(),
            message: format!(
                "Found {} Kali security tools installed on this system. You can use these tools through the terminal.",
                tools.len()
            ),
            tools,
        };

        log::info!("Successfully listed {} tools", listing.total);
        Ok(ToolResult::success(serde_json::to_string_pretty(&listing).unwrap_or_default()))
    }
}
