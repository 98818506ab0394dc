//! Tool registry - immutable dispatch table keyed by tool name

use std::collections::HashMap;

use serde_json::Value;

use super::{
    Base64DecodeTool, Base64EncodeTool, BurpHealthCheckTool, BurpScanTool, BurpStartTool, CreateRepeaterTabTool,
    GetBurpConfigTool, Http1RequestTool, Http2RequestTool, ListKaliToolsTool, ListSecurityCategoriesTool,
    RandomStringTool, RunSecurityToolTool, SendToIntruderTool, SetBurpConfigTool, SetProxyInterceptTool,
    SetTaskEngineTool, Tool, ToolContext, ToolDefinition, ToolError, ToolResult, UrlDecodeTool, UrlEncodeTool,
};
use crate::config::Toolset;

/// Registered tools, in registration order for listing
pub struct ToolRegistry {
    tools: HashMap<&'static str, Box<dyn Tool>>,
    order: Vec<&'static str>,
}

impl ToolRegistry {
    /// Create a registry with every tool of the given toolsets
    pub fn for_toolsets(toolsets: &[Toolset]) -> Self {
        let mut registry = Self::new();

        for toolset in Toolset::all() {
            if !toolsets.contains(&toolset) {
                continue;
            }
            match toolset {
                Toolset::Packages => {
                    registry.add_tool(Box::new(ListKaliToolsTool));
                }
                Toolset::Burp => {
                    registry.add_tool(Box::new(BurpHealthCheckTool));
                    registry.add_tool(Box::new(BurpStartTool));
                    registry.add_tool(Box::new(BurpScanTool));
                    registry.add_tool(Box::new(GetBurpConfigTool));
                    registry.add_tool(Box::new(SetBurpConfigTool));
                    registry.add_tool(Box::new(CreateRepeaterTabTool));
                    registry.add_tool(Box::new(SendToIntruderTool));
                    registry.add_tool(Box::new(SetProxyInterceptTool));
                    registry.add_tool(Box::new(SetTaskEngineTool));
                }
                Toolset::Security => {
                    registry.add_tool(Box::new(RunSecurityToolTool));
                    registry.add_tool(Box::new(ListSecurityCategoriesTool));
                }
                Toolset::Encoding => {
                    registry.add_tool(Box::new(UrlEncodeTool));
                    registry.add_tool(Box::new(UrlDecodeTool));
                    registry.add_tool(Box::new(Base64EncodeTool));
                    registry.add_tool(Box::new(Base64DecodeTool));
                    registry.add_tool(Box::new(RandomStringTool));
                }
                Toolset::Http => {
                    registry.add_tool(Box::new(Http1RequestTool));
                    registry.add_tool(Box::new(Http2RequestTool));
                }
            }
        }

        registry
    }

    /// Create a registry with every toolset enabled
    pub fn standard() -> Self {
        Self::for_toolsets(&Toolset::all())
    }

    /// Create an empty registry (for custom tool sets)
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Add a tool; a later tool with the same name replaces the earlier one
    pub fn add_tool(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name();
        if self.tools.insert(name, tool).is_none() {
            self.order.push(name);
        }
    }

    /// Get tool descriptors for `tools/list`
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description().to_string(),
                input_schema: t.input_schema(),
            })
            .collect()
    }

    /// Execute a tool by name
    ///
    /// Never fails: unknown names and tool errors come back as
    /// failure-flagged results.
    pub async fn execute(&self, name: &str, input: Value, ctx: &ToolContext) -> ToolResult {
        let Some(tool) = self.tools.get(name) else {
            let err = ToolError::UnknownTool { name: name.to_string() };
            log::error!("Handler error: {}", err);
            return ToolResult::error(err.to_string());
        };

        log::info!("Calling tool {}", name);
        match tool.execute(input, ctx).await {
            Ok(result) => {
                if result.is_error {
                    log::warn!("Tool {} reported failure", name);
                }
                result
            }
            Err(e) => {
                log::error!("Handler error in {}: {}", name, e);
                ToolResult::error(format!("Error: {}", e))
            }
        }
    }

    /// Check if a tool exists
    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Get the list of tool names in registration order
    pub fn tool_names(&self) -> Vec<&str> {
        self.order.clone()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_context;

    #[test]
    fn test_standard_registry_has_all_tools() {
        let registry = ToolRegistry::standard();

        for name in [
            "list_kali_tools",
            "burp_health_check",
            "burp_start",
            "burp_scan",
            "burp_get_config",
            "burp_set_config",
            "create_repeater_tab",
            "send_to_intruder",
            "set_proxy_intercept_state",
            "set_task_execution_engine_state",
            "run_security_tool",
            "list_security_categories",
            "url_encode",
            "url_decode",
            "base64_encode",
            "base64_decode",
            "generate_random_string",
            "send_http1_request",
            "send_http2_request",
        ] {
            assert!(registry.has_tool(name), "missing {}", name);
        }
        assert_eq!(registry.len(), 19);
    }

    #[test]
    fn test_packages_only_registry() {
        let registry = ToolRegistry::for_toolsets(&[Toolset::Packages]);
        assert_eq!(registry.tool_names(), vec!["list_kali_tools"]);
    }

    #[test]
    fn test_packages_and_burp_registry_order() {
        let registry = ToolRegistry::for_toolsets(&[Toolset::Burp, Toolset::Packages]);
        let names = registry.tool_names();

        assert_eq!(names[0], "list_kali_tools");
        assert_eq!(names[1], "burp_health_check");
        assert_eq!(names.len(), 10);
    }

    #[test]
    fn test_definitions_match_names() {
        let registry = ToolRegistry::standard();
        let defs = registry.definitions();

        assert_eq!(defs.len(), registry.len());
        for def in &defs {
            assert!(!def.description.is_empty());
            assert_eq!(def.input_schema["type"], "object", "{}", def.name);
        }
    }

    #[test]
    fn test_add_tool_replaces_same_name() {
        let mut registry = ToolRegistry::new();
        registry.add_tool(Box::new(UrlEncodeTool));
        registry.add_tool(Box::new(UrlEncodeTool));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.tool_names(), vec!["url_encode"]);
    }

    #[test]
    fn test_empty_registry() {
        let registry = ToolRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.definitions().is_empty());
    }

    #[tokio::test]
    async fn test_execute_unknown_tool() {
        let registry = ToolRegistry::standard();
        let ctx = test_context(|_| {});

        let result = registry.execute("nonexistent_tool", serde_json::json!({}), &ctx).await;
        assert!(result.is_error);
        assert_eq!(result.content, "Unknown tool: nonexistent_tool");
    }

    #[tokio::test]
    async fn test_execute_disabled_toolset_is_unknown() {
        let registry = ToolRegistry::for_toolsets(&[Toolset::Packages]);
        let ctx = test_context(|_| {});

        let result = registry.execute("burp_scan", serde_json::json!({"target": "http://t"}), &ctx).await;
        assert!(result.is_error);
        assert_eq!(result.content, "Unknown tool: burp_scan");
    }

    #[tokio::test]
    async fn test_execute_invalid_arguments_becomes_failure() {
        let registry = ToolRegistry::standard();
        let ctx = test_context(|_| {});

        let result = registry
            .execute("burp_start", serde_json::json!({"headless": "yes"}), &ctx)
            .await;
        assert!(result.is_error);
        assert!(result.content.starts_with("Error: Invalid arguments for burp_start:"));
    }

    #[tokio::test]
    async fn test_execute_success() {
        let registry = ToolRegistry::standard();
        let ctx = test_context(|_| {});

        let result = registry
            .execute("base64_encode", serde_json::json!({"content": "kali"}), &ctx)
            .await;
        assert!(!result.is_error);
        assert_eq!(result.content, "a2FsaQ==");
    }
}
