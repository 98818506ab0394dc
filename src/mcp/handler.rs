//! MCP request handler - maps JSON-RPC methods onto the tool registry and prompt catalog

use serde_json::Value;

use super::messages::{
    CallToolParams, CallToolResult, GetPromptParams, InitializeResult, JsonRpcRequest, JsonRpcResponse,
    ListToolsResult, Methods, RequestId, RpcError, TextContent,
};
use crate::config::Config;
use crate::error::Result;
use crate::prompts::{PromptCatalog, PromptError};
use crate::tools::{ToolContext, ToolRegistry, ToolResult};

/// Stateless dispatcher shared by every request task
pub struct McpHandler {
    registry: ToolRegistry,
    prompts: PromptCatalog,
    ctx: ToolContext,
}

impl McpHandler {
    pub fn new(registry: ToolRegistry, ctx: ToolContext) -> Self {
        Self {
            registry,
            prompts: PromptCatalog::new(),
            ctx,
        }
    }

    /// Build a handler with the toolsets and settings from `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        let registry = ToolRegistry::for_toolsets(&config.toolsets);
        let ctx = ToolContext::from_config(config)?;
        log::info!("Registered {} tools: {}", registry.len(), registry.tool_names().join(", "));
        Ok(Self::new(registry, ctx))
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Invoke a tool directly, bypassing JSON-RPC
    pub async fn call_tool(&self, name: &str, arguments: Value) -> ToolResult {
        self.registry.execute(name, arguments, &self.ctx).await
    }

    /// Handle one decoded line; `None` means nothing is written back
    pub async fn handle_value(&self, value: Value) -> Option<JsonRpcResponse> {
        if !value.is_object() {
            log::warn!("Rejecting non-object message");
            return Some(JsonRpcResponse::error(
                None,
                RpcError::invalid_request("Invalid Request: expected a JSON object"),
            ));
        }

        // Keep the id around in case the rest of the request is unusable
        let id = value
            .get("id")
            .cloned()
            .and_then(|id| serde_json::from_value::<RequestId>(id).ok());

        match serde_json::from_value::<JsonRpcRequest>(value) {
            Ok(request) => self.handle(request).await,
            Err(e) => {
                log::warn!("Invalid request: {}", e);
                Some(JsonRpcResponse::error(
                    id,
                    RpcError::invalid_request(format!("Invalid Request: {}", e)),
                ))
            }
        }
    }

    /// Handle a parsed request or notification
    pub async fn handle(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let Some(id) = request.id else {
            log::debug!("Notification: {}", request.method);
            return None;
        };

        log::debug!("Request {}: {}", id, request.method);
        let outcome = match request.method.as_str() {
            Methods::INITIALIZE => self.initialize(&request.params),
            Methods::PING => Ok(serde_json::json!({})),
            Methods::TOOLS_LIST => self.list_tools(),
            Methods::TOOLS_CALL => self.call(request.params).await,
            Methods::PROMPTS_LIST => self.list_prompts(),
            Methods::PROMPTS_GET => self.get_prompt(request.params),
            other => {
                log::warn!("Method not found: {}", other);
                Err(RpcError::method_not_found(other))
            }
        };

        Some(match outcome {
            Ok(result) => JsonRpcResponse::success(Some(id), result),
            Err(error) => JsonRpcResponse::error(Some(id), error),
        })
    }

    fn initialize(&self, params: &Value) -> std::result::Result<Value, RpcError> {
        if let Some(client) = params.get("clientInfo") {
            log::info!(
                "Client connected: {} {}",
                client.get("name").and_then(Value::as_str).unwrap_or("unknown"),
                client.get("version").and_then(Value::as_str).unwrap_or("")
            );
        }
        to_result(&InitializeResult::default())
    }

    fn list_tools(&self) -> std::result::Result<Value, RpcError> {
        to_result(&ListToolsResult {
            tools: self.registry.definitions(),
        })
    }

    async fn call(&self, params: Value) -> std::result::Result<Value, RpcError> {
        let params: CallToolParams = serde_json::from_value(params)
            .map_err(|e| RpcError::invalid_params(format!("Invalid params for tools/call: {}", e)))?;

        let result = self.call_tool(&params.name, params.arguments).await;
        to_result(&CallToolResult::from(result))
    }

    fn list_prompts(&self) -> std::result::Result<Value, RpcError> {
        Ok(serde_json::json!({ "prompts": self.prompts.list() }))
    }

    fn get_prompt(&self, params: Value) -> std::result::Result<Value, RpcError> {
        let params: GetPromptParams = serde_json::from_value(params)
            .map_err(|e| RpcError::invalid_params(format!("Invalid params for prompts/get: {}", e)))?;

        let prompt = self
            .prompts
            .render(&params.name, &params.arguments)
            .map_err(|e| match e {
                PromptError::UnknownPrompt(_) => RpcError::invalid_params(e.to_string()),
                PromptError::Render { .. } => RpcError::internal_error(e.to_string()),
            })?;

        Ok(serde_json::json!({
            "description": prompt.description,
            "messages": [{
                "role": "user",
                "content": TextContent::new(prompt.text),
            }]
        }))
    }
}

fn to_result<T: serde::Serialize>(value: &T) -> std::result::Result<Value, RpcError> {
    serde_json::to_value(value).map_err(|e| RpcError::internal_error(e.to_string()))
}
