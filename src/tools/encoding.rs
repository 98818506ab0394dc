//! Encoding helpers - URL/base64 transforms and random strings
//!
//! Pure functions; none of these tools touch the shell.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rand::Rng;
use serde::Deserialize;
use serde_json::Value;

use super::{Tool, ToolContext, ToolError, ToolResult, parse_input};

const DEFAULT_CHARACTER_SET: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

#[derive(Debug, Deserialize)]
struct ContentInput {
    content: String,
}

fn content_schema(description: &str) -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "content": {
                "type": "string",
                "description": description
            }
        },
        "required": ["content"]
    })
}

/// Log at most the first 50 characters of user content
fn snippet(content: &str) -> String {
    content.chars().take(50).collect()
}

pub struct UrlEncodeTool;

#[async_trait]
impl Tool for UrlEncodeTool {
    fn name(&self) -> &'static str {
        "url_encode"
    }

    fn description(&self) -> &'static str {
        "URL encodes input string"
    }

    fn input_schema(&self) -> Value {
        content_schema("Text to percent-encode")
    }

    async fn execute(&self, input: Value, _ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let input: ContentInput = parse_input(self.name(), input)?;
        log::debug!("URL encoded: {}...", snippet(&input.content));
        Ok(ToolResult::success(urlencoding::encode(&input.content).into_owned()))
    }
}

pub struct UrlDecodeTool;

#[async_trait]
impl Tool for UrlDecodeTool {
    fn name(&self) -> &'static str {
        "url_decode"
    }

    fn description(&self) -> &'static str {
        "URL decodes input string"
    }

    fn input_schema(&self) -> Value {
        content_schema("Percent-encoded text")
    }

    async fn execute(&self, input: Value, _ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let input: ContentInput = parse_input(self.name(), input)?;
        match urlencoding::decode(&input.content) {
            Ok(decoded) => {
                log::debug!("URL decoded: {}...", snippet(&input.content));
                Ok(ToolResult::success(decoded.into_owned()))
            }
            Err(e) => Ok(ToolResult::error(format!("Error: {}", e))),
        }
    }
}

pub struct Base64EncodeTool;

#[async_trait]
impl Tool for Base64EncodeTool {
    fn name(&self) -> &'static str {
        "base64_encode"
    }

    fn description(&self) -> &'static str {
        "Base64 encodes input string"
    }

    fn input_schema(&self) -> Value {
        content_schema("Text to encode")
    }

    async fn execute(&self, input: Value, _ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let input: ContentInput = parse_input(self.name(), input)?;
        log::debug!("Base64 encoded: {}...", snippet(&input.content));
        Ok(ToolResult::success(STANDARD.encode(input.content.as_bytes())))
    }
}

pub struct Base64DecodeTool;

#[async_trait]
impl Tool for Base64DecodeTool {
    fn name(&self) -> &'static str {
        "base64_decode"
    }

    fn description(&self) -> &'static str {
        "Base64 decodes input string"
    }

    fn input_schema(&self) -> Value {
        content_schema("Base64 text to decode")
    }

    async fn execute(&self, input: Value, _ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let input: ContentInput = parse_input(self.name(), input)?;

        let bytes = match STANDARD.decode(input.content.trim()) {
            Ok(bytes) => bytes,
            Err(e) => return Ok(ToolResult::error(format!("Error: {}", e))),
        };

        match String::from_utf8(bytes) {
            Ok(decoded) => {
                log::debug!("Base64 decoded: {}...", snippet(&input.content));
                Ok(ToolResult::success(decoded))
            }
            Err(e) => Ok(ToolResult::error(format!("Error: {}", e))),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RandomStringInput {
    #[serde(default = "default_length")]
    length: usize,
    #[serde(default = "default_character_set")]
    character_set: String,
}

fn default_length() -> usize {
    16
}

fn default_character_set() -> String {
    DEFAULT_CHARACTER_SET.to_string()
}

/// Draw `length` characters uniformly from `charset`
pub fn random_string(length: usize, charset: &str) -> Option<String> {
    let chars: Vec<char> = charset.chars().collect();
    if chars.is_empty() {
        return None;
    }

    let mut rng = rand::rng();
    Some((0..length).map(|_| chars[rng.random_range(0..chars.len())]).collect())
}

pub struct RandomStringTool;

#[async_trait]
impl Tool for RandomStringTool {
    fn name(&self) -> &'static str {
        "generate_random_string"
    }

    fn description(&self) -> &'static str {
        "Generates a random string of specified length and character set"
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "length": {
                    "type": "integer",
                    "default": 16,
                    "minimum": 0
                },
                "characterSet": {
                    "type": "string",
                    "default": DEFAULT_CHARACTER_SET
                }
            }
        })
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let input: RandomStringInput = parse_input(self.name(), input)?;
        if input.length > ctx.max_random_length {
            log::warn!("Rejected random string of {} chars (max {})", input.length, ctx.max_random_length);
            return Ok(ToolResult::error(format!(
                "Error: length must not exceed {}",
                ctx.max_random_length
            )));
        }

        match random_string(input.length, &input.character_set) {
            Some(value) => {
                log::debug!("Generated random string: {} chars", input.length);
                Ok(ToolResult::success(value))
            }
            None => Ok(ToolResult::error("Error: characterSet must not be empty")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_context;

    async fn run(tool: &dyn Tool, input: Value) -> ToolResult {
        let ctx = test_context(|_| {});
        tool.execute(input, &ctx).await.unwrap()
    }

    #[tokio::test]
    async fn test_url_encode() {
        let result = run(&UrlEncodeTool, serde_json::json!({"content": "test string&x=1"})).await;
        assert_eq!(result.content, "test%20string%26x%3D1");
    }

    #[tokio::test]
    async fn test_url_decode() {
        let result = run(&UrlDecodeTool, serde_json::json!({"content": "test%20string"})).await;
        assert!(!result.is_error);
        assert_eq!(result.content, "test string");
    }

    #[tokio::test]
    async fn test_url_decode_invalid_utf8() {
        let result = run(&UrlDecodeTool, serde_json::json!({"content": "%ff%fe"})).await;
        assert!(result.is_error);
    }

    #[tokio::test]
    async fn test_base64_encode() {
        let result = run(&Base64EncodeTool, serde_json::json!({"content": "hello"})).await;
        assert_eq!(result.content, "aGVsbG8=");
    }

    #[tokio::test]
    async fn test_base64_decode() {
        let result = run(&Base64DecodeTool, serde_json::json!({"content": "aGVsbG8="})).await;
        assert!(!result.is_error);
        assert_eq!(result.content, "hello");
    }

    #[tokio::test]
    async fn test_base64_decode_invalid() {
        let result = run(&Base64DecodeTool, serde_json::json!({"content": "not base64!"})).await;
        assert!(result.is_error);
        assert!(result.content.starts_with("Error:"));
    }

    #[tokio::test]
    async fn test_content_is_required() {
        let ctx = test_context(|_| {});
        let result = Base64EncodeTool.execute(serde_json::json!({}), &ctx).await;
        assert!(matches!(result, Err(ToolError::InvalidInput { .. })));
    }

    #[tokio::test]
    async fn test_random_string_defaults() {
        let result = run(&RandomStringTool, Value::Null).await;
        assert!(!result.is_error);
        assert_eq!(result.content.chars().count(), 16);
        assert!(result.content.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[tokio::test]
    async fn test_random_string_custom_charset() {
        let result = run(&RandomStringTool, serde_json::json!({"length": 10, "characterSet": "ab"})).await;
        assert_eq!(result.content.len(), 10);
        assert!(result.content.chars().all(|c| c == 'a' || c == 'b'));
    }

    #[tokio::test]
    async fn test_random_string_empty_charset() {
        let result = run(&RandomStringTool, serde_json::json!({"characterSet": ""})).await;
        assert!(result.is_error);
    }

    #[tokio::test]
    async fn test_random_string_length_is_capped() {
        let ctx = test_context(|config| config.encoding.max_random_length = 8);

        let result = RandomStringTool
            .execute(serde_json::json!({"length": 9}), &ctx)
            .await
            .unwrap();
        assert!(result.is_error);
        assert_eq!(result.content, "Error: length must not exceed 8");

        let result = RandomStringTool
            .execute(serde_json::json!({"length": 8}), &ctx)
            .await
            .unwrap();
        assert!(!result.is_error);
        assert_eq!(result.content.chars().count(), 8);
    }

    #[tokio::test]
    async fn test_random_string_huge_length_rejected() {
        let result = run(&RandomStringTool, serde_json::json!({"length": u64::MAX})).await;
        assert!(result.is_error);
        assert!(result.content.starts_with("Error: length must not exceed"));
    }

    #[test]
    fn test_random_string_zero_length() {
        assert_eq!(random_string(0, "abc").as_deref(), Some(""));
    }
}
