//! Raw HTTP request tools
//!
//! Both tools go through the shared reqwest client; the HTTP/2 variant only
//! echoes the caller's pseudo-headers and reports the negotiated version.

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Tool, ToolContext, ToolError, ToolResult, parse_input};

#[derive(Debug, Deserialize)]
struct HttpRequestInput {
    #[serde(default = "default_method")]
    method: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    pseudo_headers: Option<BTreeMap<String, String>>,
    #[serde(default)]
    headers: BTreeMap<String, String>,
    #[serde(default)]
    body: String,
}

fn default_method() -> String {
    "GET".to_string()
}

#[derive(Debug, Serialize)]
struct HttpResponseSummary {
    status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pseudo_headers: Option<BTreeMap<String, String>>,
    headers: BTreeMap<String, String>,
    body: String,
}

/// Cut `body` to `max_chars` characters, marking the cut
pub fn truncate_body(body: &str, max_chars: usize) -> String {
    if body.chars().count() <= max_chars {
        return body.to_string();
    }
    let mut truncated: String = body.chars().take(max_chars).collect();
    truncated.push_str("... (truncated)");
    truncated
}

fn build_headers(headers: &BTreeMap<String, String>) -> Result<HeaderMap, String> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| format!("invalid header name {}: {}", name, e))?;
        let value = HeaderValue::from_str(value).map_err(|e| format!("invalid header value for {}: {}", name, e))?;
        map.insert(name, value);
    }
    Ok(map)
}

fn request_schema(http2: bool) -> Value {
    let mut schema = serde_json::json!({
        "type": "object",
        "properties": {
            "method": { "type": "string", "default": "GET" },
            "url": { "type": "string" },
            "headers": {
                "type": "object",
                "additionalProperties": { "type": "string" }
            },
            "body": { "type": "string", "default": "" }
        },
        "required": ["url"]
    });
    if http2 {
        schema["properties"]["pseudo_headers"] = serde_json::json!({
            "type": "object",
            "additionalProperties": { "type": "string" }
        });
    }
    schema
}

async fn send(input: HttpRequestInput, ctx: &ToolContext, http2: bool) -> ToolResult {
    let label = if http2 { "HTTP/2" } else { "HTTP/1.1" };
    let error_prefix = if http2 {
        "Error sending HTTP/2 request"
    } else {
        "Error sending HTTP request"
    };

    let Some(url) = input.url.as_deref().filter(|u| !u.is_empty()) else {
        return ToolResult::error("Error: URL is required");
    };

    let method = match Method::from_bytes(input.method.to_uppercase().as_bytes()) {
        Ok(method) => method,
        Err(e) => return ToolResult::error(format!("{}: {}", error_prefix, e)),
    };

    let headers = match build_headers(&input.headers) {
        Ok(headers) => headers,
        Err(e) => return ToolResult::error(format!("{}: {}", error_prefix, e)),
    };

    let response = match ctx
        .http
        .request(method, url)
        .headers(headers)
        .body(input.body)
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => {
            log::error!("{}: {}", error_prefix, e);
            return ToolResult::error(format!("{}: {}", error_prefix, e));
        }
    };

    let status = response.status().as_u16();
    let version = format!("{:?}", response.version());
    let response_headers = response
        .headers()
        .iter()
        .map(|(name, value)| (name.to_string(), String::from_utf8_lossy(value.as_bytes()).to_string()))
        .collect();

    let text = match response.text().await {
        Ok(text) => text,
        Err(e) => return ToolResult::error(format!("{}: {}", error_prefix, e)),
    };

    let summary = HttpResponseSummary {
        status,
        version: http2.then_some(version),
        pseudo_headers: if http2 { input.pseudo_headers } else { None },
        headers: response_headers,
        body: truncate_body(&text, ctx.max_body_chars),
    };

    log::info!("{} request completed: {}", label, status);
    ToolResult::success(serde_json::to_string_pretty(&summary).unwrap_or_default())
}

pub struct Http1RequestTool;

#[async_trait]
impl Tool for Http1RequestTool {
    fn name(&self) -> &'static str {
        "send_http1_request"
    }

    fn description(&self) -> &'static str {
        "Issues an HTTP/1.1 request and returns response. Use this to test web applications."
    }

    fn input_schema(&self) -> Value {
        request_schema(false)
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let input: HttpRequestInput = parse_input(self.name(), input)?;
        Ok(send(input, ctx, false).await)
    }
}

pub struct Http2RequestTool;

#[async_trait]
impl Tool for Http2RequestTool {
    fn name(&self) -> &'static str {
        "send_http2_request"
    }

    fn description(&self) -> &'static str {
        "Issues an HTTP/2 request and returns response. Do NOT pass headers to body parameter."
    }

    fn input_schema(&self) -> Value {
        request_schema(true)
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let input: HttpRequestInput = parse_input(self.name(), input)?;
        Ok(send(input, ctx, true).await)
    }
}
