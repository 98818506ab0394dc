//! Prompt catalog - static templates served through `prompts/list` and `prompts/get`
//!
//! Templates are rendered with Handlebars; missing arguments fall back to
//! the defaults declared per prompt.

use std::collections::HashMap;

use handlebars::Handlebars;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::tools::SECURITY_CATEGORIES;

const DEFAULT_TARGET: &str = "https://example.com";
const DEFAULT_SCAN_TYPE: &str = "passive";

const PENTEST_ROLE_TEMPLATE: &str = "\
You are playing the role of a security engineer; I am playing a system operator.

Your tasks:
1. Analyse the security posture of the target system {{target}}
2. Identify potential vulnerabilities and risks
3. Recommend targeted security tests
4. Verify findings with the available penetration testing tools

Available tool categories:
{{#each categories}}
- {{this}}
{{/each}}

Workflow:
1. Start with information gathering to understand the target
2. Run vulnerability scans to surface potential issues
3. Pick suitable tools for in-depth testing based on the scan results
4. Finish with a detailed penetration test report

Notes:
- Every test must be authorized
- Follow applicable laws and ethical guidelines
- Record every test step and its result
";

const BURP_ASSISTANT_TEMPLATE: &str = "\
You are a Burp Suite security testing assistant helping the user test web applications.

Target: {{target}}
Scan type: {{scan_type}}

Your tasks:
1. Run security tests with Burp Suite
2. Analyse HTTP requests and responses
3. Identify common vulnerabilities
4. Suggest remediations

Burp Suite features available:
- Proxy - intercept and modify HTTP traffic
- Repeater - test HTTP requests by hand
- Intruder - automated fuzzing
- Scanner - automated vulnerability scanning
- Decoder - encoding and decoding
- Comparer - compare responses

Workflow:
1. Configure the Burp Suite proxy
2. Intercept the target application's HTTP traffic
3. Send requests to Repeater for testing
4. Fuzz with Intruder
5. Run Scanner to find vulnerabilities
6. Analyse the results and write a report

Notes:
- Stay within the authorized scope
- Follow responsible disclosure
- Keep test data secure
";

/// Prompt argument descriptor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptArgument {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
}

/// Prompt descriptor as advertised by `prompts/list`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub arguments: Vec<PromptArgument>,
}

/// A rendered prompt, ready to wrap in a `prompts/get` result
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPrompt {
    pub description: &'static str,
    pub text: String,
}

#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    #[error("Unknown prompt: {0}")]
    UnknownPrompt(String),

    #[error("Failed to render prompt {name}: {message}")]
    Render { name: String, message: String },
}

struct PromptTemplate {
    descriptor: PromptDescriptor,
    template: &'static str,
    defaults: &'static [(&'static str, &'static str)],
}

/// Static prompt catalog
pub struct PromptCatalog {
    handlebars: Handlebars<'static>,
    prompts: Vec<PromptTemplate>,
}

impl Default for PromptCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptCatalog {
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(false);
        // Plain text output, no HTML escaping
        handlebars.register_escape_fn(handlebars::no_escape);

        let prompts = vec![
            PromptTemplate {
                descriptor: PromptDescriptor {
                    name: "pentest-role",
                    description: "Penetration testing role-playing prompt",
                    arguments: vec![PromptArgument {
                        name: "target",
                        description: "Target website for testing",
                        required: false,
                    }],
                },
                template: PENTEST_ROLE_TEMPLATE,
                defaults: &[("target", DEFAULT_TARGET)],
            },
            PromptTemplate {
                descriptor: PromptDescriptor {
                    name: "burp-assistant",
                    description: "Burp Suite assistant prompt for AI-assisted security testing",
                    arguments: vec![
                        PromptArgument {
                            name: "target",
                            description: "Target web application",
                            required: false,
                        },
                        PromptArgument {
                            name: "scan_type",
                            description: "Scan type (default: passive)",
                            required: false,
                        },
                    ],
                },
                template: BURP_ASSISTANT_TEMPLATE,
                defaults: &[("target", DEFAULT_TARGET), ("scan_type", DEFAULT_SCAN_TYPE)],
            },
        ];

        Self { handlebars, prompts }
    }

    /// Descriptors for `prompts/list`
    pub fn list(&self) -> Vec<PromptDescriptor> {
        self.prompts.iter().map(|p| p.descriptor.clone()).collect()
    }

    /// Render a prompt with caller arguments over the declared defaults
    ///
    /// Empty or non-string arguments count as absent.
    pub fn render(&self, name: &str, arguments: &Map<String, Value>) -> Result<RenderedPrompt, PromptError> {
        let prompt = self
            .prompts
            .iter()
            .find(|p| p.descriptor.name == name)
            .ok_or_else(|| PromptError::UnknownPrompt(name.to_string()))?;

        let mut values: HashMap<&str, Value> = HashMap::new();
        for &(key, default) in prompt.defaults {
            let value = arguments
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .unwrap_or(default);
            values.insert(key, Value::String(value.to_string()));
        }
        values.insert("categories", serde_json::json!(SECURITY_CATEGORIES));

        let text = self
            .handlebars
            .render_template(prompt.template, &values)
            .map_err(|e| PromptError::Render {
                name: name.to_string(),
                message: e.to_string(),
            })?;

        Ok(RenderedPrompt {
            description: prompt.descriptor.description,
            text,
        })
    }
}
