//! kali-mcp - MCP server exposing Kali Linux tooling to AI agents
//!
//! Package listing, Burp Suite control, generic security tool runs, encoding
//! helpers and raw HTTP requests, served as MCP tools over stdio.

pub mod config;
pub mod error;
pub mod mcp;
pub mod prompts;
pub mod tools;

pub use error::{KaliMcpError, Result};
