//! CLI module for kali-mcp - command-line interface and subcommands.
//!
//! Serving over stdio is the default; `tools` and `call` inspect and
//! exercise the tool set locally.

pub mod commands;

pub use commands::Cli;
