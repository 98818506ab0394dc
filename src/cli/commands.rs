//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - serve: run the MCP server on stdio (default)
//! - tools: list the enabled tools
//! - call: invoke one tool and print its result

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// kali-mcp - MCP server for Kali Linux tooling and Burp Suite
#[derive(Parser, Debug)]
#[command(name = "kali-mcp")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Append logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve MCP over stdin/stdout
    Serve,

    /// List the enabled tools
    Tools {
        /// Print the tool descriptors as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Invoke a single tool and print its result
    Call {
        /// Tool name
        name: String,

        /// Tool arguments as a JSON object
        #[arg(short, long, default_value = "{}")]
        args: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse_no_args() {
        // No args falls back to serving
        let cli = Cli::try_parse_from(["kali-mcp"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.verbose);
        assert!(cli.config.is_none());
        assert!(cli.log_file.is_none());
    }

    #[test]
    fn test_cli_verbose_flag() {
        let cli = Cli::try_parse_from(["kali-mcp", "-v"]).unwrap();
        assert!(cli.is_verbose());
    }

    #[test]
    fn test_cli_config_option() {
        let cli = Cli::try_parse_from(["kali-mcp", "-c", "/etc/kali-mcp.yml"]).unwrap();
        assert_eq!(cli.config.as_ref(), Some(&PathBuf::from("/etc/kali-mcp.yml")));
    }

    #[test]
    fn test_cli_log_file_after_subcommand() {
        let cli = Cli::try_parse_from(["kali-mcp", "serve", "--log-file", "/tmp/kali.log"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Serve)));
        assert_eq!(cli.log_file, Some(PathBuf::from("/tmp/kali.log")));
    }

    #[test]
    fn test_tools_command() {
        let cli = Cli::try_parse_from(["kali-mcp", "tools"]).unwrap();
        match cli.command {
            Some(Commands::Tools { json }) => assert!(!json),
            _ => panic!("Expected tools command"),
        }

        let cli = Cli::try_parse_from(["kali-mcp", "tools", "--json"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Tools { json: true })));
    }

    #[test]
    fn test_call_command_default_args() {
        let cli = Cli::try_parse_from(["kali-mcp", "call", "list_kali_tools"]).unwrap();
        match cli.command {
            Some(Commands::Call { name, args }) => {
                assert_eq!(name, "list_kali_tools");
                assert_eq!(args, "{}");
            }
            _ => panic!("Expected call command"),
        }
    }

    #[test]
    fn test_call_command_with_args() {
        let cli =
            Cli::try_parse_from(["kali-mcp", "call", "list_kali_tools", "--args", r#"{"category":"nmap"}"#]).unwrap();
        match cli.command {
            Some(Commands::Call { args, .. }) => assert_eq!(args, r#"{"category":"nmap"}"#),
            _ => panic!("Expected call command"),
        }
    }

    #[test]
    fn test_call_requires_name() {
        assert!(Cli::try_parse_from(["kali-mcp", "call"]).is_err());
    }

    #[test]
    fn test_help_works() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_version_flag() {
        let result = Cli::try_parse_from(["kali-mcp", "--version"]);
        assert!(result.is_err());
    }
}
