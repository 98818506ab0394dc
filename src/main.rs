use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use serde_json::Value;
use std::fs;

mod cli;

use cli::Cli;
use cli::commands::Commands;
use kali_mcp::config::Config;
use kali_mcp::mcp::{McpHandler, StdioServer};

/// Stdout carries the protocol, so logs go to stderr or a file
fn setup_logging(cli: &Cli, config: &Config) -> Result<()> {
    let level = config.log_level.as_deref().unwrap_or("info");
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level));

    if cli.is_verbose() {
        builder.filter_level(log::LevelFilter::Debug);
    }

    let log_file = cli.log_file.as_ref().or(config.log_file.as_ref());
    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).context("Failed to create log directory")?;
            }
            let target = Box::new(
                fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .context("Failed to open log file")?,
            );
            builder.target(env_logger::Target::Pipe(target));
        }
        None => {
            builder.target(env_logger::Target::Stderr);
        }
    }

    builder.init();

    if let Some(path) = log_file {
        info!("Logging initialized, writing to: {}", path.display());
    }
    Ok(())
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    match &cli.command {
        None | Some(Commands::Serve) => serve(config).await,
        Some(Commands::Tools { json }) => list_tools(config, *json),
        Some(Commands::Call { name, args }) => call_tool(config, name, args).await,
    }
}

async fn serve(config: &Config) -> Result<()> {
    let handler = McpHandler::from_config(config).context("Failed to initialize tools")?;
    let server = StdioServer::new(handler, config.transport.max_message_bytes);

    tokio::select! {
        result = server.run() => {
            result.context("MCP server failed")?;
            info!("Input closed, shutting down");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, shutting down");
            // The blocking stdin read cannot be cancelled, so runtime shutdown would wait on it
            std::process::exit(0);
        }
    }

    Ok(())
}

fn list_tools(config: &Config, json: bool) -> Result<()> {
    let handler = McpHandler::from_config(config).context("Failed to initialize tools")?;
    let definitions = handler.registry().definitions();

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&definitions).context("Failed to serialize tool descriptors")?
        );
        return Ok(());
    }

    println!("{} {}", "Enabled tools:".cyan(), definitions.len());
    for def in &definitions {
        println!("  {} - {}", def.name.green().bold(), def.description);
    }
    Ok(())
}

async fn call_tool(config: &Config, name: &str, args: &str) -> Result<()> {
    let arguments: Value = serde_json::from_str(args).context("--args must be valid JSON")?;
    let handler = McpHandler::from_config(config).context("Failed to initialize tools")?;

    info!("Calling tool {} from the command line", name);
    let result = handler.call_tool(name, arguments).await;

    if result.is_error {
        eprintln!("{}", result.content.red());
        eyre::bail!("Tool {} failed", name);
    }

    println!("{}", result.content);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let (config, source) = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    setup_logging(&cli, &config).context("Failed to setup logging")?;

    info!("Starting with config from: {}", source);

    run_application(&cli, &config).await.context("Application failed")?;

    Ok(())
}
