//! agenttools CLI - list and invoke agent tools from the command line
//!
//! A thin host over agenttools-core: every subcommand builds the same
//! registry an embedding agent would use.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

use agenttools_core::config::ConfigManager;
use agenttools_core::{CommandGate, Outcome, ToolRegistryBuilder};

#[derive(Parser)]
#[command(name = "agenttools")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Guarded shell, file, CSV, web and document tools for agent hosts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Workspace directory the tools are confined to
    #[arg(short, long, global = true)]
    workspace: Option<PathBuf>,

    /// Config file (defaults to the user config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show available tools
    Tools {
        /// Print full definitions as JSON
        #[arg(long)]
        json: bool,
    },

    /// Invoke a tool and print its result
    Call {
        /// Tool name
        name: String,

        /// Parameters as a JSON object
        #[arg(default_value = "{}")]
        args: String,
    },

    /// Run a command through the safety gate
    Run {
        /// Command line to run
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Check a command against the denylist without running it
    Check {
        /// Command line to check
        command: String,
    },

    /// Show configuration
    Config {
        /// Write the default configuration if no file exists yet
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let mut manager = match &cli.config {
        Some(path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    }
    .context("Failed to load configuration")?;

    // RUST_LOG wins over both --verbose and the configured level
    let default_filter = if cli.verbose {
        "info,agenttools_core=debug".to_string()
    } else {
        manager.config().general.log_level.clone()
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let workspace = resolve_workspace(
        cli.workspace
            .as_deref()
            .or(manager.config().general.workspace_dir.as_deref()),
    );
    tracing::debug!(workspace = %workspace.display(), "Resolved workspace");

    match cli.command {
        Commands::Tools { json } => {
            show_tools(&workspace, &manager, json)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Call { name, args } => {
            let params: serde_json::Value =
                serde_json::from_str(&args).context("Tool arguments must be a JSON object")?;
            let registry = ToolRegistryBuilder::new(workspace)
                .with_config(manager.config().clone())
                .build()?;
            let result = registry.invoke(&name, params).await;
            println!("{}", result);
            Ok(if result.starts_with("Error: ") {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }
        Commands::Run { command } => {
            let gate = CommandGate::from_config(&manager.config().shell);
            let outcome = gate.run(&command.join(" "), Some(&workspace));
            print_outcome(&outcome);
            Ok(exit_code(outcome.is_success()))
        }
        Commands::Check { command } => {
            let gate = CommandGate::from_config(&manager.config().shell);
            match gate.blocked_pattern(&command) {
                Some(pattern) => {
                    println!(
                        "{} matches disallowed pattern '{}'",
                        style("Blocked:").red().bold(),
                        pattern
                    );
                    Ok(ExitCode::FAILURE)
                }
                None => {
                    println!("{}", style("Allowed").green().bold());
                    Ok(ExitCode::SUCCESS)
                }
            }
        }
        Commands::Config { init } => {
            if init {
                init_config(&mut manager)?;
            }
            show_config(&workspace, &manager)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Absolute workspace path; falls back to the current directory
fn resolve_workspace(requested: Option<&Path>) -> PathBuf {
    let requested = requested.unwrap_or(Path::new("."));
    std::fs::canonicalize(requested).unwrap_or_else(|_| {
        if requested.is_absolute() {
            requested.to_path_buf()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(requested))
                .unwrap_or_else(|_| requested.to_path_buf())
        }
    })
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn print_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::Success { .. } => print!("{}", outcome),
        Outcome::Rejected { .. } => {
            eprintln!("{}", style(outcome.to_string()).red().bold());
        }
        Outcome::ExecutionFailed { .. } => {
            eprintln!("{}", style(outcome.to_string()).yellow());
        }
        Outcome::SpawnError { .. } => {
            eprintln!("{}", style(outcome.to_string()).red());
        }
    }
}

fn show_tools(workspace: &Path, manager: &ConfigManager, json: bool) -> anyhow::Result<()> {
    let definitions = ToolRegistryBuilder::new(workspace.to_path_buf())
        .with_config(manager.config().clone())
        .build()?
        .list();

    if json {
        println!("{}", serde_json::to_string_pretty(&definitions)?);
        return Ok(());
    }

    println!("{}", style("Available Tools:").bold());
    println!();
    let width = definitions.iter().map(|d| d.name.len()).max().unwrap_or(0);
    for def in &definitions {
        println!(
            "  {}  {}",
            style(format!("{:<width$}", def.name, width = width)).cyan(),
            style(&def.description).dim()
        );
    }
    println!();
    println!("  {} tools", definitions.len());
    Ok(())
}

fn init_config(manager: &mut ConfigManager) -> anyhow::Result<()> {
    if manager.path().exists() {
        println!(
            "{} {}",
            style("Config already exists:").yellow(),
            manager.path().display()
        );
        return Ok(());
    }
    manager.save()?;
    println!(
        "{} {}",
        style("Wrote default config to").green(),
        manager.path().display()
    );
    println!();
    Ok(())
}

fn show_config(workspace: &Path, manager: &ConfigManager) -> anyhow::Result<()> {
    println!("{}", style("Configuration:").bold());
    println!();
    println!("  Workspace: {}", style(workspace.display()).green());
    let status = if manager.path().exists() {
        style("").dim()
    } else {
        style(" (not created, using defaults)").dim()
    };
    println!(
        "  Config file: {}{}",
        style(manager.path().display()).cyan(),
        status
    );
    println!();
    println!("{}", toml::to_string_pretty(manager.config())?);
    Ok(())
}
