//! Agenttools Core - tool adapters for agent hosts
//!
//! This crate provides the functions an agent host exposes as tools:
//! - A guarded shell gate that refuses destructive commands before spawning
//! - Workspace-confined file I/O
//! - CSV, web, PDF and Office document tools
//! - A registry that turns every call into a single result string

pub mod config;
pub mod error;
pub mod formatting;
pub mod orchestration;
pub mod tools;

pub use config::{Config, ConfigManager};
pub use error::{Error, Result};
pub use formatting::{format_size, truncate_output, truncate_str};
pub use orchestration::{format_tool_result, standard_tool_definitions, ToolRegistryBuilder};
pub use tools::shell::{CommandGate, Denylist, Outcome, DEFAULT_DENYLIST};
pub use tools::{Tool, ToolDefinition, ToolOutput, ToolRegistry};
