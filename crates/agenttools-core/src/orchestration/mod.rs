//! Orchestration module shared by hosts
//!
//! This module contains the glue a host needs around the tools:
//! - Registry construction from configuration
//! - Tool result formatting

mod tool_registry;
mod tool_result;

pub use tool_registry::{standard_tool_definitions, ToolRegistryBuilder};
pub use tool_result::format_tool_result;
