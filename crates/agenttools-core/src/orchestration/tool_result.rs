//! Tool result formatting
//!
//! Collapses every way a tool call can end into the single string a host
//! receives.

use crate::error::ToolError;
use crate::tools::ToolOutput;

/// Render a tool call result; errors become `"Error: ..."` text
pub fn format_tool_result(result: Result<ToolOutput, ToolError>) -> String {
    match result {
        Ok(output) => output.to_text(),
        Err(err) => format!("Error: {}", err),
    }
}
