//! Ensure directory tool

use serde_json::{json, Value};
use std::path::PathBuf;

use crate::error::ToolError;
use crate::tools::{require_str, BoxFuture, Tool, ToolOutput};

use super::{path_to_display, resolve_in_workspace};

/// Tool for creating a directory tree
pub struct EnsureDir {
    workspace: PathBuf,
}

impl EnsureDir {
    pub fn new(workspace: PathBuf) -> Self {
        Self { workspace }
    }
}

impl Tool for EnsureDir {
    fn name(&self) -> &str {
        "ensure_dir"
    }

    fn description(&self) -> &str {
        "Ensure a directory exists; create it if missing."
    }

    fn parameters_schema(&self) -> Value {
        crate::tool_params!(path: "string" => "Directory path (relative to workspace)")
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let path = resolve_in_workspace(&self.workspace, require_str(&params, "path")?)?;

            if path.is_file() {
                return Err(ToolError::ExecutionFailed(format!(
                    "{} exists and is a file",
                    path_to_display(&path)
                )));
            }
            tokio::fs::create_dir_all(&path).await?;

            Ok(ToolOutput::success(json!({
                "status": "ok",
                "path": path_to_display(&path)
            })))
        })
    }
}
