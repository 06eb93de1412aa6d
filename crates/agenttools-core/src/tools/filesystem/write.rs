//! Write and append file tools

use serde_json::{json, Value};
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

use crate::error::ToolError;
use crate::tools::{require_str, BoxFuture, Tool, ToolOutput};

use super::{ensure_parent, path_to_display, resolve_in_workspace};

/// Tool for writing file contents, replacing what was there
pub struct WriteFile {
    workspace: PathBuf,
}

impl WriteFile {
    pub fn new(workspace: PathBuf) -> Self {
        Self { workspace }
    }
}

impl Tool for WriteFile {
    fn name(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Write text content to a file (UTF-8). Creates parent dirs if needed."
    }

    fn parameters_schema(&self) -> Value {
        crate::tool_params!(
            path: "string" => "File path (relative to workspace)",
            content: "string" => "The content to write to the file",
        )
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let path = resolve_in_workspace(&self.workspace, require_str(&params, "path")?)?;
            let content = require_str(&params, "content")?;

            ensure_parent(&path).await?;
            tokio::fs::write(&path, content).await?;

            Ok(ToolOutput::success(json!({
                "status": "ok",
                "path": path_to_display(&path),
                "bytes_written": content.len()
            })))
        })
    }
}

/// Tool for appending to a file, creating it if needed
pub struct AppendFile {
    workspace: PathBuf,
}

impl AppendFile {
    pub fn new(workspace: PathBuf) -> Self {
        Self { workspace }
    }
}

impl Tool for AppendFile {
    fn name(&self) -> &str {
        "append_file"
    }

    fn description(&self) -> &str {
        "Append text to a file (UTF-8). Creates file and parent dirs if needed."
    }

    fn parameters_schema(&self) -> Value {
        crate::tool_params!(
            path: "string" => "File path (relative to workspace)",
            content: "string" => "The text to append",
        )
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let path = resolve_in_workspace(&self.workspace, require_str(&params, "path")?)?;
            let content = require_str(&params, "content")?;

            ensure_parent(&path).await?;
            let mut file = tokio::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .await?;
            file.write_all(content.as_bytes()).await?;
            file.flush().await?;

            Ok(ToolOutput::success(json!({
                "status": "ok",
                "path": path_to_display(&path),
                "bytes_written": content.len()
            })))
        })
    }
}
