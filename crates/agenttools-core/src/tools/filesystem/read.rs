//! Read file tool

use serde_json::{json, Value};
use std::path::PathBuf;
use tokio::io::AsyncReadExt;

use crate::error::ToolError;
use crate::tools::{require_str, BoxFuture, Tool, ToolOutput};

use super::{path_to_display, resolve_existing};

/// Tool for reading file contents
pub struct ReadFile {
    workspace: PathBuf,
    max_bytes: u64,
}

impl ReadFile {
    pub fn new(workspace: PathBuf) -> Self {
        Self {
            workspace,
            max_bytes: crate::config::FilesConfig::default().max_read_bytes,
        }
    }

    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }
}

impl Tool for ReadFile {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Read up to max_bytes of a text file (UTF-8)."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Path to the file to read (relative to workspace)"
                },
                "max_bytes": {
                    "type": "integer",
                    "description": format!("Maximum bytes to read (default: {})", self.max_bytes),
                    "default": self.max_bytes
                }
            },
            "required": ["path"]
        })
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let path = resolve_existing(&self.workspace, require_str(&params, "path")?)?;
            let max_bytes = params["max_bytes"].as_u64().unwrap_or(self.max_bytes);

            let file = tokio::fs::File::open(&path).await?;
            let total = file.metadata().await?.len();

            let mut buf = Vec::new();
            file.take(max_bytes).read_to_end(&mut buf).await?;
            let truncated = total > max_bytes;
            if truncated {
                drop_partial_char(&mut buf);
            }
            let content = String::from_utf8_lossy(&buf).into_owned();

            Ok(ToolOutput::success(json!({
                "status": "ok",
                "content": content,
                "path": path_to_display(&path),
                "truncated": truncated
            })))
        })
    }
}

/// Drop a UTF-8 sequence cut off at the end of `buf`
fn drop_partial_char(buf: &mut Vec<u8>) {
    let tail = buf.len().saturating_sub(3);
    for i in (tail..buf.len()).rev() {
        let byte = buf[i];
        if byte & 0xC0 == 0x80 {
            continue;
        }
        let width = match byte {
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => 1,
        };
        if i + width > buf.len() {
            buf.truncate(i);
        }
        return;
    }
}
