//! Word document reading tool

use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::ToolError;
use crate::tools::filesystem::resolve_existing;
use crate::tools::{require_str, BoxFuture, Tool, ToolOutput};

use super::{expect_format, DocumentFormat};

/// Tool for reading the paragraphs of a .docx file
pub struct ReadWordDocument {
    workspace: PathBuf,
}

impl ReadWordDocument {
    pub fn new(workspace: PathBuf) -> Self {
        Self { workspace }
    }
}

impl Tool for ReadWordDocument {
    fn name(&self) -> &str {
        "read_word_document"
    }

    fn description(&self) -> &str {
        "Read all text content from a Word document (.docx)"
    }

    fn parameters_schema(&self) -> Value {
        crate::tool_params!(file_path: "string" => "Path to the Word document")
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let path = resolve_existing(&self.workspace, require_str(&params, "file_path")?)?;
            expect_format(&path, DocumentFormat::Word)?;

            let text = extract_word_text(&path)?;
            let paragraphs: Vec<&str> = text
                .lines()
                .map(str::trim_end)
                .filter(|l| !l.trim().is_empty())
                .collect();
            Ok(ToolOutput::success(paragraphs.join("\n"))
                .with_metadata("paragraphs", paragraphs.len()))
        })
    }
}

fn extract_word_text(path: &Path) -> Result<String, ToolError> {
    use dotext::*;

    let mut text = String::new();
    Docx::open(path)
        .map_err(|e| ToolError::failed("Failed to parse DOCX", e))?
        .read_to_string(&mut text)
        .map_err(|e| ToolError::failed("Failed to read DOCX content", e))?;

    Ok(text)
}
