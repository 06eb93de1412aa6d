//! Word document authoring tools
//!
//! Every edit reads the whole document with docx-rs, appends or changes
//! body content, and packs it back to the same path.

use docx_rs::{
    read_docx, BreakType, DocumentChild, Docx, Paragraph, Run, Table, TableCell, TableChild,
    TableRow, TableRowChild,
};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::ToolError;
use crate::formatting::split_list;
use crate::tools::filesystem::{
    ensure_parent, path_to_display, resolve_existing, resolve_in_workspace,
};
use crate::tools::{require_str, BoxFuture, Tool, ToolOutput};

use super::{expect_format, DocumentFormat};

const MAX_HEADING_LEVEL: i64 = 9;

fn existing_docx(workspace: &Path, params: &Value) -> Result<PathBuf, ToolError> {
    let path = resolve_existing(workspace, require_str(params, "file_path")?)?;
    expect_format(&path, DocumentFormat::Word)?;
    Ok(path)
}

fn load(path: &Path) -> Result<Docx, ToolError> {
    let bytes = std::fs::read(path)?;
    read_docx(&bytes).map_err(|e| ToolError::failed("Failed to parse DOCX", e))
}

fn save(docx: Docx, path: &Path) -> Result<(), ToolError> {
    let file = std::fs::File::create(path)
        .map_err(|e| ToolError::failed("Failed to create DOCX file", e))?;
    docx.build()
        .pack(file)
        .map_err(|e| ToolError::failed("Failed to write DOCX", e))?;
    debug!(path = %path_to_display(path), "Saved Word document");
    Ok(())
}

/// Load, transform and save in one step
fn edit(path: &Path, change: impl FnOnce(Docx) -> Result<Docx, ToolError>) -> Result<(), ToolError> {
    let docx = change(load(path)?)?;
    save(docx, path)
}

fn text_paragraph(text: &str) -> Paragraph {
    Paragraph::new().add_run(Run::new().add_text(text))
}

/// Heading paragraph; level 0 is the document title
fn heading_paragraph(text: &str, level: i64) -> Paragraph {
    let (style, size) = match level {
        0 => ("Title".to_string(), 36),
        1 => ("Heading1".to_string(), 32),
        2 => ("Heading2".to_string(), 28),
        n => (format!("Heading{}", n), 24),
    };
    Paragraph::new()
        .style(&style)
        .add_run(Run::new().add_text(text).bold().size(size))
}

/// Non-negative integer parameter
fn index_param(params: &Value, key: &str) -> Result<usize, ToolError> {
    let raw = params[key]
        .as_i64()
        .ok_or_else(|| ToolError::InvalidParams(format!("{} is required", key)))?;
    usize::try_from(raw)
        .map_err(|_| ToolError::InvalidParams(format!("{} must not be negative", key)))
}

/// Replace the text of one cell of the `table_index`-th table in the body
fn set_cell_text(
    docx: &mut Docx,
    table_index: usize,
    row: usize,
    col: usize,
    text: &str,
) -> Result<(), ToolError> {
    let table = docx
        .document
        .children
        .iter_mut()
        .filter_map(|child| match child {
            DocumentChild::Table(table) => Some(table),
            _ => None,
        })
        .nth(table_index)
        .ok_or_else(|| {
            ToolError::InvalidParams(format!("Table index {} out of range", table_index))
        })?;

    let out_of_range =
        || ToolError::InvalidParams(format!("Cell position ({}, {}) out of range", row, col));
    let Some(TableChild::TableRow(table_row)) = table.rows.get_mut(row) else {
        return Err(out_of_range());
    };
    let Some(TableRowChild::TableCell(cell)) = table_row.cells.get_mut(col) else {
        return Err(out_of_range());
    };
    cell.children = TableCell::new().add_paragraph(text_paragraph(text)).children;
    Ok(())
}

/// Tool for creating an empty Word document
pub struct CreateWordDocument {
    workspace: PathBuf,
}

impl CreateWordDocument {
    pub fn new(workspace: PathBuf) -> Self {
        Self { workspace }
    }
}

impl Tool for CreateWordDocument {
    fn name(&self) -> &str {
        "create_word_document"
    }

    fn description(&self) -> &str {
        "Create a new empty Word document (.docx), replacing any existing file"
    }

    fn parameters_schema(&self) -> Value {
        crate::tool_params!(file_path: "string" => "Path where the document will be saved")
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let path = resolve_in_workspace(&self.workspace, require_str(&params, "file_path")?)?;
            expect_format(&path, DocumentFormat::Word)?;
            ensure_parent(&path).await?;
            save(Docx::new(), &path)?;

            Ok(ToolOutput::success(format!(
                "Word document created successfully at: {}",
                path_to_display(&path)
            )))
        })
    }
}

/// Tool for appending a heading
pub struct AddHeading {
    workspace: PathBuf,
}

impl AddHeading {
    pub fn new(workspace: PathBuf) -> Self {
        Self { workspace }
    }
}

impl Tool for AddHeading {
    fn name(&self) -> &str {
        "add_heading"
    }

    fn description(&self) -> &str {
        "Add a heading to a Word document (level 0 is the title, 1-9 are headings)"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path to the Word document"
                },
                "text": {
                    "type": "string",
                    "description": "Heading text"
                },
                "level": {
                    "type": "integer",
                    "description": "Heading level from 0 to 9",
                    "default": 1
                }
            },
            "required": ["file_path", "text"]
        })
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let path = existing_docx(&self.workspace, &params)?;
            let text = require_str(&params, "text")?;
            let level = params["level"].as_i64().unwrap_or(1);
            if !(0..=MAX_HEADING_LEVEL).contains(&level) {
                return Err(ToolError::InvalidParams(format!(
                    "Heading level must be between 0 and {}, got {}",
                    MAX_HEADING_LEVEL, level
                )));
            }

            edit(&path, |docx| Ok(docx.add_paragraph(heading_paragraph(text, level))))?;
            Ok(ToolOutput::success(format!(
                "Heading added successfully to: {}",
                path_to_display(&path)
            )))
        })
    }
}

/// Tool for appending a paragraph of text
pub struct AddParagraph {
    workspace: PathBuf,
}

impl AddParagraph {
    pub fn new(workspace: PathBuf) -> Self {
        Self { workspace }
    }
}

impl Tool for AddParagraph {
    fn name(&self) -> &str {
        "add_paragraph"
    }

    fn description(&self) -> &str {
        "Add a paragraph of text to a Word document"
    }

    fn parameters_schema(&self) -> Value {
        crate::tool_params!(
            file_path: "string" => "Path to the Word document",
            text: "string" => "Paragraph text",
        )
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let path = existing_docx(&self.workspace, &params)?;
            let text = require_str(&params, "text")?;

            edit(&path, |docx| Ok(docx.add_paragraph(text_paragraph(text))))?;
            Ok(ToolOutput::success(format!(
                "Paragraph added successfully to: {}",
                path_to_display(&path)
            )))
        })
    }
}

/// Tool for appending an empty table
pub struct AddTable {
    workspace: PathBuf,
}

impl AddTable {
    pub fn new(workspace: PathBuf) -> Self {
        Self { workspace }
    }
}

impl Tool for AddTable {
    fn name(&self) -> &str {
        "add_table"
    }

    fn description(&self) -> &str {
        "Add an empty table with the given number of rows and columns to a Word document"
    }

    fn parameters_schema(&self) -> Value {
        crate::tool_params!(
            file_path: "string" => "Path to the Word document",
            rows: "integer" => "Number of rows",
            cols: "integer" => "Number of columns",
        )
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let path = existing_docx(&self.workspace, &params)?;
            let rows = index_param(&params, "rows")?;
            let cols = index_param(&params, "cols")?;
            if rows == 0 || cols == 0 {
                return Err(ToolError::InvalidParams(
                    "A table needs at least one row and one column".into(),
                ));
            }

            let row = TableRow::new(vec![TableCell::new().add_paragraph(Paragraph::new()); cols]);
            edit(&path, |docx| Ok(docx.add_table(Table::new(vec![row; rows]))))?;
            Ok(ToolOutput::success(format!(
                "Table ({}x{}) added successfully to: {}",
                rows,
                cols,
                path_to_display(&path)
            )))
        })
    }
}

/// Tool for setting the text of a table cell
pub struct SetTableCell {
    workspace: PathBuf,
}

impl SetTableCell {
    pub fn new(workspace: PathBuf) -> Self {
        Self { workspace }
    }
}

impl Tool for SetTableCell {
    fn name(&self) -> &str {
        "set_table_cell"
    }

    fn description(&self) -> &str {
        "Set the text of a table cell (all indices 0-based)"
    }

    fn parameters_schema(&self) -> Value {
        crate::tool_params!(
            file_path: "string" => "Path to the Word document",
            table_index: "integer" => "Index of the table in the document (0-based)",
            row: "integer" => "Row index (0-based)",
            col: "integer" => "Column index (0-based)",
            text: "string" => "Text to put in the cell",
        )
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let path = existing_docx(&self.workspace, &params)?;
            let table_index = index_param(&params, "table_index")?;
            let row = index_param(&params, "row")?;
            let col = index_param(&params, "col")?;
            let text = require_str(&params, "text")?;

            edit(&path, |mut docx| {
                set_cell_text(&mut docx, table_index, row, col, text)?;
                Ok(docx)
            })?;
            Ok(ToolOutput::success(format!(
                "Cell ({}, {}) updated successfully in table {}",
                row, col, table_index
            )))
        })
    }
}

/// Tool for appending a page break
pub struct AddPageBreak {
    workspace: PathBuf,
}

impl AddPageBreak {
    pub fn new(workspace: PathBuf) -> Self {
        Self { workspace }
    }
}

impl Tool for AddPageBreak {
    fn name(&self) -> &str {
        "add_page_break"
    }

    fn description(&self) -> &str {
        "Add a page break to a Word document"
    }

    fn parameters_schema(&self) -> Value {
        crate::tool_params!(file_path: "string" => "Path to the Word document")
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let path = existing_docx(&self.workspace, &params)?;

            edit(&path, |docx| {
                Ok(docx.add_paragraph(
                    Paragraph::new().add_run(Run::new().add_break(BreakType::Page)),
                ))
            })?;
            Ok(ToolOutput::success(format!(
                "Page break added successfully to: {}",
                path_to_display(&path)
            )))
        })
    }
}

/// Tool for appending bullet items
pub struct AddBulletList {
    workspace: PathBuf,
}

impl AddBulletList {
    pub fn new(workspace: PathBuf) -> Self {
        Self { workspace }
    }
}

impl Tool for AddBulletList {
    fn name(&self) -> &str {
        "add_bullet_list"
    }

    fn description(&self) -> &str {
        "Add a bulleted list to a Word document, one bullet per comma-separated item"
    }

    fn parameters_schema(&self) -> Value {
        crate::tool_params!(
            file_path: "string" => "Path to the Word document",
            items: "string" => "Comma-separated list items",
        )
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let path = existing_docx(&self.workspace, &params)?;
            let items = split_list(require_str(&params, "items")?);
            if items.is_empty() {
                return Err(ToolError::InvalidParams("items must not be empty".into()));
            }

            edit(&path, |docx| {
                Ok(items.iter().fold(docx, |docx, item| {
                    docx.add_paragraph(text_paragraph(&format!("• {}", item)))
                }))
            })?;
            Ok(ToolOutput::success(format!(
                "Bullet list with {} items added successfully",
                items.len()
            )))
        })
    }
}
