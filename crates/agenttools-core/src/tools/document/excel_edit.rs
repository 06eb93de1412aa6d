//! Spreadsheet editing tools
//!
//! A workbook is loaded with calamine into an in-memory grid, edited, and
//! written back with rust_xlsxwriter. Only cached cell values survive a
//! round trip; formatting, formulas and charts are not carried over.

use calamine::{open_workbook_auto, Data, Reader};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::ToolError;
use crate::formatting::split_list;
use crate::tools::filesystem::{
    ensure_parent, extension_of, path_to_display, resolve_in_workspace,
};
use crate::tools::{optional_str, require_str, BoxFuture, Tool, ToolOutput};

use super::excel::{cell_json, parse_cell_ref, parse_range_ref};
use super::{expect_format, DocumentFormat};

const DEFAULT_SHEET: &str = "Sheet1";

/// One worksheet as absolute zero-based (row, column) -> value
#[derive(Debug, Clone, Default)]
struct EditableSheet {
    name: String,
    cells: BTreeMap<(u32, u32), Data>,
}

impl EditableSheet {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: BTreeMap::new(),
        }
    }

    fn set(&mut self, position: (u32, u32), value: Data) {
        if matches!(value, Data::Empty) {
            self.cells.remove(&position);
        } else {
            self.cells.insert(position, value);
        }
    }
}

/// Sheets in workbook order
#[derive(Debug, Clone, Default)]
struct EditableWorkbook {
    sheets: Vec<EditableSheet>,
}

impl EditableWorkbook {
    fn with_sheets<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sheets: names.into_iter().map(EditableSheet::new).collect(),
        }
    }

    fn load(path: &Path) -> Result<Self, ToolError> {
        let mut workbook = open_workbook_auto(path)
            .map_err(|e| ToolError::failed("Failed to open Excel file", e))?;

        let mut sheets = Vec::new();
        for name in workbook.sheet_names() {
            let range = workbook
                .worksheet_range(&name)
                .map_err(|e| ToolError::failed(format!("Failed to read sheet '{}'", name), e))?;
            let (top, left) = range.start().unwrap_or((0, 0));
            let mut sheet = EditableSheet::new(name);
            for (row, col, value) in range.used_cells() {
                sheet.set((top + row as u32, left + col as u32), value.clone());
            }
            sheets.push(sheet);
        }
        Ok(Self { sheets })
    }

    /// Load `path` if it exists, otherwise start a workbook with one default sheet
    fn load_or_new(path: &Path) -> Result<Self, ToolError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::with_sheets([DEFAULT_SHEET]))
        }
    }

    fn names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.sheets.iter().position(|s| s.name == name)
    }

    /// The named sheet, or the first sheet when no name is given
    fn sheet_mut(&mut self, name: Option<&str>) -> Result<&mut EditableSheet, ToolError> {
        let index = match name {
            Some(n) => self.position(n).ok_or_else(|| {
                ToolError::ResourceNotFound(format!(
                    "Sheet '{}' not found. Available sheets: {}",
                    n,
                    self.names().join(", ")
                ))
            })?,
            None if self.sheets.is_empty() => {
                return Err(ToolError::ExecutionFailed("Workbook has no sheets".into()));
            }
            None => 0,
        };
        Ok(&mut self.sheets[index])
    }

    /// Like [`Self::sheet_mut`] but a missing named sheet is appended
    fn sheet_or_create(&mut self, name: Option<&str>) -> Result<&mut EditableSheet, ToolError> {
        if let Some(n) = name {
            if self.position(n).is_none() {
                self.sheets.push(EditableSheet::new(n));
            }
        }
        self.sheet_mut(name)
    }

    fn save(&self, path: &Path) -> Result<(), ToolError> {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        for sheet in &self.sheets {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(sheet.name.as_str()).map_err(|e| {
                ToolError::InvalidParams(format!("Invalid sheet name '{}': {}", sheet.name, e))
            })?;
            for (&(row, col), value) in &sheet.cells {
                let col = u16::try_from(col).map_err(|_| {
                    ToolError::InvalidParams(format!("Column {} is beyond the sheet limit", col + 1))
                })?;
                let written = match value {
                    Data::Empty => continue,
                    Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
                        worksheet.write_string(row, col, s.as_str())
                    }
                    Data::Float(f) => worksheet.write_number(row, col, *f),
                    Data::Int(i) => worksheet.write_number(row, col, *i as f64),
                    Data::Bool(b) => worksheet.write_boolean(row, col, *b),
                    Data::DateTime(dt) => worksheet.write_number(row, col, dt.as_f64()),
                    Data::Error(e) => worksheet.write_string(row, col, e.to_string()),
                };
                written.map_err(|e| ToolError::failed("Failed to write cell", e))?;
            }
        }
        workbook.save(path).map_err(|e| {
            ToolError::failed(format!("Failed to save workbook {}", path_to_display(path)), e)
        })?;
        debug!(path = %path_to_display(path), sheets = self.sheets.len(), "Saved workbook");
        Ok(())
    }
}

/// Resolve the workbook path for a write; only .xlsx can be written
fn target(workspace: &Path, params: &Value) -> Result<PathBuf, ToolError> {
    let path = resolve_in_workspace(workspace, require_str(params, "path")?)?;
    expect_format(&path, DocumentFormat::Excel)?;
    if extension_of(&path) != "xlsx" {
        return Err(ToolError::InvalidParams(
            "Only .xlsx workbooks can be written".into(),
        ));
    }
    Ok(path)
}

fn existing_target(workspace: &Path, params: &Value) -> Result<PathBuf, ToolError> {
    let path = target(workspace, params)?;
    if !path.exists() {
        return Err(ToolError::ResourceNotFound(format!(
            "File not found: {}",
            path_to_display(&path)
        )));
    }
    Ok(path)
}

/// Text that looks numeric becomes a number: with a `.` as a float, otherwise an integer
fn coerce_text(text: &str) -> Data {
    let parsed = if text.contains('.') {
        text.parse::<f64>().ok().map(Data::Float)
    } else {
        text.parse::<i64>().ok().map(Data::Int)
    };
    parsed.unwrap_or_else(|| Data::String(text.to_string()))
}

/// JSON value as a cell; strings are kept as text
fn json_cell(value: &Value) -> Data {
    match value {
        Value::Null => Data::Empty,
        Value::Bool(b) => Data::Bool(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Data::Int(i),
            None => Data::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => Data::String(s.clone()),
        other => Data::String(other.to_string()),
    }
}

/// Tool for creating an empty workbook
pub struct CreateWorkbook {
    workspace: PathBuf,
}

impl CreateWorkbook {
    pub fn new(workspace: PathBuf) -> Self {
        Self { workspace }
    }
}

impl Tool for CreateWorkbook {
    fn name(&self) -> &str {
        "create_workbook"
    }

    fn description(&self) -> &str {
        "Create a new Excel workbook (.xlsx), replacing any existing file"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Path where the workbook will be saved"
                },
                "sheet_names": {
                    "type": "string",
                    "description": "Comma-separated sheet names (defaults to 'Sheet1')"
                }
            },
            "required": ["path"]
        })
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let path = target(&self.workspace, &params)?;
            let mut names = optional_str(&params, "sheet_names")
                .map(split_list)
                .unwrap_or_default();
            if names.is_empty() {
                names.push(DEFAULT_SHEET.to_string());
            }
            for (i, name) in names.iter().enumerate() {
                if names[..i].contains(name) {
                    return Err(ToolError::InvalidParams(format!(
                        "Sheet '{}' is listed more than once",
                        name
                    )));
                }
            }

            let workbook = EditableWorkbook::with_sheets(names.clone());
            ensure_parent(&path).await?;
            workbook.save(&path)?;

            Ok(ToolOutput::success(json!({
                "status": "ok",
                "path": path_to_display(&path),
                "sheets": names,
            })))
        })
    }
}

/// Tool for writing one cell
pub struct WriteCell {
    workspace: PathBuf,
}

impl WriteCell {
    pub fn new(workspace: PathBuf) -> Self {
        Self { workspace }
    }
}

impl Tool for WriteCell {
    fn name(&self) -> &str {
        "write_cell"
    }

    fn description(&self) -> &str {
        "Write a value to a cell. Creates the workbook or sheet if missing. \
         Numeric text is stored as a number."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Path to the Excel file"
                },
                "cell": {
                    "type": "string",
                    "description": "Cell reference like 'A1'"
                },
                "value": {
                    "type": "string",
                    "description": "Value to write"
                },
                "sheet_name": {
                    "type": "string",
                    "description": "Name of the sheet (defaults to the first sheet)"
                }
            },
            "required": ["path", "cell", "value"]
        })
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let path = target(&self.workspace, &params)?;
            let cell = require_str(&params, "cell")?;
            let position = parse_cell_ref(cell)?;
            let value = match &params["value"] {
                Value::String(s) => coerce_text(s),
                Value::Null => {
                    return Err(ToolError::InvalidParams("value is required".into()));
                }
                other => json_cell(other),
            };

            let mut workbook = EditableWorkbook::load_or_new(&path)?;
            let sheet = workbook.sheet_or_create(optional_str(&params, "sheet_name"))?;
            let sheet_name = sheet.name.clone();
            let written = cell_json(&value);
            sheet.set(position, value);

            ensure_parent(&path).await?;
            workbook.save(&path)?;

            Ok(ToolOutput::success(json!({
                "status": "ok",
                "path": path_to_display(&path),
                "sheet": sheet_name,
                "cell": cell,
                "value": written,
            })))
        })
    }
}

/// Tool for writing a 2D block of values
pub struct WriteRows {
    workspace: PathBuf,
}

impl WriteRows {
    pub fn new(workspace: PathBuf) -> Self {
        Self { workspace }
    }
}

impl Tool for WriteRows {
    fn name(&self) -> &str {
        "write_rows"
    }

    fn description(&self) -> &str {
        "Write rows of data (a JSON array of arrays) starting at a cell. \
         Creates the workbook or sheet if missing."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Path to the Excel file"
                },
                "data_json": {
                    "type": "string",
                    "description": "JSON array of arrays, e.g. [[\"Name\", \"Age\"], [\"Ann\", 30]]"
                },
                "start_cell": {
                    "type": "string",
                    "description": "Top-left cell to write from",
                    "default": "A1"
                },
                "sheet_name": {
                    "type": "string",
                    "description": "Name of the sheet (defaults to the first sheet)"
                }
            },
            "required": ["path", "data_json"]
        })
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let path = target(&self.workspace, &params)?;
            let data: Value = serde_json::from_str(require_str(&params, "data_json")?)
                .map_err(|e| ToolError::InvalidParams(format!("Invalid JSON: {}", e)))?;
            let Value::Array(rows) = data else {
                return Err(ToolError::InvalidParams(
                    "data_json must be a JSON array of arrays".into(),
                ));
            };
            let start_cell = optional_str(&params, "start_cell").unwrap_or("A1");
            let (top, left) = parse_cell_ref(start_cell)?;

            let mut workbook = EditableWorkbook::load_or_new(&path)?;
            let sheet = workbook.sheet_or_create(optional_str(&params, "sheet_name"))?;
            let sheet_name = sheet.name.clone();

            let mut rows_written = 0;
            for (i, row) in rows.iter().enumerate() {
                let Value::Array(values) = row else {
                    continue;
                };
                for (j, value) in values.iter().enumerate() {
                    sheet.set((top + i as u32, left + j as u32), json_cell(value));
                }
                rows_written += 1;
            }

            ensure_parent(&path).await?;
            workbook.save(&path)?;

            Ok(ToolOutput::success(json!({
                "status": "ok",
                "path": path_to_display(&path),
                "sheet": sheet_name,
                "rows_written": rows_written,
                "start_cell": start_cell,
            })))
        })
    }
}

/// Tool for appending a sheet to an existing workbook
pub struct AddSheet {
    workspace: PathBuf,
}

impl AddSheet {
    pub fn new(workspace: PathBuf) -> Self {
        Self { workspace }
    }
}

impl Tool for AddSheet {
    fn name(&self) -> &str {
        "add_sheet"
    }

    fn description(&self) -> &str {
        "Add a new empty sheet to an existing Excel workbook"
    }

    fn parameters_schema(&self) -> Value {
        crate::tool_params!(
            path: "string" => "Path to the Excel file",
            sheet_name: "string" => "Name of the new sheet",
        )
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let path = existing_target(&self.workspace, &params)?;
            let sheet_name = require_str(&params, "sheet_name")?.trim();
            if sheet_name.is_empty() {
                return Err(ToolError::InvalidParams("sheet_name is required".into()));
            }

            let mut workbook = EditableWorkbook::load(&path)?;
            if workbook.position(sheet_name).is_some() {
                return Err(ToolError::InvalidParams(format!(
                    "Sheet '{}' already exists",
                    sheet_name
                )));
            }
            workbook.sheets.push(EditableSheet::new(sheet_name));
            workbook.save(&path)?;

            Ok(ToolOutput::success(json!({
                "status": "ok",
                "path": path_to_display(&path),
                "new_sheet": sheet_name,
                "all_sheets": workbook.names(),
            })))
        })
    }
}

/// Tool for removing a sheet
pub struct DeleteSheet {
    workspace: PathBuf,
}

impl DeleteSheet {
    pub fn new(workspace: PathBuf) -> Self {
        Self { workspace }
    }
}

impl Tool for DeleteSheet {
    fn name(&self) -> &str {
        "delete_sheet"
    }

    fn description(&self) -> &str {
        "Delete a sheet from an Excel workbook (a workbook keeps at least one sheet)"
    }

    fn parameters_schema(&self) -> Value {
        crate::tool_params!(
            path: "string" => "Path to the Excel file",
            sheet_name: "string" => "Name of the sheet to delete",
        )
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let path = existing_target(&self.workspace, &params)?;
            let sheet_name = require_str(&params, "sheet_name")?;

            let mut workbook = EditableWorkbook::load(&path)?;
            let index = workbook.position(sheet_name).ok_or_else(|| {
                ToolError::ResourceNotFound(format!(
                    "Sheet '{}' not found. Available sheets: {}",
                    sheet_name,
                    workbook.names().join(", ")
                ))
            })?;
            if workbook.sheets.len() == 1 {
                return Err(ToolError::InvalidParams(format!(
                    "Cannot delete '{}': it is the only sheet",
                    sheet_name
                )));
            }
            workbook.sheets.remove(index);
            workbook.save(&path)?;

            Ok(ToolOutput::success(json!({
                "status": "ok",
                "path": path_to_display(&path),
                "deleted_sheet": sheet_name,
                "remaining_sheets": workbook.names(),
            })))
        })
    }
}

/// Tool for blanking a rectangle of cells
pub struct ClearRange {
    workspace: PathBuf,
}

impl ClearRange {
    pub fn new(workspace: PathBuf) -> Self {
        Self { workspace }
    }
}

impl Tool for ClearRange {
    fn name(&self) -> &str {
        "clear_range"
    }

    fn description(&self) -> &str {
        "Clear the values in a cell range like 'A1:D10'"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Path to the Excel file"
                },
                "cell_range": {
                    "type": "string",
                    "description": "Range to clear like 'A1:D10'"
                },
                "sheet_name": {
                    "type": "string",
                    "description": "Name of the sheet (defaults to the first sheet)"
                }
            },
            "required": ["path", "cell_range"]
        })
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let path = existing_target(&self.workspace, &params)?;
            let cell_range = require_str(&params, "cell_range")?;
            let (start, end) = parse_range_ref(cell_range)?;

            let mut workbook = EditableWorkbook::load(&path)?;
            let sheet = workbook.sheet_mut(optional_str(&params, "sheet_name"))?;
            let sheet_name = sheet.name.clone();
            sheet.cells.retain(|&(row, col), _| {
                !(start.0..=end.0).contains(&row) || !(start.1..=end.1).contains(&col)
            });
            let cells_cleared =
                (u64::from(end.0 - start.0) + 1) * (u64::from(end.1 - start.1) + 1);
            workbook.save(&path)?;

            Ok(ToolOutput::success(json!({
                "status": "ok",
                "path": path_to_display(&path),
                "sheet": sheet_name,
                "range": cell_range,
                "cells_cleared": cells_cleared,
            })))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_text() {
        assert_eq!(coerce_text("42"), Data::Int(42));
        assert_eq!(coerce_text("3.5"), Data::Float(3.5));
        assert_eq!(coerce_text("v1.2"), Data::String("v1.2".into()));
        assert_eq!(coerce_text("North"), Data::String("North".into()));
    }

    #[test]
    fn test_json_cell() {
        assert_eq!(json_cell(&json!(7)), Data::Int(7));
        assert_eq!(json_cell(&json!(2.5)), Data::Float(2.5));
        assert_eq!(json_cell(&json!("7")), Data::String("7".into()));
        assert_eq!(json_cell(&json!(true)), Data::Bool(true));
        assert_eq!(json_cell(&Value::Null), Data::Empty);
    }

    #[test]
    fn test_sheet_or_create_appends() {
        let mut workbook = EditableWorkbook::with_sheets(["Sheet1"]);
        workbook.sheet_or_create(Some("Totals")).unwrap();
        assert_eq!(workbook.names(), vec!["Sheet1", "Totals"]);
        assert_eq!(workbook.sheet_or_create(None).unwrap().name, "Sheet1");
        assert!(matches!(
            workbook.sheet_mut(Some("Missing")),
            Err(ToolError::ResourceNotFound(_))
        ));
    }

    #[test]
    fn test_setting_empty_removes_cell() {
        let mut sheet = EditableSheet::new("S");
        sheet.set((0, 0), Data::Int(1));
        sheet.set((0, 0), Data::Empty);
        assert!(sheet.cells.is_empty());
    }
}
