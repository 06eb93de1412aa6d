//! Spreadsheet tools backed by calamine (read only)

use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};
use serde_json::{json, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::config::TablesConfig;
use crate::error::ToolError;
use crate::tools::filesystem::{path_to_display, resolve_existing};
use crate::tools::{optional_str, require_str, BoxFuture, Tool, ToolOutput};

use super::{expect_format, DocumentFormat};

type Workbook = Sheets<BufReader<File>>;

fn open(workspace: &Path, params: &Value) -> Result<(PathBuf, Workbook), ToolError> {
    let path = resolve_existing(workspace, require_str(params, "path")?)?;
    expect_format(&path, DocumentFormat::Excel)?;
    let workbook = open_workbook_auto(&path)
        .map_err(|e| ToolError::failed("Failed to open Excel file", e))?;
    Ok((path, workbook))
}

/// Load the named sheet, or the first sheet when no name is given
fn sheet(workbook: &mut Workbook, name: Option<&str>) -> Result<(String, Range<Data>), ToolError> {
    let names = workbook.sheet_names();
    let name = match name {
        Some(n) if names.iter().any(|s| s == n) => n.to_string(),
        Some(n) => {
            return Err(ToolError::ResourceNotFound(format!(
                "Sheet '{}' not found. Available sheets: {}",
                n,
                names.join(", ")
            )));
        }
        None => names
            .first()
            .cloned()
            .ok_or_else(|| ToolError::ExecutionFailed("Workbook has no sheets".into()))?,
    };
    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| ToolError::failed(format!("Failed to read sheet '{}'", name), e))?;
    Ok((name, range))
}

/// Cell value as JSON; whole floats come back as integers
pub(crate) fn cell_json(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::String(s) => json!(s),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => json!(*f as i64),
        Data::Float(f) => json!(f),
        Data::Int(i) => json!(i),
        Data::Bool(b) => json!(b),
        Data::Error(e) => json!(format!("#ERR:{:?}", e)),
        Data::DateTime(dt) => json!(dt.to_string()),
        Data::DateTimeIso(s) => json!(s),
        Data::DurationIso(s) => json!(s),
    }
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell_json(cell) {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// Column letters for a zero-based column index (0 -> A, 26 -> AA)
pub(crate) fn column_name(mut col: u32) -> String {
    let mut name = Vec::new();
    loop {
        name.push(b'A' + (col % 26) as u8);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    name.reverse();
    String::from_utf8_lossy(&name).into_owned()
}

/// Parse an A1-style reference into zero-based (row, column)
pub(crate) fn parse_cell_ref(cell: &str) -> Result<(u32, u32), ToolError> {
    let invalid = || ToolError::InvalidParams(format!("Invalid cell reference: {}", cell));
    let cleaned: String = cell.trim().chars().filter(|c| *c != '$').collect();
    let split = cleaned
        .find(|c: char| c.is_ascii_digit())
        .ok_or_else(invalid)?;
    let (letters, digits) = cleaned.split_at(split);
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(invalid());
    }

    let mut col: u32 = 0;
    for c in letters.chars() {
        col = col
            .checked_mul(26)
            .and_then(|v| v.checked_add(c.to_ascii_uppercase() as u32 - 'A' as u32 + 1))
            .ok_or_else(invalid)?;
    }
    let row: u32 = digits.parse().map_err(|_| invalid())?;
    if row == 0 {
        return Err(invalid());
    }
    Ok((row - 1, col - 1))
}

/// Parse `A1:D10` (or a single cell) into inclusive zero-based corners
pub(crate) fn parse_range_ref(range: &str) -> Result<((u32, u32), (u32, u32)), ToolError> {
    let (start, end) = match range.split_once(':') {
        Some((a, b)) => (parse_cell_ref(a)?, parse_cell_ref(b)?),
        None => {
            let cell = parse_cell_ref(range)?;
            (cell, cell)
        }
    };
    Ok((
        (start.0.min(end.0), start.1.min(end.1)),
        (start.0.max(end.0), start.1.max(end.1)),
    ))
}

/// Rows of absolute cells in an inclusive rectangle; cells outside the data are null
fn rectangle(range: &Range<Data>, start: (u32, u32), end: (u32, u32)) -> Vec<Vec<Value>> {
    (start.0..=end.0)
        .map(|row| {
            (start.1..=end.1)
                .map(|col| range.get_value((row, col)).map(cell_json).unwrap_or(Value::Null))
                .collect()
        })
        .collect()
}

/// `A1:D10`-style extent of the sheet, counted from A1
fn dimensions(range: &Range<Data>) -> (String, u32, u32) {
    match range.end() {
        Some((row, col)) => (
            format!("A1:{}{}", column_name(col), row + 1),
            row + 1,
            col + 1,
        ),
        None => ("A1:A1".to_string(), 0, 0),
    }
}

/// Tool for listing the sheets of a workbook
pub struct ListSheets {
    workspace: PathBuf,
}

impl ListSheets {
    pub fn new(workspace: PathBuf) -> Self {
        Self { workspace }
    }
}

impl Tool for ListSheets {
    fn name(&self) -> &str {
        "list_sheets"
    }

    fn description(&self) -> &str {
        "List all sheet names in an Excel workbook"
    }

    fn parameters_schema(&self) -> Value {
        crate::tool_params!(path: "string" => "Path to the Excel file")
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let (path, workbook) = open(&self.workspace, &params)?;
            Ok(ToolOutput::success(json!({
                "status": "ok",
                "path": path_to_display(&path),
                "sheets": workbook.sheet_names(),
            })))
        })
    }
}

/// Tool for reading a sheet or a cell range as a 2D array
pub struct ReadSheet {
    workspace: PathBuf,
    max_rows: usize,
}

impl ReadSheet {
    pub fn new(workspace: PathBuf) -> Self {
        Self {
            workspace,
            max_rows: TablesConfig::default().sheet_max_rows,
        }
    }

    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }
}

impl Tool for ReadSheet {
    fn name(&self) -> &str {
        "read_sheet"
    }

    fn description(&self) -> &str {
        "Read data from an Excel sheet as a 2D list. Uses the first sheet unless \
         sheet_name is given. Optionally restrict to a range like 'A1:D10'."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Path to the Excel file"
                },
                "sheet_name": {
                    "type": "string",
                    "description": "Name of the sheet to read (defaults to the first sheet)"
                },
                "cell_range": {
                    "type": "string",
                    "description": "Cell range to read like 'A1:D10' (reads all if omitted)"
                },
                "max_rows": {
                    "type": "integer",
                    "description": "Maximum number of rows to read when no range is given",
                    "default": self.max_rows
                }
            },
            "required": ["path"]
        })
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let (path, mut workbook) = open(&self.workspace, &params)?;
            let (name, range) = sheet(&mut workbook, optional_str(&params, "sheet_name"))?;
            let max_rows = params["max_rows"]
                .as_u64()
                .map(|n| n as usize)
                .unwrap_or(self.max_rows);

            let data = match optional_str(&params, "cell_range") {
                Some(cell_range) => {
                    let (start, end) = parse_range_ref(cell_range)?;
                    rectangle(&range, start, end)
                }
                None => match range.end() {
                    Some(end) => {
                        let mut rows = rectangle(&range, (0, 0), end);
                        rows.truncate(max_rows);
                        rows
                    }
                    None => Vec::new(),
                },
            };

            Ok(ToolOutput::success(json!({
                "status": "ok",
                "path": path_to_display(&path),
                "sheet": name,
                "row_count": data.len(),
                "data": data,
            })))
        })
    }
}

/// Tool for reading one cell
pub struct ReadCell {
    workspace: PathBuf,
}

impl ReadCell {
    pub fn new(workspace: PathBuf) -> Self {
        Self { workspace }
    }
}

impl Tool for ReadCell {
    fn name(&self) -> &str {
        "read_cell"
    }

    fn description(&self) -> &str {
        "Read a specific cell value from an Excel sheet"
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
                    "description": "Cell reference like 'A1' or 'B2'"
                },
                "sheet_name": {
                    "type": "string",
                    "description": "Name of the sheet (defaults to the first sheet)"
                }
            },
            "required": ["path", "cell"]
        })
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let cell = require_str(&params, "cell")?;
            let position = parse_cell_ref(cell)?;
            let (path, mut workbook) = open(&self.workspace, &params)?;
            let (name, range) = sheet(&mut workbook, optional_str(&params, "sheet_name"))?;

            let value = range.get_value(position).map(cell_json).unwrap_or(Value::Null);
            Ok(ToolOutput::success(json!({
                "status": "ok",
                "path": path_to_display(&path),
                "sheet": name,
                "cell": cell,
                "value": value,
            })))
        })
    }
}

/// Tool for summarising every sheet's extent
pub struct WorkbookInfo {
    workspace: PathBuf,
}

impl WorkbookInfo {
    pub fn new(workspace: PathBuf) -> Self {
        Self { workspace }
    }
}

impl Tool for WorkbookInfo {
    fn name(&self) -> &str {
        "get_workbook_info"
    }

    fn description(&self) -> &str {
        "Get information about an Excel file: sheet names, dimensions, and row/column counts"
    }

    fn parameters_schema(&self) -> Value {
        crate::tool_params!(path: "string" => "Path to the Excel file")
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let (path, mut workbook) = open(&self.workspace, &params)?;

            let mut sheets = Vec::new();
            for name in workbook.sheet_names() {
                let (_, range) = sheet(&mut workbook, Some(&name))?;
                let (dims, max_row, max_column) = dimensions(&range);
                sheets.push(json!({
                    "name": name,
                    "dimensions": dims,
                    "max_row": max_row,
                    "max_column": max_column,
                }));
            }

            Ok(ToolOutput::success(json!({
                "status": "ok",
                "path": path_to_display(&path),
                "sheets": sheets,
            })))
        })
    }
}

/// Tool for case-insensitive substring search over a sheet
pub struct SearchValue {
    workspace: PathBuf,
    max_results: usize,
}

impl SearchValue {
    pub fn new(workspace: PathBuf) -> Self {
        Self {
            workspace,
            max_results: TablesConfig::default().search_max_results,
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }
}

impl Tool for SearchValue {
    fn name(&self) -> &str {
        "search_value"
    }

    fn description(&self) -> &str {
        "Search for a value in an Excel sheet (case-insensitive partial match) and return matching cells"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Path to the Excel file"
                },
                "search_term": {
                    "type": "string",
                    "description": "Value to search for"
                },
                "sheet_name": {
                    "type": "string",
                    "description": "Name of the sheet (defaults to the first sheet)"
                },
                "max_results": {
                    "type": "integer",
                    "description": "Maximum number of matches to return",
                    "default": self.max_results
                }
            },
            "required": ["path", "search_term"]
        })
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let search_term = require_str(&params, "search_term")?;
            let max_results = params["max_results"]
                .as_u64()
                .map(|n| n as usize)
                .unwrap_or(self.max_results);
            let (path, mut workbook) = open(&self.workspace, &params)?;
            let (name, range) = sheet(&mut workbook, optional_str(&params, "sheet_name"))?;

            let matches = search_range(&range, search_term, max_results);
            Ok(ToolOutput::success(json!({
                "status": "ok",
                "path": path_to_display(&path),
                "sheet": name,
                "search_term": search_term,
                "match_count": matches.len(),
                "matches": matches,
            })))
        })
    }
}

/// Row-major scan for cells whose text contains `term`, ignoring case
fn search_range(range: &Range<Data>, term: &str, max_results: usize) -> Vec<Value> {
    let needle = term.to_lowercase();
    range
        .used_cells()
        .filter_map(|(row, col, cell)| {
            let text = cell_text(cell)?;
            text.to_lowercase().contains(&needle).then(|| (row, col, cell))
        })
        .take(max_results)
        .map(|(row, col, cell)| {
            let (abs_row, abs_col) = range.start().map_or((row as u32, col as u32), |(r, c)| {
                (r + row as u32, c + col as u32)
            });
            json!({
                "cell": format!("{}{}", column_name(abs_col), abs_row + 1),
                "value": cell_json(cell),
            })
        })
        .collect()
}
