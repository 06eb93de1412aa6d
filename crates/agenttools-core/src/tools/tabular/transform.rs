//! CSV tools that write a new file: filter, sort, merge, select, export

use serde_json::{json, Map, Value};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use crate::error::ToolError;
use crate::formatting::split_list;
use crate::tools::filesystem::{
    ensure_parent, path_to_display, resolve_existing, resolve_in_workspace,
};
use crate::tools::{require_str, BoxFuture, Tool, ToolOutput};

use super::{ColumnType, Table};

/// Resolve `file_path` and `output_path` and load the input table
async fn load_io(
    workspace: &Path,
    params: &Value,
) -> Result<(Table, PathBuf), ToolError> {
    let input = resolve_existing(workspace, require_str(params, "file_path")?)?;
    let output = resolve_in_workspace(workspace, require_str(params, "output_path")?)?;
    ensure_parent(&output).await?;
    Ok((Table::load(&input)?, output))
}

/// Tool for keeping rows whose column equals a value
pub struct FilterCsv {
    workspace: PathBuf,
}

impl FilterCsv {
    pub fn new(workspace: PathBuf) -> Self {
        Self { workspace }
    }
}

impl Tool for FilterCsv {
    fn name(&self) -> &str {
        "filter_csv"
    }

    fn description(&self) -> &str {
        "Filter CSV rows where a column equals a specific value and save to a new file"
    }

    fn parameters_schema(&self) -> Value {
        crate::tool_params!(
            file_path: "string" => "Path to the input CSV file",
            column: "string" => "Column name to filter on",
            value: "string" => "Value to match (exact string comparison)",
            output_path: "string" => "Path for the filtered CSV",
        )
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let column = require_str(&params, "column")?;
            let value = require_str(&params, "value")?;
            let (table, output) = load_io(&self.workspace, &params).await?;
            let idx = table.column_index(column)?;

            let rows: Vec<Vec<String>> = table
                .rows
                .into_iter()
                .filter(|row| row.get(idx).is_some_and(|cell| cell == value))
                .collect();
            let count = rows.len();
            Table {
                headers: table.headers,
                rows,
            }
            .save(&output)?;

            Ok(ToolOutput::success(format!(
                "Filtered {} rows to: {}",
                count,
                path_to_display(&output)
            )))
        })
    }
}

/// Tool for sorting rows by one column
pub struct SortCsv {
    workspace: PathBuf,
}

impl SortCsv {
    pub fn new(workspace: PathBuf) -> Self {
        Self { workspace }
    }
}

impl Tool for SortCsv {
    fn name(&self) -> &str {
        "sort_csv"
    }

    fn description(&self) -> &str {
        "Sort a CSV file by a column and save the result"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": { "type": "string", "description": "Path to the input CSV file" },
                "column": { "type": "string", "description": "Column name to sort by" },
                "output_path": { "type": "string", "description": "Path for the sorted CSV" },
                "ascending": {
                    "type": "boolean",
                    "description": "Sort ascending (default) or descending",
                    "default": true
                }
            },
            "required": ["file_path", "column", "output_path"]
        })
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let column = require_str(&params, "column")?;
            let ascending = params["ascending"].as_bool().unwrap_or(true);
            let (mut table, output) = load_io(&self.workspace, &params).await?;
            let idx = table.column_index(column)?;

            let ty = table.column_type(idx);
            sort_rows(&mut table.rows, idx, ty, ascending);
            table.save(&output)?;

            Ok(ToolOutput::success(format!(
                "CSV sorted by '{}' and saved to: {}",
                column,
                path_to_display(&output)
            )))
        })
    }
}

/// Stable sort; empty cells always go last regardless of direction
pub(crate) fn sort_rows(rows: &mut [Vec<String>], idx: usize, ty: ColumnType, ascending: bool) {
    let cell = |row: &Vec<String>| row.get(idx).map(|c| c.trim().to_string()).unwrap_or_default();
    rows.sort_by(|a, b| {
        let (a, b) = (cell(a), cell(b));
        match (a.is_empty(), b.is_empty()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Greater,
            (false, true) => return Ordering::Less,
            _ => {}
        }
        let ord = if ty.is_numeric() {
            match (a.parse::<f64>(), b.parse::<f64>()) {
                (Ok(x), Ok(y)) => x.total_cmp(&y),
                _ => a.cmp(&b),
            }
        } else {
            a.cmp(&b)
        };
        if ascending { ord } else { ord.reverse() }
    });
}

/// Tool for concatenating several CSV files
pub struct MergeCsv {
    workspace: PathBuf,
}

impl MergeCsv {
    pub fn new(workspace: PathBuf) -> Self {
        Self { workspace }
    }
}

impl Tool for MergeCsv {
    fn name(&self) -> &str {
        "merge_csv_files"
    }

    fn description(&self) -> &str {
        "Merge multiple CSV files into one (rows appended, columns unioned)"
    }

    fn parameters_schema(&self) -> Value {
        crate::tool_params!(
            output_path: "string" => "Path for the merged CSV",
            input_paths: "string" => "Comma-separated list of CSV files to merge",
        )
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let output = resolve_in_workspace(&self.workspace, require_str(&params, "output_path")?)?;
            let inputs = split_list(require_str(&params, "input_paths")?);
            if inputs.is_empty() {
                return Err(ToolError::InvalidParams(
                    "input_paths must name at least one CSV file".into(),
                ));
            }

            let mut tables = Vec::with_capacity(inputs.len());
            for input in &inputs {
                tables.push(Table::load(&resolve_existing(&self.workspace, input)?)?);
            }

            let merged = merge_tables(&tables);
            ensure_parent(&output).await?;
            merged.save(&output)?;

            Ok(ToolOutput::success(format!(
                "Successfully merged {} CSV files ({} total rows) to: {}",
                tables.len(),
                merged.rows.len(),
                path_to_display(&output)
            )))
        })
    }
}

/// Union headers in first-seen order; cells missing from a source stay empty
pub(crate) fn merge_tables(tables: &[Table]) -> Table {
    let mut headers: Vec<String> = Vec::new();
    for table in tables {
        for h in &table.headers {
            if !headers.contains(h) {
                headers.push(h.clone());
            }
        }
    }

    let mut merged = Table::new(headers);
    for table in tables {
        let mapping: Vec<Option<usize>> = merged
            .headers
            .iter()
            .map(|h| table.headers.iter().position(|t| t == h))
            .collect();
        for row in &table.rows {
            merged.rows.push(
                mapping
                    .iter()
                    .map(|m| m.and_then(|i| row.get(i).cloned()).unwrap_or_default())
                    .collect(),
            );
        }
    }
    merged
}

/// Tool for projecting a subset of columns
pub struct SelectColumns {
    workspace: PathBuf,
}

impl SelectColumns {
    pub fn new(workspace: PathBuf) -> Self {
        Self { workspace }
    }
}

impl Tool for SelectColumns {
    fn name(&self) -> &str {
        "select_csv_columns"
    }

    fn description(&self) -> &str {
        "Select specific columns from a CSV and save to a new file"
    }

    fn parameters_schema(&self) -> Value {
        crate::tool_params!(
            file_path: "string" => "Path to the input CSV file",
            columns: "string" => "Comma-separated list of column names to keep",
            output_path: "string" => "Path for the output CSV",
        )
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let columns = split_list(require_str(&params, "columns")?);
            let (table, output) = load_io(&self.workspace, &params).await?;

            let missing: Vec<&str> = columns
                .iter()
                .filter(|c| !table.headers.contains(*c))
                .map(|c| c.as_str())
                .collect();
            if !missing.is_empty() {
                return Err(ToolError::InvalidParams(format!(
                    "Columns not found: {}",
                    missing.join(", ")
                )));
            }

            let indices: Vec<usize> = columns
                .iter()
                .filter_map(|c| table.headers.iter().position(|h| h == c))
                .collect();
            let selected = Table {
                headers: columns.clone(),
                rows: table
                    .rows
                    .iter()
                    .map(|row| {
                        indices
                            .iter()
                            .map(|&i| row.get(i).cloned().unwrap_or_default())
                            .collect()
                    })
                    .collect(),
            };
            selected.save(&output)?;

            Ok(ToolOutput::success(format!(
                "Selected {} columns and saved to: {}",
                columns.len(),
                path_to_display(&output)
            )))
        })
    }
}

/// Tool for exporting a CSV file as a JSON array of records
pub struct CsvToJson {
    workspace: PathBuf,
}

impl CsvToJson {
    pub fn new(workspace: PathBuf) -> Self {
        Self { workspace }
    }
}

impl Tool for CsvToJson {
    fn name(&self) -> &str {
        "convert_csv_to_json"
    }

    fn description(&self) -> &str {
        "Convert a CSV file to JSON format (array of records)"
    }

    fn parameters_schema(&self) -> Value {
        crate::tool_params!(
            file_path: "string" => "Path to the input CSV file",
            output_path: "string" => "Path for the output JSON file",
        )
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let (table, output) = load_io(&self.workspace, &params).await?;
            let records = to_records(&table);
            let json = serde_json::to_string_pretty(&records)
                .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;
            tokio::fs::write(&output, json).await?;

            Ok(ToolOutput::success(format!(
                "CSV converted to JSON and saved to: {}",
                path_to_display(&output)
            )))
        })
    }
}

/// One JSON object per row, keys in header order
pub(crate) fn to_records(table: &Table) -> Value {
    let types: Vec<ColumnType> = (0..table.headers.len())
        .map(|i| table.column_type(i))
        .collect();
    let records = table
        .rows
        .iter()
        .map(|row| {
            let mut obj = Map::new();
            for (i, header) in table.headers.iter().enumerate() {
                let cell = row.get(i).map(|s| s.as_str()).unwrap_or("");
                obj.insert(header.clone(), types[i].to_json(cell));
            }
            Value::Object(obj)
        })
        .collect();
    Value::Array(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(values: &[&str]) -> Vec<Vec<String>> {
        values.iter().map(|v| vec![v.to_string()]).collect()
    }

    fn flat(rows: &[Vec<String>]) -> Vec<&str> {
        rows.iter().map(|r| r[0].as_str()).collect()
    }

    #[test]
    fn test_sort_numeric_not_lexicographic() {
        let mut r = rows(&["10", "9", "", "100"]);
        sort_rows(&mut r, 0, ColumnType::Int, true);
        assert_eq!(flat(&r), vec!["9", "10", "100", ""]);

        sort_rows(&mut r, 0, ColumnType::Int, false);
        assert_eq!(flat(&r), vec!["100", "10", "9", ""]);
    }

    #[test]
    fn test_sort_text() {
        let mut r = rows(&["pear", "apple", "fig"]);
        sort_rows(&mut r, 0, ColumnType::Text, true);
        assert_eq!(flat(&r), vec!["apple", "fig", "pear"]);
    }

    #[test]
    fn test_merge_unions_columns() {
        let a = Table {
            headers: vec!["id".into(), "name".into()],
            rows: vec![vec!["1".into(), "a".into()]],
        };
        let b = Table {
            headers: vec!["id".into(), "score".into()],
            rows: vec![vec!["2".into(), "9".into()]],
        };
        let merged = merge_tables(&[a, b]);
        assert_eq!(merged.headers, vec!["id", "name", "score"]);
        assert_eq!(merged.rows[0], vec!["1", "a", ""]);
        assert_eq!(merged.rows[1], vec!["2", "", "9"]);
    }

    #[test]
    fn test_records_are_typed() {
        let table = Table {
            headers: vec!["name".into(), "age".into()],
            rows: vec![
                vec!["Alice".into(), "30".into()],
                vec!["Bob".into(), "".into()],
            ],
        };
        let records = to_records(&table);
        assert_eq!(records[0], json!({"name": "Alice", "age": 30}));
        assert_eq!(records[1]["age"], Value::Null);
    }
}
