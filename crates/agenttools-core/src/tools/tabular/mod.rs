//! CSV tools
//!
//! All tools load the whole file into a [`Table`] of strings; column types
//! are inferred on demand and only matter for sorting, statistics and JSON
//! export.

mod read;
mod transform;

pub use read::{ColumnStats, CsvInfo, ReadCsv};
pub use transform::{CsvToJson, FilterCsv, MergeCsv, SelectColumns, SortCsv};

use serde_json::Value;
use std::path::Path;

use crate::error::ToolError;
use crate::tools::filesystem::path_to_display;

/// Inferred type of a column, named the way dataframe libraries print them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Int,
    Float,
    Bool,
    Text,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Int => "int64",
            ColumnType::Float => "float64",
            ColumnType::Bool => "bool",
            ColumnType::Text => "object",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Int | ColumnType::Float)
    }

    /// Infer from cell values; empty cells are treated as missing
    pub fn infer<'a>(values: impl Iterator<Item = &'a str>) -> Self {
        let mut seen = false;
        let (mut int, mut float, mut boolean) = (true, true, true);
        for v in values.map(str::trim).filter(|v| !v.is_empty()) {
            seen = true;
            int &= v.parse::<i64>().is_ok();
            float &= v.parse::<f64>().is_ok();
            boolean &= parse_bool(v).is_some();
        }
        match (seen, int, float, boolean) {
            (false, ..) => ColumnType::Text,
            (_, true, ..) => ColumnType::Int,
            (_, _, true, _) => ColumnType::Float,
            (_, _, _, true) => ColumnType::Bool,
            _ => ColumnType::Text,
        }
    }

    /// Convert one cell to JSON according to this column type
    pub fn to_json(&self, cell: &str) -> Value {
        let trimmed = cell.trim();
        if trimmed.is_empty() {
            return Value::Null;
        }
        match self {
            ColumnType::Int => trimmed
                .parse::<i64>()
                .map(Value::from)
                .unwrap_or_else(|_| Value::String(cell.to_string())),
            ColumnType::Float => trimmed
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            ColumnType::Bool => parse_bool(trimmed)
                .map(Value::Bool)
                .unwrap_or_else(|| Value::String(cell.to_string())),
            ColumnType::Text => Value::String(cell.to_string()),
        }
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// An in-memory CSV file: header row plus string cells
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Load a CSV file; short rows are padded, long rows truncated
    pub fn load(path: &Path) -> Result<Self, ToolError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|e| csv_error(path, e))?;

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| csv_error(path, e))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| csv_error(path, e))?;
            let mut row: Vec<String> = record.iter().map(String::from).collect();
            row.resize(headers.len(), String::new());
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }

    /// Write the table as CSV (no index column)
    pub fn save(&self, path: &Path) -> Result<(), ToolError> {
        let mut writer = csv::Writer::from_path(path).map_err(|e| csv_error(path, e))?;
        writer
            .write_record(&self.headers)
            .map_err(|e| csv_error(path, e))?;
        for row in &self.rows {
            writer.write_record(row).map_err(|e| csv_error(path, e))?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn column_index(&self, name: &str) -> Result<usize, ToolError> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| ToolError::InvalidParams(format!("Column '{}' not found in CSV", name)))
    }

    pub fn column(&self, idx: usize) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .map(move |row| row.get(idx).map(|s| s.as_str()).unwrap_or(""))
    }

    pub fn column_type(&self, idx: usize) -> ColumnType {
        ColumnType::infer(self.column(idx))
    }

    /// Render up to `max_rows` rows as an aligned text table with a row index
    pub fn render(&self, max_rows: usize) -> String {
        if self.rows.is_empty() {
            return format!("Empty CSV\nColumns: {}", self.headers.join(", "));
        }

        let shown = &self.rows[..self.rows.len().min(max_rows)];
        let index_width = shown.len().saturating_sub(1).to_string().len();
        let widths: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                shown
                    .iter()
                    .map(|row| row.get(i).map(|c| c.chars().count()).unwrap_or(0))
                    .chain(std::iter::once(h.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut lines = Vec::with_capacity(shown.len() + 2);
        let mut header = " ".repeat(index_width);
        for (h, w) in self.headers.iter().zip(&widths) {
            header.push_str(&format!("  {:>w$}", h, w = w));
        }
        lines.push(header);

        for (i, row) in shown.iter().enumerate() {
            let mut line = format!("{:<w$}", i, w = index_width);
            for (cell, w) in row.iter().zip(&widths) {
                line.push_str(&format!("  {:>w$}", cell, w = w));
            }
            lines.push(line);
        }

        if shown.len() < self.rows.len() {
            lines.push(format!("[{} of {} rows shown]", shown.len(), self.rows.len()));
        }
        lines.join("\n")
    }
}

fn csv_error(path: &Path, err: csv::Error) -> ToolError {
    ToolError::failed(format!("CSV error in {}", path_to_display(path)), err)
}
