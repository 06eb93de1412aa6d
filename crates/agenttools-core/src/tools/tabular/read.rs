//! CSV inspection tools: read, info, column statistics

use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::ToolError;
use crate::tools::filesystem::resolve_existing;
use crate::tools::{require_str, BoxFuture, Tool, ToolOutput};

use super::Table;

/// Tool for printing the first rows of a CSV file
pub struct ReadCsv {
    workspace: PathBuf,
    max_rows: usize,
}

impl ReadCsv {
    pub fn new(workspace: PathBuf) -> Self {
        Self {
            workspace,
            max_rows: crate::config::TablesConfig::default().csv_max_rows,
        }
    }

    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }
}

impl Tool for ReadCsv {
    fn name(&self) -> &str {
        "read_csv"
    }

    fn description(&self) -> &str {
        "Read a CSV file and return its contents as a string"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path to the CSV file"
                },
                "max_rows": {
                    "type": "integer",
                    "description": "Maximum number of rows to return",
                    "default": self.max_rows
                }
            },
            "required": ["file_path"]
        })
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let path = resolve_existing(&self.workspace, require_str(&params, "file_path")?)?;
            let max_rows = params["max_rows"]
                .as_u64()
                .map(|n| n as usize)
                .unwrap_or(self.max_rows);

            let table = Table::load(&path)?;
            Ok(ToolOutput::success(table.render(max_rows))
                .with_metadata("rows", table.rows.len()))
        })
    }
}

/// Tool for summarising shape, column names and inferred types
pub struct CsvInfo {
    workspace: PathBuf,
}

impl CsvInfo {
    pub fn new(workspace: PathBuf) -> Self {
        Self { workspace }
    }
}

impl Tool for CsvInfo {
    fn name(&self) -> &str {
        "get_csv_info"
    }

    fn description(&self) -> &str {
        "Get information about a CSV file (columns, row count, data types)"
    }

    fn parameters_schema(&self) -> Value {
        crate::tool_params!(file_path: "string" => "Path to the CSV file")
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let path = resolve_existing(&self.workspace, require_str(&params, "file_path")?)?;
            let table = Table::load(&path)?;

            let name_width = table.headers.iter().map(|h| h.chars().count()).max().unwrap_or(0);
            let types: Vec<String> = table
                .headers
                .iter()
                .enumerate()
                .map(|(i, h)| format!("{:<w$}  {}", h, table.column_type(i).as_str(), w = name_width))
                .collect();

            let info = format!(
                "Rows: {}\nColumns: {}\n\nColumn names: {}\n\nData types:\n{}",
                table.rows.len(),
                table.headers.len(),
                table.headers.join(", "),
                types.join("\n")
            );
            Ok(ToolOutput::success(info))
        })
    }
}

/// Tool for a describe()-style summary of one column
pub struct ColumnStats {
    workspace: PathBuf,
}

impl ColumnStats {
    pub fn new(workspace: PathBuf) -> Self {
        Self { workspace }
    }
}

impl Tool for ColumnStats {
    fn name(&self) -> &str {
        "get_column_stats"
    }

    fn description(&self) -> &str {
        "Get statistical summary of a numeric column in a CSV"
    }

    fn parameters_schema(&self) -> Value {
        crate::tool_params!(
            file_path: "string" => "Path to the CSV file",
            column: "string" => "Column name to analyze",
        )
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let path = resolve_existing(&self.workspace, require_str(&params, "file_path")?)?;
            let column = require_str(&params, "column")?;

            let table = Table::load(&path)?;
            let idx = table.column_index(column)?;

            let rows = if table.column_type(idx).is_numeric() {
                let values: Vec<f64> = table
                    .column(idx)
                    .filter_map(|v| v.trim().parse::<f64>().ok())
                    .collect();
                numeric_summary(&values)
            } else {
                categorical_summary(table.column(idx))
            };

            let body: Vec<String> = rows
                .iter()
                .map(|(label, value)| format!("{:<8}{}", label, value))
                .collect();
            Ok(ToolOutput::success(format!(
                "Statistics for '{}':\n{}",
                column,
                body.join("\n")
            )))
        })
    }
}

/// count, mean, std, min, quartiles, max
pub(crate) fn numeric_summary(values: &[f64]) -> Vec<(&'static str, String)> {
    let n = values.len();
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mean = if n > 0 {
        values.iter().sum::<f64>() / n as f64
    } else {
        f64::NAN
    };
    let std = if n > 1 {
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        var.sqrt()
    } else {
        f64::NAN
    };

    vec![
        ("count", format!("{:.6}", n as f64)),
        ("mean", fmt_stat(mean)),
        ("std", fmt_stat(std)),
        ("min", fmt_stat(quantile(&sorted, 0.0))),
        ("25%", fmt_stat(quantile(&sorted, 0.25))),
        ("50%", fmt_stat(quantile(&sorted, 0.5))),
        ("75%", fmt_stat(quantile(&sorted, 0.75))),
        ("max", fmt_stat(quantile(&sorted, 1.0))),
    ]
}

/// count, unique, top, freq over non-empty cells
fn categorical_summary<'a>(cells: impl Iterator<Item = &'a str>) -> Vec<(&'static str, String)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    let mut count = 0;
    for cell in cells.filter(|c| !c.trim().is_empty()) {
        count += 1;
        let entry = counts.entry(cell).or_insert(0);
        if *entry == 0 {
            order.push(cell);
        }
        *entry += 1;
    }

    // Ties go to the value seen first
    let mut top: Option<(&str, usize)> = None;
    for value in &order {
        let freq = counts[value];
        if top.is_none_or(|(_, best)| freq > best) {
            top = Some((value, freq));
        }
    }

    let (top_value, freq) = top.unwrap_or(("NaN", 0));
    vec![
        ("count", count.to_string()),
        ("unique", order.len().to_string()),
        ("top", top_value.to_string()),
        ("freq", freq.to_string()),
    ]
}

/// Linear-interpolated quantile of sorted data
pub(crate) fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

fn fmt_stat(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else {
        format!("{:.6}", v)
    }
}
