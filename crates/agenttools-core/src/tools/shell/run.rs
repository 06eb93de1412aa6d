//! Run shell tool

use serde_json::{json, Value};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ToolError;
use crate::tools::filesystem::{path_to_display, resolve_in_workspace};
use crate::tools::{optional_str, require_str, BoxFuture, Tool, ToolOutput};

use super::{CommandGate, Outcome};

/// Tool for executing shell commands through the safety gate
pub struct RunShell {
    gate: CommandGate,
    workspace: PathBuf,
}

impl RunShell {
    pub fn new(workspace: PathBuf) -> Self {
        Self {
            gate: CommandGate::default(),
            workspace,
        }
    }

    pub fn with_gate(mut self, gate: CommandGate) -> Self {
        self.gate = gate;
        self
    }

    pub fn gate(&self) -> &CommandGate {
        &self.gate
    }
}

impl Tool for RunShell {
    fn name(&self) -> &str {
        "run_shell"
    }

    fn description(&self) -> &str {
        "Run a shell command (with a small disallow list) and return JSON {status, exit_code, stdout, stderr}. \
         Optionally run in a given working directory (cwd)."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "description": "The shell command to execute"
                },
                "timeout_sec": {
                    "type": "integer",
                    "description": "Kill the command after this many seconds (default: no timeout)"
                },
                "cwd": {
                    "type": "string",
                    "description": "Working directory for the command (relative to workspace)"
                }
            },
            "required": ["command"]
        })
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let command = require_str(&params, "command")?;
            let timeout = params["timeout_sec"].as_u64().map(Duration::from_secs);

            let cwd = match optional_str(&params, "cwd") {
                Some(dir) => resolve_in_workspace(&self.workspace, dir)?,
                None => self.workspace.clone(),
            };

            let outcome = self.gate.run_async(command, Some(&cwd), timeout).await;

            let mut content = outcome.to_json();
            if !matches!(outcome, Outcome::Rejected { .. }) {
                content["cwd"] = json!(path_to_display(&cwd));
            }

            let output = if outcome.is_success() {
                ToolOutput::success(content)
            } else {
                ToolOutput::failure(content)
            };
            Ok(output.with_metadata("status", status_label(&outcome)))
        })
    }
}

fn status_label(outcome: &Outcome) -> &'static str {
    match outcome {
        Outcome::Success { .. } => "success",
        Outcome::Rejected { .. } => "rejected",
        Outcome::ExecutionFailed { .. } => "execution_failed",
        Outcome::SpawnError { .. } => "spawn_error",
    }
}
