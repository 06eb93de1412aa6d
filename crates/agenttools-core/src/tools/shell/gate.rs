//! Command safety gate
//!
//! Checks a command against the denylist and, when it passes, runs it
//! through the host shell exactly once and waits for it to finish. Every
//! failure is reported as an [`Outcome`]; nothing escapes as an `Err` or
//! a panic.

use serde::Serialize;
use serde_json::{json, Value};
use std::fmt;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ShellConfig;
use crate::formatting::truncate_output;
use crate::tools::process_utils::{shell_command, std_shell_command};

use super::Denylist;

/// Exit codes a shell uses when it could not launch the requested program
#[cfg(windows)]
const LAUNCH_FAILURE_CODES: &[i32] = &[9009];

/// 126: found but not executable, 127: not found
#[cfg(not(windows))]
const LAUNCH_FAILURE_CODES: &[i32] = &[126, 127];

/// Result of passing a command through the gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Ran to completion with exit status 0
    Success {
        exit_code: i32,
        stdout: String,
        stderr: String,
    },
    /// Matched the denylist; nothing was spawned
    Rejected { command: String, pattern: String },
    /// Ran but exited non-zero, was killed, or timed out
    ExecutionFailed {
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
    },
    /// The program could not be started
    SpawnError { message: String },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Outcome::Rejected { .. })
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Outcome::Success { exit_code, .. } => Some(*exit_code),
            Outcome::ExecutionFailed { exit_code, .. } => *exit_code,
            _ => None,
        }
    }

    /// Structured form handed to hosts that expect JSON
    pub fn to_json(&self) -> Value {
        match self {
            Outcome::Rejected { command, pattern } => json!({
                "status": "rejected",
                "error": "Command blocked by safety policy",
                "command": command,
                "pattern": pattern,
                "reason": "matches disallowed destructive pattern",
            }),
            other => serde_json::to_value(other).unwrap_or_else(|_| json!({
                "status": "spawn_error",
                "message": other.to_string(),
            })),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success { stdout, stderr, .. } => {
                if stdout.is_empty() && stderr.is_empty() {
                    return write!(f, "Command completed successfully (no output)");
                }
                write!(f, "{}", stdout)?;
                if !stderr.is_empty() {
                    write!(f, "\n[stderr]\n{}", stderr)?;
                }
                Ok(())
            }
            Outcome::Rejected { pattern, .. } => write!(
                f,
                "Command blocked by safety policy: matches disallowed pattern '{}'",
                pattern
            ),
            Outcome::ExecutionFailed {
                exit_code,
                stdout,
                stderr,
            } => {
                match exit_code {
                    Some(code) => write!(f, "Command failed (exit code {})", code)?,
                    None => write!(f, "Command failed (no exit code)")?,
                }
                if !stdout.is_empty() {
                    write!(f, "\n[stdout]\n{}", stdout)?;
                }
                if !stderr.is_empty() {
                    write!(f, "\n[stderr]\n{}", stderr)?;
                }
                Ok(())
            }
            Outcome::SpawnError { message } => {
                write!(f, "Command could not be started: {}", message)
            }
        }
    }
}

/// Denylist check plus a single blocking shell invocation
#[derive(Debug, Clone)]
pub struct CommandGate {
    denylist: Arc<Denylist>,
    shell: Option<String>,
    timeout: Option<Duration>,
    max_output_bytes: usize,
}

impl CommandGate {
    pub fn new(denylist: Arc<Denylist>) -> Self {
        Self {
            denylist,
            shell: None,
            timeout: None,
            max_output_bytes: ShellConfig::default().max_output_bytes,
        }
    }

    /// Build a gate from the `[shell]` configuration section
    pub fn from_config(config: &ShellConfig) -> Self {
        Self {
            denylist: Arc::new(Denylist::new(config.fragments())),
            shell: config.shell.clone(),
            timeout: config.timeout_secs.map(Duration::from_secs),
            max_output_bytes: config.max_output_bytes,
        }
    }

    /// Use a specific shell program instead of the platform default
    pub fn with_shell(mut self, program: impl Into<String>) -> Self {
        self.shell = Some(program.into());
        self
    }

    /// Default timeout for [`CommandGate::run_async`]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_output_bytes(mut self, max: usize) -> Self {
        self.max_output_bytes = max;
        self
    }

    pub fn denylist(&self) -> &Denylist {
        &self.denylist
    }

    /// The denylist fragment that blocks `command`, if any. Pure.
    pub fn blocked_pattern(&self, command: &str) -> Option<&str> {
        self.denylist.matched(command)
    }

    fn rejection(&self, command: &str) -> Option<Outcome> {
        let pattern = self.blocked_pattern(command)?;
        warn!(pattern, "Command blocked by denylist");
        Some(Outcome::Rejected {
            command: command.to_string(),
            pattern: pattern.to_string(),
        })
    }

    /// Check and run `command`, blocking the calling thread until it exits.
    ///
    /// No timeout applies here.
    pub fn run(&self, command: &str, cwd: Option<&Path>) -> Outcome {
        if let Some(rejected) = self.rejection(command) {
            return rejected;
        }

        let mut cmd = std_shell_command(self.shell.as_deref(), command);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }

        debug!(command, "Spawning command");
        match cmd.output() {
            Ok(output) => self.classify(output.status.code(), &output.stdout, &output.stderr),
            Err(e) => spawn_error(command, &e),
        }
    }

    /// Async variant of [`CommandGate::run`] with an optional timeout.
    ///
    /// `timeout` overrides the gate's default; on expiry the child is killed
    /// and the outcome is `ExecutionFailed` without an exit code.
    pub async fn run_async(
        &self,
        command: &str,
        cwd: Option<&Path>,
        timeout: Option<Duration>,
    ) -> Outcome {
        if let Some(rejected) = self.rejection(command) {
            return rejected;
        }

        let mut cmd = shell_command(self.shell.as_deref(), command);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }

        debug!(command, "Spawning command");
        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => return spawn_error(command, &e),
        };

        let waited = match timeout.or(self.timeout) {
            Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
                Ok(waited) => waited,
                Err(_) => {
                    warn!(command, timeout = ?limit, "Command timed out");
                    return Outcome::ExecutionFailed {
                        exit_code: None,
                        stdout: String::new(),
                        stderr: format!("Command timed out after {:?}", limit),
                    };
                }
            },
            None => child.wait_with_output().await,
        };

        match waited {
            Ok(output) => self.classify(output.status.code(), &output.stdout, &output.stderr),
            Err(e) => spawn_error(command, &e),
        }
    }

    /// Plain "string in, string out" entry point for hosts
    pub fn run_command(&self, command: &str) -> String {
        self.run(command, None).to_string()
    }

    fn classify(&self, code: Option<i32>, stdout: &[u8], stderr: &[u8]) -> Outcome {
        let stdout = truncate_output(&String::from_utf8_lossy(stdout), self.max_output_bytes);
        let stderr = truncate_output(&String::from_utf8_lossy(stderr), self.max_output_bytes);
        debug!(exit_code = ?code, "Command finished");

        match code {
            Some(0) => Outcome::Success {
                exit_code: 0,
                stdout,
                stderr,
            },
            Some(code) if LAUNCH_FAILURE_CODES.contains(&code) && stdout.trim().is_empty() => {
                let detail = stderr.trim();
                Outcome::SpawnError {
                    message: if detail.is_empty() {
                        format!("program not found or not executable (exit code {})", code)
                    } else {
                        format!("{} (exit code {})", detail, code)
                    },
                }
            }
            code => Outcome::ExecutionFailed {
                exit_code: code,
                stdout,
                stderr,
            },
        }
    }
}

impl Default for CommandGate {
    fn default() -> Self {
        Self::new(Arc::new(Denylist::default()))
    }
}

fn spawn_error(command: &str, err: &std::io::Error) -> Outcome {
    warn!(command, error = %err, "Failed to spawn command");
    Outcome::SpawnError {
        message: err.to_string(),
    }
}
