//! Process utility functions for cross-platform command execution
//!
//! This module provides helpers for spawning shell commands consistently
//! across platforms, with particular attention to Windows where we want to
//! hide console windows.

use tokio::process::Command;

/// Windows creation flag to hide the console window
#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x08000000;

/// Default shell program for the current platform
#[cfg(windows)]
pub const DEFAULT_SHELL: &str = "cmd";

#[cfg(not(windows))]
pub const DEFAULT_SHELL: &str = "sh";

/// Flag that makes the shell run its next argument as a command line
fn command_flag(program: &str) -> &'static str {
    let name = std::path::Path::new(program)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(program)
        .to_lowercase();
    match name.as_str() {
        "cmd" => "/C",
        "powershell" | "pwsh" => "-Command",
        _ => "-c",
    }
}

/// Configure a Command to hide the console window on Windows
#[cfg(windows)]
pub fn hide_console_window(cmd: &mut Command) {
    cmd.creation_flags(CREATE_NO_WINDOW);
}

#[cfg(not(windows))]
pub fn hide_console_window(_cmd: &mut Command) {
    // No-op on non-Windows platforms
}

/// Configure a std::process::Command to hide the console window on Windows
#[cfg(windows)]
pub fn hide_std_console_window(cmd: &mut std::process::Command) {
    use std::os::windows::process::CommandExt;
    cmd.creation_flags(CREATE_NO_WINDOW);
}

#[cfg(not(windows))]
pub fn hide_std_console_window(_cmd: &mut std::process::Command) {
    // No-op on non-Windows platforms
}

/// Create an async shell command running `command` through `program`
///
/// `program` defaults to `sh -c` on Unix and `cmd /C` on Windows.
pub fn shell_command(program: Option<&str>, command: &str) -> Command {
    let program = program.unwrap_or(DEFAULT_SHELL);
    let mut cmd = Command::new(program);
    cmd.arg(command_flag(program)).arg(command);
    hide_console_window(&mut cmd);
    cmd
}

/// Synchronous counterpart of [`shell_command`]
pub fn std_shell_command(program: Option<&str>, command: &str) -> std::process::Command {
    let program = program.unwrap_or(DEFAULT_SHELL);
    let mut cmd = std::process::Command::new(program);
    cmd.arg(command_flag(program)).arg(command);
    hide_std_console_window(&mut cmd);
    cmd
}
