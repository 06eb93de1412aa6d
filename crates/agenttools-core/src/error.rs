//! Error types for agenttools core
//!
//! Two layers: [`Error`] for host-facing setup (config loading, registry
//! construction) and [`ToolError`] for a single tool call. Tool errors never
//! cross the registry boundary as `Err`; `ToolRegistry::invoke` renders them
//! as `"Error: <message>"` text.

use std::fmt::Display;

use thiserror::Error;

/// Result type alias for host-facing operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while setting up tools, before any call is made
#[derive(Error, Debug)]
pub enum Error {
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure of one tool call
#[derive(Error, Debug)]
pub enum ToolError {
    /// No tool registered under the requested name
    #[error("Tool not found: {0}")]
    NotFound(String),

    /// Missing or malformed argument, unknown column, bad cell reference
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// The operation ran and failed: parse errors, HTTP status, corrupt files
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    /// Path resolves outside the workspace
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Input file or sheet does not exist
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ToolError {
    /// `ExecutionFailed` carrying `"<context>: <cause>"`
    pub fn failed(context: impl Display, cause: impl Display) -> Self {
        Self::ExecutionFailed(format!("{}: {}", context, cause))
    }

    /// Stable snake_case label for logs and tool metadata
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::InvalidParams(_) => "invalid_params",
            Self::ExecutionFailed(_) => "execution_failed",
            Self::PermissionDenied(_) => "permission_denied",
            Self::ResourceNotFound(_) => "resource_not_found",
            Self::Io(_) => "io",
        }
    }

    /// True when retrying with different arguments could succeed
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_)
                | Self::InvalidParams(_)
                | Self::PermissionDenied(_)
                | Self::ResourceNotFound(_)
        )
    }
}
