//! Tool system for agent hosts
//!
//! Tools are the functions a host can call. Each tool has:
//! - A name and description for the host
//! - A JSON schema for parameters
//! - An execute method
//!
//! Hosts that want the plain "string in, string out" convention go through
//! [`ToolRegistry::invoke`], which never fails.

pub mod document;
pub mod filesystem;
pub mod process_utils;
pub mod shell;
pub mod tabular;
pub mod web;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::ToolError;
use crate::orchestration::format_tool_result;

/// Boxed future type for object-safe async trait methods
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Output from a tool execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    /// Whether the tool succeeded
    pub success: bool,
    /// The output content (can be text, JSON, etc.)
    pub content: Value,
    /// Optional error message
    pub error: Option<String>,
    /// Metadata about the execution
    pub metadata: HashMap<String, Value>,
}

impl ToolOutput {
    pub fn success(content: impl Into<Value>) -> Self {
        Self {
            success: true,
            content: content.into(),
            error: None,
            metadata: HashMap::new(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            content: Value::Null,
            error: Some(message.into()),
            metadata: HashMap::new(),
        }
    }

    /// A completed call that reports a failure but still carries content
    pub fn failure(content: impl Into<Value>) -> Self {
        Self {
            success: false,
            content: content.into(),
            error: None,
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Render the content as the single string a host receives.
    ///
    /// String content is returned verbatim, anything else as pretty JSON.
    pub fn to_text(&self) -> String {
        match (&self.content, &self.error) {
            (Value::Null, Some(err)) => format!("Error: {}", err),
            (Value::String(s), _) => s.clone(),
            (other, _) => {
                serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string())
            }
        }
    }
}

/// Tool definition for host consumption
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Core trait for all tools
pub trait Tool: Send + Sync {
    /// Tool name (used by the host to invoke)
    fn name(&self) -> &str;

    /// Description of what the tool does
    fn description(&self) -> &str;

    /// JSON schema for parameters
    fn parameters_schema(&self) -> Value;

    /// Execute the tool with given parameters
    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>>;

    /// Convert to tool definition for the host
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// Registry of available tools
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// List all available tools, sorted by name
    pub fn list(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> = self.tools.values().map(|t| t.to_definition()).collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Get all tools
    pub fn all(&self) -> Vec<Arc<dyn Tool>> {
        self.tools.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Call a tool by name and render the outcome as a string.
    ///
    /// Unknown tools, bad parameters and execution errors all come back as
    /// `"Error: ..."` text.
    pub async fn invoke(&self, name: &str, params: Value) -> String {
        debug!(tool = name, "Invoking tool");
        let result = match self.get(name) {
            Some(tool) => tool.execute(params).await,
            None => Err(ToolError::NotFound(name.to_string())),
        };
        if let Err(e) = &result {
            if e.is_caller_error() {
                debug!(tool = name, kind = e.kind(), "Tool call rejected: {}", e);
            } else {
                warn!(tool = name, kind = e.kind(), "Tool call failed: {}", e);
            }
        }
        format_tool_result(result)
    }
}

/// Pull a required string parameter
pub(crate) fn require_str<'a>(params: &'a Value, key: &str) -> Result<&'a str, ToolError> {
    params[key]
        .as_str()
        .ok_or_else(|| ToolError::InvalidParams(format!("{} is required", key)))
}

/// Pull an optional non-empty string parameter
pub(crate) fn optional_str<'a>(params: &'a Value, key: &str) -> Option<&'a str> {
    params[key].as_str().filter(|s| !s.is_empty())
}

/// Helper macro for creating tool parameter schemas where every field is required
#[macro_export]
macro_rules! tool_params {
    ($($field:ident : $type:expr => $desc:expr),* $(,)?) => {
        serde_json::json!({
            "type": "object",
            "properties": {
                $( stringify!($field): { "type": $type, "description": $desc } ),*
            },
            "required": [ $( stringify!($field) ),* ]
        })
    };
}
