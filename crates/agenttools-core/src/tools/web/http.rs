//! Raw HTTP tools: download, GET and POST

use serde_json::{json, Value};
use std::path::PathBuf;

use crate::error::ToolError;
use crate::formatting::format_size;
use crate::tools::filesystem::{ensure_parent, path_to_display, resolve_in_workspace};
use crate::tools::{optional_str, require_str, BoxFuture, Tool, ToolOutput};

use super::{parse_pairs, WebClient};

/// Tool for saving a remote file into the workspace
pub struct DownloadFile {
    client: WebClient,
    workspace: PathBuf,
}

impl DownloadFile {
    pub fn new(client: WebClient, workspace: PathBuf) -> Self {
        Self { client, workspace }
    }
}

impl Tool for DownloadFile {
    fn name(&self) -> &str {
        "download_file"
    }

    fn description(&self) -> &str {
        "Download a file from a URL and save it in the workspace"
    }

    fn parameters_schema(&self) -> Value {
        crate::tool_params!(
            url: "string" => "URL of the file to download",
            output_path: "string" => "Path where the file will be saved",
        )
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let url = require_str(&params, "url")?;
            let output = resolve_in_workspace(&self.workspace, require_str(&params, "output_path")?)?;

            let bytes = self.client.get_bytes(url).await?;
            ensure_parent(&output).await?;
            tokio::fs::write(&output, &bytes).await?;

            Ok(ToolOutput::success(format!(
                "File downloaded successfully to: {} ({})",
                path_to_display(&output),
                format_size(bytes.len() as u64)
            ))
            .with_metadata("bytes", bytes.len()))
        })
    }
}

/// Tool for calling a GET endpoint
pub struct MakeGetRequest {
    client: WebClient,
}

impl MakeGetRequest {
    pub fn new(client: WebClient) -> Self {
        Self { client }
    }
}

impl Tool for MakeGetRequest {
    fn name(&self) -> &str {
        "make_get_request"
    }

    fn description(&self) -> &str {
        "Make an HTTP GET request to an API endpoint"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "URL of the API endpoint"
                },
                "params": {
                    "type": "string",
                    "description": "Query parameters as key=value pairs, comma-separated",
                    "default": ""
                }
            },
            "required": ["url"]
        })
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let url = require_str(&params, "url")?;
            let query = optional_str(&params, "params").map(parse_pairs).unwrap_or_default();
            let body = self.client.get_with_query(url, &query).await?;
            Ok(ToolOutput::success(body))
        })
    }
}

/// Tool for posting form data to an endpoint
pub struct MakePostRequest {
    client: WebClient,
}

impl MakePostRequest {
    pub fn new(client: WebClient) -> Self {
        Self { client }
    }
}

impl Tool for MakePostRequest {
    fn name(&self) -> &str {
        "make_post_request"
    }

    fn description(&self) -> &str {
        "Make an HTTP POST request to an API endpoint (form-encoded)"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "URL of the API endpoint"
                },
                "data": {
                    "type": "string",
                    "description": "Data to send as key=value pairs, comma-separated",
                    "default": ""
                }
            },
            "required": ["url"]
        })
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let url = require_str(&params, "url")?;
            let form = optional_str(&params, "data").map(parse_pairs).unwrap_or_default();
            let body = self.client.post_form(url, &form).await?;
            Ok(ToolOutput::success(body))
        })
    }
}
