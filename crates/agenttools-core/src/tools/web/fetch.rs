//! Page scraping tools

use serde_json::Value;

use crate::error::ToolError;
use crate::tools::{require_str, BoxFuture, Tool, ToolOutput};

use super::{html, WebClient};

/// Tool for fetching the raw body of a page
pub struct FetchWebpage {
    client: WebClient,
}

impl FetchWebpage {
    pub fn new(client: WebClient) -> Self {
        Self { client }
    }
}

impl Tool for FetchWebpage {
    fn name(&self) -> &str {
        "fetch_webpage"
    }

    fn description(&self) -> &str {
        "Fetch the HTML content of a webpage"
    }

    fn parameters_schema(&self) -> Value {
        crate::tool_params!(url: "string" => "URL of the webpage to fetch")
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let url = require_str(&params, "url")?;
            let body = self.client.get_text(url).await?;
            Ok(ToolOutput::success(body))
        })
    }
}

/// Tool for extracting the visible text of a page
pub struct ExtractText {
    client: WebClient,
}

impl ExtractText {
    pub fn new(client: WebClient) -> Self {
        Self { client }
    }
}

impl Tool for ExtractText {
    fn name(&self) -> &str {
        "extract_text_from_url"
    }

    fn description(&self) -> &str {
        "Extract all text content from a webpage (scripts and styles removed)"
    }

    fn parameters_schema(&self) -> Value {
        crate::tool_params!(url: "string" => "URL of the webpage")
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let url = require_str(&params, "url")?;
            let body = self.client.get_text(url).await?;
            Ok(ToolOutput::success(html::visible_text(&body)))
        })
    }
}

/// Tool for listing the hyperlinks of a page
pub struct ExtractLinks {
    client: WebClient,
}

impl ExtractLinks {
    pub fn new(client: WebClient) -> Self {
        Self { client }
    }
}

impl Tool for ExtractLinks {
    fn name(&self) -> &str {
        "extract_links"
    }

    fn description(&self) -> &str {
        "Extract all links from a webpage as 'text: href' lines"
    }

    fn parameters_schema(&self) -> Value {
        crate::tool_params!(url: "string" => "URL of the webpage")
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let url = require_str(&params, "url")?;
            let body = self.client.get_text(url).await?;
            let links = html::links(&body);
            if links.is_empty() {
                return Ok(ToolOutput::success("No links found"));
            }
            let lines: Vec<String> = links
                .iter()
                .map(|(text, href)| format!("{}: {}", text, href))
                .collect();
            Ok(ToolOutput::success(lines.join("\n")).with_metadata("count", links.len()))
        })
    }
}

/// Tool for listing the images of a page
pub struct ExtractImages {
    client: WebClient,
}

impl ExtractImages {
    pub fn new(client: WebClient) -> Self {
        Self { client }
    }
}

impl Tool for ExtractImages {
    fn name(&self) -> &str {
        "extract_images"
    }

    fn description(&self) -> &str {
        "Extract all image URLs from a webpage as 'alt: src' lines"
    }

    fn parameters_schema(&self) -> Value {
        crate::tool_params!(url: "string" => "URL of the webpage")
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let url = require_str(&params, "url")?;
            let body = self.client.get_text(url).await?;
            let images = html::images(&body);
            if images.is_empty() {
                return Ok(ToolOutput::success("No images found"));
            }
            let lines: Vec<String> = images
                .iter()
                .map(|(alt, src)| format!("{}: {}", alt, src))
                .collect();
            Ok(ToolOutput::success(lines.join("\n")).with_metadata("count", images.len()))
        })
    }
}

/// Tool for listing the text of every element with a given tag
pub struct FindElementsByTag {
    client: WebClient,
}

impl FindElementsByTag {
    pub fn new(client: WebClient) -> Self {
        Self { client }
    }
}

impl Tool for FindElementsByTag {
    fn name(&self) -> &str {
        "find_elements_by_tag"
    }

    fn description(&self) -> &str {
        "Find all elements with a specific HTML tag on a webpage"
    }

    fn parameters_schema(&self) -> Value {
        crate::tool_params!(
            url: "string" => "URL of the webpage",
            tag: "string" => "HTML tag to search for (e.g., 'h1', 'p', 'div')",
        )
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let url = require_str(&params, "url")?;
            let tag = require_str(&params, "tag")?.trim();
            let body = self.client.get_text(url).await?;

            let elements = html::elements_by_tag(&body, tag)?;
            if elements.is_empty() {
                return Ok(ToolOutput::success(format!("No <{}> elements found", tag)));
            }
            let lines: Vec<String> = elements
                .iter()
                .enumerate()
                .map(|(i, text)| format!("{}. {}", i + 1, text))
                .collect();
            Ok(ToolOutput::success(lines.join("\n")).with_metadata("count", elements.len()))
        })
    }
}
