//! Web tools for fetching pages and calling HTTP endpoints

mod fetch;
pub mod html;
mod http;

pub use fetch::{ExtractImages, ExtractLinks, ExtractText, FetchWebpage, FindElementsByTag};
pub use http::{DownloadFile, MakeGetRequest, MakePostRequest};

use reqwest::Response;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::config::WebConfig;
use crate::error::ToolError;
use crate::formatting::truncate_output;

/// HTTP client shared by all web tools
#[derive(Debug, Clone)]
pub struct WebClient {
    client: reqwest::Client,
    download_timeout: Duration,
    max_content_length: usize,
}

impl WebClient {
    pub fn new(config: &WebConfig) -> Result<Self, ToolError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ToolError::failed("Failed to create client", e))?;

        Ok(Self {
            client,
            download_timeout: Duration::from_secs(config.download_timeout_secs),
            max_content_length: config.max_content_length,
        })
    }

    /// GET a page and return the body as text
    pub async fn get_text(&self, url: &str) -> Result<String, ToolError> {
        self.get_with_query(url, &[]).await
    }

    /// GET with query parameters appended to the URL
    pub async fn get_with_query(
        &self,
        url: &str,
        query: &[(String, String)],
    ) -> Result<String, ToolError> {
        let url = parse_url(url)?;
        debug!(%url, params = query.len(), "GET");
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(request_error)?;
        self.read_text(response).await
    }

    /// POST form-encoded fields
    pub async fn post_form(
        &self,
        url: &str,
        form: &[(String, String)],
    ) -> Result<String, ToolError> {
        let url = parse_url(url)?;
        debug!(%url, fields = form.len(), "POST");
        let response = self
            .client
            .post(url)
            .form(form)
            .send()
            .await
            .map_err(request_error)?;
        self.read_text(response).await
    }

    /// GET raw bytes using the longer download timeout
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, ToolError> {
        let url = parse_url(url)?;
        debug!(%url, "Downloading");
        let response = self
            .client
            .get(url)
            .timeout(self.download_timeout)
            .send()
            .await
            .map_err(request_error)?;
        let bytes = check_status(response)?
            .bytes()
            .await
            .map_err(|e| ToolError::failed("Failed to read response", e))?;
        Ok(bytes.to_vec())
    }

    async fn read_text(&self, response: Response) -> Result<String, ToolError> {
        let body = check_status(response)?
            .text()
            .await
            .map_err(|e| ToolError::failed("Failed to read response", e))?;
        Ok(truncate_output(&body, self.max_content_length))
    }
}

/// Parse a URL and reject anything but http and https
pub fn parse_url(raw: &str) -> Result<Url, ToolError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ToolError::InvalidParams(format!("Invalid URL: {}", e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(ToolError::InvalidParams(
            "Only HTTP and HTTPS URLs are supported".into(),
        )),
    }
}

/// Parse `k=v,k2=v2`; pieces without `=` are ignored
pub fn parse_pairs(raw: &str) -> Vec<(String, String)> {
    raw.split(',')
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect()
}

fn check_status(response: Response) -> Result<Response, ToolError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    Err(ToolError::ExecutionFailed(format!(
        "HTTP error: {} {} for {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown"),
        response.url()
    )))
}

fn request_error(err: reqwest::Error) -> ToolError {
    if err.is_timeout() {
        ToolError::failed("Request timed out", err)
    } else {
        ToolError::failed("Request failed", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url_schemes() {
        assert!(parse_url("https://example.com/a").is_ok());
        assert!(parse_url(" http://localhost:8080 ").is_ok());
        assert!(matches!(
            parse_url("ftp://example.com/file"),
            Err(ToolError::InvalidParams(_))
        ));
        assert!(matches!(
            parse_url("file:///etc/passwd"),
            Err(ToolError::InvalidParams(_))
        ));
        assert!(parse_url("not a url").is_err());
    }

    #[test]
    fn test_parse_pairs() {
        assert_eq!(
            parse_pairs("q = rust, page=2,flag, x=a=b"),
            vec![
                ("q".to_string(), "rust".to_string()),
                ("page".to_string(), "2".to_string()),
                ("x".to_string(), "a=b".to_string()),
            ]
        );
        assert!(parse_pairs("").is_empty());
    }
}
