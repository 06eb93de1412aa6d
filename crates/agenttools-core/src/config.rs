//! Configuration management for agenttools
//!
//! Handles loading and saving the TOML configuration that tunes the
//! tool families: the shell denylist, read limits, HTTP timeouts and
//! table row caps.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{Error, Result};
use crate::tools::shell::DEFAULT_DENYLIST;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Shell execution settings
    #[serde(default)]
    pub shell: ShellConfig,
    /// File I/O settings
    #[serde(default)]
    pub files: FilesConfig,
    /// HTTP settings for web tools
    #[serde(default)]
    pub web: WebConfig,
    /// CSV and spreadsheet limits
    #[serde(default)]
    pub tables: TablesConfig,
    /// General application settings
    #[serde(default)]
    pub general: GeneralConfig,
}

/// Shell execution configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Fragments that block a command when found anywhere in it (case-insensitive)
    pub denylist: Vec<String>,
    /// Extra fragments appended to `denylist`
    pub extra_denylist: Vec<String>,
    /// Kill the child after this many seconds (none = wait forever)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Cap on captured bytes per output stream
    pub max_output_bytes: usize,
    /// Shell program override (defaults to `sh` / `cmd`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shell: Option<String>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            denylist: DEFAULT_DENYLIST.iter().map(|s| s.to_string()).collect(),
            extra_denylist: Vec::new(),
            timeout_secs: None,
            max_output_bytes: 100_000,
            shell: None,
        }
    }
}

impl ShellConfig {
    /// All denylist fragments in order, configured ones first
    pub fn fragments(&self) -> impl Iterator<Item = &str> {
        self.denylist
            .iter()
            .chain(self.extra_denylist.iter())
            .map(|s| s.as_str())
    }
}

/// File I/O configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    /// Default byte limit for `read_file`
    pub max_read_bytes: u64,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            max_read_bytes: 500_000,
        }
    }
}

/// HTTP configuration for web tools
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Request timeout for page fetches and API calls (seconds)
    pub timeout_secs: u64,
    /// Request timeout for file downloads (seconds)
    pub download_timeout_secs: u64,
    /// User-Agent header sent with every request
    pub user_agent: String,
    /// Maximum characters returned from a fetched page
    pub max_content_length: usize,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            download_timeout_secs: 30,
            user_agent: format!("agenttools/{}", env!("CARGO_PKG_VERSION")),
            max_content_length: 200_000,
        }
    }
}

/// Row and result caps for CSV and spreadsheet tools
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TablesConfig {
    pub csv_max_rows: usize,
    pub sheet_max_rows: usize,
    pub search_max_results: usize,
}

impl Default for TablesConfig {
    fn default() -> Self {
        Self {
            csv_max_rows: 100,
            sheet_max_rows: 1000,
            search_max_results: 100,
        }
    }
}

/// General application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Working directory the file tools are confined to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_dir: Option<PathBuf>,
    /// Log level
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            workspace_dir: None,
            log_level: "warn".to_string(),
        }
    }
}

/// Configuration manager for loading and saving config
pub struct ConfigManager {
    config_path: PathBuf,
    config: Config,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        Self::with_path(config_path)
    }

    /// Create a config manager with a specific path
    pub fn with_path(config_path: PathBuf) -> Result<Self> {
        let config = if config_path.exists() {
            info!(path = %config_path.display(), "Loading configuration");
            Self::load_from_path(&config_path)?
        } else {
            Config::default()
        };

        Ok(Self { config_path, config })
    }

    /// Get the default config path
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Could not find config directory".to_string()))?;

        Ok(config_dir.join("agenttools").join("config.toml"))
    }

    /// Load configuration from a file
    fn load_from_path(path: &Path) -> Result<Config> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Path this manager loads from and saves to
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Get the current configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get mutable access to configuration
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Save the current configuration to disk
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config dir: {}", e)))?;
        }

        let content = toml::to_string_pretty(&self.config)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(&self.config_path, content)
            .map_err(|e| Error::Config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new().unwrap_or_else(|_| Self {
            config_path: PathBuf::from("config.toml"),
            config: Config::default(),
        })
    }
}
