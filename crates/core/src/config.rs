use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_FUNCTION_PATH: &str = "/functions/v1/ai-assistant";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_BASE_URL: &str = "SITE_WIZARD_BASE_URL";
pub const ENV_API_TOKEN: &str = "SITE_WIZARD_API_TOKEN";
pub const ENV_STORAGE: &str = "SITE_WIZARD_STORAGE";
pub const ENV_DATABASE_URL: &str = "SITE_WIZARD_DATABASE_URL";

/// Global configuration, read from `~/.site-wizard/config.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    #[serde(default = "default_function_path")]
    pub function_path: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_token: None,
            function_path: default_function_path(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_function_path() -> String {
    DEFAULT_FUNCTION_PATH.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// A fully configured generation endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    pub url: String,
    pub api_token: String,
    pub timeout: Duration,
}

impl GenerationConfig {
    /// Resolve the remote endpoint.
    ///
    /// Both URL and token absent means "not configured" and yields `None`.
    /// Exactly one of them present is a [`Error::ConfigurationMissing`]
    /// naming the missing value.
    pub fn endpoint(&self) -> Result<Option<Endpoint>> {
        let base_url = non_blank(self.base_url.as_deref());
        let api_token = non_blank(self.api_token.as_deref());

        match (base_url, api_token) {
            (None, None) => Ok(None),
            (None, Some(_)) => Err(Error::ConfigurationMissing(format!(
                "generation.base_url ({}) is not set; it is required together with the API token",
                ENV_BASE_URL
            ))),
            (Some(_), None) => Err(Error::ConfigurationMissing(format!(
                "generation.api_token ({}) is not set; it is required together with the base URL",
                ENV_API_TOKEN
            ))),
            (Some(base), Some(token)) => Ok(Some(Endpoint {
                url: format!("{}{}", base.trim_end_matches('/'), self.function_path),
                api_token: token.to_string(),
                timeout: Duration::from_secs(self.timeout_secs),
            })),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// One JSON record per project with its pages embedded
    #[default]
    Embedded,
    /// Separate project, page and section rows in SQLite
    Normalized,
}

impl std::str::FromStr for StorageBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "embedded" => Ok(StorageBackend::Embedded),
            "normalized" => Ok(StorageBackend::Normalized),
            other => Err(Error::ConfigParse(format!(
                "Unknown storage backend '{}', expected 'embedded' or 'normalized'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,
    #[serde(default)]
    pub atomic_writes: bool,
}

impl StorageConfig {
    /// JSON file used by the embedded backend
    pub fn resolved_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| config_dir().join("projects.json"))
    }

    /// SQLite URL used by the normalized backend
    pub fn resolved_database_url(&self) -> String {
        self.database_url.clone().unwrap_or_else(|| {
            format!("sqlite://{}?mode=rwc", config_dir().join("projects.db").display())
        })
    }
}

impl AppConfig {
    /// Overlay environment values. `lookup` is injected so tests need not
    /// touch the process environment.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL) {
            self.generation.base_url = Some(url);
        }
        if let Some(token) = lookup(ENV_API_TOKEN) {
            self.generation.api_token = Some(token);
        }
        if let Some(backend) = lookup(ENV_STORAGE) {
            self.storage.backend = backend.parse()?;
        }
        if let Some(url) = lookup(ENV_DATABASE_URL) {
            self.storage.database_url = Some(url);
        }
        Ok(())
    }
}

/// Directory holding config and default storage files
pub fn config_dir() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."));
    home.join(".site-wizard")
}

pub fn default_config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Load config from `path` (or the default location). A missing file is
/// not an error: the system then runs with local generation and storage.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(default_config_path);

    if !path.exists() {
        tracing::debug!(path = %path.display(), "No config file, using defaults");
        return Ok(AppConfig::default());
    }

    let content = fs::read_to_string(&path)?;
    parse_config_str(&content)
}

/// Parse config from a string (useful for testing)
pub fn parse_config_str(content: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(content)?;
    Ok(config)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
