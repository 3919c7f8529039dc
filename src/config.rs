use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const ENDPOINT_ENV: &str = "CINEMOOD_ENDPOINT";
pub const DEFAULT_CONFIG_PATH: &str = "cinemood.yaml";

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub cards: CardConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CardConfig {
    #[serde(default = "default_placeholder_poster")]
    pub placeholder_poster: String,
    #[serde(default = "default_title_lines")]
    pub title_lines: usize,
    #[serde(default = "default_overview_lines")]
    pub overview_lines: usize,
    #[serde(default = "default_width")]
    pub width: usize,
    #[serde(default = "default_columns")]
    pub columns: usize,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            placeholder_poster: default_placeholder_poster(),
            title_lines: default_title_lines(),
            overview_lines: default_overview_lines(),
            width: default_width(),
            columns: default_columns(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

// 2:3 poster aspect, same as the card artwork.
fn default_placeholder_poster() -> String {
    "https://via.placeholder.com/300x450.png?text=No+Image".to_string()
}

fn default_title_lines() -> usize {
    1
}

fn default_overview_lines() -> usize {
    3
}

fn default_width() -> usize {
    32
}

fn default_columns() -> usize {
    3
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_string(), e))?;

        Self::from_yaml(path, &content)
    }

    pub fn from_yaml(path: &str, content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::ParseError(path.to_string(), e))?;

        Ok(config)
    }

    /// Load the config file. When no path was given explicitly, a missing
    /// file at the default location means "use built-in defaults".
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => Self::from_file(DEFAULT_CONFIG_PATH),
            None => Ok(Self::default()),
        }
    }

    /// Apply endpoint overrides. The flag wins over the environment,
    /// which wins over the file.
    pub fn with_endpoint_overrides(mut self, flag: Option<String>, env: Option<String>) -> Self {
        let chosen = flag
            .filter(|s| !s.trim().is_empty())
            .or_else(|| env.filter(|s| !s.trim().is_empty()));
        if chosen.is_some() {
            self.service.endpoint = chosen;
        }
        self
    }

    pub fn timeout(&self) -> Result<Duration, ConfigError> {
        match self.service.timeout_secs {
            0 => Err(ConfigError::InvalidTimeout),
            secs => Ok(Duration::from_secs(secs)),
        }
    }

    pub fn endpoint_url(&self) -> Result<Url, ConfigError> {
        let raw = self
            .service
            .endpoint
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingEndpoint)?;

        let url = Url::parse(raw)
            .map_err(|e| ConfigError::InvalidEndpoint(raw.to_string(), e.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConfigError::InvalidEndpoint(
                raw.to_string(),
                format!("unsupported scheme {}", other),
            )),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    ReadError(String, std::io::Error),
    #[error("Failed to parse config file {0}: {1}")]
    ParseError(String, serde_yaml::Error),
    #[error(
        "No recommendation service endpoint configured (use --endpoint, {} or service.endpoint)",
        ENDPOINT_ENV
    )]
    MissingEndpoint,
    #[error("Invalid recommendation service endpoint {0}: {1}")]
    InvalidEndpoint(String, String),
    #[error("service.timeout_secs must be at least 1")]
    InvalidTimeout,
}
