//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::api::{BlockType, ClientConfig};
use crate::load::LoaderConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub loader: LoaderSettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Explorer backend configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_summary_limit")]
    pub summary_limit: u32,
}

fn default_base_url() -> String {
    "https://nano.community/api".to_string()
}

fn default_request_timeout() -> u64 {
    5000 // 5 seconds
}

fn default_user_agent() -> String {
    format!("nanoscope/{}", env!("CARGO_PKG_VERSION"))
}

fn default_summary_limit() -> u32 {
    10
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_ms: default_request_timeout(),
            user_agent: default_user_agent(),
            summary_limit: default_summary_limit(),
        }
    }
}

/// Account loader configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoaderSettings {
    #[serde(default = "default_auxiliary")]
    pub auxiliary: Vec<BlockType>,

    #[serde(default)]
    pub abort_on_supersede: bool,
}

fn default_auxiliary() -> Vec<BlockType> {
    BlockType::ALL.to_vec()
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            auxiliary: default_auxiliary(),
            abort_on_supersede: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("nanoscope").join("config.toml")),
            Some(PathBuf::from("/etc/nanoscope/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // API overrides
        if let Some(url) = var("NANOSCOPE_API_URL") {
            self.api.base_url = url;
        }
        if let Some(timeout) = var("NANOSCOPE_API_TIMEOUT_MS") {
            if let Ok(ms) = timeout.parse() {
                self.api.request_timeout_ms = ms;
            }
        }

        // Loader overrides
        if let Some(abort) = var("NANOSCOPE_ABORT_ON_SUPERSEDE") {
            self.loader.abort_on_supersede = matches!(
                abort.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }

        // Logging overrides
        if let Some(level) = var("NANOSCOPE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("NANOSCOPE_LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    pub fn to_client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.api.base_url.clone(),
            request_timeout_ms: self.api.request_timeout_ms,
            user_agent: self.api.user_agent.clone(),
            summary_limit: self.api.summary_limit,
        }
    }

    pub fn to_loader_config(&self) -> LoaderConfig {
        LoaderConfig {
            auxiliary: self.loader.auxiliary.clone(),
            abort_on_supersede: self.loader.abort_on_supersede,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Nanoscope Configuration
#
# Environment variables override these settings:
# - NANOSCOPE_API_URL
# - NANOSCOPE_API_TIMEOUT_MS
# - NANOSCOPE_ABORT_ON_SUPERSEDE
# - NANOSCOPE_LOG_LEVEL
# - NANOSCOPE_LOG_FORMAT

[api]
# Explorer API base URL
base_url = "https://nano.community/api"

# Request timeout in milliseconds
request_timeout_ms = 5000

# Maximum counterparties per blocks summary
summary_limit = 10

[loader]
# Block categories summarized on the account page
auxiliary = ["send", "receive", "change"]

# Abort a superseded account load instead of letting it run out
abort_on_supersede = false

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
