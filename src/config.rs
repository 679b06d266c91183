//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides. Backend
//! credentials are never compiled in: they come from the file or from
//! `WORDBOARD_*` variables.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::backend::BackendConfig;
use crate::view::ViewOptions;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub dashboard: ViewOptions,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8086
}

fn default_max_connections() -> usize {
    1000
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_connections: default_max_connections(),
        }
    }
}

impl ApiConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Document store configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    /// JSON file with word documents to load at startup
    pub seed_file: Option<String>,
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

        Self::parse(&content).map_err(|e| match e {
            ConfigError::Parse { error, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                error,
            },
            other => other,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            error: e.to_string(),
        })
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
            dirs::config_dir().map(|p| p.join("wordboard").join("config.toml")),
            Some(PathBuf::from("/etc/wordboard/config.toml")),
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

    /// Check settings that would otherwise only fail once the server runs.
    ///
    /// An unusable `[dashboard]` query (zero limit, blank `order_by`) is
    /// rejected here so it can stop startup instead of leaving every
    /// dashboard connection without data.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.dashboard
            .query()
            .validate()
            .map_err(|e| ConfigError::Invalid {
                section: "dashboard",
                reason: e.to_string(),
            })
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Backend credentials
        let backend = &mut self.backend;
        for (key, field) in [
            ("WORDBOARD_API_KEY", &mut backend.api_key),
            ("WORDBOARD_AUTH_DOMAIN", &mut backend.auth_domain),
            ("WORDBOARD_PROJECT_ID", &mut backend.project_id),
            ("WORDBOARD_STORAGE_BUCKET", &mut backend.storage_bucket),
            ("WORDBOARD_MESSAGING_SENDER_ID", &mut backend.messaging_sender_id),
            ("WORDBOARD_APP_ID", &mut backend.app_id),
        ] {
            if let Some(value) = var(key) {
                *field = value;
            }
        }

        // API overrides
        if let Some(host) = var("WORDBOARD_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = var("WORDBOARD_API_PORT") {
            if let Ok(p) = port.parse() {
                self.api.port = p;
            }
        }

        // Dashboard overrides
        if let Some(limit) = var("WORDBOARD_DASHBOARD_LIMIT") {
            if let Ok(l) = limit.parse() {
                self.dashboard.limit = l;
            }
        }

        if let Some(seed) = var("WORDBOARD_SEED_FILE") {
            self.store.seed_file = Some(seed);
        }

        // Logging overrides
        if let Some(level) = var("WORDBOARD_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("WORDBOARD_LOG_FORMAT") {
            self.logging.format = format;
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

    #[error("Invalid [{section}] settings: {reason}")]
    Invalid { section: &'static str, reason: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Wordboard Configuration
#
# Environment variables override these settings:
# - WORDBOARD_API_KEY, WORDBOARD_AUTH_DOMAIN, WORDBOARD_PROJECT_ID,
#   WORDBOARD_STORAGE_BUCKET, WORDBOARD_MESSAGING_SENDER_ID, WORDBOARD_APP_ID
# - WORDBOARD_API_HOST
# - WORDBOARD_API_PORT
# - WORDBOARD_DASHBOARD_LIMIT
# - WORDBOARD_SEED_FILE
# - WORDBOARD_LOG_LEVEL
# - WORDBOARD_LOG_FORMAT

[backend]
# Project credentials. All six are required; keep real values out of
# version control and prefer the environment variables above.
api_key = ""
auth_domain = "my-project.firebaseapp.com"
project_id = "my-project"
storage_bucket = "my-project.appspot.com"
messaging_sender_id = ""
app_id = ""

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 8086

# Maximum concurrent dashboard connections
max_connections = 1000

[dashboard]
# Field the chart orders by
order_by = "value"

# ascending or descending
direction = "descending"

# Number of words on the chart
limit = 36

# Documents without a numeric order_by field: sort_last or exclude
missing_field = "sort_last"

[store]
# Optional JSON array of word documents loaded at startup
# seed_file = "./words.json"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
