//! Configuration file
//!
//! ```json
//! {
//!   "data_dir": "./data",
//!   "http": { "host": "0.0.0.0", "port": 8000, "cors_origins": [] },
//!   "log_level": "info"
//! }
//! ```
//!
//! Only `data_dir` is required.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::errors::{CliError, CliResult};
use crate::http_server::HttpServerConfig;
use crate::observability::Severity;

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the item table (required)
    pub data_dir: PathBuf,

    /// HTTP listener settings
    #[serde(default)]
    pub http: HttpServerConfig,

    /// Minimum log severity (default "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Create a configuration with defaults for everything but `data_dir`
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            http: HttpServerConfig::default(),
            log_level: default_log_level(),
        }
    }

    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("Failed to read config {}: {}", path.display(), e))
        })?;

        Self::from_json(&content)
    }

    /// Parse and validate configuration JSON
    pub fn from_json(content: &str) -> CliResult<Self> {
        let config: Config = serde_json::from_str(content)
            .map_err(|e| CliError::Config(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Apply command line overrides
    pub fn with_overrides(mut self, data_dir: Option<PathBuf>, port: Option<u16>) -> CliResult<Self> {
        if let Some(data_dir) = data_dir {
            self.data_dir = data_dir;
        }
        if let Some(port) = port {
            self.http.port = port;
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> CliResult<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(CliError::Config("data_dir must not be empty".into()));
        }

        if self.http.port == 0 {
            return Err(CliError::Config("http.port must be > 0".into()));
        }

        self.http.allowed_origins().map_err(CliError::Config)?;

        self.log_severity()?;

        Ok(())
    }

    /// Get data directory as Path
    pub fn data_path(&self) -> &Path {
        &self.data_dir
    }

    /// Parsed minimum log severity
    pub fn log_severity(&self) -> CliResult<Severity> {
        self.log_level
            .parse()
            .map_err(|e: String| CliError::Config(format!("Invalid log_level: {}", e)))
    }
}
