//! Configuration loading and resolution
//!
//! Resolution priority for every setting:
//! 1. Command-line argument (highest priority; clap merges in the
//!    matching environment variable)
//! 2. TOML config file
//! 3. Compiled default (fallback)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::risk::RiskPolicy;

/// Default artifact location, relative to the working directory
pub const DEFAULT_MODEL_PATH: &str = "model/safe_model.json";
/// Default bind address for the web service
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5760;

/// Optional settings read from the TOML config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub model_path: Option<PathBuf>,
    pub tables_path: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub risk_policy: Option<RiskPolicy>,
}

impl FileConfig {
    /// Parse a specific config file
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("invalid config file {}: {}", path.display(), e)))
    }

    /// Load the platform config file if one exists
    ///
    /// Looks for `readmit/config.toml` in the user config directory,
    /// then `/etc/readmit/config.toml` on unix. Absence is not an
    /// error; an unreadable or unparseable file is.
    pub fn load() -> Result<Self> {
        for path in candidate_paths() {
            if path.exists() {
                return Self::from_path(&path);
            }
        }
        Ok(Self::default())
    }
}

fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("readmit").join("config.toml"));
    }
    if cfg!(unix) {
        paths.push(PathBuf::from("/etc/readmit/config.toml"));
    }
    paths
}

/// Fully resolved runtime configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub model_path: PathBuf,
    pub tables_path: Option<PathBuf>,
    pub host: String,
    pub port: u16,
    pub risk_policy: RiskPolicy,
}

impl ServiceConfig {
    /// Merge command-line overrides (already env-merged by clap) over
    /// the config file over compiled defaults
    pub fn resolve(
        cli_model: Option<PathBuf>,
        cli_tables: Option<PathBuf>,
        cli_host: Option<String>,
        cli_port: Option<u16>,
    ) -> Result<Self> {
        let file = FileConfig::load()?;
        Ok(Self::merge(file, cli_model, cli_tables, cli_host, cli_port))
    }

    /// Pure merge step, split out so tests can supply the file tier
    pub fn merge(
        file: FileConfig,
        cli_model: Option<PathBuf>,
        cli_tables: Option<PathBuf>,
        cli_host: Option<String>,
        cli_port: Option<u16>,
    ) -> Self {
        Self {
            model_path: cli_model
                .or(file.model_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH)),
            tables_path: cli_tables.or(file.tables_path),
            host: cli_host
                .or(file.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: cli_port.or(file.port).unwrap_or(DEFAULT_PORT),
            risk_policy: file.risk_policy.unwrap_or_default(),
        }
    }
}
