//! Configuration for profilemap

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "profilemap.yml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Prefix for secret environment variable names
    #[serde(rename = "env-var-prefix")]
    pub env_var_prefix: String,

    /// Top-level profile name in the rendered profiles file
    #[serde(rename = "profile-name")]
    pub profile_name: String,

    /// Target (output) name in the rendered profiles file
    #[serde(rename = "target-name")]
    pub target_name: String,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level", skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            env_var_prefix: crate::DEFAULT_ENV_VAR_PREFIX.to_string(),
            profile_name: crate::DEFAULT_PROFILE_NAME.to_string(),
            target_name: crate::DEFAULT_TARGET_NAME.to_string(),
            log_level: None,
        }
    }
}

impl Config {
    /// Load config from an explicit path, or the first candidate that parses
    ///
    /// An explicit path must load. Candidates that fail to parse are logged
    /// and skipped; with none usable the defaults apply.
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        for path in Self::candidates().iter().filter(|p| p.exists()) {
            match Self::load_from_file(path) {
                Ok(config) => return Ok(config),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable config"),
            }
        }

        tracing::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Fallback locations, project-local first
    fn candidates() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("profilemap").join(CONFIG_FILE_NAME));
        }
        paths
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        tracing::debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }
}
