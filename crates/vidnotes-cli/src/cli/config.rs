use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use vidnotes_core::CoreConfig;

/// Environment variable holding the YouTube Data API key
pub const API_KEY_ENV: &str = "YOUTUBE_API_KEY";

/// CLI configuration that can be loaded from a JSON file
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CliConfig {
    /// Directory holding snapshots and the session file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// YouTube Data API key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// File receiving debug-level logs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl CliConfig {
    /// Load config from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to deserialize config")
    }

    /// Command line flags win over the file; the file wins over defaults.
    pub fn with_overrides(mut self, data_dir: Option<PathBuf>, api_key: Option<String>) -> Self {
        if data_dir.is_some() {
            self.data_dir = data_dir;
        }
        if api_key.is_some() {
            self.api_key = api_key;
        }
        self
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(CoreConfig::default_data_dir)
    }

    /// Configured key, else the `YOUTUBE_API_KEY` environment variable.
    pub fn api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|key| !key.trim().is_empty())
    }

    pub fn core_config(&self) -> CoreConfig {
        CoreConfig::new(self.data_dir())
    }
}
