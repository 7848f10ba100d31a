//! Runtime settings for the command-line host.
//!
//! Settings start from defaults, are overlaid by an optional JSON file at
//! `~/.cmd-predictor/settings.json`, and finally by environment variables:
//! - `CMD_PREDICTOR_MODEL` - path of the trained model artifact
//! - `CMD_PREDICTOR_SUGGESTIONS` - number of suggestions per request

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::model::persistence::default_model_path;

pub const MODEL_PATH_ENV: &str = "CMD_PREDICTOR_MODEL";
pub const SUGGESTION_COUNT_ENV: &str = "CMD_PREDICTOR_SUGGESTIONS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub model_path: PathBuf,
    pub suggestion_count: i32,
    /// Suggestions a single command may take when several compete.
    pub max_duplicates_per_command: i32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            suggestion_count: 3,
            max_duplicates_per_command: 1,
        }
    }
}

pub fn default_settings_path() -> PathBuf {
    let home = std::env::var_os("HOME").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
    home.join(".cmd-predictor").join("settings.json")
}

impl Settings {
    /// Defaults, then the settings file if it exists, then the environment.
    pub fn load() -> anyhow::Result<Self> {
        let path = default_settings_path();
        let settings = if path.exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };
        settings.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("Invalid settings JSON at {}", path.display()))
    }

    /// Apply overrides looked up through `var` (normally the environment).
    pub fn with_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        if let Some(path) = var(MODEL_PATH_ENV) {
            self.model_path = PathBuf::from(path);
        }
        if let Some(count) = var(SUGGESTION_COUNT_ENV) {
            self.suggestion_count = count
                .trim()
                .parse()
                .with_context(|| format!("{SUGGESTION_COUNT_ENV} must be an integer, got '{count}'"))?;
        }
        Ok(self)
    }
}
