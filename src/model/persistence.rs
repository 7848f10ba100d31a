//! Loading the training artifact from disk.
//!
//! The trainer writes a single JSON document holding the usage tables and the
//! command metadata. It is read once at startup; this crate never writes it.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{CommandLineStat, CommandMetadata, DEFAULT_COMMON_PARAMETERS, ParameterStat, StaticCatalog, UsageModel};

/// Artifact format version this build understands.
pub const SUPPORTED_VERSION: u32 = 1;

fn default_context_width() -> usize {
    2
}

/// On-disk representation of a trained model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub version: u32,
    #[serde(default = "default_context_width")]
    pub context_width: usize,
    /// Overrides [`DEFAULT_COMMON_PARAMETERS`] when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub common_parameters: Option<Vec<String>>,
    /// Context key to command lines, most likely first.
    #[serde(default)]
    pub predictions: HashMap<String, Vec<CommandLineStat>>,
    /// Command name to its parameter statistics.
    #[serde(default)]
    pub parameters: HashMap<String, Vec<ParameterStat>>,
    /// Parameter metadata used to resolve user input.
    #[serde(default)]
    pub commands: Vec<CommandMetadata>,
}

/// Everything a predictor needs, built from one artifact.
#[derive(Debug)]
pub struct ModelBundle {
    pub model: UsageModel,
    pub catalog: StaticCatalog,
}

impl ModelArtifact {
    pub fn into_bundle(self) -> anyhow::Result<ModelBundle> {
        if self.version != SUPPORTED_VERSION {
            anyhow::bail!(
                "Unsupported model version {} (expected {})",
                self.version,
                SUPPORTED_VERSION
            );
        }

        let common = self
            .common_parameters
            .unwrap_or_else(|| DEFAULT_COMMON_PARAMETERS.iter().map(|s| s.to_string()).collect());
        let model = UsageModel::new(self.context_width, self.predictions, self.parameters, common);
        let catalog = StaticCatalog::new(self.commands);

        Ok(ModelBundle { model, catalog })
    }
}

/// Default artifact location: ~/.cmd-predictor/model.json
pub fn default_model_path() -> PathBuf {
    let home = std::env::var_os("HOME").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
    home.join(".cmd-predictor").join("model.json")
}

pub fn from_str(raw: &str) -> anyhow::Result<ModelBundle> {
    let artifact: ModelArtifact = serde_json::from_str(raw).context("Invalid model JSON")?;
    artifact.into_bundle()
}

pub fn from_value(value: serde_json::Value) -> anyhow::Result<ModelBundle> {
    let artifact: ModelArtifact = serde_json::from_value(value).context("Invalid model JSON")?;
    artifact.into_bundle()
}

pub fn load(path: &Path) -> anyhow::Result<ModelBundle> {
    let raw = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let bundle = from_str(&raw).with_context(|| format!("Failed to load model from {}", path.display()))?;
    info!(
        path = %path.display(),
        commands = bundle.model.command_count(),
        catalog = bundle.catalog.len(),
        "usage model loaded"
    );
    Ok(bundle)
}
