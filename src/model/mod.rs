//! Pretrained usage model.
//!
//! The model is built offline and loaded once. It holds two tables:
//! full command lines indexed by history context, and per-command parameter
//! statistics. Nothing here mutates after construction, so one instance can
//! serve any number of concurrent requests behind an `Arc`.

mod catalog;
pub mod persistence;

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::context::ContextKey;
use crate::input::{ParameterSet, RawArgument, parse_command_line};

pub use catalog::{CommandCatalog, CommandMetadata, ParameterMetadata, StaticCatalog};
pub use persistence::{ModelArtifact, ModelBundle};

/// Parameters present on almost every command. They are only worth
/// suggesting when nothing more specific is as likely.
pub const DEFAULT_COMMON_PARAMETERS: &[&str] = &[
    "AsJob",
    "Confirm",
    "Debug",
    "DefaultProfile",
    "ErrorAction",
    "ErrorVariable",
    "InformationAction",
    "InformationVariable",
    "OutBuffer",
    "OutVariable",
    "PipelineVariable",
    "Verbose",
    "WarningAction",
    "WarningVariable",
    "WhatIf",
];

/// A full command line as stored in the training artifact.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CommandLineStat {
    pub text: String,
    pub weight: f64,
}

/// Usage statistics of one parameter of one command.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParameterStat {
    pub name: String,
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PredictedParameter {
    pub name: String,
    pub value: Option<String>,
}

/// A stored command line, pre-split into command and named parameters.
#[derive(Clone, Debug)]
pub struct Prediction {
    pub text: String,
    pub weight: f64,
    pub command: String,
    pub parameters: Vec<PredictedParameter>,
    /// Index in the model's stored order for its context key.
    pub rank: usize,
}

impl Prediction {
    fn parse(stat: CommandLineStat, rank: usize) -> Option<Self> {
        let parsed = parse_command_line(&stat.text)?;
        let parameters = parsed
            .arguments
            .into_iter()
            .filter_map(|arg| match arg {
                RawArgument::Named { name, value } => Some(PredictedParameter { name, value }),
                RawArgument::Positional { .. } => None,
            })
            .collect();

        Some(Self {
            text: stat.text,
            weight: stat.weight,
            command: parsed.name,
            parameters,
            rank,
        })
    }

    pub fn parameter(&self, name: &str) -> Option<&PredictedParameter> {
        self.parameters.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Every canonical parameter of `set` also appears on this line.
    pub fn covers(&self, set: &ParameterSet) -> bool {
        set.entries().all(|entry| self.parameter(&entry.name).is_some())
    }
}

/// A parameter the model would add to a partially typed command.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterCandidate<'a> {
    pub name: &'a str,
    pub example: Option<&'a str>,
    pub weight: f64,
    pub rank: usize,
}

#[derive(Debug, Default)]
pub struct UsageModel {
    context_width: usize,
    predictions: HashMap<String, Vec<Prediction>>,
    parameters: HashMap<String, Vec<ParameterStat>>,
    /// Lowercase command name to the model's casing.
    vocabulary: HashMap<String, String>,
    common_parameters: HashSet<String>,
}

impl UsageModel {
    pub fn new(
        context_width: usize,
        predictions: HashMap<String, Vec<CommandLineStat>>,
        parameters: HashMap<String, Vec<ParameterStat>>,
        common_parameters: impl IntoIterator<Item = String>,
    ) -> Self {
        let mut vocabulary = HashMap::new();

        let predictions: HashMap<String, Vec<Prediction>> = predictions
            .into_iter()
            .map(|(key, lines)| {
                let parsed: Vec<Prediction> = lines
                    .into_iter()
                    .enumerate()
                    .filter_map(|(rank, stat)| {
                        let text = stat.text.clone();
                        let prediction = Prediction::parse(stat, rank);
                        if prediction.is_none() {
                            warn!(key = %key.escape_debug(), text = %text, "skipping unparsable command line");
                        }
                        prediction
                    })
                    .collect();
                for prediction in &parsed {
                    vocabulary
                        .entry(prediction.command.to_lowercase())
                        .or_insert_with(|| prediction.command.clone());
                }
                (key, parsed)
            })
            .collect();

        let parameters = parameters
            .into_iter()
            .map(|(command, stats)| {
                vocabulary
                    .entry(command.to_lowercase())
                    .or_insert_with(|| command.clone());
                (command.to_lowercase(), stats)
            })
            .collect();

        Self {
            context_width: context_width.max(1),
            predictions,
            parameters,
            vocabulary,
            common_parameters: common_parameters.into_iter().map(|p| p.to_lowercase()).collect(),
        }
    }

    pub fn context_width(&self) -> usize {
        self.context_width
    }

    /// The model's casing of `command`, if the model has ever seen it.
    pub fn canonical_command(&self, command: &str) -> Option<&str> {
        self.vocabulary.get(&command.trim().to_lowercase()).map(String::as_str)
    }

    pub fn is_known_command(&self, command: &str) -> bool {
        self.canonical_command(command).is_some()
    }

    pub fn is_common_parameter(&self, name: &str) -> bool {
        self.common_parameters.contains(&name.to_lowercase())
    }

    pub fn command_count(&self) -> usize {
        self.vocabulary.len()
    }

    /// Stored lines for the first of `key`'s fallbacks the model knows.
    pub fn predictions_in_context(&self, key: &ContextKey) -> &[Prediction] {
        for candidate in key.fallbacks() {
            if let Some(lines) = self.predictions.get(candidate.as_str()) {
                trace!(requested = %key, matched = %candidate, "context lookup");
                return lines;
            }
        }
        &[]
    }

    /// Command-level completions for a bare command name.
    ///
    /// While the name is still being typed a stored line matches when its
    /// command starts with `command` (case-insensitive). Once `name_complete`
    /// is set only the exact command matches. A line identical to what was
    /// typed is no completion and is skipped.
    pub fn candidates_for(&self, key: &ContextKey, command: &str, name_complete: bool) -> Vec<&Prediction> {
        let typed = command.trim().to_lowercase();
        if typed.is_empty() {
            return Vec::new();
        }

        self.predictions_in_context(key)
            .iter()
            .filter(|p| {
                let stored = p.command.to_lowercase();
                if name_complete {
                    stored == typed
                } else {
                    stored.starts_with(&typed)
                }
            })
            .filter(|p| p.text.trim().to_lowercase() != typed)
            .collect()
    }

    /// Stored lines for exactly `command` that carry every parameter in
    /// `present`.
    pub fn completions_for(&self, key: &ContextKey, command: &str, present: &ParameterSet) -> Vec<&Prediction> {
        self.predictions_in_context(key)
            .iter()
            .filter(|p| p.command.eq_ignore_ascii_case(command))
            .filter(|p| p.covers(present))
            .collect()
    }

    /// Parameters to add to `command`, excluding those already present.
    ///
    /// Returns nothing when a present parameter is unknown to the model for
    /// this command. A common parameter is dropped whenever a command-specific
    /// candidate has equal or higher weight.
    pub fn parameter_candidates_for(&self, command: &str, present: &[&str]) -> Vec<ParameterCandidate<'_>> {
        let Some(stats) = self.parameters.get(&command.trim().to_lowercase()) else {
            return Vec::new();
        };

        let known = |name: &str| stats.iter().any(|s| s.name.eq_ignore_ascii_case(name));
        if !present.iter().all(|name| known(*name)) {
            trace!(command, "present parameters not covered by model");
            return Vec::new();
        }

        let available: Vec<(usize, &ParameterStat)> = stats
            .iter()
            .enumerate()
            .filter(|(_, s)| !present.iter().any(|p| p.eq_ignore_ascii_case(&s.name)))
            .collect();

        let best_specific = available
            .iter()
            .filter(|(_, s)| !self.is_common_parameter(&s.name))
            .map(|(_, s)| s.weight)
            .max_by(f64::total_cmp);

        available
            .into_iter()
            .filter(|(_, s)| {
                !self.is_common_parameter(&s.name) || best_specific.is_none_or(|best| s.weight > best)
            })
            .map(|(rank, s)| ParameterCandidate {
                name: &s.name,
                example: s.example.as_deref(),
                weight: s.weight,
                rank,
            })
            .collect()
    }
}
