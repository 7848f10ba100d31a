//! Suggestion generation.
//!
//! [`Predictor`] ties the pieces together: it keeps the history window,
//! resolves what the user typed and asks the usage model for completions.
//! Each call is a pure request/response over an immutable model; the only
//! mutable state is the history window, guarded by a mutex.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::ranking::{self, SuggestionCandidate, SuggestionSource};
use crate::context::{COMMAND_PLACEHOLDER, CommandToken, ContextKey, HistoryTracker};
use crate::error::PredictorError;
use crate::input::{ParameterSet, ParsedCommand, command_offset, parse_command_line, resolve};
use crate::model::{CommandCatalog, ModelBundle, UsageModel};

/// Arguments of one suggestion request as the host hands them over.
///
/// Reference inputs are optional so a host can pass through whatever it has;
/// missing ones are rejected by [`Predictor::get_suggestion`].
#[derive(Clone, Copy, Debug)]
pub struct SuggestionRequest<'a> {
    pub command_name: Option<&'a str>,
    pub parameter_set: Option<&'a ParameterSet>,
    pub raw_user_input: Option<&'a str>,
    /// Suggestions per command the host already shows from other sources.
    pub present_command_frequencies: Option<&'a HashMap<String, u32>>,
    pub suggestion_count: i32,
    /// How many suggestions a single command may account for when different
    /// commands compete for the budget.
    pub min_context_matches: i32,
}

struct ValidRequest<'a> {
    command_name: &'a str,
    parameter_set: &'a ParameterSet,
    raw_user_input: &'a str,
    /// Input before the command being completed, e.g. `Get-AzContext | `.
    pipeline_head: &'a str,
    /// The command token is finished (the input ends in whitespace).
    name_complete: bool,
    present_command_frequencies: &'a HashMap<String, u32>,
    suggestion_count: usize,
    allowance: u32,
}

impl<'a> SuggestionRequest<'a> {
    fn validate(&self) -> Result<ValidRequest<'a>, PredictorError> {
        // Budgets are checked before any of the reference inputs
        let suggestion_count = positive("suggestion_count", self.suggestion_count)?;
        let allowance = positive("min_context_matches", self.min_context_matches)?;

        let command_name = match self.command_name {
            Some(name) if !name.trim().is_empty() => name,
            _ => return Err(PredictorError::InvalidArgument { name: "command_name" }),
        };
        let parameter_set = self
            .parameter_set
            .ok_or(PredictorError::NullArgument { name: "parameter_set" })?;
        let raw_user_input = match self.raw_user_input {
            Some(raw) if !raw.trim().is_empty() => raw,
            _ => return Err(PredictorError::InvalidArgument { name: "raw_user_input" }),
        };
        let present_command_frequencies = self
            .present_command_frequencies
            .ok_or(PredictorError::NullArgument { name: "present_command_frequencies" })?;

        Ok(ValidRequest {
            command_name: command_name.trim(),
            parameter_set,
            raw_user_input,
            pipeline_head: &raw_user_input[..command_offset(raw_user_input)],
            name_complete: raw_user_input.ends_with(char::is_whitespace),
            present_command_frequencies,
            suggestion_count: suggestion_count as usize,
            allowance,
        })
    }
}

fn positive(name: &'static str, value: i32) -> Result<u32, PredictorError> {
    u32::try_from(value)
        .ok()
        .filter(|v| *v > 0)
        .ok_or(PredictorError::OutOfRange { name, value: i64::from(value) })
}

/// One ranked suggestion.
#[derive(Clone, Debug, PartialEq)]
pub struct Suggestion {
    pub text: String,
    pub weight: f64,
    pub source: SuggestionSource,
}

/// Ranked suggestions for one request, at most the requested count.
///
/// A cancelled request yields an empty result with [`is_cancelled`] set.
///
/// [`is_cancelled`]: SuggestionResult::is_cancelled
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SuggestionResult {
    suggestions: Vec<Suggestion>,
    command_counts: HashMap<String, u32>,
    cancelled: bool,
}

impl SuggestionResult {
    fn cancelled() -> Self {
        Self {
            cancelled: true,
            ..Self::default()
        }
    }

    fn from_ranked(ranked: Vec<SuggestionCandidate>) -> Self {
        let mut command_counts = HashMap::new();
        let suggestions = ranked
            .into_iter()
            .map(|c| {
                *command_counts.entry(c.command).or_insert(0) += 1;
                Suggestion {
                    text: c.text,
                    weight: c.weight,
                    source: c.source,
                }
            })
            .collect();
        Self {
            suggestions,
            command_counts,
            cancelled: false,
        }
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    pub fn texts(&self) -> Vec<&str> {
        self.suggestions.iter().map(|s| s.text.as_str()).collect()
    }

    pub fn first(&self) -> Option<&Suggestion> {
        self.suggestions.first()
    }

    pub fn len(&self) -> usize {
        self.suggestions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suggestions.is_empty()
    }

    /// Number of returned suggestions per command, for merging with the
    /// host's running frequencies.
    pub fn command_counts(&self) -> &HashMap<String, u32> {
        &self.command_counts
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

pub struct Predictor {
    model: Arc<UsageModel>,
    catalog: Arc<dyn CommandCatalog>,
    tracker: Mutex<HistoryTracker>,
}

impl Predictor {
    pub fn new(model: Arc<UsageModel>, catalog: Arc<dyn CommandCatalog>) -> Self {
        let tracker = HistoryTracker::new(model.context_width());
        Self {
            model,
            catalog,
            tracker: Mutex::new(tracker),
        }
    }

    pub fn from_bundle(bundle: ModelBundle) -> Self {
        Self::new(Arc::new(bundle.model), Arc::new(bundle.catalog))
    }

    pub fn model(&self) -> &UsageModel {
        &self.model
    }

    /// Record an executed command in the history window.
    pub fn observe(&self, command_name: &str) {
        let token = match self.model.canonical_command(command_name) {
            Some(canonical) => CommandToken::Known(canonical.to_string()),
            None => CommandToken::Placeholder,
        };
        trace!(command = command_name, ?token, "observe");
        self.tracker.lock().observe(token);
    }

    /// Record the last command of an executed command line.
    pub fn observe_line(&self, line: &str) {
        if let Some(parsed) = parse_command_line(line) {
            self.observe(&parsed.name);
        }
    }

    pub fn context_key(&self) -> ContextKey {
        self.tracker.lock().current_key()
    }

    pub fn reset_history(&self) {
        self.tracker.lock().clear();
    }

    pub fn resolve(&self, parsed: &ParsedCommand) -> ParameterSet {
        resolve(&parsed.name, &parsed.arguments, self.catalog.as_ref())
    }

    /// Parse and resolve `raw_input`, then run [`get_suggestion`] with no
    /// frequencies from other sources.
    ///
    /// [`get_suggestion`]: Predictor::get_suggestion
    pub fn suggest_for_input(
        &self,
        raw_input: &str,
        suggestion_count: i32,
        max_per_command: i32,
        cancellation: &CancellationToken,
    ) -> Result<SuggestionResult, PredictorError> {
        let parsed = parse_command_line(raw_input);
        let parameter_set = parsed.as_ref().map(|p| self.resolve(p)).unwrap_or_default();
        let frequencies = HashMap::new();

        self.get_suggestion(
            &SuggestionRequest {
                command_name: parsed.as_ref().map(|p| p.name.as_str()),
                parameter_set: Some(&parameter_set),
                raw_user_input: Some(raw_input),
                present_command_frequencies: Some(&frequencies),
                suggestion_count,
                min_context_matches: max_per_command,
            },
            cancellation,
        )
    }

    /// Ranked completions for a partially typed command.
    ///
    /// Fails only on invalid arguments. Unknown commands, unresolvable
    /// parameters and model misses all produce an empty result.
    pub fn get_suggestion(
        &self,
        request: &SuggestionRequest<'_>,
        cancellation: &CancellationToken,
    ) -> Result<SuggestionResult, PredictorError> {
        let request = request.validate()?;

        // The placeholder is never a real command, and a partially resolved
        // set would match the wrong lines
        if request.command_name.eq_ignore_ascii_case(COMMAND_PLACEHOLDER)
            || request.parameter_set.is_unrecognized()
        {
            debug!(command = request.command_name, "input not predictable");
            return Ok(SuggestionResult::default());
        }
        if cancellation.is_cancelled() {
            debug!("suggestion request cancelled");
            return Ok(SuggestionResult::cancelled());
        }

        // Snapshot the history once so the lock is not held while ranking
        let key = self.context_key();
        let result = if request.parameter_set.has_no_arguments() {
            self.suggest_commands(&request, &key, cancellation)
        } else {
            self.suggest_parameters(&request, &key, cancellation)
        };

        let result = result.unwrap_or_else(|| {
            debug!("suggestion request cancelled");
            SuggestionResult::cancelled()
        });
        trace!(command = request.command_name, count = result.len(), "suggestions ready");
        Ok(result)
    }

    /// Completions for a bare command name. `None` when cancelled.
    fn suggest_commands(
        &self,
        request: &ValidRequest<'_>,
        key: &ContextKey,
        cancellation: &CancellationToken,
    ) -> Option<SuggestionResult> {
        let predictions = self
            .model
            .candidates_for(key, request.command_name, request.name_complete);
        if cancellation.is_cancelled() {
            return None;
        }

        // Keep whatever precedes the command, e.g. earlier pipeline stages
        let mut candidates = Vec::with_capacity(predictions.len());
        for prediction in predictions {
            if cancellation.is_cancelled() {
                return None;
            }
            let text = format!("{}{}", request.pipeline_head, prediction.text);
            if is_same_input(&text, request.raw_user_input) {
                continue;
            }
            candidates.push(SuggestionCandidate {
                text,
                command: prediction.command.clone(),
                weight: prediction.weight,
                rank: prediction.rank,
                source: SuggestionSource::Command,
            });
        }

        // Frequencies from other sources count against each command's allowance
        let present: HashMap<String, u32> = request
            .present_command_frequencies
            .iter()
            .map(|(command, count)| (command.to_lowercase(), *count))
            .collect();
        let mut produced: HashMap<String, u32> = HashMap::new();

        let ranked = ranking::rank_with(ranking::dedup(candidates), request.suggestion_count, |c| {
            let command = c.command.to_lowercase();
            let shown = present.get(&command).copied().unwrap_or(0);
            let slot = produced.entry(command).or_insert(0);
            if shown + *slot >= request.allowance {
                return false;
            }
            *slot += 1;
            true
        });

        Some(SuggestionResult::from_ranked(ranked))
    }

    /// Completions for a command with parameters. `None` when cancelled.
    fn suggest_parameters(
        &self,
        request: &ValidRequest<'_>,
        key: &ContextKey,
        cancellation: &CancellationToken,
    ) -> Option<SuggestionResult> {
        let Some(command) = self.model.canonical_command(request.command_name) else {
            debug!(command = request.command_name, "command unknown to the model");
            return Some(SuggestionResult::default());
        };
        let parameter_set = request.parameter_set;

        // Stored lines that already carry every parameter the user supplied
        let predictions = self.model.completions_for(key, command, parameter_set);
        if cancellation.is_cancelled() {
            return None;
        }

        let mut candidates = Vec::with_capacity(predictions.len());
        for prediction in predictions {
            if cancellation.is_cancelled() {
                return None;
            }
            let rendered = ranking::render_completion(prediction, parameter_set.arguments());
            let text = format!("{}{rendered}", request.pipeline_head);
            if is_same_input(&text, request.raw_user_input) {
                continue;
            }
            candidates.push(SuggestionCandidate {
                text,
                command: command.to_string(),
                weight: prediction.weight,
                rank: prediction.rank,
                source: SuggestionSource::Command,
            });
        }
        let mut ranked = ranking::rank(ranking::dedup(candidates), request.suggestion_count);

        // Fill what is left of the budget with single parameters, unless the
        // user is in the middle of typing a value
        let remaining = request.suggestion_count - ranked.len();
        let awaits_value = parameter_set.awaits_value(|name| self.catalog.is_switch(command, name));
        if remaining > 0 && !awaits_value {
            let present = parameter_set.names();
            let mut fallback = Vec::new();
            for param in self.model.parameter_candidates_for(command, &present) {
                if cancellation.is_cancelled() {
                    return None;
                }
                let text = ranking::append_parameter(request.raw_user_input, param.name, param.example);
                if ranked.iter().any(|c| c.text == text) {
                    continue;
                }
                fallback.push(SuggestionCandidate {
                    text,
                    command: command.to_string(),
                    weight: param.weight,
                    rank: param.rank,
                    source: SuggestionSource::Parameter,
                });
            }
            ranked.extend(ranking::rank(ranking::dedup(fallback), remaining));
        }

        Some(SuggestionResult::from_ranked(ranked))
    }
}

fn is_same_input(text: &str, raw_user_input: &str) -> bool {
    text.trim().eq_ignore_ascii_case(raw_user_input.trim())
}
