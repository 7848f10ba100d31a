//! Ranking and rendering of suggestion candidates.

use std::collections::HashMap;

use crate::input::{ArgumentOrigin, ParameterEntry, ResolvedArgument};
use crate::model::Prediction;

/// Which table a candidate came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SuggestionSource {
    /// A full command line stored for the current history context.
    Command,
    /// A single parameter appended to what the user typed.
    Parameter,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SuggestionCandidate {
    pub text: String,
    /// Command the suggestion runs, in the model's casing.
    pub command: String,
    pub weight: f64,
    /// Position in the model's stored order; breaks weight ties.
    pub rank: usize,
    pub source: SuggestionSource,
}

/// Collapse candidates with the same rendered text, keeping the heavier one.
pub fn dedup(candidates: Vec<SuggestionCandidate>) -> Vec<SuggestionCandidate> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut unique: Vec<SuggestionCandidate> = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        match seen.get(&candidate.text) {
            Some(&idx) => {
                if candidate.weight > unique[idx].weight {
                    unique[idx] = candidate;
                }
            }
            None => {
                seen.insert(candidate.text.clone(), unique.len());
                unique.push(candidate);
            }
        }
    }
    unique
}

/// Sort by weight (descending) then stored order, and keep the first `count`.
pub fn rank(candidates: Vec<SuggestionCandidate>, count: usize) -> Vec<SuggestionCandidate> {
    rank_with(candidates, count, |_| true)
}

/// Like [`rank`], but only candidates accepted by `admit` (called in rank
/// order) take a slot.
pub fn rank_with(
    mut candidates: Vec<SuggestionCandidate>,
    count: usize,
    mut admit: impl FnMut(&SuggestionCandidate) -> bool,
) -> Vec<SuggestionCandidate> {
    candidates.sort_by(|a, b| b.weight.total_cmp(&a.weight).then_with(|| a.rank.cmp(&b.rank)));
    candidates
        .into_iter()
        .filter(|c| admit(c))
        .take(count)
        .collect()
}

/// Render a stored command line against what the user already typed.
///
/// The command takes the model's casing. The user's arguments follow in their
/// original order: positional values verbatim, named ones under the model's
/// parameter name with the user's value, or the model's value when none was
/// typed. The line's remaining parameters are appended in stored order.
pub fn render_completion(prediction: &Prediction, arguments: &[ResolvedArgument]) -> String {
    let mut line = prediction.command.clone();

    for argument in arguments {
        match argument {
            ResolvedArgument::Unbound { value } => push_token(&mut line, value),
            ResolvedArgument::Parameter(entry) => render_supplied(&mut line, entry, prediction),
        }
    }

    let supplied = |name: &str| {
        arguments.iter().any(|arg| match arg {
            ResolvedArgument::Parameter(entry) => entry.name.eq_ignore_ascii_case(name),
            ResolvedArgument::Unbound { .. } => false,
        })
    };

    for param in &prediction.parameters {
        if supplied(&param.name) {
            continue;
        }
        push_token(&mut line, &format!("-{}", param.name));
        if let Some(value) = &param.value {
            push_token(&mut line, value);
        }
    }

    line
}

fn render_supplied(line: &mut String, entry: &ParameterEntry, prediction: &Prediction) {
    let stored = prediction.parameter(&entry.name);
    match entry.origin {
        ArgumentOrigin::Positional(_) => {
            if let Some(value) = &entry.value {
                push_token(line, value);
            }
        }
        ArgumentOrigin::Named => {
            let name = stored.map_or(entry.name.as_str(), |p| p.name.as_str());
            push_token(line, &format!("-{name}"));
            if let Some(value) = entry.value.as_ref().or(stored.and_then(|p| p.value.as_ref())) {
                push_token(line, value);
            }
        }
    }
}

/// Append `-Name [example]` to the raw input, leaving the typed text as is.
pub fn append_parameter(raw_input: &str, name: &str, example: Option<&str>) -> String {
    let mut line = raw_input.to_string();
    if !line.is_empty() && !line.ends_with(char::is_whitespace) {
        line.push(' ');
    }
    line.push('-');
    line.push_str(name);
    if let Some(example) = example {
        line.push(' ');
        line.push_str(example);
    }
    line
}

fn push_token(line: &mut String, token: &str) {
    line.push(' ');
    line.push_str(token);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PredictedParameter;

    fn candidate(text: &str, weight: f64, rank: usize) -> SuggestionCandidate {
        SuggestionCandidate {
            text: text.to_string(),
            command: "Get-AzVM".to_string(),
            weight,
            rank,
            source: SuggestionSource::Command,
        }
    }

    fn prediction() -> Prediction {
        Prediction {
            text: String::new(),
            weight: 1.0,
            command: "Get-AzStorageAccountKey".to_string(),
            parameters: vec![
                PredictedParameter {
                    name: "Name".to_string(),
                    value: Some("'myStorageAccount'".to_string()),
                },
                PredictedParameter {
                    name: "ResourceGroupName".to_string(),
                    value: Some("'ContosoGroup02'".to_string()),
                },
            ],
            rank: 0,
        }
    }

    fn texts(candidates: &[SuggestionCandidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.text.as_str()).collect()
    }

    #[test]
    fn test_rank_orders_by_weight_then_stored_order() {
        let ranked = rank(
            vec![
                candidate("c", 1.0, 0),
                candidate("b", 5.0, 2),
                candidate("a", 5.0, 1),
            ],
            3,
        );
        assert_eq!(texts(&ranked), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_rank_truncates() {
        let ranked = rank(vec![candidate("a", 2.0, 0), candidate("b", 1.0, 1)], 1);
        assert_eq!(texts(&ranked), vec!["a"]);
    }

    #[test]
    fn test_rank_with_skips_rejected_without_using_slots() {
        let ranked = rank_with(
            vec![candidate("a", 3.0, 0), candidate("b", 2.0, 1), candidate("c", 1.0, 2)],
            2,
            |c| c.text != "a",
        );
        assert_eq!(texts(&ranked), vec!["b", "c"]);
    }

    #[test]
    fn test_dedup_keeps_heavier() {
        let unique = dedup(vec![
            candidate("a", 1.0, 0),
            candidate("b", 2.0, 1),
            candidate("a", 3.0, 2),
        ]);
        assert_eq!(texts(&unique), vec!["a", "b"]);
        assert_eq!(unique[0].weight, 3.0);
        assert_eq!(unique[0].rank, 2);
    }

    #[test]
    fn test_render_fills_missing_value_from_model() {
        let arguments = vec![ResolvedArgument::Parameter(ParameterEntry {
            name: "Name".to_string(),
            value: None,
            origin: ArgumentOrigin::Named,
        })];
        assert_eq!(
            render_completion(&prediction(), &arguments),
            "Get-AzStorageAccountKey -Name 'myStorageAccount' -ResourceGroupName 'ContosoGroup02'"
        );
    }

    #[test]
    fn test_render_keeps_user_values_and_positionals() {
        let arguments = vec![
            ResolvedArgument::Parameter(ParameterEntry {
                name: "ResourceGroupName".to_string(),
                value: Some("rg".to_string()),
                origin: ArgumentOrigin::Positional(0),
            }),
            ResolvedArgument::Parameter(ParameterEntry {
                name: "name".to_string(),
                value: Some("acct".to_string()),
                origin: ArgumentOrigin::Named,
            }),
        ];
        assert_eq!(
            render_completion(&prediction(), &arguments),
            "Get-AzStorageAccountKey rg -Name acct"
        );
    }

    #[test]
    fn test_append_parameter() {
        assert_eq!(
            append_parameter("get-azvm -name vm1", "Status", None),
            "get-azvm -name vm1 -Status"
        );
        assert_eq!(
            append_parameter("get-azvm -name vm1 ", "ResourceGroupName", Some("'rg'")),
            "get-azvm -name vm1 -ResourceGroupName 'rg'"
        );
    }
}
