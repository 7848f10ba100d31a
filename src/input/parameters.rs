//! Parameter resolution.
//!
//! Maps the arguments a user supplied to canonical parameter names using the
//! command's metadata. A single argument that cannot be mapped makes the whole
//! invocation unrecognized: a partial set would send the model lookup after
//! the wrong command lines.

use tracing::debug;

use super::parser::RawArgument;
use crate::model::CommandCatalog;

/// Where a resolved parameter came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArgumentOrigin {
    /// Bound from the n-th positional argument.
    Positional(usize),
    Named,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParameterEntry {
    pub name: String,
    pub value: Option<String>,
    pub origin: ArgumentOrigin,
}

/// One supplied argument after resolution, in the user's order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolvedArgument {
    Parameter(ParameterEntry),
    /// A positional value with no metadata to bind it; kept for rendering.
    Unbound { value: String },
}

/// Canonical parameters of one invocation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParameterSet {
    arguments: Vec<ResolvedArgument>,
    unrecognized: bool,
}

impl ParameterSet {
    /// A set for a bare command with no arguments.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Marker for an invocation that could not be resolved.
    pub fn unrecognized() -> Self {
        Self {
            arguments: Vec::new(),
            unrecognized: true,
        }
    }

    pub fn is_unrecognized(&self) -> bool {
        self.unrecognized
    }

    /// True when the user supplied no arguments at all.
    pub fn has_no_arguments(&self) -> bool {
        self.arguments.is_empty()
    }

    pub fn arguments(&self) -> &[ResolvedArgument] {
        &self.arguments
    }

    pub fn entries(&self) -> impl Iterator<Item = &ParameterEntry> {
        self.arguments.iter().filter_map(|arg| match arg {
            ResolvedArgument::Parameter(entry) => Some(entry),
            ResolvedArgument::Unbound { .. } => None,
        })
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries().map(|e| e.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The last argument is a named, non-switch parameter still waiting for
    /// its value.
    pub fn awaits_value(&self, is_switch: impl Fn(&str) -> bool) -> bool {
        matches!(
            self.arguments.last(),
            Some(ResolvedArgument::Parameter(ParameterEntry {
                name,
                value: None,
                origin: ArgumentOrigin::Named,
            })) if !is_switch(name.as_str())
        )
    }
}

/// Resolve `arguments` of `command` against the catalog.
///
/// Named arguments bind first (exact name, alias or unambiguous prefix).
/// Positional arguments then fill the declared positional parameters in
/// order, skipping any already bound by name. A value typed after a switch
/// is treated as positional.
pub fn resolve(command: &str, arguments: &[RawArgument], catalog: &dyn CommandCatalog) -> ParameterSet {
    let positional_slots = catalog.positional_parameters(command);
    let has_metadata = positional_slots.is_some();

    enum Pending {
        Named(ParameterEntry),
        Positional(String),
    }

    let mut pending = Vec::with_capacity(arguments.len());
    for argument in arguments {
        match argument {
            RawArgument::Positional { value } => pending.push(Pending::Positional(value.clone())),
            RawArgument::Named { name, value } => {
                let canonical = if has_metadata {
                    match catalog.resolve_parameter(command, name) {
                        Some(canonical) => canonical,
                        None => {
                            debug!(command, parameter = %name, "unresolvable parameter");
                            return ParameterSet::unrecognized();
                        }
                    }
                } else {
                    name.clone()
                };

                let (value, spill) = match value {
                    Some(v) if has_metadata && catalog.is_switch(command, &canonical) => {
                        (None, Some(v.clone()))
                    }
                    other => (other.clone(), None),
                };
                pending.push(Pending::Named(ParameterEntry {
                    name: canonical,
                    value,
                    origin: ArgumentOrigin::Named,
                }));
                if let Some(v) = spill {
                    pending.push(Pending::Positional(v));
                }
            }
        }
    }

    let mut bound: Vec<String> = Vec::new();
    for item in &pending {
        if let Pending::Named(entry) = item {
            if bound.iter().any(|b| b.eq_ignore_ascii_case(&entry.name)) {
                debug!(command, parameter = %entry.name, "parameter supplied twice");
                return ParameterSet::unrecognized();
            }
            bound.push(entry.name.clone());
        }
    }

    let mut free_slots = positional_slots
        .unwrap_or_default()
        .into_iter()
        .filter(|slot| !bound.iter().any(|b| b.eq_ignore_ascii_case(slot)));

    let mut resolved = Vec::with_capacity(pending.len());
    let mut position = 0;
    for item in pending {
        match item {
            Pending::Named(entry) => resolved.push(ResolvedArgument::Parameter(entry)),
            Pending::Positional(value) if !has_metadata => {
                resolved.push(ResolvedArgument::Unbound { value });
            }
            Pending::Positional(value) => {
                let Some(slot) = free_slots.next() else {
                    debug!(command, value = %value, "no positional slot left");
                    return ParameterSet::unrecognized();
                };
                resolved.push(ResolvedArgument::Parameter(ParameterEntry {
                    name: slot,
                    value: Some(value),
                    origin: ArgumentOrigin::Positional(position),
                }));
                position += 1;
            }
        }
    }

    ParameterSet {
        arguments: resolved,
        unrecognized: false,
    }
}
