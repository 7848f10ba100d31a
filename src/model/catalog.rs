//! Command metadata lookup.
//!
//! The resolver needs to know which parameters a command declares, where they
//! bind positionally and which aliases they answer to. That knowledge comes
//! from a [`CommandCatalog`]; [`StaticCatalog`] is the precomputed mapping
//! shipped alongside the usage model.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Metadata queries the parameter resolver depends on.
pub trait CommandCatalog: Send + Sync {
    /// Canonical parameter names bound by position, in position order.
    /// `None` means no metadata exists for the command.
    fn positional_parameters(&self, command: &str) -> Option<Vec<String>>;

    /// Resolve a typed parameter token (name, alias or unambiguous prefix)
    /// to its canonical name.
    fn resolve_parameter(&self, command: &str, token: &str) -> Option<String>;

    /// Whether the canonical parameter takes no value.
    fn is_switch(&self, command: &str, parameter: &str) -> bool;
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParameterMetadata {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
    #[serde(default, rename = "switch")]
    pub is_switch: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CommandMetadata {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<ParameterMetadata>,
}

/// Catalog backed by an in-memory map keyed by lowercase command name.
#[derive(Clone, Debug, Default)]
pub struct StaticCatalog {
    commands: HashMap<String, CommandMetadata>,
}

impl StaticCatalog {
    pub fn new(commands: impl IntoIterator<Item = CommandMetadata>) -> Self {
        let commands = commands
            .into_iter()
            .map(|meta| (meta.name.to_lowercase(), meta))
            .collect();
        Self { commands }
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    fn command(&self, name: &str) -> Option<&CommandMetadata> {
        self.commands.get(&name.to_lowercase())
    }
}

impl CommandCatalog for StaticCatalog {
    fn positional_parameters(&self, command: &str) -> Option<Vec<String>> {
        let meta = self.command(command)?;
        let mut positional: Vec<(usize, &str)> = meta
            .parameters
            .iter()
            .filter_map(|p| p.position.map(|pos| (pos, p.name.as_str())))
            .collect();
        positional.sort_by_key(|(pos, _)| *pos);
        Some(positional.into_iter().map(|(_, name)| name.to_string()).collect())
    }

    fn resolve_parameter(&self, command: &str, token: &str) -> Option<String> {
        let meta = self.command(command)?;
        let token = token.to_lowercase();
        if token.is_empty() {
            return None;
        }

        let spellings = || {
            meta.parameters.iter().flat_map(|p| {
                std::iter::once(p.name.as_str())
                    .chain(p.aliases.iter().map(String::as_str))
                    .map(move |spelling| (spelling.to_lowercase(), p.name.as_str()))
            })
        };

        if let Some((_, canonical)) = spellings().find(|(spelling, _)| *spelling == token) {
            return Some(canonical.to_string());
        }

        let mut matches: Vec<&str> = spellings()
            .filter(|(spelling, _)| spelling.starts_with(&token))
            .map(|(_, canonical)| canonical)
            .collect();
        matches.dedup();

        match matches.as_slice() {
            [single] => Some(single.to_string()),
            _ => None,
        }
    }

    fn is_switch(&self, command: &str, parameter: &str) -> bool {
        self.command(command)
            .and_then(|meta| {
                meta.parameters
                    .iter()
                    .find(|p| p.name.eq_ignore_ascii_case(parameter))
            })
            .is_some_and(|p| p.is_switch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(name: &str, aliases: &[&str], position: Option<usize>, is_switch: bool) -> ParameterMetadata {
        ParameterMetadata {
            name: name.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            position,
            is_switch,
        }
    }

    fn catalog() -> StaticCatalog {
        StaticCatalog::new([CommandMetadata {
            name: "Get-AzResource".to_string(),
            parameters: vec![
                param("Name", &["ResourceName"], Some(1), false),
                param("ResourceGroupName", &[], Some(0), false),
                param("ResourceType", &[], None, false),
                param("Pre", &[], None, true),
                param("ExpandProperties", &[], None, true),
            ],
        }])
    }

    #[test]
    fn test_positional_order_follows_position() {
        let positional = catalog().positional_parameters("get-azresource").unwrap();
        assert_eq!(positional, vec!["ResourceGroupName", "Name"]);
    }

    #[test]
    fn test_unknown_command_has_no_metadata() {
        let catalog = catalog();
        assert!(catalog.positional_parameters("git").is_none());
        assert!(catalog.resolve_parameter("git", "status").is_none());
    }

    #[test]
    fn test_exact_and_alias_resolution() {
        let catalog = catalog();
        assert_eq!(catalog.resolve_parameter("Get-AzResource", "NAME").as_deref(), Some("Name"));
        assert_eq!(
            catalog.resolve_parameter("Get-AzResource", "resourcename").as_deref(),
            Some("Name")
        );
    }

    #[test]
    fn test_exact_match_beats_prefix() {
        // "Pre" is a full name even though nothing else shares the prefix.
        assert_eq!(catalog().resolve_parameter("Get-AzResource", "pre").as_deref(), Some("Pre"));
    }

    #[test]
    fn test_unambiguous_prefix() {
        assert_eq!(
            catalog().resolve_parameter("Get-AzResource", "resourceg").as_deref(),
            Some("ResourceGroupName")
        );
        assert_eq!(
            catalog().resolve_parameter("Get-AzResource", "exp").as_deref(),
            Some("ExpandProperties")
        );
    }

    #[test]
    fn test_ambiguous_prefix_is_unresolved() {
        // ResourceGroupName, ResourceType and the ResourceName alias all match.
        assert!(catalog().resolve_parameter("Get-AzResource", "res").is_none());
    }

    #[test]
    fn test_prefix_shared_by_name_and_its_alias_is_unambiguous() {
        let catalog = StaticCatalog::new([CommandMetadata {
            name: "Get-AzVM".to_string(),
            parameters: vec![param("Name", &["NameOfVM"], Some(0), false)],
        }]);
        assert_eq!(catalog.resolve_parameter("Get-AzVM", "na").as_deref(), Some("Name"));
    }

    #[test]
    fn test_switch_lookup() {
        let catalog = catalog();
        assert!(catalog.is_switch("Get-AzResource", "pre"));
        assert!(!catalog.is_switch("Get-AzResource", "Name"));
        assert!(!catalog.is_switch("Get-AzResource", "Missing"));
    }
}
