//! History context used to condition model lookups.
//!
//! This module tracks the commands the user ran most recently and turns them
//! into the key the usage model is indexed by.

mod history;

pub use history::{CommandToken, HistoryTracker};

/// Stand-in for "no recorded command" in a history slot.
pub const COMMAND_PLACEHOLDER: &str = "start_of_snippet";

/// Separator between slots in a serialized context key.
pub const COMMAND_CONCATENATOR: &str = "\n";

/// Snapshot of the history window, oldest slot first.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ContextKey {
    slots: Vec<String>,
    key: String,
}

impl ContextKey {
    pub fn from_slots(slots: Vec<String>) -> Self {
        let key = slots.join(COMMAND_CONCATENATOR);
        Self { slots, key }
    }

    /// The key of a session with no history yet.
    pub fn start(width: usize) -> Self {
        Self::from_slots(vec![COMMAND_PLACEHOLDER.to_string(); width.max(1)])
    }

    pub fn as_str(&self) -> &str {
        &self.key
    }

    pub fn slots(&self) -> &[String] {
        &self.slots
    }

    pub fn is_start(&self) -> bool {
        self.slots.iter().all(|s| s == COMMAND_PLACEHOLDER)
    }

    /// Keys to try in order: this key, then the same key with the oldest
    /// remaining slot forgotten, down to the start key.
    pub fn fallbacks(&self) -> Vec<ContextKey> {
        let mut keys = vec![self.clone()];
        let mut slots = self.slots.clone();
        for idx in 0..slots.len() {
            if slots[idx] == COMMAND_PLACEHOLDER {
                continue;
            }
            slots[idx] = COMMAND_PLACEHOLDER.to_string();
            keys.push(ContextKey::from_slots(slots.clone()));
        }
        keys
    }
}

impl std::fmt::Display for ContextKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.slots.join(" > "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(slots: &[&str]) -> ContextKey {
        ContextKey::from_slots(slots.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_key_joins_slots() {
        assert_eq!(key(&["a", "b"]).as_str(), "a\nb");
    }

    #[test]
    fn test_start_key() {
        let start = ContextKey::start(2);
        assert!(start.is_start());
        assert_eq!(start.as_str(), "start_of_snippet\nstart_of_snippet");
    }

    #[test]
    fn test_fallbacks_forget_oldest_first() {
        let fallbacks: Vec<String> = key(&["Connect-AzAccount", "Get-AzSubscription"])
            .fallbacks()
            .iter()
            .map(|k| k.as_str().to_string())
            .collect();

        assert_eq!(
            fallbacks,
            vec![
                "Connect-AzAccount\nGet-AzSubscription".to_string(),
                "start_of_snippet\nGet-AzSubscription".to_string(),
                "start_of_snippet\nstart_of_snippet".to_string(),
            ]
        );
    }

    #[test]
    fn test_fallbacks_skip_placeholder_slots() {
        let fallbacks = key(&[COMMAND_PLACEHOLDER, "Get-AzVM"]).fallbacks();
        assert_eq!(fallbacks.len(), 2);
        assert!(fallbacks[1].is_start());
    }

    #[test]
    fn test_start_key_has_single_fallback() {
        assert_eq!(ContextKey::start(2).fallbacks().len(), 1);
    }
}
