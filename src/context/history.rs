//! Rolling window of recently executed commands.
//!
//! The window is as wide as the model's context (two slots for a bigram
//! model) and always yields a full key: empty slots and commands the model
//! has never seen are filled with the placeholder token.

use std::collections::VecDeque;

use super::{COMMAND_PLACEHOLDER, ContextKey};

/// A command as the tracker records it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandToken {
    /// A command known to the model, in the model's casing.
    Known(String),
    /// Anything the model has no record of.
    Placeholder,
}

impl CommandToken {
    fn as_slot(&self) -> &str {
        match self {
            CommandToken::Known(name) => name,
            CommandToken::Placeholder => COMMAND_PLACEHOLDER,
        }
    }
}

#[derive(Clone, Debug)]
pub struct HistoryTracker {
    width: usize,
    window: VecDeque<CommandToken>,
}

impl HistoryTracker {
    pub fn new(width: usize) -> Self {
        let width = width.max(1);
        Self {
            width,
            window: VecDeque::with_capacity(width),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Record a command, evicting the oldest slot once the window is full.
    pub fn observe(&mut self, token: CommandToken) {
        // Evict the oldest command once the window is full
        if self.window.len() == self.width {
            self.window.pop_front();
        }
        self.window.push_back(token);
    }

    /// Key for the current window, oldest slot first.
    pub fn current_key(&self) -> ContextKey {
        let missing = self.width - self.window.len();
        let slots = std::iter::repeat_n(COMMAND_PLACEHOLDER, missing)
            .chain(self.window.iter().map(CommandToken::as_slot))
            .map(str::to_string)
            .collect();
        ContextKey::from_slots(slots)
    }

    /// Number of commands observed and still in the window.
    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn clear(&mut self) {
        self.window.clear();
    }
}
