use std::fmt;

use crate::Key;

/// Represents the action state of a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Release,
    Press,
    Repeat,
}

impl Action {
    /// Returns true if the action is either PRESS or REPEAT
    pub fn is_pressed(self) -> bool {
        matches!(self, Action::Press | Action::Repeat)
    }

    /// Parse an action word as used in key traces
    pub fn from_word(word: &str) -> Option<Self> {
        match word {
            "press" | "down" => Some(Action::Press),
            "release" | "up" => Some(Action::Release),
            "repeat" => Some(Action::Repeat),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Release => write!(f, "release"),
            Action::Press => write!(f, "press"),
            Action::Repeat => write!(f, "repeat"),
        }
    }
}

/// One discrete signal from the event source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub action: Action,
}

impl KeyEvent {
    pub fn new(key: impl Into<Key>, action: Action) -> Self {
        Self {
            key: key.into(),
            action,
        }
    }

    pub fn press(key: impl Into<Key>) -> Self {
        Self::new(key, Action::Press)
    }

    pub fn release(key: impl Into<Key>) -> Self {
        Self::new(key, Action::Release)
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.action, self.key)
    }
}
