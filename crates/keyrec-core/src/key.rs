// Keyrec Key Type
// Opaque identifier for one physical key, as delivered by the event source

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier of the cancel key. Pressing it aborts a recording session.
pub const ESCAPE: &str = "Escape";

/// Represents a single physical key.
///
/// Identifiers follow the physical key-code vocabulary (`KeyA`, `Digit1`,
/// `ShiftLeft`, `MetaRight`, `Space`, ...). Left and right variants stay
/// distinct here; normalization happens in [`crate::modifier::classify`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Key(String);

impl Key {
    /// Create a key from its identifier
    pub fn new(identifier: impl Into<String>) -> Self {
        Key(identifier.into())
    }

    /// Get the raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true for the cancel key
    pub fn is_escape(&self) -> bool {
        self.0 == ESCAPE
    }
}

impl From<&str> for Key {
    fn from(identifier: &str) -> Self {
        Key::new(identifier)
    }
}

impl From<String> for Key {
    fn from(identifier: String) -> Self {
        Key(identifier)
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error returned when parsing an empty key identifier
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("key identifier cannot be empty")]
pub struct KeyParseError;

impl FromStr for Key {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(KeyParseError);
        }
        Ok(Key::new(trimmed))
    }
}

/// ASCII character to key mapping (US layout)
///
/// Shifted symbols map to the key that produces them, so `'!'` and `'1'`
/// both resolve to `Digit1`.
pub fn ascii_to_key(c: char) -> Option<Key> {
    if c.is_ascii_alphabetic() {
        return Some(Key::new(format!("Key{}", c.to_ascii_uppercase())));
    }
    if c.is_ascii_digit() {
        return Some(Key::new(format!("Digit{}", c)));
    }
    let name = match c {
        ' ' => "Space",
        ';' | ':' => "Semicolon",
        '\'' | '"' => "Quote",
        '=' | '+' => "Equal",
        '-' | '_' => "Minus",
        '`' | '~' => "Backquote",
        '[' | '{' => "BracketLeft",
        ']' | '}' => "BracketRight",
        ',' | '<' => "Comma",
        '.' | '>' => "Period",
        '/' | '?' => "Slash",
        '\\' | '|' => "Backslash",
        '!' => "Digit1",
        '@' => "Digit2",
        '#' => "Digit3",
        '$' => "Digit4",
        '%' => "Digit5",
        '^' => "Digit6",
        '&' => "Digit7",
        '*' => "Digit8",
        '(' => "Digit9",
        ')' => "Digit0",
        _ => return None,
    };
    Some(Key::new(name))
}
