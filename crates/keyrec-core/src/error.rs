// Keyrec Recorder Errors
// Error taxonomy surfaced as recorder state, plus the message formatter

use strum_macros::{AsRefStr, EnumIter};

/// Kinds of recorder error. `None` is the neutral value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, AsRefStr, EnumIter)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    #[default]
    None,
    MaxModKeysExceeded,
    MinModKeysRequired,
    ModKeyNotAllowed,
    KeyNotAllowed,
    ShortcutNotAllowed,
}

impl ErrorKind {
    /// Message template with `{name}` placeholders
    pub fn template(self) -> &'static str {
        match self {
            ErrorKind::None => "",
            ErrorKind::MaxModKeysExceeded => "You can only use up to {maxModKeys} modifier keys",
            ErrorKind::MinModKeysRequired => "You must use at least {minModKeys} modifier keys",
            ErrorKind::ModKeyNotAllowed => "{modKey} is not allowed",
            ErrorKind::KeyNotAllowed => "{keycode} is not allowed",
            ErrorKind::ShortcutNotAllowed => "{shortcut} is not allowed",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Named values substituted into an error template
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorParams {
    pub max_mod_keys: Option<usize>,
    pub min_mod_keys: Option<usize>,
    pub mod_key: Option<String>,
    pub keycode: Option<String>,
    pub shortcut: Option<String>,
}

impl ErrorParams {
    pub fn max_mod_keys(value: usize) -> Self {
        Self {
            max_mod_keys: Some(value),
            ..Self::default()
        }
    }

    pub fn min_mod_keys(value: usize) -> Self {
        Self {
            min_mod_keys: Some(value),
            ..Self::default()
        }
    }

    pub fn mod_key(value: impl Into<String>) -> Self {
        Self {
            mod_key: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn keycode(value: impl Into<String>) -> Self {
        Self {
            keycode: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn shortcut(value: impl Into<String>) -> Self {
        Self {
            shortcut: Some(value.into()),
            ..Self::default()
        }
    }

    fn lookup(&self, name: &str) -> Option<String> {
        match name {
            "maxModKeys" => self.max_mod_keys.map(|v| v.to_string()),
            "minModKeys" => self.min_mod_keys.map(|v| v.to_string()),
            "modKey" => self.mod_key.clone(),
            "keycode" => self.keycode.clone(),
            "shortcut" => self.shortcut.clone(),
            _ => None,
        }
    }
}

/// A recorder error: kind plus rendered message
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct RecorderError {
    kind: ErrorKind,
    message: String,
}

impl RecorderError {
    /// The neutral value
    pub fn none() -> Self {
        Self::default()
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_none(&self) -> bool {
        self.kind == ErrorKind::None
    }
}

/// Render an error kind and its parameters into a [`RecorderError`].
///
/// Placeholders without a matching parameter are dropped and the result is
/// trimmed.
pub fn format_error(kind: ErrorKind, params: &ErrorParams) -> RecorderError {
    if kind == ErrorKind::None {
        return RecorderError::none();
    }

    let template = kind.template();
    let mut message = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        message.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                if let Some(value) = params.lookup(&after[..close]) {
                    message.push_str(&value);
                }
                rest = &after[close + 1..];
            }
            None => {
                message.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    message.push_str(rest);

    RecorderError {
        kind,
        message: message.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_format_none() {
        let err = format_error(ErrorKind::None, &ErrorParams::keycode("KeyA"));
        assert!(err.is_none());
        assert_eq!(err.message(), "");
        assert_eq!(err, RecorderError::none());
    }

    #[test]
    fn test_format_substitutes_params() {
        let err = format_error(ErrorKind::MaxModKeysExceeded, &ErrorParams::max_mod_keys(2));
        assert_eq!(err.kind(), ErrorKind::MaxModKeysExceeded);
        assert_eq!(err.message(), "You can only use up to 2 modifier keys");

        let err = format_error(ErrorKind::MinModKeysRequired, &ErrorParams::min_mod_keys(1));
        assert_eq!(err.message(), "You must use at least 1 modifier keys");

        let err = format_error(ErrorKind::ModKeyNotAllowed, &ErrorParams::mod_key("Control"));
        assert_eq!(err.message(), "Control is not allowed");

        let err = format_error(
            ErrorKind::ShortcutNotAllowed,
            &ErrorParams::shortcut("Control+Alt+Space"),
        );
        assert_eq!(err.message(), "Control+Alt+Space is not allowed");
        assert_eq!(err.to_string(), "Control+Alt+Space is not allowed");
    }

    #[test]
    fn test_format_missing_param_is_dropped() {
        let err = format_error(ErrorKind::KeyNotAllowed, &ErrorParams::default());
        assert_eq!(err.kind(), ErrorKind::KeyNotAllowed);
        assert_eq!(err.message(), "is not allowed");
    }

    #[test]
    fn test_format_ignores_unrelated_params() {
        let err = format_error(ErrorKind::KeyNotAllowed, &ErrorParams::max_mod_keys(3));
        assert_eq!(err.message(), "is not allowed");
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(ErrorKind::None.to_string(), "NONE");
        assert_eq!(ErrorKind::MaxModKeysExceeded.to_string(), "MAX_MOD_KEYS_EXCEEDED");
        assert_eq!(ErrorKind::ShortcutNotAllowed.to_string(), "SHORTCUT_NOT_ALLOWED");
    }

    #[test]
    fn test_every_kind_but_none_has_template() {
        for kind in ErrorKind::iter() {
            assert_eq!(kind.template().is_empty(), kind == ErrorKind::None, "{}", kind);
        }
    }
}
