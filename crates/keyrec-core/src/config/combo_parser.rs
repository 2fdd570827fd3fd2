// Keyrec Config API - Combo String Parser
// Parses combo strings like "Control+Alt+Space" into shortcut tokens

/// Separator between tokens in a combo string
pub const COMBO_SEPARATOR: char = '+';

/// Errors that can occur during combo parsing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComboParseError {
    /// Empty input string
    #[error("combo string cannot be empty")]
    EmptyInput,
    /// Two separators in a row, or a leading separator
    #[error("combo string has an empty component at position {0}")]
    EmptyToken(usize),
    /// Input ends with the separator (e.g., "Control+")
    #[error("combo string cannot end with '+'")]
    TrailingSeparator,
}

/// Parse a combo string like "Control+Shift+KeyA" into its tokens
///
/// Tokens are kept in the order written; canonical ordering happens when the
/// policy compiles them.
///
/// # Examples
/// ```
/// use keyrec_core::config::parse_combo_string;
/// let tokens = parse_combo_string("Alt+Control+Space").unwrap();
/// assert_eq!(tokens, vec!["Alt", "Control", "Space"]);
/// ```
pub fn parse_combo_string(exp: &str) -> Result<Vec<String>, ComboParseError> {
    let trimmed = exp.trim();
    if trimmed.is_empty() {
        return Err(ComboParseError::EmptyInput);
    }

    if trimmed.ends_with(COMBO_SEPARATOR) {
        return Err(ComboParseError::TrailingSeparator);
    }

    trimmed
        .split(COMBO_SEPARATOR)
        .enumerate()
        .map(|(i, part)| {
            let token = part.trim();
            if token.is_empty() {
                Err(ComboParseError::EmptyToken(i))
            } else {
                Ok(token.to_string())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_key() {
        assert_eq!(parse_combo_string("KeyA").unwrap(), vec!["KeyA"]);
    }

    #[test]
    fn test_parse_multiple_tokens() {
        let tokens = parse_combo_string("Control+Shift+KeyA").unwrap();
        assert_eq!(tokens, vec!["Control", "Shift", "KeyA"]);
    }

    #[test]
    fn test_parse_with_whitespace() {
        let tokens = parse_combo_string("  Control + Alt +Space ").unwrap();
        assert_eq!(tokens, vec!["Control", "Alt", "Space"]);
    }

    #[test]
    fn test_parse_empty_string() {
        assert_eq!(parse_combo_string(""), Err(ComboParseError::EmptyInput));
        assert_eq!(parse_combo_string("   "), Err(ComboParseError::EmptyInput));
    }

    #[test]
    fn test_parse_trailing_separator() {
        assert_eq!(
            parse_combo_string("Control+"),
            Err(ComboParseError::TrailingSeparator)
        );
    }

    #[test]
    fn test_parse_empty_token() {
        assert_eq!(
            parse_combo_string("Control++KeyA"),
            Err(ComboParseError::EmptyToken(1))
        );
        assert_eq!(
            parse_combo_string("+KeyA"),
            Err(ComboParseError::EmptyToken(0))
        );
    }
}
