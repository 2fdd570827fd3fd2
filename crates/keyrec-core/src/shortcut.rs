// Keyrec Shortcut Type
// Canonical ordered sequence of modifiers plus at most one trigger key

use std::fmt;
use std::ops::Deref;

use smallvec::SmallVec;

use crate::modifier::{classify, KeyClass, ModifierSet};
use crate::Key;

/// Separator used when rendering a shortcut into its comparison key
pub const COMPARISON_SEPARATOR: char = '+';

/// An ordered shortcut: canonical modifiers in priority order, then the
/// trigger key token if present.
///
/// Two shortcuts are equal iff their token sequences are element-wise equal.
/// Uses SmallVec to avoid heap allocation for the common case of up to four
/// modifiers plus one trigger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Shortcut {
    tokens: SmallVec<[String; 5]>,
}

impl Shortcut {
    /// Create an empty shortcut
    pub fn new() -> Self {
        Self::default()
    }

    /// Render a modifier set and optional trigger into canonical order
    pub fn order(trigger: Option<&Key>, modifiers: &ModifierSet) -> Self {
        let mut tokens: SmallVec<[String; 5]> =
            modifiers.iter().map(|m| m.as_str().to_string()).collect();
        if let Some(key) = trigger {
            tokens.push(key.as_str().to_string());
        }
        Self { tokens }
    }

    /// Build a shortcut from raw tokens, keeping their order as given
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    /// Get the tokens of this shortcut
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// String used for exclusion-set membership tests
    pub fn comparison_key(&self) -> String {
        let mut key = String::new();
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                key.push(COMPARISON_SEPARATOR);
            }
            key.push_str(token);
        }
        key
    }

    /// Re-classify every token into a modifier set and the trigger keys.
    ///
    /// For shortcuts produced by [`Shortcut::order`] the trigger list holds at
    /// most one key and `Shortcut::order` of the result reproduces `self`.
    pub fn split(&self) -> (ModifierSet, Vec<Key>) {
        let mut modifiers = ModifierSet::new();
        let mut triggers = Vec::new();
        for token in &self.tokens {
            match classify(&Key::new(token.as_str())) {
                KeyClass::Modifier(m) => {
                    modifiers.insert(m);
                }
                KeyClass::Trigger(key) => triggers.push(key),
            }
        }
        (modifiers, triggers)
    }
}

impl Deref for Shortcut {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.tokens
    }
}

impl fmt::Display for Shortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.comparison_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modifier::ModifierName;

    fn tokens(shortcut: &Shortcut) -> Vec<&str> {
        shortcut.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_order_priority() {
        let mods: ModifierSet = [ModifierName::Meta, ModifierName::Alt, ModifierName::Control]
            .into_iter()
            .collect();
        let shortcut = Shortcut::order(Some(&Key::from("KeyK")), &mods);
        assert_eq!(tokens(&shortcut), vec!["Control", "Alt", "Meta", "KeyK"]);
    }

    #[test]
    fn test_order_without_trigger() {
        let mods: ModifierSet = [ModifierName::Alt, ModifierName::Shift].into_iter().collect();
        let shortcut = Shortcut::order(None, &mods);
        assert_eq!(tokens(&shortcut), vec!["Shift", "Alt"]);
    }

    #[test]
    fn test_order_empty() {
        let shortcut = Shortcut::order(None, &ModifierSet::new());
        assert!(shortcut.is_empty());
        assert_eq!(shortcut.comparison_key(), "");
    }

    #[test]
    fn test_order_insertion_invariant() {
        let orders = [
            [ModifierName::Control, ModifierName::Shift, ModifierName::Alt],
            [ModifierName::Alt, ModifierName::Control, ModifierName::Shift],
            [ModifierName::Shift, ModifierName::Alt, ModifierName::Control],
        ];
        let key = Key::from("Space");
        let first: ModifierSet = orders[0].into_iter().collect();
        let expected = Shortcut::order(Some(&key), &first);
        for order in orders {
            let mut mods = ModifierSet::new();
            for m in order {
                mods.insert(m);
            }
            assert_eq!(Shortcut::order(Some(&key), &mods), expected);
        }
    }

    #[test]
    fn test_comparison_key() {
        let mods: ModifierSet = [ModifierName::Alt, ModifierName::Control].into_iter().collect();
        let shortcut = Shortcut::order(Some(&Key::from("Space")), &mods);
        assert_eq!(shortcut.comparison_key(), "Control+Alt+Space");
        assert_eq!(shortcut.to_string(), "Control+Alt+Space");
    }

    #[test]
    fn test_split_reproduces_state() {
        let mods: ModifierSet = [ModifierName::Shift, ModifierName::Meta].into_iter().collect();
        let key = Key::from("KeyQ");
        let shortcut = Shortcut::order(Some(&key), &mods);
        let (split_mods, triggers) = shortcut.split();
        assert_eq!(split_mods, mods);
        assert_eq!(triggers, vec![key.clone()]);
        assert_eq!(Shortcut::order(triggers.first(), &split_mods), shortcut);
    }

    #[test]
    fn test_split_normalizes_raw_tokens() {
        let raw = Shortcut::from_tokens(["Space", "ControlLeft", "AltRight"]);
        let (mods, triggers) = raw.split();
        assert!(mods.contains(ModifierName::Control));
        assert!(mods.contains(ModifierName::Alt));
        assert_eq!(triggers, vec![Key::from("Space")]);
        let canonical = Shortcut::order(triggers.first(), &mods);
        assert_eq!(canonical.comparison_key(), "Control+Alt+Space");
    }
}
