// Keyrec Exclusion Policy
// Compiles user exclusion lists into fast-lookup sets

use std::collections::HashSet;

use indexmap::IndexSet;
use serde::Deserialize;

use crate::modifier::{classify, KeyClass, ModifierName, ModifierSet, MODIFIER_COUNT};
use crate::shortcut::Shortcut;
use crate::Key;

/// Default upper bound on held modifiers
pub const DEFAULT_MAX_MOD_KEYS: usize = MODIFIER_COUNT;

/// Default lower bound on held modifiers
pub const DEFAULT_MIN_MOD_KEYS: usize = 0;

/// Raw, user-supplied policy options.
///
/// Bounds are signed so out-of-range values reach [`ExclusionPolicy::compile`]
/// and get clamped there instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyOptions {
    pub excluded_mod_keys: Vec<String>,
    pub excluded_keys: Vec<String>,
    pub excluded_shortcuts: Vec<Vec<String>>,
    pub min_mod_keys: i64,
    pub max_mod_keys: i64,
}

impl Default for PolicyOptions {
    fn default() -> Self {
        Self {
            excluded_mod_keys: Vec::new(),
            excluded_keys: Vec::new(),
            excluded_shortcuts: Vec::new(),
            min_mod_keys: DEFAULT_MIN_MOD_KEYS as i64,
            max_mod_keys: DEFAULT_MAX_MOD_KEYS as i64,
        }
    }
}

/// Why an excluded-shortcut entry was dropped during compilation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DroppedReason {
    ExcludedModifier,
    ExcludedKey,
    MissingTrigger,
    MultipleTriggers,
    ModifierCountOutOfRange,
}

impl std::fmt::Display for DroppedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            DroppedReason::ExcludedModifier => "references an excluded modifier",
            DroppedReason::ExcludedKey => "references an excluded key",
            DroppedReason::MissingTrigger => "has no trigger key",
            DroppedReason::MultipleTriggers => "has more than one trigger key",
            DroppedReason::ModifierCountOutOfRange => "modifier count outside allowed range",
        };
        f.write_str(reason)
    }
}

/// Compiled exclusion policy, immutable once built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionPolicy {
    excluded_mods: ModifierSet,
    excluded_keys: HashSet<Key>,
    /// Comparison keys of excluded shortcuts, in configuration order
    excluded_shortcuts: IndexSet<String>,
    min_mod_keys: usize,
    max_mod_keys: usize,
}

impl Default for ExclusionPolicy {
    fn default() -> Self {
        Self::compile(&PolicyOptions::default())
    }
}

impl ExclusionPolicy {
    /// Compile raw options into a usable policy. Never fails.
    pub fn compile(options: &PolicyOptions) -> Self {
        let max_mod_keys = clamp_max_mod_keys(options.max_mod_keys);
        let min_mod_keys = clamp_min_mod_keys(options.min_mod_keys, max_mod_keys);

        let mut excluded_mods = ModifierSet::new();
        for raw in &options.excluded_mod_keys {
            match classify(&Key::new(raw.as_str())) {
                KeyClass::Modifier(m) => {
                    excluded_mods.insert(m);
                }
                KeyClass::Trigger(_) => {
                    log::warn!("Ignoring excluded modifier '{}': not a modifier key", raw);
                }
            }
        }

        // An unsatisfiable policy would make the recorder unusable
        if MODIFIER_COUNT - excluded_mods.len() < min_mod_keys {
            log::warn!(
                "Excluding {} modifier(s) leaves fewer than min_mod_keys={}; ignoring excluded modifiers",
                excluded_mods.len(),
                min_mod_keys
            );
            excluded_mods.clear();
        }

        let mut excluded_keys = HashSet::new();
        for raw in &options.excluded_keys {
            match classify(&Key::new(raw.as_str())) {
                KeyClass::Trigger(key) => {
                    excluded_keys.insert(key);
                }
                KeyClass::Modifier(m) => {
                    log::warn!(
                        "Ignoring excluded key '{}': {} is a modifier, use excluded_mod_keys",
                        raw,
                        m
                    );
                }
            }
        }

        let mut policy = Self {
            excluded_mods,
            excluded_keys,
            excluded_shortcuts: IndexSet::new(),
            min_mod_keys,
            max_mod_keys,
        };

        for entry in &options.excluded_shortcuts {
            match policy.canonicalize(entry) {
                Ok(comparison_key) => {
                    log::trace!("Excluding shortcut {}", comparison_key);
                    policy.excluded_shortcuts.insert(comparison_key);
                }
                Err(reason) => {
                    log::debug!("Dropping excluded shortcut {:?}: {}", entry, reason);
                }
            }
        }

        log::debug!(
            "Compiled policy: mod keys {}..={}, {} excluded modifier(s), {} excluded key(s), {} excluded shortcut(s)",
            policy.min_mod_keys,
            policy.max_mod_keys,
            policy.excluded_mods.len(),
            policy.excluded_keys.len(),
            policy.excluded_shortcuts.len()
        );

        policy
    }

    /// Validate one excluded-shortcut entry against the live rules and
    /// render its comparison key
    fn canonicalize(&self, entry: &[String]) -> Result<String, DroppedReason> {
        let (modifiers, triggers) = Shortcut::from_tokens(entry.iter().cloned()).split();

        if modifiers.intersects(&self.excluded_mods) {
            return Err(DroppedReason::ExcludedModifier);
        }
        if triggers.iter().any(|key| self.excluded_keys.contains(key)) {
            return Err(DroppedReason::ExcludedKey);
        }
        let trigger = match triggers.as_slice() {
            [] => return Err(DroppedReason::MissingTrigger),
            [key] => key,
            _ => return Err(DroppedReason::MultipleTriggers),
        };
        if modifiers.len() < self.min_mod_keys || modifiers.len() > self.max_mod_keys {
            return Err(DroppedReason::ModifierCountOutOfRange);
        }

        Ok(Shortcut::order(Some(trigger), &modifiers).comparison_key())
    }

    pub fn min_mod_keys(&self) -> usize {
        self.min_mod_keys
    }

    pub fn max_mod_keys(&self) -> usize {
        self.max_mod_keys
    }

    pub fn excluded_mods(&self) -> &ModifierSet {
        &self.excluded_mods
    }

    pub fn is_mod_excluded(&self, modifier: ModifierName) -> bool {
        self.excluded_mods.contains(modifier)
    }

    pub fn is_key_excluded(&self, key: &Key) -> bool {
        self.excluded_keys.contains(key)
    }

    /// Check a comparison key against the excluded shortcuts
    pub fn is_shortcut_excluded(&self, comparison_key: &str) -> bool {
        self.excluded_shortcuts.contains(comparison_key)
    }

    /// Excluded shortcuts as comparison keys, in configuration order
    pub fn excluded_shortcuts(&self) -> impl Iterator<Item = &str> {
        self.excluded_shortcuts.iter().map(String::as_str)
    }

    /// Excluded keys, sorted for stable output
    pub fn excluded_keys(&self) -> Vec<&Key> {
        let mut keys: Vec<&Key> = self.excluded_keys.iter().collect();
        keys.sort();
        keys
    }
}

/// Clamp `max_mod_keys` into `0..=4`, defaulting to 4 when out of range
fn clamp_max_mod_keys(value: i64) -> usize {
    match usize::try_from(value) {
        Ok(v) if v <= MODIFIER_COUNT => v,
        _ => DEFAULT_MAX_MOD_KEYS,
    }
}

/// Clamp `min_mod_keys` into `0..=max`, defaulting to 0 when out of range
fn clamp_min_mod_keys(value: i64, max: usize) -> usize {
    match usize::try_from(value) {
        Ok(v) if v <= max => v,
        _ => DEFAULT_MIN_MOD_KEYS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    fn options() -> PolicyOptions {
        PolicyOptions::default()
    }

    #[test]
    fn test_default_policy() {
        let policy = ExclusionPolicy::default();
        assert_eq!(policy.min_mod_keys(), 0);
        assert_eq!(policy.max_mod_keys(), 4);
        assert!(policy.excluded_mods().is_empty());
        assert_eq!(policy.excluded_shortcuts().count(), 0);
    }

    #[test]
    fn test_clamp_max_mod_keys() {
        assert_eq!(clamp_max_mod_keys(2), 2);
        assert_eq!(clamp_max_mod_keys(0), 0);
        assert_eq!(clamp_max_mod_keys(4), 4);
        assert_eq!(clamp_max_mod_keys(5), 4);
        assert_eq!(clamp_max_mod_keys(-1), 4);
    }

    #[test]
    fn test_clamp_min_mod_keys() {
        assert_eq!(clamp_min_mod_keys(1, 4), 1);
        assert_eq!(clamp_min_mod_keys(3, 3), 3);
        assert_eq!(clamp_min_mod_keys(3, 2), 0);
        assert_eq!(clamp_min_mod_keys(-2, 4), 0);
    }

    #[test]
    fn test_compile_clamps_bounds() {
        let policy = ExclusionPolicy::compile(&PolicyOptions {
            min_mod_keys: 3,
            max_mod_keys: 2,
            ..options()
        });
        assert_eq!(policy.max_mod_keys(), 2);
        assert_eq!(policy.min_mod_keys(), 0);
    }

    #[test]
    fn test_excluded_mod_keys_normalized() {
        let policy = ExclusionPolicy::compile(&PolicyOptions {
            excluded_mod_keys: entry(&["ControlLeft", "OSRight", "KeyA"]),
            ..options()
        });
        assert!(policy.is_mod_excluded(ModifierName::Control));
        assert!(policy.is_mod_excluded(ModifierName::Meta));
        assert!(!policy.is_mod_excluded(ModifierName::Shift));
        assert_eq!(policy.excluded_mods().len(), 2);
    }

    #[test]
    fn test_excluded_keys_skip_modifiers() {
        let policy = ExclusionPolicy::compile(&PolicyOptions {
            excluded_keys: entry(&["KeyQ", "ShiftLeft"]),
            ..options()
        });
        assert!(policy.is_key_excluded(&Key::from("KeyQ")));
        assert!(!policy.is_key_excluded(&Key::from("ShiftLeft")));
        assert_eq!(policy.excluded_keys(), vec![&Key::from("KeyQ")]);
    }

    #[test]
    fn test_degenerate_policy_discards_excluded_mods() {
        let policy = ExclusionPolicy::compile(&PolicyOptions {
            excluded_mod_keys: entry(&["Control", "Shift", "Alt"]),
            min_mod_keys: 2,
            ..options()
        });
        assert!(policy.excluded_mods().is_empty());
        assert_eq!(policy.min_mod_keys(), 2);
    }

    #[test]
    fn test_satisfiable_policy_keeps_excluded_mods() {
        let policy = ExclusionPolicy::compile(&PolicyOptions {
            excluded_mod_keys: entry(&["Control", "Shift"]),
            min_mod_keys: 2,
            ..options()
        });
        assert_eq!(policy.excluded_mods().len(), 2);
    }

    #[test]
    fn test_excluded_shortcut_canonicalized() {
        let policy = ExclusionPolicy::compile(&PolicyOptions {
            excluded_shortcuts: vec![entry(&["Alt", "Control", "Space"])],
            ..options()
        });
        assert!(policy.is_shortcut_excluded("Control+Alt+Space"));
        assert!(!policy.is_shortcut_excluded("Alt+Control+Space"));
    }

    #[test]
    fn test_excluded_shortcut_left_right_variants_collapse() {
        let policy = ExclusionPolicy::compile(&PolicyOptions {
            excluded_shortcuts: vec![
                entry(&["ControlLeft", "KeyS"]),
                entry(&["ControlRight", "KeyS"]),
            ],
            ..options()
        });
        let keys: Vec<_> = policy.excluded_shortcuts().collect();
        assert_eq!(keys, vec!["Control+KeyS"]);
    }

    #[test]
    fn test_excluded_shortcut_filtering() {
        let policy = ExclusionPolicy::compile(&PolicyOptions {
            excluded_mod_keys: entry(&["Meta"]),
            excluded_keys: entry(&["KeyW"]),
            excluded_shortcuts: vec![
                entry(&["Meta", "KeyA"]),              // excluded modifier
                entry(&["Control", "KeyW"]),           // excluded key
                entry(&["Control", "Shift"]),          // no trigger
                entry(&["Control", "KeyA", "KeyB"]),   // two triggers
                entry(&["Control", "Shift", "Alt", "KeyZ"]), // too many modifiers
                entry(&["Control", "KeyC"]),           // kept
            ],
            max_mod_keys: 2,
            ..options()
        });
        let keys: Vec<_> = policy.excluded_shortcuts().collect();
        assert_eq!(keys, vec!["Control+KeyC"]);
    }

    #[test]
    fn test_excluded_shortcut_below_min_dropped() {
        let policy = ExclusionPolicy::compile(&PolicyOptions {
            excluded_shortcuts: vec![entry(&["KeyA"]), entry(&["Shift", "KeyA"])],
            min_mod_keys: 1,
            ..options()
        });
        let keys: Vec<_> = policy.excluded_shortcuts().collect();
        assert_eq!(keys, vec!["Shift+KeyA"]);
    }

    #[test]
    fn test_canonicalize_reasons() {
        let policy = ExclusionPolicy::compile(&PolicyOptions {
            excluded_mod_keys: entry(&["Alt"]),
            ..options()
        });
        assert_eq!(
            policy.canonicalize(&entry(&["AltLeft", "KeyA"])),
            Err(DroppedReason::ExcludedModifier)
        );
        assert_eq!(
            policy.canonicalize(&entry(&["Shift"])),
            Err(DroppedReason::MissingTrigger)
        );
        assert_eq!(
            policy.canonicalize(&entry(&["KeyA", "KeyB"])),
            Err(DroppedReason::MultipleTriggers)
        );
        assert_eq!(
            policy.canonicalize(&entry(&["ShiftRight", "KeyA"])),
            Ok("Shift+KeyA".to_string())
        );
    }
}
