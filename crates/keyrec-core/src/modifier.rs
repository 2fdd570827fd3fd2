// Keyrec Modifier System
// Canonical modifier names and the key classifier

use std::fmt;

use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{EnumCount as EnumCountMacro, EnumIter, IntoStaticStr};

use crate::Key;

/// Canonical, side-independent modifier identity.
///
/// Declaration order is the display priority: Control, Shift, Alt, Meta.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumIter,
    EnumCountMacro,
    IntoStaticStr,
)]
pub enum ModifierName {
    Control,
    Shift,
    Alt,
    Meta,
}

/// Number of distinct canonical modifiers
pub const MODIFIER_COUNT: usize = ModifierName::COUNT;

/// Normalization table from raw identifiers to canonical modifiers.
///
/// Covers left/right variants, the bare names, and the deprecated `OS*`
/// identifiers older browsers reported for the Meta keys. Lookups are
/// case-sensitive.
const MODIFIER_IDENTIFIERS: &[(&str, ModifierName)] = &[
    ("Control", ModifierName::Control),
    ("ControlLeft", ModifierName::Control),
    ("ControlRight", ModifierName::Control),
    ("Ctrl", ModifierName::Control),
    ("Shift", ModifierName::Shift),
    ("ShiftLeft", ModifierName::Shift),
    ("ShiftRight", ModifierName::Shift),
    ("Alt", ModifierName::Alt),
    ("AltLeft", ModifierName::Alt),
    ("AltRight", ModifierName::Alt),
    ("Option", ModifierName::Alt),
    ("Meta", ModifierName::Meta),
    ("MetaLeft", ModifierName::Meta),
    ("MetaRight", ModifierName::Meta),
    ("OS", ModifierName::Meta),
    ("OSLeft", ModifierName::Meta),
    ("OSRight", ModifierName::Meta),
    ("Cmd", ModifierName::Meta),
    ("Command", ModifierName::Meta),
    ("Super", ModifierName::Meta),
    ("Win", ModifierName::Meta),
];

impl ModifierName {
    /// Look up the canonical modifier for a raw identifier
    pub fn from_identifier(identifier: &str) -> Option<ModifierName> {
        MODIFIER_IDENTIFIERS
            .iter()
            .find(|(name, _)| *name == identifier)
            .map(|(_, modifier)| *modifier)
    }

    /// Canonical token used in shortcuts
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// All modifiers in priority order
    pub fn all() -> impl Iterator<Item = ModifierName> {
        ModifierName::iter()
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for ModifierName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying a key identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyClass {
    /// One of the four modifiers, already normalized
    Modifier(ModifierName),
    /// Anything else is a trigger candidate
    Trigger(Key),
}

/// Classify a key as modifier or trigger candidate.
///
/// Unrecognized identifiers are trigger candidates; there is no failure mode.
pub fn classify(key: &Key) -> KeyClass {
    match ModifierName::from_identifier(key.as_str()) {
        Some(modifier) => KeyClass::Modifier(modifier),
        None => KeyClass::Trigger(key.clone()),
    }
}

/// Set of canonical modifiers.
///
/// Stored as a bitmask so iteration always yields priority order no matter
/// how the modifiers were inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ModifierSet(u8);

impl ModifierSet {
    pub fn new() -> Self {
        ModifierSet(0)
    }

    /// Insert a modifier. Returns false if it was already present.
    pub fn insert(&mut self, modifier: ModifierName) -> bool {
        let added = !self.contains(modifier);
        self.0 |= modifier.bit();
        added
    }

    /// Remove a modifier. Returns false if it was not present.
    pub fn remove(&mut self, modifier: ModifierName) -> bool {
        let present = self.contains(modifier);
        self.0 &= !modifier.bit();
        present
    }

    pub fn contains(&self, modifier: ModifierName) -> bool {
        self.0 & modifier.bit() != 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    /// Iterate in priority order
    pub fn iter(&self) -> impl Iterator<Item = ModifierName> + '_ {
        ModifierName::iter().filter(move |m| self.contains(*m))
    }

    /// True if any modifier is present in both sets
    pub fn intersects(&self, other: &ModifierSet) -> bool {
        self.0 & other.0 != 0
    }

    /// First modifier (in priority order) also present in `other`
    pub fn first_shared(&self, other: &ModifierSet) -> Option<ModifierName> {
        self.iter().find(|m| other.contains(*m))
    }
}

impl FromIterator<ModifierName> for ModifierSet {
    fn from_iter<I: IntoIterator<Item = ModifierName>>(iter: I) -> Self {
        let mut set = ModifierSet::new();
        for modifier in iter {
            set.insert(modifier);
        }
        set
    }
}

impl Extend<ModifierName> for ModifierSet {
    fn extend<I: IntoIterator<Item = ModifierName>>(&mut self, iter: I) {
        for modifier in iter {
            self.insert(modifier);
        }
    }
}
