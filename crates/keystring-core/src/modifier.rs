// Keystring Modifier System
// Layout modifiers (Shift, Option) and the table of named escape keys

use std::fmt;

use indexmap::IndexMap;
use smallvec::SmallVec;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::Key;

/// A physical modifier a keyboard layout needs held down to produce a
/// character.
///
/// Declaration order is the canonical press order: Shift goes down before
/// Option when a character needs both.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter, EnumString,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ModifierKind {
    Shift,
    #[strum(to_string = "option", serialize = "alt")]
    Option,
}

impl ModifierKind {
    /// The physical key pressed for this modifier (the left-hand variant)
    pub fn key(self) -> Key {
        match self {
            ModifierKind::Shift => Key::SHIFT,
            ModifierKind::Option => Key::OPTION,
        }
    }
}

/// Canonically ordered set of layout modifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ModifierSet {
    kinds: SmallVec<[ModifierKind; 2]>,
}

impl ModifierSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shift() -> Self {
        Self::from_iter([ModifierKind::Shift])
    }

    pub fn option() -> Self {
        Self::from_iter([ModifierKind::Option])
    }

    pub fn shift_option() -> Self {
        Self::from_iter([ModifierKind::Shift, ModifierKind::Option])
    }

    pub fn insert(&mut self, kind: ModifierKind) {
        if let Err(pos) = self.kinds.binary_search(&kind) {
            self.kinds.insert(pos, kind);
        }
    }

    pub fn contains(&self, kind: ModifierKind) -> bool {
        self.kinds.contains(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Modifiers in press order
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = ModifierKind> + '_ {
        self.kinds.iter().copied()
    }

    /// Physical keys in press order
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = Key> + '_ {
        self.iter().map(ModifierKind::key)
    }
}

impl FromIterator<ModifierKind> for ModifierSet {
    fn from_iter<I: IntoIterator<Item = ModifierKind>>(iter: I) -> Self {
        let mut set = Self::new();
        for kind in iter {
            set.insert(kind);
        }
        set
    }
}

impl fmt::Display for ModifierSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|m| m.to_string()).collect();
        write!(f, "{}", parts.join("+"))
    }
}

/// Errors that can occur when extending the named key table
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NamedKeyError {
    #[error("named key '{0}' already exists")]
    NameExists(String),

    #[error("invalid escape name '{0}': names are one or more uppercase ASCII letters")]
    InvalidName(String),
}

/// Returns true if `name` can appear after a backslash in escape text
pub fn is_valid_escape_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_uppercase())
}

/// Table of escape names (`\COMMAND`, `\ESCAPE`, ...) and the key each one
/// presses.
///
/// Built once and then only read; entries keep their insertion order so
/// listings are stable.
#[derive(Debug, Clone)]
pub struct NamedKeys {
    by_name: IndexMap<String, Key>,
}

impl NamedKeys {
    /// An empty table
    pub fn empty() -> Self {
        Self {
            by_name: IndexMap::new(),
        }
    }

    /// The standard modifier and navigation key names
    pub fn with_defaults() -> Self {
        let mut table = Self::empty();
        table.add_internal(&["COMMAND", "CMD"], Key::COMMAND);
        table.add_internal(&["SHIFT"], Key::SHIFT);
        table.add_internal(&["CONTROL", "CTRL"], Key::CONTROL);
        table.add_internal(&["OPTION", "ALT"], Key::OPTION);
        table.add_internal(&["FUNCTION", "FN"], Key::FUNCTION);
        table.add_internal(&["CAPSLOCK", "CAPS"], Key::CAPSLOCK);
        table.add_internal(&["RSHIFT"], Key::RIGHT_SHIFT);
        table.add_internal(&["RCONTROL", "RCTRL"], Key::RIGHT_CONTROL);
        table.add_internal(&["ROPTION", "RALT"], Key::RIGHT_OPTION);
        table.add_internal(&["ESCAPE", "ESC"], Key::ESCAPE);
        table.add_internal(&["RETURN", "ENTER"], Key::RETURN);
        table.add_internal(&["TAB"], Key::TAB);
        table.add_internal(&["SPACE"], Key::SPACE);
        table.add_internal(&["DELETE", "BACKSPACE"], Key::DELETE);
        table.add_internal(&["FORWARDDELETE"], Key::FORWARD_DELETE);
        table.add_internal(&["HOME"], Key::HOME);
        table.add_internal(&["END"], Key::END);
        table.add_internal(&["PAGEUP"], Key::PAGE_UP);
        table.add_internal(&["PAGEDOWN"], Key::PAGE_DOWN);
        table.add_internal(&["LEFT"], Key::LEFT);
        table.add_internal(&["RIGHT"], Key::RIGHT);
        table.add_internal(&["DOWN"], Key::DOWN);
        table.add_internal(&["UP"], Key::UP);
        table.add_internal(&["HELP"], Key::HELP);
        table.add_internal(&["VOLUMEUP"], Key::VOLUME_UP);
        table.add_internal(&["VOLUMEDOWN"], Key::VOLUME_DOWN);
        table.add_internal(&["MUTE"], Key::MUTE);
        table
    }

    fn add_internal(&mut self, names: &[&str], key: Key) {
        for name in names {
            self.by_name.insert(name.to_string(), key);
        }
    }

    /// Register a custom escape name
    pub fn add(&mut self, name: &str, key: Key) -> Result<(), NamedKeyError> {
        if !is_valid_escape_name(name) {
            return Err(NamedKeyError::InvalidName(name.to_string()));
        }
        if self.by_name.contains_key(name) {
            return Err(NamedKeyError::NameExists(name.to_string()));
        }
        self.by_name.insert(name.to_string(), key);
        Ok(())
    }

    /// Look up the key for an escape name
    pub fn get(&self, name: &str) -> Option<Key> {
        self.by_name.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// All names with their keys, in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, Key)> {
        self.by_name.iter().map(|(name, key)| (name.as_str(), *key))
    }
}

impl Default for NamedKeys {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// All layout modifier kinds in canonical press order
pub fn modifier_kinds() -> impl Iterator<Item = ModifierKind> {
    ModifierKind::iter()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_modifier_kind_keys() {
        assert_eq!(ModifierKind::Shift.key(), Key::from(56));
        assert_eq!(ModifierKind::Option.key(), Key::from(58));
    }

    #[test]
    fn test_modifier_kind_parsing() {
        assert_eq!(ModifierKind::from_str("shift"), Ok(ModifierKind::Shift));
        assert_eq!(ModifierKind::from_str("Option"), Ok(ModifierKind::Option));
        assert_eq!(ModifierKind::from_str("ALT"), Ok(ModifierKind::Option));
        assert!(ModifierKind::from_str("command").is_err());
    }

    #[test]
    fn test_canonical_order() {
        let kinds: Vec<_> = modifier_kinds().collect();
        assert_eq!(kinds, vec![ModifierKind::Shift, ModifierKind::Option]);
    }

    #[test]
    fn test_modifier_set_keeps_press_order() {
        let set: ModifierSet = [ModifierKind::Option, ModifierKind::Shift, ModifierKind::Option]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 2);
        assert_eq!(set, ModifierSet::shift_option());
        let keys: Vec<_> = set.keys().collect();
        assert_eq!(keys, vec![Key::SHIFT, Key::OPTION]);
        assert_eq!(set.to_string(), "shift+option");
    }

    #[test]
    fn test_default_named_keys() {
        let table = NamedKeys::with_defaults();
        assert_eq!(table.get("COMMAND"), Some(Key::from(0x37)));
        assert_eq!(table.get("CMD"), Some(Key::from(0x37)));
        assert_eq!(table.get("CTRL"), Some(Key::from(0x3B)));
        assert_eq!(table.get("SHIFT"), Some(Key::from(0x38)));
        assert_eq!(table.get("OPTION"), Some(Key::from(0x3A)));
        assert_eq!(table.get("RIGHT"), Some(Key::from(0x7C)));
        assert_eq!(table.get("HMM"), None);
        assert_eq!(table.iter().next(), Some(("COMMAND", Key::COMMAND)));
    }

    #[test]
    fn test_add_custom_name() {
        let mut table = NamedKeys::with_defaults();
        table.add("HYPER", Key::from(0x4F)).unwrap();
        assert_eq!(table.get("HYPER"), Some(Key::from(0x4F)));
    }

    #[test]
    fn test_add_rejects_duplicates_and_bad_names() {
        let mut table = NamedKeys::with_defaults();
        assert_eq!(
            table.add("COMMAND", Key::from(1)),
            Err(NamedKeyError::NameExists("COMMAND".to_string()))
        );
        assert!(matches!(
            table.add("Hyper", Key::from(1)),
            Err(NamedKeyError::InvalidName(_))
        ));
        assert!(matches!(table.add("", Key::from(1)), Err(NamedKeyError::InvalidName(_))));
        assert!(matches!(table.add("F13", Key::from(1)), Err(NamedKeyError::InvalidName(_))));
    }
}
