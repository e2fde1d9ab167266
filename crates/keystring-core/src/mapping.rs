// Keystring Mapping Tables
// Character -> (key, layout modifiers) lookup and the lookup traits the generator consumes

use std::collections::HashMap;
use std::fmt;

use crate::modifier::{ModifierKind, ModifierSet, NamedKeys};
use crate::Key;

/// How to produce one character on a layout: the key to tap and the
/// modifiers that must be held while tapping it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Mapping {
    pub key: Key,
    pub modifiers: ModifierSet,
}

impl Mapping {
    /// A character typed by the key alone
    pub fn plain(key: Key) -> Self {
        Self {
            key,
            modifiers: ModifierSet::new(),
        }
    }

    pub fn with_modifiers(key: Key, modifiers: impl IntoIterator<Item = ModifierKind>) -> Self {
        Self {
            key,
            modifiers: modifiers.into_iter().collect(),
        }
    }

    pub fn shifted(key: Key) -> Self {
        Self {
            key,
            modifiers: ModifierSet::shift(),
        }
    }

    pub fn optioned(key: Key) -> Self {
        Self {
            key,
            modifiers: ModifierSet::option(),
        }
    }

    /// Number of events needed to type this character
    pub fn event_count(&self) -> usize {
        2 + 2 * self.modifiers.len()
    }
}

impl fmt::Display for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.is_empty() {
            write!(f, "{}", self.key)
        } else {
            write!(f, "{}+{}", self.modifiers, self.key)
        }
    }
}

/// Resolves a literal character to the key and layout modifiers that type it.
pub trait CharacterMap {
    /// `None` when the character cannot be typed on this layout
    fn resolve_character(&self, c: char) -> Option<Mapping>;
}

/// Resolves an escape name (`COMMAND`, `SHIFT`, custom names) to a key.
pub trait NamedKeyMap {
    fn resolve_named_key(&self, name: &str) -> Option<Key>;
}

impl NamedKeyMap for NamedKeys {
    fn resolve_named_key(&self, name: &str) -> Option<Key> {
        self.get(name)
    }
}

impl<T: CharacterMap + ?Sized> CharacterMap for &T {
    fn resolve_character(&self, c: char) -> Option<Mapping> {
        (**self).resolve_character(c)
    }
}

impl<T: NamedKeyMap + ?Sized> NamedKeyMap for &T {
    fn resolve_named_key(&self, name: &str) -> Option<Key> {
        (**self).resolve_named_key(name)
    }
}

/// Immutable character table for one keyboard layout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyMapping {
    name: String,
    mappings: HashMap<char, Mapping>,
}

impl KeyMapping {
    /// Create a new KeyMapping
    pub fn new(name: impl Into<String>, mappings: HashMap<char, Mapping>) -> Self {
        Self {
            name: name.into(),
            mappings,
        }
    }

    /// Build a table from (character, mapping) pairs; later pairs win
    pub fn from_entries(
        name: impl Into<String>,
        entries: impl IntoIterator<Item = (char, Mapping)>,
    ) -> Self {
        Self::new(name, entries.into_iter().collect())
    }

    /// A copy of this table with `overrides` added on top
    pub fn extended(
        &self,
        name: impl Into<String>,
        overrides: impl IntoIterator<Item = (char, Mapping)>,
    ) -> Self {
        let mut mappings = self.mappings.clone();
        mappings.extend(overrides);
        Self::new(name, mappings)
    }

    /// Get the layout name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the mapping for a character
    pub fn get(&self, c: char) -> Option<&Mapping> {
        self.mappings.get(&c)
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

impl CharacterMap for KeyMapping {
    fn resolve_character(&self, c: char) -> Option<Mapping> {
        self.mappings.get(&c).cloned()
    }
}
