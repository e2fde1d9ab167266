// Keystring Key Type
// Represents a single macOS virtual key code

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// A physical key, identified by its macOS virtual key code.
///
/// The code names a position on the keyboard, not the character the active
/// layout puts there. Named constants (`Key::SHIFT`, `Key::KEY_1`, ...) are
/// generated from `keycodes.in`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Key(pub u16);

// Named constants, KEY_NAMES and KEY_ALIASES
include!(concat!(env!("OUT_DIR"), "/key_codes.rs"));

impl Key {
    pub fn code(self) -> u16 {
        self.0
    }

    /// Canonical name, or "UNKNOWN" for codes outside the table
    pub fn name(self) -> &'static str {
        key_name(self.0)
    }
}

impl From<u16> for Key {
    fn from(code: u16) -> Self {
        Key(code)
    }
}

impl From<Key> for u16 {
    fn from(key: Key) -> Self {
        key.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for Key {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        key_from_name(s).ok_or_else(|| format!("no key named {:?}", s))
    }
}

/// Display name for a key code
pub fn key_name(code: u16) -> &'static str {
    static NAMES_BY_CODE: OnceLock<Vec<&'static str>> = OnceLock::new();
    NAMES_BY_CODE
        .get_or_init(|| {
            let mut names = vec!["UNKNOWN"; 0x80];
            for &(code, name) in KEY_NAMES {
                names[code as usize] = name;
            }
            names
        })
        .get(code as usize)
        .copied()
        .unwrap_or("UNKNOWN")
}

/// Try to parse a key name to a key, ignoring case
pub fn key_from_name(name: &str) -> Option<Key> {
    let name_upper = name.to_uppercase();
    KEY_NAMES
        .iter()
        .map(|&(code, name)| (name, code))
        .chain(KEY_ALIASES.iter().copied())
        .find(|(candidate, _)| *candidate == name_upper)
        .map(|(_, code)| Key(code))
}
