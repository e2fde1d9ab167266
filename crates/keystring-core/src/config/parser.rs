// Keystring Config Parser - TOML with Serde
// Loads the base layout, character overrides and custom named keys

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use serde::Deserialize;

use crate::layout::{BuiltinLayout, LayoutCache, DEFAULT_LAYOUT};
use crate::mapping::Mapping;
use crate::modifier::{is_valid_escape_name, ModifierKind, NamedKeyError, NamedKeys};
use crate::{key_from_name, Key, Keyboard};

/// Configuration parser errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("Unknown layout: {0}")]
    UnknownLayout(String),

    #[error("Invalid character entry: {0:?} (expected exactly one character)")]
    InvalidCharacter(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Invalid modifier: {0}")]
    InvalidModifier(String),

    #[error("Invalid named key: {0}")]
    InvalidKeyName(#[from] NamedKeyError),
}

/// Main configuration structure (root TOML table)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigToml {
    /// Base layout selection
    #[serde(default)]
    pub layout: Option<LayoutConfig>,

    /// Extra or replacement character mappings
    #[serde(default)]
    pub characters: BTreeMap<String, CharacterEntry>,

    /// Custom escape names
    #[serde(default)]
    pub named_keys: BTreeMap<String, KeySpec>,
}

/// `[layout]` table
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayoutConfig {
    /// Built-in layout id
    pub base: Option<String>,
}

/// One `[characters]` entry
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CharacterEntry {
    pub key: KeySpec,

    #[serde(default)]
    pub modifiers: Vec<String>,
}

/// A key written either as its code or its name
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum KeySpec {
    Code(u16),
    Name(String),
}

impl KeySpec {
    pub fn resolve(&self) -> Result<Key, ConfigError> {
        match self {
            KeySpec::Code(code) => Ok(Key::from(*code)),
            KeySpec::Name(name) => {
                key_from_name(name).ok_or_else(|| ConfigError::InvalidKey(name.clone()))
            }
        }
    }
}

/// Validated configuration
#[derive(Debug, Clone)]
pub struct Config {
    layout: BuiltinLayout,
    characters: Vec<(char, Mapping)>,
    named_keys: Vec<(String, Key)>,
    source_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            layout: BuiltinLayout::Us,
            characters: Vec::new(),
            named_keys: Vec::new(),
            source_path: None,
        }
    }
}

impl Config {
    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let raw: ConfigToml =
            toml::from_str(content).map_err(|e| ConfigError::TomlParse(e.to_string()))?;
        Self::from_raw(raw)
    }

    /// Load configuration from a TOML file
    pub fn from_toml_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(&path)?;
        let mut config = Self::from_toml(&content)?;
        config.source_path = Some(path.as_ref().to_path_buf());
        log::debug!("loaded config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Default config location (~/.config/keystring/config.toml)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("keystring").join("config.toml"))
    }

    /// Load from the default location, or the defaults if there is no file
    pub fn load_default() -> Result<Self, ConfigError> {
        if let Some(path) = Self::default_path() {
            if path.exists() {
                return Self::from_toml_path(path);
            }
        }
        log::debug!("no config file, using defaults");
        Ok(Self::default())
    }

    fn from_raw(raw: ConfigToml) -> Result<Self, ConfigError> {
        let base = raw
            .layout
            .and_then(|layout| layout.base)
            .unwrap_or_else(|| DEFAULT_LAYOUT.to_string());
        let layout =
            BuiltinLayout::from_id(&base).ok_or_else(|| ConfigError::UnknownLayout(base.clone()))?;

        let mut characters = Vec::with_capacity(raw.characters.len());
        for (text, entry) in raw.characters {
            let c = single_char(&text)?;
            let key = entry.key.resolve()?;
            let modifiers = entry
                .modifiers
                .iter()
                .map(|m| {
                    ModifierKind::from_str(m).map_err(|_| ConfigError::InvalidModifier(m.clone()))
                })
                .collect::<Result<Vec<_>, _>>()?;
            characters.push((c, Mapping::with_modifiers(key, modifiers)));
        }

        let mut named_keys = Vec::with_capacity(raw.named_keys.len());
        for (name, spec) in raw.named_keys {
            if !is_valid_escape_name(&name) {
                return Err(NamedKeyError::InvalidName(name).into());
            }
            let key = spec.resolve()?;
            named_keys.push((name, key));
        }

        Ok(Self {
            layout,
            characters,
            named_keys,
            source_path: None,
        })
    }

    /// Selected base layout
    pub fn layout(&self) -> BuiltinLayout {
        self.layout
    }

    /// Character overrides, in file order
    pub fn characters(&self) -> &[(char, Mapping)] {
        &self.characters
    }

    /// Custom named keys
    pub fn named_keys(&self) -> &[(String, Key)] {
        &self.named_keys
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    /// Build the keyboard this configuration describes
    pub fn to_keyboard(&self) -> Result<Keyboard, ConfigError> {
        self.to_keyboard_with(LayoutCache::shared())
    }

    /// Same as [`Config::to_keyboard`], using the given layout cache
    pub fn to_keyboard_with(&self, cache: &LayoutCache) -> Result<Keyboard, ConfigError> {
        let layout = self.layout;
        let base = cache.get_or_build(layout.id(), || layout.build());
        let characters = if self.characters.is_empty() {
            base
        } else {
            let name = format!("{}+custom", base.name());
            Arc::new(base.extended(name, self.characters.iter().cloned()))
        };

        let mut named_keys = NamedKeys::with_defaults();
        for (name, key) in &self.named_keys {
            named_keys.add(name, *key)?;
        }

        log::debug!(
            "keyboard: layout '{}' ({} characters, {} overrides), {} named keys",
            characters.name(),
            characters.len(),
            self.characters.len(),
            named_keys.len()
        );
        Ok(Keyboard::new(characters, named_keys))
    }
}

fn single_char(text: &str) -> Result<char, ConfigError> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(ConfigError::InvalidCharacter(text.to_string())),
    }
}

/// Starter configuration written for new installations
pub fn default_config_content() -> &'static str {
    r#"# Keystring configuration
# Place this file at: ~/.config/keystring/config.toml

[layout]
# Built-in layout: "us" (aliases: "us-ansi", "abc")
base = "us"

[characters]
# Extra characters, or replacements for the layout's own entries.
# key is a key code or key name; modifiers are "shift" and/or "option".
# "§" = { key = "SECTION" }

[named_keys]
# Custom escape names usable as \NAME or \NAME+...
# HYPER = "F18"
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::CharacterMap;
    use crate::modifier::ModifierSet;

    #[test]
    fn test_empty_config_is_default() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.layout(), BuiltinLayout::Us);
        assert!(config.characters().is_empty());
        assert!(config.named_keys().is_empty());
    }

    #[test]
    fn test_default_content_parses() {
        let config = Config::from_toml(default_config_content()).unwrap();
        assert_eq!(config.layout(), BuiltinLayout::Us);
    }

    #[test]
    fn test_characters_and_named_keys() {
        let toml = r#"
[layout]
base = "abc"

[characters]
"☃" = { key = 0x0A, modifiers = ["Shift", "alt"] }
"§" = { key = "SECTION" }

[named_keys]
HYPER = "F18"
SNOWMAN = 64
"#;
        let config = Config::from_toml(toml).unwrap();
        let keyboard = config.to_keyboard_with(&LayoutCache::new()).unwrap();

        let snowman = keyboard.characters().get('☃').unwrap();
        assert_eq!(snowman.key, Key::from(0x0A));
        assert_eq!(snowman.modifiers, ModifierSet::shift_option());
        assert_eq!(keyboard.resolve_character('§'), Some(Mapping::plain(Key::from(0x0A))));

        assert_eq!(keyboard.named_keys().get("HYPER"), Some(Key::from(0x4F)));
        assert_eq!(keyboard.named_keys().get("SNOWMAN"), Some(Key::from(0x40)));
        assert_eq!(keyboard.events_for("☃").unwrap().len(), 6);
    }

    #[test]
    fn test_overrides_leave_cached_base_untouched() {
        let cache = LayoutCache::new();
        let config = Config::from_toml("[characters]\n\"a\" = { key = 11 }\n").unwrap();
        let keyboard = config.to_keyboard_with(&cache).unwrap();
        assert_eq!(keyboard.characters().get('a').unwrap().key, Key::from(11));
        assert_eq!(keyboard.characters().name(), "us+custom");

        let base = cache.builtin("us").unwrap();
        assert_eq!(base.get('a').unwrap().key, Key::from(0));
    }

    #[test]
    fn test_unknown_layout() {
        let result = Config::from_toml("[layout]\nbase = \"dvorak\"\n");
        assert!(matches!(result, Err(ConfigError::UnknownLayout(name)) if name == "dvorak"));
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let result = Config::from_toml("[general]\nfoo = 1\n");
        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn test_multi_char_entry_rejected() {
        let result = Config::from_toml("[characters]\n\"ab\" = { key = 0 }\n");
        assert!(matches!(result, Err(ConfigError::InvalidCharacter(_))));
    }

    #[test]
    fn test_bad_key_and_modifier() {
        let result = Config::from_toml("[characters]\n\"x\" = { key = \"NOPE\" }\n");
        assert!(matches!(result, Err(ConfigError::InvalidKey(_))));

        let result =
            Config::from_toml("[characters]\n\"x\" = { key = 7, modifiers = [\"command\"] }\n");
        assert!(matches!(result, Err(ConfigError::InvalidModifier(m)) if m == "command"));
    }

    #[test]
    fn test_bad_named_keys() {
        let result = Config::from_toml("[named_keys]\nHyper = 1\n");
        assert!(matches!(
            result,
            Err(ConfigError::InvalidKeyName(NamedKeyError::InvalidName(_)))
        ));

        let config = Config::from_toml("[named_keys]\nCOMMAND = 1\n").unwrap();
        assert!(matches!(
            config.to_keyboard_with(&LayoutCache::new()),
            Err(ConfigError::InvalidKeyName(NamedKeyError::NameExists(_)))
        ));
    }

    #[test]
    fn test_from_missing_path() {
        let result = Config::from_toml_path("/nonexistent/keystring/config.toml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
