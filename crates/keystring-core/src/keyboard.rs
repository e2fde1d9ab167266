// Keystring Keyboard
// A character table paired with a named-key table: everything needed to turn text into events

use std::sync::{Arc, LazyLock};

use crate::generator::{generate, EventGenerator, GenerationError};
use crate::layout::{LayoutCache, DEFAULT_LAYOUT};
use crate::lexer::{lex, Token};
use crate::mapping::{CharacterMap, KeyMapping, Mapping, NamedKeyMap};
use crate::modifier::NamedKeys;
use crate::{Key, KeyEvent};

static SHARED_KEYBOARD: LazyLock<Arc<Keyboard>> = LazyLock::new(|| Arc::new(Keyboard::us()));

/// Immutable keyboard description handed to the event generator.
#[derive(Debug, Clone)]
pub struct Keyboard {
    characters: Arc<KeyMapping>,
    named_keys: Arc<NamedKeys>,
}

impl Keyboard {
    pub fn new(characters: Arc<KeyMapping>, named_keys: NamedKeys) -> Self {
        Self {
            characters,
            named_keys: Arc::new(named_keys),
        }
    }

    /// The US layout with the default named keys
    pub fn us() -> Self {
        let characters = LayoutCache::shared()
            .builtin(DEFAULT_LAYOUT)
            .unwrap_or_else(|| Arc::new(crate::layout::us_layout()));
        Self::new(characters, NamedKeys::with_defaults())
    }

    /// Process-wide default keyboard, built on first use
    pub fn shared() -> Arc<Keyboard> {
        Arc::clone(&SHARED_KEYBOARD)
    }

    pub fn characters(&self) -> &KeyMapping {
        &self.characters
    }

    pub fn named_keys(&self) -> &NamedKeys {
        &self.named_keys
    }

    /// Generator over this keyboard's tables
    pub fn generator(&self, tokens: Vec<Token>) -> EventGenerator<&KeyMapping, &NamedKeys> {
        EventGenerator::new(tokens, &*self.characters, &*self.named_keys)
    }

    /// Events for already-lexed tokens
    pub fn generate(&self, tokens: &[Token]) -> Result<Vec<KeyEvent>, GenerationError> {
        generate(tokens, &*self.characters, &*self.named_keys)
    }

    /// Lex and compile `input` in one step
    pub fn events_for(&self, input: &str) -> Result<Vec<KeyEvent>, GenerationError> {
        self.generator(lex(input)).into_events()
    }
}

impl Default for Keyboard {
    fn default() -> Self {
        Self::us()
    }
}

impl CharacterMap for Keyboard {
    fn resolve_character(&self, c: char) -> Option<Mapping> {
        self.characters.resolve_character(c)
    }
}

impl NamedKeyMap for Keyboard {
    fn resolve_named_key(&self, name: &str) -> Option<Key> {
        self.named_keys.resolve_named_key(name)
    }
}

/// Events for `input` on the shared default keyboard
pub fn keyboard_events_for(input: &str) -> Result<Vec<KeyEvent>, GenerationError> {
    SHARED_KEYBOARD.events_for(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_parse_empty_string() {
        assert_eq!(keyboard_events_for(""), Ok(vec![]));
    }

    #[test]
    fn test_events_for_regular_case() {
        let events = keyboard_events_for("cheezburger").unwrap();
        assert_eq!(events.len(), 22);
        assert!(events[0].is_pressed());
        assert!(!events[1].is_pressed());
    }

    #[test]
    fn test_shared_keyboard_is_reused() {
        assert!(Arc::ptr_eq(&Keyboard::shared(), &Keyboard::shared()));
    }

    #[test]
    fn test_us_keyboard_uses_cached_layout() {
        let a = Keyboard::us();
        let b = Keyboard::us();
        assert!(Arc::ptr_eq(&a.characters, &b.characters));
        assert!(!a.characters().is_empty());
        assert!(a.named_keys().contains("COMMAND"));
    }

    #[test]
    fn test_keyboard_is_a_lookup_table() {
        let keyboard = Keyboard::us();
        assert_eq!(keyboard.resolve_named_key("SHIFT"), Some(Key::SHIFT));
        assert!(keyboard.resolve_character('q').is_some());
        assert!(keyboard.resolve_character('☃').is_none());
    }

    #[test]
    fn test_generate_matches_events_for() {
        let keyboard = Keyboard::us();
        let input = "\\COMMAND+\\SHIFT+s done";
        assert_eq!(
            keyboard.generate(&lex(input)).unwrap(),
            keyboard.events_for(input).unwrap()
        );
    }
}
