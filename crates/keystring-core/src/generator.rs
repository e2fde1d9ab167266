// Keystring Event Generator
// Walks a token tree and emits ordered press/release events

use std::sync::OnceLock;

use crate::lexer::Token;
use crate::mapping::{CharacterMap, Mapping, NamedKeyMap};
use crate::{Key, KeyEvent};

/// Errors that abort event generation. No partial event list is kept.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("no key on the current layout types {0:?}")]
    UnmappedCharacter(char),

    #[error("unknown named key '\\{0}'")]
    UnknownModifier(String),
}

/// Turns tokens into key events against a character table and a named-key
/// table.
///
/// The result is computed on the first [`EventGenerator::generate`] call and
/// returned unchanged afterwards.
#[derive(Debug)]
pub struct EventGenerator<C, N> {
    tokens: Vec<Token>,
    characters: C,
    named_keys: N,
    events: OnceLock<Result<Vec<KeyEvent>, GenerationError>>,
}

impl<C: CharacterMap, N: NamedKeyMap> EventGenerator<C, N> {
    pub fn new(tokens: Vec<Token>, characters: C, named_keys: N) -> Self {
        Self {
            tokens,
            characters,
            named_keys,
            events: OnceLock::new(),
        }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Events for the whole token sequence
    pub fn generate(&self) -> Result<&[KeyEvent], GenerationError> {
        self.events
            .get_or_init(|| self.compile())
            .as_deref()
            .map_err(Clone::clone)
    }

    /// Take ownership of the generated events
    pub fn into_events(self) -> Result<Vec<KeyEvent>, GenerationError> {
        let _ = self.generate();
        self.events
            .into_inner()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    fn compile(&self) -> Result<Vec<KeyEvent>, GenerationError> {
        compile(&self.tokens, &self.characters, &self.named_keys)
    }
}

/// Walks the token tree with an explicit stack of held named keys.
fn compile<C, N>(tokens: &[Token], characters: &C, named_keys: &N) -> Result<Vec<KeyEvent>, GenerationError>
where
    C: CharacterMap,
    N: NamedKeyMap,
{
    let mut events = Vec::with_capacity(tokens.len() * 2);
    // Named key held down (none at the top level) and the tokens left to type under it
    let mut frames: Vec<(Option<Key>, std::slice::Iter<'_, Token>)> = vec![(None, tokens.iter())];

    while let Some((held, remaining)) = frames.last_mut() {
        let Some(token) = remaining.next() else {
            if let Some(key) = *held {
                events.push(KeyEvent::release(key));
            }
            frames.pop();
            continue;
        };

        match token {
            Token::Literal(c) => {
                let mapping = characters
                    .resolve_character(*c)
                    .ok_or(GenerationError::UnmappedCharacter(*c))?;
                log::trace!("{:?} -> {}", c, mapping);
                emit_character(&mapping, &mut events);
            }
            // A missing or empty body is a plain tap
            Token::Modifier { name, body } => {
                let key = named_keys
                    .resolve_named_key(name)
                    .ok_or_else(|| GenerationError::UnknownModifier(name.clone()))?;
                log::trace!("\\{} -> {}", name, key);
                events.push(KeyEvent::press(key));
                frames.push((Some(key), body.tokens().iter()));
            }
        }
    }

    log::debug!("generated {} key events from {} tokens", events.len(), tokens.len());
    Ok(events)
}

/// Modifiers down in canonical order, tap the key, modifiers up in reverse
fn emit_character(mapping: &Mapping, events: &mut Vec<KeyEvent>) {
    events.reserve(mapping.event_count());
    events.extend(mapping.modifiers.keys().map(KeyEvent::press));
    events.push(KeyEvent::press(mapping.key));
    events.push(KeyEvent::release(mapping.key));
    events.extend(mapping.modifiers.keys().rev().map(KeyEvent::release));
}

/// Generate events for `tokens` in one shot
pub fn generate<C, N>(tokens: &[Token], characters: C, named_keys: N) -> Result<Vec<KeyEvent>, GenerationError>
where
    C: CharacterMap,
    N: NamedKeyMap,
{
    compile(tokens, &characters, &named_keys)
}
