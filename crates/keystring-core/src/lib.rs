// Keystring Core Library
// Compiles escape text ("\COMMAND+s", "Hello\r") into ordered key press/release events

pub mod config;
pub mod event;
pub mod generator;
pub mod key;
pub mod keyboard;
pub mod layout;
pub mod lexer;
pub mod mapping;
pub mod modifier;

pub use event::{Action, KeyEvent};
pub use generator::{generate, EventGenerator, GenerationError};
pub use key::{key_from_name, key_name, Key};
pub use keyboard::{keyboard_events_for, Keyboard};
pub use layout::{builtin_layout, BuiltinLayout, LayoutCache, DEFAULT_LAYOUT};
pub use lexer::{lex, Body, Lexer, Token};
pub use mapping::{CharacterMap, KeyMapping, Mapping, NamedKeyMap};
pub use modifier::{ModifierKind, ModifierSet, NamedKeyError, NamedKeys};

#[cfg(feature = "toml-config")]
pub use config::{Config, ConfigError};
