// Keystring Key Events
// A single press or release of one physical key

use std::fmt;

use crate::Key;

/// Direction of a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Press,
    Release,
}

impl Action {
    /// Returns true if this is a PRESS event
    pub fn is_pressed(self) -> bool {
        matches!(self, Action::Press)
    }

    /// Returns true if this is a RELEASE event
    pub fn is_released(self) -> bool {
        matches!(self, Action::Release)
    }

    /// Build an Action from a "key is down" flag
    pub fn from_pressed(pressed: bool) -> Self {
        if pressed {
            Action::Press
        } else {
            Action::Release
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Action::Press => "press",
            Action::Release => "release",
        })
    }
}

/// A synthesized keyboard event, ready to be handed to a dispatcher.
///
/// Sequences of events are ordered: every press is followed later by the
/// matching release, and modifiers pressed first are released last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub key: Key,
    pub action: Action,
}

impl KeyEvent {
    pub fn new(key: Key, pressed: bool) -> Self {
        Self {
            key,
            action: Action::from_pressed(pressed),
        }
    }

    pub fn press(key: Key) -> Self {
        Self {
            key,
            action: Action::Press,
        }
    }

    pub fn release(key: Key) -> Self {
        Self {
            key,
            action: Action::Release,
        }
    }

    /// Key code of the event
    pub fn code(&self) -> u16 {
        self.key.code()
    }

    pub fn is_pressed(&self) -> bool {
        self.action.is_pressed()
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<7} {:#04x} {}", self.action, self.key.code(), self.key)
    }
}
