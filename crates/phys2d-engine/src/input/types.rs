use std::fmt;

/// Keyboard key identifier.
///
/// Only the keys the engine binds or tracks get their own variant. Everything
/// else is `Key::Unknown(u32)` carrying the platform code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,

    Shift,
    Control,
    Alt,
    Meta,

    /// Platform-dependent key not yet represented here.
    Unknown(u32),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyState {
    Pressed,
    Released,
}

/// Modifier keys state.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }
}

/// A single key transition delivered to a window's key callback.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct KeyEvent {
    pub key: Key,
    pub state: KeyState,
    /// Stable platform code when available (e.g. scancode).
    pub code: u32,
    /// True when the event is a key-repeat.
    pub repeat: bool,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key, state: KeyState) -> Self {
        Self {
            key,
            state,
            code: 0,
            repeat: false,
            modifiers: Modifiers::default(),
        }
    }

    /// True for the release edge of `key`.
    pub fn is_release_of(&self, key: Key) -> bool {
        self.key == key && self.state == KeyState::Released
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_of_matches_key_and_state() {
        assert!(KeyEvent::new(Key::Escape, KeyState::Released).is_release_of(Key::Escape));
        assert!(!KeyEvent::new(Key::Escape, KeyState::Pressed).is_release_of(Key::Escape));
        assert!(!KeyEvent::new(Key::Unknown(16), KeyState::Released).is_release_of(Key::Escape));
    }

    #[test]
    fn modifiers_any() {
        assert!(!Modifiers::default().any());
        assert!(Modifiers { ctrl: true, ..Default::default() }.any());
    }
}
