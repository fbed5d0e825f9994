//! Keyboard state and its resolution into movement input.
//!
//! The host reports key-down and key-up events into a [`KeyMap`]; the
//! physics step reads it once per frame.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Keys the game reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    W,
    A,
    S,
    D,
    Up,
    Down,
    Left,
    Right,
    Shift,
    Space,
}

impl Key {
    /// Map a typed character to a key, ignoring case.
    #[must_use]
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'w' => Some(Key::W),
            'a' => Some(Key::A),
            's' => Some(Key::S),
            'd' => Some(Key::D),
            ' ' => Some(Key::Space),
            _ => None,
        }
    }
}

/// Pressed state per key. Keys never reported are up.
#[derive(Debug, Clone, Default)]
pub struct KeyMap {
    keys: HashMap<Key, bool>,
}

impl KeyMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: Key) {
        self.keys.insert(key, true);
    }

    pub fn release(&mut self, key: Key) {
        self.keys.insert(key, false);
    }

    #[must_use]
    pub fn is_down(&self, key: Key) -> bool {
        self.keys.get(&key).copied().unwrap_or(false)
    }

    fn either(&self, a: Key, b: Key) -> bool {
        self.is_down(a) || self.is_down(b)
    }

    /// Horizontal input in `-2..=2`: right is positive, shift doubles it.
    #[must_use]
    pub fn horizontal(&self) -> i32 {
        let mut output = 0;
        if self.either(Key::D, Key::Right) {
            output += 1;
        }
        if self.either(Key::A, Key::Left) {
            output -= 1;
        }
        if self.is_down(Key::Shift) {
            output *= 2;
        }
        output
    }

    /// Vertical input in `-1..=1`: down is positive.
    #[must_use]
    pub fn vertical(&self) -> i32 {
        let mut output = 0;
        if self.either(Key::S, Key::Down) {
            output += 1;
        }
        if self.either(Key::W, Key::Up) {
            output -= 1;
        }
        output
    }

    #[must_use]
    pub fn jump(&self) -> bool {
        self.is_down(Key::Space)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreported_keys_are_up() {
        let keys = KeyMap::new();
        assert!(!keys.is_down(Key::W));
        assert_eq!(keys.horizontal(), 0);
        assert!(!keys.jump());
    }

    #[test]
    fn test_horizontal_with_shift() {
        let mut keys = KeyMap::new();
        keys.press(Key::D);
        assert_eq!(keys.horizontal(), 1);
        keys.press(Key::Shift);
        assert_eq!(keys.horizontal(), 2);
        keys.release(Key::D);
        keys.press(Key::Left);
        assert_eq!(keys.horizontal(), -2);
        keys.press(Key::Right);
        assert_eq!(keys.horizontal(), 0);
    }

    #[test]
    fn test_vertical() {
        let mut keys = KeyMap::new();
        keys.press(Key::W);
        assert_eq!(keys.vertical(), -1);
        keys.press(Key::Shift);
        assert_eq!(keys.vertical(), -1);
        keys.press(Key::Down);
        assert_eq!(keys.vertical(), 0);
    }

    #[test]
    fn test_from_char() {
        assert_eq!(Key::from_char('D'), Some(Key::D));
        assert_eq!(Key::from_char(' '), Some(Key::Space));
        assert_eq!(Key::from_char('q'), None);
    }
}
