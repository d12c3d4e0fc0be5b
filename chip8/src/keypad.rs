//! Keyboard input latch.
use crate::{constants::KEY_COUNT, devices::KeyCode};

/// Pressed state of the 16 hex keys. Pressed is a 1 bit, released is a 0 bit.
///
/// Written by the host's event source, read by the interpreter.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Keypad(u16);

impl Keypad {
    pub fn new() -> Self {
        Default::default()
    }

    /// Record a key state.
    ///
    /// Returns `true` if this was a key down edge, meaning the key was
    /// previously released.
    pub fn set(&mut self, key: KeyCode, pressed: bool) -> bool {
        let mask = 1 << key.as_u8();
        let was_pressed = self.0 & mask != 0;

        if pressed {
            self.0 |= mask;
        } else {
            self.0 &= !mask;
        }

        pressed && !was_pressed
    }

    #[inline(always)]
    pub fn is_pressed(&self, key: KeyCode) -> bool {
        self.0 & (1 << key.as_u8()) != 0
    }

    /// Check whether any key is pressed down.
    #[inline(always)]
    pub fn any(&self) -> bool {
        self.0 != 0
    }

    /// Set all keys to up.
    #[inline(always)]
    pub fn clear(&mut self) {
        self.0 = 0;
    }

    /// Iterate over the keys that are currently pressed.
    pub fn pressed(&self) -> impl Iterator<Item = KeyCode> + '_ {
        (0..KEY_COUNT)
            .filter_map(|k| KeyCode::try_from(k).ok())
            .filter(|k| self.is_pressed(*k))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_key_state() {
        let mut keys = Keypad::default();

        keys.set(KeyCode::Key0, true);
        assert_eq!(keys, Keypad(0b00000000_00000001));
        assert!(keys.is_pressed(KeyCode::Key0));
        assert!(!keys.is_pressed(KeyCode::Key1));
        assert!(!keys.is_pressed(KeyCode::Key7));

        keys.set(KeyCode::Key7, true);
        assert!(keys.is_pressed(KeyCode::Key0));
        assert!(keys.is_pressed(KeyCode::Key7));

        keys.set(KeyCode::Key0, false);
        assert!(!keys.is_pressed(KeyCode::Key0));
        assert!(keys.is_pressed(KeyCode::Key7));

        keys.set(KeyCode::KeyF, true);
        assert_eq!(keys, Keypad(0b10000000_10000000));
        assert!(keys.is_pressed(KeyCode::KeyF));
        assert_eq!(
            keys.pressed().collect::<Vec<_>>(),
            vec![KeyCode::Key7, KeyCode::KeyF]
        );
    }

    #[test]
    fn test_key_down_edge() {
        let mut keys = Keypad::default();
        assert!(keys.set(KeyCode::Key5, true));
        // held down, not a new press
        assert!(!keys.set(KeyCode::Key5, true));
        assert!(!keys.set(KeyCode::Key5, false));
        assert!(keys.set(KeyCode::Key5, true));
    }

    #[test]
    fn test_clear() {
        let mut keys = Keypad::default();
        keys.set(KeyCode::KeyC, true);
        keys.clear();
        assert!(!keys.any());
        assert_eq!(keys.pressed().count(), 0);
    }
}
