//! IO device interface
use crate::display::DisplayBuffer;

/// Hooks for a host to present machine output.
///
/// Input flows the other way: the host pushes key events into the VM
/// with [`Chip8Vm::set_key`](crate::prelude::Chip8Vm::set_key).
pub trait Devices {
    /// Blit the display buffer to screen output.
    fn draw(&mut self, display: &DisplayBuffer);

    /// Turn the sound buzzer on or off.
    fn buzz(&mut self, state: bool);
}

/// One of the 16 keys of the COSMAC VIP hex keypad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize),
    serde(try_from = "u8")
)]
#[repr(u8)]
pub enum KeyCode {
    Key0 = 0,
    Key1,
    Key2,
    Key3,
    Key4,
    Key5,
    Key6,
    Key7,
    Key8,
    Key9,
    KeyA,
    KeyB,
    KeyC,
    KeyD,
    KeyE,
    KeyF = 0xF,
}

impl KeyCode {
    /// Every key, indexed by its value.
    pub const ALL: [KeyCode; 16] = [
        Self::Key0,
        Self::Key1,
        Self::Key2,
        Self::Key3,
        Self::Key4,
        Self::Key5,
        Self::Key6,
        Self::Key7,
        Self::Key8,
        Self::Key9,
        Self::KeyA,
        Self::KeyB,
        Self::KeyC,
        Self::KeyD,
        Self::KeyE,
        Self::KeyF,
    ];

    #[inline(always)]
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    /// Key addressed by the low nibble of a register value.
    #[inline(always)]
    pub fn from_nibble(value: u8) -> Self {
        Self::ALL[(value & 0xF) as usize]
    }
}

impl std::fmt::Display for KeyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let key_id = self.as_u8();
        write!(f, "k{key_id:x}")
    }
}

impl From<KeyCode> for u8 {
    fn from(keycode: KeyCode) -> Self {
        keycode.as_u8()
    }
}

impl TryFrom<u8> for KeyCode {
    type Error = InvalidKeyCode;

    fn try_from(key_id: u8) -> Result<Self, Self::Error> {
        Self::ALL.get(key_id as usize).copied().ok_or(InvalidKeyCode)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidKeyCode;

impl std::error::Error for InvalidKeyCode {}

impl std::fmt::Display for InvalidKeyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "keycode must be in range 0 <= keycode < 16")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_keycode_conversion() {
        for (i, key) in KeyCode::ALL.iter().enumerate() {
            assert_eq!(key.as_u8(), i as u8);
            assert_eq!(KeyCode::try_from(i as u8), Ok(*key));
        }
        assert_eq!(KeyCode::try_from(16), Err(InvalidKeyCode));
        assert_eq!(KeyCode::from_nibble(0x3B), KeyCode::KeyB);
        assert_eq!(KeyCode::KeyA.to_string(), "ka");
    }
}
