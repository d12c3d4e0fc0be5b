//! Helpers for extracting data from opcodes.

/// Operand fields of a single 16-bit instruction.
///
/// ```text
/// 0xDXYN
///   |||+- n    lowest nibble, sprite height or sub-opcode
///   ||+-- y    register VY
///   |+--- x    register VX
///   +---- op   instruction family
///
/// kk  = low byte (0x00FF)
/// nnn = low 12 bits (0x0FFF)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operands {
    pub op: u8,
    pub x: u8,
    pub y: u8,
    pub n: u8,
    pub kk: u8,
    pub nnn: u16,
}

impl Operands {
    #[inline(always)]
    pub fn from_word(word: u16) -> Self {
        let [a, b] = word.to_be_bytes();
        Self {
            op: a >> 4,          // 0xF000
            x: a & 0xF,          // 0x0F00
            y: b >> 4,           // 0x00F0
            n: b & 0xF,          // 0x000F
            kk: b,               // 0x00FF
            nnn: word & 0x0FFF,  // 0x0FFF
        }
    }
}

/// Read the big-endian instruction word starting at `cursor`.
///
/// Returns `None` when fewer than two bytes remain.
#[inline]
pub fn fetch_word(bytecode: &[u8], cursor: usize) -> Option<u16> {
    match bytecode.get(cursor..cursor.checked_add(2)?)? {
        &[a, b] => Some(u16::from_be_bytes([a, b])),
        _ => None,
    }
}
