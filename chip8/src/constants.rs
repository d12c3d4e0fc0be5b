//! Constant values of the Chip-8 architecture.

/// Number of general purpose registers.
pub const REGISTER_COUNT: usize = 0x10; // 16

/// Register used as the carry, borrow and collision flag.
pub const FLAG_REGISTER: usize = 0xF;

/// The lower memory space was historically used for the interpreter itself,
/// but is now used for fonts.
pub const MEM_START: usize = 0x200; // 512
pub const MEM_SIZE: usize = 0x1000; // 4096

/// Largest program that fits between `MEM_START` and the end of memory.
pub const MAX_PROGRAM_SIZE: usize = MEM_SIZE - MEM_START; // 3584

/// Addresses are 12 bits wide.
pub const ADDRESS_MASK: u16 = 0x0FFF;

/// Highest address the program counter may fetch from, since an
/// instruction occupies two bytes.
pub const PC_MAX: usize = MEM_SIZE - 2;

/// Levels of nesting allowed in the call stack.
///
/// The original RCA 1802 implementation allocated 48 bytes
/// for up to 12 levels of nesting. Most modern interpreters
/// settled on 16.
pub const STACK_SIZE: usize = 0x10;

pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;
pub const DISPLAY_BUFFER_SIZE: usize = DISPLAY_WIDTH * DISPLAY_HEIGHT;
pub const DISPLAY_WIDTH_MASK: usize = DISPLAY_WIDTH - 1;
pub const DISPLAY_HEIGHT_MASK: usize = DISPLAY_HEIGHT - 1;

/// Sprites are always 8 pixels wide, one byte per row.
pub const SPRITE_WIDTH: usize = 8;

/// Number of nanoseconds in a second
#[doc(hidden)]
pub const NANOS_IN_SECOND: u64 = 1_000_000_000;

/// Number of keys on the keyboard (0x0-0xF)
pub const KEY_COUNT: u8 = 16;

/// Address where the built-in font is loaded.
pub const FONTSET_START: u16 = 0x000;
/// Each glyph is 5 rows of 8 pixels.
pub const FONTSET_HEIGHT: usize = 5;
pub const FONTSET_DATA_LENGTH: usize = FONTSET_HEIGHT * KEY_COUNT as usize; // 80

/// Hexadecimal digits 0-F, drawn 4 pixels wide in the high nibble.
#[rustfmt::skip]
pub const FONTSET: [u8; FONTSET_DATA_LENGTH] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// Type for storing the 12-bit memory addresses.
pub type Address = u16;
