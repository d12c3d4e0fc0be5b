//! Result and errors.
use std::fmt::{self, Display, Formatter};

use crate::constants::{Address, FONTSET_DATA_LENGTH, MAX_PROGRAM_SIZE};

pub type Chip8Result<T> = std::result::Result<T, Chip8Error>;

#[derive(Debug)]
pub enum Chip8Error {
    /// Machine fault raised by the instruction at the current program counter.
    ///
    /// The VM is halted and must be reset or reloaded before stepping again.
    Fault(Fault),
    /// Attempt to step a VM that was halted by an earlier fault.
    Halted(Fault),
    /// Attempt to load a bytecode program that can't fit in memory.
    LargeProgram { size: usize },
    /// Font data of the wrong size.
    Font { size: usize },
    /// Reading program data from the host failed.
    Io(std::io::Error),
    Fmt(fmt::Error),
}

impl Chip8Error {
    /// Whether the error leaves the machine unable to continue.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fault(_) | Self::Halted(_))
    }
}

impl Display for Chip8Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fault(fault) => write!(f, "runtime error: {fault}"),
            Self::Halted(fault) => write!(f, "machine is halted: {fault}"),
            Self::LargeProgram { size } => write!(
                f,
                "program too large for VM memory: {size} bytes, maximum is {MAX_PROGRAM_SIZE}"
            ),
            Self::Font { size } => write!(
                f,
                "fontset data must be {FONTSET_DATA_LENGTH} bytes, got {size}"
            ),
            Self::Io(err) => write!(f, "{err}"),
            Self::Fmt(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Chip8Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<fmt::Error> for Chip8Error {
    fn from(err: fmt::Error) -> Self {
        Chip8Error::Fmt(err)
    }
}

impl From<std::io::Error> for Chip8Error {
    fn from(err: std::io::Error) -> Self {
        Chip8Error::Io(err)
    }
}

impl From<Fault> for Chip8Error {
    fn from(fault: Fault) -> Self {
        Chip8Error::Fault(fault)
    }
}

/// Fatal machine conditions.
///
/// Each carries the program counter of the instruction that raised it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// `CALL` with all 16 stack levels in use.
    StackOverflow { pc: Address },
    /// `RET` with an empty call stack.
    StackUnderflow { pc: Address },
    /// Program counter left the addressable program region.
    PcOutOfBounds { pc: usize },
    /// Program counter landed on an odd address.
    PcMisaligned { pc: usize },
}

impl Display for Fault {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::StackOverflow { pc } => write!(f, "call stack overflow at 0x{pc:03X}"),
            Self::StackUnderflow { pc } => write!(f, "call stack underflow at 0x{pc:03X}"),
            Self::PcOutOfBounds { pc } => write!(f, "program counter out of bounds: 0x{pc:04X}"),
            Self::PcMisaligned { pc } => write!(f, "program counter misaligned: 0x{pc:04X}"),
        }
    }
}

impl std::error::Error for Fault {}

/// Instruction word that does not map to any operation.
///
/// Not fatal. The interpreter skips over it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeError {
    pub opcode: u16,
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported opcode 0x{:04X}", self.opcode)
    }
}

impl std::error::Error for DecodeError {}
