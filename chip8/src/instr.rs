//! Decoded instructions.
//!
//! Every 16-bit word fetched by the interpreter is decoded once into an [`Op`],
//! which is then executed by matching over the variants.
use std::fmt;

use crate::{bytecode::Operands, constants::Address, error::DecodeError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// 0nnn (SYS addr)
    ///
    /// Jump to a machine code routine on the original hardware.
    /// Ignored by modern interpreters.
    Sys { address: Address },
    /// 00E0 (CLS)
    ///
    /// Clear the screen.
    ClearScreen,
    /// 00EE (RET)
    ///
    /// Return from the sub-routine.
    Return,
    /// 1nnn (JP addr)
    ///
    /// Jump to the address in `nnn`.
    Jump { address: Address },
    /// 2nnn (CALL addr)
    ///
    /// Call the sub-routine at address `nnn`.
    Call { address: Address },
    /// 3xkk (SE Vx, byte)
    ///
    /// Skip the next instruction if register `Vx` equals value `kk`.
    SkipEqByte { vx: u8, kk: u8 },
    /// 4xkk (SNE Vx, byte)
    ///
    /// Skip the next instruction if register `Vx` does not equal value `kk`.
    SkipNotEqByte { vx: u8, kk: u8 },
    /// 5xy0 (SE Vx, Vy)
    ///
    /// Skip the next instruction if register `Vx` equals register `Vy`.
    SkipEq { vx: u8, vy: u8 },
    /// 6xkk (LD Vx, byte)
    LoadByte { vx: u8, kk: u8 },
    /// 7xkk (ADD Vx, byte)
    ///
    /// Add byte to the value in register `Vx`. Carry flag is not set.
    AddByte { vx: u8, kk: u8 },

    // ------------------------------------------------------------------------
    // Math
    /// 8xy0 (LD Vx, Vy)
    Load { vx: u8, vy: u8 },
    /// 8xy1 (OR Vx, Vy)
    Or { vx: u8, vy: u8 },
    /// 8xy2 (AND Vx, Vy)
    And { vx: u8, vy: u8 },
    /// 8xy3 (XOR Vx, Vy)
    Xor { vx: u8, vy: u8 },
    /// 8xy4 (ADD Vx, Vy)
    ///
    /// VF is set to 1 on overflow, else 0.
    Add { vx: u8, vy: u8 },
    /// 8xy5 (SUB Vx, Vy)
    ///
    /// VF is set to 0 when there is a borrow, set to 1 when there isn't.
    Sub { vx: u8, vy: u8 },
    /// 8xy6 (SHR Vx)
    ///
    /// VF receives the least-significant bit of `Vx`. `Vy` is unused.
    ShiftRight { vx: u8 },
    /// 8xy7 (SUBN Vx, Vy)
    ///
    /// `Vx = Vy - Vx`, with the same borrow flag as `SUB`.
    SubReverse { vx: u8, vy: u8 },
    /// 8xyE (SHL Vx)
    ///
    /// VF receives the most-significant bit of `Vx`. `Vy` is unused.
    ShiftLeft { vx: u8 },

    /// 9xy0 (SNE Vx, Vy)
    SkipNotEq { vx: u8, vy: u8 },
    /// Annn (LD I, addr)
    LoadAddress { address: Address },
    /// Bnnn (JP V0, addr)
    ///
    /// Jump to location `nnn + V0`.
    JumpOffset { address: Address },
    /// Cxkk (RND Vx, byte)
    Random { vx: u8, kk: u8 },
    /// Dxyn (DRW Vx, Vy, nibble)
    Draw { vx: u8, vy: u8, n: u8 },

    // ------------------------------------------------------------------------
    // Keyboard
    /// Ex9E (SKP Vx)
    SkipKeyPressed { vx: u8 },
    /// ExA1 (SKNP Vx)
    SkipKeyNotPressed { vx: u8 },

    // ------------------------------------------------------------------------
    // Miscellaneous
    /// Fx07 (LD Vx, DT)
    LoadDelay { vx: u8 },
    /// Fx0A (LD Vx, K)
    ///
    /// Suspend execution until a key is pressed.
    WaitKey { vx: u8 },
    /// Fx15 (LD DT, Vx)
    SetDelay { vx: u8 },
    /// Fx18 (LD ST, Vx)
    SetSound { vx: u8 },
    /// Fx1E (ADD I, Vx)
    AddAddress { vx: u8 },
    /// Fx29 (LD F, Vx)
    LoadFont { vx: u8 },
    /// Fx33 (LD B, Vx)
    StoreBcd { vx: u8 },
    /// Fx55 (LD [I], Vx)
    StoreRegisters { vx: u8 },
    /// Fx65 (LD Vx, [I])
    LoadRegisters { vx: u8 },
}

impl Op {
    /// Decode a single instruction word.
    pub fn decode(word: u16) -> Result<Op, DecodeError> {
        let Operands {
            op,
            x: vx,
            y: vy,
            n,
            kk,
            nnn,
        } = Operands::from_word(word);
        let unknown = Err(DecodeError { opcode: word });

        let op = match op {
            0x0 => match nnn {
                0x0E0 => Op::ClearScreen,
                0x0EE => Op::Return,
                _ => Op::Sys { address: nnn },
            },
            0x1 => Op::Jump { address: nnn },
            0x2 => Op::Call { address: nnn },
            0x3 => Op::SkipEqByte { vx, kk },
            0x4 => Op::SkipNotEqByte { vx, kk },
            0x5 => match n {
                0x0 => Op::SkipEq { vx, vy },
                _ => return unknown,
            },
            0x6 => Op::LoadByte { vx, kk },
            0x7 => Op::AddByte { vx, kk },
            // Arithmetic instructions identified by n
            0x8 => match n {
                0x0 => Op::Load { vx, vy },
                0x1 => Op::Or { vx, vy },
                0x2 => Op::And { vx, vy },
                0x3 => Op::Xor { vx, vy },
                0x4 => Op::Add { vx, vy },
                0x5 => Op::Sub { vx, vy },
                0x6 => Op::ShiftRight { vx },
                0x7 => Op::SubReverse { vx, vy },
                0xE => Op::ShiftLeft { vx },
                _ => return unknown,
            },
            0x9 => match n {
                0x0 => Op::SkipNotEq { vx, vy },
                _ => return unknown,
            },
            0xA => Op::LoadAddress { address: nnn },
            0xB => Op::JumpOffset { address: nnn },
            0xC => Op::Random { vx, kk },
            0xD => Op::Draw { vx, vy, n },
            // Keyboard instructions identified by kk
            0xE => match kk {
                0x9E => Op::SkipKeyPressed { vx },
                0xA1 => Op::SkipKeyNotPressed { vx },
                _ => return unknown,
            },
            // Miscellaneous instructions identified by kk
            0xF => match kk {
                0x07 => Op::LoadDelay { vx },
                0x0A => Op::WaitKey { vx },
                0x15 => Op::SetDelay { vx },
                0x18 => Op::SetSound { vx },
                0x1E => Op::AddAddress { vx },
                0x29 => Op::LoadFont { vx },
                0x33 => Op::StoreBcd { vx },
                0x55 => Op::StoreRegisters { vx },
                0x65 => Op::LoadRegisters { vx },
                _ => return unknown,
            },
            _ => return unknown,
        };

        Ok(op)
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Op::Sys { address } => write!(f, "SYS 0x{address:03X}"),
            Op::ClearScreen => write!(f, "CLS"),
            Op::Return => write!(f, "RET"),
            Op::Jump { address } => write!(f, "JP 0x{address:03X}"),
            Op::Call { address } => write!(f, "CALL 0x{address:03X}"),
            Op::SkipEqByte { vx, kk } => write!(f, "SE v{vx:X}, 0x{kk:02X}"),
            Op::SkipNotEqByte { vx, kk } => write!(f, "SNE v{vx:X}, 0x{kk:02X}"),
            Op::SkipEq { vx, vy } => write!(f, "SE v{vx:X}, v{vy:X}"),
            Op::LoadByte { vx, kk } => write!(f, "LD v{vx:X}, 0x{kk:02X}"),
            Op::AddByte { vx, kk } => write!(f, "ADD v{vx:X}, 0x{kk:02X}"),
            // ------
            Op::Load { vx, vy } => write!(f, "LD v{vx:X}, v{vy:X}"),
            Op::Or { vx, vy } => write!(f, "OR v{vx:X}, v{vy:X}"),
            Op::And { vx, vy } => write!(f, "AND v{vx:X}, v{vy:X}"),
            Op::Xor { vx, vy } => write!(f, "XOR v{vx:X}, v{vy:X}"),
            Op::Add { vx, vy } => write!(f, "ADD v{vx:X}, v{vy:X}"),
            Op::Sub { vx, vy } => write!(f, "SUB v{vx:X}, v{vy:X}"),
            Op::ShiftRight { vx } => write!(f, "SHR v{vx:X}"),
            Op::SubReverse { vx, vy } => write!(f, "SUBN v{vx:X}, v{vy:X}"),
            Op::ShiftLeft { vx } => write!(f, "SHL v{vx:X}"),
            // ------
            Op::SkipNotEq { vx, vy } => write!(f, "SNE v{vx:X}, v{vy:X}"),
            Op::LoadAddress { address } => write!(f, "LD I, 0x{address:03X}"),
            Op::JumpOffset { address } => write!(f, "JP v0, 0x{address:03X}"),
            Op::Random { vx, kk } => write!(f, "RND v{vx:X}, 0x{kk:02X}"),
            Op::Draw { vx, vy, n } => write!(f, "DRW v{vx:X}, v{vy:X}, {n}"),
            // ------
            Op::SkipKeyPressed { vx } => write!(f, "SKP v{vx:X}"),
            Op::SkipKeyNotPressed { vx } => write!(f, "SKNP v{vx:X}"),
            Op::LoadDelay { vx } => write!(f, "LD v{vx:X}, DT"),
            Op::WaitKey { vx } => write!(f, "LD v{vx:X}, K"),
            Op::SetDelay { vx } => write!(f, "LD DT, v{vx:X}"),
            Op::SetSound { vx } => write!(f, "LD ST, v{vx:X}"),
            Op::AddAddress { vx } => write!(f, "ADD I, v{vx:X}"),
            Op::LoadFont { vx } => write!(f, "LD F, v{vx:X}"),
            Op::StoreBcd { vx } => write!(f, "LD B, v{vx:X}"),
            Op::StoreRegisters { vx } => write!(f, "LD [I], v{vx:X}"),
            Op::LoadRegisters { vx } => write!(f, "LD v{vx:X}, [I]"),
        }
    }
}
