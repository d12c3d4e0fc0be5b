//! Disassembler.
use std::fmt::{self, Write as FmtWrite};

use crate::{
    bytecode::fetch_word,
    constants::{Address, MEM_START},
    instr::Op,
};

/// Linear disassembler over a ROM image.
///
/// Code and data are not told apart. Every aligned pair of bytes is
/// decoded as if it were an instruction, and words that don't decode
/// are printed as raw data.
pub struct Disassembler<'a> {
    bytecode: &'a [u8],
}

/// A single listing entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instr {
    /// Address in memory where the instruction is located once loaded.
    pub addr: Address,
    /// The original bytes that were read from the buffer.
    ///
    /// Only a trailing odd byte has length 1.
    pub bytes: Vec<u8>,
    /// Decoded operation, `None` for data.
    pub op: Option<Op>,
}

impl Instr {
    /// Original bytes encoded into a `u16`, if this is a whole word.
    pub fn bytecode(&self) -> Option<u16> {
        match self.bytes[..] {
            [a, b] => Some(u16::from_be_bytes([a, b])),
            _ => None,
        }
    }
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "0x{:04X} ", self.addr)?;

        match (self.bytecode(), &self.op) {
            (Some(word), Some(op)) => write!(f, "{word:04X} {op}"),
            (Some(word), None) => write!(f, "{word:04X} 0x{word:04X}"),
            (None, _) => {
                let byte = self.bytes[0];
                write!(f, "{byte:02X}   0x{byte:02X}")
            }
        }
    }
}

impl<'a> Disassembler<'a> {
    pub fn new(bytecode: &'a [u8]) -> Self {
        Self { bytecode }
    }

    /// Decode the ROM into listing entries.
    pub fn instructions(&self) -> impl Iterator<Item = Instr> + 'a {
        let bytecode = self.bytecode;

        bytecode
            .chunks(2)
            .enumerate()
            .map(move |(i, chunk)| {
                let op = fetch_word(bytecode, i * 2).and_then(|word| Op::decode(word).ok());

                Instr {
                    addr: (MEM_START + i * 2) as Address,
                    bytes: chunk.to_vec(),
                    op,
                }
            })
    }

    /// Write the whole listing, one instruction per line.
    pub fn disassemble<W: FmtWrite>(&self, w: &mut W) -> fmt::Result {
        for instr in self.instructions() {
            writeln!(w, "{instr}")?;
        }

        Ok(())
    }
}
