//! Chip-8 virtual machine.
//!
//! The [`Chip8Vm`](prelude::Chip8Vm) owns memory, registers, the framebuffer
//! and the keyboard latch. A host drives it one [`step`](prelude::Chip8Vm::step)
//! per logical tick, pushes key events in with `set_key`, and presents the
//! display through the [`Devices`](devices::Devices) trait.
mod bytecode;
pub mod clock;
pub mod constants;
mod cpu;
pub mod devices;
mod disasm;
pub mod display;
mod error;
pub mod instr;
mod keypad;
pub mod memory;
mod vm;

pub use self::{clock::Hz, devices::KeyCode};

/// Version of the interpreter crate.
pub const IMPL_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod prelude {
    pub use super::{
        clock::{Clock, Hz},
        cpu::Chip8Cpu,
        devices::{Devices, KeyCode},
        disasm::{Disassembler, Instr},
        display::{DisplayBuffer, Framebuffer},
        error::{Chip8Error, Chip8Result, DecodeError, Fault},
        instr::Op,
        keypad::Keypad,
        vm::{Chip8Conf, Chip8Vm, Flow, Status},
    };
}
