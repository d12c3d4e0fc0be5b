//! CPU register state.
use crate::{constants::*, error::Fault};

/// Register file for a chip8 interpreter.
#[derive(Debug, Clone)]
pub struct Chip8Cpu {
    /// Program counter pointing to the current position in the bytecode.
    pub(crate) pc: usize,
    /// Stack pointer. Number of return addresses currently on the stack.
    pub(crate) sp: usize,
    /// General purpose registers for temporary values.
    ///
    /// Register 16 (VF) is used for either the carry flag or borrow switch depending on opcode.
    pub(crate) registers: [u8; REGISTER_COUNT],
    /// Pointer register used for temporarily storing an address. Since addresses are 12 bits, only the
    /// lowest (rightmost) bits are used.
    pub(crate) address: Address,
    /// (DT) Delay timer that counts down to 0.
    pub(crate) delay_timer: u8,
    /// (ST) Sound timer that counts down to 0. When it has a non-zero value, a beep is played.
    pub(crate) sound_timer: u8,
    /// Stack of return pointers used for jumping when a routine call finishes.
    pub(crate) stack: [Address; STACK_SIZE],
}

impl Default for Chip8Cpu {
    fn default() -> Self {
        Self {
            pc: MEM_START,
            sp: 0,
            registers: [0; REGISTER_COUNT],
            address: 0,
            delay_timer: 0,
            sound_timer: 0,
            stack: [0; STACK_SIZE],
        }
    }
}

impl Chip8Cpu {
    pub fn new() -> Self {
        Default::default()
    }

    /// Put every register back into its power-on state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[inline(always)]
    pub fn pc(&self) -> usize {
        self.pc
    }

    #[inline(always)]
    pub fn sp(&self) -> usize {
        self.sp
    }

    /// Value of register `Vx`. Only the low nibble of `x` is used.
    #[inline(always)]
    pub fn v(&self, x: u8) -> u8 {
        self.registers[(x & 0xF) as usize]
    }

    #[inline(always)]
    pub fn set_v(&mut self, x: u8, value: u8) {
        self.registers[(x & 0xF) as usize] = value;
    }

    #[inline(always)]
    pub fn registers(&self) -> &[u8; REGISTER_COUNT] {
        &self.registers
    }

    #[inline(always)]
    pub fn address(&self) -> Address {
        self.address
    }

    /// Store a value in the address register I, truncated to 12 bits.
    #[inline(always)]
    pub fn set_address(&mut self, address: u16) {
        self.address = address & ADDRESS_MASK;
    }

    #[inline(always)]
    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    #[inline(always)]
    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    /// Return addresses currently on the stack, oldest first.
    pub fn stack(&self) -> &[Address] {
        &self.stack[..self.sp]
    }

    /// Push a return address. The stack is left untouched on overflow.
    pub fn push(&mut self, return_address: Address) -> Result<(), Fault> {
        if self.sp >= STACK_SIZE {
            return Err(Fault::StackOverflow {
                pc: self.pc as Address,
            });
        }

        self.stack[self.sp] = return_address;
        self.sp += 1;

        Ok(())
    }

    /// Pop the most recent return address.
    pub fn pop(&mut self) -> Result<Address, Fault> {
        match self.sp.checked_sub(1) {
            Some(sp) => {
                self.sp = sp;
                Ok(self.stack[sp])
            }
            None => Err(Fault::StackUnderflow {
                pc: self.pc as Address,
            }),
        }
    }

    /// Count down the delay timer.
    #[inline]
    pub fn tick_delay(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
    }

    #[inline]
    pub fn tick_sound(&mut self) {
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }

    /// Count down both timers by one tick.
    #[inline]
    pub fn tick_timers(&mut self) {
        self.tick_delay();
        self.tick_sound();
    }
}
