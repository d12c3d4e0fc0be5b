//! Virtual machine.
use std::{
    fmt::{self, Write},
    fs,
    path::Path,
};

use log::{debug, error, warn};
use rand::prelude::*;

use crate::{
    constants::*,
    cpu::Chip8Cpu,
    devices::{Devices, KeyCode},
    display::{DisplayBuffer, Framebuffer},
    error::{Chip8Error, Chip8Result, Fault},
    instr::Op,
    keypad::Keypad,
    memory::Memory,
};

pub struct Chip8Vm {
    cpu: Chip8Cpu,
    memory: Memory,
    display: Framebuffer,
    keypad: Keypad,
    status: Status,
    /// Key pressed down while the machine was suspended on `Fx0A`.
    key_down: Option<KeyCode>,
    /// Font data that is restored whenever a program is loaded.
    font: [u8; FONTSET_DATA_LENGTH],
    /// Switch tracking whether the buzzer should be on or off.
    buzzer_state: bool,
    /// Number of instruction words that failed to decode.
    decode_failures: usize,
    rng: StdRng,
    conf: Chip8Conf,
}

impl Chip8Vm {
    pub fn new(conf: Chip8Conf) -> Self {
        let rng = match conf.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut vm = Chip8Vm {
            cpu: Chip8Cpu::new(),
            memory: Memory::new(),
            display: Framebuffer::new(),
            keypad: Keypad::new(),
            status: Status::Running,
            key_down: None,
            font: FONTSET,
            buzzer_state: false,
            decode_failures: 0,
            rng,
            conf,
        };
        vm.write_font();

        vm
    }

    /// Configuration that was used to instantiate the VM.
    pub fn config(&self) -> &Chip8Conf {
        &self.conf
    }

    /// Replace the built-in hexadecimal font.
    ///
    /// The font survives loading new programs.
    pub fn load_font(&mut self, fontset: &[u8]) -> Chip8Result<()> {
        if fontset.len() != FONTSET_DATA_LENGTH {
            return Err(Chip8Error::Font {
                size: fontset.len(),
            });
        }

        self.font.copy_from_slice(fontset);
        self.write_font();

        Ok(())
    }

    fn write_font(&mut self) {
        let loaded = self.memory.load(FONTSET_START as usize, &self.font);
        debug_assert!(loaded, "font must fit below program memory");
    }

    /// Load a program into memory and prepare the machine to run it.
    ///
    /// Programs larger than the available memory are rejected without
    /// touching the machine state.
    pub fn load_bytecode(&mut self, bytecode: &[u8]) -> Chip8Result<()> {
        if bytecode.len() > MAX_PROGRAM_SIZE {
            return Err(Chip8Error::LargeProgram {
                size: bytecode.len(),
            });
        }

        // Start with clean memory to avoid leaking previous program.
        self.memory.clear();

        // Reset fonts
        self.write_font();

        // Load program into virtual RAM
        let loaded = self.memory.load(MEM_START, bytecode);
        debug_assert!(loaded, "program size was checked");

        self.reset();

        debug!("loaded {} bytes of bytecode", bytecode.len());

        Ok(())
    }

    /// Read a ROM file and load it.
    ///
    /// The file is read completely before the machine is touched, so a
    /// failed read leaves the current program intact.
    pub fn load_rom(&mut self, filepath: impl AsRef<Path>) -> Chip8Result<()> {
        let bytecode = fs::read(filepath.as_ref())?;
        self.load_bytecode(&bytecode)
    }

    /// Clear registers, display and input state in preparation for a fresh startup.
    ///
    /// Memory is left as is.
    pub fn reset(&mut self) {
        self.cpu.reset();
        self.display.clear();
        self.keypad.clear();
        self.status = Status::Running;
        self.key_down = None;
        self.buzzer_state = false;
        self.decode_failures = 0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Ok,
    /// Program counter has jumped to a new address.
    ///
    /// This is useful for the caller to avoid being
    /// blocked on infinite or long running loops.
    ///
    /// This is returned when the interpreter encounters:
    ///
    /// - 1nnn (`JP addr`)
    /// - 2nnn (`CALL addr`)
    /// - 00EE (`RET`)
    /// - Bnnn (`JP V0, addr`)
    Jump,
    /// The display buffer changed and should be presented.
    Draw,
    /// The sound timer was set.
    Sound,
    /// Wait for a keypress.
    ///
    /// This is triggered by the opcode `Fx0A` (`LD Vx, K`), which stops
    /// execution until a key is pressed, and loads the key value into `Vx`.
    KeyWait,
    /// The instruction word did not decode, and was skipped.
    InvalidOpcode(u16),
}

/// Execution state of the machine between steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Running,
    /// Suspended on `Fx0A` until a key is pressed. The key will be stored in `vx`.
    WaitingForKey { vx: u8 },
    /// Stopped by a fatal fault. Requires a reset or a new program.
    Halted(Fault),
}

/// VM Configuration Parameters.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(default))]
pub struct Chip8Conf {
    /// Seed for the `RND` instruction. Entropy is used when not set.
    pub seed: Option<u64>,
    /// Keep counting down the delay and sound timers while suspended on `Fx0A`.
    ///
    /// Off by default, which freezes the whole machine during the wait.
    pub tick_timers_while_waiting: bool,
}

/// Interpreter
impl Chip8Vm {
    /// Sets the keyboard key input state.
    ///
    /// A key that goes down while the VM is waiting for keyboard input
    /// is latched, and will resume the VM on the next step.
    pub fn set_key(&mut self, key: KeyCode, pressed: bool) {
        let key_down = self.keypad.set(key, pressed);

        if key_down && self.is_waiting() && self.key_down.is_none() {
            debug!("key {key} pressed during key wait");
            self.key_down = Some(key);
        }
    }

    /// Clear the keyboard input state, setting all keys to up.
    pub fn clear_keys(&mut self) {
        self.keypad.clear()
    }

    pub fn keypad(&self) -> &Keypad {
        &self.keypad
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_waiting(&self) -> bool {
        matches!(self.status, Status::WaitingForKey { .. })
    }

    /// A key went down during the current key wait, and will be consumed by the next step.
    pub fn has_pending_key(&self) -> bool {
        self.key_down.is_some()
    }

    pub fn is_halted(&self) -> bool {
        matches!(self.status, Status::Halted(_))
    }

    pub fn cpu(&self) -> &Chip8Cpu {
        &self.cpu
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.display
    }

    pub fn display_buffer(&self) -> &DisplayBuffer {
        self.display.buffer()
    }

    /// Whether the display changed since the last render.
    pub fn needs_redraw(&self) -> bool {
        self.display.is_dirty()
    }

    /// Mark the display as consumed by a renderer.
    pub fn clear_redraw(&mut self) {
        self.display.clear_dirty()
    }

    pub fn delay_timer(&self) -> u8 {
        self.cpu.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.cpu.sound_timer
    }

    /// The buzzer sounds while the sound timer counts down.
    pub fn is_buzzing(&self) -> bool {
        self.cpu.sound_timer > 0
    }

    pub fn decode_failures(&self) -> usize {
        self.decode_failures
    }

    /// Push machine output to the host devices.
    ///
    /// The display is only drawn when it changed, and the buzzer is only
    /// toggled when its state changes.
    pub fn present<D: Devices + ?Sized>(&mut self, devices: &mut D) {
        if self.display.is_dirty() {
            devices.draw(self.display.buffer());
            self.display.clear_dirty();
        }

        // Buzzer should be on while sound timer counts down,
        // then turned off when the timer reaches zero.
        let buzzing = self.is_buzzing();
        if buzzing != self.buzzer_state {
            self.buzzer_state = buzzing;
            devices.buzz(buzzing);
        }
    }

    /// Execute up to `step_count` instructions.
    ///
    /// Returns early when the machine suspends to wait for a key.
    pub fn run_steps(&mut self, step_count: usize) -> Chip8Result<Flow> {
        let mut flow = Flow::Ok;

        for _ in 0..step_count {
            flow = self.step()?;
            if flow == Flow::KeyWait {
                break;
            }
        }

        Ok(flow)
    }

    /// Perform one instruction cycle, then count down the timers.
    ///
    /// Fatal faults are detected before the instruction changes any state,
    /// so a faulting step is never partially applied.
    pub fn step(&mut self) -> Chip8Result<Flow> {
        match self.status {
            Status::Halted(fault) => return Err(Chip8Error::Halted(fault)),
            Status::WaitingForKey { vx } => return Ok(self.step_key_wait(vx)),
            Status::Running => {}
        }

        let pc = self.cpu.pc;
        if !(MEM_START..=PC_MAX).contains(&pc) {
            return Err(self.halt(Fault::PcOutOfBounds { pc }));
        }
        if pc % 2 != 0 {
            return Err(self.halt(Fault::PcMisaligned { pc }));
        }

        // Each instruction is two bytes, with the opcode identity in the first 4-bit nibble.
        let word = self.memory.word(pc);

        let control_flow = match Op::decode(word) {
            Ok(op) => {
                op_trace(pc, word, &op);

                match self.exec(op) {
                    Ok(flow) => flow,
                    Err(fault) => return Err(self.halt(fault)),
                }
            }
            Err(err) => {
                warn!("0x{pc:03X}: {err}, skipping");
                self.decode_failures += 1;
                self.cpu.pc += 2;
                Flow::InvalidOpcode(word)
            }
        };

        // Count down timers
        self.cpu.tick_timers();

        Ok(control_flow)
    }

    fn halt(&mut self, fault: Fault) -> Chip8Error {
        error!("{fault}");
        self.status = Status::Halted(fault);
        Chip8Error::Fault(fault)
    }

    /// Step while suspended on `Fx0A (LD Vx, K)`.
    fn step_key_wait(&mut self, vx: u8) -> Flow {
        match self.key_down.take() {
            Some(key) => {
                self.cpu.set_v(vx, key.as_u8());
                self.cpu.pc += 2;
                self.status = Status::Running;
                self.cpu.tick_timers();
                Flow::Ok
            }
            None => {
                if self.conf.tick_timers_while_waiting {
                    self.cpu.tick_timers();
                }
                Flow::KeyWait
            }
        }
    }

    /// Advance past the next instruction if the condition holds.
    #[inline(always)]
    fn skip_if(&mut self, condition: bool) -> Flow {
        self.cpu.pc += if condition { 4 } else { 2 };
        Flow::Ok
    }

    /// Advance to the next instruction.
    #[inline(always)]
    fn next(&mut self) -> Flow {
        self.cpu.pc += 2;
        Flow::Ok
    }

    /// Execute a decoded instruction.
    ///
    /// Every arm is responsible for leaving the program counter on the
    /// next instruction to execute. In the arithmetic group the result is
    /// stored before the flag, so when `Vx` is `VF` the flag wins.
    fn exec(&mut self, op: Op) -> Result<Flow, Fault> {
        let addr = self.cpu.address as usize;

        let flow = match op {
            Op::Sys { address } => {
                debug!("ignoring machine code routine at 0x{address:03X}");
                self.next()
            }
            Op::ClearScreen => {
                self.display.clear();
                self.cpu.pc += 2;
                Flow::Draw
            }
            // Set the program counter to the return address at the top of the stack.
            Op::Return => {
                self.cpu.pc = self.cpu.pop()? as usize;
                Flow::Jump
            }
            Op::Jump { address } => {
                self.cpu.pc = address as usize;
                Flow::Jump
            }
            // The instruction following the call is pushed, so returning
            // does not execute the call again.
            Op::Call { address } => {
                self.cpu.push((self.cpu.pc + 2) as Address)?;
                self.cpu.pc = address as usize;
                Flow::Jump
            }
            Op::SkipEqByte { vx, kk } => self.skip_if(self.cpu.v(vx) == kk),
            Op::SkipNotEqByte { vx, kk } => self.skip_if(self.cpu.v(vx) != kk),
            Op::SkipEq { vx, vy } => self.skip_if(self.cpu.v(vx) == self.cpu.v(vy)),
            Op::LoadByte { vx, kk } => {
                self.cpu.set_v(vx, kk);
                self.next()
            }
            // Carry flag is not set.
            Op::AddByte { vx, kk } => {
                self.cpu.set_v(vx, self.cpu.v(vx).wrapping_add(kk));
                self.next()
            }
            // ----------------------------------------------------------------
            // Arithmetic
            Op::Load { vx, vy } => self.alu(vx, self.cpu.v(vy), None),
            Op::Or { vx, vy } => self.alu(vx, self.cpu.v(vx) | self.cpu.v(vy), None),
            Op::And { vx, vy } => self.alu(vx, self.cpu.v(vx) & self.cpu.v(vy), None),
            Op::Xor { vx, vy } => self.alu(vx, self.cpu.v(vx) ^ self.cpu.v(vy), None),
            // Overflow is wrapped. If overflow, set VF to 1, else 0.
            Op::Add { vx, vy } => {
                let (result, carry) = self.cpu.v(vx).overflowing_add(self.cpu.v(vy));
                self.alu(vx, result, Some(carry as u8))
            }
            // VF is set to 0 when there is a borrow, set to 1 when there isn't.
            Op::Sub { vx, vy } => {
                let (result, borrow) = self.cpu.v(vx).overflowing_sub(self.cpu.v(vy));
                self.alu(vx, result, Some(!borrow as u8))
            }
            Op::ShiftRight { vx } => {
                let x = self.cpu.v(vx);
                self.alu(vx, x >> 1, Some(x & 1))
            }
            Op::SubReverse { vx, vy } => {
                let (result, borrow) = self.cpu.v(vy).overflowing_sub(self.cpu.v(vx));
                self.alu(vx, result, Some(!borrow as u8))
            }
            Op::ShiftLeft { vx } => {
                let x = self.cpu.v(vx);
                self.alu(vx, x << 1, Some(x >> 7))
            }
            // ----------------------------------------------------------------
            Op::SkipNotEq { vx, vy } => self.skip_if(self.cpu.v(vx) != self.cpu.v(vy)),
            Op::LoadAddress { address } => {
                self.cpu.set_address(address);
                self.next()
            }
            // The target is validated when it is fetched.
            Op::JumpOffset { address } => {
                self.cpu.pc = address as usize + self.cpu.v(0) as usize;
                Flow::Jump
            }
            Op::Random { vx, kk } => {
                self.cpu.set_v(vx, self.rng.gen::<u8>() & kk);
                self.next()
            }
            // Sprite is encoded as 8 pixels wide, N pixels high, stored in bits located in
            // memory pointed to by address register I.
            //
            // If the sprite is drawn outside of the display area, it is wrapped around to the other side.
            //
            // If the drawing operation erases existing pixels in the display buffer, register VF is set to
            // 1, and set to 0 if no display bits are unset. This is used for collision detection.
            Op::Draw { vx, vy, n } => {
                let (x, y) = (self.cpu.v(vx) as usize, self.cpu.v(vy) as usize);

                let mut sprite = [0u8; 0xF];
                let rows = &mut sprite[..n as usize];
                for (r, row) in rows.iter_mut().enumerate() {
                    *row = self.memory.read(addr + r);
                }

                let is_erased = self.display.draw_sprite(x, y, rows);
                self.cpu.set_v(FLAG_REGISTER as u8, is_erased as u8);
                self.cpu.pc += 2;
                Flow::Draw
            }
            // ----------------------------------------------------------------
            // Keyboard
            Op::SkipKeyPressed { vx } => {
                let key = KeyCode::from_nibble(self.cpu.v(vx));
                self.skip_if(self.keypad.is_pressed(key))
            }
            Op::SkipKeyNotPressed { vx } => {
                let key = KeyCode::from_nibble(self.cpu.v(vx));
                self.skip_if(!self.keypad.is_pressed(key))
            }
            // ----------------------------------------------------------------
            // Timers
            Op::LoadDelay { vx } => {
                self.cpu.set_v(vx, self.cpu.delay_timer);
                self.next()
            }
            // All execution stops until a key is pressed. The program counter
            // stays on this instruction until the wait is over.
            Op::WaitKey { vx } => {
                self.status = Status::WaitingForKey { vx };
                self.key_down = None;
                Flow::KeyWait
            }
            Op::SetDelay { vx } => {
                self.cpu.delay_timer = self.cpu.v(vx);
                self.next()
            }
            Op::SetSound { vx } => {
                self.cpu.sound_timer = self.cpu.v(vx);
                self.cpu.pc += 2;
                Flow::Sound
            }
            // ----------------------------------------------------------------
            // Memory
            Op::AddAddress { vx } => {
                let x = self.cpu.v(vx) as u16;
                self.cpu.set_address(self.cpu.address.wrapping_add(x));
                self.next()
            }
            Op::LoadFont { vx } => {
                let digit = (self.cpu.v(vx) & 0xF) as u16;
                self.cpu
                    .set_address(FONTSET_START + digit * FONTSET_HEIGHT as u16);
                self.next()
            }
            #[rustfmt::skip]
            Op::StoreBcd { vx } => {
                let x = self.cpu.v(vx);
                self.memory.write(addr,     x / 100);
                self.memory.write(addr + 1, x / 10 % 10);
                self.memory.write(addr + 2, x % 10);
                self.next()
            }
            // Store registers V0 through Vx in memory starting at location I.
            Op::StoreRegisters { vx } => {
                for (v, x) in self.cpu.registers[..=vx as usize].iter().enumerate() {
                    self.memory.write(addr + v, *x);
                }
                self.next()
            }
            // Read registers V0 through Vx from memory starting at location I.
            Op::LoadRegisters { vx } => {
                for (v, x) in self.cpu.registers[..=vx as usize].iter_mut().enumerate() {
                    *x = self.memory.read(addr + v);
                }
                self.next()
            }
        };

        Ok(flow)
    }

    /// Store an arithmetic result in `Vx`, followed by the flag in `VF`.
    #[inline(always)]
    fn alu(&mut self, vx: u8, result: u8, flag: Option<u8>) -> Flow {
        self.cpu.set_v(vx, result);
        if let Some(flag) = flag {
            self.cpu.set_v(FLAG_REGISTER as u8, flag);
        }
        self.next()
    }
}

/// Troubleshooting
#[doc(hidden)]
impl Chip8Vm {
    /// Registers, timers and the call stack as a human readable string.
    pub fn dump_registers(&self) -> Result<String, fmt::Error> {
        let cpu = &self.cpu;
        let mut buf = String::new();

        writeln!(
            buf,
            "PC: {:04X}  I: {:03X}  SP: {:X}  DT: {:02X}  ST: {:02X}",
            cpu.pc, cpu.address, cpu.sp, cpu.delay_timer, cpu.sound_timer
        )?;
        for (i, v) in cpu.registers.iter().enumerate() {
            write!(buf, "V{i:X}: {v:02X} ")?;
            if i % 8 == 7 {
                writeln!(buf)?;
            }
        }
        if cpu.sp > 0 {
            write!(buf, "stack:")?;
            for addr in cpu.stack() {
                write!(buf, " {addr:03X}")?;
            }
            writeln!(buf)?;
        }

        Ok(buf)
    }

    pub fn dump_keys(&self) -> Result<String, fmt::Error> {
        let mut buf = String::new();

        if self.keypad.any() {
            write!(buf, "keys:")?;
            for key in self.keypad.pressed() {
                write!(buf, " {key}")?;
            }
        }

        Ok(buf)
    }
}

#[cfg(feature = "op_trace")]
#[inline]
fn op_trace(pc: usize, word: u16, op: &Op) {
    log::trace!("{pc:04X}: {word:04X} {op}");
}

#[cfg(not(feature = "op_trace"))]
#[inline]
fn op_trace(_: usize, _: u16, _: &Op) {}
