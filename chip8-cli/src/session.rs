//! Run loop.
use std::io::Write;

use chip8_vm::prelude::*;
use log::{debug, error, info};

use crate::{
    config::{InputEvent, RunConfig},
    error::AppError,
    term::TerminalDevices,
};

/// Reason the run loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The configured step limit was reached.
    StepLimit,
    /// The program waits for a key that the input script will never press.
    Blocked,
    /// The machine halted on a fault.
    Fault(Fault),
}

/// Drives a VM with scripted input until it stops.
pub struct Session<W: Write> {
    vm: Chip8Vm,
    devices: TerminalDevices<W>,
    clock: Clock,
    max_steps: Option<u64>,
    input: Vec<InputEvent>,
    /// Index of the next scripted event to deliver.
    cursor: usize,
    steps: u64,
}

impl<W: Write> Session<W> {
    pub fn new(config: RunConfig, bytecode: &[u8], out: W) -> Result<Self, AppError> {
        let mut vm = Chip8Vm::new(config.vm);
        vm.load_bytecode(bytecode)?;

        Ok(Self {
            vm,
            devices: TerminalDevices::new(out, config.render_every),
            clock: Clock::new(config.clock_frequency),
            max_steps: config.max_steps,
            input: config.input,
            cursor: 0,
            steps: 0,
        })
    }

    pub fn vm(&self) -> &Chip8Vm {
        &self.vm
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn devices(&self) -> &TerminalDevices<W> {
        &self.devices
    }

    /// Step the VM until a stop condition is met.
    pub fn run(&mut self) -> Result<Outcome, AppError> {
        self.clock.reset();
        debug!("stepping every {:?}", self.clock.interval());

        loop {
            if self.max_steps.map_or(false, |max| self.steps >= max) {
                info!("step limit of {} reached", self.steps);
                return Ok(Outcome::StepLimit);
            }

            self.deliver_input();

            if self.vm.is_waiting() && !self.can_resume() {
                info!("waiting for a key that will never be pressed");
                return Ok(Outcome::Blocked);
            }

            self.clock.wait();

            match self.vm.step() {
                Ok(_) => {}
                Err(err) if err.is_fatal() => {
                    error!("{err}");
                    return match self.vm.status() {
                        Status::Halted(fault) => Ok(Outcome::Fault(fault)),
                        _ => Err(err.into()),
                    };
                }
                Err(err) => return Err(err.into()),
            }
            self.steps += 1;

            self.vm.present(&mut self.devices);
        }
    }

    /// Print the current framebuffer regardless of render settings.
    pub fn write_final_frame(&mut self) -> Result<(), AppError> {
        self.devices.write_frame(self.vm.display_buffer())?;
        Ok(())
    }

    fn deliver_input(&mut self) {
        while let Some(event) = self.input.get(self.cursor) {
            if event.step > self.steps {
                break;
            }
            debug!(
                "step {}: key {} {}",
                self.steps,
                event.key,
                if event.pressed { "down" } else { "up" }
            );
            self.vm.set_key(event.key, event.pressed);
            self.cursor += 1;
        }
    }

    /// Whether the VM already holds a key press, or a remaining scripted
    /// event will press one.
    fn can_resume(&self) -> bool {
        self.vm.has_pending_key() || self.input[self.cursor..].iter().any(|ev| ev.pressed)
    }
}
