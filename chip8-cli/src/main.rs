//! Entrypoint for CLI
use std::{error::Error, fs, io, path::PathBuf, process};

use chip8_vm::{prelude::*, Hz, IMPL_VERSION};
use clap::{Parser, Subcommand};
use log::info;

mod config;
mod error;
mod session;
mod term;

use self::{
    config::RunConfig,
    error::AppError,
    session::{Outcome, Session},
};

/// Chip-8 virtual machine.
#[derive(Parser)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a ROM file and print the display to the terminal
    Run {
        /// ROM file to run
        rom: PathBuf,
        /// YAML run configuration
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Stop after this many steps
        #[arg(short, long)]
        steps: Option<u64>,
        /// Steps per second, 0 runs unthrottled
        #[arg(long)]
        hz: Option<u64>,
        /// Seed for the random number generator
        #[arg(long)]
        seed: Option<u64>,
        /// Print every n-th frame
        #[arg(short, long)]
        render_every: Option<u64>,
    },
    /// Disassemble a ROM file into readable assembly
    Dis {
        /// ROM file to disassemble
        rom: PathBuf,
    },
}

fn run_rom(rom: PathBuf, config: RunConfig) -> Result<Outcome, AppError> {
    info!("Chip8 v{IMPL_VERSION}, running {}", rom.display());

    let bytecode = fs::read(&rom)?;
    let mut session = Session::new(config, &bytecode, io::stdout())?;

    let outcome = session.run()?;
    session.write_final_frame()?;

    if let Outcome::Fault(fault) = outcome {
        eprintln!("fault: {fault}");
        eprint!("{}", session.vm().dump_registers()?);
    }
    info!(
        "stopped after {} steps and {} frames: {outcome:?}",
        session.steps(),
        session.devices().frame_count()
    );

    Ok(outcome)
}

fn disassemble_rom(rom: PathBuf) -> Result<(), AppError> {
    let bytecode = fs::read(rom)?;

    let mut listing = String::new();
    Disassembler::new(&bytecode).disassemble(&mut listing)?;
    print!("{listing}");

    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    simple_logger::SimpleLogger::new().env().init()?;

    match Args::parse().command {
        Command::Run {
            rom,
            config,
            steps,
            hz,
            seed,
            render_every,
        } => {
            let mut run_config = match config {
                Some(path) => RunConfig::from_file(path)?,
                None => RunConfig::default(),
            };

            // Command line takes precedence over the file.
            if steps.is_some() {
                run_config.max_steps = steps;
            }
            if let Some(hz) = hz {
                run_config.clock_frequency = Hz(hz);
            }
            if seed.is_some() {
                run_config.vm.seed = seed;
            }
            if let Some(n) = render_every {
                run_config.render_every = n;
            }

            if let Outcome::Fault(_) = run_rom(rom, run_config)? {
                process::exit(1);
            }
        }
        Command::Dis { rom } => disassemble_rom(rom)?,
    }

    Ok(())
}
