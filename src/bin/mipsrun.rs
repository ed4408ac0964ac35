//! Command-line front end for the simulator.
//!
//! Mirrors the teacher's `bin/emulate.rs`/`bin/elf2trace.rs`: a
//! `clap`-derived `Args` struct with a doc comment that becomes the
//! `--help` text, one positional argument for the input file, and a
//! couple of diagnostic flags.

use clap::Parser;
use mipsemu::elf_utils;
use mipsemu::simulator::Simulator;

/// Run a MIPS-I ELF32 static executable to completion.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about)]
struct Args {
    /// Path to the input ELF executable
    input: String,

    /// Print each instruction's address before executing it
    #[arg(short, long)]
    trace: bool,

    /// Dump non-zero registers after the run ends
    #[arg(short = 'r', long)]
    dump_registers: bool,
}

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                e.exit()
            }
            _ => {
                println!("usage: mipsrun <elf-file> [--trace] [--dump-registers]");
                std::process::exit(0);
            }
        },
    };

    let bytes = match std::fs::read(&args.input) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("error: could not read {}: {e}", args.input);
            std::process::exit(1);
        }
    };

    let image = match elf_utils::load(&bytes) {
        Ok(image) => image,
        Err(e) => {
            eprintln!("error: could not load {}: {e}", args.input);
            std::process::exit(1);
        }
    };

    let mut sim = Simulator::new(image.cpu, image.vm);

    let status = loop {
        if args.trace {
            eprintln!("pc=0x{:08x}", sim.cpu.pc);
        }
        match sim.step() {
            Ok(mipsemu::exec::StepOutcome::Continue) => continue,
            Ok(mipsemu::exec::StepOutcome::Exit(code)) => break code,
            Err(mipsemu::error::Fault::IllegalInstruction { word }) => {
                eprintln!(
                    "stopped at pc=0x{:08x}: illegal instruction 0x{word:08x}",
                    sim.cpu.pc
                );
                break 0;
            }
            Err(fault) => {
                eprintln!("fatal: {fault} at pc=0x{:08x}", sim.cpu.pc);
                break 1;
            }
        }
    };

    if args.dump_registers {
        for (name, value) in sim.cpu.non_zero_registers() {
            eprintln!("{name:>4} = 0x{value:08x}");
        }
    }

    std::process::exit(status);
}
