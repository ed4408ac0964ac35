//! The fetch-decode-execute run loop (spec §4.7)
//!
//! `Simulator` owns the CPU context and virtual memory and drives
//! [`exec::step`] until the guest exits or a fault terminates it.
//! Fatal-fault reporting is centralized here rather than scattered
//! through `exec`/`memory`/`syscall`, the same shape as the teacher's
//! `bin/emulate.rs` printing a single diagnostic line at the top level
//! instead of each instruction handler doing its own `eprintln!`.

use crate::cpu::CpuContext;
use crate::error::Fault;
use crate::exec::{self, StepOutcome};
use crate::memory::VirtualMemory;

pub struct Simulator {
    pub cpu: CpuContext,
    pub vm: VirtualMemory,
}

/// How the run loop ended.
#[derive(Debug)]
pub enum Termination {
    /// The guest asked to exit, or hit an instruction the decoder
    /// could not make sense of — spec §4.7 treats both as a clean,
    /// zero-status stop.
    Clean,
    /// A `Fault` propagated out of `step` — the guest touched memory
    /// it shouldn't have, divided by zero, or overflowed a trapping
    /// add.
    Fatal(Fault),
}

impl Simulator {
    pub fn new(cpu: CpuContext, vm: VirtualMemory) -> Self {
        Self { cpu, vm }
    }

    /// Execute a single instruction.
    pub fn step(&mut self) -> Result<StepOutcome, Fault> {
        exec::step(&mut self.cpu, &mut self.vm)
    }

    /// Run until the guest exits or faults.
    pub fn run(&mut self) -> Termination {
        loop {
            match self.step() {
                Ok(StepOutcome::Continue) => continue,
                Ok(StepOutcome::Exit(_)) => return Termination::Clean,
                Err(Fault::IllegalInstruction { .. }) => return Termination::Clean,
                Err(fault) => return Termination::Fatal(fault),
            }
        }
    }
}
