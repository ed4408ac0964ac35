//! Fatal error kinds
//!
//! Every kind in this module is fatal: the simulator has no recovery
//! path for any of them. `Fault` covers errors that can only occur
//! once the guest is already running (fetch, load/store, arithmetic,
//! decode); `LoadError` covers ELF validation failures, which happen
//! before a `CpuContext`/`VirtualMemory` exists at all.
//!
//! Centralizing these as `thiserror` enums, rather than calling
//! `std::process::exit` from deep inside the VM or executor, keeps
//! fatal reporting in one place (the run loop / `main`) and lets every
//! other function return an ordinary `Result`.

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    #[error("segmentation fault: address 0x{address:08x} is not in any mapped region")]
    SegFault { address: u32 },

    #[error("alignment fault: address 0x{address:08x} is not a multiple of 4")]
    AlignFault { address: u32 },

    #[error("arithmetic overflow trap")]
    Overflow,

    #[error("division by zero")]
    DivByZero,

    #[error("illegal instruction: word 0x{word:08x}")]
    IllegalInstruction { word: u32 },
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("could not read executable file: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse ELF file: {0}")]
    Parse(String),

    #[error("bad ELF magic number")]
    BadMagic,

    #[error("not a little-endian ELF file (expected ELFDATA2LSB)")]
    NotLittleEndian,

    #[error("not a 32-bit ELF file (expected ELFCLASS32)")]
    NotClass32,

    #[error("not a MIPS binary (expected EM_MIPS)")]
    NotMips,

    #[error("not an executable file (expected ET_EXEC)")]
    NotExecutable,

    #[error("unsupported ELF version (expected EV_CURRENT)")]
    BadVersion,

    #[error("program header describes a region that overlaps an existing one")]
    OverlappingRegion,
}
