//! ELF32 loading (spec §4.2)
//!
//! Validates the file header, then walks `PT_LOAD` program headers
//! rather than section headers — unlike the teacher's original
//! `read_text_instructions`, which pulled a single named `.text`
//! section out of an `AnyEndian` parse. A loaded MIPS static
//! executable can have several loadable segments (text, data, bss),
//! and the simulator only cares about which byte ranges of the
//! virtual address space must be populated, which is exactly what
//! program headers describe (`original_source/sim/main.c`'s loader
//! walks `Elf32_Phdr` the same way).

use elf::abi::{EM_MIPS, ET_EXEC, EV_CURRENT, PT_LOAD};
use elf::endian::AnyEndian;
use elf::ElfBytes;

use crate::cpu::CpuContext;
use crate::error::LoadError;
use crate::memory::{Region, VirtualMemory};
use crate::opcodes::{REG_SP, STACK_BASE, STACK_LEN};

/// A loaded guest image: its initial virtual memory and CPU state.
pub struct LoadedImage {
    pub vm: VirtualMemory,
    pub cpu: CpuContext,
}

/// Parse and validate an ELF32 MIPS static executable, mapping each
/// `PT_LOAD` segment into a fresh region and setting up the initial
/// program counter and stack pointer.
pub fn load(bytes: &[u8]) -> Result<LoadedImage, LoadError> {
    validate_ident(bytes)?;

    let file = ElfBytes::<AnyEndian>::minimal_parse(bytes)
        .map_err(|e| LoadError::Parse(e.to_string()))?;
    let ehdr = file.ehdr;

    if ehdr.e_machine != EM_MIPS {
        return Err(LoadError::NotMips);
    }
    if ehdr.e_type != ET_EXEC {
        return Err(LoadError::NotExecutable);
    }
    if ehdr.version != EV_CURRENT as u32 {
        return Err(LoadError::BadVersion);
    }

    let mut vm = VirtualMemory::new();
    let segments = file
        .segments()
        .ok_or_else(|| LoadError::Parse("file has no program headers".into()))?;

    for phdr in segments.iter() {
        if phdr.p_type != PT_LOAD || phdr.p_memsz == 0 {
            continue;
        }
        let data = file
            .segment_data(&phdr)
            .map_err(|e| LoadError::Parse(e.to_string()))?;
        let mut region = Region::new(phdr.p_vaddr as u32, align_up4(phdr.p_memsz as u32));
        region.load_bytes(data);
        map_checked(&mut vm, region)?;
    }

    map_checked(&mut vm, Region::new(STACK_BASE, STACK_LEN))?;

    let mut cpu = CpuContext::new();
    cpu.pc = ehdr.e_entry as u32;
    cpu.set_reg(REG_SP, STACK_BASE.wrapping_add(STACK_LEN) - 4);

    Ok(LoadedImage { vm, cpu })
}

fn align_up4(n: u32) -> u32 {
    if n == 0 {
        4
    } else {
        (n + 3) & !3
    }
}

fn map_checked(vm: &mut VirtualMemory, region: Region) -> Result<(), LoadError> {
    let overlaps = vm.regions().iter().any(|r| {
        region.base() < r.base().wrapping_add(r.len())
            && r.base() < region.base().wrapping_add(region.len())
    });
    if overlaps {
        return Err(LoadError::OverlappingRegion);
    }
    vm.map(region);
    Ok(())
}

fn validate_ident(bytes: &[u8]) -> Result<(), LoadError> {
    const ELFMAG: &[u8; 4] = b"\x7fELF";
    const ELFCLASS32: u8 = 1;
    const ELFDATA2LSB: u8 = 1;

    if bytes.len() < 16 || &bytes[0..4] != ELFMAG {
        return Err(LoadError::BadMagic);
    }
    if bytes[4] != ELFCLASS32 {
        return Err(LoadError::NotClass32);
    }
    if bytes[5] != ELFDATA2LSB {
        return Err(LoadError::NotLittleEndian);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_magic() {
        let bytes = vec![0u8; 64];
        assert!(matches!(validate_ident(&bytes), Err(LoadError::BadMagic)));
    }

    #[test]
    fn rejects_wrong_class() {
        let mut bytes = vec![0u8; 64];
        bytes[0..4].copy_from_slice(b"\x7fELF");
        bytes[4] = 2; // ELFCLASS64
        bytes[5] = 1;
        assert!(matches!(validate_ident(&bytes), Err(LoadError::NotClass32)));
    }

    #[test]
    fn rejects_big_endian() {
        let mut bytes = vec![0u8; 64];
        bytes[0..4].copy_from_slice(b"\x7fELF");
        bytes[4] = 1;
        bytes[5] = 2; // ELFDATA2MSB
        assert!(matches!(
            validate_ident(&bytes),
            Err(LoadError::NotLittleEndian)
        ));
    }
}
