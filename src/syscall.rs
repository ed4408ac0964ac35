//! Syscall handling (spec §4.6)
//!
//! Dispatches on `$v0` the way the teacher's `hart/platform/eei.rs`
//! dispatches an ECALL on `a7`: one function per call number, reading
//! its arguments out of the conventional argument registers and doing
//! host I/O directly against stdin/stdout. Unknown call numbers are
//! ignored (spec §4.6), matching `original_source/sim/sim.c`'s
//! `do_syscall` falling through its `switch` with no default case.

use std::io::{self, Write};

use crate::cpu::CpuContext;
use crate::error::Fault;
use crate::exec::StepOutcome;
use crate::memory::VirtualMemory;
use crate::opcodes::{
    REG_A0, REG_A1, REG_V0, SYS_EXIT, SYS_PRINT_INT, SYS_PRINT_STRING, SYS_READ_INT,
    SYS_READ_STRING,
};

/// Handle the syscall selected by `$v0`, per spec §4.6.
pub fn handle(cpu: &mut CpuContext, vm: &mut VirtualMemory) -> Result<StepOutcome, Fault> {
    match cpu.reg(REG_V0) {
        SYS_PRINT_INT => {
            println!("{}", cpu.reg(REG_A0) as i32);
            let _ = io::stdout().flush();
            Ok(StepOutcome::Continue)
        }
        SYS_PRINT_STRING => {
            print_c_string(cpu, vm)?;
            Ok(StepOutcome::Continue)
        }
        SYS_READ_INT => {
            let mut line = String::new();
            io::stdin().read_line(&mut line).unwrap_or(0);
            let value: i32 = line.trim().parse().unwrap_or(0);
            cpu.set_reg(REG_V0, value as u32);
            Ok(StepOutcome::Continue)
        }
        SYS_READ_STRING => {
            read_into_buffer(cpu, vm)?;
            Ok(StepOutcome::Continue)
        }
        SYS_EXIT => Ok(StepOutcome::Exit(0)),
        _ => Ok(StepOutcome::Continue),
    }
}

/// `$a0` points at a NUL-terminated string; print it to stdout.
fn print_c_string(cpu: &CpuContext, vm: &VirtualMemory) -> Result<(), Fault> {
    let mut addr = cpu.reg(REG_A0);
    let mut out = io::stdout();
    loop {
        let byte = vm.read_byte(addr)?;
        if byte == 0 {
            break;
        }
        let _ = out.write_all(&[byte]);
        addr = addr.wrapping_add(1);
    }
    let _ = out.flush();
    Ok(())
}

/// `$a0` is the destination buffer, `$a1` its maximum length (including
/// the terminating NUL). Reads one line from stdin.
fn read_into_buffer(cpu: &CpuContext, vm: &mut VirtualMemory) -> Result<(), Fault> {
    let addr = cpu.reg(REG_A0);
    let max_len = cpu.reg(REG_A1) as usize;
    let mut line = String::new();
    io::stdin().read_line(&mut line).unwrap_or(0);
    let line = line.trim_end_matches('\n');
    let capacity = max_len.saturating_sub(1);
    for (i, byte) in line.as_bytes().iter().take(capacity).enumerate() {
        vm.write_byte(addr.wrapping_add(i as u32), *byte)?;
    }
    let written = line.len().min(capacity);
    vm.write_byte(addr.wrapping_add(written as u32), 0)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Region;

    #[test]
    fn exit_syscall_requests_shutdown() {
        let mut cpu = CpuContext::new();
        cpu.set_reg(REG_V0, SYS_EXIT);
        let mut vm = VirtualMemory::new();
        assert_eq!(handle(&mut cpu, &mut vm), Ok(StepOutcome::Exit(0)));
    }

    #[test]
    fn unknown_syscall_is_ignored() {
        let mut cpu = CpuContext::new();
        cpu.set_reg(REG_V0, 999);
        let mut vm = VirtualMemory::new();
        assert_eq!(handle(&mut cpu, &mut vm), Ok(StepOutcome::Continue));
    }

    #[test]
    fn print_string_reads_until_nul() {
        let mut cpu = CpuContext::new();
        cpu.set_reg(REG_V0, SYS_PRINT_STRING);
        cpu.set_reg(REG_A0, 0x1000);
        let mut vm = VirtualMemory::new();
        let mut region = Region::new(0x1000, 8);
        region.load_bytes(b"hi\0\0\0\0\0\0");
        vm.map(region);
        assert_eq!(handle(&mut cpu, &mut vm), Ok(StepOutcome::Continue));
    }
}
