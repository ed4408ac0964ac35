//! Executor: per-opcode/per-function semantics
//!
//! Each instruction shape has its own dispatcher operating on
//! `&mut CpuContext` and `&mut VirtualMemory` and returning
//! `Result<StepOutcome, Fault>`, in the shape of the teacher's
//! `execute_*` functions in
//! `riscvemu/src/hart/platform/rv32i.rs` and `rv32m.rs` — only the
//! semantics are MIPS-I's rather than RV32I's. `execute` is the
//! two-tier dispatcher described in spec §4.3: primary opcode, then
//! `func` for R-type and `rt` for REGIMM.
//!
//! Every function is responsible for leaving `cpu.pc` at the correct
//! next value itself (either `pc + 4`, a branch target, or a jump
//! target) rather than relying on the run loop to increment it
//! afterwards — this mirrors `eei.increment_pc()` being called inside
//! each of the teacher's executor functions rather than by the caller.

use crate::cpu::CpuContext;
use crate::decode::{decode, Instruction};
use crate::error::Fault;
use crate::memory::VirtualMemory;
use crate::opcodes::*;
use crate::syscall;

/// What the run loop should do after a single `step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    /// The guest requested termination (`SYSCALL 10`) or hit an
    /// unrecognized opcode/func — the run loop stops, cleanly, with
    /// this status code.
    Exit(i32),
}

fn sign_extend16(imm: u16) -> i32 {
    imm as i16 as i32
}

/// Fetch the instruction at `cpu.pc`, decode it, and execute it.
pub fn step(cpu: &mut CpuContext, vm: &mut VirtualMemory) -> Result<StepOutcome, Fault> {
    let word = vm.fetch_word(cpu.pc)?;
    let instr = decode(word);
    execute(word, instr, cpu, vm)
}

fn execute(
    word: u32,
    instr: Instruction,
    cpu: &mut CpuContext,
    vm: &mut VirtualMemory,
) -> Result<StepOutcome, Fault> {
    match instr {
        Instruction::R {
            rs,
            rt,
            rd,
            shamt,
            func,
        } => execute_rtype(word, cpu, vm, rs, rt, rd, shamt, func),
        Instruction::I { opcode, rs, rt, imm } => execute_itype(word, cpu, vm, opcode, rs, rt, imm),
        Instruction::J { opcode, addr } => {
            execute_jtype(cpu, opcode, addr);
            Ok(StepOutcome::Continue)
        }
    }
}

fn execute_rtype(
    word: u32,
    cpu: &mut CpuContext,
    vm: &mut VirtualMemory,
    rs: u8,
    rt: u8,
    rd: u8,
    shamt: u8,
    func: u8,
) -> Result<StepOutcome, Fault> {
    let pc = cpu.pc;
    let a = cpu.reg(rs);
    let b = cpu.reg(rt);

    macro_rules! advance_and_set {
        ($value:expr) => {{
            cpu.set_reg(rd, $value);
            cpu.pc = pc.wrapping_add(4);
            Ok(StepOutcome::Continue)
        }};
    }

    match func {
        FUNC_SLL => advance_and_set!(b << shamt),
        FUNC_SRL => advance_and_set!(b >> shamt),
        FUNC_SRA => advance_and_set!(((b as i32) >> shamt) as u32),
        FUNC_SLLV => advance_and_set!(b << (a & 0x1f)),
        FUNC_SRLV => advance_and_set!(b >> (a & 0x1f)),
        FUNC_SRAV => advance_and_set!(((b as i32) >> (a & 0x1f)) as u32),
        FUNC_JR => {
            cpu.pc = a;
            Ok(StepOutcome::Continue)
        }
        FUNC_SYSCALL => {
            let outcome = syscall::handle(cpu, vm)?;
            cpu.pc = pc.wrapping_add(4);
            Ok(outcome)
        }
        FUNC_MFHI => advance_and_set!(cpu.hi),
        FUNC_MFLO => advance_and_set!(cpu.lo),
        FUNC_MULT => {
            let product = (a as i32 as i64).wrapping_mul(b as i32 as i64);
            cpu.hi = (product >> 32) as u32;
            cpu.lo = product as u32;
            cpu.pc = pc.wrapping_add(4);
            Ok(StepOutcome::Continue)
        }
        FUNC_MULTU => {
            let product = (a as u64).wrapping_mul(b as u64);
            cpu.hi = (product >> 32) as u32;
            cpu.lo = product as u32;
            cpu.pc = pc.wrapping_add(4);
            Ok(StepOutcome::Continue)
        }
        FUNC_DIV => {
            if b == 0 {
                return Err(Fault::DivByZero);
            }
            let (a, b) = (a as i32, b as i32);
            cpu.lo = a.wrapping_div(b) as u32;
            cpu.hi = a.wrapping_rem(b) as u32;
            cpu.pc = pc.wrapping_add(4);
            Ok(StepOutcome::Continue)
        }
        FUNC_DIVU => {
            if b == 0 {
                return Err(Fault::DivByZero);
            }
            cpu.lo = a / b;
            cpu.hi = a % b;
            cpu.pc = pc.wrapping_add(4);
            Ok(StepOutcome::Continue)
        }
        FUNC_ADD => {
            let sum = (a as i32)
                .checked_add(b as i32)
                .ok_or(Fault::Overflow)?;
            advance_and_set!(sum as u32)
        }
        FUNC_ADDU => advance_and_set!(a.wrapping_add(b)),
        FUNC_SUB => advance_and_set!(a.wrapping_sub(b)),
        FUNC_SUBU => advance_and_set!(a.wrapping_sub(b)),
        FUNC_AND => advance_and_set!(a & b),
        FUNC_OR => advance_and_set!(a | b),
        FUNC_XOR => advance_and_set!(a ^ b),
        FUNC_SLT => advance_and_set!(((a as i32) < (b as i32)) as u32),
        FUNC_SLTU => advance_and_set!((a < b) as u32),
        _ => Err(Fault::IllegalInstruction { word }),
    }
}

fn execute_itype(
    word: u32,
    cpu: &mut CpuContext,
    vm: &mut VirtualMemory,
    opcode: u8,
    rs: u8,
    rt: u8,
    imm: u16,
) -> Result<StepOutcome, Fault> {
    let pc = cpu.pc;
    let src = cpu.reg(rs);

    macro_rules! advance_and_set {
        ($value:expr) => {{
            cpu.set_reg(rt, $value);
            cpu.pc = pc.wrapping_add(4);
            Ok(StepOutcome::Continue)
        }};
    }

    let branch = |cpu: &mut CpuContext, taken: bool| {
        cpu.pc = if taken {
            pc.wrapping_add((sign_extend16(imm) << 2) as u32)
        } else {
            pc.wrapping_add(4)
        };
    };

    match opcode {
        OP_REGIMM => {
            let signed = src as i32;
            let taken = match rt {
                RT_BLTZ | RT_BLTZAL => signed < 0,
                RT_BGEZ | RT_BGEZAL => signed >= 0,
                _ => return Err(Fault::IllegalInstruction { word }),
            };
            if rt == RT_BLTZAL || rt == RT_BGEZAL {
                cpu.set_reg(REG_RA, pc.wrapping_add(8));
            }
            branch(cpu, taken);
            Ok(StepOutcome::Continue)
        }
        OP_BEQ => {
            branch(cpu, src == cpu.reg(rt));
            Ok(StepOutcome::Continue)
        }
        OP_BNE => {
            branch(cpu, src != cpu.reg(rt));
            Ok(StepOutcome::Continue)
        }
        OP_BLEZ => {
            branch(cpu, (src as i32) <= 0);
            Ok(StepOutcome::Continue)
        }
        OP_BGTZ => {
            branch(cpu, (src as i32) > 0);
            Ok(StepOutcome::Continue)
        }
        OP_ADDI => {
            let sum = (src as i32)
                .checked_add(sign_extend16(imm))
                .ok_or(Fault::Overflow)?;
            advance_and_set!(sum as u32)
        }
        OP_ADDIU => advance_and_set!(src.wrapping_add(sign_extend16(imm) as u32)),
        OP_SLTI => advance_and_set!(((src as i32) < sign_extend16(imm)) as u32),
        OP_SLTIU => advance_and_set!((src < sign_extend16(imm) as u32) as u32),
        OP_ANDI => advance_and_set!(src & imm as u32),
        OP_ORI => advance_and_set!(src | imm as u32),
        OP_XORI => advance_and_set!(src ^ imm as u32),
        OP_LUI => advance_and_set!((imm as u32) << 16),
        OP_LB => {
            let addr = src.wrapping_add(sign_extend16(imm) as u32);
            let byte = vm.read_byte(addr)?;
            advance_and_set!(byte as i8 as i32 as u32)
        }
        OP_LW => {
            let addr = src.wrapping_add(sign_extend16(imm) as u32);
            let value = vm.fetch_word(addr)?;
            advance_and_set!(value)
        }
        OP_SB => {
            let addr = src.wrapping_add(sign_extend16(imm) as u32);
            vm.write_byte(addr, cpu.reg(rt) as u8)?;
            cpu.pc = pc.wrapping_add(4);
            Ok(StepOutcome::Continue)
        }
        OP_SW => {
            let addr = src.wrapping_add(sign_extend16(imm) as u32);
            vm.store_word(addr, cpu.reg(rt))?;
            cpu.pc = pc.wrapping_add(4);
            Ok(StepOutcome::Continue)
        }
        _ => Err(Fault::IllegalInstruction { word }),
    }
}

fn execute_jtype(cpu: &mut CpuContext, opcode: u8, addr: u32) {
    let pc = cpu.pc;
    let target = (pc & 0xF000_0000) | (addr << 2);
    if opcode == OP_JAL {
        cpu.set_reg(REG_RA, pc.wrapping_add(8));
    }
    cpu.pc = target;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_one(cpu: &mut CpuContext, vm: &mut VirtualMemory) -> StepOutcome {
        step(cpu, vm).expect("instruction should not fault")
    }

    fn rtype(func: u8, rs: u8, rt: u8, rd: u8, shamt: u8) -> u32 {
        (0u32 << 26) | ((rs as u32) << 21) | ((rt as u32) << 16) | ((rd as u32) << 11)
            | ((shamt as u32) << 6)
            | func as u32
    }

    fn itype(opcode: u8, rs: u8, rt: u8, imm: u16) -> u32 {
        ((opcode as u32) << 26) | ((rs as u32) << 21) | ((rt as u32) << 16) | imm as u32
    }

    fn program(words: &[u32]) -> VirtualMemory {
        let mut vm = VirtualMemory::new();
        let mut region = crate::memory::Region::new(0x0040_0000, 0x1000);
        let mut bytes = Vec::new();
        for w in words {
            bytes.extend_from_slice(&w.to_le_bytes());
        }
        region.load_bytes(&bytes);
        vm.map(region);
        vm
    }

    #[test]
    fn add_overflows() {
        let mut cpu = CpuContext::new();
        cpu.pc = 0x0040_0000;
        cpu.set_reg(8, 0x7fff_ffff);
        cpu.set_reg(9, 1);
        let mut vm = program(&[rtype(FUNC_ADD, 8, 9, 10, 0)]);
        assert_eq!(step(&mut cpu, &mut vm), Err(Fault::Overflow));
    }

    #[test]
    fn addu_wraps() {
        let mut cpu = CpuContext::new();
        cpu.pc = 0x0040_0000;
        cpu.set_reg(8, 0x7fff_ffff);
        cpu.set_reg(9, 1);
        let mut vm = program(&[rtype(FUNC_ADDU, 8, 9, 10, 0)]);
        run_one(&mut cpu, &mut vm);
        assert_eq!(cpu.reg(10), 0x8000_0000);
    }

    #[test]
    fn div_by_zero_faults() {
        let mut cpu = CpuContext::new();
        cpu.pc = 0x0040_0000;
        cpu.set_reg(8, 10);
        let mut vm = program(&[rtype(FUNC_DIV, 8, 0, 0, 0)]);
        assert_eq!(step(&mut cpu, &mut vm), Err(Fault::DivByZero));
    }

    #[test]
    fn slt_signed_vs_sltu_unsigned() {
        let mut cpu = CpuContext::new();
        cpu.pc = 0x0040_0000;
        cpu.set_reg(8, 0xffff_ffff); // -1 signed, huge unsigned
        cpu.set_reg(9, 1);
        let mut vm = program(&[rtype(FUNC_SLT, 8, 9, 10, 0)]);
        run_one(&mut cpu, &mut vm);
        assert_eq!(cpu.reg(10), 1);

        let mut cpu = CpuContext::new();
        cpu.pc = 0x0040_0000;
        cpu.set_reg(8, 0xffff_ffff);
        cpu.set_reg(9, 1);
        let mut vm = program(&[rtype(FUNC_SLTU, 8, 9, 10, 0)]);
        run_one(&mut cpu, &mut vm);
        assert_eq!(cpu.reg(10), 0);
    }

    #[test]
    fn branch_not_taken_advances_by_four() {
        let mut cpu = CpuContext::new();
        cpu.pc = 0x0040_0000;
        cpu.set_reg(8, 1);
        let mut vm = program(&[itype(OP_BEQ, 8, 0, 0xffff)]);
        run_one(&mut cpu, &mut vm);
        assert_eq!(cpu.pc, 0x0040_0004);
    }

    #[test]
    fn branch_taken_with_negative_one_offset_goes_back_one_word() {
        let mut cpu = CpuContext::new();
        cpu.pc = 0x0040_0000;
        let mut vm = program(&[itype(OP_BEQ, 0, 0, 0xffff)]);
        run_one(&mut cpu, &mut vm);
        assert_eq!(cpu.pc, 0x003f_fffc);
    }

    #[test]
    fn j_with_zero_addr_lands_at_pc_high_bits() {
        let mut cpu = CpuContext::new();
        cpu.pc = 0x0040_0000;
        let mut vm = program(&[(OP_J as u32) << 26]);
        run_one(&mut cpu, &mut vm);
        assert_eq!(cpu.pc, 0x0040_0000 & 0xF000_0000);
    }

    #[test]
    fn lui_then_ori_builds_constant() {
        let mut cpu = CpuContext::new();
        cpu.pc = 0x0040_0000;
        let mut vm = program(&[
            itype(OP_LUI, 0, 8, 0x1234),
            itype(OP_ORI, 8, 8, 0x5678),
        ]);
        run_one(&mut cpu, &mut vm);
        run_one(&mut cpu, &mut vm);
        assert_eq!(cpu.reg(8), 0x1234_5678);
    }

    #[test]
    fn sb_writes_only_the_targeted_byte() {
        let mut cpu = CpuContext::new();
        cpu.pc = 0x0040_0000;
        cpu.set_reg(9, 0x11);
        let mut vm = program(&[itype(OP_SB, 8, 9, 2)]);
        run_one(&mut cpu, &mut vm);
        assert_eq!(vm.fetch_word(0x0040_0000).unwrap() >> 16 & 0xff, 0x11);
    }

    #[test]
    fn illegal_rtype_func_is_fault() {
        let mut cpu = CpuContext::new();
        cpu.pc = 0x0040_0000;
        let mut vm = program(&[rtype(0x3f, 0, 0, 0, 0)]);
        let word = rtype(0x3f, 0, 0, 0, 0);
        assert_eq!(step(&mut cpu, &mut vm), Err(Fault::IllegalInstruction { word }));
    }

    #[test]
    fn write_to_zero_register_stays_zero() {
        let mut cpu = CpuContext::new();
        cpu.pc = 0x0040_0000;
        cpu.set_reg(9, 5);
        let mut vm = program(&[itype(OP_ADDIU, 9, 0, 1)]);
        run_one(&mut cpu, &mut vm);
        assert_eq!(cpu.reg(0), 0);
    }
}
