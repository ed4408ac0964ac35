//! Opcode, function, and register-index constants
//!
//! Named constants for the primary opcode field, the R-type `func`
//! field, and the REGIMM `rt` sub-opcode, grounded on
//! `original_source/sim/sim.h`'s `enum opcodes`/`enum functions` and
//! on the teacher's `OP_*`/`FUNCT3_*` naming convention
//! (`riscvemu/src/instr/opcodes.rs`).

// Primary opcodes
pub const OP_RTYPE: u8 = 0x00;
pub const OP_REGIMM: u8 = 0x01;
pub const OP_J: u8 = 0x02;
pub const OP_JAL: u8 = 0x03;
pub const OP_BEQ: u8 = 0x04;
pub const OP_BNE: u8 = 0x05;
pub const OP_BLEZ: u8 = 0x06;
pub const OP_BGTZ: u8 = 0x07;
pub const OP_ADDI: u8 = 0x08;
pub const OP_ADDIU: u8 = 0x09;
pub const OP_SLTI: u8 = 0x0a;
pub const OP_SLTIU: u8 = 0x0b;
pub const OP_ANDI: u8 = 0x0c;
pub const OP_ORI: u8 = 0x0d;
pub const OP_XORI: u8 = 0x0e;
pub const OP_LUI: u8 = 0x0f;
pub const OP_LB: u8 = 0x20;
pub const OP_LW: u8 = 0x23;
pub const OP_SB: u8 = 0x28;
pub const OP_SW: u8 = 0x2b;

// R-type function codes (opcode == OP_RTYPE)
pub const FUNC_SLL: u8 = 0x00;
pub const FUNC_SRL: u8 = 0x02;
pub const FUNC_SRA: u8 = 0x03;
pub const FUNC_SLLV: u8 = 0x04;
pub const FUNC_SRLV: u8 = 0x06;
pub const FUNC_SRAV: u8 = 0x07;
pub const FUNC_JR: u8 = 0x08;
pub const FUNC_SYSCALL: u8 = 0x0c;
pub const FUNC_MFHI: u8 = 0x10;
pub const FUNC_MFLO: u8 = 0x12;
pub const FUNC_MULT: u8 = 0x18;
pub const FUNC_MULTU: u8 = 0x19;
pub const FUNC_DIV: u8 = 0x1a;
pub const FUNC_DIVU: u8 = 0x1b;
pub const FUNC_ADD: u8 = 0x20;
pub const FUNC_ADDU: u8 = 0x21;
pub const FUNC_SUB: u8 = 0x22;
pub const FUNC_SUBU: u8 = 0x23;
pub const FUNC_AND: u8 = 0x24;
pub const FUNC_OR: u8 = 0x25;
pub const FUNC_XOR: u8 = 0x26;
pub const FUNC_SLT: u8 = 0x2a;
pub const FUNC_SLTU: u8 = 0x2b;

// REGIMM rt sub-opcodes (opcode == OP_REGIMM)
pub const RT_BLTZ: u8 = 0x00;
pub const RT_BGEZ: u8 = 0x01;
pub const RT_BLTZAL: u8 = 0x10;
pub const RT_BGEZAL: u8 = 0x11;

// Magic register indices
pub const REG_ZERO: u8 = 0;
pub const REG_V0: u8 = 2;
pub const REG_A0: u8 = 4;
pub const REG_A1: u8 = 5;
pub const REG_SP: u8 = 29;
pub const REG_RA: u8 = 31;

/// Conventional MIPS register names, indexed by register number.
pub const REG_NAMES: [&str; 32] = [
    "zero", "at", "v0", "v1", "a0", "a1", "a2", "a3", "t0", "t1", "t2", "t3", "t4", "t5", "t6",
    "t7", "s0", "s1", "s2", "s3", "s4", "s5", "s6", "s7", "t8", "t9", "k0", "k1", "gp", "sp",
    "fp", "ra",
];

// Syscall numbers (spec §4.6)
pub const SYS_PRINT_INT: u32 = 1;
pub const SYS_PRINT_STRING: u32 = 4;
pub const SYS_READ_INT: u32 = 5;
pub const SYS_READ_STRING: u32 = 8;
pub const SYS_EXIT: u32 = 10;

/// Base virtual address and length of the stack region (spec §6).
pub const STACK_BASE: u32 = 0xC000_0000;
pub const STACK_LEN: u32 = 0x8000;
