// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Instruction decoding
//!
//! A MIPS instruction word has no tag saying which layout it uses; the
//! opcode being dispatched decides which view applies. [`Instruction`] wraps
//! the raw word and hands out the three views without copying or validating
//! anything.
//!
//! Opcode tables are written in octal, the notation the R3000A manual uses.

use std::fmt;

/// Primary opcodes (bits [31:26])
pub mod op {
    pub const SPECIAL: u8 = 0o00;
    pub const BCOND: u8 = 0o01;
    pub const J: u8 = 0o02;
    pub const JAL: u8 = 0o03;
    pub const BEQ: u8 = 0o04;
    pub const BNE: u8 = 0o05;
    pub const BLEZ: u8 = 0o06;
    pub const BGTZ: u8 = 0o07;
    pub const ADDI: u8 = 0o10;
    pub const ADDIU: u8 = 0o11;
    pub const SLTI: u8 = 0o12;
    pub const SLTIU: u8 = 0o13;
    pub const ANDI: u8 = 0o14;
    pub const ORI: u8 = 0o15;
    pub const XORI: u8 = 0o16;
    pub const LUI: u8 = 0o17;
    pub const COP0: u8 = 0o20;
    pub const COP1: u8 = 0o21;
    pub const COP2: u8 = 0o22;
    pub const COP3: u8 = 0o23;
    pub const LB: u8 = 0o40;
    pub const LH: u8 = 0o41;
    pub const LWL: u8 = 0o42;
    pub const LW: u8 = 0o43;
    pub const LBU: u8 = 0o44;
    pub const LHU: u8 = 0o45;
    pub const LWR: u8 = 0o46;
    pub const SB: u8 = 0o50;
    pub const SH: u8 = 0o51;
    pub const SWL: u8 = 0o52;
    pub const SW: u8 = 0o53;
    pub const SWR: u8 = 0o56;
    pub const LWC0: u8 = 0o60;
    pub const LWC1: u8 = 0o61;
    pub const LWC2: u8 = 0o62;
    pub const LWC3: u8 = 0o63;
    pub const SWC0: u8 = 0o70;
    pub const SWC1: u8 = 0o71;
    pub const SWC2: u8 = 0o72;
    pub const SWC3: u8 = 0o73;
}

/// SPECIAL function codes (bits [5:0])
pub mod funct {
    pub const SLL: u8 = 0o00;
    pub const SRL: u8 = 0o02;
    pub const SRA: u8 = 0o03;
    pub const SLLV: u8 = 0o04;
    pub const SRLV: u8 = 0o06;
    pub const SRAV: u8 = 0o07;
    pub const JR: u8 = 0o10;
    pub const JALR: u8 = 0o11;
    pub const SYSCALL: u8 = 0o14;
    pub const BREAK: u8 = 0o15;
    pub const MFHI: u8 = 0o20;
    pub const MTHI: u8 = 0o21;
    pub const MFLO: u8 = 0o22;
    pub const MTLO: u8 = 0o23;
    pub const MULT: u8 = 0o30;
    pub const MULTU: u8 = 0o31;
    pub const DIV: u8 = 0o32;
    pub const DIVU: u8 = 0o33;
    pub const ADD: u8 = 0o40;
    pub const ADDU: u8 = 0o41;
    pub const SUB: u8 = 0o42;
    pub const SUBU: u8 = 0o43;
    pub const AND: u8 = 0o44;
    pub const OR: u8 = 0o45;
    pub const XOR: u8 = 0o46;
    pub const NOR: u8 = 0o47;
    pub const SLT: u8 = 0o52;
    pub const SLTU: u8 = 0o53;
}

/// BCOND selectors (rt field of opcode 0o01)
pub mod bcond {
    pub const BLTZ: u8 = 0o00;
    pub const BGEZ: u8 = 0o01;
    pub const BLTZAL: u8 = 0o20;
    pub const BGEZAL: u8 = 0o21;
}

/// Raw 32-bit instruction word
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct Instruction(pub u32);

impl Instruction {
    /// Build an immediate-form (I-type) instruction
    ///
    /// # Example
    ///
    /// ```
    /// use psrx_core::core::cpu::decode::{op, Instruction};
    ///
    /// // ADDI r2, r1, 100
    /// let instr = Instruction::immediate_form(op::ADDI, 1, 2, 100);
    /// assert_eq!(instr.0, 0x20220064);
    /// ```
    pub const fn immediate_form(opcode: u8, rs: u8, rt: u8, imm: u16) -> Self {
        Instruction(
            ((opcode as u32 & 0x3F) << 26)
                | ((rs as u32 & 0x1F) << 21)
                | ((rt as u32 & 0x1F) << 16)
                | imm as u32,
        )
    }

    /// Build a register-form (R-type) instruction
    pub const fn register_form(opcode: u8, rs: u8, rt: u8, rd: u8, shamt: u8, funct: u8) -> Self {
        Instruction(
            ((opcode as u32 & 0x3F) << 26)
                | ((rs as u32 & 0x1F) << 21)
                | ((rt as u32 & 0x1F) << 16)
                | ((rd as u32 & 0x1F) << 11)
                | ((shamt as u32 & 0x1F) << 6)
                | (funct as u32 & 0x3F),
        )
    }

    /// Build a jump-form (J-type) instruction
    pub const fn jump_form(opcode: u8, target: u32) -> Self {
        Instruction(((opcode as u32 & 0x3F) << 26) | (target & 0x03FF_FFFF))
    }

    /// Primary opcode (bits [31:26])
    #[inline(always)]
    pub fn opcode(self) -> u8 {
        (self.0 >> 26) as u8
    }

    /// View as `| op | rs | rt | immediate |`
    #[inline(always)]
    pub fn immediate(self) -> ImmediateInstruction {
        ImmediateInstruction(self.0)
    }

    /// View as `| op | rs | rt | rd | shamt | funct |`
    #[inline(always)]
    pub fn register(self) -> RegisterInstruction {
        RegisterInstruction(self.0)
    }

    /// View as `| op | target |`
    #[inline(always)]
    pub fn jump(self) -> JumpInstruction {
        JumpInstruction(self.0)
    }
}

impl fmt::Debug for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Instruction(0x{:08X})", self.0)
    }
}

impl From<u32> for Instruction {
    fn from(word: u32) -> Self {
        Instruction(word)
    }
}

/// I-type view
///
/// Format: | op (6) | rs (5) | rt (5) | immediate (16) |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImmediateInstruction(u32);

impl ImmediateInstruction {
    #[inline(always)]
    pub fn op(self) -> u8 {
        (self.0 >> 26) as u8
    }

    #[inline(always)]
    pub fn rs(self) -> u8 {
        ((self.0 >> 21) & 0x1F) as u8
    }

    #[inline(always)]
    pub fn rt(self) -> u8 {
        ((self.0 >> 16) & 0x1F) as u8
    }

    /// Raw 16-bit immediate
    #[inline(always)]
    pub fn imm(self) -> u16 {
        self.0 as u16
    }

    /// Immediate sign-extended to 32 bits
    #[inline(always)]
    pub fn imm_se(self) -> u32 {
        self.0 as u16 as i16 as i32 as u32
    }
}

/// R-type view
///
/// Format: | op (6) | rs (5) | rt (5) | rd (5) | shamt (5) | funct (6) |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterInstruction(u32);

impl RegisterInstruction {
    #[inline(always)]
    pub fn op(self) -> u8 {
        (self.0 >> 26) as u8
    }

    #[inline(always)]
    pub fn rs(self) -> u8 {
        ((self.0 >> 21) & 0x1F) as u8
    }

    #[inline(always)]
    pub fn rt(self) -> u8 {
        ((self.0 >> 16) & 0x1F) as u8
    }

    #[inline(always)]
    pub fn rd(self) -> u8 {
        ((self.0 >> 11) & 0x1F) as u8
    }

    #[inline(always)]
    pub fn shamt(self) -> u8 {
        ((self.0 >> 6) & 0x1F) as u8
    }

    #[inline(always)]
    pub fn funct(self) -> u8 {
        (self.0 & 0x3F) as u8
    }
}

/// J-type view
///
/// Format: | op (6) | target (26) |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JumpInstruction(u32);

impl JumpInstruction {
    #[inline(always)]
    pub fn op(self) -> u8 {
        (self.0 >> 26) as u8
    }

    #[inline(always)]
    pub fn target(self) -> u32 {
        self.0 & 0x03FF_FFFF
    }
}
