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

//! CPU instruction implementations
//!
//! This module contains all MIPS R3000A instruction implementations,
//! organized by instruction type. Dispatch follows the octal opcode tables
//! of the R3000A manual.

use super::decode::{bcond, funct, op, Instruction};
use super::{ExceptionCause, CPU};
use crate::core::error::{EmulatorError, Result};
use crate::core::memory::Bus;

// Instruction modules organized by type
mod arithmetic;
mod branch;
mod cop;
mod exception;
mod jump;
mod load;
mod logical;
mod multiply;
mod shift;
mod store;

/// Error for an opcode or function field with no instruction behind it
fn reserved(instruction: Instruction, pc: u32) -> EmulatorError {
    log::warn!("Reserved instruction {:?} at PC=0x{:08X}", instruction, pc);
    EmulatorError::Exception(ExceptionCause::ReservedInstruction)
}

impl CPU {
    /// Decode and execute one instruction
    ///
    /// This method dispatches the instruction to the appropriate handler
    /// based on its opcode (upper 6 bits).
    ///
    /// # Arguments
    ///
    /// * `instruction` - The instruction word
    /// * `bus` - Memory bus for memory operations
    ///
    /// # Returns
    ///
    /// Ok(()) on success, or the trap/fault the instruction raised. Nothing
    /// is written when an error is returned.
    pub(super) fn execute_instruction(
        &mut self,
        instruction: Instruction,
        bus: &mut Bus,
    ) -> Result<()> {
        match instruction.opcode() {
            op::SPECIAL => self.execute_special(instruction),
            op::BCOND => self.execute_bcond(instruction),
            op::J => self.op_j(instruction),                 // J
            op::JAL => self.op_jal(instruction),             // JAL
            op::BEQ => self.op_beq(instruction),             // BEQ
            op::BNE => self.op_bne(instruction),             // BNE
            op::BLEZ => self.op_blez(instruction),           // BLEZ
            op::BGTZ => self.op_bgtz(instruction),           // BGTZ
            op::ADDI => self.op_addi(instruction),           // ADDI
            op::ADDIU => self.op_addiu(instruction),         // ADDIU
            op::SLTI => self.op_slti(instruction),           // SLTI
            op::SLTIU => self.op_sltiu(instruction),         // SLTIU
            op::ANDI => self.op_andi(instruction),           // ANDI
            op::ORI => self.op_ori(instruction),             // ORI
            op::XORI => self.op_xori(instruction),           // XORI
            op::LUI => self.op_lui(instruction),             // LUI
            op::COP0..=op::COP3 => self.execute_cop(instruction, bus),
            op::LB => self.op_lb(instruction, bus),          // LB
            op::LH => self.op_lh(instruction, bus),          // LH
            op::LWL => self.op_lwl(instruction, bus),        // LWL
            op::LW => self.op_lw(instruction, bus),          // LW
            op::LBU => self.op_lbu(instruction, bus),        // LBU
            op::LHU => self.op_lhu(instruction, bus),        // LHU
            op::LWR => self.op_lwr(instruction, bus),        // LWR
            op::SB => self.op_sb(instruction, bus),          // SB
            op::SH => self.op_sh(instruction, bus),          // SH
            op::SWL => self.op_swl(instruction, bus),        // SWL
            op::SW => self.op_sw(instruction, bus),          // SW
            op::SWR => self.op_swr(instruction, bus),        // SWR
            op::LWC0..=op::LWC3 | op::SWC0..=op::SWC3 => self.execute_cop(instruction, bus),
            _ => Err(reserved(instruction, self.current_pc)),
        }
    }

    /// Handle SPECIAL instructions (opcode 0o00)
    ///
    /// SPECIAL instructions use the lower 6 bits (funct field) to determine
    /// the specific operation.
    fn execute_special(&mut self, instruction: Instruction) -> Result<()> {
        match instruction.register().funct() {
            funct::SLL => self.op_sll(instruction),         // SLL
            funct::SRL => self.op_srl(instruction),         // SRL
            funct::SRA => self.op_sra(instruction),         // SRA
            funct::SLLV => self.op_sllv(instruction),       // SLLV
            funct::SRLV => self.op_srlv(instruction),       // SRLV
            funct::SRAV => self.op_srav(instruction),       // SRAV
            funct::JR => self.op_jr(instruction),           // JR
            funct::JALR => self.op_jalr(instruction),       // JALR
            funct::SYSCALL => self.op_syscall(instruction), // SYSCALL
            funct::BREAK => self.op_break(instruction),     // BREAK
            funct::MFHI => self.op_mfhi(instruction),       // MFHI
            funct::MTHI => self.op_mthi(instruction),       // MTHI
            funct::MFLO => self.op_mflo(instruction),       // MFLO
            funct::MTLO => self.op_mtlo(instruction),       // MTLO
            funct::MULT => self.op_mult(instruction),       // MULT
            funct::MULTU => self.op_multu(instruction),     // MULTU
            funct::DIV => self.op_div(instruction),         // DIV
            funct::DIVU => self.op_divu(instruction),       // DIVU
            funct::ADD => self.op_add(instruction),         // ADD
            funct::ADDU => self.op_addu(instruction),       // ADDU
            funct::SUB => self.op_sub(instruction),         // SUB
            funct::SUBU => self.op_subu(instruction),       // SUBU
            funct::AND => self.op_and(instruction),         // AND
            funct::OR => self.op_or(instruction),           // OR
            funct::XOR => self.op_xor(instruction),         // XOR
            funct::NOR => self.op_nor(instruction),         // NOR
            funct::SLT => self.op_slt(instruction),         // SLT
            funct::SLTU => self.op_sltu(instruction),       // SLTU
            _ => Err(reserved(instruction, self.current_pc)),
        }
    }

    /// Handle BCOND instructions (opcode 0o01)
    ///
    /// The rt field selects BLTZ, BGEZ, BLTZAL or BGEZAL. Like the R3000A,
    /// only bit 0 (GEZ vs LTZ) and the 0o20 link pattern are decoded.
    fn execute_bcond(&mut self, instruction: Instruction) -> Result<()> {
        let rt = instruction.immediate().rt();
        let link = rt & 0o36 == 0o20;
        if rt & 0o01 == bcond::BGEZ {
            self.op_bgez(instruction, link) // BGEZ / BGEZAL
        } else {
            self.op_bltz(instruction, link) // BLTZ / BLTZAL
        }
    }

    /// Compute the effective address `GPR[rs] + sign_extend(imm)`
    #[inline(always)]
    pub(super) fn effective_address(&self, instruction: Instruction) -> u32 {
        let i = instruction.immediate();
        self.reg(i.rs()).wrapping_add(i.imm_se())
    }
}
