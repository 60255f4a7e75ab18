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

use super::super::decode::Instruction;
use super::super::CPU;
use crate::core::error::{EmulatorError, Result};

impl CPU {
    // === Arithmetic Instructions ===

    /// ADD: Add (with overflow exception)
    ///
    /// Adds two registers with signed overflow detection.
    /// On overflow rd is left untouched and an Overflow trap is raised.
    ///
    /// Format: add rd, rs, rt
    /// Operation: rd = rs + rt
    pub(in crate::core::cpu) fn op_add(&mut self, instruction: Instruction) -> Result<()> {
        let r = instruction.register();
        let a = self.reg(r.rs()) as i32;
        let b = self.reg(r.rt()) as i32;

        let result = a.checked_add(b).ok_or(EmulatorError::Overflow {
            pc: self.current_pc,
        })?;
        self.set_reg(r.rd(), result as u32);
        Ok(())
    }

    /// ADDU: Add Unsigned (no overflow exception)
    ///
    /// Format: addu rd, rs, rt
    /// Operation: rd = rs + rt (modulo 2^32)
    pub(in crate::core::cpu) fn op_addu(&mut self, instruction: Instruction) -> Result<()> {
        let r = instruction.register();
        let result = self.reg(r.rs()).wrapping_add(self.reg(r.rt()));
        self.set_reg(r.rd(), result);
        Ok(())
    }

    /// ADDI: Add Immediate (with overflow exception)
    ///
    /// Adds a sign-extended immediate value to a register with overflow
    /// detection. On overflow rt keeps its previous value.
    ///
    /// Format: addi rt, rs, imm
    /// Operation: rt = rs + sign_extend(imm)
    ///
    /// # Example
    ///
    /// ```text
    /// r1 = 0x7FFFFFFF
    /// ADDI r1, r1, 0x7FFF   # Overflow, r1 unchanged
    /// ```
    pub(in crate::core::cpu) fn op_addi(&mut self, instruction: Instruction) -> Result<()> {
        let i = instruction.immediate();
        let a = self.reg(i.rs()) as i32;
        let imm = i.imm_se() as i32;

        let result = a.checked_add(imm).ok_or(EmulatorError::Overflow {
            pc: self.current_pc,
        })?;
        self.set_reg(i.rt(), result as u32);
        Ok(())
    }

    /// ADDIU: Add Immediate Unsigned (no overflow exception)
    ///
    /// Despite the name "unsigned", the immediate is sign-extended.
    ///
    /// Format: addiu rt, rs, imm
    /// Operation: rt = rs + sign_extend(imm)
    pub(in crate::core::cpu) fn op_addiu(&mut self, instruction: Instruction) -> Result<()> {
        let i = instruction.immediate();
        let result = self.reg(i.rs()).wrapping_add(i.imm_se());
        self.set_reg(i.rt(), result);
        Ok(())
    }

    /// SUB: Subtract (with overflow exception)
    ///
    /// Format: sub rd, rs, rt
    /// Operation: rd = rs - rt
    pub(in crate::core::cpu) fn op_sub(&mut self, instruction: Instruction) -> Result<()> {
        let r = instruction.register();
        let a = self.reg(r.rs()) as i32;
        let b = self.reg(r.rt()) as i32;

        let result = a.checked_sub(b).ok_or(EmulatorError::Overflow {
            pc: self.current_pc,
        })?;
        self.set_reg(r.rd(), result as u32);
        Ok(())
    }

    /// SUBU: Subtract Unsigned (no overflow exception)
    pub(in crate::core::cpu) fn op_subu(&mut self, instruction: Instruction) -> Result<()> {
        let r = instruction.register();
        let result = self.reg(r.rs()).wrapping_sub(self.reg(r.rt()));
        self.set_reg(r.rd(), result);
        Ok(())
    }

    /// SLT: Set on Less Than (signed)
    ///
    /// Format: slt rd, rs, rt
    /// Operation: rd = (rs < rt) ? 1 : 0
    pub(in crate::core::cpu) fn op_slt(&mut self, instruction: Instruction) -> Result<()> {
        let r = instruction.register();
        let result = (self.reg(r.rs()) as i32) < (self.reg(r.rt()) as i32);
        self.set_reg(r.rd(), result as u32);
        Ok(())
    }

    /// SLTU: Set on Less Than Unsigned
    pub(in crate::core::cpu) fn op_sltu(&mut self, instruction: Instruction) -> Result<()> {
        let r = instruction.register();
        let result = self.reg(r.rs()) < self.reg(r.rt());
        self.set_reg(r.rd(), result as u32);
        Ok(())
    }

    /// SLTI: Set on Less Than Immediate (signed)
    ///
    /// Format: slti rt, rs, imm
    /// Operation: rt = (rs < sign_extend(imm)) ? 1 : 0
    pub(in crate::core::cpu) fn op_slti(&mut self, instruction: Instruction) -> Result<()> {
        let i = instruction.immediate();
        let result = (self.reg(i.rs()) as i32) < (i.imm_se() as i32);
        self.set_reg(i.rt(), result as u32);
        Ok(())
    }

    /// SLTIU: Set on Less Than Immediate Unsigned
    ///
    /// The immediate is sign-extended, then both operands are compared as
    /// unsigned values.
    ///
    /// Format: sltiu rt, rs, imm
    /// Operation: rt = (rs < sign_extend(imm)) ? 1 : 0 (unsigned compare)
    pub(in crate::core::cpu) fn op_sltiu(&mut self, instruction: Instruction) -> Result<()> {
        let i = instruction.immediate();
        let result = self.reg(i.rs()) < i.imm_se();
        self.set_reg(i.rt(), result as u32);
        Ok(())
    }
}
