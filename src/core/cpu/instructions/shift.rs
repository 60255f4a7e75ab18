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
use crate::core::error::Result;

impl CPU {
    // === Shift Instructions ===

    /// SLL: Shift Left Logical
    ///
    /// `SLL r0, r0, 0` is the canonical NOP.
    ///
    /// Format: sll rd, rt, shamt
    /// Operation: rd = rt << shamt
    pub(in crate::core::cpu) fn op_sll(&mut self, instruction: Instruction) -> Result<()> {
        let r = instruction.register();
        self.set_reg(r.rd(), self.reg(r.rt()) << r.shamt());
        Ok(())
    }

    /// SRL: Shift Right Logical (zero fill)
    pub(in crate::core::cpu) fn op_srl(&mut self, instruction: Instruction) -> Result<()> {
        let r = instruction.register();
        self.set_reg(r.rd(), self.reg(r.rt()) >> r.shamt());
        Ok(())
    }

    /// SRA: Shift Right Arithmetic (sign fill)
    pub(in crate::core::cpu) fn op_sra(&mut self, instruction: Instruction) -> Result<()> {
        let r = instruction.register();
        let value = (self.reg(r.rt()) as i32) >> r.shamt();
        self.set_reg(r.rd(), value as u32);
        Ok(())
    }

    /// SLLV: Shift Left Logical Variable
    ///
    /// Only the low 5 bits of rs are used as the shift amount.
    ///
    /// Format: sllv rd, rt, rs
    /// Operation: rd = rt << (rs & 0x1F)
    pub(in crate::core::cpu) fn op_sllv(&mut self, instruction: Instruction) -> Result<()> {
        let r = instruction.register();
        let shift = self.reg(r.rs()) & 0x1F;
        self.set_reg(r.rd(), self.reg(r.rt()) << shift);
        Ok(())
    }

    /// SRLV: Shift Right Logical Variable
    pub(in crate::core::cpu) fn op_srlv(&mut self, instruction: Instruction) -> Result<()> {
        let r = instruction.register();
        let shift = self.reg(r.rs()) & 0x1F;
        self.set_reg(r.rd(), self.reg(r.rt()) >> shift);
        Ok(())
    }

    /// SRAV: Shift Right Arithmetic Variable
    pub(in crate::core::cpu) fn op_srav(&mut self, instruction: Instruction) -> Result<()> {
        let r = instruction.register();
        let shift = self.reg(r.rs()) & 0x1F;
        let value = (self.reg(r.rt()) as i32) >> shift;
        self.set_reg(r.rd(), value as u32);
        Ok(())
    }
}
