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
    // === Branch Instructions ===

    /// BLTZ / BLTZAL: Branch on Less Than Zero (and Link)
    ///
    /// The linking form writes the return address to r31 whether or not
    /// the branch is taken.
    ///
    /// Format: bltz rs, offset
    /// Operation: if (rs < 0) PC = delay_slot + (sign_extend(offset) << 2)
    pub(in crate::core::cpu) fn op_bltz(&mut self, instruction: Instruction, link: bool) -> Result<()> {
        let i = instruction.immediate();
        let taken = (self.reg(i.rs()) as i32) < 0;
        if link {
            self.set_reg(31, self.next_pc);
        }
        if taken {
            self.branch(i.imm_se());
        }
        Ok(())
    }

    /// BGEZ / BGEZAL: Branch on Greater Than or Equal to Zero (and Link)
    pub(in crate::core::cpu) fn op_bgez(&mut self, instruction: Instruction, link: bool) -> Result<()> {
        let i = instruction.immediate();
        let taken = (self.reg(i.rs()) as i32) >= 0;
        if link {
            self.set_reg(31, self.next_pc);
        }
        if taken {
            self.branch(i.imm_se());
        }
        Ok(())
    }

    /// BEQ: Branch on Equal
    ///
    /// Format: beq rs, rt, offset
    /// Operation: if (rs == rt) PC = delay_slot + (sign_extend(offset) << 2)
    pub(in crate::core::cpu) fn op_beq(&mut self, instruction: Instruction) -> Result<()> {
        let i = instruction.immediate();
        if self.reg(i.rs()) == self.reg(i.rt()) {
            self.branch(i.imm_se());
        }
        Ok(())
    }

    /// BNE: Branch on Not Equal
    pub(in crate::core::cpu) fn op_bne(&mut self, instruction: Instruction) -> Result<()> {
        let i = instruction.immediate();
        if self.reg(i.rs()) != self.reg(i.rt()) {
            self.branch(i.imm_se());
        }
        Ok(())
    }

    /// BLEZ: Branch on Less Than or Equal to Zero
    pub(in crate::core::cpu) fn op_blez(&mut self, instruction: Instruction) -> Result<()> {
        let i = instruction.immediate();
        if (self.reg(i.rs()) as i32) <= 0 {
            self.branch(i.imm_se());
        }
        Ok(())
    }

    /// BGTZ: Branch on Greater Than Zero
    pub(in crate::core::cpu) fn op_bgtz(&mut self, instruction: Instruction) -> Result<()> {
        let i = instruction.immediate();
        if (self.reg(i.rs()) as i32) > 0 {
            self.branch(i.imm_se());
        }
        Ok(())
    }

    /// Execute a branch (sets next_pc)
    ///
    /// The offset is the sign-extended immediate in words. While an
    /// instruction executes `self.pc` already holds the delay slot address,
    /// which is the base MIPS branches are relative to.
    pub(in crate::core::cpu) fn branch(&mut self, offset: u32) {
        self.next_pc = self.pc.wrapping_add(offset << 2);
        self.branch_taken = true;
    }
}
