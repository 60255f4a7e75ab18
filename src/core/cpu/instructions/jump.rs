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
    // === Jump Instructions ===

    /// J: Jump
    ///
    /// The target keeps the upper 4 bits of the delay slot address.
    ///
    /// Format: j target
    /// Operation: PC = (delay_slot & 0xF0000000) | (target << 2)
    pub(in crate::core::cpu) fn op_j(&mut self, instruction: Instruction) -> Result<()> {
        let target = instruction.jump().target();
        self.next_pc = (self.pc & 0xF000_0000) | (target << 2);
        self.branch_taken = true;
        Ok(())
    }

    /// JAL: Jump And Link
    ///
    /// r31 receives the address after the delay slot.
    pub(in crate::core::cpu) fn op_jal(&mut self, instruction: Instruction) -> Result<()> {
        self.set_reg(31, self.next_pc);
        self.op_j(instruction)
    }

    /// JR: Jump Register
    ///
    /// A misaligned target faults on the following fetch.
    pub(in crate::core::cpu) fn op_jr(&mut self, instruction: Instruction) -> Result<()> {
        self.next_pc = self.reg(instruction.register().rs());
        self.branch_taken = true;
        Ok(())
    }

    /// JALR: Jump And Link Register
    ///
    /// Format: jalr rd, rs
    /// Operation: rd = delay_slot + 4; PC = rs
    pub(in crate::core::cpu) fn op_jalr(&mut self, instruction: Instruction) -> Result<()> {
        let r = instruction.register();
        let target = self.reg(r.rs());
        self.set_reg(r.rd(), self.next_pc);
        self.next_pc = target;
        self.branch_taken = true;
        Ok(())
    }
}
