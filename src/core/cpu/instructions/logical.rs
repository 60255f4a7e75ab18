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
    // === Logical Instructions ===

    /// LUI: Load Upper Immediate
    ///
    /// Loads a 16-bit immediate value into the upper 16 bits of a register,
    /// setting the lower 16 bits to 0.
    ///
    /// Format: lui rt, imm
    /// Operation: rt = imm << 16
    pub(in crate::core::cpu) fn op_lui(&mut self, instruction: Instruction) -> Result<()> {
        let i = instruction.immediate();
        self.set_reg(i.rt(), (i.imm() as u32) << 16);
        Ok(())
    }

    /// AND: Bitwise AND
    ///
    /// Format: and rd, rs, rt
    /// Operation: rd = rs & rt
    pub(in crate::core::cpu) fn op_and(&mut self, instruction: Instruction) -> Result<()> {
        let r = instruction.register();
        self.set_reg(r.rd(), self.reg(r.rs()) & self.reg(r.rt()));
        Ok(())
    }

    /// OR: Bitwise OR
    ///
    /// Format: or rd, rs, rt
    /// Operation: rd = rs | rt
    pub(in crate::core::cpu) fn op_or(&mut self, instruction: Instruction) -> Result<()> {
        let r = instruction.register();
        self.set_reg(r.rd(), self.reg(r.rs()) | self.reg(r.rt()));
        Ok(())
    }

    /// XOR: Bitwise exclusive OR
    pub(in crate::core::cpu) fn op_xor(&mut self, instruction: Instruction) -> Result<()> {
        let r = instruction.register();
        self.set_reg(r.rd(), self.reg(r.rs()) ^ self.reg(r.rt()));
        Ok(())
    }

    /// NOR: Bitwise NOT OR
    ///
    /// Format: nor rd, rs, rt
    /// Operation: rd = !(rs | rt)
    pub(in crate::core::cpu) fn op_nor(&mut self, instruction: Instruction) -> Result<()> {
        let r = instruction.register();
        self.set_reg(r.rd(), !(self.reg(r.rs()) | self.reg(r.rt())));
        Ok(())
    }

    /// ANDI: Bitwise AND Immediate
    ///
    /// The immediate is zero-extended.
    ///
    /// Format: andi rt, rs, imm
    /// Operation: rt = rs & zero_extend(imm)
    pub(in crate::core::cpu) fn op_andi(&mut self, instruction: Instruction) -> Result<()> {
        let i = instruction.immediate();
        self.set_reg(i.rt(), self.reg(i.rs()) & i.imm() as u32);
        Ok(())
    }

    /// ORI: Bitwise OR Immediate (zero-extended)
    pub(in crate::core::cpu) fn op_ori(&mut self, instruction: Instruction) -> Result<()> {
        let i = instruction.immediate();
        self.set_reg(i.rt(), self.reg(i.rs()) | i.imm() as u32);
        Ok(())
    }

    /// XORI: Bitwise exclusive OR Immediate (zero-extended)
    pub(in crate::core::cpu) fn op_xori(&mut self, instruction: Instruction) -> Result<()> {
        let i = instruction.immediate();
        self.set_reg(i.rt(), self.reg(i.rs()) ^ i.imm() as u32);
        Ok(())
    }
}
