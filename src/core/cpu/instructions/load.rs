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
use crate::core::memory::Bus;

impl CPU {
    // === Load Instructions ===
    //
    // Every load writes its target with the load delay. Misaligned LH/LHU/LW
    // addresses are rejected by the bus before anything is read.

    /// LB: Load Byte (sign-extended)
    ///
    /// Format: lb rt, offset(rs)
    /// Operation: rt = sign_extend(memory[rs + sign_extend(offset)])
    pub(in crate::core::cpu) fn op_lb(&mut self, instruction: Instruction, bus: &mut Bus) -> Result<()> {
        let addr = self.effective_address(instruction);
        let value = bus.read8(addr)? as i8 as i32 as u32;
        self.set_reg_delayed(instruction.immediate().rt(), value);
        Ok(())
    }

    /// LBU: Load Byte Unsigned (zero-extended)
    pub(in crate::core::cpu) fn op_lbu(&mut self, instruction: Instruction, bus: &mut Bus) -> Result<()> {
        let addr = self.effective_address(instruction);
        let value = bus.read8(addr)? as u32;
        self.set_reg_delayed(instruction.immediate().rt(), value);
        Ok(())
    }

    /// LH: Load Halfword (16-bit, sign-extended)
    ///
    /// The address must be 2-byte aligned.
    pub(in crate::core::cpu) fn op_lh(&mut self, instruction: Instruction, bus: &mut Bus) -> Result<()> {
        let addr = self.effective_address(instruction);
        let value = bus.read16(addr)? as i16 as i32 as u32;
        self.set_reg_delayed(instruction.immediate().rt(), value);
        Ok(())
    }

    /// LHU: Load Halfword Unsigned (16-bit, zero-extended)
    pub(in crate::core::cpu) fn op_lhu(&mut self, instruction: Instruction, bus: &mut Bus) -> Result<()> {
        let addr = self.effective_address(instruction);
        let value = bus.read16(addr)? as u32;
        self.set_reg_delayed(instruction.immediate().rt(), value);
        Ok(())
    }

    /// LW: Load Word (32-bit)
    ///
    /// Format: lw rt, offset(rs)
    /// Operation: rt = memory[rs + sign_extend(offset)]
    pub(in crate::core::cpu) fn op_lw(&mut self, instruction: Instruction, bus: &mut Bus) -> Result<()> {
        let addr = self.effective_address(instruction);
        let value = bus.read32(addr)?;
        self.set_reg_delayed(instruction.immediate().rt(), value);
        Ok(())
    }

    /// LWL: Load Word Left
    ///
    /// Loads the most significant bytes of an unaligned word into the upper
    /// part of rt. Paired with LWR to load a full unaligned word. The merge
    /// uses the most recent value of rt, so an LWL/LWR pair combines even
    /// though each one is still in its load delay.
    ///
    /// ```text
    /// addr & 3 | result
    ///    0     | (rt & 0x00FFFFFF) | (word << 24)
    ///    1     | (rt & 0x0000FFFF) | (word << 16)
    ///    2     | (rt & 0x000000FF) | (word << 8)
    ///    3     | word
    /// ```
    pub(in crate::core::cpu) fn op_lwl(&mut self, instruction: Instruction, bus: &mut Bus) -> Result<()> {
        let rt = instruction.immediate().rt();
        let addr = self.effective_address(instruction);
        let current = self.regs.latest(rt);
        let word = bus.read32(addr & !3)?;

        let value = match addr & 3 {
            0 => (current & 0x00FF_FFFF) | (word << 24),
            1 => (current & 0x0000_FFFF) | (word << 16),
            2 => (current & 0x0000_00FF) | (word << 8),
            _ => word,
        };
        self.set_reg_delayed(rt, value);
        Ok(())
    }

    /// LWR: Load Word Right
    ///
    /// Loads the least significant bytes of an unaligned word into the
    /// lower part of rt.
    ///
    /// ```text
    /// addr & 3 | result
    ///    0     | word
    ///    1     | (rt & 0xFF000000) | (word >> 8)
    ///    2     | (rt & 0xFFFF0000) | (word >> 16)
    ///    3     | (rt & 0xFFFFFF00) | (word >> 24)
    /// ```
    pub(in crate::core::cpu) fn op_lwr(&mut self, instruction: Instruction, bus: &mut Bus) -> Result<()> {
        let rt = instruction.immediate().rt();
        let addr = self.effective_address(instruction);
        let current = self.regs.latest(rt);
        let word = bus.read32(addr & !3)?;

        let value = match addr & 3 {
            0 => word,
            1 => (current & 0xFF00_0000) | (word >> 8),
            2 => (current & 0xFFFF_0000) | (word >> 16),
            _ => (current & 0xFFFF_FF00) | (word >> 24),
        };
        self.set_reg_delayed(rt, value);
        Ok(())
    }
}
