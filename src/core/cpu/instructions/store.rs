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

/// Width of a store
#[derive(Debug, Clone, Copy)]
enum Width {
    Byte,
    Half,
    Word,
}

impl CPU {
    // === Store Instructions ===

    /// True when SR.IsC diverts stores away from the bus
    ///
    /// Partial-word stores check this before their read-modify-write so the
    /// bus is not touched at all.
    fn cache_swallows(&self, addr: u32) -> bool {
        let isolated = self.cop0.cache_isolated();
        if isolated {
            log::trace!("Store to 0x{:08X} ignored: cache isolated", addr);
        }
        isolated
    }

    /// Perform a store unless the data cache is isolated
    ///
    /// With SR.IsC set the BIOS flushes the cache by storing to it; those
    /// writes never reach memory.
    fn store(&mut self, bus: &mut Bus, addr: u32, value: u32, width: Width) -> Result<()> {
        if self.cache_swallows(addr) {
            return Ok(());
        }

        match width {
            Width::Byte => bus.write8(addr, value as u8),
            Width::Half => bus.write16(addr, value as u16),
            Width::Word => bus.write32(addr, value),
        }
    }

    /// SB: Store Byte
    ///
    /// Format: sb rt, offset(rs)
    /// Operation: memory[rs + sign_extend(offset)] = rt[7:0]
    pub(in crate::core::cpu) fn op_sb(&mut self, instruction: Instruction, bus: &mut Bus) -> Result<()> {
        let addr = self.effective_address(instruction);
        let value = self.reg(instruction.immediate().rt());
        self.store(bus, addr, value, Width::Byte)
    }

    /// SH: Store Halfword (2-byte aligned)
    pub(in crate::core::cpu) fn op_sh(&mut self, instruction: Instruction, bus: &mut Bus) -> Result<()> {
        let addr = self.effective_address(instruction);
        let value = self.reg(instruction.immediate().rt());
        self.store(bus, addr, value, Width::Half)
    }

    /// SW: Store Word (4-byte aligned)
    ///
    /// Format: sw rt, offset(rs)
    /// Operation: memory[rs + sign_extend(offset)] = rt
    pub(in crate::core::cpu) fn op_sw(&mut self, instruction: Instruction, bus: &mut Bus) -> Result<()> {
        let addr = self.effective_address(instruction);
        let value = self.reg(instruction.immediate().rt());
        self.store(bus, addr, value, Width::Word)
    }

    /// SWL: Store Word Left
    ///
    /// Stores the most significant bytes of rt into the aligned word
    /// containing `addr`, ending at `addr`.
    pub(in crate::core::cpu) fn op_swl(&mut self, instruction: Instruction, bus: &mut Bus) -> Result<()> {
        let addr = self.effective_address(instruction);
        if self.cache_swallows(addr) {
            return Ok(());
        }
        let value = self.reg(instruction.immediate().rt());
        let aligned = addr & !3;
        let current = bus.read32(aligned)?;

        let merged = match addr & 3 {
            0 => (current & 0xFFFF_FF00) | (value >> 24),
            1 => (current & 0xFFFF_0000) | (value >> 16),
            2 => (current & 0xFF00_0000) | (value >> 8),
            _ => value,
        };
        self.store(bus, aligned, merged, Width::Word)
    }

    /// SWR: Store Word Right
    ///
    /// Stores the least significant bytes of rt into the aligned word
    /// containing `addr`, starting at `addr`.
    pub(in crate::core::cpu) fn op_swr(&mut self, instruction: Instruction, bus: &mut Bus) -> Result<()> {
        let addr = self.effective_address(instruction);
        if self.cache_swallows(addr) {
            return Ok(());
        }
        let value = self.reg(instruction.immediate().rt());
        let aligned = addr & !3;
        let current = bus.read32(aligned)?;

        let merged = match addr & 3 {
            0 => value,
            1 => (current & 0x0000_00FF) | (value << 8),
            2 => (current & 0x0000_FFFF) | (value << 16),
            _ => (current & 0x00FF_FFFF) | (value << 24),
        };
        self.store(bus, aligned, merged, Width::Word)
    }
}
