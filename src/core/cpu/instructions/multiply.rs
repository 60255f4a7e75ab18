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
    // === Multiply/Divide Instructions ===

    /// MULT: Multiply (signed)
    ///
    /// Multiplies two 32-bit signed integers and stores the 64-bit result
    /// in the HI and LO registers.
    ///
    /// Format: mult rs, rt
    /// Operation: (HI, LO) = rs * rt (signed 64-bit result)
    pub(in crate::core::cpu) fn op_mult(&mut self, instruction: Instruction) -> Result<()> {
        let r = instruction.register();
        let a = self.reg(r.rs()) as i32 as i64;
        let b = self.reg(r.rt()) as i32 as i64;
        let result = (a * b) as u64;

        self.lo = result as u32;
        self.hi = (result >> 32) as u32;
        Ok(())
    }

    /// MULTU: Multiply Unsigned
    pub(in crate::core::cpu) fn op_multu(&mut self, instruction: Instruction) -> Result<()> {
        let r = instruction.register();
        let a = self.reg(r.rs()) as u64;
        let b = self.reg(r.rt()) as u64;
        let result = a * b;

        self.lo = result as u32;
        self.hi = (result >> 32) as u32;
        Ok(())
    }

    /// DIV: Divide (signed)
    ///
    /// Stores the quotient in LO and the remainder in HI. The R3000A never
    /// traps on division.
    ///
    /// # Special Cases
    ///
    /// * Division by zero: HI = numerator, LO = -1 for a non-negative
    ///   numerator and 1 for a negative one
    /// * `i32::MIN / -1`: LO = 0x80000000, HI = 0
    pub(in crate::core::cpu) fn op_div(&mut self, instruction: Instruction) -> Result<()> {
        let r = instruction.register();
        let numerator = self.reg(r.rs()) as i32;
        let denominator = self.reg(r.rt()) as i32;

        if denominator == 0 {
            self.hi = numerator as u32;
            self.lo = if numerator >= 0 { 0xFFFF_FFFF } else { 1 };
        } else if numerator == i32::MIN && denominator == -1 {
            self.hi = 0;
            self.lo = 0x8000_0000;
        } else {
            self.hi = (numerator % denominator) as u32;
            self.lo = (numerator / denominator) as u32;
        }
        Ok(())
    }

    /// DIVU: Divide Unsigned
    ///
    /// # Special Cases
    ///
    /// * Division by zero: LO = 0xFFFFFFFF, HI = numerator
    pub(in crate::core::cpu) fn op_divu(&mut self, instruction: Instruction) -> Result<()> {
        let r = instruction.register();
        let numerator = self.reg(r.rs());
        let denominator = self.reg(r.rt());

        if denominator == 0 {
            self.hi = numerator;
            self.lo = 0xFFFF_FFFF;
        } else {
            self.hi = numerator % denominator;
            self.lo = numerator / denominator;
        }
        Ok(())
    }

    /// MFHI: Move From HI
    pub(in crate::core::cpu) fn op_mfhi(&mut self, instruction: Instruction) -> Result<()> {
        self.set_reg(instruction.register().rd(), self.hi);
        Ok(())
    }

    /// MTHI: Move To HI
    pub(in crate::core::cpu) fn op_mthi(&mut self, instruction: Instruction) -> Result<()> {
        self.hi = self.reg(instruction.register().rs());
        Ok(())
    }

    /// MFLO: Move From LO
    pub(in crate::core::cpu) fn op_mflo(&mut self, instruction: Instruction) -> Result<()> {
        self.set_reg(instruction.register().rd(), self.lo);
        Ok(())
    }

    /// MTLO: Move To LO
    pub(in crate::core::cpu) fn op_mtlo(&mut self, instruction: Instruction) -> Result<()> {
        self.lo = self.reg(instruction.register().rs());
        Ok(())
    }
}
