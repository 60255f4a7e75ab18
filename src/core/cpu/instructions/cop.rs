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

use super::super::coprocessor::{CopOutcome, Coprocessor};
use super::super::decode::{op, Instruction};
use super::super::{ExceptionCause, CPU};
use crate::core::error::{EmulatorError, Result};
use crate::core::memory::Bus;

impl CPU {
    /// Route a COPz, LWCz or SWCz instruction to its coprocessor
    ///
    /// The coprocessor number is the low two bits of the opcode. Unattached
    /// coprocessors (1 and 3) and ones disabled in SR raise a Coprocessor
    /// Unusable exception. SWCz is dropped while the data cache is isolated,
    /// like every other store.
    pub(in crate::core::cpu) fn execute_cop(
        &mut self,
        instruction: Instruction,
        bus: &mut Bus,
    ) -> Result<()> {
        let opcode = instruction.opcode();
        let number = opcode & 0x3;

        if !self.cop0.coprocessor_usable(number) {
            log::debug!(
                "COP{} unusable at PC=0x{:08X}, SR=0x{:08X}",
                number,
                self.current_pc,
                self.cop0.status().bits()
            );
            return Err(EmulatorError::Exception(ExceptionCause::CoprocessorUnusable));
        }

        if (op::SWC0..=op::SWC3).contains(&opcode) && self.cop0.cache_isolated() {
            log::trace!("SWC{} ignored: cache isolated", number);
            return Ok(());
        }

        let cop: &mut dyn Coprocessor = match number {
            0 => &mut self.cop0,
            2 => &mut self.gte,
            _ => return Err(EmulatorError::Exception(ExceptionCause::CoprocessorUnusable)),
        };

        match cop.execute(instruction, &mut self.regs, bus)? {
            CopOutcome::Branch { taken: true } => self.branch(instruction.immediate().imm_se()),
            CopOutcome::Branch { taken: false } | CopOutcome::Done => {}
        }
        Ok(())
    }
}
