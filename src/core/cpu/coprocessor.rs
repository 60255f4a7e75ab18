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

//! Coprocessor protocol
//!
//! The R3000A talks to up to four coprocessors through a fixed set of
//! transfer instructions. Each coprocessor only has to expose its register
//! banks and its function decoder; the transfers themselves are provided
//! here and operate on the register file and bus handed in by the CPU.
//!
//! ```text
//!  LWCz / SWCz        bus word  <-> data register rt
//!  MTCz / MFCz        GPR rt    <-> data register rd     (MFCz is delayed)
//!  CTCz / CFCz        GPR rt    <-> control register rd  (CFCz is delayed)
//!  COPz (CO bit set)  coprocessor function
//!  BCzF / BCzT        branch on the coprocessor condition line
//! ```

use super::decode::{op, Instruction};
use super::registers::{read_words, write_words, RegisterFile};
use crate::core::error::{EmulatorError, Result};
use crate::core::memory::Bus;
use std::io::{Read, Write};

/// COPz `rs` field values selecting a transfer when the CO bit is clear
pub mod selector {
    /// Move from coprocessor data register
    pub const MF: u8 = 0o00;
    /// Move from coprocessor control register
    pub const CF: u8 = 0o02;
    /// Move to coprocessor data register
    pub const MT: u8 = 0o04;
    /// Move to coprocessor control register
    pub const CT: u8 = 0o06;
    /// Branch on coprocessor condition
    pub const BC: u8 = 0o10;
}

/// Number of registers in each coprocessor bank
pub const BANK_SIZE: usize = 32;

/// What the CPU has to do after a coprocessor instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopOutcome {
    /// The instruction completed inside the coprocessor
    Done,
    /// A BCzF/BCzT instruction; the CPU applies the branch when taken
    Branch { taken: bool },
}

/// A coprocessor attached to the CPU
///
/// Implementors provide register access and the function decoder. All data
/// movement between the coprocessor, the register file and the bus is
/// expressed by the provided methods.
pub trait Coprocessor {
    /// Coprocessor number (0-3)
    fn number(&self) -> u8;

    /// Short name for logging
    fn name(&self) -> &'static str;

    /// Read data register `index`
    fn data_register(&self, index: u8) -> u32;

    /// Write data register `index`
    fn set_data_register(&mut self, index: u8, value: u32);

    /// Read control register `index`
    fn control_register(&self, index: u8) -> Result<u32>;

    /// Write control register `index`
    fn set_control_register(&mut self, index: u8, value: u32) -> Result<()>;

    /// Execute a coprocessor function (COPz with the CO bit set)
    ///
    /// Functions the coprocessor does not model return
    /// [`EmulatorError::Unimplemented`].
    fn move_control_to_cop_fun(&mut self, instruction: Instruction) -> Result<()>;

    /// State of the condition line sampled by BCzF/BCzT
    fn condition(&self) -> bool {
        false
    }

    /// Error for an instruction this coprocessor does not model
    fn unimplemented(&self, instruction: Instruction) -> EmulatorError {
        EmulatorError::Unimplemented {
            coprocessor: self.number(),
            instruction: instruction.0,
        }
    }

    /// LWCz: load a word from memory into data register `rt`
    fn load_word_to_cop(
        &mut self,
        instruction: Instruction,
        regs: &RegisterFile,
        bus: &mut Bus,
    ) -> Result<()> {
        let i = instruction.immediate();
        let address = regs.get(i.rs()).wrapping_add(i.imm_se());
        let value = bus.read32(address)?;
        log::trace!("LWC{} r{} <- [0x{:08X}] = 0x{:08X}", self.number(), i.rt(), address, value);
        self.set_data_register(i.rt(), value);
        Ok(())
    }

    /// SWCz: store data register `rt` to memory
    fn store_word_from_cop(
        &self,
        instruction: Instruction,
        regs: &RegisterFile,
        bus: &mut Bus,
    ) -> Result<()> {
        let i = instruction.immediate();
        let address = regs.get(i.rs()).wrapping_add(i.imm_se());
        let value = self.data_register(i.rt());
        log::trace!("SWC{} [0x{:08X}] <- r{} = 0x{:08X}", self.number(), address, i.rt(), value);
        bus.write32(address, value)
    }

    /// MTCz: copy GPR `rt` into data register `rd`
    fn move_to_cop(&mut self, instruction: Instruction, regs: &RegisterFile) {
        let r = instruction.register();
        self.set_data_register(r.rd(), regs.get(r.rt()));
    }

    /// MFCz: copy data register `rd` into GPR `rt` with the load delay
    fn move_from_cop(&self, instruction: Instruction, regs: &mut RegisterFile) {
        let r = instruction.register();
        regs.set(r.rt(), self.data_register(r.rd()), true);
    }

    /// CTCz: copy GPR `rt` into control register `rd`
    fn move_control_to_cop(&mut self, instruction: Instruction, regs: &RegisterFile) -> Result<()> {
        let r = instruction.register();
        self.set_control_register(r.rd(), regs.get(r.rt()))
    }

    /// CFCz: copy control register `rd` into GPR `rt` with the load delay
    fn move_control_from_cop(
        &self,
        instruction: Instruction,
        regs: &mut RegisterFile,
    ) -> Result<()> {
        let r = instruction.register();
        let value = self.control_register(r.rd())?;
        regs.set(r.rt(), value, true);
        Ok(())
    }

    /// Serialize the data bank, then the control bank
    fn save_state(&self, sink: &mut dyn Write) -> Result<()> {
        let data: Vec<u32> = (0..BANK_SIZE as u8).map(|i| self.data_register(i)).collect();
        write_words(sink, &data)?;
        let control = (0..BANK_SIZE as u8)
            .map(|i| self.control_register(i))
            .collect::<Result<Vec<u32>>>()?;
        write_words(sink, &control)
    }

    /// Restore the layout written by [`save_state`](Coprocessor::save_state)
    fn load_state(&mut self, source: &mut dyn Read) -> Result<()> {
        let mut data = [0u32; BANK_SIZE];
        read_words(source, &mut data)?;
        let mut control = [0u32; BANK_SIZE];
        read_words(source, &mut control)?;

        for (i, value) in data.into_iter().enumerate() {
            self.set_data_register(i as u8, value);
        }
        for (i, value) in control.into_iter().enumerate() {
            self.set_control_register(i as u8, value)?;
        }
        Ok(())
    }

    /// Decode a coprocessor instruction and run it
    ///
    /// # Arguments
    ///
    /// * `instruction` - A COPz, LWCz or SWCz instruction word
    /// * `regs` - The CPU register file
    /// * `bus` - Memory bus for LWCz/SWCz
    ///
    /// # Returns
    ///
    /// `CopOutcome::Branch` for BCzF/BCzT, `CopOutcome::Done` otherwise
    fn execute(
        &mut self,
        instruction: Instruction,
        regs: &mut RegisterFile,
        bus: &mut Bus,
    ) -> Result<CopOutcome> {
        match instruction.opcode() {
            op::LWC0..=op::LWC3 => {
                self.load_word_to_cop(instruction, regs, bus)?;
                return Ok(CopOutcome::Done);
            }
            op::SWC0..=op::SWC3 => {
                self.store_word_from_cop(instruction, regs, bus)?;
                return Ok(CopOutcome::Done);
            }
            _ => {}
        }

        let r = instruction.register();
        if r.rs() & 0o20 != 0 {
            self.move_control_to_cop_fun(instruction)?;
            return Ok(CopOutcome::Done);
        }

        match r.rs() {
            selector::MF => self.move_from_cop(instruction, regs),
            selector::CF => self.move_control_from_cop(instruction, regs)?,
            selector::MT => self.move_to_cop(instruction, regs),
            selector::CT => self.move_control_to_cop(instruction, regs)?,
            selector::BC => {
                let on_true = r.rt() & 1 != 0;
                let taken = self.condition() == on_true;
                return Ok(CopOutcome::Branch { taken });
            }
            other => {
                log::warn!(
                    "Reserved COP{} selector 0o{:02o} in 0x{:08X}",
                    self.number(),
                    other,
                    instruction.0
                );
                return Err(EmulatorError::Exception(
                    super::ExceptionCause::ReservedInstruction,
                ));
            }
        }
        Ok(CopOutcome::Done)
    }
}
