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

//! Three-stage general purpose register file
//!
//! The R3000A does not make the result of a memory load visible to the
//! instruction directly after the load (the load delay slot), while ALU
//! results are visible immediately. This is modelled with three copies of
//! the register bank that shift once per retired instruction:
//!
//! ```text
//!  set(delayed)      tick()          tick()
//!  ──────────► stage1 ─────► stage2 ─────► stage3 ──► get()
//!  set(immediate) writes all three stages at once
//! ```
//!
//! Executing instructions only ever read `stage3`.

use crate::core::error::Result;
use std::io::{Read, Write};

/// Number of general purpose registers
pub const REGISTER_COUNT: usize = 32;

/// Size in bytes of a serialized register file
pub const REGISTER_FILE_STATE_SIZE: usize = 3 * REGISTER_COUNT * 4;

/// General purpose register file with load-delay staging
///
/// # Example
///
/// ```
/// use psrx_core::core::cpu::RegisterFile;
///
/// let mut regs = RegisterFile::new();
/// regs.set(3, 100, true);
/// assert_eq!(regs.get(3), 0); // load delay: not yet visible
/// regs.tick();
/// regs.tick();
/// assert_eq!(regs.get(3), 100);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterFile {
    stage1: [u32; REGISTER_COUNT],
    stage2: [u32; REGISTER_COUNT],
    stage3: [u32; REGISTER_COUNT],
}

impl RegisterFile {
    /// Create a zeroed register file
    pub fn new() -> Self {
        Self {
            stage1: [0; REGISTER_COUNT],
            stage2: [0; REGISTER_COUNT],
            stage3: [0; REGISTER_COUNT],
        }
    }

    /// Zero every stage
    pub fn reset(&mut self) {
        self.stage1 = [0; REGISTER_COUNT];
        self.stage2 = [0; REGISTER_COUNT];
        self.stage3 = [0; REGISTER_COUNT];
    }

    /// Advance the pipeline by one retired instruction
    ///
    /// Shifts stage2 into stage3, then stage1 into stage2. Stage1 keeps its
    /// contents until the next write.
    #[inline(always)]
    pub fn tick(&mut self) {
        self.stage3 = self.stage2;
        self.stage2 = self.stage1;
    }

    /// Read a register as seen by the executing instruction
    ///
    /// r0 is hardwired to 0.
    #[inline(always)]
    pub fn get(&self, index: u8) -> u32 {
        let index = (index & 0x1F) as usize;
        if index == 0 {
            0
        } else {
            self.stage3[index]
        }
    }

    /// Read the most recent value written to a register
    ///
    /// Unlike [`get`](Self::get) this ignores the load delay. LWL/LWR use it
    /// to merge with a load that is still in flight.
    #[inline(always)]
    pub fn latest(&self, index: u8) -> u32 {
        let index = (index & 0x1F) as usize;
        if index == 0 {
            0
        } else {
            self.stage1[index]
        }
    }

    /// Write a register
    ///
    /// # Arguments
    ///
    /// * `index` - Register number (0-31), writes to r0 are ignored
    /// * `value` - Value to write
    /// * `delayed` - When true only stage1 is written, so the value reaches
    ///   readers after two ticks. Otherwise the value is visible immediately.
    #[inline(always)]
    pub fn set(&mut self, index: u8, value: u32, delayed: bool) {
        let index = (index & 0x1F) as usize;
        if index == 0 {
            return;
        }

        self.stage1[index] = value;
        if !delayed {
            self.stage2[index] = value;
            self.stage3[index] = value;
        }
    }

    /// Serialize stage1, stage2 and stage3 as little-endian words
    pub fn save_state(&self, sink: &mut dyn Write) -> Result<()> {
        for stage in [&self.stage1, &self.stage2, &self.stage3] {
            write_words(sink, stage)?;
        }
        Ok(())
    }

    /// Restore the layout written by [`save_state`](Self::save_state)
    pub fn load_state(&mut self, source: &mut dyn Read) -> Result<()> {
        read_words(source, &mut self.stage1)?;
        read_words(source, &mut self.stage2)?;
        read_words(source, &mut self.stage3)?;
        Ok(())
    }
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

/// Write a register bank as little-endian words
pub(crate) fn write_words(sink: &mut dyn Write, words: &[u32]) -> Result<()> {
    for word in words {
        sink.write_all(&word.to_le_bytes())?;
    }
    Ok(())
}

/// Fill a register bank from little-endian words
pub(crate) fn read_words(source: &mut dyn Read, words: &mut [u32]) -> Result<()> {
    let mut buf = [0u8; 4];
    for word in words.iter_mut() {
        source.read_exact(&mut buf)?;
        *word = u32::from_le_bytes(buf);
    }
    Ok(())
}
