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

//! PSX-EXE program images
//!
//! Host-side programs (test ROMs, homebrew) are usually distributed as
//! PSX-EXE files: a 2 KiB header followed by the raw image.
//!
//! ```text
//! 0x00-0x07: "PS-X EXE" magic
//! 0x10-0x13: Initial PC (entry point)
//! 0x14-0x17: Initial GP (r28)
//! 0x18-0x1B: Load address
//! 0x1C-0x1F: Load size
//! 0x30-0x33: Stack base
//! 0x34-0x37: Stack offset
//! 0x800+:    Image
//! ```

use super::cpu::CPU;
use super::error::{EmulatorError, Result};
use super::memory::Bus;

const MAGIC: &[u8; 8] = b"PS-X EXE";

/// Parsed PSX-EXE file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Executable {
    /// Entry point
    pub pc: u32,
    /// Initial global pointer (r28)
    pub gp: u32,
    /// Virtual address the image is copied to
    pub load_address: u32,
    /// Initial stack pointer, zero when the file leaves it to the loader
    pub stack_base: u32,
    pub stack_offset: u32,
    /// Code and initialized data
    pub image: Vec<u8>,
}

impl Executable {
    /// Header size; the image starts right after it
    pub const HEADER_SIZE: usize = 0x800;

    /// Parse a PSX-EXE file
    ///
    /// # Errors
    ///
    /// `Loader` when the file is shorter than its header, the magic does not
    /// match, or the declared image size runs past the end of the file.
    ///
    /// # Example
    ///
    /// ```
    /// use psrx_core::core::loader::Executable;
    ///
    /// let mut file = vec![0u8; 0x900];
    /// file[0..8].copy_from_slice(b"PS-X EXE");
    /// file[0x10..0x14].copy_from_slice(&0x80010000u32.to_le_bytes());
    /// file[0x1C..0x20].copy_from_slice(&0x100u32.to_le_bytes());
    ///
    /// let exe = Executable::parse(&file).unwrap();
    /// assert_eq!(exe.pc, 0x80010000);
    /// assert_eq!(exe.image.len(), 0x100);
    /// ```
    pub fn parse(file: &[u8]) -> Result<Self> {
        if file.len() < Self::HEADER_SIZE {
            return Err(EmulatorError::Loader(format!(
                "PSX-EXE too small: {} bytes",
                file.len()
            )));
        }
        if &file[0..8] != MAGIC {
            return Err(EmulatorError::Loader("bad PSX-EXE magic".to_string()));
        }

        let field = |offset: usize| {
            u32::from_le_bytes([
                file[offset],
                file[offset + 1],
                file[offset + 2],
                file[offset + 3],
            ])
        };

        let size = field(0x1C) as usize;
        let image = file
            .get(Self::HEADER_SIZE..Self::HEADER_SIZE + size)
            .ok_or_else(|| {
                EmulatorError::Loader(format!("PSX-EXE image size 0x{:X} exceeds file", size))
            })?
            .to_vec();

        let exe = Self {
            pc: field(0x10),
            gp: field(0x14),
            load_address: field(0x18),
            stack_base: field(0x30),
            stack_offset: field(0x34),
            image,
        };

        log::info!(
            "PSX-EXE: PC=0x{:08X}, GP=0x{:08X}, load=0x{:08X}, size=0x{:X}",
            exe.pc,
            exe.gp,
            exe.load_address,
            exe.image.len()
        );
        Ok(exe)
    }

    /// Read and parse a PSX-EXE file from disk
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let file = std::fs::read(path)?;
        Self::parse(&file)
    }

    /// Copy the image into memory and point the CPU at the entry
    ///
    /// Sets PC, GP and, when the header provides a stack, SP and FP.
    pub fn install(&self, cpu: &mut CPU, bus: &mut Bus) -> Result<()> {
        bus.load_program(self.load_address, &self.image)?;

        cpu.set_pc(self.pc);
        cpu.set_reg(28, self.gp);
        if self.stack_base != 0 {
            let sp = self.stack_base.wrapping_add(self.stack_offset);
            cpu.set_reg(29, sp);
            cpu.set_reg(30, sp);
        }
        Ok(())
    }
}
