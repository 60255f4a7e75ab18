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

//! Geometry Transformation Engine (COP2)
//!
//! The GTE is the PlayStation's fixed-point vector unit. This module models
//! its register banks and the COP2 transfer protocol; commands are decoded
//! and reported but not computed.
//!
//! # Register banks
//!
//! | Bank    | Registers | Access              |
//! |---------|-----------|---------------------|
//! | Data    | 32 × u32  | MTC2/MFC2, LWC2/SWC2 |
//! | Control | 32 × u32  | CTC2/CFC2           |

use crate::core::cpu::coprocessor::{Coprocessor, BANK_SIZE};
use crate::core::cpu::decode::Instruction;
use crate::core::error::Result;
use std::fmt;

#[cfg(test)]
mod tests;

/// GTE command numbers (low 6 bits of a COP2 function)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GteCommand {
    /// Perspective transform, single vertex
    Rtps,
    /// Normal clipping
    Nclip,
    /// Outer product
    Op,
    /// Depth cue, single
    Dpcs,
    /// Interpolation
    Intpl,
    /// Matrix-vector multiply and add
    Mvmva,
    /// Normal color depth cue, single
    Ncds,
    /// Color depth cue
    Cdp,
    /// Normal color depth cue, triple
    Ncdt,
    /// Normal color color, single
    Nccs,
    /// Normal color, single
    Ncs,
    /// Normal color, triple
    Nct,
    /// Square of IR vector
    Sqr,
    /// Depth cue light color
    Dcpl,
    /// Depth cue, triple
    Dpct,
    /// Average of three Z values
    Avsz3,
    /// Average of four Z values
    Avsz4,
    /// Perspective transform, triple
    Rtpt,
    /// General purpose interpolation
    Gpf,
    /// General purpose interpolation with base
    Gpl,
    /// Normal color color, triple
    Ncct,
}

impl GteCommand {
    /// Decode a command number
    ///
    /// # Example
    ///
    /// ```
    /// use psrx_core::core::gte::GteCommand;
    ///
    /// assert_eq!(GteCommand::from_opcode(0x01), Some(GteCommand::Rtps));
    /// assert_eq!(GteCommand::from_opcode(0x30), Some(GteCommand::Rtpt));
    /// assert_eq!(GteCommand::from_opcode(0x02), None);
    /// ```
    pub fn from_opcode(opcode: u32) -> Option<Self> {
        let command = match opcode & 0x3F {
            0x01 => GteCommand::Rtps,
            0x06 => GteCommand::Nclip,
            0x0C => GteCommand::Op,
            0x10 => GteCommand::Dpcs,
            0x11 => GteCommand::Intpl,
            0x12 => GteCommand::Mvmva,
            0x13 => GteCommand::Ncds,
            0x14 => GteCommand::Cdp,
            0x16 => GteCommand::Ncdt,
            0x1B => GteCommand::Nccs,
            0x1E => GteCommand::Ncs,
            0x20 => GteCommand::Nct,
            0x28 => GteCommand::Sqr,
            0x29 => GteCommand::Dcpl,
            0x2A => GteCommand::Dpct,
            0x2D => GteCommand::Avsz3,
            0x2E => GteCommand::Avsz4,
            0x30 => GteCommand::Rtpt,
            0x3D => GteCommand::Gpf,
            0x3E => GteCommand::Gpl,
            0x3F => GteCommand::Ncct,
            _ => return None,
        };
        Some(command)
    }

    /// Assembler mnemonic
    pub fn mnemonic(self) -> &'static str {
        match self {
            GteCommand::Rtps => "RTPS",
            GteCommand::Nclip => "NCLIP",
            GteCommand::Op => "OP",
            GteCommand::Dpcs => "DPCS",
            GteCommand::Intpl => "INTPL",
            GteCommand::Mvmva => "MVMVA",
            GteCommand::Ncds => "NCDS",
            GteCommand::Cdp => "CDP",
            GteCommand::Ncdt => "NCDT",
            GteCommand::Nccs => "NCCS",
            GteCommand::Ncs => "NCS",
            GteCommand::Nct => "NCT",
            GteCommand::Sqr => "SQR",
            GteCommand::Dcpl => "DCPL",
            GteCommand::Dpct => "DPCT",
            GteCommand::Avsz3 => "AVSZ3",
            GteCommand::Avsz4 => "AVSZ4",
            GteCommand::Rtpt => "RTPT",
            GteCommand::Gpf => "GPF",
            GteCommand::Gpl => "GPL",
            GteCommand::Ncct => "NCCT",
        }
    }
}

impl fmt::Display for GteCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// Geometry Transformation Engine
pub struct GTE {
    data: [u32; BANK_SIZE],
    control: [u32; BANK_SIZE],
}

impl GTE {
    // Data registers
    pub const VXY0: u8 = 0;
    pub const VZ0: u8 = 1;
    pub const VXY1: u8 = 2;
    pub const VZ1: u8 = 3;
    pub const VXY2: u8 = 4;
    pub const VZ2: u8 = 5;
    pub const RGBC: u8 = 6;
    pub const OTZ: u8 = 7;
    pub const IR0: u8 = 8;
    pub const IR1: u8 = 9;
    pub const IR2: u8 = 10;
    pub const IR3: u8 = 11;
    pub const SXY0: u8 = 12;
    pub const SXY1: u8 = 13;
    pub const SXY2: u8 = 14;
    pub const SXYP: u8 = 15;
    pub const SZ0: u8 = 16;
    pub const SZ1: u8 = 17;
    pub const SZ2: u8 = 18;
    pub const SZ3: u8 = 19;
    pub const RGB0: u8 = 20;
    pub const RGB1: u8 = 21;
    pub const RGB2: u8 = 22;
    pub const MAC0: u8 = 24;
    pub const MAC1: u8 = 25;
    pub const MAC2: u8 = 26;
    pub const MAC3: u8 = 27;
    pub const IRGB: u8 = 28;
    pub const ORGB: u8 = 29;
    pub const LZCS: u8 = 30;
    pub const LZCR: u8 = 31;

    // Control registers
    pub const RT11_RT12: u8 = 0;
    pub const RT13_RT21: u8 = 1;
    pub const RT22_RT23: u8 = 2;
    pub const RT31_RT32: u8 = 3;
    pub const RT33: u8 = 4;
    pub const TRX: u8 = 5;
    pub const TRY: u8 = 6;
    pub const TRZ: u8 = 7;
    pub const OFX: u8 = 24;
    pub const OFY: u8 = 25;
    pub const H: u8 = 26;
    pub const DQA: u8 = 27;
    pub const DQB: u8 = 28;
    pub const ZSF3: u8 = 29;
    pub const ZSF4: u8 = 30;
    pub const FLAG: u8 = 31;

    /// Create a GTE with both banks zeroed
    pub fn new() -> Self {
        Self {
            data: [0; BANK_SIZE],
            control: [0; BANK_SIZE],
        }
    }

    /// Zero both banks
    pub fn reset(&mut self) {
        self.data = [0; BANK_SIZE];
        self.control = [0; BANK_SIZE];
    }
}

impl Default for GTE {
    fn default() -> Self {
        Self::new()
    }
}

impl Coprocessor for GTE {
    fn number(&self) -> u8 {
        2
    }

    fn name(&self) -> &'static str {
        "GTE"
    }

    fn data_register(&self, index: u8) -> u32 {
        self.data[(index & 0x1F) as usize]
    }

    fn set_data_register(&mut self, index: u8, value: u32) {
        log::trace!("GTE data[{}] <- 0x{:08X}", index & 0x1F, value);
        self.data[(index & 0x1F) as usize] = value;
    }

    fn control_register(&self, index: u8) -> Result<u32> {
        Ok(self.control[(index & 0x1F) as usize])
    }

    fn set_control_register(&mut self, index: u8, value: u32) -> Result<()> {
        log::trace!("GTE control[{}] <- 0x{:08X}", index & 0x1F, value);
        self.control[(index & 0x1F) as usize] = value;
        Ok(())
    }

    fn move_control_to_cop_fun(&mut self, instruction: Instruction) -> Result<()> {
        match GteCommand::from_opcode(instruction.0) {
            Some(command) => log::warn!(
                "GTE command {} (0x{:07X}) not implemented",
                command,
                instruction.0 & 0x01FF_FFFF
            ),
            None => log::warn!("Unknown GTE command 0x{:02X}", instruction.0 & 0x3F),
        }
        Err(self.unimplemented(instruction))
    }
}
