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

//! Coprocessor 0 (System Control)
//!
//! COP0 owns the status register, exception bookkeeping and the
//! breakpoint registers. The CPU reaches it through the generic
//! [`Coprocessor`] protocol for MTC0/MFC0/RFE and directly for exception
//! entry and interrupt sampling.

use super::coprocessor::{Coprocessor, BANK_SIZE};
use super::decode::Instruction;
use super::registers::{read_words, write_words, RegisterFile};
use crate::core::error::Result;
use crate::core::memory::Bus;
use bitflags::bitflags;
use std::io::{Read, Write};

bitflags! {
    /// Status register (SR, COP0 r12) bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StatusFlags: u32 {
        /// Interrupt enable (current)
        const IEC = 1 << 0;
        /// User mode (current)
        const KUC = 1 << 1;
        /// Interrupt enable (previous)
        const IEP = 1 << 2;
        /// User mode (previous)
        const KUP = 1 << 3;
        /// Interrupt enable (old)
        const IEO = 1 << 4;
        /// User mode (old)
        const KUO = 1 << 5;
        /// Interrupt mask, one bit per CAUSE.IP line
        const IM = 0xFF << 8;
        /// Isolate cache: stores go to the cache, not memory
        const ISC = 1 << 16;
        /// Swap caches
        const SWC = 1 << 17;
        /// Boot exception vectors
        const BEV = 1 << 22;
        /// Coprocessor 0 usable in user mode
        const CU0 = 1 << 28;
        /// Coprocessor 1 usable
        const CU1 = 1 << 29;
        /// Coprocessor 2 (GTE) usable
        const CU2 = 1 << 30;
        /// Coprocessor 3 usable
        const CU3 = 1 << 31;
    }
}

/// Exception cause codes for MIPS R3000A
///
/// These correspond to the exception codes stored in the CAUSE register
/// when a CPU exception occurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ExceptionCause {
    /// Interrupt (external or internal)
    Interrupt = 0,
    /// Address error on load or instruction fetch
    AddressErrorLoad = 4,
    /// Address error on store
    AddressErrorStore = 5,
    /// Bus error on instruction fetch
    BusErrorInstruction = 6,
    /// Bus error on data access
    BusErrorData = 7,
    /// Syscall instruction executed
    Syscall = 8,
    /// Breakpoint instruction executed
    Breakpoint = 9,
    /// Reserved or illegal instruction
    ReservedInstruction = 10,
    /// Coprocessor unusable
    CoprocessorUnusable = 11,
    /// Arithmetic overflow
    Overflow = 12,
}

/// Everything COP0 records when an exception is taken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExceptionEntry {
    pub cause: ExceptionCause,
    /// Address of the instruction that raised the exception
    pub pc: u32,
    /// The instruction was executing in a branch delay slot
    pub in_delay_slot: bool,
    /// Faulting address for address errors (written to BadVaddr)
    pub bad_vaddr: Option<u32>,
    /// Coprocessor number for `CoprocessorUnusable` (CAUSE.CE)
    pub coprocessor: u8,
}

impl ExceptionEntry {
    pub fn new(cause: ExceptionCause, pc: u32, in_delay_slot: bool) -> Self {
        Self {
            cause,
            pc,
            in_delay_slot,
            bad_vaddr: None,
            coprocessor: 0,
        }
    }
}

/// Coprocessor 0 (System Control)
///
/// COP0 is the system control unit responsible for exception handling,
/// status management and breakpoints. It has 32 data registers and no
/// control bank.
pub struct COP0 {
    /// COP0 registers (32 registers)
    regs: [u32; BANK_SIZE],
}

impl COP0 {
    /// Breakpoint PC
    pub const BPC: usize = 3;
    /// Breakpoint Data Address
    pub const BDA: usize = 5;
    /// Target Address
    pub const TAR: usize = 6;
    /// Breakpoint control
    pub const DCIC: usize = 7;
    /// Bad Virtual Address
    pub const BADA: usize = 8;
    /// Data Address Mask
    pub const BDAM: usize = 9;
    /// PC Mask
    pub const BPCM: usize = 11;
    /// Status Register
    pub const SR: usize = 12;
    /// Cause Register
    pub const CAUSE: usize = 13;
    /// Exception PC
    pub const EPC: usize = 14;
    /// Processor ID
    pub const PRID: usize = 15;

    /// Status register value after reset
    pub const SR_RESET: u32 = 0x1090_0000;
    /// R3000A processor id
    pub const PRID_R3000A: u32 = 0x0000_0002;

    /// General exception vector
    pub const VECTOR_GENERAL: u32 = 0x8000_0080;
    /// Exception vector while SR.BEV is set
    pub const VECTOR_BOOT: u32 = 0xBFC0_0180;

    /// CAUSE bits writable through MTC0 (software interrupts)
    const CAUSE_SW_MASK: u32 = 0x0000_0300;
    /// CAUSE.IP2, driven by the interrupt controller
    const CAUSE_IP2: u32 = 1 << 10;
    const CAUSE_BD: u32 = 1 << 31;
    const CAUSE_CE_SHIFT: u32 = 28;

    /// Create a new COP0 instance with reset values
    pub fn new() -> Self {
        let mut cop0 = Self {
            regs: [0u32; BANK_SIZE],
        };
        cop0.reset();
        cop0
    }

    /// Reset COP0 registers to initial state
    pub fn reset(&mut self) {
        self.regs = [0u32; BANK_SIZE];
        self.regs[Self::SR] = Self::SR_RESET;
        self.regs[Self::PRID] = Self::PRID_R3000A;
    }

    /// Status register
    pub fn status(&self) -> StatusFlags {
        StatusFlags::from_bits_retain(self.regs[Self::SR])
    }

    /// Cause register
    pub fn cause(&self) -> u32 {
        self.regs[Self::CAUSE]
    }

    /// Exception PC
    pub fn epc(&self) -> u32 {
        self.regs[Self::EPC]
    }

    /// Bad virtual address of the last address error
    pub fn bad_vaddr(&self) -> u32 {
        self.regs[Self::BADA]
    }

    /// Raw register access for debugging
    pub fn register(&self, index: usize) -> u32 {
        self.regs[index & 0x1F]
    }

    /// Stores should be swallowed because the data cache is isolated
    pub fn cache_isolated(&self) -> bool {
        self.status().contains(StatusFlags::ISC)
    }

    /// The CPU is in kernel mode
    pub fn kernel_mode(&self) -> bool {
        !self.status().contains(StatusFlags::KUC)
    }

    /// Whether coprocessor `n` may be accessed by the running code
    pub fn coprocessor_usable(&self, n: u8) -> bool {
        let status = self.status();
        match n {
            0 => self.kernel_mode() || status.contains(StatusFlags::CU0),
            1 => status.contains(StatusFlags::CU1),
            2 => status.contains(StatusFlags::CU2),
            _ => status.contains(StatusFlags::CU3),
        }
    }

    /// Mirror the interrupt controller output into CAUSE.IP2
    pub fn set_interrupt_line(&mut self, pending: bool) {
        if pending {
            self.regs[Self::CAUSE] |= Self::CAUSE_IP2;
        } else {
            self.regs[Self::CAUSE] &= !Self::CAUSE_IP2;
        }
    }

    /// An interrupt exception should be taken before the next instruction
    pub fn interrupt_ready(&self) -> bool {
        let status = self.status();
        let pending = self.regs[Self::CAUSE] & StatusFlags::IM.bits();
        status.contains(StatusFlags::IEC) && (status.bits() & pending) != 0
    }

    /// Record an exception and return the handler address
    ///
    /// Pushes the KU/IE mode stack (entering kernel mode with interrupts
    /// disabled), writes CAUSE and EPC, and updates BadVaddr for address
    /// errors. For an exception in a branch delay slot EPC points at the
    /// branch and CAUSE.BD is set.
    pub fn enter_exception(&mut self, entry: ExceptionEntry) -> u32 {
        let sr = self.regs[Self::SR];
        let mode = sr & 0x3F;
        self.regs[Self::SR] = (sr & !0x3F) | ((mode << 2) & 0x3F);

        let mut cause = self.regs[Self::CAUSE];
        cause &= !(0x7C | Self::CAUSE_BD | (0x3 << Self::CAUSE_CE_SHIFT));
        cause |= (entry.cause as u32) << 2;
        cause |= ((entry.coprocessor as u32) & 0x3) << Self::CAUSE_CE_SHIFT;

        let epc = if entry.in_delay_slot {
            cause |= Self::CAUSE_BD;
            entry.pc.wrapping_sub(4)
        } else {
            entry.pc
        };
        self.regs[Self::CAUSE] = cause;
        self.regs[Self::EPC] = epc;

        if let Some(address) = entry.bad_vaddr {
            self.regs[Self::BADA] = address;
        }

        if self.status().contains(StatusFlags::BEV) {
            Self::VECTOR_BOOT
        } else {
            Self::VECTOR_GENERAL
        }
    }

    /// RFE: pop the KU/IE mode stack
    ///
    /// The old pair is left in place, so two RFEs without an exception in
    /// between leave it duplicated, as on hardware.
    pub fn return_from_exception(&mut self) {
        let sr = self.regs[Self::SR];
        let mode = sr & 0x3F;
        self.regs[Self::SR] = (sr & !0xF) | (mode >> 2);
    }
}

impl Default for COP0 {
    fn default() -> Self {
        Self::new()
    }
}

impl Coprocessor for COP0 {
    fn number(&self) -> u8 {
        0
    }

    fn name(&self) -> &'static str {
        "COP0"
    }

    fn data_register(&self, index: u8) -> u32 {
        self.regs[(index & 0x1F) as usize]
    }

    fn set_data_register(&mut self, index: u8, value: u32) {
        let index = (index & 0x1F) as usize;
        match index {
            Self::CAUSE => {
                let cause = self.regs[Self::CAUSE];
                self.regs[Self::CAUSE] =
                    (cause & !Self::CAUSE_SW_MASK) | (value & Self::CAUSE_SW_MASK);
            }
            Self::BADA | Self::PRID => {
                log::debug!("Ignoring write to read-only COP0 r{}: 0x{:08X}", index, value);
            }
            Self::SR => {
                let status = StatusFlags::from_bits_retain(value);
                if status.contains(StatusFlags::ISC) != self.cache_isolated() {
                    log::debug!("Cache isolation {}", status.contains(StatusFlags::ISC));
                }
                self.regs[Self::SR] = value;
            }
            _ => self.regs[index] = value,
        }
    }

    fn control_register(&self, _index: u8) -> Result<u32> {
        Err(self.unimplemented(Instruction(0)))
    }

    fn set_control_register(&mut self, _index: u8, _value: u32) -> Result<()> {
        Err(self.unimplemented(Instruction(0)))
    }

    fn move_control_to_cop_fun(&mut self, instruction: Instruction) -> Result<()> {
        match instruction.register().funct() {
            0o20 => {
                self.return_from_exception();
                Ok(())
            }
            funct => {
                log::warn!("Unimplemented COP0 function 0o{:02o}", funct);
                Err(self.unimplemented(instruction))
            }
        }
    }

    fn move_control_from_cop(
        &self,
        instruction: Instruction,
        _regs: &mut RegisterFile,
    ) -> Result<()> {
        Err(self.unimplemented(instruction))
    }

    fn move_control_to_cop(
        &mut self,
        instruction: Instruction,
        _regs: &RegisterFile,
    ) -> Result<()> {
        Err(self.unimplemented(instruction))
    }

    fn load_word_to_cop(
        &mut self,
        instruction: Instruction,
        _regs: &RegisterFile,
        _bus: &mut Bus,
    ) -> Result<()> {
        Err(self.unimplemented(instruction))
    }

    fn store_word_from_cop(
        &self,
        instruction: Instruction,
        _regs: &RegisterFile,
        _bus: &mut Bus,
    ) -> Result<()> {
        Err(self.unimplemented(instruction))
    }

    /// COP0 has no control bank: only the 32 data registers are stored
    fn save_state(&self, sink: &mut dyn Write) -> Result<()> {
        write_words(sink, &self.regs)
    }

    fn load_state(&mut self, source: &mut dyn Read) -> Result<()> {
        read_words(source, &mut self.regs)
    }
}
