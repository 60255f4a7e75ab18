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

//! MIPS R3000A CPU core
//!
//! The CPU owns its register file and coprocessors and borrows the memory
//! bus for every step. Branch delay slots are modelled with three program
//! counters:
//!
//! ```text
//!  current_pc   instruction being executed
//!  pc           next fetch (the delay slot while a branch executes)
//!  next_pc      what pc becomes after retire; branches overwrite it
//! ```
//!
//! Load delay slots are handled by the staged [`RegisterFile`].

use crate::core::error::{AccessKind, EmulatorError, Result};
use crate::core::gte::GTE;
use crate::core::memory::Bus;
use serde::Serialize;
use std::fmt;
use std::io::{Read, Write};

// Module declarations
mod cop0;
pub mod coprocessor;
pub mod decode;
mod instructions;
mod registers;
#[cfg(test)]
mod tests;

// Re-exports
pub use cop0::{ExceptionCause, ExceptionEntry, StatusFlags, COP0};
pub use coprocessor::{CopOutcome, Coprocessor};
pub use decode::Instruction;
pub use registers::{RegisterFile, REGISTER_COUNT, REGISTER_FILE_STATE_SIZE};

use registers::{read_words, write_words};

/// Default reset vector (start of the BIOS through KSEG1)
pub const RESET_VECTOR: u32 = 0xBFC0_0000;

/// Size of the blob written by [`CPU::save_state`]
///
/// Register file, five words, a flags byte, the COP0 data bank and both
/// GTE banks.
pub const CPU_STATE_SIZE: usize = REGISTER_FILE_STATE_SIZE + 5 * 4 + 1 + 32 * 4 + 64 * 4;

/// CPU (MIPS R3000A) emulation implementation
///
/// # Specifications
/// - Architecture: MIPS I (32-bit)
/// - Registers: 32 general-purpose registers + HI/LO
/// - Coprocessors: COP0 (system control), COP2 (GTE)
///
/// # Example
/// ```
/// use psrx_core::core::cpu::CPU;
///
/// let mut cpu = CPU::new();
/// cpu.reset();
/// assert_eq!(cpu.reg(0), 0); // r0 is always 0
/// assert_eq!(cpu.pc(), 0xBFC00000);
/// ```
pub struct CPU {
    /// General purpose registers with load-delay staging
    regs: RegisterFile,

    /// Address of the instruction currently executing
    current_pc: u32,

    /// Program counter (next fetch)
    pc: u32,

    /// Next PC (for delay slot handling)
    next_pc: u32,

    /// HI register (multiplication/division result upper 32 bits)
    hi: u32,

    /// LO register (multiplication/division result lower 32 bits)
    lo: u32,

    /// Coprocessor 0 (System Control Unit)
    cop0: COP0,

    /// Coprocessor 2 (Geometry Transformation Engine)
    gte: GTE,

    /// The executing instruction sits in a branch delay slot
    in_delay_slot: bool,

    /// A branch taken by the executing instruction
    branch_taken: bool,

    /// Current instruction (for debugging)
    current_instruction: Instruction,

    /// Address loaded into PC on reset
    reset_vector: u32,
}

impl CPU {
    /// Create a new CPU instance with initial state
    ///
    /// The CPU is initialized with the following state:
    /// - All general purpose registers: 0
    /// - PC: 0xBFC00000 (BIOS entry point)
    /// - next_pc: 0xBFC00004
    /// - COP0 SR: 0x10900000
    /// - COP0 PRID: 0x00000002
    pub fn new() -> Self {
        Self::with_reset_vector(RESET_VECTOR)
    }

    /// Create a CPU that starts executing at `reset_vector`
    ///
    /// # Example
    /// ```
    /// use psrx_core::core::cpu::CPU;
    ///
    /// let cpu = CPU::with_reset_vector(0x80010000);
    /// assert_eq!(cpu.pc(), 0x80010000);
    /// ```
    pub fn with_reset_vector(reset_vector: u32) -> Self {
        Self {
            regs: RegisterFile::new(),
            current_pc: reset_vector,
            pc: reset_vector,
            next_pc: reset_vector.wrapping_add(4),
            hi: 0,
            lo: 0,
            cop0: COP0::new(),
            gte: GTE::new(),
            in_delay_slot: false,
            branch_taken: false,
            current_instruction: Instruction(0),
            reset_vector,
        }
    }

    /// Reset CPU to initial state
    ///
    /// Resets all registers and state to initial values.
    /// This mimics the behavior of power-on or hardware reset.
    pub fn reset(&mut self) {
        self.regs.reset();
        self.current_pc = self.reset_vector;
        self.pc = self.reset_vector;
        self.next_pc = self.reset_vector.wrapping_add(4);
        self.hi = 0;
        self.lo = 0;
        self.cop0.reset();
        self.gte.reset();
        self.in_delay_slot = false;
        self.branch_taken = false;
        self.current_instruction = Instruction(0);
    }

    /// Read from general purpose register
    ///
    /// Returns the value visible to the executing instruction. r0 always
    /// returns 0.
    ///
    /// # Example
    /// ```
    /// use psrx_core::core::cpu::CPU;
    ///
    /// let cpu = CPU::new();
    /// assert_eq!(cpu.reg(0), 0);
    /// ```
    #[inline(always)]
    pub fn reg(&self, index: u8) -> u32 {
        self.regs.get(index)
    }

    /// Write to general purpose register, visible immediately
    ///
    /// # Example
    /// ```
    /// use psrx_core::core::cpu::CPU;
    ///
    /// let mut cpu = CPU::new();
    /// cpu.set_reg(1, 0x12345678);
    /// assert_eq!(cpu.reg(1), 0x12345678);
    ///
    /// // Writes to r0 are ignored
    /// cpu.set_reg(0, 0xDEADBEEF);
    /// assert_eq!(cpu.reg(0), 0);
    /// ```
    #[inline(always)]
    pub fn set_reg(&mut self, index: u8, value: u32) {
        self.regs.set(index, value, false);
    }

    /// Write to register with load delay
    ///
    /// The value becomes visible once the instruction after the load has
    /// executed.
    #[inline(always)]
    pub fn set_reg_delayed(&mut self, index: u8, value: u32) {
        self.regs.set(index, value, true);
    }

    /// Execute one instruction
    ///
    /// This is the main CPU execution step. It performs:
    /// 1. Interrupt sampling (a pending interrupt is taken before the fetch)
    /// 2. Instruction fetch from memory
    /// 3. PC update (with delay slot handling)
    /// 4. Instruction execution
    /// 5. Retire: the register file advances one stage
    ///
    /// Program-visible traps (bus faults, overflow, SYSCALL, BREAK, reserved
    /// instructions, unusable coprocessors) are delivered to COP0 and the
    /// step succeeds. Coprocessor functions that are not modelled retire
    /// without effect and are returned as [`EmulatorError::Unimplemented`].
    ///
    /// # Example
    ///
    /// ```
    /// use psrx_core::core::cpu::CPU;
    /// use psrx_core::core::memory::Bus;
    ///
    /// let mut cpu = CPU::with_reset_vector(0x80000000);
    /// let mut bus = Bus::new();
    ///
    /// // ADDIU r1, r0, 7
    /// bus.write32(0x80000000, 0x24010007).unwrap();
    /// cpu.step(&mut bus).unwrap();
    /// assert_eq!(cpu.reg(1), 7);
    /// assert_eq!(cpu.pc(), 0x80000004);
    /// ```
    pub fn step(&mut self, bus: &mut Bus) -> Result<()> {
        self.cop0.set_interrupt_line(bus.interrupt_pending());
        if self.cop0.interrupt_ready() {
            // Loads in flight land before the handler's first instruction
            self.regs.tick();
            let entry = ExceptionEntry::new(ExceptionCause::Interrupt, self.pc, self.branch_taken);
            self.enter_exception(entry);
            return Ok(());
        }

        self.current_pc = self.pc;
        self.in_delay_slot = self.branch_taken;
        self.branch_taken = false;

        let instruction = match bus.read32(self.current_pc) {
            Ok(word) => Instruction(word),
            Err(err) => {
                self.regs.tick();
                return self.deliver(err, AccessKind::Fetch);
            }
        };
        self.current_instruction = instruction;

        self.pc = self.next_pc;
        self.next_pc = self.next_pc.wrapping_add(4);

        let result = self.execute_instruction(instruction, bus);
        self.regs.tick();

        match result {
            Ok(()) => Ok(()),
            Err(err) => self.deliver(err, Self::access_kind(instruction)),
        }
    }

    /// Execute a single instruction word against the current state
    ///
    /// Unlike [`step`](Self::step) this does not fetch, does not advance the
    /// program counters before executing and does not deliver exceptions:
    /// any failure is returned as is. The register file is still retired
    /// so load delays behave as they do under `step`.
    ///
    /// # Example
    ///
    /// ```
    /// use psrx_core::core::cpu::{Instruction, CPU};
    /// use psrx_core::core::memory::Bus;
    ///
    /// let mut cpu = CPU::new();
    /// let mut bus = Bus::new();
    ///
    /// // ADDI r1, r1, 10 then ADDI r1, r1, -10
    /// cpu.execute(Instruction(0x2021000A), &mut bus).unwrap();
    /// cpu.execute(Instruction(0x2021FFF6), &mut bus).unwrap();
    /// assert_eq!(cpu.reg(1), 0);
    /// ```
    pub fn execute(&mut self, instruction: Instruction, bus: &mut Bus) -> Result<()> {
        self.current_instruction = instruction;
        let result = self.execute_instruction(instruction, bus);
        self.regs.tick();
        result
    }

    /// Classify the bus accesses an instruction performs
    fn access_kind(instruction: Instruction) -> AccessKind {
        use decode::op;
        match instruction.opcode() {
            op::SB | op::SH | op::SWL | op::SW | op::SWR | op::SWC0..=op::SWC3 => {
                AccessKind::Store
            }
            _ => AccessKind::Load,
        }
    }

    /// Route an execution error: traps go to COP0, everything else to the caller
    fn deliver(&mut self, err: EmulatorError, access: AccessKind) -> Result<()> {
        let Some(cause) = err.exception_cause(access) else {
            if let EmulatorError::Unimplemented { .. } = err {
                log::warn!("{} at PC=0x{:08X}", err, self.current_pc);
            }
            return Err(err);
        };

        let mut entry = ExceptionEntry::new(cause, self.current_pc, self.in_delay_slot);
        entry.bad_vaddr = err.bad_address();
        if cause == ExceptionCause::CoprocessorUnusable {
            entry.coprocessor = self.current_instruction.opcode() & 0x3;
        }
        self.enter_exception(entry);
        Ok(())
    }

    /// Record an exception in COP0 and jump to the vector it returns
    fn enter_exception(&mut self, entry: ExceptionEntry) {
        let handler = self.cop0.enter_exception(entry);

        match entry.cause {
            ExceptionCause::Interrupt | ExceptionCause::Syscall => log::debug!(
                "EXCEPTION: cause={:?}, EPC=0x{:08X}, handler=0x{:08X}",
                entry.cause,
                self.cop0.epc(),
                handler
            ),
            _ => log::warn!(
                "EXCEPTION: cause={:?}, EPC=0x{:08X}, handler=0x{:08X}, in_delay={}, instruction={:?}",
                entry.cause,
                self.cop0.epc(),
                handler,
                entry.in_delay_slot,
                self.current_instruction
            ),
        }

        self.pc = handler;
        self.next_pc = handler.wrapping_add(4);
        self.branch_taken = false;
    }

    /// Redirect execution: the next fetch happens at `address`
    ///
    /// # Example
    /// ```
    /// use psrx_core::core::cpu::CPU;
    ///
    /// let mut cpu = CPU::new();
    /// cpu.set_pc(0x80010000);
    /// assert_eq!(cpu.pc(), 0x80010000);
    /// assert_eq!(cpu.next_pc(), 0x80010004);
    /// ```
    pub fn set_pc(&mut self, address: u32) {
        self.pc = address;
        self.next_pc = address.wrapping_add(4);
        self.branch_taken = false;
    }

    /// Address of the next instruction to fetch
    pub fn pc(&self) -> u32 {
        self.pc
    }

    /// Value `pc` takes after the next retire
    pub fn next_pc(&self) -> u32 {
        self.next_pc
    }

    /// Address of the most recently executed instruction
    pub fn current_pc(&self) -> u32 {
        self.current_pc
    }

    /// Most recently executed instruction
    pub fn current_instruction(&self) -> Instruction {
        self.current_instruction
    }

    /// Check if the last instruction executed in a branch delay slot
    pub fn in_delay_slot(&self) -> bool {
        self.in_delay_slot
    }

    pub fn hi(&self) -> u32 {
        self.hi
    }

    pub fn lo(&self) -> u32 {
        self.lo
    }

    /// The general purpose register file
    pub fn registers(&self) -> &RegisterFile {
        &self.regs
    }

    pub fn cop0(&self) -> &COP0 {
        &self.cop0
    }

    pub fn cop0_mut(&mut self) -> &mut COP0 {
        &mut self.cop0
    }

    pub fn gte(&self) -> &GTE {
        &self.gte
    }

    pub fn gte_mut(&mut self) -> &mut GTE {
        &mut self.gte
    }

    /// Serialize the complete processor state
    ///
    /// Layout: register file, `current_pc`, `pc`, `next_pc`, `hi`, `lo`
    /// (little-endian words), one flags byte, the COP0 block and the GTE
    /// block.
    pub fn save_state(&self, sink: &mut dyn Write) -> Result<()> {
        self.regs.save_state(sink)?;
        write_words(
            sink,
            &[self.current_pc, self.pc, self.next_pc, self.hi, self.lo],
        )?;
        let flags = (self.in_delay_slot as u8) | ((self.branch_taken as u8) << 1);
        sink.write_all(&[flags])?;
        self.cop0.save_state(sink)?;
        self.gte.save_state(sink)
    }

    /// Restore the layout written by [`save_state`](Self::save_state)
    pub fn load_state(&mut self, source: &mut dyn Read) -> Result<()> {
        self.regs.load_state(source)?;
        let mut words = [0u32; 5];
        read_words(source, &mut words)?;
        let [current_pc, pc, next_pc, hi, lo] = words;
        self.current_pc = current_pc;
        self.pc = pc;
        self.next_pc = next_pc;
        self.hi = hi;
        self.lo = lo;

        let mut flags = [0u8; 1];
        source.read_exact(&mut flags)?;
        self.in_delay_slot = flags[0] & 0x1 != 0;
        self.branch_taken = flags[0] & 0x2 != 0;

        self.cop0.load_state(source)?;
        self.gte.load_state(source)
    }

    /// Capture the program-visible registers
    pub fn snapshot(&self) -> CpuSnapshot {
        let mut gpr = [0u32; REGISTER_COUNT];
        for (i, value) in gpr.iter_mut().enumerate() {
            *value = self.reg(i as u8);
        }
        CpuSnapshot {
            pc: self.pc,
            next_pc: self.next_pc,
            hi: self.hi,
            lo: self.lo,
            gpr,
            sr: self.cop0.status().bits(),
            cause: self.cop0.cause(),
            epc: self.cop0.epc(),
            bad_vaddr: self.cop0.bad_vaddr(),
        }
    }

    /// Log all CPU registers at debug level
    pub fn dump_registers(&self) {
        for line in self.snapshot().to_string().lines() {
            log::debug!("{}", line);
        }
    }
}

impl Default for CPU {
    fn default() -> Self {
        Self::new()
    }
}

/// Program-visible CPU registers at one point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CpuSnapshot {
    pub pc: u32,
    pub next_pc: u32,
    pub hi: u32,
    pub lo: u32,
    pub gpr: [u32; REGISTER_COUNT],
    pub sr: u32,
    pub cause: u32,
    pub epc: u32,
    pub bad_vaddr: u32,
}

impl fmt::Display for CpuSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "PC: 0x{:08X}  Next PC: 0x{:08X}", self.pc, self.next_pc)?;
        writeln!(f, "HI: 0x{:08X}  LO: 0x{:08X}", self.hi, self.lo)?;

        // General-purpose registers in rows of 4
        for row in self.gpr.chunks(4).enumerate() {
            let (i, values) = row;
            for (j, value) in values.iter().enumerate() {
                write!(f, "r{:<2}: 0x{:08X}  ", i * 4 + j, value)?;
            }
            writeln!(f)?;
        }

        writeln!(f, "SR:    0x{:08X}", self.sr)?;
        writeln!(f, "CAUSE: 0x{:08X}", self.cause)?;
        writeln!(f, "EPC:   0x{:08X}", self.epc)?;
        write!(f, "BADA:  0x{:08X}", self.bad_vaddr)
    }
}
