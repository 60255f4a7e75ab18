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

//! System wrapper
//!
//! Owns the CPU and the memory bus and drives them one step at a time.

#[cfg(test)]
mod tests;

use std::path::Path;

use serde::Serialize;

use super::config::EmulatorConfig;
use super::cpu::CPU;
use super::error::{EmulatorError, Result};
use super::loader::Executable;
use super::memory::Bus;

/// PlayStation CPU and memory
///
/// # Example
/// ```
/// use psrx_core::core::system::System;
///
/// let mut system = System::with_reset_vector(0x80010000);
/// // ADDIU r1, r0, 5
/// system.load_program(0x80010000, &0x24010005u32.to_le_bytes()).unwrap();
/// system.step().unwrap();
/// assert_eq!(system.cpu().reg(1), 5);
/// ```
pub struct System {
    /// CPU instance
    cpu: CPU,
    /// Memory bus
    bus: Bus,
    /// Steps retired since the last reset
    steps: u64,
}

/// Outcome of [`System::run`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Steps retired, including those that hit an unimplemented function
    pub executed: u64,
    /// Coprocessor functions that were not implemented
    pub unimplemented: u64,
    /// The run ended early on an unimplemented function
    pub stopped: bool,
}

impl System {
    /// Create a system that boots from the BIOS reset vector
    pub fn new() -> Self {
        Self {
            cpu: CPU::new(),
            bus: Bus::new(),
            steps: 0,
        }
    }

    /// Create a system that starts at `reset_vector`
    pub fn with_reset_vector(reset_vector: u32) -> Self {
        Self {
            cpu: CPU::with_reset_vector(reset_vector),
            bus: Bus::new(),
            steps: 0,
        }
    }

    /// Build a system from configuration, loading any images it names
    ///
    /// # Errors
    ///
    /// Fails when the BIOS or program image cannot be read or does not fit
    /// in memory.
    pub fn from_config(config: &EmulatorConfig) -> Result<Self> {
        let mut system = Self::with_reset_vector(config.cpu.reset_vector);

        if let Some(bios) = &config.memory.bios {
            system.load_bios(bios)?;
        }
        if let Some(program) = &config.memory.program {
            let image = std::fs::read(program)?;
            system.load_program(config.memory.program_address, &image)?;
        }

        Ok(system)
    }

    /// Load a BIOS image from disk
    pub fn load_bios(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.bus.load_bios(path)
    }

    /// Copy a raw program image into memory
    pub fn load_program(&mut self, address: u32, image: &[u8]) -> Result<()> {
        self.bus.load_program(address, image)
    }

    /// Install a PSX-EXE and jump to its entry point
    pub fn load_executable(&mut self, exe: &Executable) -> Result<()> {
        exe.install(&mut self.cpu, &mut self.bus)
    }

    /// Reset CPU and volatile memory
    ///
    /// The BIOS image survives a reset.
    pub fn reset(&mut self) {
        self.cpu.reset();
        self.bus.reset();
        self.steps = 0;
        log::info!("System reset, PC=0x{:08X}", self.cpu.pc());
    }

    /// Execute a single CPU step
    ///
    /// An unimplemented coprocessor function still retires and counts as a
    /// step before its error is returned.
    pub fn step(&mut self) -> Result<()> {
        let result = self.cpu.step(&mut self.bus);
        if matches!(result, Ok(()) | Err(EmulatorError::Unimplemented { .. })) {
            self.steps += 1;
        }
        result
    }

    /// Execute `n` steps, stopping at the first error
    pub fn step_n(&mut self, n: usize) -> Result<()> {
        for _ in 0..n {
            self.step()?;
        }
        Ok(())
    }

    /// Execute up to `n` steps, tolerating unimplemented functions
    ///
    /// With `stop_on_unimplemented` the run ends at the first unimplemented
    /// function; otherwise it is counted and execution carries on.
    pub fn run(&mut self, n: u64, stop_on_unimplemented: bool) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        while summary.executed < n {
            match self.step() {
                Ok(()) => summary.executed += 1,
                Err(EmulatorError::Unimplemented { .. }) => {
                    summary.executed += 1;
                    summary.unimplemented += 1;
                    if stop_on_unimplemented {
                        summary.stopped = true;
                        break;
                    }
                }
                Err(err) => return Err(err),
            }
        }

        Ok(summary)
    }

    /// Current program counter
    pub fn pc(&self) -> u32 {
        self.cpu.pc()
    }

    /// Steps retired since the last reset
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub(crate) fn set_steps(&mut self, steps: u64) {
        self.steps = steps;
    }

    pub fn cpu(&self) -> &CPU {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut CPU {
        &mut self.cpu
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }
}

impl Default for System {
    fn default() -> Self {
        Self::new()
    }
}
