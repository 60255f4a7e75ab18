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

//! Save states
//!
//! A save state bundles everything needed to resume the core at the exact
//! instruction it stopped on:
//! - Metadata (timestamp, label, step count)
//! - CPU state, as the fixed-size blob produced by [`CPU::save_state`]
//! - Volatile memory (RAM, scratchpad, parallel port, cache control)
//! - Interrupt state (I_STAT, I_MASK)
//!
//! The BIOS is not saved since it is reloaded from disk on startup.
//!
//! # Version Compatibility
//!
//! Loading a save state written with a different version fails.
//!
//! # Example
//!
//! ```no_run
//! use psrx_core::core::save_state::SaveState;
//! use psrx_core::core::System;
//!
//! let mut system = System::new();
//! // ... run emulation ...
//!
//! let state = SaveState::capture(&system, "checkpoint").unwrap();
//! state.save_to_file("save.state").unwrap();
//!
//! let loaded = SaveState::load_from_file("save.state").unwrap();
//! loaded.restore(&mut system).unwrap();
//! ```
//!
//! [`CPU::save_state`]: crate::core::cpu::CPU::save_state

use bincode::{config, Decode, Encode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use super::cpu::CPU_STATE_SIZE;
use super::error::{EmulatorError, Result};
use super::system::System;

/// Save state version for compatibility checking
pub const SAVE_STATE_VERSION: u32 = 1;

/// Complete core save state
#[derive(Debug, Serialize, Deserialize, Encode, Decode)]
pub struct SaveState {
    /// Version number for compatibility checking
    pub version: u32,

    pub metadata: SaveStateMetadata,

    /// Register file, program counters and coprocessor banks
    pub cpu: Vec<u8>,

    pub memory: MemoryState,

    pub interrupts: InterruptState,
}

/// When and where the save state was created
#[derive(Debug, Serialize, Deserialize, Encode, Decode)]
#[bincode(encode_bounds = "", decode_bounds = "")]
pub struct SaveStateMetadata {
    /// Timestamp when the save state was created
    #[bincode(with_serde)]
    pub timestamp: DateTime<Utc>,

    /// Free-form label (program name, checkpoint name)
    pub label: String,

    /// Steps retired when the state was taken
    pub steps: u64,
}

/// Volatile memory regions
#[derive(Debug, Serialize, Deserialize, Encode, Decode)]
pub struct MemoryState {
    /// Main RAM (2MB)
    pub ram: Vec<u8>,

    /// Scratchpad (1KB)
    pub scratchpad: Vec<u8>,

    /// Parallel port (64KB)
    pub parallel_port: Vec<u8>,

    /// Cache-control window (512 bytes)
    pub cache_control: Vec<u8>,
}

/// Interrupt controller registers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Encode, Decode)]
pub struct InterruptState {
    /// I_STAT
    pub status: u32,
    /// I_MASK
    pub mask: u32,
}

impl SaveState {
    /// Capture the current state of a system
    pub fn capture(system: &System, label: impl Into<String>) -> Result<Self> {
        let mut cpu = Vec::with_capacity(CPU_STATE_SIZE);
        system.cpu().save_state(&mut cpu)?;

        let bus = system.bus();
        let state = Self {
            version: SAVE_STATE_VERSION,
            metadata: SaveStateMetadata {
                timestamp: Utc::now(),
                label: label.into(),
                steps: system.steps(),
            },
            cpu,
            memory: MemoryState {
                ram: bus.ram().to_vec(),
                scratchpad: bus.scratchpad().to_vec(),
                parallel_port: bus.parallel_port().to_vec(),
                cache_control: bus.cache_control().to_vec(),
            },
            interrupts: InterruptState {
                status: bus.io().status(),
                mask: bus.io().mask(),
            },
        };

        log::debug!(
            "Captured save state '{}' at PC=0x{:08X}",
            state.metadata.label,
            system.pc()
        );
        Ok(state)
    }

    /// Restore this state into a system
    ///
    /// Memory is checked before anything is overwritten, so a malformed
    /// state leaves the system untouched.
    pub fn restore(&self, system: &mut System) -> Result<()> {
        if self.cpu.len() != CPU_STATE_SIZE {
            return Err(EmulatorError::SaveState(format!(
                "CPU state size mismatch: expected {}, got {}",
                CPU_STATE_SIZE,
                self.cpu.len()
            )));
        }

        {
            let bus = system.bus();
            let sizes = [
                (bus.ram().len(), self.memory.ram.len()),
                (bus.scratchpad().len(), self.memory.scratchpad.len()),
                (bus.parallel_port().len(), self.memory.parallel_port.len()),
                (bus.cache_control().len(), self.memory.cache_control.len()),
            ];
            if sizes.iter().any(|(expected, got)| expected != got) {
                return Err(EmulatorError::SaveState(
                    "memory region size mismatch".to_string(),
                ));
            }
        }

        system.cpu_mut().load_state(&mut self.cpu.as_slice())?;

        let bus = system.bus_mut();
        bus.restore_memory(
            &self.memory.ram,
            &self.memory.scratchpad,
            &self.memory.parallel_port,
            &self.memory.cache_control,
        )?;
        bus.io_mut()
            .restore_interrupts(self.interrupts.status, self.interrupts.mask);

        system.set_steps(self.metadata.steps);
        log::info!(
            "Restored save state '{}' ({})",
            self.metadata.label,
            self.metadata.timestamp
        );
        Ok(())
    }

    /// Save state to file
    ///
    /// # Errors
    ///
    /// Returns error if encoding fails or the file cannot be written
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let encoded = bincode::encode_to_vec(self, config::standard())
            .map_err(|e| EmulatorError::SaveState(e.to_string()))?;
        let mut file = File::create(path)?;
        file.write_all(&encoded)?;
        Ok(())
    }

    /// Load state from file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be opened or read
    /// - Decoding fails
    /// - Version is incompatible
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)?;

        let (state, _): (SaveState, usize) =
            bincode::decode_from_slice(&buffer, config::standard())
                .map_err(|e| EmulatorError::SaveState(e.to_string()))?;

        if state.version != SAVE_STATE_VERSION {
            return Err(EmulatorError::SaveState(format!(
                "Incompatible save state version: expected {}, got {}",
                SAVE_STATE_VERSION, state.version
            )));
        }

        Ok(state)
    }
}
