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

/// Emulator error types
use thiserror::Error;

use crate::core::cpu::ExceptionCause;
use crate::core::memory::Port;

/// Result type for emulator operations
pub type Result<T> = std::result::Result<T, EmulatorError>;

/// Main error type for the emulator
///
/// `BusFault`, `Overflow` and `Unimplemented` are the conditions raised by the
/// CPU core itself. `Exception` carries the remaining synchronous traps
/// (SYSCALL, BREAK, reserved instructions, unusable coprocessors) from the
/// instruction that raised them to the COP0 exception entry.
#[derive(Error, Debug)]
pub enum EmulatorError {
    #[error("Bus fault ({kind}) at 0x{address:08X}")]
    BusFault { address: u32, kind: BusFaultKind },

    #[error("Arithmetic overflow at PC=0x{pc:08X}")]
    Overflow { pc: u32 },

    #[error("Unimplemented COP{coprocessor} function: 0x{instruction:08X}")]
    Unimplemented { coprocessor: u8, instruction: u32 },

    #[error("CPU exception: {0:?}")]
    Exception(ExceptionCause),

    #[error("BIOS file not found: {0}")]
    BiosNotFound(String),

    #[error("Invalid BIOS size: {got} bytes (expected {expected})")]
    InvalidBiosSize { expected: usize, got: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Save state error: {0}")]
    SaveState(String),

    #[error("Program loader error: {0}")]
    Loader(String),

    #[error("I/O port {0:?} cannot take a device")]
    ReservedPort(Port),
}

/// Why an address could not be accessed
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusFaultKind {
    /// The address resolves to no known region
    #[error("unmapped")]
    Unmapped,

    /// A halfword or word access that is not naturally aligned
    #[error("misaligned {size}-byte access")]
    Misaligned { size: u8 },
}

/// Kind of memory access that raised a bus fault
///
/// The same faulting address maps to different exception causes depending on
/// whether it came from an instruction fetch, a load or a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    Fetch,
    Load,
    Store,
}

impl EmulatorError {
    /// Shorthand for an unmapped-address fault
    pub fn unmapped(address: u32) -> Self {
        EmulatorError::BusFault {
            address,
            kind: BusFaultKind::Unmapped,
        }
    }

    /// Shorthand for a misaligned-access fault
    pub fn misaligned(address: u32, size: u8) -> Self {
        EmulatorError::BusFault {
            address,
            kind: BusFaultKind::Misaligned { size },
        }
    }

    /// Returns true for bus faults of any kind
    pub fn is_bus_fault(&self) -> bool {
        matches!(self, EmulatorError::BusFault { .. })
    }

    /// Map a CPU-level error to the exception the program should observe
    ///
    /// Returns `None` for errors that are not program-visible traps
    /// (unimplemented coprocessor functions and host-side failures); those are
    /// surfaced to the caller instead.
    ///
    /// # Arguments
    ///
    /// * `access` - The access kind used to classify bus faults
    pub fn exception_cause(&self, access: AccessKind) -> Option<ExceptionCause> {
        match self {
            EmulatorError::BusFault { kind, .. } => Some(match (kind, access) {
                (BusFaultKind::Misaligned { .. }, AccessKind::Store) => {
                    ExceptionCause::AddressErrorStore
                }
                (BusFaultKind::Misaligned { .. }, _) => ExceptionCause::AddressErrorLoad,
                (BusFaultKind::Unmapped, AccessKind::Fetch) => ExceptionCause::BusErrorInstruction,
                (BusFaultKind::Unmapped, _) => ExceptionCause::BusErrorData,
            }),
            EmulatorError::Overflow { .. } => Some(ExceptionCause::Overflow),
            EmulatorError::Exception(cause) => Some(*cause),
            _ => None,
        }
    }

    /// Faulting virtual address for address-error exceptions (BadVaddr)
    pub fn bad_address(&self) -> Option<u32> {
        match self {
            EmulatorError::BusFault {
                address,
                kind: BusFaultKind::Misaligned { .. },
            } => Some(*address),
            _ => None,
        }
    }
}
