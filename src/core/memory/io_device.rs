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

//! I/O device trait for memory-mapped peripherals
//!
//! Peripherals attach to a port of the I/O window and receive byte-level
//! accesses. Wider CPU accesses are split into little-endian byte accesses
//! by the bus, so a device only ever sees `get_byte` / `set_byte`.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              Memory Bus                     │
//! ├─────────────────────────────────────────────┤
//! │  IoPorts: port table                        │
//! │                                             │
//! │  get(offset) {                              │
//! │    port = Port::at(offset)                  │
//! │    match port.device {                      │
//! │      Some(dev) => dev.get_byte(rel_offset)  │
//! │      None      => latch[rel_offset]         │
//! │    }                                        │
//! │  }                                          │
//! └─────────────────────────────────────────────┘
//!           ▲                   ▲
//!           │                   │
//!    ┌──────┴──────┐    ┌──────┴──────┐
//!    │   GPU       │    │  Timers     │
//!    │ (IODevice)  │    │ (IODevice)  │
//!    └─────────────┘    └─────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use psrx_core::core::memory::IODevice;
//!
//! struct Latch {
//!     registers: [u8; 8],
//! }
//!
//! impl IODevice for Latch {
//!     fn get_byte(&mut self, offset: u32) -> u8 {
//!         self.registers[offset as usize % 8]
//!     }
//!
//!     fn set_byte(&mut self, offset: u32, value: u8) {
//!         self.registers[offset as usize % 8] = value;
//!     }
//! }
//! ```

/// Trait for memory-mapped I/O devices
///
/// The bus translates addresses to port-relative offsets before calling
/// trait methods. For example, with the GPU port at `0x1F801810`, an access
/// to `0x1F801814` reaches the device with offset `0x04`.
///
/// IODevice implementations do not need to be `Send` or `Sync`; the bus is
/// owned by a single emulation thread.
pub trait IODevice {
    /// Read one byte, possibly with side effects (FIFO pops, flag clears)
    fn get_byte(&mut self, offset: u32) -> u8;

    /// Write one byte
    fn set_byte(&mut self, offset: u32, value: u8);

    /// Read one byte without side effects
    ///
    /// Used by debugger-style probing. Devices that cannot answer without
    /// disturbing their state return `None`, which the bus reports as an
    /// unsupported probe.
    fn peek_byte(&self, _offset: u32) -> Option<u8> {
        None
    }

    /// Take a pending interrupt request, clearing it in the device
    ///
    /// The I/O router polls this and raises the port's line in `I_STAT`.
    fn take_interrupt(&mut self) -> bool {
        false
    }

    /// Return the device to its power-on state
    fn reset(&mut self) {}

    /// Optional: Device name for debugging
    fn name(&self) -> &str {
        "Unknown Device"
    }
}
