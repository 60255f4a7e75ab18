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

//! I/O port window
//!
//! The 8KB window at physical `0x1F801000` is split into named ports. Each
//! port either forwards byte accesses to an attached [`IODevice`] or, when
//! nothing is attached, latches written bytes so that software probing
//! the hardware reads back what it wrote. Offsets outside every port are
//! bus faults.
//!
//! The interrupt controller registers `I_STAT` and `I_MASK` live here too:
//! writing `I_STAT` acknowledges (clears) the written-zero bits, and devices
//! raise their line through [`IODevice::take_interrupt`].

use super::IODevice;
use crate::core::error::{EmulatorError, Result};

/// Named ports of the I/O window
///
/// Offsets are relative to the start of the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Port {
    /// Memory control 1 (expansion base addresses and delays)
    MemoryControl1,
    /// Controller and memory card serial port
    Joypad,
    /// Memory control 2 (RAM size)
    MemoryControl2,
    /// Interrupt status register (I_STAT)
    InterruptStatus,
    /// Interrupt mask register (I_MASK)
    InterruptMask,
    /// DMA channels and control
    Dma,
    /// Root counters 0-2
    Timers,
    /// CD-ROM controller
    Cdrom,
    /// GPU GP0/GP1
    Gpu,
    /// SPU voice registers
    SpuVoices,
    /// SPU control registers
    SpuControl,
    /// Expansion region 2 POST display
    Post,
}

impl Port {
    /// Every port, ordered by offset
    pub const ALL: [Port; 12] = [
        Port::MemoryControl1,
        Port::Joypad,
        Port::MemoryControl2,
        Port::InterruptStatus,
        Port::InterruptMask,
        Port::Dma,
        Port::Timers,
        Port::Cdrom,
        Port::Gpu,
        Port::SpuVoices,
        Port::SpuControl,
        Port::Post,
    ];

    /// Offset and size of the port inside the I/O window
    pub const fn range(self) -> (u32, u32) {
        match self {
            Port::MemoryControl1 => (0x000, 0x24),
            Port::Joypad => (0x040, 0x10),
            Port::MemoryControl2 => (0x060, 0x04),
            Port::InterruptStatus => (0x070, 0x04),
            Port::InterruptMask => (0x074, 0x04),
            Port::Dma => (0x080, 0x80),
            Port::Timers => (0x100, 0x30),
            Port::Cdrom => (0x800, 0x04),
            Port::Gpu => (0x810, 0x08),
            Port::SpuVoices => (0xC00, 0x180),
            Port::SpuControl => (0xD80, 0x40),
            Port::Post => (0x1041, 0x01),
        }
    }

    /// Bit raised in `I_STAT` when a device on this port requests an interrupt
    pub const fn irq_line(self) -> Option<u32> {
        match self {
            Port::Gpu => Some(0),
            Port::Cdrom => Some(2),
            Port::Dma => Some(3),
            Port::Timers => Some(4),
            Port::Joypad => Some(7),
            Port::SpuVoices | Port::SpuControl => Some(9),
            _ => None,
        }
    }

    /// Find the port containing a window offset
    pub fn at(offset: u32) -> Option<(Port, u32)> {
        Port::ALL.iter().find_map(|&port| {
            let (start, size) = port.range();
            if offset >= start && offset - start < size {
                Some((port, offset - start))
            } else {
                None
            }
        })
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Storage behind one port
struct PortSlot {
    latch: Vec<u8>,
    device: Option<Box<dyn IODevice>>,
}

/// The I/O window router and interrupt controller
pub struct IoPorts {
    slots: Vec<PortSlot>,
    /// Interrupt status (I_STAT)
    status: u32,
    /// Interrupt mask (I_MASK)
    mask: u32,
}

impl IoPorts {
    /// Create the port table with every port latched
    pub fn new() -> Self {
        let slots = Port::ALL
            .iter()
            .map(|port| PortSlot {
                latch: vec![0; port.range().1 as usize],
                device: None,
            })
            .collect();

        Self {
            slots,
            status: 0,
            mask: 0,
        }
    }

    /// Clear latches and interrupt state, resetting attached devices
    pub fn reset(&mut self) {
        for slot in &mut self.slots {
            slot.latch.fill(0);
            if let Some(device) = slot.device.as_mut() {
                device.reset();
            }
        }
        self.status = 0;
        self.mask = 0;
    }

    /// Attach a device to a port, returning the one it replaces
    ///
    /// # Errors
    ///
    /// `ReservedPort` for the interrupt controller registers, which cannot
    /// be taken over by a device. The port is left unchanged.
    pub fn attach(
        &mut self,
        port: Port,
        device: Box<dyn IODevice>,
    ) -> Result<Option<Box<dyn IODevice>>> {
        if matches!(port, Port::InterruptStatus | Port::InterruptMask) {
            log::warn!("Refusing to attach {} to {:?}", device.name(), port);
            return Err(EmulatorError::ReservedPort(port));
        }
        log::debug!("Attached {} to {:?}", device.name(), port);
        Ok(self.slots[port.index()].device.replace(device))
    }

    /// Detach the device from a port, reverting it to a latch
    pub fn detach(&mut self, port: Port) -> Option<Box<dyn IODevice>> {
        self.slots[port.index()].device.take()
    }

    /// Whether the offset falls inside any port
    pub fn contains(&self, offset: u32) -> bool {
        Port::at(offset).is_some()
    }

    /// Read one byte at a window offset
    ///
    /// # Returns
    ///
    /// `None` when the offset is outside every port
    pub fn get(&mut self, offset: u32) -> Option<u8> {
        let (port, rel) = Port::at(offset)?;
        let value = match port {
            Port::InterruptStatus => (self.status >> (rel * 8)) as u8,
            Port::InterruptMask => (self.mask >> (rel * 8)) as u8,
            _ => {
                let slot = &mut self.slots[port.index()];
                match slot.device.as_mut() {
                    Some(device) => device.get_byte(rel),
                    None => slot.latch[rel as usize],
                }
            }
        };
        log::trace!("IO read {:?}+0x{:X} -> 0x{:02X}", port, rel, value);
        Some(value)
    }

    /// Read one byte without side effects
    ///
    /// # Returns
    ///
    /// `None` when the offset is outside every port or the attached device
    /// cannot be read without disturbing it
    pub fn peek(&self, offset: u32) -> Option<u8> {
        let (port, rel) = Port::at(offset)?;
        match port {
            Port::InterruptStatus => Some((self.status >> (rel * 8)) as u8),
            Port::InterruptMask => Some((self.mask >> (rel * 8)) as u8),
            _ => {
                let slot = &self.slots[port.index()];
                match slot.device.as_ref() {
                    Some(device) => device.peek_byte(rel),
                    None => Some(slot.latch[rel as usize]),
                }
            }
        }
    }

    /// Write one byte at a window offset
    ///
    /// # Returns
    ///
    /// `false` when the offset is outside every port
    pub fn set(&mut self, offset: u32, value: u8) -> bool {
        let Some((port, rel)) = Port::at(offset) else {
            return false;
        };
        log::trace!("IO write {:?}+0x{:X} <- 0x{:02X}", port, rel, value);

        let shift = rel * 8;
        match port {
            Port::InterruptStatus => {
                // Acknowledge: zero bits clear pending lines, one bits keep them
                let keep = !(0xFFu32 << shift) | ((value as u32) << shift);
                self.status &= keep;
            }
            Port::InterruptMask => {
                self.mask = (self.mask & !(0xFFu32 << shift)) | ((value as u32) << shift);
            }
            _ => {
                if port == Port::Post {
                    log::info!("POST: 0x{:02X}", value);
                }
                let slot = &mut self.slots[port.index()];
                match slot.device.as_mut() {
                    Some(device) => device.set_byte(rel, value),
                    None => slot.latch[rel as usize] = value,
                }
            }
        }
        true
    }

    /// Collect interrupt requests from attached devices into `I_STAT`
    pub fn poll_devices(&mut self) {
        for port in Port::ALL {
            let Some(line) = port.irq_line() else {
                continue;
            };
            if let Some(device) = self.slots[port.index()].device.as_mut() {
                if device.take_interrupt() {
                    log::trace!("IRQ{} raised by {}", line, device.name());
                    self.status |= 1 << line;
                }
            }
        }
    }

    /// Raise an interrupt line directly
    pub fn request_interrupt(&mut self, line: u32) {
        if line < 11 {
            self.status |= 1 << line;
        }
    }

    /// Current I_STAT value
    pub fn status(&self) -> u32 {
        self.status
    }

    /// Current I_MASK value
    pub fn mask(&self) -> u32 {
        self.mask
    }

    /// Whether an unmasked interrupt is pending
    pub fn interrupt_pending(&self) -> bool {
        self.status & self.mask != 0
    }

    /// Overwrite I_STAT and I_MASK, as when restoring a save state
    pub fn restore_interrupts(&mut self, status: u32, mask: u32) {
        self.status = status;
        self.mask = mask;
    }
}

impl Default for IoPorts {
    fn default() -> Self {
        Self::new()
    }
}
