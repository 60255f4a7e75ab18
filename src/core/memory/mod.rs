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

//! Memory bus implementation for PlayStation 1 emulator
//!
//! The Bus is the central component for all memory operations in the emulator.
//! It translates virtual addresses through the segment views, routes byte
//! accesses to the backing region and composes wider accesses from bytes.
//!
//! # Memory Map
//!
//! Segment-relative addresses (the same for KUSEG, KSEG0 and KSEG1):
//!
//! | Address Range          | Region        | Size   |
//! |------------------------|---------------|--------|
//! | 0x00000000-0x001FFFFF  | RAM           | 2MB    |
//! | 0x1F000000-0x1F00FFFF  | Parallel port | 64KB   |
//! | 0x1F800000-0x1F8003FF  | Scratchpad    | 1KB    |
//! | 0x1F801000-0x1F802FFF  | I/O Ports     | 8KB    |
//! | 0x1FC00000-0x1FC7FFFF  | BIOS          | 512KB  |
//!
//! KSEG2 exposes only the cache-control window at `0xFFFE0000-0xFFFE01FF`.
//! Every other address is a [`BusFault`](EmulatorError::BusFault).
//!
//! # Example
//!
//! ```
//! use psrx_core::core::memory::Bus;
//!
//! let mut bus = Bus::new();
//!
//! // Write to RAM via KSEG0
//! bus.write32(0x80000000, 0x12345678).unwrap();
//!
//! // Read from same location via different segment (should mirror)
//! assert_eq!(bus.read32(0x00000000).unwrap(), 0x12345678);
//! assert_eq!(bus.read32(0xA0000000).unwrap(), 0x12345678);
//! ```

mod io_device;
mod io_ports;
mod region;

#[cfg(test)]
mod tests;

pub use io_device::IODevice;
pub use io_ports::{IoPorts, Port};
pub use region::{
    translate, MemoryRegion, RegionRange, Segment, BIOS_SIZE, BIOS_START, CACHE_CONTROL,
    CACHE_CONTROL_SIZE, CACHE_CONTROL_START, IO_SIZE, IO_START, MAIN_MEMORY_SIZE,
    MAIN_MEMORY_START, PARALLEL_PORT_SIZE, PARALLEL_PORT_START, REGIONS, SCRATCHPAD_SIZE,
    SCRATCHPAD_START,
};

use crate::core::error::{EmulatorError, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Outcome of a side-effect-free probe
///
/// Debuggers and tracers inspect memory without raising faults or poking
/// devices. A probe either yields a value or reports that the address
/// cannot be read that way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe<T> {
    /// The address was readable
    Value(T),
    /// Unmapped, misaligned, or backed by a device without side-effect-free reads
    Unsupported,
}

impl<T> Probe<T> {
    /// Convert into an `Option`, dropping the unsupported case
    pub fn value(self) -> Option<T> {
        match self {
            Probe::Value(value) => Some(value),
            Probe::Unsupported => None,
        }
    }
}

/// Single-byte operation routed by [`Bus::access`]
#[derive(Debug, Clone, Copy)]
enum ByteOp {
    Get,
    Set(u8),
}

/// Memory bus managing all memory accesses
///
/// The Bus handles all memory operations including RAM, scratchpad,
/// BIOS, the parallel port, the cache-control window and I/O ports.
pub struct Bus {
    /// Main RAM (2MB)
    ram: Vec<u8>,

    /// Parallel port / expansion region 1 (64KB)
    parallel_port: Vec<u8>,

    /// Scratchpad (1KB fast RAM)
    ///
    /// A small, fast RAM area used for time-critical data
    scratchpad: [u8; SCRATCHPAD_SIZE as usize],

    /// BIOS (512KB)
    ///
    /// Kept writable so that every mapped byte round-trips through the bus
    bios: Vec<u8>,

    /// Cache-control window (512 bytes)
    cache_control: [u8; CACHE_CONTROL_SIZE as usize],

    /// I/O window router and interrupt controller
    io: IoPorts,
}

impl Bus {
    /// Create a new Bus instance
    ///
    /// Initializes all memory regions with zeros and latches every I/O port.
    ///
    /// # Example
    ///
    /// ```
    /// use psrx_core::core::memory::Bus;
    ///
    /// let bus = Bus::new();
    /// ```
    pub fn new() -> Self {
        Self {
            ram: vec![0u8; MAIN_MEMORY_SIZE as usize],
            parallel_port: vec![0u8; PARALLEL_PORT_SIZE as usize],
            scratchpad: [0u8; SCRATCHPAD_SIZE as usize],
            bios: vec![0u8; BIOS_SIZE as usize],
            cache_control: [0u8; CACHE_CONTROL_SIZE as usize],
            io: IoPorts::new(),
        }
    }

    /// Reset the bus to initial state
    ///
    /// Clears volatile memory and I/O state. The BIOS image is preserved.
    ///
    /// # Example
    ///
    /// ```
    /// use psrx_core::core::memory::Bus;
    ///
    /// let mut bus = Bus::new();
    /// bus.write32(0x80000000, 0x12345678).unwrap();
    /// bus.reset();
    /// assert_eq!(bus.read32(0x80000000).unwrap(), 0x00000000);
    /// ```
    pub fn reset(&mut self) {
        self.ram.fill(0);
        self.parallel_port.fill(0);
        self.scratchpad.fill(0);
        self.cache_control.fill(0);
        self.io.reset();
    }

    /// Load BIOS from file
    ///
    /// Loads a BIOS ROM file into the BIOS region. The file must be
    /// exactly 512KB in size.
    ///
    /// # Errors
    ///
    /// - `EmulatorError::BiosNotFound` if the file cannot be opened
    /// - `EmulatorError::InvalidBiosSize` if the file is not 512KB
    /// - `EmulatorError::Io` if reading fails
    ///
    /// # Example
    ///
    /// ```no_run
    /// use psrx_core::core::memory::Bus;
    ///
    /// let mut bus = Bus::new();
    /// bus.load_bios("SCPH1001.BIN").unwrap();
    /// ```
    pub fn load_bios(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut file = File::open(path)
            .map_err(|_| EmulatorError::BiosNotFound(path.display().to_string()))?;

        let metadata = file.metadata()?;

        if metadata.len() != BIOS_SIZE as u64 {
            return Err(EmulatorError::InvalidBiosSize {
                expected: BIOS_SIZE as usize,
                got: metadata.len() as usize,
            });
        }

        file.read_exact(&mut self.bios)?;
        log::info!("Loaded BIOS from {}", path.display());

        Ok(())
    }

    /// Install a BIOS image from memory
    ///
    /// Images shorter than 512KB are placed at the start of the region and
    /// the remainder is zeroed. Longer images are rejected.
    pub fn load_bios_bytes(&mut self, image: &[u8]) -> Result<()> {
        if image.len() > self.bios.len() {
            return Err(EmulatorError::InvalidBiosSize {
                expected: BIOS_SIZE as usize,
                got: image.len(),
            });
        }
        self.bios.fill(0);
        self.bios[..image.len()].copy_from_slice(image);
        Ok(())
    }

    /// Copy a program image into memory starting at `vaddr`
    ///
    /// Every destination byte is checked before anything is written.
    pub fn load_program(&mut self, vaddr: u32, image: &[u8]) -> Result<()> {
        for i in 0..image.len() as u32 {
            self.check_mapped(vaddr.wrapping_add(i))?;
        }
        for (i, &byte) in image.iter().enumerate() {
            self.write8(vaddr.wrapping_add(i as u32), byte)?;
        }
        log::info!(
            "Loaded {} byte program at 0x{:08X}",
            image.len(),
            vaddr
        );
        Ok(())
    }

    /// Translate an address and perform one byte operation on its backing
    ///
    /// # Returns
    ///
    /// The byte read, or the byte written for `ByteOp::Set`
    fn access(&mut self, vaddr: u32, op: ByteOp) -> Result<u8> {
        let (region, offset) = translate(vaddr).ok_or_else(|| EmulatorError::unmapped(vaddr))?;
        let offset_usize = offset as usize;

        let backing: &mut [u8] = match region {
            MemoryRegion::MainMemory => &mut self.ram,
            MemoryRegion::ParallelPort => &mut self.parallel_port,
            MemoryRegion::Scratchpad => &mut self.scratchpad,
            MemoryRegion::BIOS => &mut self.bios,
            MemoryRegion::CacheControl => &mut self.cache_control,
            MemoryRegion::IO => {
                return match op {
                    ByteOp::Get => self
                        .io
                        .get(offset)
                        .ok_or_else(|| EmulatorError::unmapped(vaddr)),
                    ByteOp::Set(value) => {
                        if self.io.set(offset, value) {
                            Ok(value)
                        } else {
                            Err(EmulatorError::unmapped(vaddr))
                        }
                    }
                };
            }
            MemoryRegion::Unmapped => return Err(EmulatorError::unmapped(vaddr)),
        };

        match op {
            ByteOp::Get => Ok(backing[offset_usize]),
            ByteOp::Set(value) => {
                backing[offset_usize] = value;
                Ok(value)
            }
        }
    }

    /// Fail with a bus fault if the byte at `vaddr` has no backing
    fn check_mapped(&self, vaddr: u32) -> Result<()> {
        match translate(vaddr) {
            Some((MemoryRegion::IO, offset)) if !self.io.contains(offset) => {
                Err(EmulatorError::unmapped(vaddr))
            }
            Some(_) => Ok(()),
            None => Err(EmulatorError::unmapped(vaddr)),
        }
    }

    /// Validate alignment and mapping of every byte of a wide access
    fn check_access(&self, vaddr: u32, size: u8) -> Result<()> {
        if vaddr % size as u32 != 0 {
            return Err(EmulatorError::misaligned(vaddr, size));
        }
        (0..size as u32).try_for_each(|i| self.check_mapped(vaddr.wrapping_add(i)))
    }

    /// Read 8-bit value from memory
    ///
    /// 8-bit reads do not require alignment. Reads from I/O ports may have
    /// device side effects.
    ///
    /// # Example
    ///
    /// ```
    /// use psrx_core::core::memory::Bus;
    ///
    /// let mut bus = Bus::new();
    /// bus.write8(0x80000000, 0x42).unwrap();
    /// assert_eq!(bus.read8(0x80000000).unwrap(), 0x42);
    /// ```
    pub fn read8(&mut self, vaddr: u32) -> Result<u8> {
        self.access(vaddr, ByteOp::Get)
    }

    /// Read 16-bit value from memory (little-endian)
    ///
    /// The address must be 2-byte aligned.
    ///
    /// # Example
    ///
    /// ```
    /// use psrx_core::core::memory::Bus;
    ///
    /// let mut bus = Bus::new();
    /// bus.write16(0x80000000, 0x1234).unwrap();
    /// assert_eq!(bus.read16(0x80000000).unwrap(), 0x1234);
    ///
    /// // Unaligned access fails
    /// assert!(bus.read16(0x80000001).is_err());
    /// ```
    pub fn read16(&mut self, vaddr: u32) -> Result<u16> {
        self.check_access(vaddr, 2)?;
        let lo = self.read8(vaddr)?;
        let hi = self.read8(vaddr.wrapping_add(1))?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    /// Read 32-bit value from memory (little-endian)
    ///
    /// The address must be 4-byte aligned.
    ///
    /// # Example
    ///
    /// ```
    /// use psrx_core::core::memory::Bus;
    ///
    /// let mut bus = Bus::new();
    /// bus.write32(0x80000000, 0x12345678).unwrap();
    /// assert_eq!(bus.read32(0x80000000).unwrap(), 0x12345678);
    ///
    /// // Unaligned access fails
    /// assert!(bus.read32(0x80000001).is_err());
    /// ```
    pub fn read32(&mut self, vaddr: u32) -> Result<u32> {
        self.check_access(vaddr, 4)?;
        let mut bytes = [0u8; 4];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = self.read8(vaddr.wrapping_add(i as u32))?;
        }
        Ok(u32::from_le_bytes(bytes))
    }

    /// Write 8-bit value to memory
    pub fn write8(&mut self, vaddr: u32, value: u8) -> Result<()> {
        self.access(vaddr, ByteOp::Set(value)).map(|_| ())
    }

    /// Write 16-bit value to memory (little-endian)
    ///
    /// Nothing is written unless both bytes are mapped.
    pub fn write16(&mut self, vaddr: u32, value: u16) -> Result<()> {
        self.check_access(vaddr, 2)?;
        for (i, byte) in value.to_le_bytes().into_iter().enumerate() {
            self.write8(vaddr.wrapping_add(i as u32), byte)?;
        }
        Ok(())
    }

    /// Write 32-bit value to memory (little-endian)
    ///
    /// Nothing is written unless all four bytes are mapped.
    ///
    /// # Example
    ///
    /// ```
    /// use psrx_core::core::memory::Bus;
    ///
    /// let mut bus = Bus::new();
    /// bus.write32(0x1F800000, 0xAABBCCDD).unwrap();
    /// assert_eq!(bus.read8(0x1F800000).unwrap(), 0xDD);
    /// ```
    pub fn write32(&mut self, vaddr: u32, value: u32) -> Result<()> {
        self.check_access(vaddr, 4)?;
        for (i, byte) in value.to_le_bytes().into_iter().enumerate() {
            self.write8(vaddr.wrapping_add(i as u32), byte)?;
        }
        Ok(())
    }

    /// Read one byte without side effects or faults
    pub fn probe8(&self, vaddr: u32) -> Probe<u8> {
        let Some((region, offset)) = translate(vaddr) else {
            return Probe::Unsupported;
        };
        let offset_usize = offset as usize;
        let value = match region {
            MemoryRegion::MainMemory => Some(self.ram[offset_usize]),
            MemoryRegion::ParallelPort => Some(self.parallel_port[offset_usize]),
            MemoryRegion::Scratchpad => Some(self.scratchpad[offset_usize]),
            MemoryRegion::BIOS => Some(self.bios[offset_usize]),
            MemoryRegion::CacheControl => Some(self.cache_control[offset_usize]),
            MemoryRegion::IO => self.io.peek(offset),
            MemoryRegion::Unmapped => None,
        };
        value.map_or(Probe::Unsupported, Probe::Value)
    }

    /// Read an aligned word without side effects or faults
    ///
    /// # Example
    ///
    /// ```
    /// use psrx_core::core::memory::{Bus, Probe};
    ///
    /// let mut bus = Bus::new();
    /// bus.write32(0x80000010, 0xCAFEBABE).unwrap();
    ///
    /// assert_eq!(bus.probe32(0x80000010), Probe::Value(0xCAFEBABE));
    /// assert_eq!(bus.probe32(0x80000011), Probe::Unsupported);
    /// assert_eq!(bus.probe32(0xC0000000), Probe::Unsupported);
    /// ```
    pub fn probe32(&self, vaddr: u32) -> Probe<u32> {
        if vaddr & 0x3 != 0 {
            return Probe::Unsupported;
        }
        let mut bytes = [0u8; 4];
        for (i, byte) in bytes.iter_mut().enumerate() {
            match self.probe8(vaddr.wrapping_add(i as u32)) {
                Probe::Value(value) => *byte = value,
                Probe::Unsupported => return Probe::Unsupported,
            }
        }
        Probe::Value(u32::from_le_bytes(bytes))
    }

    /// Attach a device to an I/O port
    ///
    /// Returns the previously attached device, if any.
    ///
    /// # Errors
    ///
    /// `ReservedPort` when `port` is I_STAT or I_MASK
    pub fn attach_device(
        &mut self,
        port: Port,
        device: Box<dyn IODevice>,
    ) -> Result<Option<Box<dyn IODevice>>> {
        self.io.attach(port, device)
    }

    /// Detach the device from an I/O port, reverting it to a latch
    pub fn detach_device(&mut self, port: Port) -> Option<Box<dyn IODevice>> {
        self.io.detach(port)
    }

    /// Access the I/O window and interrupt controller
    pub fn io(&self) -> &IoPorts {
        &self.io
    }

    /// Mutable access to the I/O window and interrupt controller
    pub fn io_mut(&mut self) -> &mut IoPorts {
        &mut self.io
    }

    /// Poll devices and report whether an unmasked interrupt is pending
    pub fn interrupt_pending(&mut self) -> bool {
        self.io.poll_devices();
        self.io.interrupt_pending()
    }

    /// Main RAM contents
    pub fn ram(&self) -> &[u8] {
        &self.ram
    }

    /// Scratchpad contents
    pub fn scratchpad(&self) -> &[u8] {
        &self.scratchpad
    }

    /// Parallel port contents
    pub fn parallel_port(&self) -> &[u8] {
        &self.parallel_port
    }

    /// Cache-control window contents
    pub fn cache_control(&self) -> &[u8] {
        &self.cache_control
    }

    /// Restore volatile memory from a snapshot
    ///
    /// Each slice must match the size of its region exactly.
    pub fn restore_memory(
        &mut self,
        ram: &[u8],
        scratchpad: &[u8],
        parallel_port: &[u8],
        cache_control: &[u8],
    ) -> Result<()> {
        fn copy(name: &str, dst: &mut [u8], src: &[u8]) -> Result<()> {
            if dst.len() != src.len() {
                return Err(EmulatorError::SaveState(format!(
                    "{} size mismatch: expected {}, got {}",
                    name,
                    dst.len(),
                    src.len()
                )));
            }
            dst.copy_from_slice(src);
            Ok(())
        }

        copy("RAM", &mut self.ram, ram)?;
        copy("scratchpad", &mut self.scratchpad, scratchpad)?;
        copy("parallel port", &mut self.parallel_port, parallel_port)?;
        copy("cache control", &mut self.cache_control, cache_control)
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}
