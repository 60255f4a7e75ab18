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

//! Memory segments, region table and address translation
//!
//! The top three bits of a virtual address select a segment. KUSEG, KSEG0
//! and KSEG1 are views of the same physical space: subtracting the segment
//! base yields a segment-relative address that is then matched against the
//! region table. KSEG2 only exposes the cache-control window.
//!
//! | Segment | Virtual range             | Base         |
//! |---------|---------------------------|--------------|
//! | KUSEG   | 0x00000000-0x7FFFFFFF     | 0x00000000   |
//! | KSEG0   | 0x80000000-0x9FFFFFFF     | 0x80000000   |
//! | KSEG1   | 0xA0000000-0xBFFFFFFF     | 0xA0000000   |
//! | KSEG2   | 0xC0000000-0xFFFFFFFF     | cache window |

use super::Bus;

/// Address-space view selected by the top bits of a virtual address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    /// User segment (top bits 0b000-0b011)
    Kuseg,
    /// Kernel cached segment (0b100)
    Kseg0,
    /// Kernel uncached segment (0b101)
    Kseg1,
    /// Kernel control segment (0b110-0b111), only the cache-control window exists
    Kseg2,
}

impl Segment {
    /// Select the segment of a virtual address
    #[inline(always)]
    pub fn of(vaddr: u32) -> Self {
        match vaddr >> 29 {
            0b000..=0b011 => Segment::Kuseg,
            0b100 => Segment::Kseg0,
            0b101 => Segment::Kseg1,
            _ => Segment::Kseg2,
        }
    }

    /// Base subtracted from addresses in this segment
    #[inline(always)]
    pub fn base(self) -> u32 {
        match self {
            Segment::Kuseg => 0x0000_0000,
            Segment::Kseg0 => 0x8000_0000,
            Segment::Kseg1 => 0xA000_0000,
            Segment::Kseg2 => CACHE_CONTROL_START,
        }
    }
}

/// Memory region identification
///
/// Used to identify which memory region an address belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryRegion {
    /// Main RAM (2MB)
    MainMemory,
    /// Parallel port / expansion region 1
    ParallelPort,
    /// Scratchpad (1KB)
    Scratchpad,
    /// I/O ports
    IO,
    /// BIOS ROM
    BIOS,
    /// Cache control window (KSEG2 only)
    CacheControl,
    /// Unmapped region
    Unmapped,
}

/// One entry of the static region table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionRange {
    pub region: MemoryRegion,
    pub start: u32,
    pub size: u32,
}

impl RegionRange {
    const fn new(region: MemoryRegion, start: u32, size: u32) -> Self {
        Self {
            region,
            start,
            size,
        }
    }

    /// Half-open containment check `[start, start + size)`
    #[inline(always)]
    pub fn contains(&self, addr: u32) -> bool {
        addr >= self.start && addr - self.start < self.size
    }
}

pub const MAIN_MEMORY_START: u32 = 0x0000_0000;
pub const MAIN_MEMORY_SIZE: u32 = 2 * 1024 * 1024;
pub const PARALLEL_PORT_START: u32 = 0x1F00_0000;
pub const PARALLEL_PORT_SIZE: u32 = 64 * 1024;
pub const SCRATCHPAD_START: u32 = 0x1F80_0000;
pub const SCRATCHPAD_SIZE: u32 = 1024;
pub const IO_START: u32 = 0x1F80_1000;
pub const IO_SIZE: u32 = 8 * 1024;
pub const BIOS_START: u32 = 0x1FC0_0000;
pub const BIOS_SIZE: u32 = 512 * 1024;
pub const CACHE_CONTROL_START: u32 = 0xFFFE_0000;
pub const CACHE_CONTROL_SIZE: u32 = 512;

/// Segment-relative regions, in match priority order
///
/// Ranges never overlap; `test_region_table_is_disjoint` keeps it that way.
pub const REGIONS: [RegionRange; 5] = [
    RegionRange::new(MemoryRegion::MainMemory, MAIN_MEMORY_START, MAIN_MEMORY_SIZE),
    RegionRange::new(MemoryRegion::ParallelPort, PARALLEL_PORT_START, PARALLEL_PORT_SIZE),
    RegionRange::new(MemoryRegion::Scratchpad, SCRATCHPAD_START, SCRATCHPAD_SIZE),
    RegionRange::new(MemoryRegion::IO, IO_START, IO_SIZE),
    RegionRange::new(MemoryRegion::BIOS, BIOS_START, BIOS_SIZE),
];

/// Cache-control window, reachable only through KSEG2
pub const CACHE_CONTROL: RegionRange = RegionRange::new(
    MemoryRegion::CacheControl,
    CACHE_CONTROL_START,
    CACHE_CONTROL_SIZE,
);

/// Translate a virtual address to a region and an offset inside it
///
/// # Returns
///
/// `None` when the address resolves to no region in its segment
///
/// # Example
///
/// ```
/// use psrx_core::core::memory::{translate, MemoryRegion};
///
/// assert_eq!(translate(0x8000_1234), Some((MemoryRegion::MainMemory, 0x1234)));
/// assert_eq!(translate(0xBFC0_0010), Some((MemoryRegion::BIOS, 0x10)));
/// assert_eq!(translate(0xFFFE_0130), Some((MemoryRegion::CacheControl, 0x130)));
/// assert_eq!(translate(0x1F80_0400), None);
/// ```
pub fn translate(vaddr: u32) -> Option<(MemoryRegion, u32)> {
    match Segment::of(vaddr) {
        Segment::Kseg2 => {
            if CACHE_CONTROL.contains(vaddr) {
                Some((MemoryRegion::CacheControl, vaddr - CACHE_CONTROL_START))
            } else {
                None
            }
        }
        segment => {
            let addr = vaddr - segment.base();
            REGIONS
                .iter()
                .find(|range| range.contains(addr))
                .map(|range| (range.region, addr - range.start))
        }
    }
}

impl Bus {
    /// Identify memory region for an address
    ///
    /// Determines which memory region a given virtual address belongs to.
    ///
    /// # Example
    ///
    /// ```
    /// use psrx_core::core::memory::{Bus, MemoryRegion};
    ///
    /// let bus = Bus::new();
    ///
    /// assert_eq!(bus.identify_region(0x00000000), MemoryRegion::MainMemory);
    /// assert_eq!(bus.identify_region(0x1F800000), MemoryRegion::Scratchpad);
    /// assert_eq!(bus.identify_region(0x1F801000), MemoryRegion::IO);
    /// assert_eq!(bus.identify_region(0xBFC00000), MemoryRegion::BIOS);
    /// assert_eq!(bus.identify_region(0x1FFFFFFF), MemoryRegion::Unmapped);
    /// ```
    pub fn identify_region(&self, vaddr: u32) -> MemoryRegion {
        translate(vaddr)
            .map(|(region, _)| region)
            .unwrap_or(MemoryRegion::Unmapped)
    }
}
