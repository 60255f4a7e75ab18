// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut

//! Memory bus access tests
//!
//! Tests for memory read/write operations with various data sizes,
//! alignment requirements, and endianness verification.

use super::helpers::assert_unmapped;
use super::*;
use crate::core::error::BusFaultKind;

#[test]
fn test_ram_read_write() {
    let mut bus = Bus::new();

    bus.write32(0x80000000, 0x12345678).unwrap();

    // Read from different segments (should all mirror)
    assert_eq!(bus.read32(0x00000000).unwrap(), 0x12345678);
    assert_eq!(bus.read32(0x80000000).unwrap(), 0x12345678);
    assert_eq!(bus.read32(0xA0000000).unwrap(), 0x12345678);
}

#[test]
fn test_bios_is_writable() {
    let mut bus = Bus::new();

    bus.write32(0xBFC00000, 0xDEADBEEF).unwrap();
    assert_eq!(bus.read32(0x9FC00000).unwrap(), 0xDEADBEEF);
}

#[test]
fn test_alignment() {
    let mut bus = Bus::new();

    // Unaligned 32-bit read should fail
    assert!(matches!(
        bus.read32(0x80000001),
        Err(EmulatorError::BusFault {
            address: 0x80000001,
            kind: BusFaultKind::Misaligned { size: 4 }
        })
    ));

    // Unaligned 16-bit read should fail
    assert!(matches!(
        bus.read16(0x80000001),
        Err(EmulatorError::BusFault {
            kind: BusFaultKind::Misaligned { size: 2 },
            ..
        })
    ));

    // 8-bit read can be unaligned
    assert!(bus.read8(0x80000001).is_ok());
}

#[test]
fn test_scratchpad_access() {
    let mut bus = Bus::new();

    bus.write32(0x1F800000, 0xABCDEF00).unwrap();
    assert_eq!(bus.read32(0x1F800000).unwrap(), 0xABCDEF00);
    assert_eq!(bus.scratchpad()[0], 0x00);
    assert_eq!(bus.scratchpad()[3], 0xAB);
}

#[test]
fn test_endianness() {
    let mut bus = Bus::new();

    // Write individual bytes
    bus.write8(0x80000000, 0x12).unwrap();
    bus.write8(0x80000001, 0x34).unwrap();
    bus.write8(0x80000002, 0x56).unwrap();
    bus.write8(0x80000003, 0x78).unwrap();

    // Read as 32-bit (little endian)
    assert_eq!(bus.read32(0x80000000).unwrap(), 0x78563412);
    assert_eq!(bus.read16(0x80000002).unwrap(), 0x7856);
}

#[test]
fn test_write16_alignment() {
    let mut bus = Bus::new();

    bus.write16(0x80000000, 0x1234).unwrap();
    assert_eq!(bus.read16(0x80000000).unwrap(), 0x1234);

    assert!(bus.write16(0x80000001, 0x5678).is_err());
    assert_eq!(bus.read8(0x80000001).unwrap(), 0x12);
}

#[test]
fn test_ram_boundary() {
    let mut bus = Bus::new();

    bus.write32(0x801FFFFC, 0xCAFEBABE).unwrap();
    assert_eq!(bus.read32(0x801FFFFC).unwrap(), 0xCAFEBABE);
    assert_unmapped(bus.read32(0x80200000), 0x80200000);
}

#[test]
fn test_cache_control_window() {
    let mut bus = Bus::new();

    bus.write32(0xFFFE0130, 0x0001E988).unwrap();
    assert_eq!(bus.read32(0xFFFE0130).unwrap(), 0x0001E988);
    assert_eq!(bus.cache_control()[0x130], 0x88);
}

#[test]
fn test_parallel_port_storage() {
    let mut bus = Bus::new();

    bus.write8(0x1F000084, 0x5A).unwrap();
    assert_eq!(bus.read8(0xBF000084).unwrap(), 0x5A);
    assert_eq!(bus.parallel_port()[0x84], 0x5A);
}

#[test]
fn test_word_write_is_all_or_nothing() {
    let mut bus = Bus::new();

    // Offset 0x1040 of the I/O window is a gap, 0x1041 is the POST byte.
    assert_unmapped(bus.write32(0x1F802040, 0xFFFFFFFF), 0x1F802040);
    assert_eq!(bus.read8(0x1F802041).unwrap(), 0x00);

    // Ports wide enough for the access take the whole word
    bus.write32(0x1F801040, 0xAABBCCDD).unwrap();
    assert_eq!(bus.read32(0x1F801040).unwrap(), 0xAABBCCDD);
}

#[test]
fn test_load_program() {
    let mut bus = Bus::new();

    bus.load_program(0x80010000, &[0x01, 0x02, 0x03, 0x04]).unwrap();
    assert_eq!(bus.read32(0x00010000).unwrap(), 0x04030201);

    // Rejected before anything is written
    assert!(bus.load_program(0x801FFFFE, &[0xAA; 4]).is_err());
    assert_eq!(bus.read16(0x801FFFFE).unwrap(), 0);
}

#[test]
fn test_load_bios_bytes() {
    let mut bus = Bus::new();

    bus.load_bios_bytes(&[0x0D, 0x00, 0x00, 0x00]).unwrap();
    assert_eq!(bus.read32(0xBFC00000).unwrap(), 0x0000000D);

    let oversized = vec![0u8; BIOS_SIZE as usize + 1];
    assert!(matches!(
        bus.load_bios_bytes(&oversized),
        Err(EmulatorError::InvalidBiosSize { .. })
    ));
}

#[test]
fn test_reset_clears_volatile_memory() {
    let mut bus = Bus::new();
    bus.load_bios_bytes(&[0xAA]).unwrap();
    bus.write32(0x80000000, 0x12345678).unwrap();
    bus.write8(0x1F800010, 0x55).unwrap();

    bus.reset();

    assert_eq!(bus.read32(0x80000000).unwrap(), 0);
    assert_eq!(bus.read8(0x1F800010).unwrap(), 0);
    assert_eq!(bus.read8(0xBFC00000).unwrap(), 0xAA);
}
