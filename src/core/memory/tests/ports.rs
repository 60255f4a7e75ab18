// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut

//! I/O port tests
//!
//! Port lookup, latching, device routing and interrupt acknowledge.

use super::helpers::{assert_unmapped, IrqOnce, RecordingDevice};
use super::*;
use crate::core::error::EmulatorError;

#[test]
fn test_port_lookup() {
    assert_eq!(Port::at(0x000), Some((Port::MemoryControl1, 0)));
    assert_eq!(Port::at(0x023), Some((Port::MemoryControl1, 0x23)));
    assert_eq!(Port::at(0x024), None);
    assert_eq!(Port::at(0x814), Some((Port::Gpu, 4)));
    assert_eq!(Port::at(0xD90), Some((Port::SpuControl, 0x10)));
    assert_eq!(Port::at(0x1041), Some((Port::Post, 0)));
    assert_eq!(Port::at(0x1042), None);
}

#[test]
fn test_port_table_is_disjoint() {
    for (i, a) in Port::ALL.iter().enumerate() {
        for b in Port::ALL.iter().skip(i + 1) {
            let (a_start, a_size) = a.range();
            let (b_start, b_size) = b.range();
            assert!(
                a_start + a_size <= b_start || b_start + b_size <= a_start,
                "{:?} overlaps {:?}",
                a,
                b
            );
        }
    }
}

#[test]
fn test_unattached_port_latches() {
    let mut bus = Bus::new();

    bus.write32(0x1F801000, 0x1F000000).unwrap();
    assert_eq!(bus.read32(0x1F801000).unwrap(), 0x1F000000);

    bus.write8(0x1F802041, 0x0F).unwrap();
    assert_eq!(bus.read8(0x1F802041).unwrap(), 0x0F);
}

#[test]
fn test_gap_in_io_window_faults() {
    let mut bus = Bus::new();

    assert_unmapped(bus.read32(0x1F801050), 0x1F801050);
    assert_unmapped(bus.write8(0x1F801200, 0), 0x1F801200);
}

#[test]
fn test_device_receives_port_relative_offsets() {
    let mut bus = Bus::new();
    bus.attach_device(Port::Gpu, Box::new(RecordingDevice::default()))
        .unwrap();

    bus.write32(0x1F801814, 0x04030201).unwrap();
    assert_eq!(bus.read8(0x1F801816).unwrap(), 0x03);

    let device = bus.detach_device(Port::Gpu).unwrap();
    assert_eq!(device.name(), "RecordingDevice");

    // Detached port falls back to a zeroed latch
    assert_eq!(bus.read32(0x1F801814).unwrap(), 0);
}

#[test]
fn test_interrupt_mask_and_acknowledge() {
    let mut bus = Bus::new();

    bus.io_mut().request_interrupt(0);
    bus.io_mut().request_interrupt(2);
    assert_eq!(bus.read32(0x1F801070).unwrap(), 0b101);
    assert!(!bus.interrupt_pending());

    bus.write32(0x1F801074, 0b100).unwrap();
    assert_eq!(bus.io().mask(), 0b100);
    assert!(bus.interrupt_pending());

    // Writing zero to bit 2 acknowledges it, bit 0 stays pending
    bus.write32(0x1F801070, !0b100).unwrap();
    assert_eq!(bus.io().status(), 0b001);
    assert!(!bus.interrupt_pending());
}

#[test]
fn test_device_interrupt_raises_port_line() {
    let mut bus = Bus::new();
    bus.attach_device(Port::Cdrom, Box::new(IrqOnce(true))).unwrap();
    bus.write16(0x1F801074, 1 << 2).unwrap();

    assert!(bus.interrupt_pending());
    assert_eq!(bus.io().status(), 1 << 2);

    bus.write16(0x1F801070, 0).unwrap();
    assert!(!bus.interrupt_pending());
}

#[test]
fn test_interrupt_registers_cannot_be_replaced() {
    let mut bus = Bus::new();

    let rejected = bus.attach_device(Port::InterruptStatus, Box::new(RecordingDevice::default()));
    assert!(matches!(
        rejected,
        Err(EmulatorError::ReservedPort(Port::InterruptStatus))
    ));
    let rejected = bus.attach_device(Port::InterruptMask, Box::new(RecordingDevice::default()));
    assert!(matches!(
        rejected,
        Err(EmulatorError::ReservedPort(Port::InterruptMask))
    ));

    // Both registers keep their controller behaviour
    bus.write16(0x1F801074, 0x5).unwrap();
    assert_eq!(bus.read16(0x1F801074).unwrap(), 0x5);
}

#[test]
fn test_attach_returns_replaced_device() {
    let mut bus = Bus::new();

    let first = bus
        .attach_device(Port::Gpu, Box::new(RecordingDevice::default()))
        .unwrap();
    assert!(first.is_none());

    let second = bus.attach_device(Port::Gpu, Box::new(IrqOnce(false))).unwrap();
    assert!(second.is_some());
}
