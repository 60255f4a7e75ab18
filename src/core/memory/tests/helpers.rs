// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut

//! Helper functions for memory tests

use super::*;
use crate::core::error::BusFaultKind;

/// Assert that a result is an unmapped bus fault at `address`
pub fn assert_unmapped<T: std::fmt::Debug>(result: Result<T>, address: u32) {
    match result {
        Err(EmulatorError::BusFault {
            address: got,
            kind: BusFaultKind::Unmapped,
        }) => assert_eq!(got, address),
        other => panic!("expected unmapped fault at 0x{:08X}, got {:?}", address, other),
    }
}

/// Byte-register test device with side-effect-free reads
#[derive(Default)]
pub struct RecordingDevice {
    pub registers: [u8; 16],
    pub irq: bool,
}

impl IODevice for RecordingDevice {
    fn get_byte(&mut self, offset: u32) -> u8 {
        self.registers[offset as usize % 16]
    }

    fn set_byte(&mut self, offset: u32, value: u8) {
        self.registers[offset as usize % 16] = value;
    }

    fn peek_byte(&self, offset: u32) -> Option<u8> {
        Some(self.registers[offset as usize % 16])
    }

    fn take_interrupt(&mut self) -> bool {
        std::mem::take(&mut self.irq)
    }

    fn name(&self) -> &str {
        "RecordingDevice"
    }
}

/// Device that raises an interrupt request once
pub struct IrqOnce(pub bool);

impl IODevice for IrqOnce {
    fn get_byte(&mut self, _offset: u32) -> u8 {
        0
    }

    fn set_byte(&mut self, _offset: u32, _value: u8) {}

    fn take_interrupt(&mut self) -> bool {
        std::mem::take(&mut self.0)
    }
}
