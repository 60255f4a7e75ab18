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

use super::super::decode::op;
use super::super::*;
use super::asm::*;
use super::{run, setup, PROGRAM_BASE};
use crate::core::error::EmulatorError;
use crate::core::gte::GTE;
use crate::core::memory::{IODevice, Port};
use std::cell::Cell;
use std::rc::Rc;

fn enable_gte(cpu: &mut CPU) {
    let sr = cpu.cop0().status() | StatusFlags::CU2;
    cpu.cop0_mut().set_data_register(COP0::SR as u8, sr.bits());
}

#[test]
fn test_mtc0_mfc0_status() {
    let (mut cpu, mut bus) = setup(&[
        lui(8, 0x1234),
        ori(8, 8, 0x0001),
        mtc0(8, 12),
        mfc0(9, 12),
        nop(),
    ]);

    run(&mut cpu, &mut bus, 5);
    assert_eq!(cpu.cop0().status().bits(), 0x1234_0001);
    assert_eq!(cpu.reg(9), 0x1234_0001);
}

#[test]
fn test_mtc0_cause_only_touches_software_bits() {
    let (mut cpu, mut bus) = setup(&[addiu(8, 0, -1), mtc0(8, 13)]);

    run(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.cop0().cause(), 0x0000_0300);
}

#[test]
fn test_read_only_cop0_registers() {
    let (mut cpu, mut bus) = setup(&[addiu(8, 0, 0x77), mtc0(8, 15), mtc0(8, 8)]);

    run(&mut cpu, &mut bus, 3);
    assert_eq!(cpu.cop0().register(COP0::PRID), COP0::PRID_R3000A);
    assert_eq!(cpu.cop0().bad_vaddr(), 0);
}

#[test]
fn test_breakpoint_registers_are_plain_storage() {
    let (mut cpu, mut bus) = setup(&[addiu(8, 0, 0x40), mtc0(8, 7), mfc0(9, 7), nop()]);

    run(&mut cpu, &mut bus, 4);
    assert_eq!(cpu.cop0().register(COP0::DCIC), 0x40);
    assert_eq!(cpu.reg(9), 0x40);
}

#[test]
fn test_cop0_branch_on_condition() {
    // COP0 never raises its condition line: BC0F is taken, BC0T is not
    let bc0f = Instruction::immediate_form(op::COP0, 0o10, 0, 4);
    let bc0t = Instruction::immediate_form(op::COP0, 0o10, 1, 4);

    let (mut cpu, mut bus) = setup(&[bc0f, nop()]);
    run(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.pc(), PROGRAM_BASE + 4 + 16);

    let (mut cpu, mut bus) = setup(&[bc0t, nop()]);
    run(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.pc(), PROGRAM_BASE + 8);
}

#[test]
fn test_unknown_cop0_function_is_unimplemented() {
    // COP0 function 0o01 (TLBR) has no R3000A counterpart on the PSX
    let tlbr = Instruction::register_form(op::COP0, 0o20, 0, 0, 0, 0o01);
    let (mut cpu, mut bus) = setup(&[tlbr, addiu(1, 0, 1)]);

    let err = cpu.step(&mut bus).unwrap_err();
    assert!(matches!(err, EmulatorError::Unimplemented { coprocessor: 0, .. }));

    // The instruction still retired
    assert_eq!(cpu.pc(), PROGRAM_BASE + 4);
    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.reg(1), 1);
}

#[test]
fn test_gte_data_transfers() {
    let (mut cpu, mut bus) = setup(&[
        lui(1, 0xDEAD),
        ori(1, 1, 0xBEEF),
        mtc2(1, GTE::IR1),
        mfc2(2, GTE::IR1),
        nop(),
    ]);
    enable_gte(&mut cpu);

    run(&mut cpu, &mut bus, 5);
    assert_eq!(cpu.gte().data_register(GTE::IR1), 0xDEAD_BEEF);
    assert_eq!(cpu.reg(2), 0xDEAD_BEEF);
}

#[test]
fn test_gte_control_transfer() {
    let (mut cpu, mut bus) = setup(&[addiu(1, 0, 0x155), ctc2(1, GTE::H)]);
    enable_gte(&mut cpu);

    run(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.gte().control_register(GTE::H).unwrap(), 0x155);
}

#[test]
fn test_gte_memory_transfers() {
    let (mut cpu, mut bus) = setup(&[
        lui(1, 0x8000),
        lwc2(GTE::VXY0, 0x100, 1),
        swc2(GTE::VXY0, 0x104, 1),
    ]);
    bus.write32(0x8000_0100, 0x0010_0020).unwrap();
    enable_gte(&mut cpu);

    run(&mut cpu, &mut bus, 3);
    assert_eq!(cpu.gte().data_register(GTE::VXY0), 0x0010_0020);
    assert_eq!(bus.read32(0x8000_0104).unwrap(), 0x0010_0020);
}

#[test]
fn test_swc2_swallowed_while_cache_isolated() {
    let (mut cpu, mut bus) = setup(&[lui(1, 0x8000), swc2(GTE::IR2, 0x100, 1)]);
    cpu.gte_mut().set_data_register(GTE::IR2, 0x1234);
    let sr = StatusFlags::CU2 | StatusFlags::ISC;
    cpu.cop0_mut().set_data_register(COP0::SR as u8, sr.bits());

    run(&mut cpu, &mut bus, 2);
    assert_eq!(bus.read32(0x8000_0100).unwrap(), 0);
}

#[test]
fn test_partial_stores_swallowed_while_cache_isolated() {
    // Nothing is mapped at 0x1FFF0000, so any bus access would fault
    let (mut cpu, mut bus) = setup(&[
        lui(1, 0x1FFF),
        sw(2, 0, 1),
        swl(2, 1, 1),
        swr(2, 2, 1),
    ]);
    cpu.set_reg(2, 0xAABB_CCDD);
    cpu.cop0_mut().set_data_register(COP0::SR as u8, StatusFlags::ISC.bits());

    run(&mut cpu, &mut bus, 4);
    assert_eq!(cpu.pc(), PROGRAM_BASE + 16);
    assert_eq!(cpu.cop0().epc(), 0);
}

/// Counts the reads a device sees
struct CountingDevice(Rc<Cell<u32>>);

impl IODevice for CountingDevice {
    fn get_byte(&mut self, _offset: u32) -> u8 {
        self.0.set(self.0.get() + 1);
        0
    }

    fn set_byte(&mut self, _offset: u32, _value: u8) {}
}

#[test]
fn test_swl_does_not_read_device_while_cache_isolated() {
    let reads = Rc::new(Cell::new(0));
    let (mut cpu, mut bus) = setup(&[lui(1, 0x1F80), swl(2, 0x1101, 1), swr(2, 0x1102, 1)]);
    bus.attach_device(Port::Timers, Box::new(CountingDevice(reads.clone())))
        .unwrap();
    cpu.cop0_mut().set_data_register(COP0::SR as u8, StatusFlags::ISC.bits());

    run(&mut cpu, &mut bus, 3);
    assert_eq!(reads.get(), 0);
}

#[test]
fn test_gte_command_retires_as_unimplemented() {
    // RTPS
    let (mut cpu, mut bus) = setup(&[Instruction(0x4A18_0001), addiu(1, 0, 1)]);
    enable_gte(&mut cpu);

    match cpu.step(&mut bus) {
        Err(EmulatorError::Unimplemented { coprocessor, instruction }) => {
            assert_eq!(coprocessor, 2);
            assert_eq!(instruction, 0x4A18_0001);
        }
        other => panic!("expected Unimplemented, got {:?}", other),
    }
    // No exception was entered
    assert_eq!(cpu.pc(), PROGRAM_BASE + 4);
    assert_eq!(cpu.cop0().epc(), 0);

    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.reg(1), 1);
}

#[test]
fn test_gte_fault_is_delivered() {
    // LWC2 from an unaligned address traps like LW
    let (mut cpu, mut bus) = setup(&[lui(1, 0x8000), lwc2(0, 0x102, 1)]);
    enable_gte(&mut cpu);

    run(&mut cpu, &mut bus, 2);
    assert_eq!((cpu.cop0().cause() >> 2) & 0x1F, ExceptionCause::AddressErrorLoad as u32);
    assert_eq!(cpu.cop0().bad_vaddr(), 0x8000_0102);
}
