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

use super::asm::*;
use super::{run, setup, PROGRAM_BASE};

#[test]
fn test_taken_branch_executes_delay_slot() {
    let (mut cpu, mut bus) = setup(&[
        addiu(1, 0, 1),
        beq(0, 0, 2),
        addiu(2, 0, 2), // delay slot
        addiu(3, 0, 3), // skipped
        addiu(4, 0, 4), // branch target
    ]);

    run(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.pc(), PROGRAM_BASE + 8);
    assert_eq!(cpu.next_pc(), PROGRAM_BASE + 16);

    cpu.step(&mut bus).unwrap();
    assert!(cpu.in_delay_slot());

    cpu.step(&mut bus).unwrap();
    assert!(!cpu.in_delay_slot());
    assert_eq!(cpu.reg(2), 2);
    assert_eq!(cpu.reg(3), 0);
    assert_eq!(cpu.reg(4), 4);
}

#[test]
fn test_untaken_branch_falls_through() {
    let (mut cpu, mut bus) = setup(&[
        bne(0, 0, 10),
        addiu(1, 0, 1),
        addiu(2, 0, 2),
    ]);

    run(&mut cpu, &mut bus, 3);
    assert_eq!(cpu.reg(1), 1);
    assert_eq!(cpu.reg(2), 2);
    assert_eq!(cpu.pc(), PROGRAM_BASE + 12);
}

#[test]
fn test_backward_branch_loop() {
    let (mut cpu, mut bus) = setup(&[
        addiu(1, 0, 3),
        addiu(1, 1, -1),
        bne(1, 0, -2),
        addiu(2, 2, 1), // delay slot, runs every iteration
        nop(),
    ]);

    run(&mut cpu, &mut bus, 10);
    assert_eq!(cpu.reg(1), 0);
    assert_eq!(cpu.reg(2), 3);
    assert_eq!(cpu.pc(), PROGRAM_BASE + 16);
}

#[test]
fn test_bltz_signed_compare() {
    let (mut cpu, mut bus) = setup(&[bltz(1, 4), nop(), addiu(2, 0, 1)]);
    cpu.set_reg(1, 0x8000_0000);

    run(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.pc(), PROGRAM_BASE + 4 + (4 << 2));
}

#[test]
fn test_link_written_when_not_taken() {
    let (mut cpu, mut bus) = setup(&[bltzal(0, 8), nop()]);

    run(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.reg(31), PROGRAM_BASE + 8);
    assert_eq!(cpu.pc(), PROGRAM_BASE + 8);
}

#[test]
fn test_bgezal_links_and_branches() {
    let (mut cpu, mut bus) = setup(&[bgezal(0, 3), nop()]);

    run(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.reg(31), PROGRAM_BASE + 8);
    assert_eq!(cpu.pc(), PROGRAM_BASE + 4 + 12);
}

#[test]
fn test_jal_and_jr_return() {
    let target = PROGRAM_BASE + 0x40;
    let (mut cpu, mut bus) = setup(&[jal(target), addiu(1, 0, 1)]);
    bus.write32(target, jr(31).0).unwrap();
    bus.write32(target + 4, addiu(2, 0, 2).0).unwrap();

    run(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.pc(), target);
    assert_eq!(cpu.reg(31), PROGRAM_BASE + 8);

    run(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.pc(), PROGRAM_BASE + 8);
    assert_eq!(cpu.reg(1), 1);
    assert_eq!(cpu.reg(2), 2);
}

#[test]
fn test_jump_keeps_upper_pc_bits() {
    // Target field only covers 256 MiB; the region comes from the delay slot PC
    let (mut cpu, mut bus) = setup(&[j(0x0000_2000), nop()]);

    run(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.pc(), 0x8000_2000);
}

#[test]
fn test_jalr_reads_target_before_link() {
    let target = PROGRAM_BASE + 0x80;
    let (mut cpu, mut bus) = setup(&[jalr(5, 5), nop()]);
    cpu.set_reg(5, target);

    run(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.pc(), target);
    assert_eq!(cpu.reg(5), PROGRAM_BASE + 8);
}
