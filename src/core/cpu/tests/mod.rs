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

//! CPU test modules
//!
//! Tests are organized into the following categories:
//! - `basic`: CPU initialization, reset, register access, PC handling
//! - `registers`: Register file staging
//! - `load_delay`: Load delay slot behavior through `step`
//! - `decode`: Instruction field extraction
//! - `arithmetic`: ALU, shifts, multiply and divide
//! - `branch`: Branches, jumps and delay slots
//! - `memory_ops`: Loads, stores and unaligned accesses
//! - `exceptions`: Exception entry, RFE and interrupts
//! - `coprocessor`: COP0 and GTE transfers through the CPU
//! - `save_state`: Processor state serialization

use super::decode::{bcond, funct, op, Instruction};
use super::CPU;
use crate::core::memory::Bus;

mod branch;
mod coprocessor;

/// Where test programs are placed (KSEG0 view of main RAM)
const PROGRAM_BASE: u32 = 0x8000_1000;

/// Build a CPU that starts at [`PROGRAM_BASE`] with `program` loaded there
fn setup(program: &[Instruction]) -> (CPU, Bus) {
    let mut bus = Bus::new();
    for (i, instruction) in program.iter().enumerate() {
        bus.write32(PROGRAM_BASE + 4 * i as u32, instruction.0)
            .unwrap();
    }
    (CPU::with_reset_vector(PROGRAM_BASE), bus)
}

/// Step the CPU `count` times, failing the test on any returned error
fn run(cpu: &mut CPU, bus: &mut Bus, count: usize) {
    for _ in 0..count {
        cpu.step(bus).unwrap();
    }
}

/// Small assembler for the instructions the tests need
mod asm {
    use super::*;

    pub fn nop() -> Instruction {
        Instruction(0)
    }

    fn imm(opcode: u8, rs: u8, rt: u8, imm: i16) -> Instruction {
        Instruction::immediate_form(opcode, rs, rt, imm as u16)
    }

    fn special(rs: u8, rt: u8, rd: u8, shamt: u8, function: u8) -> Instruction {
        Instruction::register_form(op::SPECIAL, rs, rt, rd, shamt, function)
    }

    pub fn addi(rt: u8, rs: u8, value: i16) -> Instruction {
        imm(op::ADDI, rs, rt, value)
    }

    pub fn addiu(rt: u8, rs: u8, value: i16) -> Instruction {
        imm(op::ADDIU, rs, rt, value)
    }

    pub fn slti(rt: u8, rs: u8, value: i16) -> Instruction {
        imm(op::SLTI, rs, rt, value)
    }

    pub fn sltiu(rt: u8, rs: u8, value: i16) -> Instruction {
        imm(op::SLTIU, rs, rt, value)
    }

    pub fn ori(rt: u8, rs: u8, value: u16) -> Instruction {
        Instruction::immediate_form(op::ORI, rs, rt, value)
    }

    pub fn lui(rt: u8, value: u16) -> Instruction {
        Instruction::immediate_form(op::LUI, 0, rt, value)
    }

    pub fn add(rd: u8, rs: u8, rt: u8) -> Instruction {
        special(rs, rt, rd, 0, funct::ADD)
    }

    pub fn addu(rd: u8, rs: u8, rt: u8) -> Instruction {
        special(rs, rt, rd, 0, funct::ADDU)
    }

    pub fn sub(rd: u8, rs: u8, rt: u8) -> Instruction {
        special(rs, rt, rd, 0, funct::SUB)
    }

    pub fn sra(rd: u8, rt: u8, shamt: u8) -> Instruction {
        special(0, rt, rd, shamt, funct::SRA)
    }

    pub fn srlv(rd: u8, rt: u8, rs: u8) -> Instruction {
        special(rs, rt, rd, 0, funct::SRLV)
    }

    pub fn mult(rs: u8, rt: u8) -> Instruction {
        special(rs, rt, 0, 0, funct::MULT)
    }

    pub fn multu(rs: u8, rt: u8) -> Instruction {
        special(rs, rt, 0, 0, funct::MULTU)
    }

    pub fn div(rs: u8, rt: u8) -> Instruction {
        special(rs, rt, 0, 0, funct::DIV)
    }

    pub fn divu(rs: u8, rt: u8) -> Instruction {
        special(rs, rt, 0, 0, funct::DIVU)
    }

    pub fn nor(rd: u8, rs: u8, rt: u8) -> Instruction {
        special(rs, rt, rd, 0, funct::NOR)
    }

    pub fn slt(rd: u8, rs: u8, rt: u8) -> Instruction {
        special(rs, rt, rd, 0, funct::SLT)
    }

    pub fn sltu(rd: u8, rs: u8, rt: u8) -> Instruction {
        special(rs, rt, rd, 0, funct::SLTU)
    }

    pub fn jr(rs: u8) -> Instruction {
        special(rs, 0, 0, 0, funct::JR)
    }

    pub fn jalr(rd: u8, rs: u8) -> Instruction {
        special(rs, 0, rd, 0, funct::JALR)
    }

    pub fn syscall() -> Instruction {
        special(0, 0, 0, 0, funct::SYSCALL)
    }

    pub fn brk() -> Instruction {
        special(0, 0, 0, 0, funct::BREAK)
    }

    pub fn beq(rs: u8, rt: u8, offset: i16) -> Instruction {
        imm(op::BEQ, rs, rt, offset)
    }

    pub fn bne(rs: u8, rt: u8, offset: i16) -> Instruction {
        imm(op::BNE, rs, rt, offset)
    }

    pub fn bltz(rs: u8, offset: i16) -> Instruction {
        imm(op::BCOND, rs, bcond::BLTZ, offset)
    }

    pub fn bgezal(rs: u8, offset: i16) -> Instruction {
        imm(op::BCOND, rs, bcond::BGEZAL, offset)
    }

    pub fn bltzal(rs: u8, offset: i16) -> Instruction {
        imm(op::BCOND, rs, bcond::BLTZAL, offset)
    }

    pub fn j(address: u32) -> Instruction {
        Instruction::jump_form(op::J, (address >> 2) & 0x03FF_FFFF)
    }

    pub fn jal(address: u32) -> Instruction {
        Instruction::jump_form(op::JAL, (address >> 2) & 0x03FF_FFFF)
    }

    pub fn lb(rt: u8, offset: i16, base: u8) -> Instruction {
        imm(op::LB, base, rt, offset)
    }

    pub fn lbu(rt: u8, offset: i16, base: u8) -> Instruction {
        imm(op::LBU, base, rt, offset)
    }

    pub fn lh(rt: u8, offset: i16, base: u8) -> Instruction {
        imm(op::LH, base, rt, offset)
    }

    pub fn lw(rt: u8, offset: i16, base: u8) -> Instruction {
        imm(op::LW, base, rt, offset)
    }

    pub fn lwl(rt: u8, offset: i16, base: u8) -> Instruction {
        imm(op::LWL, base, rt, offset)
    }

    pub fn lwr(rt: u8, offset: i16, base: u8) -> Instruction {
        imm(op::LWR, base, rt, offset)
    }

    pub fn sb(rt: u8, offset: i16, base: u8) -> Instruction {
        imm(op::SB, base, rt, offset)
    }

    pub fn sh(rt: u8, offset: i16, base: u8) -> Instruction {
        imm(op::SH, base, rt, offset)
    }

    pub fn sw(rt: u8, offset: i16, base: u8) -> Instruction {
        imm(op::SW, base, rt, offset)
    }

    pub fn swl(rt: u8, offset: i16, base: u8) -> Instruction {
        imm(op::SWL, base, rt, offset)
    }

    pub fn swr(rt: u8, offset: i16, base: u8) -> Instruction {
        imm(op::SWR, base, rt, offset)
    }

    pub fn mfc0(rt: u8, rd: u8) -> Instruction {
        Instruction::register_form(op::COP0, 0o00, rt, rd, 0, 0)
    }

    pub fn mtc0(rt: u8, rd: u8) -> Instruction {
        Instruction::register_form(op::COP0, 0o04, rt, rd, 0, 0)
    }

    pub fn rfe() -> Instruction {
        Instruction::register_form(op::COP0, 0o20, 0, 0, 0, 0o20)
    }

    pub fn mfc2(rt: u8, rd: u8) -> Instruction {
        Instruction::register_form(op::COP2, 0o00, rt, rd, 0, 0)
    }

    pub fn mtc2(rt: u8, rd: u8) -> Instruction {
        Instruction::register_form(op::COP2, 0o04, rt, rd, 0, 0)
    }

    pub fn ctc2(rt: u8, rd: u8) -> Instruction {
        Instruction::register_form(op::COP2, 0o06, rt, rd, 0, 0)
    }

    pub fn lwc2(rt: u8, offset: i16, base: u8) -> Instruction {
        imm(op::LWC2, base, rt, offset)
    }

    pub fn swc2(rt: u8, offset: i16, base: u8) -> Instruction {
        imm(op::SWC2, base, rt, offset)
    }
}
