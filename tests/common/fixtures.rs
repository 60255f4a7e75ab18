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

//! Test fixtures for common test scenarios

use psrx_core::core::memory::Bus;
use psrx_core::core::system::System;

/// Where test programs are loaded and started from
pub const PROGRAM_BASE: u32 = 0x8001_0000;

/// Create a System that starts executing `program` at [`PROGRAM_BASE`]
#[allow(dead_code)]
pub fn system_with_program(program: &[u32]) -> System {
    let mut system = System::with_reset_vector(PROGRAM_BASE);
    load_test_program(system.bus_mut(), PROGRAM_BASE, program);
    system
}

/// Load a test program into memory at specified address
#[allow(dead_code)]
pub fn load_test_program(bus: &mut Bus, start_addr: u32, program: &[u32]) {
    let image: Vec<u8> = program.iter().flat_map(|w| w.to_le_bytes()).collect();
    bus.load_program(start_addr, &image)
        .expect("Failed to write to memory");
}

/// Build a PSX-EXE file around raw instruction words
#[allow(dead_code)]
pub fn psx_exe(pc: u32, load_address: u32, stack_base: u32, program: &[u32]) -> Vec<u8> {
    let mut file = vec![0u8; 0x800];
    file[0..8].copy_from_slice(b"PS-X EXE");
    file[0x10..0x14].copy_from_slice(&pc.to_le_bytes());
    file[0x18..0x1C].copy_from_slice(&load_address.to_le_bytes());
    file[0x1C..0x20].copy_from_slice(&((program.len() * 4) as u32).to_le_bytes());
    file[0x30..0x34].copy_from_slice(&stack_base.to_le_bytes());
    for word in program {
        file.extend_from_slice(&word.to_le_bytes());
    }
    file
}
