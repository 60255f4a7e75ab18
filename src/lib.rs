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

//! PlayStation R3000A CPU core
//!
//! This library provides the MIPS R3000A processor of the PlayStation
//! together with its coprocessors (COP0 and the GTE register banks) and
//! the memory bus they execute against.
//!
//! # Example
//!
//! ```
//! use psrx_core::core::cpu::CPU;
//! use psrx_core::core::memory::Bus;
//!
//! let mut cpu = CPU::with_reset_vector(0x80000000);
//! let mut bus = Bus::new();
//!
//! // ADDIU r1, r0, 42
//! bus.write32(0x80000000, 0x2401002A).unwrap();
//! cpu.step(&mut bus).unwrap();
//! assert_eq!(cpu.reg(1), 42);
//! ```

pub mod core;
