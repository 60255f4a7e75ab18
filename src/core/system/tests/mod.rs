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

//! System module tests
//!
//! - `basic`: construction, configuration and reset
//! - `execution`: stepping and run summaries


use super::*;

const PROGRAM_BASE: u32 = 0x8001_0000;

/// Build a system whose reset vector points at `words`
fn with_program(words: &[u32]) -> System {
    let mut system = System::with_reset_vector(PROGRAM_BASE);
    let image: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
    system.load_program(PROGRAM_BASE, &image).unwrap();
    system
}
