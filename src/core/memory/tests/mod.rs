// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut

//! Memory Bus Tests
//!
//! This module contains tests for the PlayStation memory bus,
//! organized into logical categories:
//!
//! - `basic`: Region identification and bus faults
//! - `bus`: Memory read/write operations with various data sizes
//! - `regions`: Segment translation, aliasing and the region table
//! - `ports`: I/O port routing, latches and the interrupt controller
//! - `probe`: Side-effect-free probing
//! - `helpers`: Common test utilities

use super::*;

mod bus;
mod helpers;
mod ports;
