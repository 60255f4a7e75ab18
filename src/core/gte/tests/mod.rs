// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut

//! GTE tests
//!
//! - `basic`: register banks and state serialization
//! - `commands`: command decoding and the COP2 transfer protocol
