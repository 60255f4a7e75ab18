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

//! Exception-triggering instructions

use super::super::decode::Instruction;
use super::super::ExceptionCause;
use super::CPU;
use crate::core::error::{EmulatorError, Result};

impl CPU {
    /// SYSCALL: System Call
    ///
    /// Raises a system call exception. The 20-bit code field is ignored by
    /// the hardware; handlers read it back from memory at EPC.
    pub(in crate::core::cpu) fn op_syscall(&mut self, _instruction: Instruction) -> Result<()> {
        Err(EmulatorError::Exception(ExceptionCause::Syscall))
    }

    /// BREAK: Breakpoint
    ///
    /// Raises a breakpoint exception, typically placed by a debugger.
    pub(in crate::core::cpu) fn op_break(&mut self, _instruction: Instruction) -> Result<()> {
        Err(EmulatorError::Exception(ExceptionCause::Breakpoint))
    }
}
