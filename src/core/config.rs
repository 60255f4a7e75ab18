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

//! Emulator configuration
//!
//! Configuration is read from a TOML file. Every section and field is
//! optional; missing values fall back to [`EmulatorConfig::default`].
//!
//! ```toml
//! [cpu]
//! reset_vector = 0xBFC00000
//! stop_on_unimplemented = false
//!
//! [memory]
//! bios = "SCPH1001.BIN"
//! program = "demo.bin"
//! program_address = 0x80010000
//!
//! [logging]
//! level = "info"
//! ```

use crate::core::cpu::RESET_VECTOR;
use crate::core::error::{EmulatorError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming a config file for the CLI
pub const CONFIG_ENV: &str = "PSRX_CONFIG";

/// Default load address for raw program images (start of user RAM in KSEG0)
pub const DEFAULT_PROGRAM_ADDRESS: u32 = 0x8001_0000;

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EmulatorConfig {
    pub cpu: CpuConfig,
    pub memory: MemoryConfig,
    pub logging: LoggingConfig,
}

/// `[cpu]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CpuConfig {
    /// Address the CPU starts executing from after reset
    pub reset_vector: u32,
    /// Stop the runner when a coprocessor function is not implemented
    pub stop_on_unimplemented: bool,
}

impl Default for CpuConfig {
    fn default() -> Self {
        Self {
            reset_vector: RESET_VECTOR,
            stop_on_unimplemented: false,
        }
    }
}

/// `[memory]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Boot ROM image (512 KiB)
    pub bios: Option<PathBuf>,
    /// Raw program image copied into memory before the first step
    pub program: Option<PathBuf>,
    /// Virtual address the program image is copied to
    pub program_address: u32,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            bios: None,
            program: None,
            program_address: DEFAULT_PROGRAM_ADDRESS,
        }
    }
}

/// `[logging]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is not set
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl EmulatorConfig {
    /// Parse a configuration from TOML text
    ///
    /// # Example
    ///
    /// ```
    /// use psrx_core::core::config::EmulatorConfig;
    ///
    /// let config = EmulatorConfig::from_toml_str("[cpu]\nreset_vector = 0x80010000\n").unwrap();
    /// assert_eq!(config.cpu.reset_vector, 0x80010000);
    /// assert_eq!(config.logging.level, "info");
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| EmulatorError::Config(e.to_string()))
    }

    /// Read and parse a configuration file
    ///
    /// # Errors
    ///
    /// `Io` when the file cannot be read, `Config` when it is not valid
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Render the configuration as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| EmulatorError::Config(e.to_string()))
    }
}
