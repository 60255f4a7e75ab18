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

use std::path::PathBuf;

use clap::Parser;
use log::{error, info, warn};
use psrx_core::core::config::{EmulatorConfig, CONFIG_ENV};
use psrx_core::core::cpu::CpuSnapshot;
use psrx_core::core::error::Result;
use psrx_core::core::loader::Executable;
use psrx_core::core::save_state::SaveState;
use psrx_core::core::system::{RunSummary, System};
use serde::Serialize;

/// Run programs on the PlayStation CPU core
#[derive(Parser)]
#[command(name = "psrx-run")]
#[command(about = "PlayStation R3000A CPU runner", long_about = None)]
struct Args {
    /// Path to PlayStation BIOS file (e.g., SCPH1001.BIN)
    bios_file: Option<PathBuf>,

    /// Raw program image to copy into memory
    #[arg(short = 'p', long)]
    program: Option<PathBuf>,

    /// Address the raw program is copied to
    #[arg(long, value_parser = parse_address)]
    load_address: Option<u32>,

    /// PSX-EXE file to install before running
    #[arg(short = 'e', long)]
    exe: Option<PathBuf>,

    /// Address to start executing from
    #[arg(long, value_parser = parse_address)]
    entry: Option<u32>,

    /// Number of instructions to execute
    #[arg(short = 'n', long, default_value = "100000")]
    instructions: u64,

    /// TOML configuration file (defaults to $PSRX_CONFIG)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Write a save state here when the run ends
    #[arg(short = 's', long)]
    save_state: Option<PathBuf>,

    /// Stop at the first unimplemented coprocessor function
    #[arg(long)]
    stop_on_unimplemented: bool,

    /// Print the final state as JSON instead of a register dump
    #[arg(long)]
    json: bool,
}

/// Final state printed with `--json`
#[derive(Serialize)]
struct Report {
    summary: RunSummary,
    steps: u64,
    cpu: CpuSnapshot,
}

/// Accept `0x`-prefixed hex or decimal
fn parse_address(text: &str) -> std::result::Result<u32, String> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(&hex.replace('_', ""), 16),
        None => text.parse(),
    };
    parsed.map_err(|e| format!("invalid address '{}': {}", text, e))
}

fn load_config(args: &Args) -> Result<EmulatorConfig> {
    let path = args
        .config
        .clone()
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

    let mut config = match path {
        Some(path) => EmulatorConfig::from_file(path)?,
        None => EmulatorConfig::default(),
    };

    // Command line overrides the file
    if let Some(bios) = &args.bios_file {
        config.memory.bios = Some(bios.clone());
    }
    if let Some(program) = &args.program {
        config.memory.program = Some(program.clone());
    }
    if let Some(address) = args.load_address {
        config.memory.program_address = address;
    }
    if args.stop_on_unimplemented {
        config.cpu.stop_on_unimplemented = true;
    }
    // A program without a BIOS starts at its own load address
    if config.memory.bios.is_none() && config.memory.program.is_some() {
        config.cpu.reset_vector = config.memory.program_address;
    }
    if let Some(entry) = args.entry {
        config.cpu.reset_vector = entry;
    }

    Ok(config)
}

fn main() -> Result<()> {
    // Load .env so RUST_LOG and PSRX_CONFIG can come from it
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    let args = Args::parse();
    let config = load_config(&args)?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    info!("psrx-run v{}", env!("CARGO_PKG_VERSION"));

    let mut system = match System::from_config(&config) {
        Ok(system) => system,
        Err(e) => {
            error!("Failed to initialize system: {}", e);
            return Err(e);
        }
    };

    if let Some(path) = &args.exe {
        info!("Loading PSX-EXE from: {}", path.display());
        let exe = Executable::from_file(path)?;
        system.load_executable(&exe)?;
        if let Some(entry) = args.entry {
            system.cpu_mut().set_pc(entry);
        }
    }

    info!("Starting execution at PC=0x{:08X}", system.pc());

    // Run in chunks to log progress ~10 times during execution
    let total = args.instructions;
    let chunk = (total / 10).max(1);
    let mut summary = RunSummary::default();

    while summary.executed < total && !summary.stopped {
        let budget = chunk.min(total - summary.executed);
        let part = match system.run(budget, config.cpu.stop_on_unimplemented) {
            Ok(part) => part,
            Err(e) => {
                error!("Error at PC=0x{:08X}: {}", system.pc(), e);
                system.cpu().dump_registers();
                return Err(e);
            }
        };
        summary.executed += part.executed;
        summary.unimplemented += part.unimplemented;
        summary.stopped = part.stopped;

        info!(
            "Progress: {}/{} instructions | PC: 0x{:08X}",
            summary.executed,
            total,
            system.pc()
        );
    }

    if summary.stopped {
        warn!(
            "Stopped on unimplemented coprocessor function at PC=0x{:08X}",
            system.cpu().current_pc()
        );
    }
    if summary.unimplemented > 0 {
        warn!(
            "{} unimplemented coprocessor functions retired",
            summary.unimplemented
        );
    }

    if let Some(path) = &args.save_state {
        let label = args
            .exe
            .as_ref()
            .or(config.memory.program.as_ref())
            .or(config.memory.bios.as_ref())
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        SaveState::capture(&system, label)?.save_to_file(path)?;
        info!("Save state written to: {}", path.display());
    }

    if args.json {
        let report = Report {
            summary,
            steps: system.steps(),
            cpu: system.cpu().snapshot(),
        };
        let json = serde_json::to_string_pretty(&report).map_err(std::io::Error::from)?;
        println!("{}", json);
    } else {
        println!("{}", system.cpu().snapshot());
    }

    info!("Total instructions: {}", summary.executed);
    info!("Final PC: 0x{:08X}", system.pc());

    Ok(())
}
