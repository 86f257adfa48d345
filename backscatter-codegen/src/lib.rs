//! # Backscatter PIO Program Generator
//!
//! Turns a [`TimingConfig`] into the PIO program that toggles the tag's
//! output pin at one of two frequencies per transmitted bit.
//!
//! ## Pipeline
//! 1. [`symbol_loop`]: one pulse loop per symbol, delays split to the
//!    delay-field width, plus a drift correction so every symbol lasts
//!    exactly `clock / baud` cycles
//! 2. [`builder`]: fixed prologue and dispatch around the two loops
//! 3. [`diagnostics`] and [`constants`]: radio parameters, warnings and the
//!    values the firmware needs
//! 4. [`emitter`]: the `.pio` source text

pub mod builder;
pub mod constants;
pub mod delay;
pub mod diagnostics;
pub mod emitter;
pub mod symbol_loop;

pub use builder::build_program;
pub use constants::FirmwareConstants;
pub use diagnostics::{diagnose, Diagnostics, Warning};
pub use emitter::emit;
pub use symbol_loop::{build_loops, SymbolLoop};

use backscatter_spec::error::BackscatterError;
use backscatter_spec::{AntennaMode, Program, TimingConfig};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub type Result<T> = std::result::Result<T, BackscatterError>;

/// Everything produced for one configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Generation {
    pub config: TimingConfig,
    /// Symbol 0 first
    pub loops: [SymbolLoop; 2],
    pub program: Program,
    pub diagnostics: Diagnostics,
    pub constants: FirmwareConstants,
}

impl Generation {
    /// Render the `.pio` source
    pub fn to_pio(&self) -> String {
        emit(self)
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.diagnostics.warnings
    }
}

/// Generate the program for a validated configuration
pub fn generate(config: &TimingConfig) -> Generation {
    let loops = build_loops(config);
    let program = build_program(config, &loops);

    let mut diagnostics = diagnose(config);
    diagnostics.check_program_length(program.len());
    let constants = FirmwareConstants::new(config, &diagnostics);

    info!(
        d0 = config.divider0,
        d1 = config.divider1,
        baud = config.baud_rate,
        cycles_per_symbol = config.cycles_per_symbol(),
        instructions = program.len(),
        "generated backscatter program"
    );
    for warning in &diagnostics.warnings {
        warn!("{}", warning);
    }

    Generation {
        config: *config,
        loops,
        program,
        diagnostics,
        constants,
    }
}

/// Validate raw parameters and generate
pub fn generate_from(divider0: u32, divider1: u32, baud: u32, mode: AntennaMode) -> Result<Generation> {
    let config = TimingConfig::new(divider0, divider1, baud, mode)?;
    Ok(generate(&config))
}
