//! # Backscatter PIO Specification
//!
//! Shared types for generating, assembling and simulating the RP2040 PIO
//! program that drives a backscatter tag with two-frequency FSK.
//!
//! ## Key Features
//! - Fixed 125 MHz state-machine clock
//! - Two symbol frequencies derived from even clock dividers
//! - One antenna (5-bit delay field) or two in-phase antennas
//!   (`.side_set 1 opt`, 3-bit delay field)
//! - 32-slot instruction memory, 16-bit instruction words

pub mod config;
pub mod error;
pub mod image;
pub mod instruction;
pub mod program;
pub mod pulse;
pub mod symbol;

pub use config::{nearest_achievable_baud, AntennaMode, ConfigError, TimingConfig};
pub use error::BackscatterError;
pub use image::ProgramImage;
pub use instruction::{
    Instruction, JmpCondition, MovDestination, MovOp, MovSource, Operation, OutDestination,
    SetDestination, Target,
};
pub use program::{Line, Program, ProgramError};
pub use pulse::Pulse;
pub use symbol::{PinLevel, Symbol};

/// State-machine clock frequency in MHz
pub const CLOCK_FREQ_MHZ: u32 = 125;

/// Cycles spent outside the pulse loops per symbol: OUT -> JMP -> MOV -> ... -> JMP
pub const WASTED_CYCLES_PER_SYMBOL: u32 = 4;

/// Number of instruction slots in one PIO block
pub const INSTRUCTION_MEMORY_SIZE: usize = 32;

/// Width of the delay/side-set field in every instruction word
pub const DELAY_SIDE_SET_BITS: u8 = 5;

/// Largest deviation the CC2500 receiver accepts (kHz)
pub const CC2500_MAX_DEVIATION_KHZ: f64 = 380.86;

/// Largest deviation the CC1352 receiver accepts (kHz)
pub const CC1352_MAX_DEVIATION_KHZ: f64 = 1000.0;

/// Name of the generated PIO program
pub const PROGRAM_NAME: &str = "backscatter";

/// Cycle count type
pub type Cycles = u32;

/// Instruction memory address (5 bits used)
pub type Address = u8;
