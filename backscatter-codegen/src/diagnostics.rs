//! Radio diagnostics and advisory warnings

use backscatter_spec::{
    Symbol, TimingConfig, CC1352_MAX_DEVIATION_KHZ, CC2500_MAX_DEVIATION_KHZ,
    INSTRUCTION_MEMORY_SIZE,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Advisory warning; generation continues regardless
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Warning {
    /// Requested baud rate replaced by the nearest achievable one
    BaudRateAdjusted { requested: u32, actual: u32, clock_mhz: u32 },
    /// Deviation beyond what the CC2500 can receive
    DeviationExceedsCc2500 { deviation_khz: f64 },
    /// Deviation beyond what the CC1352 can receive
    DeviationExceedsCc1352 { deviation_khz: f64 },
    /// Symbol 0 uses the higher frequency
    SymbolPolarityInverted { divider0: u32, divider1: u32 },
    /// Program does not fit into one PIO block
    ExceedsInstructionMemory { length: usize, capacity: usize },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::BaudRateAdjusted {
                requested,
                actual,
                clock_mhz,
            } => write!(
                f,
                "a baud rate of {} Baud is not achievable with a {} MHz clock; the closest achievable baud rate {} Baud is used",
                requested, clock_mhz, actual
            ),
            Warning::DeviationExceedsCc2500 { deviation_khz } => write!(
                f,
                "the deviation ({:.2} kHz) is too large for the CC2500",
                deviation_khz
            ),
            Warning::DeviationExceedsCc1352 { deviation_khz } => write!(
                f,
                "the deviation ({:.2} kHz) is too large for the CC1352",
                deviation_khz
            ),
            Warning::SymbolPolarityInverted { divider0, divider1 } => write!(
                f,
                "symbol 0 has been assigned to a higher frequency than symbol 1 (d0 = {} < d1 = {})",
                divider0, divider1
            ),
            Warning::ExceedsInstructionMemory { length, capacity } => write!(
                f,
                "the program needs {} instructions but the instruction memory holds {}",
                length, capacity
            ),
        }
    }
}

/// Derived radio parameters of a timing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Shift frequency of symbol 0 (MHz)
    pub shift0_mhz: f64,
    /// Shift frequency of symbol 1 (MHz)
    pub shift1_mhz: f64,
    /// Center of the two shift frequencies (kHz)
    pub center_khz: f64,
    /// Offset of each symbol frequency from the center (kHz)
    pub deviation_khz: f64,
    /// Baud rate in use
    pub baud_rate: u32,
    /// Clock cycles per symbol, unrounded
    pub instructions_per_symbol: f64,
    /// baud/1000 + 2 * deviation (kHz)
    pub occupied_bandwidth_khz: f64,
    pub warnings: Vec<Warning>,
}

impl Diagnostics {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Record the program length, warning when it exceeds the instruction memory
    pub fn check_program_length(&mut self, length: usize) {
        if length > INSTRUCTION_MEMORY_SIZE {
            self.warnings.push(Warning::ExceedsInstructionMemory {
                length,
                capacity: INSTRUCTION_MEMORY_SIZE,
            });
        }
    }

    /// Settings summary, one entry per line
    pub fn summary(&self, config: &TimingConfig) -> Vec<String> {
        vec![
            format!(
                "frequency 0 shift: {:.3} MHz       (1 period = {} cycles @ {} MHz clock)",
                self.shift0_mhz, config.divider0, config.clock_mhz
            ),
            format!(
                "frequency 1 shift: {:.3} MHz       (1 period = {} cycles @ {} MHz clock)",
                self.shift1_mhz, config.divider1, config.clock_mhz
            ),
            format!("center frequency shift: {:.3} MHz", self.center_khz / 1000.0),
            format!("deviation from center : {:.2} kHz", self.deviation_khz),
            format!(
                "baud-rate {:.2} kBaud ({:.1} instructions per symbol)",
                self.baud_rate as f64 / 1000.0,
                self.instructions_per_symbol
            ),
            format!("occupied bandwidth: {:.2} kHz", self.occupied_bandwidth_khz),
        ]
    }
}

/// Compute the diagnostics of a configuration
pub fn diagnose(config: &TimingConfig) -> Diagnostics {
    let f0 = config.shift_frequency_khz(Symbol::Zero);
    let f1 = config.shift_frequency_khz(Symbol::One);
    let center_khz = (f0 + f1) / 2.0;
    let deviation_khz = (f1 - center_khz).abs();
    let occupied_bandwidth_khz = config.baud_rate as f64 / 1000.0 + 2.0 * deviation_khz;

    let mut warnings = Vec::new();
    if config.baud_adjusted() {
        warnings.push(Warning::BaudRateAdjusted {
            requested: config.requested_baud,
            actual: config.baud_rate,
            clock_mhz: config.clock_mhz,
        });
    }
    if deviation_khz > CC2500_MAX_DEVIATION_KHZ {
        warnings.push(Warning::DeviationExceedsCc2500 { deviation_khz });
    }
    if deviation_khz > CC1352_MAX_DEVIATION_KHZ {
        warnings.push(Warning::DeviationExceedsCc1352 { deviation_khz });
    }
    if config.divider0 < config.divider1 {
        warnings.push(Warning::SymbolPolarityInverted {
            divider0: config.divider0,
            divider1: config.divider1,
        });
    }

    Diagnostics {
        shift0_mhz: f0 / 1000.0,
        shift1_mhz: f1 / 1000.0,
        center_khz,
        deviation_khz,
        baud_rate: config.baud_rate,
        instructions_per_symbol: config.clock_hz() as f64 / config.baud_rate as f64,
        occupied_bandwidth_khz,
        warnings,
    }
}
