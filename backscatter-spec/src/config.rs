//! # Timing Configuration
//!
//! Radio timing parameters for the backscatter state machine: the two clock
//! dividers that set the FSK shift frequencies, the baud rate and the antenna
//! mode. A `TimingConfig` is always valid once constructed; every derived
//! quantity (cycles per symbol, loop counts, drift remainders) is computed
//! from it without further checks.

use crate::symbol::{PinLevel, Symbol};
use crate::{CLOCK_FREQ_MHZ, DELAY_SIDE_SET_BITS, WASTED_CYCLES_PER_SYMBOL};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Antenna mode of the tag
///
/// `Dual` drives a second antenna in phase through the side-set pin. The
/// optional side-set consumes two bits of the delay field, leaving three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AntennaMode {
    #[default]
    Single,
    Dual,
}

impl AntennaMode {
    /// Number of side-set bits including the enable bit
    #[inline]
    pub const fn side_set_bits(self) -> u8 {
        match self {
            AntennaMode::Single => 0,
            AntennaMode::Dual => 2,
        }
    }

    /// Width of the delay field in bits (5 or 3)
    #[inline]
    pub const fn delay_bits(self) -> u8 {
        DELAY_SIDE_SET_BITS - self.side_set_bits()
    }

    /// Largest delay an instruction can encode
    #[inline]
    pub const fn max_delay(self) -> u8 {
        (1 << self.delay_bits()) - 1
    }

    /// Largest number of cycles a single instruction can consume (2^delay_bits)
    #[inline]
    pub const fn chunk_limit(self) -> u32 {
        1 << self.delay_bits()
    }

    /// Side-set value accompanying a pin level, if side-set is in use
    #[inline]
    pub const fn side_set(self, level: PinLevel) -> Option<PinLevel> {
        match self {
            AntennaMode::Single => None,
            AntennaMode::Dual => Some(level),
        }
    }

    #[inline]
    pub const fn uses_side_set(self) -> bool {
        matches!(self, AntennaMode::Dual)
    }

    pub const fn antenna_count(self) -> u8 {
        match self {
            AntennaMode::Single => 1,
            AntennaMode::Dual => 2,
        }
    }
}

impl fmt::Display for AntennaMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AntennaMode::Single => write!(f, "one antenna"),
            AntennaMode::Dual => write!(f, "two antennas"),
        }
    }
}

/// Validated timing configuration
///
/// Deserialized values go through the same checks as [`TimingConfig::with_clock`].
/// A value assembled field by field skips them; the derived quantities assume
/// a validated configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "TimingFields")]
pub struct TimingConfig {
    /// State-machine clock in MHz
    pub clock_mhz: u32,
    /// Clock cycles per period of the symbol 0 frequency (even, >= 2)
    pub divider0: u32,
    /// Clock cycles per period of the symbol 1 frequency (even, >= 2)
    pub divider1: u32,
    /// Baud rate as requested by the caller
    pub requested_baud: u32,
    /// Baud rate actually used (nearest achievable)
    pub baud_rate: u32,
    /// Antenna mode
    pub mode: AntennaMode,
}

/// Serialized form of [`TimingConfig`], validated on the way in
#[derive(Serialize, Deserialize)]
struct TimingFields {
    clock_mhz: u32,
    divider0: u32,
    divider1: u32,
    requested_baud: u32,
    baud_rate: u32,
    mode: AntennaMode,
}

impl TryFrom<TimingFields> for TimingConfig {
    type Error = ConfigError;

    fn try_from(fields: TimingFields) -> Result<Self, ConfigError> {
        // baud_rate is derived from requested_baud
        Self::with_clock(
            fields.clock_mhz,
            fields.divider0,
            fields.divider1,
            fields.requested_baud,
            fields.mode,
        )
    }
}

impl TimingConfig {
    /// Create a configuration for the fixed 125 MHz clock
    pub fn new(divider0: u32, divider1: u32, baud: u32, mode: AntennaMode) -> Result<Self, ConfigError> {
        Self::with_clock(CLOCK_FREQ_MHZ, divider0, divider1, baud, mode)
    }

    /// Create a configuration for an arbitrary clock
    pub fn with_clock(
        clock_mhz: u32,
        divider0: u32,
        divider1: u32,
        baud: u32,
        mode: AntennaMode,
    ) -> Result<Self, ConfigError> {
        if clock_mhz == 0 {
            return Err(ConfigError::InvalidClock);
        }
        check_divider(Symbol::Zero, divider0)?;
        check_divider(Symbol::One, divider1)?;
        if baud == 0 {
            return Err(ConfigError::ZeroBaudRate);
        }

        let clock_hz = clock_mhz as u64 * 1_000_000;
        let baud_rate = nearest_achievable_baud(clock_hz, baud)
            .ok_or(ConfigError::BaudRateTooHigh { baud, clock_hz })?;

        let config = Self {
            clock_mhz,
            divider0,
            divider1,
            requested_baud: baud,
            baud_rate,
            mode,
        };

        let required = WASTED_CYCLES_PER_SYMBOL + divider0.max(divider1);
        if config.cycles_per_symbol() < required {
            return Err(ConfigError::SymbolTooShort {
                cycles_per_symbol: config.cycles_per_symbol(),
                required,
            });
        }

        Ok(config)
    }

    /// Same dividers and baud rate with another antenna mode
    pub fn with_mode(self, mode: AntennaMode) -> Self {
        Self { mode, ..self }
    }

    /// Clock frequency in Hz
    #[inline]
    pub const fn clock_hz(&self) -> u64 {
        self.clock_mhz as u64 * 1_000_000
    }

    /// Divider (period in clock cycles) of a symbol
    #[inline]
    pub const fn divider(&self, symbol: Symbol) -> u32 {
        match symbol {
            Symbol::Zero => self.divider0,
            Symbol::One => self.divider1,
        }
    }

    /// Cycles the pin stays at one level
    #[inline]
    pub const fn half_period(&self, symbol: Symbol) -> u32 {
        self.divider(symbol) / 2
    }

    /// Clock cycles in one symbol
    #[inline]
    pub const fn cycles_per_symbol(&self) -> u32 {
        (self.clock_hz() / self.baud_rate as u64) as u32
    }

    /// Clock cycles per symbol available to the pulse loops
    #[inline]
    pub const fn usable_cycles(&self) -> u32 {
        self.cycles_per_symbol() - WASTED_CYCLES_PER_SYMBOL
    }

    /// Loop-count word for a symbol: floor((b - w) / d) - 1
    ///
    /// `JMP x--` still branches once when X is zero, so the loop body runs
    /// one more time than this value.
    #[inline]
    pub const fn repetitions(&self, symbol: Symbol) -> u32 {
        self.usable_cycles() / self.divider(symbol) - 1
    }

    /// Cycles left over after the full periods of a symbol: (b - w) mod d
    #[inline]
    pub const fn remainder(&self, symbol: Symbol) -> u32 {
        self.usable_cycles() % self.divider(symbol)
    }

    /// Whether the requested baud rate had to be substituted
    #[inline]
    pub const fn baud_adjusted(&self) -> bool {
        self.requested_baud != self.baud_rate
    }

    /// Shift frequency of a symbol in kHz
    pub fn shift_frequency_khz(&self, symbol: Symbol) -> f64 {
        self.clock_mhz as f64 * 1000.0 / self.divider(symbol) as f64
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::with_clock(
            self.clock_mhz,
            self.divider0,
            self.divider1,
            self.requested_baud,
            self.mode,
        )
        .map(|_| ())
    }
}

impl Default for TimingConfig {
    /// 20/18 dividers at 100 kBaud on one antenna
    fn default() -> Self {
        Self {
            clock_mhz: CLOCK_FREQ_MHZ,
            divider0: 20,
            divider1: 18,
            requested_baud: 100_000,
            baud_rate: 100_000,
            mode: AntennaMode::Single,
        }
    }
}

impl fmt::Display for TimingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TimingConfig {{ clock: {} MHz, d0: {}, d1: {}, baud: {} ({} cycles/symbol), {} }}",
            self.clock_mhz,
            self.divider0,
            self.divider1,
            self.baud_rate,
            self.cycles_per_symbol(),
            self.mode,
        )
    }
}

fn check_divider(symbol: Symbol, value: u32) -> Result<(), ConfigError> {
    if value < 2 {
        return Err(ConfigError::DividerTooSmall { symbol, value });
    }
    if value % 2 != 0 {
        return Err(ConfigError::OddDivider { symbol, value });
    }
    Ok(())
}

/// Baud rate for the whole number of cycles per symbol nearest to `requested`
///
/// Returns the request unchanged when it is exact, `None` when the baud rate
/// rounds to less than one cycle per symbol.
pub fn nearest_achievable_baud(clock_hz: u64, requested: u32) -> Option<u32> {
    if requested == 0 {
        return None;
    }
    if clock_hz % requested as u64 == 0 {
        return Some(requested);
    }
    let cycles = (clock_hz as f64 / requested as f64).round();
    if cycles < 1.0 {
        return None;
    }
    Some((clock_hz as f64 / cycles).round() as u32)
}

/// Configuration error types
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("clock frequency must be non-zero")]
    InvalidClock,

    #[error("divider for symbol {symbol} must be at least 2, got {value}")]
    DividerTooSmall { symbol: Symbol, value: u32 },

    #[error("divider for symbol {symbol} must be an even integer, got {value}")]
    OddDivider { symbol: Symbol, value: u32 },

    #[error("baud rate must be positive")]
    ZeroBaudRate,

    #[error("baud rate {baud} is not achievable with a {clock_hz} Hz clock")]
    BaudRateTooHigh { baud: u32, clock_hz: u64 },

    #[error("symbol of {cycles_per_symbol} cycles is shorter than the {required} cycles one period needs")]
    SymbolTooShort { cycles_per_symbol: u32, required: u32 },
}
