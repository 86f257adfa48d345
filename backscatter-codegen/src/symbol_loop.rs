//! Symbol loop construction
//!
//! Each symbol is sent as a loop of one full period at the symbol frequency:
//! half a period high, half a period low, then `JMP x--` back to the top.
//! The loop runs `repetitions + 1` times; the cycles that do not add up to
//! a full period are spent in a trailing correction so that every symbol
//! lasts exactly `cycles_per_symbol` clock cycles.

use crate::delay::{sleeptime, split};
use backscatter_spec::pulse::total_cycles;
use backscatter_spec::{PinLevel, Pulse, Symbol, TimingConfig, WASTED_CYCLES_PER_SYMBOL};
use serde::{Deserialize, Serialize};

/// Cycles taken by the `JMP x--` closing the loop body
pub const LOOP_JUMP_CYCLES: u32 = 1;

/// Pulse loop for one symbol value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolLoop {
    pub symbol: Symbol,
    /// Period in clock cycles
    pub divider: u32,
    /// Loop-count word written to the state machine
    pub repetitions: u32,
    /// Pulses of the high half-period
    pub high: Vec<Pulse>,
    /// Pulses of the low half-period, one cycle short for the loop jump
    pub low: Vec<Pulse>,
    /// Cycles left over after the full periods
    pub remainder: u32,
    /// Correction pulses at high level
    pub correction_high: Vec<Pulse>,
    /// Correction pulses at low level
    pub correction_low: Vec<Pulse>,
}

impl SymbolLoop {
    /// Build the loop for `symbol`
    pub fn build(config: &TimingConfig, symbol: Symbol) -> Self {
        let mode = config.mode;
        let bits = mode.delay_bits();
        let half = config.half_period(symbol);
        let remainder = config.remainder(symbol);

        let pulses = |level: PinLevel, delays: Vec<u32>| -> Vec<Pulse> {
            delays
                .into_iter()
                .map(|delay| Pulse::new(level, delay as u8, mode.side_set(level)))
                .collect()
        };

        let high = pulses(PinLevel::High, sleeptime(half, 0, bits));
        let low = pulses(PinLevel::Low, sleeptime(half, LOOP_JUMP_CYCLES, bits));

        let correction_high_cycles = remainder.min(half);
        let correction_low_cycles = remainder.saturating_sub(half);
        let correction_high = pulses(
            PinLevel::High,
            split(correction_high_cycles, bits).into_iter().map(|c| c - 1).collect(),
        );
        let correction_low = pulses(
            PinLevel::Low,
            split(correction_low_cycles, bits).into_iter().map(|c| c - 1).collect(),
        );

        Self {
            symbol,
            divider: config.divider(symbol),
            repetitions: config.repetitions(symbol),
            high,
            low,
            remainder,
            correction_high,
            correction_low,
        }
    }

    /// Cycles of one pass through the loop body, including the loop jump
    pub fn body_cycles(&self) -> u32 {
        total_cycles(&self.high) + total_cycles(&self.low) + LOOP_JUMP_CYCLES
    }

    /// Cycles of the drift correction
    pub fn correction_cycles(&self) -> u32 {
        total_cycles(&self.correction_high) + total_cycles(&self.correction_low)
    }

    /// Cycles the state machine spends on one symbol, dispatch included
    pub fn symbol_cycles(&self) -> u32 {
        WASTED_CYCLES_PER_SYMBOL + (self.repetitions + 1) * self.body_cycles() + self.correction_cycles()
    }

    /// Instructions the loop occupies: body, loop jump and correction
    pub fn instruction_count(&self) -> usize {
        self.high.len()
            + self.low.len()
            + 1
            + self.correction_high.len()
            + self.correction_low.len()
    }
}

/// Loops for both symbols, symbol 0 first
pub fn build_loops(config: &TimingConfig) -> [SymbolLoop; 2] {
    [
        SymbolLoop::build(config, Symbol::Zero),
        SymbolLoop::build(config, Symbol::One),
    ]
}
