//! State-machine registers, pins and TX FIFO

use backscatter_spec::{PinLevel, Symbol};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Autopull threshold and register width
pub const SHIFT_THRESHOLD: u32 = 32;

/// Output pins driven by the program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pin {
    /// Pin written by `set pins`
    Set,
    /// Side-set pin (second antenna)
    Side,
}

/// A pin changing level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinEdge {
    pub cycle: u64,
    pub pin: Pin,
    pub level: PinLevel,
}

/// A data bit fetched into X
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolStart {
    pub cycle: u64,
    pub symbol: Symbol,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HaltReason {
    /// An `OUT` needed data and the TX FIFO was empty
    FifoEmpty,
    /// Cycle limit reached
    CycleLimit,
}

/// State machine state
#[derive(Debug, Clone, Default)]
pub struct PioState {
    pub x: u32,
    pub y: u32,
    pub isr: u32,
    pub osr: u32,
    /// Bits shifted out of OSR since the last pull
    pub osr_count: u32,
    pub pc: u8,
    /// Cycle count
    pub cycle: u64,
    pub tx_fifo: VecDeque<u32>,
    pub set_pin: Option<PinLevel>,
    pub side_pin: Option<PinLevel>,
    pub edges: Vec<PinEdge>,
    pub halt_reason: Option<HaltReason>,
}

impl PioState {
    pub fn new() -> Self {
        Self {
            osr_count: SHIFT_THRESHOLD,
            ..Self::default()
        }
    }

    #[inline]
    pub fn is_halted(&self) -> bool {
        self.halt_reason.is_some()
    }

    pub fn halt(&mut self, reason: HaltReason) {
        self.halt_reason = Some(reason);
    }

    #[inline]
    pub fn osr_empty(&self) -> bool {
        self.osr_count >= SHIFT_THRESHOLD
    }

    /// Refill OSR from the FIFO when it has been shifted out
    ///
    /// Returns `false` when OSR is empty and the FIFO has nothing left.
    pub fn autopull(&mut self) -> bool {
        if !self.osr_empty() {
            return true;
        }
        match self.tx_fifo.pop_front() {
            Some(word) => {
                self.osr = word;
                self.osr_count = 0;
                true
            }
            None => false,
        }
    }

    /// Shift `bit_count` bits out of OSR, most significant first
    pub fn shift_out(&mut self, bit_count: u8) -> u32 {
        let n = bit_count as u32;
        let data = if n >= 32 { self.osr } else { self.osr >> (32 - n) };
        self.osr = if n >= 32 { 0 } else { self.osr << n };
        self.osr_count = (self.osr_count + n).min(SHIFT_THRESHOLD);
        data
    }

    /// Drive a pin, recording an edge when its level changes
    pub fn drive(&mut self, pin: Pin, level: PinLevel) {
        let current = match pin {
            Pin::Set => &mut self.set_pin,
            Pin::Side => &mut self.side_pin,
        };
        if *current != Some(level) {
            *current = Some(level);
            self.edges.push(PinEdge {
                cycle: self.cycle,
                pin,
                level,
            });
        }
    }
}
