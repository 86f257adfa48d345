//! Symbols and pin levels

use serde::{Deserialize, Serialize};
use std::fmt;

/// One transmitted bit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Symbol {
    Zero,
    One,
}

impl Symbol {
    /// Both symbols, in loop-count word order
    pub const ALL: [Symbol; 2] = [Symbol::Zero, Symbol::One];

    /// Bit value of the symbol
    #[inline]
    pub const fn bit(self) -> u32 {
        match self {
            Symbol::Zero => 0,
            Symbol::One => 1,
        }
    }

    /// Symbol for a data bit
    #[inline]
    pub const fn from_bit(bit: bool) -> Self {
        if bit {
            Symbol::One
        } else {
            Symbol::Zero
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bit())
    }
}

/// Logic level of an output pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PinLevel {
    Low,
    High,
}

impl PinLevel {
    #[inline]
    pub const fn value(self) -> u8 {
        match self {
            PinLevel::Low => 0,
            PinLevel::High => 1,
        }
    }

    /// Level for a raw value (0 or 1)
    pub const fn from_value(value: u8) -> Option<Self> {
        match value {
            0 => Some(PinLevel::Low),
            1 => Some(PinLevel::High),
            _ => None,
        }
    }

    /// Word describing the level in generated comments
    pub const fn describe(self) -> &'static str {
        match self {
            PinLevel::Low => "low",
            PinLevel::High => "high",
        }
    }
}

impl fmt::Display for PinLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}
