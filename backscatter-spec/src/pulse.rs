//! Pulse micro-instructions
//!
//! A pulse holds the output pin at one level for `1 + delay` cycles. The
//! symbol loops are sequences of pulses; each pulse becomes one
//! `SET pins` instruction.

use crate::instruction::Instruction;
use crate::symbol::PinLevel;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pulse {
    /// Output pin level
    pub level: PinLevel,
    /// Delay field value (cycles beyond the first)
    pub delay: u8,
    /// Side-set level for the second antenna
    pub side: Option<PinLevel>,
}

impl Pulse {
    pub const fn new(level: PinLevel, delay: u8, side: Option<PinLevel>) -> Self {
        Self { level, delay, side }
    }

    /// Clock cycles the pulse occupies
    #[inline]
    pub const fn cycles(&self) -> u32 {
        1 + self.delay as u32
    }

    pub fn to_instruction(&self) -> Instruction {
        Instruction::set_pins(self.level)
            .with_side(self.side)
            .with_delay(self.delay)
    }
}

/// Total cycles of a pulse sequence
pub fn total_cycles(pulses: &[Pulse]) -> u32 {
    pulses.iter().map(Pulse::cycles).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::{Operation, SetDestination};

    #[test]
    fn test_pulse_cycles() {
        let pulses = [
            Pulse::new(PinLevel::High, 31, None),
            Pulse::new(PinLevel::High, 0, None),
        ];
        assert_eq!(pulses[0].cycles(), 32);
        assert_eq!(total_cycles(&pulses), 33);
        assert_eq!(total_cycles(&[]), 0);
    }

    #[test]
    fn test_to_instruction() {
        let instr = Pulse::new(PinLevel::Low, 3, Some(PinLevel::Low)).to_instruction();
        assert_eq!(
            instr.operation,
            Operation::Set {
                destination: SetDestination::Pins,
                value: 0
            }
        );
        assert_eq!(instr.side, Some(PinLevel::Low));
        assert_eq!(instr.delay, 3);
        assert_eq!(instr.cycles(), 4);
    }
}
