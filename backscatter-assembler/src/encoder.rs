//! Instruction encoding to 16-bit PIO words
//!
//! `[opcode:3][delay/side-set:5][operands:8]`. With `.side_set 1 opt` the
//! top bit of the delay/side-set field enables side-set, the next bit is the
//! side-set value and the remaining three bits hold the delay.

use crate::error::{AssemblerError, Result};
use backscatter_spec::{AntennaMode, Instruction, Operation, Target};

pub const OPCODE_JMP: u16 = 0b000;
pub const OPCODE_OUT: u16 = 0b011;
pub const OPCODE_MOV: u16 = 0b101;
pub const OPCODE_SET: u16 = 0b111;

/// Encode a resolved instruction
pub fn encode(instr: &Instruction, mode: AntennaMode) -> Result<u16> {
    let (opcode, operands) = match &instr.operation {
        Operation::Jmp { condition, target } => {
            let address = match target {
                Target::Address(address) => *address as u16,
                Target::Label(label) => return Err(AssemblerError::UndefinedLabel(label.clone())),
            };
            (OPCODE_JMP, (condition.code() as u16) << 5 | (address & 0x1F))
        }
        Operation::Out {
            destination,
            bit_count,
        } => (
            OPCODE_OUT,
            // 32 is encoded as 0
            (destination.code() as u16) << 5 | (*bit_count as u16 & 0x1F),
        ),
        Operation::Mov {
            destination,
            op,
            source,
        } => (
            OPCODE_MOV,
            (destination.code() as u16) << 5 | (op.code() as u16) << 3 | source.code() as u16,
        ),
        Operation::Set { destination, value } => (
            OPCODE_SET,
            (destination.code() as u16) << 5 | (*value as u16 & 0x1F),
        ),
    };

    Ok(opcode << 13 | encode_delay_side(instr, mode)? << 8 | operands)
}

/// The 5-bit delay/side-set field
fn encode_delay_side(instr: &Instruction, mode: AntennaMode) -> Result<u16> {
    let max = mode.max_delay();
    if instr.delay > max {
        return Err(AssemblerError::DelayOutOfRange {
            delay: instr.delay,
            max,
        });
    }

    match (mode, instr.side) {
        (AntennaMode::Single, Some(_)) => Err(AssemblerError::SideSetNotConfigured),
        (AntennaMode::Single, None) => Ok(instr.delay as u16),
        (AntennaMode::Dual, None) => Ok(instr.delay as u16),
        (AntennaMode::Dual, Some(level)) => {
            Ok(0b10 << 3 | (level.value() as u16) << 3 | instr.delay as u16)
        }
    }
}
