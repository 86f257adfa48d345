//! Instruction decoder

use crate::error::{DisassemblerError, Result};
use backscatter_spec::instruction::{
    JmpCondition, MovDestination, MovOp, MovSource, OutDestination, SetDestination,
};
use backscatter_spec::{AntennaMode, Instruction, Operation, PinLevel, Target};

/// Decode a 16-bit instruction word
///
/// `mode` selects how the delay/side-set field is split.
pub fn decode(word: u16, mode: AntennaMode) -> Result<Instruction> {
    let opcode = (word >> 13) as u8;
    let destination = ((word >> 5) & 0x7) as u8;
    let data = (word & 0x1F) as u8;

    let operation = match opcode {
        0b000 => Operation::Jmp {
            condition: JmpCondition::from_code(destination)
                .ok_or(DisassemblerError::InvalidEncoding(word))?,
            target: Target::Address(data),
        },
        0b011 => Operation::Out {
            destination: OutDestination::from_code(destination)
                .ok_or(DisassemblerError::InvalidEncoding(word))?,
            bit_count: if data == 0 { 32 } else { data },
        },
        0b101 => Operation::Mov {
            destination: MovDestination::from_code(destination)
                .ok_or(DisassemblerError::InvalidEncoding(word))?,
            op: MovOp::from_code(((word >> 3) & 0x3) as u8)
                .ok_or(DisassemblerError::InvalidEncoding(word))?,
            source: MovSource::from_code((word & 0x7) as u8)
                .ok_or(DisassemblerError::InvalidEncoding(word))?,
        },
        0b111 => Operation::Set {
            destination: SetDestination::from_code(destination)
                .ok_or(DisassemblerError::InvalidEncoding(word))?,
            value: data,
        },
        _ => return Err(DisassemblerError::UnsupportedOpcode { word, opcode }),
    };

    let (side, delay) = decode_delay_side(word, mode)?;
    Ok(Instruction::new(operation).with_side(side).with_delay(delay))
}

fn decode_delay_side(word: u16, mode: AntennaMode) -> Result<(Option<PinLevel>, u8)> {
    let field = ((word >> 8) & 0x1F) as u8;
    match mode {
        AntennaMode::Single => Ok((None, field)),
        AntennaMode::Dual => {
            let delay = field & mode.max_delay();
            let enabled = field & 0b1_0000 != 0;
            let value = (field >> 3) & 1;
            match (enabled, value) {
                (true, _) => Ok((PinLevel::from_value(value), delay)),
                (false, 0) => Ok((None, delay)),
                (false, _) => Err(DisassemblerError::InvalidEncoding(word)),
            }
        }
    }
}
