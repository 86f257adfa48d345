//! Instruction execution

use crate::error::{Result, RuntimeError};
use crate::state::{Pin, PioState};
use backscatter_spec::instruction::{
    JmpCondition, MovDestination, MovOp, MovSource, OutDestination, SetDestination,
};
use backscatter_spec::{Instruction, Operation, PinLevel, Target};

/// What happened to the instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Executed; `jumped` is set when the PC was written
    Done { jumped: bool },
    /// `OUT` found OSR and the FIFO empty
    Stalled,
}

/// Execute one instruction at `state.pc`
///
/// Side-set is applied first, even when the instruction stalls. The caller
/// advances the PC and the cycle count.
pub fn execute(instr: &Instruction, state: &mut PioState) -> Result<Outcome> {
    if let Some(level) = instr.side {
        state.drive(Pin::Side, level);
    }

    let jumped = match &instr.operation {
        Operation::Jmp { condition, target } => {
            let take = jump_condition(*condition, state);
            if take {
                state.pc = address(target, state.pc)?;
            }
            take
        }
        Operation::Out {
            destination,
            bit_count,
        } => {
            if !state.autopull() {
                return Ok(Outcome::Stalled);
            }
            let data = state.shift_out(*bit_count);
            match destination {
                OutDestination::Pins => drive_value(state, data),
                OutDestination::X => state.x = data,
                OutDestination::Y => state.y = data,
                OutDestination::Isr => state.isr = data,
                OutDestination::Null | OutDestination::Pindirs => {}
                OutDestination::Pc => {
                    state.pc = (data & 0x1F) as u8;
                    return Ok(Outcome::Done { jumped: true });
                }
                OutDestination::Exec => return Err(unsupported(instr, state)),
            }
            false
        }
        Operation::Mov {
            destination,
            op,
            source,
        } => {
            let value = apply(*op, read_source(*source, state));
            match destination {
                MovDestination::Pins => drive_value(state, value),
                MovDestination::X => state.x = value,
                MovDestination::Y => state.y = value,
                MovDestination::Isr => state.isr = value,
                MovDestination::Osr => {
                    state.osr = value;
                    state.osr_count = 0;
                }
                MovDestination::Pc => {
                    state.pc = (value & 0x1F) as u8;
                    return Ok(Outcome::Done { jumped: true });
                }
                MovDestination::Exec => return Err(unsupported(instr, state)),
            }
            false
        }
        Operation::Set { destination, value } => {
            let value = *value as u32;
            match destination {
                SetDestination::Pins => drive_value(state, value),
                SetDestination::X => state.x = value,
                SetDestination::Y => state.y = value,
                SetDestination::Pindirs => {}
            }
            false
        }
    };

    Ok(Outcome::Done { jumped })
}

/// Evaluate a condition, applying post-decrements
fn jump_condition(condition: JmpCondition, state: &mut PioState) -> bool {
    match condition {
        JmpCondition::Always => true,
        JmpCondition::XZero => state.x == 0,
        JmpCondition::XPostDecrement => {
            let take = state.x != 0;
            state.x = state.x.wrapping_sub(1);
            take
        }
        JmpCondition::YZero => state.y == 0,
        JmpCondition::YPostDecrement => {
            let take = state.y != 0;
            state.y = state.y.wrapping_sub(1);
            take
        }
        JmpCondition::XNotEqualY => state.x != state.y,
        JmpCondition::Pin => state.set_pin == Some(PinLevel::High),
        JmpCondition::OsrNotEmpty => !state.osr_empty(),
    }
}

fn read_source(source: MovSource, state: &PioState) -> u32 {
    match source {
        MovSource::Pins => state.set_pin.map_or(0, |level| level.value() as u32),
        MovSource::X => state.x,
        MovSource::Y => state.y,
        MovSource::Null => 0,
        MovSource::Status => {
            if state.tx_fifo.is_empty() {
                u32::MAX
            } else {
                0
            }
        }
        MovSource::Isr => state.isr,
        MovSource::Osr => state.osr,
    }
}

fn apply(op: MovOp, value: u32) -> u32 {
    match op {
        MovOp::None => value,
        MovOp::Invert => !value,
        MovOp::Reverse => value.reverse_bits(),
    }
}

fn drive_value(state: &mut PioState, value: u32) {
    let level = if value & 1 == 1 {
        PinLevel::High
    } else {
        PinLevel::Low
    };
    state.drive(Pin::Set, level);
}

fn address(target: &Target, pc: u8) -> Result<u8> {
    match target {
        Target::Address(address) => Ok(*address),
        Target::Label(label) => Err(RuntimeError::Other(format!(
            "unresolved label {} at {}",
            label, pc
        ))),
    }
}

fn unsupported(instr: &Instruction, state: &PioState) -> RuntimeError {
    RuntimeError::UnsupportedInstruction {
        pc: state.pc,
        instruction: instr.to_string(),
    }
}
