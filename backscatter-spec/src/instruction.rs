//! PIO Instruction Set
//!
//! 16-bit instructions with a 3-bit opcode and a shared delay/side-set field.
//!
//! ## Instruction Format
//! - `[opcode:3][delay/side-set:5][operands:8]`
//! - JMP:  `[000][ds][condition:3][address:5]`
//! - OUT:  `[011][ds][destination:3][bit count:5]` (32 encoded as 0)
//! - MOV:  `[101][ds][destination:3][op:2][source:3]`
//! - SET:  `[111][ds][destination:3][data:5]`
//!
//! Only the instructions the backscatter program uses are modelled.

use crate::symbol::PinLevel;
use crate::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// JMP condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JmpCondition {
    Always,
    /// `!x`: X is zero
    XZero,
    /// `x--`: X is non-zero, decrement afterwards
    XPostDecrement,
    /// `!y`: Y is zero
    YZero,
    /// `y--`: Y is non-zero, decrement afterwards
    YPostDecrement,
    /// `x!=y`
    XNotEqualY,
    /// `pin`: jump pin is high
    Pin,
    /// `!osre`: output shift register not empty
    OsrNotEmpty,
}

impl JmpCondition {
    pub const fn code(self) -> u8 {
        match self {
            JmpCondition::Always => 0b000,
            JmpCondition::XZero => 0b001,
            JmpCondition::XPostDecrement => 0b010,
            JmpCondition::YZero => 0b011,
            JmpCondition::YPostDecrement => 0b100,
            JmpCondition::XNotEqualY => 0b101,
            JmpCondition::Pin => 0b110,
            JmpCondition::OsrNotEmpty => 0b111,
        }
    }

    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0b000 => Some(JmpCondition::Always),
            0b001 => Some(JmpCondition::XZero),
            0b010 => Some(JmpCondition::XPostDecrement),
            0b011 => Some(JmpCondition::YZero),
            0b100 => Some(JmpCondition::YPostDecrement),
            0b101 => Some(JmpCondition::XNotEqualY),
            0b110 => Some(JmpCondition::Pin),
            0b111 => Some(JmpCondition::OsrNotEmpty),
            _ => None,
        }
    }

    /// Assembly syntax of the condition (`None` for unconditional jumps)
    pub const fn syntax(self) -> Option<&'static str> {
        match self {
            JmpCondition::Always => None,
            JmpCondition::XZero => Some("!x"),
            JmpCondition::XPostDecrement => Some("x--"),
            JmpCondition::YZero => Some("!y"),
            JmpCondition::YPostDecrement => Some("y--"),
            JmpCondition::XNotEqualY => Some("x!=y"),
            JmpCondition::Pin => Some("pin"),
            JmpCondition::OsrNotEmpty => Some("!osre"),
        }
    }
}

/// OUT destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutDestination {
    Pins,
    X,
    Y,
    Null,
    Pindirs,
    Pc,
    Isr,
    Exec,
}

impl OutDestination {
    pub const fn code(self) -> u8 {
        match self {
            OutDestination::Pins => 0b000,
            OutDestination::X => 0b001,
            OutDestination::Y => 0b010,
            OutDestination::Null => 0b011,
            OutDestination::Pindirs => 0b100,
            OutDestination::Pc => 0b101,
            OutDestination::Isr => 0b110,
            OutDestination::Exec => 0b111,
        }
    }

    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0b000 => Some(OutDestination::Pins),
            0b001 => Some(OutDestination::X),
            0b010 => Some(OutDestination::Y),
            0b011 => Some(OutDestination::Null),
            0b100 => Some(OutDestination::Pindirs),
            0b101 => Some(OutDestination::Pc),
            0b110 => Some(OutDestination::Isr),
            0b111 => Some(OutDestination::Exec),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            OutDestination::Pins => "pins",
            OutDestination::X => "x",
            OutDestination::Y => "y",
            OutDestination::Null => "null",
            OutDestination::Pindirs => "pindirs",
            OutDestination::Pc => "pc",
            OutDestination::Isr => "isr",
            OutDestination::Exec => "exec",
        }
    }
}

/// MOV destination (code 0b011 is reserved)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovDestination {
    Pins,
    X,
    Y,
    Exec,
    Pc,
    Isr,
    Osr,
}

impl MovDestination {
    pub const fn code(self) -> u8 {
        match self {
            MovDestination::Pins => 0b000,
            MovDestination::X => 0b001,
            MovDestination::Y => 0b010,
            MovDestination::Exec => 0b100,
            MovDestination::Pc => 0b101,
            MovDestination::Isr => 0b110,
            MovDestination::Osr => 0b111,
        }
    }

    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0b000 => Some(MovDestination::Pins),
            0b001 => Some(MovDestination::X),
            0b010 => Some(MovDestination::Y),
            0b100 => Some(MovDestination::Exec),
            0b101 => Some(MovDestination::Pc),
            0b110 => Some(MovDestination::Isr),
            0b111 => Some(MovDestination::Osr),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            MovDestination::Pins => "pins",
            MovDestination::X => "x",
            MovDestination::Y => "y",
            MovDestination::Exec => "exec",
            MovDestination::Pc => "pc",
            MovDestination::Isr => "isr",
            MovDestination::Osr => "osr",
        }
    }
}

/// MOV source (code 0b100 is reserved)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovSource {
    Pins,
    X,
    Y,
    Null,
    Status,
    Isr,
    Osr,
}

impl MovSource {
    pub const fn code(self) -> u8 {
        match self {
            MovSource::Pins => 0b000,
            MovSource::X => 0b001,
            MovSource::Y => 0b010,
            MovSource::Null => 0b011,
            MovSource::Status => 0b101,
            MovSource::Isr => 0b110,
            MovSource::Osr => 0b111,
        }
    }

    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0b000 => Some(MovSource::Pins),
            0b001 => Some(MovSource::X),
            0b010 => Some(MovSource::Y),
            0b011 => Some(MovSource::Null),
            0b101 => Some(MovSource::Status),
            0b110 => Some(MovSource::Isr),
            0b111 => Some(MovSource::Osr),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            MovSource::Pins => "pins",
            MovSource::X => "x",
            MovSource::Y => "y",
            MovSource::Null => "null",
            MovSource::Status => "status",
            MovSource::Isr => "isr",
            MovSource::Osr => "osr",
        }
    }
}

/// Operation applied while moving (code 0b11 is reserved)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MovOp {
    #[default]
    None,
    /// `!src`: bitwise complement
    Invert,
    /// `::src`: bit reverse
    Reverse,
}

impl MovOp {
    pub const fn code(self) -> u8 {
        match self {
            MovOp::None => 0b00,
            MovOp::Invert => 0b01,
            MovOp::Reverse => 0b10,
        }
    }

    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0b00 => Some(MovOp::None),
            0b01 => Some(MovOp::Invert),
            0b10 => Some(MovOp::Reverse),
            _ => None,
        }
    }

    pub const fn prefix(self) -> &'static str {
        match self {
            MovOp::None => "",
            MovOp::Invert => "!",
            MovOp::Reverse => "::",
        }
    }
}

/// SET destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SetDestination {
    Pins,
    X,
    Y,
    Pindirs,
}

impl SetDestination {
    pub const fn code(self) -> u8 {
        match self {
            SetDestination::Pins => 0b000,
            SetDestination::X => 0b001,
            SetDestination::Y => 0b010,
            SetDestination::Pindirs => 0b100,
        }
    }

    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0b000 => Some(SetDestination::Pins),
            0b001 => Some(SetDestination::X),
            0b010 => Some(SetDestination::Y),
            0b100 => Some(SetDestination::Pindirs),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            SetDestination::Pins => "pins",
            SetDestination::X => "x",
            SetDestination::Y => "y",
            SetDestination::Pindirs => "pindirs",
        }
    }
}

/// Jump target: a label before layout, an address after
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    Label(String),
    Address(Address),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Label(name) => write!(f, "{}", name),
            Target::Address(address) => write!(f, "{}", address),
        }
    }
}

/// Instruction operation and operands
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    Jmp { condition: JmpCondition, target: Target },
    Out { destination: OutDestination, bit_count: u8 },
    Mov { destination: MovDestination, op: MovOp, source: MovSource },
    Set { destination: SetDestination, value: u8 },
}

/// PIO instruction with its side-set value and delay
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instruction {
    pub operation: Operation,
    /// Side-set pin level, if side-set is asserted for this instruction
    pub side: Option<PinLevel>,
    /// Extra idle cycles after the instruction
    pub delay: u8,
}

impl Instruction {
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            side: None,
            delay: 0,
        }
    }

    pub fn with_side(mut self, side: Option<PinLevel>) -> Self {
        self.side = side;
        self
    }

    pub fn with_delay(mut self, delay: u8) -> Self {
        self.delay = delay;
        self
    }

    /// `JMP [condition] label`
    pub fn jmp(condition: JmpCondition, label: impl Into<String>) -> Self {
        Self::new(Operation::Jmp {
            condition,
            target: Target::Label(label.into()),
        })
    }

    /// `OUT destination, bit_count`
    pub fn out(destination: OutDestination, bit_count: u8) -> Self {
        Self::new(Operation::Out {
            destination,
            bit_count,
        })
    }

    /// `MOV destination, source`
    pub fn mov(destination: MovDestination, source: MovSource) -> Self {
        Self::new(Operation::Mov {
            destination,
            op: MovOp::None,
            source,
        })
    }

    /// `SET destination, value`
    pub fn set(destination: SetDestination, value: u8) -> Self {
        Self::new(Operation::Set { destination, value })
    }

    /// `SET pins, level`
    pub fn set_pins(level: PinLevel) -> Self {
        Self::set(SetDestination::Pins, level.value())
    }

    /// Clock cycles the instruction occupies when it does not stall
    #[inline]
    pub fn cycles(&self) -> u32 {
        1 + self.delay as u32
    }

    /// Get instruction mnemonic
    pub fn mnemonic(&self) -> &'static str {
        match self.operation {
            Operation::Jmp { .. } => "jmp",
            Operation::Out { .. } => "out",
            Operation::Mov { .. } => "mov",
            Operation::Set { .. } => "set",
        }
    }

    /// Check if this is a jump instruction
    pub fn is_jump(&self) -> bool {
        matches!(self.operation, Operation::Jmp { .. })
    }

    /// Label referenced by a jump, if any
    pub fn label(&self) -> Option<&str> {
        match &self.operation {
            Operation::Jmp {
                target: Target::Label(name),
                ..
            } => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.operation {
            Operation::Jmp { condition, target } => match condition.syntax() {
                Some(condition) => write!(f, "jmp {}, {}", condition, target)?,
                None => write!(f, "jmp {}", target)?,
            },
            Operation::Out {
                destination,
                bit_count,
            } => write!(f, "out {}, {}", destination.name(), bit_count)?,
            Operation::Mov {
                destination,
                op,
                source,
            } => write!(f, "mov {}, {}{}", destination.name(), op.prefix(), source.name())?,
            Operation::Set { destination, value } => {
                write!(f, "set {}, {}", destination.name(), value)?
            }
        }
        if let Some(side) = self.side {
            write!(f, " side {}", side)?;
        }
        if self.delay > 0 {
            write!(f, " [{}]", self.delay)?;
        }
        Ok(())
    }
}
