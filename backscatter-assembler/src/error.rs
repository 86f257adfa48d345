//! Assembler errors

use backscatter_spec::{BackscatterError, ProgramError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssemblerError {
    #[error("Syntax error at line {line}, column {column}: {message}")]
    SyntaxError {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Unknown instruction at line {line}: {mnemonic}")]
    UnknownInstruction { line: usize, mnemonic: String },

    #[error("Invalid operand at line {line}: {operand}")]
    InvalidOperand { line: usize, operand: String },

    #[error("{what} {value} out of range at line {line} (max {max})")]
    ValueOutOfRange {
        line: usize,
        what: &'static str,
        value: u32,
        max: u32,
    },

    #[error("Undefined label: {0}")]
    UndefinedLabel(String),

    #[error("Duplicate label: {0}")]
    DuplicateLabel(String),

    #[error("Label {label} at instruction {index} is outside the addressable range")]
    AddressOutOfRange { label: String, index: usize },

    #[error("Invalid directive: {0}")]
    InvalidDirective(String),

    #[error("Delay {delay} exceeds the maximum of {max} for this side-set configuration")]
    DelayOutOfRange { delay: u8, max: u8 },

    #[error("Side-set used without a .side_set directive")]
    SideSetNotConfigured,

    #[error("Program needs {length} instructions, instruction memory holds {capacity}")]
    ProgramTooLarge { length: usize, capacity: usize },

    #[error("Unterminated code block starting at line {0}")]
    UnterminatedBlock(usize),

    #[error("Invalid program image: {0}")]
    InvalidImage(#[from] BackscatterError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<ProgramError> for AssemblerError {
    fn from(err: ProgramError) -> Self {
        match err {
            ProgramError::UndefinedLabel(label) => AssemblerError::UndefinedLabel(label),
            ProgramError::DuplicateLabel(label) => AssemblerError::DuplicateLabel(label),
            ProgramError::AddressOutOfRange { label, index } => {
                AssemblerError::AddressOutOfRange { label, index }
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, AssemblerError>;
