//! Disassembler errors

use backscatter_spec::BackscatterError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DisassemblerError {
    #[error("Invalid instruction encoding: 0x{0:04X}")]
    InvalidEncoding(u16),

    #[error("Unsupported opcode {opcode:#05b} in 0x{word:04X}")]
    UnsupportedOpcode { word: u16, opcode: u8 },

    #[error("Invalid program image: {0}")]
    InvalidImage(#[from] BackscatterError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DisassemblerError>;
