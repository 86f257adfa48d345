//! # Error Types for the backscatter toolchain

use crate::config::ConfigError;
use crate::program::ProgramError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackscatterError {
    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    // Program layout errors
    #[error("Invalid program: {0}")]
    InvalidProgram(#[from] ProgramError),

    #[error("Program needs {length} instructions, instruction memory holds {capacity}")]
    ProgramTooLarge { length: usize, capacity: usize },

    // Image errors
    #[error("Invalid magic number: expected 0x4250494F, got {0:#010x}")]
    InvalidMagic(u32),

    #[error("Unsupported image version: {0}")]
    UnsupportedVersion(u32),

    #[error("Wrap bounds {wrap_target}..={wrap} outside program of {length} instructions")]
    InvalidWrap { wrap_target: u8, wrap: u8, length: usize },

    #[error("Serialization error: {0}")]
    Serialization(String),

    // I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    // General errors
    #[error("{0}")]
    Other(String),
}

impl BackscatterError {
    /// Check if this error happens before any generation could start
    pub fn is_validation(&self) -> bool {
        matches!(self, BackscatterError::InvalidConfig(_))
    }
}
