//! Runtime error types

use backscatter_assembler::AssemblerError;
use backscatter_disassembler::DisassemblerError;
use backscatter_spec::BackscatterError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Spec error: {0}")]
    SpecError(#[from] BackscatterError),

    #[error("Cannot load program: {0}")]
    Decode(#[from] DisassemblerError),

    #[error("Cannot build program: {0}")]
    Assemble(#[from] AssemblerError),

    #[error("Unsupported instruction at {pc}: {instruction}")]
    UnsupportedInstruction { pc: u8, instruction: String },

    #[error("Jump target {target} outside program of {length} instructions")]
    JumpOutOfRange { target: u32, length: usize },

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_display() {
        let err = RuntimeError::UnsupportedInstruction {
            pc: 4,
            instruction: "out exec, 16".to_string(),
        };
        assert_eq!(err.to_string(), "Unsupported instruction at 4: out exec, 16");
    }

    #[test]
    fn test_jump_out_of_range_display() {
        let err = RuntimeError::JumpOutOfRange { target: 20, length: 17 };
        assert_eq!(
            err.to_string(),
            "Jump target 20 outside program of 17 instructions"
        );
    }

    #[test]
    fn test_spec_error_from() {
        let err: RuntimeError = BackscatterError::Other("empty".into()).into();
        assert!(matches!(err, RuntimeError::SpecError(_)));
    }
}
