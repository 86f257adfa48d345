//! Backscatter PIO Assembler
//!
//! Assemble PIO assembly into 16-bit instruction words.
//!
//! ## Example
//!
//! ```rust
//! use backscatter_assembler::assemble;
//!
//! let source = r#"
//!     .program blink
//!     top:
//!         set pins, 1 [31]
//!         set pins, 0 [30]
//!         jmp top
//! "#;
//!
//! let image = assemble(source).unwrap();
//! assert_eq!(image.words.len(), 3);
//! ```

pub mod assembler;
pub mod encoder;
pub mod error;
pub mod lexer;
pub mod parser;

pub use assembler::{assemble, assemble_program, parse_source, Assembly};
pub use encoder::encode;
pub use error::{AssemblerError, Result};
pub use parser::{parse_instruction, parse_line, Directive, Statement};
