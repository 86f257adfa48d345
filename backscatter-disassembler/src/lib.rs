//! # Backscatter PIO Disassembler
//!
//! Decode 16-bit PIO instruction words back into instructions, either as an
//! annotated listing or as source the assembler accepts again.
//!
//! ## Example
//!
//! ```rust
//! use backscatter_disassembler::disassemble;
//! use backscatter_spec::{AntennaMode, ProgramImage};
//!
//! let image = ProgramImage::new("blink", AntennaMode::Single, vec![0xFF01, 0xFE00, 0x0000]);
//! let listing = disassemble(&image).unwrap();
//! assert!(listing.contains("set pins, 1 [31]"));
//! ```

pub mod decoder;
pub mod disassembler;
pub mod error;
pub mod formatter;

pub use decoder::decode;
pub use disassembler::{decode_image, disassemble, to_source};
pub use error::{DisassemblerError, Result};
pub use formatter::format;
