//! # Backscatter PIO Runtime
//!
//! Cycle-accurate simulation of one PIO state machine running a backscatter
//! program: scratch registers, shift registers with autopull, the TX FIFO and
//! the output pins.
//!
//! The simulator records every pin edge and the cycle at which each data bit
//! is fetched, which is enough to check that every symbol lasts exactly
//! `clock / baud` cycles and toggles at the right frequency.
//!
//! ## Example
//!
//! ```rust
//! use backscatter_runtime::transmit;
//! use backscatter_spec::TimingConfig;
//!
//! let result = transmit(&TimingConfig::default(), &[true, false, true]).unwrap();
//! assert!(result.symbol_durations().iter().all(|&cycles| cycles == 1250));
//! ```

pub mod error;
pub mod execute;
pub mod state;
pub mod vm;

pub use error::{Result, RuntimeError};
pub use state::{HaltReason, Pin, PinEdge, PioState, SymbolStart};
pub use vm::{ExecutionResult, VMConfig, VM};

use backscatter_assembler::assemble_program;
use backscatter_codegen::generate;
use backscatter_spec::TimingConfig;
use tracing::info;

/// Pack data bits into FIFO words, most significant bit first
///
/// The last word is padded with zeros.
pub fn pack_bits(bits: &[bool]) -> Vec<u32> {
    bits.chunks(32)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .fold(0u32, |word, (i, &bit)| word | ((bit as u32) << (31 - i)))
        })
        .collect()
}

/// Generate, assemble and run the program for `config`, sending `bits`
///
/// The FIFO is fed the way the firmware does it: the two loop-count words,
/// then the data words. Padding bits of the last word are transmitted too.
pub fn transmit(config: &TimingConfig, bits: &[bool]) -> Result<ExecutionResult> {
    let generation = generate(config);
    let image = assemble_program(&generation.program)?;

    let words = pack_bits(bits);
    let symbols = words.len() as u64 * 32;
    let vm_config = VMConfig {
        max_cycles: (symbols + 1) * config.cycles_per_symbol() as u64 + 64,
        ..VMConfig::default()
    };

    let mut vm = VM::new(&image, vm_config)?;
    vm.push_all(generation.constants.loop_counts());
    vm.push_all(words);
    let result = vm.run()?;

    info!(
        bits = bits.len(),
        cycles = result.cycles,
        reason = ?result.halt_reason,
        "transmission finished"
    );
    Ok(result)
}
