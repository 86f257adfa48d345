//! Program layout
//!
//! ```text
//!     set pins, 1            ; switch output off
//!     out isr, 32            ; loop count for symbol 0
//!     out y, 32              ; loop count for symbol 1
//! get_symbol:
//!     out x, 1               ; get data bit
//!     jmp !x, send_0
//! send_1:
//!     mov x, y
//! loop_1:
//!     <high pulses> <low pulses>
//!     jmp x--, loop_1
//!     <correction pulses>
//!     jmp get_symbol
//! send_0:
//!     ... same with mov x, isr ...
//! ```
//!
//! `out x` through the `mov` and the closing `jmp get_symbol` account for
//! the four cycles per symbol that are not spent in the loops.

use crate::symbol_loop::SymbolLoop;
use backscatter_spec::instruction::{JmpCondition, MovDestination, MovSource, OutDestination};
use backscatter_spec::{Instruction, PinLevel, Program, Pulse, Symbol, TimingConfig, PROGRAM_NAME};
use tracing::debug;

/// Label of the symbol dispatch
pub const GET_SYMBOL: &str = "get_symbol";

/// Label of the code sending `symbol`
pub fn send_label(symbol: Symbol) -> String {
    format!("send_{}", symbol)
}

/// Label at the top of the pulse loop of `symbol`
pub fn loop_label(symbol: Symbol) -> String {
    format!("loop_{}", symbol)
}

/// Register holding the loop count of a symbol
fn count_register(symbol: Symbol) -> (OutDestination, MovSource) {
    match symbol {
        Symbol::Zero => (OutDestination::Isr, MovSource::Isr),
        Symbol::One => (OutDestination::Y, MovSource::Y),
    }
}

/// Lay out the full program around the two symbol loops
pub fn build_program(config: &TimingConfig, loops: &[SymbolLoop; 2]) -> Program {
    let mode = config.mode;
    let mut program = Program::new(PROGRAM_NAME, mode);

    program.push_instruction(
        Instruction::set_pins(PinLevel::High).with_side(mode.side_set(PinLevel::High)),
        Some("switch output off".into()),
    );
    for symbol in Symbol::ALL {
        let (register, _) = count_register(symbol);
        program.push_instruction(
            Instruction::out(register, 32),
            Some(format!("loop count for symbol {}", symbol)),
        );
    }

    program.push_label(GET_SYMBOL);
    program.push_instruction(
        Instruction::out(OutDestination::X, 1),
        Some("get data bit".into()),
    );
    program.push_instruction(
        Instruction::jmp(JmpCondition::XZero, send_label(Symbol::Zero)),
        Some("jump if x is zero".into()),
    );

    // symbol 1 falls through from the dispatch
    push_loop(&mut program, config, &loops[Symbol::One.bit() as usize]);
    push_loop(&mut program, config, &loops[Symbol::Zero.bit() as usize]);

    debug!(
        instructions = program.len(),
        mode = %mode,
        "laid out program"
    );
    program
}

fn push_loop(program: &mut Program, config: &TimingConfig, lp: &SymbolLoop) {
    let symbol = lp.symbol;
    let half = lp.divider / 2;
    let frequency_khz = config.shift_frequency_khz(symbol);
    let (_, source) = count_register(symbol);

    program.push_label(send_label(symbol));
    program.push_instruction(
        Instruction::mov(MovDestination::X, source),
        Some(format!("load loop count for symbol {}", symbol)),
    );

    program.push_label(loop_label(symbol));
    for (pulses, level) in [(&lp.high, PinLevel::High), (&lp.low, PinLevel::Low)] {
        push_pulses(
            program,
            pulses,
            &format!("{:.1} kHz: {} cycles {}", frequency_khz, half, level.describe()),
        );
    }
    program.push_instruction(
        Instruction::jmp(JmpCondition::XPostDecrement, loop_label(symbol)),
        Some("1 cycle".into()),
    );

    program.push_comment("stop the last period on time to avoid drift");
    program.push_comment(format!(
        "(b - w) % d{} = ({} - 4) % {} => {} cycles left to spend",
        symbol,
        config.cycles_per_symbol(),
        lp.divider,
        lp.remainder
    ));
    let high_cycles = lp.remainder.min(half);
    push_pulses(
        program,
        &lp.correction_high,
        &format!("spend {} cycles of last period on high", high_cycles),
    );
    push_pulses(
        program,
        &lp.correction_low,
        &format!("spend {} cycles of last period on low", lp.remainder - high_cycles),
    );
    program.push_instruction(Instruction::jmp(JmpCondition::Always, GET_SYMBOL), None);
}

fn push_pulses(program: &mut Program, pulses: &[Pulse], comment: &str) {
    for pulse in pulses {
        program.push_instruction(pulse.to_instruction(), Some(comment.to_string()));
    }
}
