//! Cycle-accurate state machine

use crate::error::{Result, RuntimeError};
use crate::execute::{execute, Outcome};
use crate::state::{HaltReason, Pin, PinEdge, PioState, SymbolStart};
use backscatter_disassembler::decode_image;
use backscatter_spec::instruction::{OutDestination, Target};
use backscatter_spec::{Instruction, Operation, ProgramImage, Symbol};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// VM configuration
#[derive(Debug, Clone)]
pub struct VMConfig {
    /// Maximum number of cycles before halting
    pub max_cycles: u64,

    /// Log every executed instruction at trace level
    pub trace: bool,
}

impl Default for VMConfig {
    fn default() -> Self {
        Self {
            max_cycles: 10_000_000,
            trace: false,
        }
    }
}

/// Execution result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Cycle at which execution stopped
    pub cycles: u64,

    pub halt_reason: HaltReason,

    /// Pin level changes in cycle order
    pub edges: Vec<PinEdge>,

    /// Every `OUT` into X, with the bit it fetched
    pub symbols: Vec<SymbolStart>,
}

impl ExecutionResult {
    /// `[start, end)` cycles of each transmitted symbol
    ///
    /// A symbol ends where the next data bit is fetched. The last one only
    /// counts when the program went on to wait for more data.
    pub fn symbol_windows(&self) -> Vec<(u64, u64)> {
        let mut windows: Vec<(u64, u64)> = self
            .symbols
            .windows(2)
            .map(|pair| (pair[0].cycle, pair[1].cycle))
            .collect();
        if self.halt_reason == HaltReason::FifoEmpty {
            if let Some(last) = self.symbols.last() {
                windows.push((last.cycle, self.cycles));
            }
        }
        windows
    }

    /// Cycles spent on each transmitted symbol
    pub fn symbol_durations(&self) -> Vec<u64> {
        self.symbol_windows()
            .into_iter()
            .map(|(start, end)| end - start)
            .collect()
    }

    /// Transmitted symbols in order
    pub fn transmitted(&self) -> Vec<Symbol> {
        self.symbols.iter().map(|start| start.symbol).collect()
    }

    /// Edges of one pin
    pub fn edges_of(&self, pin: Pin) -> impl Iterator<Item = &PinEdge> + '_ {
        self.edges.iter().filter(move |edge| edge.pin == pin)
    }
}

/// PIO state machine running one program
pub struct VM {
    state: PioState,
    instructions: Vec<Instruction>,
    wrap_target: u8,
    wrap: u8,
    config: VMConfig,
    symbols: Vec<SymbolStart>,
}

impl VM {
    /// Load a program image
    pub fn new(image: &ProgramImage, config: VMConfig) -> Result<Self> {
        let instructions = decode_image(image)?;
        let length = instructions.len();
        for instr in &instructions {
            if let Operation::Jmp {
                target: Target::Address(address),
                ..
            } = instr.operation
            {
                if address as usize >= length {
                    return Err(RuntimeError::JumpOutOfRange {
                        target: address as u32,
                        length,
                    });
                }
            }
        }

        debug!(
            program = %image.name,
            instructions = length,
            mode = %image.mode,
            "loaded program"
        );

        Ok(Self {
            state: PioState::new(),
            instructions,
            wrap_target: image.wrap_target,
            wrap: image.wrap,
            config,
            symbols: Vec::new(),
        })
    }

    /// Push a word into the TX FIFO
    pub fn push(&mut self, word: u32) {
        self.state.tx_fifo.push_back(word);
    }

    pub fn push_all(&mut self, words: impl IntoIterator<Item = u32>) {
        self.state.tx_fifo.extend(words);
    }

    pub fn state(&self) -> &PioState {
        &self.state
    }

    /// Execute one instruction
    pub fn step(&mut self) -> Result<()> {
        let pc = self.state.pc;
        let instr = self
            .instructions
            .get(pc as usize)
            .ok_or_else(|| RuntimeError::JumpOutOfRange {
                target: pc as u32,
                length: self.instructions.len(),
            })?
            .clone();

        if self.config.trace {
            trace!(cycle = self.state.cycle, pc, "{}", instr);
        }

        match execute(&instr, &mut self.state)? {
            Outcome::Stalled => {
                self.state.halt(HaltReason::FifoEmpty);
            }
            Outcome::Done { jumped } => {
                if let Operation::Out {
                    destination: OutDestination::X,
                    ..
                } = instr.operation
                {
                    self.symbols.push(SymbolStart {
                        cycle: self.state.cycle,
                        symbol: Symbol::from_bit(self.state.x & 1 == 1),
                    });
                }
                if jumped {
                    if self.state.pc as usize >= self.instructions.len() {
                        return Err(RuntimeError::JumpOutOfRange {
                            target: self.state.pc as u32,
                            length: self.instructions.len(),
                        });
                    }
                } else if pc == self.wrap {
                    self.state.pc = self.wrap_target;
                } else {
                    self.state.pc = pc + 1;
                }
                self.state.cycle += instr.cycles() as u64;
            }
        }
        Ok(())
    }

    /// Run until the FIFO runs dry or the cycle limit is reached
    pub fn run(mut self) -> Result<ExecutionResult> {
        while !self.state.is_halted() {
            if self.state.cycle >= self.config.max_cycles {
                self.state.halt(HaltReason::CycleLimit);
                break;
            }
            self.step()?;
        }

        let halt_reason = self.state.halt_reason.unwrap_or(HaltReason::CycleLimit);
        debug!(
            cycles = self.state.cycle,
            symbols = self.symbols.len(),
            edges = self.state.edges.len(),
            reason = ?halt_reason,
            "state machine halted"
        );

        Ok(ExecutionResult {
            cycles: self.state.cycle,
            halt_reason,
            edges: self.state.edges,
            symbols: self.symbols,
        })
    }
}
