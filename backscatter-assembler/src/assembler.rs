//! Main assembler logic

use crate::encoder::encode;
use crate::error::{AssemblerError, Result};
use crate::parser::{parse_line, Directive, Statement};
use backscatter_spec::{AntennaMode, Line, Program, ProgramImage, INSTRUCTION_MEMORY_SIZE, PROGRAM_NAME};
use tracing::debug;

/// Parsed source before encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assembly {
    pub program: Program,
    pub wrap_target: Option<u8>,
    pub wrap: Option<u8>,
}

/// Parse source text into a program, skipping `% c-sdk { ... %}` blocks
pub fn parse_source(source: &str) -> Result<Assembly> {
    let mut name: Option<String> = None;
    let mut mode = AntennaMode::Single;
    let mut lines = Vec::new();
    let mut wrap_target = None;
    let mut wrap = None;
    let mut block_start: Option<usize> = None;
    let mut instructions = 0usize;

    for (index, text) in source.lines().enumerate() {
        let line = index + 1;
        let trimmed = text.trim();

        if block_start.is_some() {
            if trimmed == "%}" {
                block_start = None;
            }
            continue;
        }
        if trimmed.starts_with('%') && trimmed.ends_with('{') {
            block_start = Some(line);
            continue;
        }

        for statement in parse_line(text, line)? {
            match statement {
                Statement::Directive(Directive::Program(program_name)) => {
                    if name.is_some() {
                        return Err(AssemblerError::InvalidDirective(format!(
                            "program {} (only one program per source)",
                            program_name
                        )));
                    }
                    name = Some(program_name);
                }
                Statement::Directive(Directive::SideSet { count, optional }) => {
                    if count != 1 || !optional {
                        return Err(AssemblerError::InvalidDirective(format!(
                            "side_set {}{} (only `.side_set 1 opt` is supported)",
                            count,
                            if optional { " opt" } else { "" }
                        )));
                    }
                    mode = AntennaMode::Dual;
                }
                Statement::Directive(Directive::WrapTarget) => {
                    wrap_target = Some(instructions as u8);
                }
                Statement::Directive(Directive::Wrap) => {
                    if instructions == 0 {
                        return Err(AssemblerError::InvalidDirective(
                            "wrap before any instruction".to_string(),
                        ));
                    }
                    wrap = Some((instructions - 1) as u8);
                }
                Statement::Label(label) => lines.push(Line::Label(label)),
                Statement::Instruction(instruction) => {
                    instructions += 1;
                    lines.push(Line::Instruction {
                        instruction,
                        comment: None,
                    });
                }
            }
        }
    }

    if let Some(line) = block_start {
        return Err(AssemblerError::UnterminatedBlock(line));
    }

    let mut program = Program::new(name.unwrap_or_else(|| PROGRAM_NAME.to_string()), mode);
    program.lines = lines;

    Ok(Assembly {
        program,
        wrap_target,
        wrap,
    })
}

/// Assemble source code into a program image
pub fn assemble(source: &str) -> Result<ProgramImage> {
    let assembly = parse_source(source)?;
    let image = assemble_program(&assembly.program)?;
    let wrap_target = assembly.wrap_target.unwrap_or(image.wrap_target);
    let wrap = assembly.wrap.unwrap_or(image.wrap);
    let image = image.with_wrap(wrap_target, wrap);
    image.validate()?;
    Ok(image)
}

/// Encode a program built in memory
pub fn assemble_program(program: &Program) -> Result<ProgramImage> {
    let length = program.len();
    if length > INSTRUCTION_MEMORY_SIZE {
        return Err(AssemblerError::ProgramTooLarge {
            length,
            capacity: INSTRUCTION_MEMORY_SIZE,
        });
    }

    let words = program
        .resolve()?
        .iter()
        .map(|instr| encode(instr, program.mode))
        .collect::<Result<Vec<u16>>>()?;

    debug!(name = %program.name, words = words.len(), "assembled program");

    let image = ProgramImage::new(program.name.clone(), program.mode, words);
    image.validate()?;
    Ok(image)
}
