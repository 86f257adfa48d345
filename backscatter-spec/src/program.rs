//! # Program Structure
//!
//! A PIO program as an ordered list of lines: labels, instructions with an
//! optional trailing comment, and free-standing comments. Labels name the
//! address of the next instruction; `resolve` replaces label targets with
//! addresses for encoding.

use crate::config::AntennaMode;
use crate::instruction::{Instruction, Operation, Target};
use crate::{Address, INSTRUCTION_MEMORY_SIZE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// One line of a program listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Line {
    Label(String),
    Instruction {
        instruction: Instruction,
        comment: Option<String>,
    },
    Comment(String),
    Blank,
}

/// Program errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProgramError {
    #[error("Undefined label: {0}")]
    UndefinedLabel(String),

    #[error("Duplicate label: {0}")]
    DuplicateLabel(String),

    #[error("Label {label} at instruction {index} is outside the addressable range")]
    AddressOutOfRange { label: String, index: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub name: String,
    pub mode: AntennaMode,
    pub lines: Vec<Line>,
}

impl Program {
    pub fn new(name: impl Into<String>, mode: AntennaMode) -> Self {
        Self {
            name: name.into(),
            mode,
            lines: Vec::new(),
        }
    }

    pub fn push_label(&mut self, name: impl Into<String>) {
        self.lines.push(Line::Label(name.into()));
    }

    pub fn push_instruction(&mut self, instruction: Instruction, comment: Option<String>) {
        self.lines.push(Line::Instruction {
            instruction,
            comment,
        });
    }

    pub fn push_comment(&mut self, text: impl Into<String>) {
        self.lines.push(Line::Comment(text.into()));
    }

    pub fn push_blank(&mut self) {
        self.lines.push(Line::Blank);
    }

    /// Instructions in program order
    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.lines.iter().filter_map(|line| match line {
            Line::Instruction { instruction, .. } => Some(instruction),
            _ => None,
        })
    }

    /// Number of instructions
    pub fn len(&self) -> usize {
        self.instructions().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the program fits into one PIO block
    pub fn fits_instruction_memory(&self) -> bool {
        self.len() <= INSTRUCTION_MEMORY_SIZE
    }

    /// Map each label to the address of the instruction that follows it
    pub fn labels(&self) -> Result<BTreeMap<String, Address>, ProgramError> {
        let mut labels = BTreeMap::new();
        let mut index = 0usize;

        for line in &self.lines {
            match line {
                Line::Label(name) => {
                    let address = Address::try_from(index).map_err(|_| ProgramError::AddressOutOfRange {
                        label: name.clone(),
                        index,
                    })?;
                    if labels.insert(name.clone(), address).is_some() {
                        return Err(ProgramError::DuplicateLabel(name.clone()));
                    }
                }
                Line::Instruction { .. } => index += 1,
                Line::Comment(_) | Line::Blank => {}
            }
        }

        Ok(labels)
    }

    /// Address of a label
    pub fn label_address(&self, name: &str) -> Result<Address, ProgramError> {
        self.labels()?
            .get(name)
            .copied()
            .ok_or_else(|| ProgramError::UndefinedLabel(name.to_string()))
    }

    /// Instructions with every label target replaced by its address
    pub fn resolve(&self) -> Result<Vec<Instruction>, ProgramError> {
        let labels = self.labels()?;

        self.instructions()
            .map(|instruction| {
                let mut resolved = instruction.clone();
                if let Operation::Jmp { target, .. } = &mut resolved.operation {
                    if let Target::Label(name) = target {
                        let address = labels
                            .get(name.as_str())
                            .copied()
                            .ok_or_else(|| ProgramError::UndefinedLabel(name.clone()))?;
                        *target = Target::Address(address);
                    }
                }
                Ok(resolved)
            })
            .collect()
    }
}
