//! # Program Image
//!
//! Assembled program as loaded into a PIO block: 16-bit instruction words,
//! the wrap bounds and the antenna mode needed to interpret the
//! delay/side-set field. Stored on disk with bincode.

use crate::config::AntennaMode;
use crate::error::BackscatterError;
use crate::{Address, INSTRUCTION_MEMORY_SIZE};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Magic number for image files: "BPIO" = 0x4250494F
pub const MAGIC: u32 = 0x4250_494F;

/// Image format version
pub const VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramImage {
    pub magic: u32,
    pub version: u32,
    /// Program name from `.program`
    pub name: String,
    pub mode: AntennaMode,
    /// Address execution wraps back to
    pub wrap_target: Address,
    /// Last address before wrapping
    pub wrap: Address,
    pub words: Vec<u16>,
}

impl ProgramImage {
    /// Image wrapping over the whole program
    pub fn new(name: impl Into<String>, mode: AntennaMode, words: Vec<u16>) -> Self {
        let wrap = words.len().saturating_sub(1) as Address;
        Self {
            magic: MAGIC,
            version: VERSION,
            name: name.into(),
            mode,
            wrap_target: 0,
            wrap,
            words,
        }
    }

    pub fn with_wrap(mut self, wrap_target: Address, wrap: Address) -> Self {
        self.wrap_target = wrap_target;
        self.wrap = wrap;
        self
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Check header fields, size and wrap bounds
    pub fn validate(&self) -> Result<(), BackscatterError> {
        if self.magic != MAGIC {
            return Err(BackscatterError::InvalidMagic(self.magic));
        }
        if self.version != VERSION {
            return Err(BackscatterError::UnsupportedVersion(self.version));
        }
        if self.words.is_empty() {
            return Err(BackscatterError::Other("program image is empty".to_string()));
        }
        if self.words.len() > INSTRUCTION_MEMORY_SIZE {
            return Err(BackscatterError::ProgramTooLarge {
                length: self.words.len(),
                capacity: INSTRUCTION_MEMORY_SIZE,
            });
        }
        let last = self.words.len() - 1;
        if self.wrap_target as usize > last
            || self.wrap as usize > last
            || self.wrap_target > self.wrap
        {
            return Err(BackscatterError::InvalidWrap {
                wrap_target: self.wrap_target,
                wrap: self.wrap,
                length: self.words.len(),
            });
        }
        Ok(())
    }

    /// Serialize to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, BackscatterError> {
        bincode::serialize(self).map_err(|e| BackscatterError::Serialization(e.to_string()))
    }

    /// Deserialize and validate
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BackscatterError> {
        let image: Self =
            bincode::deserialize(bytes).map_err(|e| BackscatterError::Serialization(e.to_string()))?;
        image.validate()?;
        Ok(image)
    }
}

impl fmt::Display for ProgramImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Program Image:")?;
        writeln!(f, "  Name:        {}", self.name)?;
        writeln!(f, "  Mode:        {}", self.mode)?;
        writeln!(f, "  Words:       {}", self.words.len())?;
        write!(f, "  Wrap:        {} -> {}", self.wrap, self.wrap_target)
    }
}
