//! Statistics errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("Line {line}: expected `time | frame | rssi`")]
    MalformedLine { line: usize },

    #[error("Line {line}: invalid timestamp {text:?}")]
    InvalidTimestamp { line: usize, text: String },

    #[error("Line {line}: invalid frame byte {text:?}")]
    InvalidFrameByte { line: usize, text: String },

    #[error("Line {line}: frame too short ({length} bytes)")]
    FrameTooShort { line: usize, length: usize },

    #[error("Line {line}: invalid RSSI {text:?}")]
    InvalidRssi { line: usize, text: String },

    #[error("Line {line}: packet overflow reported by the receiver")]
    PacketOverflow { line: usize },

    #[error("Packet length must be a positive even number of bytes, got {0}")]
    InvalidPacketLength(usize),

    #[error("Sequence count overflows after {epochs} wraps of a {max_seq} counter")]
    SequenceOverflow { max_seq: u32, epochs: u32 },

    #[error("No frames to evaluate")]
    NoFrames,

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StatsError>;
