//! # Backscatter Link Statistics
//!
//! Bit error rate of a backscatter link, computed from the receiver's frame
//! log and the sample stream the tag is known to transmit.
//!
//! ```rust
//! use backscatter_stats::{compute_ber, parse_log, unwrap_sequence};
//!
//! let log = "10:00:00.000001 | 20 00 00 00 | -52\n10:00:00.000002 | packet overflow | 0\n";
//! let mut frames = parse_log(log);
//! unwrap_sequence(&mut frames, 256).unwrap();
//! let report = compute_ber(&frames, 2).unwrap();
//! assert_eq!(report.per_packet.len(), 1);
//! ```

pub mod ber;
pub mod error;
pub mod log;
pub mod reference;

pub use ber::{bit_errors, compute_ber, compute_ber_with, BerReport, PacketErrors};
pub use error::{Result, StatsError};
pub use log::{parse_line, parse_log, unwrap_sequence, Frame};
pub use reference::{ReferenceData, SampleStream};

/// Default payload bytes per packet
pub const DEFAULT_PACKET_LEN: usize = 32;

/// Default wrap of the tag's 8-bit sequence counter
pub const DEFAULT_MAX_SEQ: u32 = 256;
