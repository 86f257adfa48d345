//! Receiver log parsing
//!
//! Each line holds one received frame:
//!
//! ```text
//! 14:02:31.518277 | 20 07 00 e0 1f c4 ... | -61 3
//! ```
//!
//! The frame is a list of hex bytes: byte 1 is the tag's sequence number,
//! everything from byte 2 on is payload. Only the first token of the RSSI
//! column is used.

use crate::error::{Result, StatsError};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Marker the receiver prints instead of a frame when its buffer overflowed
pub const PACKET_OVERFLOW: &str = "packet overflow";

/// Drop in the raw sequence number that counts as a counter wrap
pub const SEQUENCE_WRAP_THRESHOLD: u32 = 50;

/// One received frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub time: NaiveTime,
    /// Sequence number (raw until [`unwrap_sequence`] runs)
    pub seq: u32,
    pub payload: Vec<u8>,
    pub rssi: i32,
}

/// Parse one log line; `line` is only used in errors
pub fn parse_line(text: &str, line: usize) -> Result<Frame> {
    let columns: Vec<&str> = text.split('|').map(str::trim).collect();
    if columns.len() < 3 {
        return Err(StatsError::MalformedLine { line });
    }
    if columns[1].contains(PACKET_OVERFLOW) {
        return Err(StatsError::PacketOverflow { line });
    }

    let time = NaiveTime::parse_from_str(columns[0], "%H:%M:%S%.f").map_err(|_| {
        StatsError::InvalidTimestamp {
            line,
            text: columns[0].to_string(),
        }
    })?;

    let bytes = columns[1]
        .split_whitespace()
        .map(|byte| {
            u8::from_str_radix(byte, 16).map_err(|_| StatsError::InvalidFrameByte {
                line,
                text: byte.to_string(),
            })
        })
        .collect::<Result<Vec<u8>>>()?;
    if bytes.len() < 2 {
        return Err(StatsError::FrameTooShort {
            line,
            length: bytes.len(),
        });
    }

    let rssi_text = columns[2].split_whitespace().next().unwrap_or_default();
    let rssi = rssi_text.parse().map_err(|_| StatsError::InvalidRssi {
        line,
        text: rssi_text.to_string(),
    })?;

    Ok(Frame {
        time,
        seq: bytes[1] as u32,
        payload: bytes[2..].to_vec(),
        rssi,
    })
}

/// Parse a whole log, skipping overflow reports and unreadable lines
pub fn parse_log(text: &str) -> Vec<Frame> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(index, line)| match parse_line(line, index + 1) {
            Ok(frame) => Some(frame),
            Err(e) => {
                warn!("skipping receiver log line: {}", e);
                None
            }
        })
        .collect()
}

/// Turn wrapping raw sequence numbers into a monotonic count
///
/// The tag's counter wraps at `max_seq`. A raw value more than
/// [`SEQUENCE_WRAP_THRESHOLD`] below its predecessor starts a new epoch;
/// smaller drops are duplicates or reordering and stay in the current one.
/// Fails when the unwrapped count no longer fits in a `u32`.
pub fn unwrap_sequence(frames: &mut [Frame], max_seq: u32) -> Result<()> {
    let mut epoch = 0u32;
    let mut previous: Option<u32> = None;
    for frame in frames.iter_mut() {
        let raw = frame.seq;
        if let Some(previous) = previous {
            if (raw as i64) < previous as i64 - SEQUENCE_WRAP_THRESHOLD as i64 {
                epoch += 1;
            }
        }
        previous = Some(raw);
        frame.seq = max_seq
            .checked_mul(epoch)
            .and_then(|base| base.checked_add(raw))
            .ok_or(StatsError::SequenceOverflow {
                max_seq,
                epochs: epoch,
            })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINE: &str = "14:02:31.518277 | 20 07 00 e0 1f c4 | -61 3";

    fn frame(seq: u32) -> Frame {
        Frame {
            time: NaiveTime::default(),
            seq,
            payload: vec![],
            rssi: 0,
        }
    }

    #[test]
    fn test_parse_line() {
        let frame = parse_line(LINE, 1).unwrap();
        assert_eq!(frame.seq, 7);
        assert_eq!(frame.payload, vec![0x00, 0xE0, 0x1F, 0xC4]);
        assert_eq!(frame.rssi, -61);
        assert_eq!(
            frame.time,
            NaiveTime::from_hms_micro_opt(14, 2, 31, 518_277).unwrap()
        );
    }

    #[test]
    fn test_parse_line_errors() {
        assert!(matches!(
            parse_line("14:02:31.5 | packet overflow | 0", 4),
            Err(StatsError::PacketOverflow { line: 4 })
        ));
        assert!(matches!(
            parse_line("no separators here", 2),
            Err(StatsError::MalformedLine { line: 2 })
        ));
        assert!(matches!(
            parse_line("25:99:00.0 | 00 01 | -40", 1),
            Err(StatsError::InvalidTimestamp { .. })
        ));
        assert!(matches!(
            parse_line("10:00:00.0 | 00 zz | -40", 1),
            Err(StatsError::InvalidFrameByte { .. })
        ));
        assert!(matches!(
            parse_line("10:00:00.0 | 00 | -40", 1),
            Err(StatsError::FrameTooShort { length: 1, .. })
        ));
        assert!(matches!(
            parse_line("10:00:00.0 | 00 01 | strong", 1),
            Err(StatsError::InvalidRssi { .. })
        ));
    }

    #[test]
    fn test_parse_log_skips_bad_lines() {
        let log = format!(
            "{}\n14:02:31.6 | packet overflow | 0\n\ngarbage\n14:02:31.7 | 20 08 00 00 | -59\n",
            LINE
        );
        let frames = parse_log(&log);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].seq, 8);
    }

    #[test]
    fn test_unwrap_sequence() {
        let mut frames: Vec<Frame> = [250, 254, 255, 1, 2, 2, 0, 3].map(frame).to_vec();
        unwrap_sequence(&mut frames, 256).unwrap();
        let seqs: Vec<u32> = frames.iter().map(|f| f.seq).collect();
        assert_eq!(seqs, vec![250, 254, 255, 257, 258, 258, 256, 259]);
    }

    #[test]
    fn test_unwrap_small_drop_is_not_a_wrap() {
        let mut frames: Vec<Frame> = [100, 60, 101].map(frame).to_vec();
        unwrap_sequence(&mut frames, 256).unwrap();
        let seqs: Vec<u32> = frames.iter().map(|f| f.seq).collect();
        assert_eq!(seqs, vec![100, 60, 101]);
    }

    #[test]
    fn test_unwrap_overflowing_count() {
        let mut frames: Vec<Frame> = [200, 10].map(frame).to_vec();
        assert!(matches!(
            unwrap_sequence(&mut frames, u32::MAX),
            Err(StatsError::SequenceOverflow { max_seq: u32::MAX, epochs: 1 })
        ));

        let mut frames: Vec<Frame> = [200, 10].map(frame).to_vec();
        unwrap_sequence(&mut frames, u32::MAX - 10).unwrap();
        assert_eq!(frames[1].seq, u32::MAX);
    }
}
