//! Bit error rate over a receiver log

use crate::error::{Result, StatsError};
use crate::log::Frame;
use crate::reference::ReferenceData;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Bytes of stream index in front of every payload
pub const INDEX_BYTES: usize = 2;

/// Bit errors between a received payload and the bytes it should carry
///
/// Only the first `packet_len` received bytes are compared; a short payload
/// is compared over its own length.
pub fn bit_errors(received: &[u8], expected: &[u8], packet_len: usize) -> u32 {
    received
        .iter()
        .take(packet_len)
        .zip(expected)
        .map(|(got, want)| (got ^ want).count_ones())
        .sum()
}

/// Errors attributed to one sequence number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketErrors {
    pub seq: u32,
    pub bit_errors: u32,
    /// `false` when no frame carried this sequence number
    pub received: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BerReport {
    pub ber: f64,
    pub per_packet: Vec<PacketErrors>,
    pub total_bits: u64,
    pub error_bits: u64,
}

impl BerReport {
    pub fn packets_lost(&self) -> usize {
        self.per_packet.iter().filter(|p| !p.received).count()
    }

    pub fn packets_received(&self) -> usize {
        self.per_packet.len() - self.packets_lost()
    }
}

/// Bit error rate of `frames` against the reference stream
///
/// Every sequence number between the lowest and highest received one is
/// expected once. Duplicates keep their best copy; a missing packet counts
/// all of its `packet_len * 8` bits as errors. A stream index that cannot be
/// a packet start is taken to be corrupted and replaced by the previous
/// index plus one packet.
pub fn compute_ber(frames: &[Frame], packet_len: usize) -> Result<BerReport> {
    compute_ber_with(frames, packet_len, &ReferenceData::generate())
}

/// [`compute_ber`] against an already generated reference
pub fn compute_ber_with(
    frames: &[Frame],
    packet_len: usize,
    reference: &ReferenceData,
) -> Result<BerReport> {
    if packet_len == 0 || packet_len % 2 != 0 {
        return Err(StatsError::InvalidPacketLength(packet_len));
    }
    let first = frames.iter().map(|f| f.seq).min().ok_or(StatsError::NoFrames)?;
    let last = frames.iter().map(|f| f.seq).max().ok_or(StatsError::NoFrames)?;

    let mut best: Vec<Option<u32>> = vec![None; (last - first) as usize + 1];
    let mut last_offset = 0usize;
    for frame in frames {
        if frame.payload.len() < INDEX_BYTES {
            warn!(seq = frame.seq, "frame without stream index ignored");
            continue;
        }
        let mut offset = u16::from_be_bytes([frame.payload[0], frame.payload[1]]) as usize;
        if offset % packet_len != 0 {
            offset = last_offset + packet_len;
        }
        let expected = reference.packet(offset, packet_len);
        let errors = bit_errors(&frame.payload[INDEX_BYTES..], &expected, packet_len);

        let slot = &mut best[(frame.seq - first) as usize];
        *slot = Some(slot.map_or(errors, |previous| previous.min(errors)));
        last_offset = offset;
    }

    let lost_bits = (packet_len * 8) as u32;
    let per_packet: Vec<PacketErrors> = best
        .iter()
        .enumerate()
        .map(|(i, errors)| PacketErrors {
            seq: first + i as u32,
            bit_errors: errors.unwrap_or(lost_bits),
            received: errors.is_some(),
        })
        .collect();

    let error_bits: u64 = per_packet.iter().map(|p| p.bit_errors as u64).sum();
    let total_bits = per_packet.len() as u64 * packet_len as u64 * 8;
    let report = BerReport {
        ber: error_bits as f64 / total_bits as f64,
        per_packet,
        total_bits,
        error_bits,
    };

    info!(
        packets = report.per_packet.len(),
        lost = report.packets_lost(),
        error_bits = report.error_bits,
        ber = report.ber,
        "computed bit error rate"
    );
    Ok(report)
}
