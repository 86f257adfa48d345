//! Reference data the tag transmits
//!
//! The tag sends a stream of compressible 16-bit samples: Gaussian-shaped
//! values drawn with Box-Muller from a 32-bit LCG. Every packet starts with
//! the byte offset of its first sample in the stream, which is how the
//! receiver side finds the bytes a packet should have carried.

/// Seed the generator starts from (and returns to when the index wraps)
pub const INITIAL_SEED: u32 = 0xABCD;

const LCG_MULTIPLIER: u32 = 1_664_525;
const LCG_INCREMENT: u32 = 1_013_904_223;

const SAMPLE_SCALE: f64 = 0x7FF as f64;
const SAMPLE_OFFSET: f64 = 0x1FFF as f64;
const SAMPLE_MAX: f64 = 0x3F_FFFF as f64;

/// Largest stream index before it wraps to zero
pub const MAX_INDEX: u32 = 0xFFFF;

/// Samples between two index wraps
pub const PERIOD_SAMPLES: usize = (MAX_INDEX as usize + 1) / 2;

/// Advance the LCG
#[inline]
pub fn next_seed(seed: u32) -> u32 {
    seed.wrapping_mul(LCG_MULTIPLIER).wrapping_add(LCG_INCREMENT)
}

/// Draw one sample, returning it with the updated seed
pub fn sample(mut seed: u32) -> (u16, u32) {
    let (mut u1, mut u2) = (0.0f64, 0.0f64);
    while u1 == 0.0 || u2 == 0.0 {
        seed = next_seed(seed);
        u1 = seed as f64 / u32::MAX as f64;
        seed = next_seed(seed);
        u2 = seed as f64 / u32::MAX as f64;
    }
    let radius = SAMPLE_SCALE * (-2.0 * u1.ln()).sqrt();
    let value = (radius * (2.0 * std::f64::consts::PI * u2).cos() + SAMPLE_OFFSET)
        .clamp(0.0, SAMPLE_MAX)
        .trunc();
    (value as u16, seed)
}

/// Endless sample stream as the tag produces it
#[derive(Debug, Clone)]
pub struct SampleStream {
    seed: u32,
    index: u32,
}

impl SampleStream {
    pub fn new() -> Self {
        Self {
            seed: INITIAL_SEED,
            index: 0,
        }
    }
}

impl Default for SampleStream {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for SampleStream {
    type Item = u16;

    fn next(&mut self) -> Option<u16> {
        if self.index > MAX_INDEX {
            self.index = 0;
            self.seed = INITIAL_SEED;
        }
        self.index += 2;
        let (value, seed) = sample(self.seed);
        self.seed = seed;
        Some(value)
    }
}

/// One period of the transmitted stream, as bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceData {
    bytes: Vec<u8>,
}

impl ReferenceData {
    pub fn generate() -> Self {
        let bytes = SampleStream::new()
            .take(PERIOD_SAMPLES)
            .flat_map(u16::to_be_bytes)
            .collect();
        Self { bytes }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// `len` bytes starting at byte `offset`, wrapping with the stream
    pub fn packet(&self, offset: usize, len: usize) -> Vec<u8> {
        if self.bytes.is_empty() {
            return Vec::new();
        }
        (offset..offset + len)
            .map(|i| self.bytes[i % self.bytes.len()])
            .collect()
    }
}
