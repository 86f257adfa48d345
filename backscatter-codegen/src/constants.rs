//! Firmware constants exported to the C build

use crate::diagnostics::Diagnostics;
use backscatter_spec::{Symbol, TimingConfig};
use serde::{Deserialize, Serialize};

/// Values the firmware needs to drive the state machine and tune the receiver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirmwareConstants {
    pub baud_rate: u32,
    /// Center of the two shift frequencies (Hz)
    pub center_offset_hz: u64,
    pub deviation_hz: u64,
    /// Occupied bandwidth the receiver filter must pass (Hz)
    pub min_rx_bandwidth_hz: u64,
    /// First word pushed into the TX FIFO
    pub loop_count0: u32,
    /// Second word pushed into the TX FIFO
    pub loop_count1: u32,
}

impl FirmwareConstants {
    pub fn new(config: &TimingConfig, diagnostics: &Diagnostics) -> Self {
        Self {
            baud_rate: config.baud_rate,
            center_offset_hz: khz_to_hz(diagnostics.center_khz),
            deviation_hz: khz_to_hz(diagnostics.deviation_khz),
            min_rx_bandwidth_hz: khz_to_hz(diagnostics.occupied_bandwidth_khz),
            loop_count0: config.repetitions(Symbol::Zero),
            loop_count1: config.repetitions(Symbol::One),
        }
    }

    /// Loop-count words in the order the init routine pushes them
    pub fn loop_counts(&self) -> [u32; 2] {
        [self.loop_count0, self.loop_count1]
    }

    /// `#define` lines for the c-sdk block
    pub fn to_defines(&self) -> Vec<String> {
        vec![
            format!("#define PIO_BAUDRATE {}", self.baud_rate),
            format!("#define PIO_CENTER_OFFSET {}", self.center_offset_hz),
            format!("#define PIO_DEVIATION {}", self.deviation_hz),
            format!("#define PIO_MIN_RX_BW {}", self.min_rx_bandwidth_hz),
        ]
    }
}

fn khz_to_hz(khz: f64) -> u64 {
    (khz * 1000.0).round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::diagnose;

    #[test]
    fn test_default_constants() {
        let config = TimingConfig::default();
        let constants = FirmwareConstants::new(&config, &diagnose(&config));
        assert_eq!(constants.baud_rate, 100_000);
        assert_eq!(constants.center_offset_hz, 6_597_222);
        assert_eq!(constants.deviation_hz, 347_222);
        assert_eq!(constants.min_rx_bandwidth_hz, 794_444);
        assert_eq!(constants.loop_counts(), [61, 68]);
    }

    #[test]
    fn test_defines() {
        let config = TimingConfig::default();
        let defines = FirmwareConstants::new(&config, &diagnose(&config)).to_defines();
        assert_eq!(
            defines,
            vec![
                "#define PIO_BAUDRATE 100000",
                "#define PIO_CENTER_OFFSET 6597222",
                "#define PIO_DEVIATION 347222",
                "#define PIO_MIN_RX_BW 794444",
            ]
        );
    }
}
