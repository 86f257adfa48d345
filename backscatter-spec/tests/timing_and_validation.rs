//! Integration tests for timing arithmetic and configuration validation

use backscatter_spec::config::nearest_achievable_baud;
use backscatter_spec::{
    AntennaMode, ConfigError, ProgramImage, Symbol, TimingConfig, CLOCK_FREQ_MHZ,
    WASTED_CYCLES_PER_SYMBOL,
};
use proptest::prelude::*;

// ============================================================================
// Timing Arithmetic Tests
// ============================================================================

#[test]
fn test_reference_timing() {
    let config = TimingConfig::default();
    assert_eq!(config.clock_mhz, CLOCK_FREQ_MHZ);
    assert_eq!(config.cycles_per_symbol(), 1250);
    assert_eq!(config.usable_cycles(), 1246);

    assert_eq!(config.repetitions(Symbol::Zero), 61);
    assert_eq!(config.remainder(Symbol::Zero), 6);
    assert_eq!(config.repetitions(Symbol::One), 68);
    assert_eq!(config.remainder(Symbol::One), 4);
}

#[test]
fn test_nearest_baud() {
    let clock_hz = 125_000_000;
    assert_eq!(nearest_achievable_baud(clock_hz, 100_000), Some(100_000));
    // 1085.07 cycles per symbol rounds to 1085
    assert_eq!(nearest_achievable_baud(clock_hz, 115_200), Some(115_207));
    assert_eq!(nearest_achievable_baud(clock_hz, 0), None);
    assert_eq!(nearest_achievable_baud(clock_hz, u32::MAX), None);
}

#[test]
fn test_adjusted_baud_is_recorded() {
    let config = TimingConfig::new(20, 18, 115_200, AntennaMode::Single).unwrap();
    assert!(config.baud_adjusted());
    assert_eq!(config.requested_baud, 115_200);
    assert_eq!(config.baud_rate, 115_207);
    assert_eq!(config.cycles_per_symbol(), 1085);
}

// ============================================================================
// Validation Tests
// ============================================================================

#[test]
fn test_symbol_too_short() {
    // 20 cycles per symbol cannot hold 4 + 20
    assert_eq!(
        TimingConfig::new(20, 18, 6_250_000, AntennaMode::Single),
        Err(ConfigError::SymbolTooShort {
            cycles_per_symbol: 20,
            required: 24,
        })
    );
    assert!(TimingConfig::new(20, 18, 5_000_000, AntennaMode::Single).is_ok());
}

#[test]
fn test_divider_errors_name_the_symbol() {
    let err = TimingConfig::new(20, 19, 100_000, AntennaMode::Single).unwrap_err();
    assert_eq!(err, ConfigError::OddDivider { symbol: Symbol::One, value: 19 });
    assert!(err.to_string().contains("symbol 1"));

    let err = TimingConfig::new(0, 18, 100_000, AntennaMode::Single).unwrap_err();
    assert_eq!(err, ConfigError::DividerTooSmall { symbol: Symbol::Zero, value: 0 });
}

#[test]
fn test_image_rejects_inconsistent_wrap() {
    let image = ProgramImage::new("p", AntennaMode::Single, vec![0xE001, 0xE000]).with_wrap(1, 0);
    assert!(image.validate().is_err());
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #[test]
    fn prop_periods_fill_the_symbol(
        d0 in 1u32..=64,
        d1 in 1u32..=64,
        baud in 1_000u32..=2_000_000,
    ) {
        let config = TimingConfig::new(d0 * 2, d1 * 2, baud, AntennaMode::Single);
        prop_assume!(config.is_ok());
        let config = config.unwrap();

        for symbol in Symbol::ALL {
            let d = config.divider(symbol);
            let periods = config.repetitions(symbol) + 1;
            prop_assert_eq!(periods * d + config.remainder(symbol), config.usable_cycles());
            prop_assert!(config.remainder(symbol) < d);
        }
        prop_assert_eq!(
            config.usable_cycles() + WASTED_CYCLES_PER_SYMBOL,
            config.cycles_per_symbol()
        );
    }

    #[test]
    fn prop_substituted_baud_stays_close(baud in 1u32..=62_500_000) {
        let achieved = nearest_achievable_baud(125_000_000, baud).unwrap();
        let cycles = 125_000_000u64 / achieved as u64;
        prop_assert!(cycles >= 1);
        // rounding the substitute can cost one more cycle on top of the half
        let requested_cycles = 125_000_000f64 / baud as f64;
        prop_assert!((cycles as f64 - requested_cycles).abs() < 1.5);
    }
}
