//! Simulated transmissions of generated programs

use backscatter_runtime::{transmit, ExecutionResult, HaltReason, Pin};
use backscatter_spec::{AntennaMode, PinLevel, Symbol, TimingConfig};
use proptest::prelude::*;

fn pattern(len: usize) -> Vec<bool> {
    (0..len).map(|i| (i * 7 + i / 3) % 2 == 1).collect()
}

/// Edge cycles of `pin` at `level` inside `[start, end)`
fn edges_in(result: &ExecutionResult, pin: Pin, level: PinLevel, start: u64, end: u64) -> Vec<u64> {
    result
        .edges_of(pin)
        .filter(|edge| edge.level == level && edge.cycle >= start && edge.cycle < end)
        .map(|edge| edge.cycle)
        .collect()
}

/// Every symbol toggles at its own divider and has the expected number of periods
fn check_frequencies(config: &TimingConfig, result: &ExecutionResult) {
    let windows = result.symbol_windows();
    for (&(start, end), symbol) in windows.iter().zip(result.transmitted()) {
        let divider = config.divider(symbol) as u64;
        for level in [PinLevel::High, PinLevel::Low] {
            let edges = edges_in(result, Pin::Set, level, start, end);
            assert!(
                edges.windows(2).all(|pair| pair[1] - pair[0] == divider),
                "symbol {} at {} does not toggle every {} cycles",
                symbol,
                start,
                divider
            );
        }

        let half = config.half_period(symbol);
        let extra = u64::from(config.remainder(symbol) > half);
        let falling = edges_in(result, Pin::Set, PinLevel::Low, start, end).len() as u64;
        assert_eq!(falling, config.repetitions(symbol) as u64 + 1 + extra);
    }
}

// ============================================================================
// Reference configuration
// ============================================================================

#[test]
fn test_reference_symbol_timing() {
    let config = TimingConfig::default();
    let bits = pattern(64);
    let result = transmit(&config, &bits).unwrap();

    assert_eq!(result.halt_reason, HaltReason::FifoEmpty);
    assert_eq!(result.symbol_durations(), vec![1250; 64]);
    let expected: Vec<Symbol> = bits.iter().map(|&b| Symbol::from_bit(b)).collect();
    assert_eq!(result.transmitted(), expected);
    // prologue plus 64 symbols
    assert_eq!(result.cycles, 3 + 64 * 1250);
    check_frequencies(&config, &result);
}

#[test]
fn test_reference_first_symbol_edges() {
    let result = transmit(&TimingConfig::default(), &[true]).unwrap();
    let first = result.symbols[0].cycle;
    assert_eq!(first, 3);

    // pin set high by the prologue, first falling edge after 9 high cycles
    let falling = edges_in(&result, Pin::Set, PinLevel::Low, first, first + 1250);
    assert_eq!(falling[0], first + 3 + 9);
    assert_eq!(falling.len(), 69);
}

#[test]
fn test_single_mode_leaves_side_pin_alone() {
    let result = transmit(&TimingConfig::default(), &pattern(8)).unwrap();
    assert_eq!(result.edges_of(Pin::Side).count(), 0);
}

#[test]
fn test_dual_mode_mirrors_pins() {
    let config = TimingConfig::default().with_mode(AntennaMode::Dual);
    let result = transmit(&config, &pattern(32)).unwrap();

    assert_eq!(result.symbol_durations(), vec![1250; 32]);
    check_frequencies(&config, &result);

    let set: Vec<(u64, PinLevel)> = result.edges_of(Pin::Set).map(|e| (e.cycle, e.level)).collect();
    let side: Vec<(u64, PinLevel)> = result.edges_of(Pin::Side).map(|e| (e.cycle, e.level)).collect();
    assert_eq!(set, side);
}

#[test]
fn test_drift_correction_goes_low() {
    // (b - w) % 16 = 14 > 8: the correction ends with a low pulse
    let config = TimingConfig::new(16, 18, 100_000, AntennaMode::Single).unwrap();
    assert_eq!(config.remainder(Symbol::Zero), 14);
    let result = transmit(&config, &[false; 4]).unwrap();
    assert_eq!(result.symbol_durations()[..4], [1250; 4]);
    check_frequencies(&config, &result);
}

#[test]
fn test_long_loop_count() {
    // 1 kbaud: 125000 cycles per symbol
    let config = TimingConfig::new(20, 18, 1_000, AntennaMode::Single).unwrap();
    let result = transmit(&config, &[true, false]).unwrap();
    assert_eq!(result.symbol_durations()[..2], [125_000, 125_000]);
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_every_symbol_lasts_one_symbol_period(
        d0 in 2u32..=32,
        d1 in 2u32..=32,
        baud in 50_000u32..=500_000,
        dual in any::<bool>(),
        bits in prop::collection::vec(any::<bool>(), 1..40),
    ) {
        let mode = if dual { AntennaMode::Dual } else { AntennaMode::Single };
        let config = TimingConfig::new(d0 * 2, d1 * 2, baud, mode);
        prop_assume!(config.is_ok());
        let config = config.unwrap();
        let result = transmit(&config, &bits);
        // programs that overflow instruction memory cannot be loaded
        prop_assume!(result.is_ok());
        let result = result.unwrap();

        let cycles = config.cycles_per_symbol() as u64;
        prop_assert_eq!(result.halt_reason, HaltReason::FifoEmpty);
        prop_assert!(result.symbol_durations().iter().all(|&d| d == cycles));
        for (sent, &bit) in result.transmitted().iter().zip(&bits) {
            prop_assert_eq!(*sent, Symbol::from_bit(bit));
        }
    }
}
