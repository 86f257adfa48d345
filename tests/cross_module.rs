//! Cross-module tests
//!
//! Each crate's view of the same program has to agree: the generator's cycle
//! accounting, the assembler's encoding, the disassembler's decoding, the
//! simulator's timing and the statistics on what comes out the other end.

use backscatter_assembler::{assemble_program, encode};
use backscatter_codegen::{build_loops, generate};
use backscatter_disassembler::decode;
use backscatter_runtime::{transmit, Pin};
use backscatter_spec::{AntennaMode, PinLevel, Symbol, TimingConfig};
use backscatter_stats::{compute_ber, Frame, ReferenceData};
use proptest::prelude::*;

fn configs() -> Vec<TimingConfig> {
    vec![
        TimingConfig::default(),
        TimingConfig::default().with_mode(AntennaMode::Dual),
        TimingConfig::new(16, 18, 100_000, AntennaMode::Single).unwrap(),
        TimingConfig::new(40, 32, 250_000, AntennaMode::Dual).unwrap(),
        TimingConfig::new(64, 62, 50_000, AntennaMode::Single).unwrap(),
    ]
}

// ============================================================================
// Codegen <-> Assembler <-> Disassembler
// ============================================================================

#[test]
fn test_encoding_agrees_with_decoding() {
    for config in configs() {
        let generation = generate(&config);
        let resolved = generation.program.resolve().unwrap();
        for instr in &resolved {
            let word = encode(instr, config.mode).unwrap();
            assert_eq!(&decode(word, config.mode).unwrap(), instr);
        }
    }
}

#[test]
fn test_image_length_matches_program() {
    for config in configs() {
        let generation = generate(&config);
        let image = assemble_program(&generation.program).unwrap();
        assert_eq!(image.len(), generation.program.len());
        assert_eq!(image.mode, config.mode);
    }
}

// ============================================================================
// Codegen <-> Runtime
// ============================================================================

#[test]
fn test_loop_accounting_matches_simulation() {
    for config in configs() {
        let loops = build_loops(&config);
        let result = transmit(&config, &[false, true]).unwrap();
        let durations = result.symbol_durations();
        for (symbol, duration) in [Symbol::Zero, Symbol::One].into_iter().zip(&durations) {
            let lp = &loops[symbol.bit() as usize];
            assert_eq!(lp.symbol_cycles() as u64, *duration, "{} symbol {}", config, symbol);
        }
    }
}

#[test]
fn test_shift_frequency_matches_simulation() {
    for config in configs() {
        let result = transmit(&config, &[true, false]).unwrap();
        for ((start, end), symbol) in result.symbol_windows().into_iter().zip(result.transmitted()).take(2) {
            let rising: Vec<u64> = result
                .edges_of(Pin::Set)
                .filter(|e| e.level == PinLevel::High && e.cycle >= start && e.cycle < end)
                .map(|e| e.cycle)
                .collect();
            let span = rising.last().unwrap() - rising.first().unwrap();
            let periods = (rising.len() - 1) as f64;
            let khz = config.clock_mhz as f64 * 1000.0 * periods / span as f64;
            assert!((khz - config.shift_frequency_khz(symbol)).abs() < 1e-6);
        }
    }
}

// ============================================================================
// Runtime -> Stats
// ============================================================================

fn bytes_to_bits(bytes: &[u8]) -> Vec<bool> {
    bytes
        .iter()
        .flat_map(|byte| (0..8).rev().map(move |i| byte >> i & 1 == 1))
        .collect()
}

fn bits_to_bytes(symbols: &[Symbol]) -> Vec<u8> {
    symbols
        .chunks(8)
        .map(|chunk| chunk.iter().fold(0u8, |byte, s| byte << 1 | s.bit() as u8))
        .collect()
}

#[test]
fn test_simulated_link_has_no_bit_errors() {
    let reference = ReferenceData::generate();
    let packet_len = 8;
    let config = TimingConfig::default();

    let frames: Vec<Frame> = (0..3u32)
        .map(|seq| {
            let offset = seq as usize * packet_len;
            let mut payload = (offset as u16).to_be_bytes().to_vec();
            payload.extend(reference.packet(offset, packet_len));

            let result = transmit(&config, &bytes_to_bits(&payload)).unwrap();
            let symbols = result.transmitted();
            Frame {
                time: Default::default(),
                seq,
                payload: bits_to_bytes(&symbols[..payload.len() * 8]),
                rssi: -50,
            }
        })
        .collect();

    let report = compute_ber(&frames, packet_len).unwrap();
    assert_eq!(report.error_bits, 0);
    assert_eq!(report.total_bits, 3 * 64);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_generated_words_decode_to_program(
        d0 in 2u32..=24,
        d1 in 2u32..=24,
        baud in 20_000u32..=400_000,
        dual in any::<bool>(),
    ) {
        let mode = if dual { AntennaMode::Dual } else { AntennaMode::Single };
        let config = TimingConfig::new(d0 * 2, d1 * 2, baud, mode);
        prop_assume!(config.is_ok());
        let generation = generate(&config.unwrap());
        let image = assemble_program(&generation.program);
        prop_assume!(image.is_ok());

        let decoded: Vec<_> = image
            .unwrap()
            .words
            .iter()
            .map(|&w| decode(w, mode).unwrap())
            .collect();
        prop_assert_eq!(decoded, generation.program.resolve().unwrap());
    }
}
