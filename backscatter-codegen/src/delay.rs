//! Delay splitting
//!
//! An instruction can wait at most `2^bits` cycles (one cycle for itself
//! plus a delay field of `bits` bits). Longer waits are split across several
//! instructions.

/// Split `total` cycles into chunks of at most `2^bits`
///
/// Full chunks come first, the remainder (if any) last. The chunks sum to
/// `total`; `total == 0` gives no chunks.
pub fn split(total: u32, bits: u8) -> Vec<u32> {
    let chunk = 1u32 << bits;
    let mut chunks = vec![chunk; (total / chunk) as usize];
    if total % chunk != 0 {
        chunks.push(total % chunk);
    }
    chunks
}

/// Delay field values for an instruction sequence waiting `total` cycles
///
/// Every chunk loses one cycle to the instruction itself. The last chunk
/// additionally loses `subtract_from_last` cycles; a last chunk that would
/// reach zero is removed.
pub fn sleeptime(total: u32, subtract_from_last: u32, bits: u8) -> Vec<u32> {
    let mut chunks = split(total, bits);
    if let Some(last) = chunks.pop() {
        if last > subtract_from_last {
            chunks.push(last - subtract_from_last);
        }
    }
    chunks.into_iter().map(|chunk| chunk - 1).collect()
}

/// Number of instructions needed to wait `total` cycles
pub fn instruction_count(total: u32, bits: u8) -> usize {
    split(total, bits).len()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_bits() -> impl Strategy<Value = u8> {
        prop_oneof![Just(3u8), Just(5u8)]
    }

    proptest! {
        #[test]
        fn test_split_sums_to_total(total in 0u32..10_000, bits in arb_bits()) {
            let chunks = split(total, bits);
            prop_assert_eq!(chunks.iter().sum::<u32>(), total);
            prop_assert_eq!(chunks.is_empty(), total == 0);
            for chunk in &chunks {
                prop_assert!(*chunk >= 1 && *chunk <= 1 << bits);
            }
        }

        #[test]
        fn test_sleeptime_loses_one_cycle_per_chunk(total in 0u32..10_000, bits in arb_bits()) {
            let chunks = split(total, bits);
            let delays = sleeptime(total, 0, bits);
            prop_assert_eq!(delays.len(), chunks.len());
            prop_assert_eq!(
                delays.iter().sum::<u32>(),
                chunks.iter().sum::<u32>() - chunks.len() as u32
            );
        }

        #[test]
        fn test_sleeptime_subtract_one_cycle(total in 1u32..10_000, bits in arb_bits()) {
            let cycles: u32 = sleeptime(total, 1, bits).iter().map(|delay| delay + 1).sum();
            prop_assert_eq!(cycles, total - 1);
            for delay in sleeptime(total, 1, bits) {
                prop_assert!(delay < 1 << bits);
            }
        }
    }
}
