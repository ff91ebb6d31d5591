//! # Pattern Tests
//!
//! The pattern must be identical for every run so the checksum of a buffer
//! depends on its length only.

use prefbench_core::memory::{PatternGenerator, fill_pattern};
use proptest::prelude::*;

#[test]
fn test_generator_is_deterministic() {
    let a: Vec<u64> = PatternGenerator::default().take(64).collect();
    let b: Vec<u64> = PatternGenerator::default().take(64).collect();
    assert_eq!(a, b);
}

#[test]
fn test_words_are_not_constant() {
    let words: Vec<u64> = PatternGenerator::default().take(16).collect();
    assert!(words.windows(2).any(|w| w[0] != w[1]));
}

#[test]
fn test_seed_changes_pattern() {
    let a = PatternGenerator::default().next_word();
    let b = PatternGenerator::new(1).next_word();
    assert_ne!(a, b);
}

proptest! {
    #[test]
    fn test_fill_is_reproducible(len in 0usize..4096) {
        let mut first = vec![0u64; len];
        let mut second = vec![u64::MAX; len];
        let a = fill_pattern(&mut first);
        let b = fill_pattern(&mut second);
        prop_assert_eq!(a, b);
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(a, first.iter().fold(0u64, |acc, w| acc.wrapping_add(*w)));
    }

    #[test]
    fn test_shorter_fill_is_a_prefix(short in 0usize..512, extra in 0usize..512) {
        let mut small = vec![0u64; short];
        let mut large = vec![0u64; short + extra];
        let _ = fill_pattern(&mut small);
        let _ = fill_pattern(&mut large);
        prop_assert_eq!(&small[..], &large[..short]);
    }
}
