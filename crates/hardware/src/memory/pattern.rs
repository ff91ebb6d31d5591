//! Reproducible data pattern.
//!
//! A 32-bit linear congruential generator whose successive outputs are packed
//! in pairs into 64-bit words (first output in the low half). The same seed
//! always yields the same words, so the checksum of a freshly filled buffer is
//! a function of its length alone.

use crate::common::constants::{PATTERN_INCREMENT, PATTERN_MULTIPLIER, PATTERN_SEED};

/// Word generator for the benchmark pattern.
#[derive(Debug, Clone)]
pub struct PatternGenerator {
    state: u32,
}

impl Default for PatternGenerator {
    fn default() -> Self {
        Self::new(PATTERN_SEED)
    }
}

impl PatternGenerator {
    /// Creates a generator starting from `seed`.
    pub const fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    #[inline(always)]
    const fn step(&mut self) -> u32 {
        self.state = PATTERN_MULTIPLIER
            .wrapping_mul(self.state)
            .wrapping_add(PATTERN_INCREMENT);
        self.state
    }

    /// Produces the next 64-bit pattern word.
    #[inline(always)]
    pub const fn next_word(&mut self) -> u64 {
        let low = self.step() as u64;
        let high = self.step() as u64;
        low | (high << 32)
    }
}

impl Iterator for PatternGenerator {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        Some(self.next_word())
    }
}

/// Fills `words` with the pattern from the fixed seed.
///
/// # Returns
///
/// The wrapping 64-bit sum of every word written, accumulated in the same pass.
pub fn fill_pattern(words: &mut [u64]) -> u64 {
    let mut generator = PatternGenerator::default();
    let mut checksum = 0u64;
    for word in words.iter_mut() {
        let value = generator.next_word();
        *word = value;
        checksum = checksum.wrapping_add(value);
    }
    checksum
}
