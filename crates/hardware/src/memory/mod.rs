//! Benchmark memory: the pattern buffer and the generator that fills it.

/// Page-backed buffer with guard region and reference checksum.
pub mod buffer;

/// Deterministic LCG pattern.
pub mod pattern;

pub use buffer::PatternBuffer;
pub use pattern::{PatternGenerator, fill_pattern};
