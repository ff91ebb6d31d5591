//! Global Benchmark Constants.
//!
//! This module defines the constants shared by every stage of the benchmark. It includes:
//! 1. **Size Units:** Binary byte multiples used for sizes and reported rates.
//! 2. **Geometry:** Cache line size, scan stride, and the number of probed offsets.
//! 3. **Limits:** Bounds for the last-level cache size override and the built-in default.
//! 4. **Pattern:** LCG parameters for the reproducible data pattern.

/// One kibibyte.
pub const KB: u64 = 1 << 10;

/// One mebibyte.
pub const MB: u64 = 1 << 20;

/// One gibibyte; reported rates are expressed in these per second.
pub const GB: u64 = 1 << 30;

/// One tebibyte.
pub const TB: u64 = 1 << 40;

/// Nanoseconds per second, as a float for rate arithmetic.
pub const NANOS_PER_SEC: f64 = 1_000_000_000.0;

/// Cache line size assumed for offsets and flushes (64 bytes).
pub const CACHE_LINE_SIZE: usize = 64;

/// Number of 64-bit words read per loop stride.
pub const STRIDE_WORDS: usize = 8;

/// Number of bytes covered by one loop stride.
pub const STRIDE_BYTES: usize = STRIDE_WORDS * size_of::<u64>();

/// Number of prefetch distances benchmarked per pass, one cache line apart.
pub const OFFSET_COUNT: usize = 128;

/// Extra mapped bytes past the data region so the furthest prefetch stays in-bounds.
pub const GUARD_BYTES: usize = OFFSET_COUNT * CACHE_LINE_SIZE;

/// Smallest accepted last-level cache size override (4 KiB).
pub const MIN_L3_SIZE: u64 = 4 * KB;

/// Largest accepted last-level cache size override.
///
/// Mirrors the address-space ceiling the stress framework uses for any
/// memory-sized option: 256 TiB on 64-bit targets, 4 GiB otherwise.
#[cfg(target_pointer_width = "64")]
pub const MAX_MEM_LIMIT: u64 = 1 << 48;

/// Largest accepted last-level cache size override.
#[cfg(not(target_pointer_width = "64"))]
pub const MAX_MEM_LIMIT: u64 = (1 << 32) - 1;

/// Data size used when the cache topology cannot be determined (4 MiB).
pub const DEFAULT_L3_SIZE: usize = 4 * MB as usize;

/// Initial state of the pattern generator.
pub const PATTERN_SEED: u32 = 123_456_789;

/// Multiplier of the pattern generator.
pub const PATTERN_MULTIPLIER: u32 = 16_843_009;

/// Increment of the pattern generator.
pub const PATTERN_INCREMENT: u32 = 826_366_247;

/// Name used as the prefix of every log line emitted by the stressor.
pub const STRESSOR_NAME: &str = "prefetch";
