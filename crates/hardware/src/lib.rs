//! Cache prefetch micro-benchmark library.
//!
//! This crate measures how read bandwidth changes with the distance at which a
//! software prefetch hint is issued ahead of a sequential scan. It provides:
//! 1. **Topology:** Last-level cache discovery with a fixed fallback size.
//! 2. **Memory:** A page-backed, guard-padded buffer holding a reproducible pattern.
//! 3. **Methods:** A compile-time table of prefetch techniques and their availability.
//! 4. **Platform:** Prefetch hints, cache flushes, fences, and the clock.
//! 5. **Benchmark:** The per-offset scan, reduction, sanity check, and stressor entry point.
//! 6. **Configuration:** JSON and option-string configuration with validation.

/// Benchmark loop, reduction, host seams, and the stressor entry point.
pub mod bench;
/// Constants and error types.
pub mod common;
/// Configuration document, option parsing, and the settings store.
pub mod config;
/// Pattern buffer and pattern generator.
pub mod memory;
/// Prefetch method table.
pub mod method;
/// Architecture-specific primitives.
pub mod platform;
/// Cache topology probe.
pub mod topology;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::{Config, Settings};
/// Stressor entry point and its outcome.
pub use crate::bench::{RunOutcome, RunStatus, run_stressor};
/// Umbrella error type.
pub use crate::common::PrefetchError;
