//! Common types and constants shared by every benchmark stage.
//!
//! This module provides the fundamental building blocks of the crate. It includes:
//! 1. **Constants:** Size units, cache geometry, option limits, and pattern parameters.
//! 2. **Error Handling:** The configuration, resource, verification, and topology error types.

/// Benchmark-wide constants.
pub mod constants;

/// Error types for every failure class.
pub mod error;

pub use constants::{CACHE_LINE_SIZE, GB, GUARD_BYTES, KB, MB, OFFSET_COUNT, STRIDE_BYTES};
pub use error::{ConfigError, PrefetchError, ResourceError, TopologyError, VerifyError};
