//! Platform primitives used by the benchmark loop.
//!
//! This module isolates every architecture-specific operation. It provides:
//! 1. **Prefetch Hints:** Zero-sized hint types, one per prefetch technique.
//! 2. **Cache Flush:** Range eviction before each timed section.
//! 3. **Ordering:** A full memory fence for the settle pass.
//! 4. **Clock:** A monotonic, sub-microsecond wall clock.
//! 5. **Features:** Runtime CPU capability checks backing method availability.

use std::sync::OnceLock;
use std::sync::atomic::{Ordering, fence};
use std::time::Instant;

/// Data cache flush.
pub mod flush;

/// Prefetch hint types.
pub mod prefetch;

pub use flush::flush_data_cache;
pub use prefetch::{NoPrefetch, PrefetchHint};

/// Full hardware and compiler memory barrier.
#[inline(always)]
pub fn memory_fence() {
    fence(Ordering::SeqCst);
}

/// Seconds elapsed since the first call in this process.
///
/// Monotonic; only differences between two readings are meaningful.
pub fn now() -> f64 {
    static EPOCH: OnceLock<Instant> = OnceLock::new();
    EPOCH.get_or_init(Instant::now).elapsed().as_secs_f64()
}

/// Availability predicate for techniques every target supports.
pub const fn always_available() -> bool {
    true
}

/// Returns true when the CPU implements SSE (required by the x86 hint forms).
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub fn has_sse() -> bool {
    std::arch::is_x86_feature_detected!("sse")
}

/// Returns true when the CPU implements SSE (required by the x86 hint forms).
#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
pub const fn has_sse() -> bool {
    false
}
