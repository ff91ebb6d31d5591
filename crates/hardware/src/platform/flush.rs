//! Data cache flush.
//!
//! Evicts an address range from every data cache level so the next access to
//! it is served from memory. Targets without a user-space flush instruction
//! make this a no-op; the benchmark still runs, but successive passes then see
//! warm caches.

use crate::common::constants::CACHE_LINE_SIZE;

/// Writes back and invalidates every cache line of `[ptr, ptr + len)`.
///
/// Where the architecture exposes it, the instruction cache is invalidated for
/// the same range as well.
///
/// # Arguments
///
/// * `ptr` - Start of the range; need not be line aligned.
/// * `len` - Length of the range in bytes.
pub fn flush_data_cache(ptr: *const u8, len: usize) {
    if len == 0 {
        return;
    }
    let start = (ptr as usize) & !(CACHE_LINE_SIZE - 1);
    let end = (ptr as usize).saturating_add(len);
    flush_lines(start, end);
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
fn flush_lines(start: usize, end: usize) {
    #[cfg(target_arch = "x86")]
    use core::arch::x86::{_mm_clflush, _mm_mfence};
    #[cfg(target_arch = "x86_64")]
    use core::arch::x86_64::{_mm_clflush, _mm_mfence};

    let mut line = start;
    while line < end {
        // SAFETY: `line` lies within a mapping owned by the caller; CLFLUSH on
        // any mapped address is permitted at user level.
        unsafe { _mm_clflush(line as *const u8) };
        line += CACHE_LINE_SIZE;
    }
    // SAFETY: MFENCE has no preconditions.
    unsafe { _mm_mfence() };
}

#[cfg(target_arch = "aarch64")]
fn flush_lines(start: usize, end: usize) {
    use core::arch::asm;

    let mut line = start;
    while line < end {
        // SAFETY: DC CIVAC is enabled for EL0 by the kernel and only affects
        // cache state of a mapping owned by the caller.
        unsafe { asm!("dc civac, {0}", in(reg) line, options(nostack, preserves_flags)) };
        line += CACHE_LINE_SIZE;
    }
    // SAFETY: barriers and instruction cache maintenance have no memory-safety
    // preconditions; IC IVAU is likewise enabled for EL0.
    unsafe {
        asm!("dsb ish", options(nostack, preserves_flags));
        let mut line = start;
        while line < end {
            asm!("ic ivau, {0}", in(reg) line, options(nostack, preserves_flags));
            line += CACHE_LINE_SIZE;
        }
        asm!("dsb ish", "isb", options(nostack, preserves_flags));
    }
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64")))]
fn flush_lines(start: usize, end: usize) {
    let _ = std::hint::black_box((start, end));
}
