//! Benchmark Loop.
//!
//! Times one sequential scan of the pattern buffer per prefetch distance. It provides:
//! 1. **Settle Pass:** An untimed-in-effect traversal that walks both cursors without touching data.
//! 2. **Timed Pass:** The measured traversal, issuing the hint ahead of every 8-word read.
//! 3. **Verification:** Optional checksum of every word read, compared with the fill checksum.
//! 4. **Dispatch:** Selection of the monomorphized loop for a configured method.
//!
//! Both traversals are preceded by a data cache flush so every read is served
//! from memory. The settle pass duration is subtracted from the timed pass to
//! cancel loop, branch and translation overheads common to both.

use std::hint::black_box;
use std::ptr;

use crate::bench::stats::OffsetTable;
use crate::common::constants::{STRIDE_BYTES, STRIDE_WORDS};
use crate::common::error::VerifyError;
use crate::memory::PatternBuffer;
use crate::method::MethodKind;
use crate::platform::{self, NoPrefetch, PrefetchHint, flush_data_cache, prefetch};

/// Raw timings of one benchmarked distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassTiming {
    /// Duration of the settle pass in seconds.
    pub settle: f64,
    /// Duration of the timed pass in seconds.
    pub timed: f64,
    /// Sum of the words read, when verification was enabled.
    pub checksum: Option<u64>,
    /// Label of the hint the timed pass issued.
    pub label: &'static str,
}

impl PassTiming {
    /// Timed duration minus the settle duration, clamped at zero.
    ///
    /// A preempted settle pass can outlast the timed pass; such a sample then
    /// contributes bytes but no time instead of a negative duration.
    pub const fn compensated(&self) -> f64 {
        (self.timed - self.settle).max(0.0)
    }
}

/// Reads one stride of words.
///
/// # Safety
///
/// `ptr` must be valid for reads of [`STRIDE_WORDS`] words.
#[inline(always)]
unsafe fn read_stride(ptr: *const u64) -> [u64; STRIDE_WORDS] {
    let mut words = [0u64; STRIDE_WORDS];
    for (k, word) in words.iter_mut().enumerate() {
        // SAFETY: guaranteed by the caller; volatile keeps every read in the
        // timed section and in program order even though most are discarded.
        *word = unsafe { ptr::read_volatile(ptr.add(k)) };
    }
    words
}

/// Flushes the buffer, then runs the settle and timed passes for one distance.
///
/// The hint is issued on `cursor + offset` bytes before each stride is read.
/// The prefetch address may point into the guard region, never past it.
pub fn scan<H: PrefetchHint>(buffer: &PatternBuffer, offset: usize, verify: bool) -> PassTiming {
    let base = buffer.as_ptr();
    let len = buffer.len();
    let end = base.wrapping_add(len / size_of::<u64>());

    flush_data_cache(base.cast::<u8>(), len);

    let mut cursor = base;
    let mut ahead = base.cast::<u8>().wrapping_add(offset);
    let t1 = platform::now();
    while cursor < end {
        cursor = cursor.wrapping_add(STRIDE_WORDS);
        ahead = ahead.wrapping_add(STRIDE_BYTES);
        platform::memory_fence();
    }
    let t2 = platform::now();
    let _ = black_box((cursor, ahead));

    flush_data_cache(base.cast::<u8>(), len);

    let mut cursor = base;
    let mut ahead = base.cast::<u8>().wrapping_add(offset);
    let t3 = platform::now();
    let checksum = if verify {
        let mut sum = 0u64;
        while cursor < end {
            H::prefetch(ahead);
            // SAFETY: `len` is a whole number of strides, so a cursor below
            // `end` has a full stride of initialized pattern words ahead of it.
            let words = unsafe { read_stride(cursor) };
            ahead = ahead.wrapping_add(STRIDE_BYTES);
            sum = words.iter().fold(sum, |acc, w| acc.wrapping_add(*w));
            cursor = cursor.wrapping_add(STRIDE_WORDS);
        }
        Some(sum)
    } else {
        while cursor < end {
            H::prefetch(ahead);
            // SAFETY: as above.
            let _ = black_box(unsafe { read_stride(cursor) });
            ahead = ahead.wrapping_add(STRIDE_BYTES);
            cursor = cursor.wrapping_add(STRIDE_WORDS);
        }
        None
    };
    let _ = black_box(ahead);
    let t4 = platform::now();

    PassTiming {
        settle: t2 - t1,
        timed: t4 - t3,
        checksum,
        label: H::LABEL,
    }
}

/// Compares a read-pass checksum with the reference.
///
/// # Errors
///
/// Returns [`VerifyError::ChecksumMismatch`] when they differ.
pub fn check_checksum(label: &'static str, got: u64, expected: u64) -> Result<(), VerifyError> {
    if got == expected {
        Ok(())
    } else {
        Err(VerifyError::ChecksumMismatch {
            method: label,
            got,
            expected,
        })
    }
}

/// Benchmarks the distance at `index` with hint `H` and records the result.
///
/// The zero distance always runs the no-prefetch loop, whatever `H` is. The
/// entry is updated even when verification fails.
///
/// # Errors
///
/// Returns [`VerifyError::ChecksumMismatch`] when verification is enabled and
/// the words read do not sum to the buffer checksum.
pub fn benchmark_offset_with<H: PrefetchHint>(
    buffer: &PatternBuffer,
    table: &mut OffsetTable,
    index: usize,
    verify: bool,
) -> Result<(), VerifyError> {
    let Some(offset) = table.get(index).map(|e| e.offset) else {
        return Ok(());
    };

    let timing = if offset == 0 {
        scan::<NoPrefetch>(buffer, 0, verify)
    } else {
        scan::<H>(buffer, offset, verify)
    };

    table.record(index, buffer.len(), timing.compensated());

    match timing.checksum {
        Some(sum) => check_checksum(timing.label, sum, buffer.checksum()),
        None => Ok(()),
    }
}

/// Benchmarks the distance at `index` with the hint selected by `kind`.
///
/// # Errors
///
/// See [`benchmark_offset_with`].
pub fn benchmark_offset(
    buffer: &PatternBuffer,
    table: &mut OffsetTable,
    index: usize,
    kind: MethodKind,
    verify: bool,
) -> Result<(), VerifyError> {
    match kind {
        MethodKind::Builtin => {
            benchmark_offset_with::<prefetch::Builtin>(buffer, table, index, verify)
        }
        MethodKind::BuiltinLocality0 => {
            benchmark_offset_with::<prefetch::BuiltinLocality0>(buffer, table, index, verify)
        }
        MethodKind::BuiltinLocality3 => {
            benchmark_offset_with::<prefetch::BuiltinLocality3>(buffer, table, index, verify)
        }
        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        MethodKind::X86Prefetcht0 => {
            benchmark_offset_with::<prefetch::X86Prefetcht0>(buffer, table, index, verify)
        }
        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        MethodKind::X86Prefetcht1 => {
            benchmark_offset_with::<prefetch::X86Prefetcht1>(buffer, table, index, verify)
        }
        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        MethodKind::X86Prefetcht2 => {
            benchmark_offset_with::<prefetch::X86Prefetcht2>(buffer, table, index, verify)
        }
        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        MethodKind::X86Prefetchnta => {
            benchmark_offset_with::<prefetch::X86Prefetchnta>(buffer, table, index, verify)
        }
        #[cfg(target_arch = "aarch64")]
        MethodKind::Aarch64PldL1Keep => {
            benchmark_offset_with::<prefetch::Aarch64PldL1Keep>(buffer, table, index, verify)
        }
        #[cfg(target_arch = "aarch64")]
        MethodKind::Aarch64PldL2Keep => {
            benchmark_offset_with::<prefetch::Aarch64PldL2Keep>(buffer, table, index, verify)
        }
        #[cfg(target_arch = "aarch64")]
        MethodKind::Aarch64PldL3Keep => {
            benchmark_offset_with::<prefetch::Aarch64PldL3Keep>(buffer, table, index, verify)
        }
        #[cfg(target_arch = "aarch64")]
        MethodKind::Aarch64PldL1Strm => {
            benchmark_offset_with::<prefetch::Aarch64PldL1Strm>(buffer, table, index, verify)
        }
    }
}

/// Runs one full pass: every distance in ascending order.
///
/// Stops at the first verification failure; entries benchmarked before it
/// keep their statistics.
///
/// # Errors
///
/// Returns the first [`VerifyError`] encountered.
pub fn run_pass(
    buffer: &PatternBuffer,
    table: &mut OffsetTable,
    kind: MethodKind,
    verify: bool,
) -> Result<(), VerifyError> {
    for index in 0..table.len() {
        benchmark_offset(buffer, table, index, kind, verify)?;
    }
    Ok(())
}
