//! Pattern Buffer Implementation.
//!
//! This module owns the memory region the benchmark reads. It provides:
//! 1. **Mapping:** Anonymous private pages via `mmap`, pre-faulted where the OS allows it.
//! 2. **Guard Region:** Unwritten trailing bytes keeping every prefetch address in-bounds.
//! 3. **Pattern Fill:** A single generation pass that also produces the reference checksum.

use std::io;
use std::slice;

use super::pattern::fill_pattern;
use crate::common::constants::{GUARD_BYTES, STRIDE_BYTES};
use crate::common::error::ResourceError;

/// Page-backed region filled with the benchmark pattern.
///
/// The first [`len`](Self::len) bytes hold pattern words; the following
/// [`GUARD_BYTES`] stay zero. The benchmark never writes to the region after
/// [`build`](Self::build) returns, so the checksum holds for its whole lifetime
/// unless [`flip_bits`](Self::flip_bits) is used to simulate corruption.
#[derive(Debug)]
pub struct PatternBuffer {
    ptr: *mut u64,
    len: usize,
    mapped_len: usize,
    checksum: u64,
    is_mmap: bool,
}

// SAFETY: the buffer exclusively owns its mapping; moving it to another thread
// moves that ownership. It is not `Sync`.
unsafe impl Send for PatternBuffer {}

impl PatternBuffer {
    /// Maps and fills a buffer holding `size` bytes of pattern.
    ///
    /// `size` is rounded down to a whole number of scan strides (64 bytes),
    /// with a minimum of one stride.
    ///
    /// # Arguments
    ///
    /// * `size` - Requested pattern size in bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Allocation`] when the pages cannot be mapped.
    pub fn build(size: usize) -> Result<Self, ResourceError> {
        let len = (size / STRIDE_BYTES).max(1) * STRIDE_BYTES;
        let mapped_len = len
            .checked_add(GUARD_BYTES)
            .ok_or_else(|| ResourceError::Allocation {
                bytes: usize::MAX,
                source: io::Error::from(io::ErrorKind::OutOfMemory),
            })?;

        let (ptr, is_mmap) = Self::map(mapped_len)?;
        let mut buffer = Self {
            ptr,
            len,
            mapped_len,
            checksum: 0,
            is_mmap,
        };

        // SAFETY: the mapping is at least `len` bytes, page aligned, and
        // exclusively owned by `buffer`.
        let words = unsafe { slice::from_raw_parts_mut(buffer.ptr, len / size_of::<u64>()) };
        buffer.checksum = fill_pattern(words);
        Ok(buffer)
    }

    #[cfg(unix)]
    fn map(mapped_len: usize) -> Result<(*mut u64, bool), ResourceError> {
        use std::ptr;

        #[cfg(any(target_os = "linux", target_os = "android"))]
        let flags = libc::MAP_PRIVATE | libc::MAP_ANONYMOUS | libc::MAP_POPULATE;
        #[cfg(not(any(target_os = "linux", target_os = "android")))]
        let flags = libc::MAP_PRIVATE | libc::MAP_ANONYMOUS;

        // SAFETY: anonymous mapping request with no address hint; the result is
        // checked against MAP_FAILED before use.
        let ptr = unsafe {
            libc::mmap(
                ptr::null_mut(),
                mapped_len,
                libc::PROT_READ | libc::PROT_WRITE,
                flags,
                -1,
                0,
            )
        };

        if ptr == libc::MAP_FAILED {
            return Err(ResourceError::Allocation {
                bytes: mapped_len,
                source: io::Error::last_os_error(),
            });
        }
        Ok((ptr.cast::<u64>(), true))
    }

    #[cfg(not(unix))]
    fn map(mapped_len: usize) -> Result<(*mut u64, bool), ResourceError> {
        let words = mapped_len / size_of::<u64>();
        let mut storage = Vec::new();
        storage
            .try_reserve_exact(words)
            .map_err(|_| ResourceError::Allocation {
                bytes: mapped_len,
                source: io::Error::from(io::ErrorKind::OutOfMemory),
            })?;
        storage.resize(words, 0u64);
        let ptr = Box::into_raw(storage.into_boxed_slice()).cast::<u64>();
        Ok((ptr, false))
    }

    /// Returns the pattern size in bytes (guard excluded).
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Always false: a buffer holds at least one stride of pattern.
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the total mapped size in bytes (guard included).
    pub const fn mapped_len(&self) -> usize {
        self.mapped_len
    }

    /// Returns the reference checksum computed while filling.
    pub const fn checksum(&self) -> u64 {
        self.checksum
    }

    /// Returns a pointer to the first pattern word.
    pub const fn as_ptr(&self) -> *const u64 {
        self.ptr
    }

    /// Returns the pattern words.
    pub fn words(&self) -> &[u64] {
        // SAFETY: the first `len` bytes were initialized by `build` and are
        // never written again while `self` is alive.
        unsafe { slice::from_raw_parts(self.ptr, self.len / size_of::<u64>()) }
    }

    /// XORs `mask` into pattern word `index` without updating the checksum.
    ///
    /// Simulates memory corruption for verification tests. Indices past the
    /// pattern are ignored.
    #[doc(hidden)]
    pub fn flip_bits(&mut self, index: usize, mask: u64) {
        if index < self.len / size_of::<u64>() {
            // SAFETY: `index` lies within the pattern words, which `self`
            // exclusively owns.
            unsafe { *self.ptr.add(index) ^= mask };
        }
    }

    /// Returns the guard bytes following the pattern.
    pub fn guard(&self) -> &[u8] {
        // SAFETY: the guard lies inside the mapping, directly after the pattern,
        // and is zero-initialized by the mapping itself.
        unsafe {
            slice::from_raw_parts(
                self.ptr.cast::<u8>().add(self.len),
                self.mapped_len - self.len,
            )
        }
    }
}

impl Drop for PatternBuffer {
    /// Releases the pages.
    fn drop(&mut self) {
        if self.is_mmap {
            #[cfg(unix)]
            // SAFETY: `ptr`/`mapped_len` describe exactly the mapping made in `map`.
            unsafe {
                let _ = libc::munmap(self.ptr.cast::<libc::c_void>(), self.mapped_len);
            }
        } else {
            #[cfg(not(unix))]
            // SAFETY: `ptr` came from `Box::into_raw` of a slice of this length.
            unsafe {
                let words = self.mapped_len / size_of::<u64>();
                drop(Box::from_raw(std::ptr::slice_from_raw_parts_mut(self.ptr, words)));
            }
        }
    }
}
