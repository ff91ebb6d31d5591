//! Prefetch Hint Primitives.
//!
//! Each prefetch technique is a zero-sized type implementing [`PrefetchHint`].
//! The scan loop is generic over the hint, so every technique gets its own
//! monomorphized loop with the hint inlined and no indirect call per stride.
//!
//! The compiler-builtin style hints map onto whatever the target offers:
//! `prefetcht0`/`prefetchnta` on x86, `prfm pldl1keep`/`prfm pldl1strm` on
//! AArch64, and nothing on other targets.

/// A prefetch primitive issued ahead of the read cursor.
pub trait PrefetchHint {
    /// Label used when reporting failures of a pass using this hint.
    const LABEL: &'static str;

    /// Requests that the cache line holding `addr` be loaded.
    ///
    /// Must never fault, whatever `addr` points to.
    fn prefetch(addr: *const u8);
}

/// The no-prefetch control: issues nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPrefetch;

impl PrefetchHint for NoPrefetch {
    const LABEL: &'static str = "no prefetch";

    #[inline(always)]
    fn prefetch(_addr: *const u8) {}
}

/// Generic read hint, highest temporal locality.
#[derive(Debug, Clone, Copy, Default)]
pub struct Builtin;

impl PrefetchHint for Builtin {
    const LABEL: &'static str = "builtin_prefetch";

    #[inline(always)]
    fn prefetch(addr: *const u8) {
        read_keep(addr);
    }
}

/// Generic read hint with locality 0 (no temporal reuse expected).
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinLocality0;

impl PrefetchHint for BuiltinLocality0 {
    const LABEL: &'static str = "builtin_prefetch locality 0";

    #[inline(always)]
    fn prefetch(addr: *const u8) {
        read_stream(addr);
    }
}

/// Generic read hint with locality 3 (keep in all cache levels).
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinLocality3;

impl PrefetchHint for BuiltinLocality3 {
    const LABEL: &'static str = "builtin_prefetch locality 3";

    #[inline(always)]
    fn prefetch(addr: *const u8) {
        read_keep(addr);
    }
}

#[cfg(target_arch = "x86_64")]
use core::arch::x86_64 as x86;

#[cfg(target_arch = "x86")]
use core::arch::x86;

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
macro_rules! x86_hint {
    ($name:ident, $label:literal, $strategy:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl PrefetchHint for $name {
            const LABEL: &'static str = $label;

            #[inline(always)]
            fn prefetch(addr: *const u8) {
                // SAFETY: prefetch instructions never fault; SSE availability is
                // checked through the method table before this type is selected.
                unsafe { x86::_mm_prefetch::<{ x86::$strategy }>(addr.cast::<i8>()) }
            }
        }
    };
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
x86_hint!(
    X86Prefetcht0,
    "x86 prefetcht0",
    _MM_HINT_T0,
    "x86 `prefetcht0`: fetch into all cache levels."
);
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
x86_hint!(
    X86Prefetcht1,
    "x86 prefetcht1",
    _MM_HINT_T1,
    "x86 `prefetcht1`: fetch into L2 and higher."
);
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
x86_hint!(
    X86Prefetcht2,
    "x86 prefetcht2",
    _MM_HINT_T2,
    "x86 `prefetcht2`: fetch into L3 and higher."
);
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
x86_hint!(
    X86Prefetchnta,
    "x86 prefetchnta",
    _MM_HINT_NTA,
    "x86 `prefetchnta`: non-temporal fetch minimising cache pollution."
);

#[cfg(target_arch = "aarch64")]
macro_rules! aarch64_hint {
    ($name:ident, $label:literal, $op:literal, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl PrefetchHint for $name {
            const LABEL: &'static str = $label;

            #[inline(always)]
            fn prefetch(addr: *const u8) {
                // SAFETY: PRFM is a hint; it never faults or changes architectural state.
                unsafe {
                    core::arch::asm!(
                        concat!("prfm ", $op, ", [{0}]"),
                        in(reg) addr,
                        options(nostack, preserves_flags, readonly)
                    );
                }
            }
        }
    };
}

#[cfg(target_arch = "aarch64")]
aarch64_hint!(
    Aarch64PldL1Keep,
    "arm64 prfm pldl1keep",
    "pldl1keep",
    "AArch64 `prfm pldl1keep`: load hint into L1, retained."
);
#[cfg(target_arch = "aarch64")]
aarch64_hint!(
    Aarch64PldL2Keep,
    "arm64 prfm pldl2keep",
    "pldl2keep",
    "AArch64 `prfm pldl2keep`: load hint into L2, retained."
);
#[cfg(target_arch = "aarch64")]
aarch64_hint!(
    Aarch64PldL3Keep,
    "arm64 prfm pldl3keep",
    "pldl3keep",
    "AArch64 `prfm pldl3keep`: load hint into L3, retained."
);
#[cfg(target_arch = "aarch64")]
aarch64_hint!(
    Aarch64PldL1Strm,
    "arm64 prfm pldl1strm",
    "pldl1strm",
    "AArch64 `prfm pldl1strm`: streaming load hint into L1."
);

#[inline(always)]
fn read_keep(addr: *const u8) {
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    X86Prefetcht0::prefetch(addr);
    #[cfg(target_arch = "aarch64")]
    Aarch64PldL1Keep::prefetch(addr);
    #[cfg(not(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64")))]
    let _ = std::hint::black_box(addr);
}

#[inline(always)]
fn read_stream(addr: *const u8) {
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    X86Prefetchnta::prefetch(addr);
    #[cfg(target_arch = "aarch64")]
    Aarch64PldL1Strm::prefetch(addr);
    #[cfg(not(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64")))]
    let _ = std::hint::black_box(addr);
}
