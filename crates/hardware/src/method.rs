//! Prefetch Method Registry.
//!
//! A fixed, compile-time table of the prefetch techniques this build can
//! exercise. Each entry names a technique, tags the hint it dispatches to, and
//! carries an availability predicate plus whether its rate takes part in the
//! sanity check against the unprefetched baseline.
//!
//! Instruction forms the target cannot emit are compiled out of the table, so
//! a name that is valid on one architecture is simply unknown on another.

use crate::common::error::ConfigError;
use crate::platform::{self, PrefetchHint, prefetch};

/// Index of the default method (`builtin`).
pub const DEFAULT_METHOD: usize = 0;

/// Whether every method's rate is sanity-checked regardless of its flag.
///
/// On x86_64 a prefetching pass slower than the baseline is always reported.
pub const ALWAYS_RATE_CHECK: bool = cfg!(target_arch = "x86_64");

/// Discriminator selecting the hint issued by the scan loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodKind {
    /// Generic read hint.
    Builtin,
    /// Generic read hint, locality 0.
    BuiltinLocality0,
    /// Generic read hint, locality 3.
    BuiltinLocality3,
    /// x86 `prefetcht0`.
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    X86Prefetcht0,
    /// x86 `prefetcht1`.
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    X86Prefetcht1,
    /// x86 `prefetcht2`.
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    X86Prefetcht2,
    /// x86 `prefetchnta`.
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    X86Prefetchnta,
    /// AArch64 `prfm pldl1keep`.
    #[cfg(target_arch = "aarch64")]
    Aarch64PldL1Keep,
    /// AArch64 `prfm pldl2keep`.
    #[cfg(target_arch = "aarch64")]
    Aarch64PldL2Keep,
    /// AArch64 `prfm pldl3keep`.
    #[cfg(target_arch = "aarch64")]
    Aarch64PldL3Keep,
    /// AArch64 `prfm pldl1strm`.
    #[cfg(target_arch = "aarch64")]
    Aarch64PldL1Strm,
}

impl MethodKind {
    /// Returns the label reported in failure messages.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Builtin => prefetch::Builtin::LABEL,
            Self::BuiltinLocality0 => prefetch::BuiltinLocality0::LABEL,
            Self::BuiltinLocality3 => prefetch::BuiltinLocality3::LABEL,
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            Self::X86Prefetcht0 => prefetch::X86Prefetcht0::LABEL,
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            Self::X86Prefetcht1 => prefetch::X86Prefetcht1::LABEL,
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            Self::X86Prefetcht2 => prefetch::X86Prefetcht2::LABEL,
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            Self::X86Prefetchnta => prefetch::X86Prefetchnta::LABEL,
            #[cfg(target_arch = "aarch64")]
            Self::Aarch64PldL1Keep => prefetch::Aarch64PldL1Keep::LABEL,
            #[cfg(target_arch = "aarch64")]
            Self::Aarch64PldL2Keep => prefetch::Aarch64PldL2Keep::LABEL,
            #[cfg(target_arch = "aarch64")]
            Self::Aarch64PldL3Keep => prefetch::Aarch64PldL3Keep::LABEL,
            #[cfg(target_arch = "aarch64")]
            Self::Aarch64PldL1Strm => prefetch::Aarch64PldL1Strm::LABEL,
        }
    }
}

/// One entry of the method table.
#[derive(Debug, Clone, Copy)]
pub struct PrefetchMethod {
    /// Unique name used to select the method.
    pub name: &'static str,
    /// Hint the scan loop dispatches to.
    pub kind: MethodKind,
    /// Capability predicate for the running CPU.
    pub available: fn() -> bool,
    /// Whether a rate below the baseline fails a verified run.
    pub rate_checked: bool,
}

impl PrefetchMethod {
    /// Evaluates the capability predicate.
    pub fn is_available(&self) -> bool {
        (self.available)()
    }

    /// Whether this method's rate is sanity-checked on the running target.
    pub const fn checks_rate(&self) -> bool {
        self.rate_checked || ALWAYS_RATE_CHECK
    }
}

/// Every method this build supports, in selection order.
pub static METHODS: &[PrefetchMethod] = &[
    PrefetchMethod {
        name: "builtin",
        kind: MethodKind::Builtin,
        available: platform::always_available,
        rate_checked: false,
    },
    PrefetchMethod {
        name: "builtinl0",
        kind: MethodKind::BuiltinLocality0,
        available: platform::always_available,
        rate_checked: false,
    },
    PrefetchMethod {
        name: "builtinl3",
        kind: MethodKind::BuiltinLocality3,
        available: platform::always_available,
        rate_checked: false,
    },
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    PrefetchMethod {
        name: "prefetcht0",
        kind: MethodKind::X86Prefetcht0,
        available: platform::has_sse,
        rate_checked: true,
    },
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    PrefetchMethod {
        name: "prefetcht1",
        kind: MethodKind::X86Prefetcht1,
        available: platform::has_sse,
        rate_checked: true,
    },
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    PrefetchMethod {
        name: "prefetcht2",
        kind: MethodKind::X86Prefetcht2,
        available: platform::has_sse,
        rate_checked: true,
    },
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    PrefetchMethod {
        name: "prefetchnta",
        kind: MethodKind::X86Prefetchnta,
        available: platform::has_sse,
        rate_checked: true,
    },
    #[cfg(target_arch = "aarch64")]
    PrefetchMethod {
        name: "pldl1keep",
        kind: MethodKind::Aarch64PldL1Keep,
        available: platform::always_available,
        rate_checked: true,
    },
    #[cfg(target_arch = "aarch64")]
    PrefetchMethod {
        name: "pldl2keep",
        kind: MethodKind::Aarch64PldL2Keep,
        available: platform::always_available,
        rate_checked: true,
    },
    #[cfg(target_arch = "aarch64")]
    PrefetchMethod {
        name: "pldl3keep",
        kind: MethodKind::Aarch64PldL3Keep,
        available: platform::always_available,
        rate_checked: true,
    },
    #[cfg(target_arch = "aarch64")]
    PrefetchMethod {
        name: "pldl1strm",
        kind: MethodKind::Aarch64PldL1Strm,
        available: platform::always_available,
        rate_checked: true,
    },
];

/// Iterates over the names of every method, in table order.
pub fn method_names() -> impl Iterator<Item = &'static str> {
    METHODS.iter().map(|m| m.name)
}

/// Resolves a method name to its table index.
///
/// # Errors
///
/// Returns [`ConfigError::UnknownMethod`] listing every valid name.
pub fn method_by_name(name: &str) -> Result<usize, ConfigError> {
    METHODS
        .iter()
        .position(|m| m.name == name)
        .ok_or_else(|| ConfigError::UnknownMethod {
            name: name.to_owned(),
            available: method_names().collect::<Vec<_>>().join(" "),
        })
}

/// Returns the table entry at `index`.
///
/// # Errors
///
/// Returns [`ConfigError::MethodIndexOutOfRange`] past the end of the table.
pub fn method(index: usize) -> Result<&'static PrefetchMethod, ConfigError> {
    METHODS
        .get(index)
        .ok_or(ConfigError::MethodIndexOutOfRange(index))
}
