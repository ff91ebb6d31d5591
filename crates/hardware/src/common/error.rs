//! Error taxonomy for the prefetch benchmark.
//!
//! This module defines how failures are classified and reported. It provides:
//! 1. **Configuration Errors:** Rejected option values; fatal before a run starts.
//! 2. **Resource Errors:** Missing CPU support or memory; the run is skipped, not failed.
//! 3. **Verification Errors:** Data or rate integrity failures detected while benchmarking.
//! 4. **Topology Errors:** Cache discovery problems; always absorbed by the default fallback.

use std::io;

use thiserror::Error;

/// An option value was rejected while validating the configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The text could not be read as a byte count.
    #[error("invalid byte count '{0}'")]
    InvalidByteCount(String),

    /// The last-level cache size override lies outside the accepted range.
    #[error("prefetch-L3-size must be in range {min} to {max} bytes, got {value}")]
    L3SizeOutOfRange {
        /// The rejected value in bytes.
        value: u64,
        /// Smallest accepted value.
        min: u64,
        /// Largest accepted value.
        max: u64,
    },

    /// The prefetch method name is not in the method table.
    #[error("prefetch-method '{name}' is not known, prefetch-method must be one of: {available}")]
    UnknownMethod {
        /// The rejected name.
        name: String,
        /// Space separated list of every valid name.
        available: String,
    },

    /// A method index does not refer to an entry of the method table.
    #[error("prefetch-method index {0} is out of range")]
    MethodIndexOutOfRange(usize),

    /// A configuration document could not be parsed.
    #[error("malformed configuration: {0}")]
    Json(String),
}

/// The environment cannot run the stressor; the run is skipped.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The configured prefetch method cannot execute on this CPU.
    #[error("prefetch-method '{method}' is not available on this CPU")]
    MethodUnavailable {
        /// Name of the unavailable method.
        method: &'static str,
    },

    /// The pattern buffer could not be mapped.
    #[error("cannot allocate {bytes} bytes")]
    Allocation {
        /// Number of bytes requested, guard included.
        bytes: usize,
        /// Error reported by the operating system.
        #[source]
        source: io::Error,
    },
}

/// The benchmark observed corrupted data or an implausible result.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum VerifyError {
    /// A timed read pass summed to a different value than the fill pass.
    #[error("{method} method: checksum failure, got {got:#x}, expected {expected:#x}")]
    ChecksumMismatch {
        /// Human readable label of the method that performed the pass.
        method: &'static str,
        /// Checksum accumulated by the read pass.
        got: u64,
        /// Checksum computed when the buffer was filled.
        expected: u64,
    },

    /// The best prefetching rate is slower than not prefetching at all.
    #[error(
        "non-prefetch rate {baseline:.2} GB per sec higher than best prefetch rate {best:.2} GB per sec"
    )]
    RateBelowBaseline {
        /// Rate at offset zero in GB/s.
        baseline: f64,
        /// Best rate over all offsets in GB/s.
        best: f64,
    },
}

/// Cache topology could not be determined.
///
/// Never surfaces to callers of the probe: every variant selects the default size.
#[derive(Debug, Error)]
pub enum TopologyError {
    /// The platform offers no way to query cache descriptors.
    #[error("cache topology queries are not supported on this platform")]
    Unsupported,

    /// Reading a cache descriptor failed.
    #[error("failed to read cache descriptor: {0}")]
    Io(#[from] io::Error),

    /// A cache descriptor held an unexpected value.
    #[error("unparsable cache descriptor value '{0}'")]
    Parse(String),
}

/// Any error the stressor can report.
#[derive(Debug, Error)]
pub enum PrefetchError {
    /// See [`ConfigError`].
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// See [`ResourceError`].
    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// See [`VerifyError`].
    #[error(transparent)]
    Verify(#[from] VerifyError),
}
