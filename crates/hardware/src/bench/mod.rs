//! Prefetch benchmark.
//!
//! This module measures read bandwidth as a function of prefetch distance. It provides:
//! 1. **Statistics:** Per-offset accumulators (`stats`).
//! 2. **Benchmark Loop:** The flushed, compensated, optionally verified scan (`scan`).
//! 3. **Reduction:** Best-offset selection and the rate sanity check (`reduce`).
//! 4. **Host Seams:** Run control and metric reporting (`control`).
//! 5. **Entry Point:** The complete stressor run (`runner`).

/// Run control and metric sinks.
pub mod control;

/// Result reduction and sanity check.
pub mod reduce;

/// Stressor entry point.
pub mod runner;

/// Benchmark loop.
pub mod scan;

/// Per-offset statistics.
pub mod stats;

pub use control::{BoundedRun, Metric, MetricSink, MetricsReport, RunControl};
pub use reduce::{RunResult, reduce, sanity_check};
pub use runner::{RunOutcome, RunStatus, run_method, run_stressor, run_with_buffer};
pub use scan::{benchmark_offset, benchmark_offset_with, run_pass};
pub use stats::{OffsetStat, OffsetTable};
