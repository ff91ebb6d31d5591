//! Result reduction and the rate sanity check.

use tracing::debug;

use crate::bench::stats::OffsetTable;
use crate::common::constants::{GB, NANOS_PER_SEC, STRESSOR_NAME};
use crate::common::error::VerifyError;

/// Metric slot of the unprefetched read rate.
pub const BASELINE_METRIC_SLOT: usize = 0;
/// Label of the unprefetched read rate metric.
pub const BASELINE_METRIC_LABEL: &str = "GB per sec non-prefetch read rate";
/// Metric slot of the best read rate.
pub const BEST_METRIC_SLOT: usize = 1;
/// Label of the best read rate metric.
pub const BEST_METRIC_LABEL: &str = "GB per sec best read rate";

/// Summary of an offset table.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize)]
pub struct RunResult {
    /// Index of the fastest distance.
    pub best_index: usize,
    /// Fastest distance in bytes.
    pub best_offset: usize,
    /// Fastest read rate in bytes per second.
    pub best_rate: f64,
    /// Read rate without prefetching in bytes per second.
    pub baseline_rate: f64,
    /// Time the hint is issued ahead of its use, in nanoseconds.
    pub lead_time_ns: f64,
}

impl RunResult {
    /// Best rate in GB per second.
    pub const fn best_gb_per_sec(&self) -> f64 {
        self.best_rate / GB as f64
    }

    /// Baseline rate in GB per second.
    pub const fn baseline_gb_per_sec(&self) -> f64 {
        self.baseline_rate / GB as f64
    }
}

/// Picks the fastest distance of `table`.
///
/// Ties keep the lowest offset. The baseline is the entry at offset zero, or
/// zero when the table has no such entry.
pub fn reduce(table: &OffsetTable) -> RunResult {
    let mut result = RunResult::default();

    for (index, entry) in table.iter().enumerate() {
        let rate = entry.rate();
        if entry.offset == 0 {
            result.baseline_rate = rate;
        }
        if rate > result.best_rate {
            result.best_index = index;
            result.best_offset = entry.offset;
            result.best_rate = rate;
        }
    }

    if result.best_rate > 0.0 {
        result.lead_time_ns = NANOS_PER_SEC * result.best_offset as f64 / result.best_rate;
    }

    debug!(
        "{STRESSOR_NAME}: best prefetch read rate @ {:.2} GB per sec at offset {} (~{:.2} nanosecs)",
        result.best_gb_per_sec(),
        result.best_offset,
        result.lead_time_ns
    );
    result
}

/// Fails a verified run whose best rate is below the unprefetched rate.
///
/// # Arguments
///
/// * `result` - Reduced table.
/// * `verify` - Whether verification is enabled.
/// * `rate_checked` - Whether the method's rate takes part in the check.
///
/// # Errors
///
/// Returns [`VerifyError::RateBelowBaseline`] when all three conditions hold.
pub fn sanity_check(result: &RunResult, verify: bool, rate_checked: bool) -> Result<(), VerifyError> {
    if verify && rate_checked && result.best_rate < result.baseline_rate {
        return Err(VerifyError::RateBelowBaseline {
            baseline: result.baseline_gb_per_sec(),
            best: result.best_gb_per_sec(),
        });
    }
    Ok(())
}
