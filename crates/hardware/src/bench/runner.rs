//! Stressor entry point.
//!
//! Ties the benchmark together for one instance. It provides:
//! 1. **Method Resolution:** Selects the configured method and skips the run when it is unavailable.
//! 2. **Sizing:** Uses the configured data size or the probed last-level cache size.
//! 3. **Pass Loop:** Repeats full passes until the host stops the run or a pass fails.
//! 4. **Reporting:** Reduces the table, reports both rates and applies the sanity check.

use serde::Serialize;
use tracing::{error, info};

use crate::bench::control::{MetricSink, RunControl};
use crate::bench::reduce::{
    BASELINE_METRIC_LABEL, BASELINE_METRIC_SLOT, BEST_METRIC_LABEL, BEST_METRIC_SLOT, RunResult,
    reduce, sanity_check,
};
use crate::bench::scan::run_pass;
use crate::bench::stats::OffsetTable;
use crate::common::constants::{KB, STRESSOR_NAME};
use crate::common::error::{PrefetchError, ResourceError};
use crate::config::Settings;
use crate::memory::PatternBuffer;
use crate::method::{self, PrefetchMethod};
use crate::topology::{self, CacheTopology};

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunStatus {
    /// Every pass verified and the sanity check passed.
    Success,
    /// A pass or the sanity check failed.
    Failure,
    /// The run was skipped: method unavailable or memory not obtainable.
    NoResource,
}

impl RunStatus {
    /// Process exit code used by the stress framework for this status.
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
            Self::NoResource => 3,
        }
    }
}

/// Everything a run produced.
#[derive(Debug, Serialize)]
pub struct RunOutcome {
    /// Final status.
    pub status: RunStatus,
    /// Name of the method benchmarked.
    pub method: &'static str,
    /// Bytes of pattern read per offset benchmark; zero when skipped.
    pub data_size: usize,
    /// Completed full passes.
    pub ops: u64,
    /// Reduced statistics; absent when no buffer was built.
    pub result: Option<RunResult>,
    /// Statistics of every offset; absent when no buffer was built.
    #[serde(skip)]
    pub table: Option<OffsetTable>,
    /// The error that ended the run, if any.
    #[serde(serialize_with = "serialize_error")]
    pub error: Option<PrefetchError>,
}

impl RunOutcome {
    const fn skipped(method: &'static str, error: PrefetchError) -> Self {
        Self {
            status: RunStatus::NoResource,
            method,
            data_size: 0,
            ops: 0,
            result: None,
            table: None,
            error: Some(error),
        }
    }

    /// Process exit code for this outcome.
    pub const fn exit_code(&self) -> i32 {
        self.status.exit_code()
    }
}

#[allow(clippy::ref_option)]
fn serialize_error<S: serde::Serializer>(
    error: &Option<PrefetchError>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match error {
        Some(e) => serializer.serialize_some(&e.to_string()),
        None => serializer.serialize_none(),
    }
}

/// Runs the prefetch stressor with the host's cache topology.
///
/// # Arguments
///
/// * `settings` - Validated options of this instance.
/// * `control` - Host continue predicate and op counter.
/// * `sink` - Receives the two rate metrics.
///
/// # Returns
///
/// The outcome, whose [`RunOutcome::exit_code`] follows the framework's codes.
pub fn run_stressor(
    settings: &Settings,
    control: &mut dyn RunControl,
    sink: &mut dyn MetricSink,
) -> RunOutcome {
    let selected = match method::method(settings.method_index()) {
        Ok(m) => m,
        Err(e) => return RunOutcome::skipped(settings.method_name(), e.into()),
    };
    let topology = topology::host_topology();
    run_method(selected, settings, topology.as_ref(), control, sink)
}

/// Runs the prefetch stressor for an explicit method and cache topology.
///
/// Availability is checked before the topology is probed or memory mapped.
/// The topology is not consulted when `settings` carries a size override.
pub fn run_method(
    selected: &'static PrefetchMethod,
    settings: &Settings,
    topology: &dyn CacheTopology,
    control: &mut dyn RunControl,
    sink: &mut dyn MetricSink,
) -> RunOutcome {
    if !selected.is_available() {
        if settings.instance() == 0 {
            info!(
                "{STRESSOR_NAME}: prefetch-method '{}' is not available on this CPU, skipping stressor",
                selected.name
            );
        }
        return RunOutcome::skipped(
            selected.name,
            ResourceError::MethodUnavailable {
                method: selected.name,
            }
            .into(),
        );
    }

    let size = settings
        .l3_size()
        .unwrap_or_else(|| topology::probe_last_level_cache_size(topology));

    let buffer = match PatternBuffer::build(size) {
        Ok(buffer) => buffer,
        Err(e) => {
            error!("{STRESSOR_NAME}: {e}, skipping stressor");
            return RunOutcome::skipped(selected.name, e.into());
        }
    };

    let outcome = run_with_buffer(selected, &buffer, settings, control, sink);
    drop(buffer);
    outcome
}

/// Runs the pass loop and reporting over an already built buffer.
///
/// Availability is not checked here. Both metrics are reported even when a
/// pass fails verification, from whatever statistics were accumulated.
///
/// # Arguments
///
/// * `selected` - Method whose hint the timed passes issue.
/// * `buffer` - Filled pattern buffer; its checksum is the verification reference.
/// * `settings` - Options of this instance; the size override is not consulted.
/// * `control` - Host continue predicate and op counter.
/// * `sink` - Receives the two rate metrics.
pub fn run_with_buffer(
    selected: &'static PrefetchMethod,
    buffer: &PatternBuffer,
    settings: &Settings,
    control: &mut dyn RunControl,
    sink: &mut dyn MetricSink,
) -> RunOutcome {
    let rate_checked = selected.checks_rate();
    let verify = settings.verify();

    if settings.instance() == 0 {
        info!(
            "{STRESSOR_NAME}: using a {} KB L3 cache with prefetch method '{}'",
            buffer.len() as u64 / KB,
            selected.name
        );
    }

    let mut table = OffsetTable::new();
    let mut ops = 0u64;
    let mut failure: Option<PrefetchError> = None;

    loop {
        match run_pass(buffer, &mut table, selected.kind, verify) {
            Ok(()) => {
                control.increment_ops();
                ops += 1;
            }
            Err(e) => {
                error!("{STRESSOR_NAME}: {e}");
                failure = Some(e.into());
                break;
            }
        }
        if !control.should_continue() {
            break;
        }
    }

    let result = reduce(&table);
    sink.report(
        BASELINE_METRIC_SLOT,
        BASELINE_METRIC_LABEL,
        result.baseline_gb_per_sec(),
    );
    sink.report(BEST_METRIC_SLOT, BEST_METRIC_LABEL, result.best_gb_per_sec());

    if failure.is_none() {
        if let Err(e) = sanity_check(&result, verify, rate_checked) {
            error!("{STRESSOR_NAME}: {e}");
            failure = Some(e.into());
        }
    }

    RunOutcome {
        status: if failure.is_some() {
            RunStatus::Failure
        } else {
            RunStatus::Success
        },
        method: selected.name,
        data_size: buffer.len(),
        ops,
        result: Some(result),
        table: Some(table),
        error: failure,
    }
}
