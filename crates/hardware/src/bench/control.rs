//! Run Control and Metric Reporting.
//!
//! The stressor is driven by a host through two narrow seams. It provides:
//! 1. **Run Control:** The continue predicate and bogo-op counter consulted between passes.
//! 2. **Metric Sink:** Destination for the named per-run metrics.
//! 3. **Implementations:** An op/time bounded run and a serializable metrics collector.

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::config::RunConfig;

/// Decides whether another full pass should run.
pub trait RunControl {
    /// Returns true while the host wants another pass.
    fn should_continue(&mut self) -> bool;

    /// Counts one completed pass.
    fn increment_ops(&mut self);
}

/// Receives the metrics of a finished run.
pub trait MetricSink {
    /// Records `value` under `label` in metric `slot`.
    fn report(&mut self, slot: usize, label: &str, value: f64);
}

/// Stops after a number of passes and/or a wall-clock timeout.
///
/// Without either limit, a single pass runs.
#[derive(Debug, Clone)]
pub struct BoundedRun {
    max_ops: Option<u64>,
    timeout: Option<Duration>,
    started: Instant,
    ops: u64,
}

impl BoundedRun {
    /// Creates a run bounded by `max_ops` passes and `timeout`.
    pub fn new(max_ops: Option<u64>, timeout: Option<Duration>) -> Self {
        Self {
            max_ops,
            timeout,
            started: Instant::now(),
            ops: 0,
        }
    }

    /// Creates a run bounded by the limits of a run configuration.
    ///
    /// Non-positive or non-finite timeouts are ignored.
    pub fn from_config(config: &RunConfig) -> Self {
        let timeout = config
            .timeout_secs
            .filter(|secs| secs.is_finite() && *secs > 0.0)
            .map(Duration::from_secs_f64);
        Self::new(config.max_ops, timeout)
    }

    /// Completed passes so far.
    pub const fn ops(&self) -> u64 {
        self.ops
    }
}

impl RunControl for BoundedRun {
    fn should_continue(&mut self) -> bool {
        if self.max_ops.is_none() && self.timeout.is_none() {
            return self.ops == 0;
        }
        if self.max_ops.is_some_and(|max| self.ops >= max) {
            return false;
        }
        !self.timeout.is_some_and(|t| self.started.elapsed() >= t)
    }

    fn increment_ops(&mut self) {
        self.ops += 1;
    }
}

/// One reported metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    /// Metric slot.
    pub slot: usize,
    /// Human readable label.
    pub label: String,
    /// Value in the label's unit.
    pub value: f64,
}

/// Collects reported metrics in slot order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsReport {
    /// Metrics received so far; a repeated slot replaces the earlier value.
    pub metrics: Vec<Metric>,
}

impl MetricsReport {
    /// Returns the value in `slot`, if one was reported.
    pub fn value(&self, slot: usize) -> Option<f64> {
        self.metrics.iter().find(|m| m.slot == slot).map(|m| m.value)
    }
}

impl MetricSink for MetricsReport {
    fn report(&mut self, slot: usize, label: &str, value: f64) {
        let metric = Metric {
            slot,
            label: label.to_owned(),
            value,
        };
        match self.metrics.binary_search_by_key(&slot, |m| m.slot) {
            Ok(pos) => self.metrics[pos] = metric,
            Err(pos) => self.metrics.insert(pos, metric),
        }
    }
}
