//! # Run Control Tests

use std::time::Duration;

use pretty_assertions::assert_eq;
use prefbench_core::bench::{BoundedRun, MetricSink, MetricsReport, RunControl};
use prefbench_core::config::RunConfig;

#[test]
fn test_default_config_runs_once() {
    let mut run = BoundedRun::from_config(&RunConfig::default());
    assert!(run.should_continue());
    run.increment_ops();
    assert!(!run.should_continue());
}

#[test]
fn test_expired_timeout_stops() {
    let mut run = BoundedRun::new(None, Some(Duration::ZERO));
    run.increment_ops();
    assert!(!run.should_continue());
}

#[test]
fn test_invalid_timeouts_are_ignored() {
    for secs in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        let config = RunConfig {
            max_ops: Some(2),
            timeout_secs: Some(secs),
        };
        let mut run = BoundedRun::from_config(&config);
        run.increment_ops();
        assert!(run.should_continue(), "timeout {secs}");
        run.increment_ops();
        assert!(!run.should_continue());
    }
}

#[test]
fn test_ops_limit_with_long_timeout() {
    let mut run = BoundedRun::new(Some(1), Some(Duration::from_secs(3600)));
    run.increment_ops();
    assert!(!run.should_continue());
    assert_eq!(run.ops(), 1);
}

#[test]
fn test_report_serializes() {
    let mut report = MetricsReport::default();
    report.report(0, "GB per sec non-prefetch read rate", 1.5);
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "metrics": [
                { "slot": 0, "label": "GB per sec non-prefetch read rate", "value": 1.5 }
            ]
        })
    );
}
