use mockall::mock;
use prefbench_core::bench::{MetricSink, RunControl};

mock! {
    pub Control {}
    impl RunControl for Control {
        fn should_continue(&mut self) -> bool;
        fn increment_ops(&mut self);
    }
}

mock! {
    pub Sink {}
    impl MetricSink for Sink {
        fn report(&mut self, slot: usize, label: &str, value: f64);
    }
}

/// A control that allows exactly `passes` passes and counts them.
pub fn control_for_passes(passes: u64) -> MockControl {
    let mut control = MockControl::new();
    control.expect_increment_ops().times(passes as usize).return_const(());
    let mut remaining = passes;
    control.expect_should_continue().returning(move || {
        remaining = remaining.saturating_sub(1);
        remaining > 0
    });
    control
}
