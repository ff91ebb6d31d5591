use prefbench_core::config::Settings;
use prefbench_core::memory::PatternBuffer;

/// Smallest accepted data size; keeps end-to-end runs in the millisecond range.
pub const SMALL_SIZE: usize = 4096;

/// Installs a test-writer subscriber once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("debug")
        .try_init();
}

/// Settings selecting `method` with a 4 KiB data size.
pub fn small_settings(method: &str, verify: bool) -> Settings {
    let mut settings = Settings::default().with_verify(verify);
    settings.set_l3_size_str("4k").unwrap();
    settings.set_method_str(method).unwrap();
    settings
}

/// A filled 4 KiB pattern buffer.
pub fn small_buffer() -> PatternBuffer {
    PatternBuffer::build(SMALL_SIZE).unwrap()
}
