//! # Unit Components
//!
//! Tests for each stage of the benchmark, from option parsing to the full
//! stressor run.

/// Configuration documents, byte counts, and the settings store.
pub mod config;


/// Pattern generator determinism and checksums.
pub mod pattern;

/// Pattern buffer sizing, guard region, and reference checksum.
pub mod buffer;

/// Method table lookups and availability.
pub mod method;



/// Run control and metric collection.
pub mod control;
