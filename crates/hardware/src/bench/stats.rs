//! Per-offset benchmark statistics.
//!
//! This module tracks what every benchmarked prefetch distance has measured. It provides:
//! 1. **Offset Entries:** Accumulated bytes, compensated duration, and pass count per distance.
//! 2. **Derived Rates:** Bytes per second, zero while nothing has been timed.
//! 3. **Reporting:** A plain-text table of every offset for diagnostics.

use crate::common::constants::{CACHE_LINE_SIZE, GB, OFFSET_COUNT};

/// Accumulated measurements for one prefetch distance.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OffsetStat {
    /// Bytes ahead of the read cursor at which the hint is issued; 0 means no hint.
    pub offset: usize,
    /// Completed timed passes.
    pub iterations: u64,
    /// Sum of compensated pass durations, in seconds.
    pub duration: f64,
    /// Sum of bytes read by timed passes.
    pub bytes: f64,
}

impl OffsetStat {
    /// Creates an empty entry for `offset`.
    pub const fn new(offset: usize) -> Self {
        Self {
            offset,
            iterations: 0,
            duration: 0.0,
            bytes: 0.0,
        }
    }

    /// Read rate in bytes per second; zero when no time has been accumulated.
    pub const fn rate(&self) -> f64 {
        if self.duration > 0.0 {
            self.bytes / self.duration
        } else {
            0.0
        }
    }
}

/// The statistics of every prefetch distance of one stressor instance.
#[derive(Debug, Clone, PartialEq)]
pub struct OffsetTable {
    entries: Vec<OffsetStat>,
    /// Number of single-offset benchmarks run so far, across all passes.
    pub benchmarks: u64,
}

impl Default for OffsetTable {
    fn default() -> Self {
        Self::new()
    }
}

impl OffsetTable {
    /// Creates the standard table: 128 distances, one cache line apart, starting at 0.
    pub fn new() -> Self {
        Self::from_entries((0..OFFSET_COUNT).map(|i| OffsetStat::new(i * CACHE_LINE_SIZE)).collect())
    }

    /// Creates a table from arbitrary entries, in ascending offset order.
    pub const fn from_entries(entries: Vec<OffsetStat>) -> Self {
        Self {
            entries,
            benchmarks: 0,
        }
    }

    /// Returns the number of distances.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true for a table without distances.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the entry at `index`.
    pub fn get(&self, index: usize) -> Option<&OffsetStat> {
        self.entries.get(index)
    }

    /// Iterates over the entries in ascending offset order.
    pub fn iter(&self) -> impl Iterator<Item = &OffsetStat> {
        self.entries.iter()
    }

    /// Adds one timed pass to the entry at `index`.
    ///
    /// Indices past the end of the table are ignored.
    ///
    /// # Arguments
    ///
    /// * `index` - Entry to update.
    /// * `bytes` - Bytes read by the pass.
    /// * `duration` - Compensated pass duration in seconds.
    pub fn record(&mut self, index: usize, bytes: usize, duration: f64) {
        if let Some(entry) = self.entries.get_mut(index) {
            entry.bytes += bytes as f64;
            entry.duration += duration;
            entry.iterations += 1;
            self.benchmarks += 1;
        }
    }

    /// Prints the rate of every distance to stdout.
    pub fn print(&self) {
        println!("==========================================================");
        println!("PREFETCH OFFSETS");
        println!("==========================================================");
        println!("  {:>8}  {:>10}  {:>12}  {:>10}", "offset", "passes", "seconds", "GB/s");
        for entry in &self.entries {
            println!(
                "  {:>8}  {:>10}  {:>12.6}  {:>10.3}",
                entry.offset,
                entry.iterations,
                entry.duration,
                entry.rate() / GB as f64
            );
        }
        println!("==========================================================");
    }
}
