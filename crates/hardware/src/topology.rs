//! Cache Topology Probe.
//!
//! Determines how much data the benchmark should stream: the size of the
//! highest cache level present. It provides:
//! 1. **Descriptors:** A platform-neutral view of the caches of one CPU.
//! 2. **Sources:** A sysfs reader for Linux and an always-failing source elsewhere.
//! 3. **Selection:** Highest-level lookup with a fixed default and a once-per-process notice.
//! 4. **Validation:** Range checking for an explicit size override.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::info;

use crate::common::constants::{DEFAULT_L3_SIZE, MAX_MEM_LIMIT, MIN_L3_SIZE, STRESSOR_NAME};
use crate::common::error::{ConfigError, TopologyError};

/// Default location of the per-level cache descriptors of the first CPU.
pub const SYSFS_CACHE_ROOT: &str = "/sys/devices/system/cpu/cpu0/cache";

static FALLBACK_NOTICE: AtomicBool = AtomicBool::new(false);
static LOWER_LEVEL_NOTICE: AtomicBool = AtomicBool::new(false);

/// What a cache holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKind {
    /// Data only.
    Data,
    /// Instructions only.
    Instruction,
    /// Data and instructions.
    Unified,
}

/// One cache as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheDescriptor {
    /// Cache level, 1 being closest to the core.
    pub level: u8,
    /// Contents of the cache.
    pub kind: CacheKind,
    /// Capacity in bytes; zero when the platform does not report it.
    pub size: usize,
}

/// A source of cache descriptors.
pub trait CacheTopology {
    /// Lists the caches visible to the current CPU.
    ///
    /// # Errors
    ///
    /// Returns a [`TopologyError`] when the platform cannot be queried.
    fn caches(&self) -> Result<Vec<CacheDescriptor>, TopologyError>;
}

/// Reads cache descriptors from Linux sysfs.
#[derive(Debug, Clone)]
pub struct SysfsTopology {
    root: PathBuf,
}

impl Default for SysfsTopology {
    fn default() -> Self {
        Self::with_root(SYSFS_CACHE_ROOT)
    }
}

impl SysfsTopology {
    /// Reads descriptors from `root/index*/` instead of the system location.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn read_entry(dir: &Path) -> Result<CacheDescriptor, TopologyError> {
        let level = fs::read_to_string(dir.join("level"))?;
        let level = level
            .trim()
            .parse::<u8>()
            .map_err(|_| TopologyError::Parse(level.trim().to_owned()))?;

        let kind = match fs::read_to_string(dir.join("type"))?.trim() {
            "Data" => CacheKind::Data,
            "Instruction" => CacheKind::Instruction,
            "Unified" => CacheKind::Unified,
            other => return Err(TopologyError::Parse(other.to_owned())),
        };

        // Some platforms omit the size of a level; report it as zero.
        let size = match fs::read_to_string(dir.join("size")) {
            Ok(text) => parse_cache_size(&text)?,
            Err(_) => 0,
        };

        Ok(CacheDescriptor { level, kind, size })
    }
}

impl CacheTopology for SysfsTopology {
    fn caches(&self) -> Result<Vec<CacheDescriptor>, TopologyError> {
        let mut caches = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_name().to_string_lossy().starts_with("index") {
                continue;
            }
            caches.push(Self::read_entry(&entry.path())?);
        }
        Ok(caches)
    }
}

/// A source for platforms without a cache query.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedTopology;

impl CacheTopology for UnsupportedTopology {
    fn caches(&self) -> Result<Vec<CacheDescriptor>, TopologyError> {
        Err(TopologyError::Unsupported)
    }
}

/// Returns the cache source for the running platform.
pub fn host_topology() -> Box<dyn CacheTopology> {
    if cfg!(target_os = "linux") {
        Box::new(SysfsTopology::default())
    } else {
        Box::new(UnsupportedTopology)
    }
}

/// Parses a sysfs cache size such as `32K`, `8192K` or `1M`.
///
/// # Errors
///
/// Returns [`TopologyError::Parse`] for anything else.
pub fn parse_cache_size(text: &str) -> Result<usize, TopologyError> {
    let text = text.trim();
    let (digits, scale) = match text.as_bytes().last() {
        Some(b'K' | b'k') => (&text[..text.len() - 1], 1usize << 10),
        Some(b'M' | b'm') => (&text[..text.len() - 1], 1 << 20),
        Some(b'G' | b'g') => (&text[..text.len() - 1], 1 << 30),
        _ => (text, 1),
    };
    digits
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_mul(scale))
        .ok_or_else(|| TopologyError::Parse(text.to_owned()))
}

/// Outcome of a topology probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheProbe {
    /// Bytes the benchmark should stream.
    pub size: usize,
    /// Level the size came from, or `None` when the default was used.
    pub level: Option<u8>,
}

/// Determines the size of the highest cache level, falling back to 4 MiB.
///
/// The highest level present, of any kind, is authoritative even when it is
/// not level 3. Its data or unified cache supplies the size; a level holding
/// only an instruction cache selects the default.
pub fn probe_last_level_cache(source: &dyn CacheTopology) -> CacheProbe {
    let fallback = |reason: &str| {
        let _ = notice_fallback(reason);
        CacheProbe {
            size: DEFAULT_L3_SIZE,
            level: None,
        }
    };

    let caches = match source.caches() {
        Ok(caches) => caches,
        Err(_) => return fallback("unable to determine cache details"),
    };

    let Some(max_level) = caches.iter().map(|c| c.level).max() else {
        return fallback("unable to determine cache details");
    };

    if max_level > 0 && max_level < 3 && !LOWER_LEVEL_NOTICE.swap(true, Ordering::Relaxed) {
        info!("{STRESSOR_NAME}: no L3 cache, using L{max_level} size instead");
    }

    let Some(cache) = caches
        .iter()
        .find(|c| c.level == max_level && c.kind != CacheKind::Instruction)
    else {
        return fallback("no suitable cache found");
    };

    if cache.size == 0 {
        return fallback("unable to determine cache size");
    }

    CacheProbe {
        size: cache.size,
        level: Some(max_level),
    }
}

/// Determines the size of the highest cache level in bytes.
///
/// Shorthand for [`probe_last_level_cache`] when only the size matters.
pub fn probe_last_level_cache_size(source: &dyn CacheTopology) -> usize {
    probe_last_level_cache(source).size
}

/// Logs the default-size notice unless this process already did.
///
/// Returns true when this call emitted it.
fn notice_fallback(reason: &str) -> bool {
    if FALLBACK_NOTICE.swap(true, Ordering::Relaxed) {
        return false;
    }
    info!("{STRESSOR_NAME}: using built-in defaults as {reason}");
    true
}

/// Returns true once the default-size notice has been logged in this process.
pub fn fallback_notice_emitted() -> bool {
    FALLBACK_NOTICE.load(Ordering::Relaxed)
}

/// Checks an explicit last-level cache size override.
///
/// # Errors
///
/// Returns [`ConfigError::L3SizeOutOfRange`] outside `[4 KiB, MAX_MEM_LIMIT]`.
pub fn validate_l3_size(bytes: u64) -> Result<u64, ConfigError> {
    if bytes < MIN_L3_SIZE || bytes > MAX_MEM_LIMIT {
        return Err(ConfigError::L3SizeOutOfRange {
            value: bytes,
            min: MIN_L3_SIZE,
            max: MAX_MEM_LIMIT,
        });
    }
    Ok(bytes)
}
