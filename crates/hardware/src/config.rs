//! Configuration system for the prefetch stressor.
//!
//! This module defines every knob of a benchmark run. It provides:
//! 1. **Defaults:** Baseline values used when an option is not given.
//! 2. **Structures:** A serde-deserializable document (`Config`) for files and the CLI.
//! 3. **Validation:** Option validators run at parse time, before anything is allocated.
//! 4. **Settings Store:** The typed key/value store the stressor reads at start-up.
//!
//! Configuration is supplied as JSON or built from command-line flags; use
//! `Config::default()` for a run with every default.

use serde::Deserialize;

use crate::common::constants::{GB, KB, MB, TB};
use crate::common::error::ConfigError;
use crate::method::{self, DEFAULT_METHOD, METHODS};
use crate::topology::validate_l3_size;

/// Default configuration constants for the stressor.
mod defaults {
    /// Name of the default prefetch method.
    pub const METHOD: &str = "builtin";

    /// Verification is opt-in, as in the stress framework.
    pub const VERIFY: bool = false;

    /// Instance number of a stand-alone run.
    pub const INSTANCE: u32 = 0;
}

/// A byte count given either as a plain number or as text with a unit suffix.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ByteSize {
    /// Exact number of bytes.
    Bytes(u64),
    /// Text such as `"8m"` or `"512K"`.
    Text(String),
}

impl ByteSize {
    /// Returns the number of bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidByteCount`] for unparsable text.
    pub fn bytes(&self) -> Result<u64, ConfigError> {
        match self {
            Self::Bytes(n) => Ok(*n),
            Self::Text(text) => parse_byte_count(text),
        }
    }
}

/// Parses a byte count with an optional `b`, `k`, `m`, `g` or `t` suffix.
///
/// Suffixes are binary multiples and case-insensitive: `"4k"` is 4096.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidByteCount`] for empty text, a malformed
/// number, an unknown suffix, or a value that overflows 64 bits.
pub fn parse_byte_count(text: &str) -> Result<u64, ConfigError> {
    let invalid = || ConfigError::InvalidByteCount(text.to_owned());
    let trimmed = text.trim();
    let split = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (digits, suffix) = trimmed.split_at(split);

    let scale = match suffix.to_ascii_lowercase().as_str() {
        "" | "b" => 1,
        "k" => KB,
        "m" => MB,
        "g" => GB,
        "t" => TB,
        _ => return Err(invalid()),
    };

    digits
        .parse::<u64>()
        .ok()
        .and_then(|n| n.checked_mul(scale))
        .ok_or_else(invalid)
}

/// Root configuration structure.
///
/// # Examples
///
/// ```
/// use prefbench_core::config::Config;
///
/// let json = r#"{
///     "prefetch": { "l3_size": "2m", "method": "builtinl0", "verify": true },
///     "run": { "max_ops": 4 }
/// }"#;
///
/// let config = Config::from_json(json).unwrap();
/// let settings = config.settings().unwrap();
/// assert_eq!(settings.l3_size(), Some(2 * 1024 * 1024));
/// assert!(settings.verify());
/// assert_eq!(config.run.max_ops, Some(4));
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Stressor options
    #[serde(default)]
    pub prefetch: PrefetchConfig,
    /// Run-loop limits
    #[serde(default)]
    pub run: RunConfig,
}

impl Config {
    /// Parses a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] when the document is malformed.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Json(e.to_string()))
    }

    /// Validates the stressor options into a settings store.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn settings(&self) -> Result<Settings, ConfigError> {
        let mut settings = Settings::default()
            .with_verify(self.prefetch.verify)
            .with_instance(self.prefetch.instance);
        if let Some(size) = &self.prefetch.l3_size {
            let bytes = size.bytes()?;
            settings.set(SettingKey::L3Size, SettingValue::Bytes(bytes))?;
        }
        settings.set_method_str(&self.prefetch.method)?;
        Ok(settings)
    }
}

/// Options of the prefetch stressor.
#[derive(Debug, Clone, Deserialize)]
pub struct PrefetchConfig {
    /// Data size override; probed from the cache topology when absent
    #[serde(default)]
    pub l3_size: Option<ByteSize>,

    /// Prefetch method name
    #[serde(default = "PrefetchConfig::default_method")]
    pub method: String,

    /// Verify checksums and the rate sanity check
    #[serde(default = "PrefetchConfig::default_verify")]
    pub verify: bool,

    /// Instance number; informational notices come from instance 0 only
    #[serde(default)]
    pub instance: u32,
}

impl PrefetchConfig {
    fn default_method() -> String {
        defaults::METHOD.to_owned()
    }

    const fn default_verify() -> bool {
        defaults::VERIFY
    }
}

impl Default for PrefetchConfig {
    fn default() -> Self {
        Self {
            l3_size: None,
            method: defaults::METHOD.to_owned(),
            verify: defaults::VERIFY,
            instance: defaults::INSTANCE,
        }
    }
}

/// Limits of the outer run loop.
///
/// With neither limit set a run performs exactly one pass.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RunConfig {
    /// Stop after this many completed passes
    #[serde(default)]
    pub max_ops: Option<u64>,

    /// Stop once this many seconds have elapsed
    #[serde(default)]
    pub timeout_secs: Option<f64>,
}

/// Keys of the settings store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    /// Data size override in bytes.
    L3Size,
    /// Index into the method table.
    Method,
}

impl SettingKey {
    /// Returns the option name the key is known by.
    pub const fn name(self) -> &'static str {
        match self {
            Self::L3Size => "prefetch-L3-size",
            Self::Method => "prefetch-method",
        }
    }
}

/// A typed setting value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingValue {
    /// A byte count.
    Bytes(u64),
    /// A method table index.
    Index(usize),
}

/// Validated settings of one stressor instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    l3_size: Option<usize>,
    method: Option<usize>,
    verify: bool,
    instance: u32,
}

impl Settings {
    /// Stores a validated value under `key`.
    ///
    /// # Errors
    ///
    /// * [`ConfigError::L3SizeOutOfRange`] for a size outside `[4 KiB, MAX_MEM_LIMIT]`.
    /// * [`ConfigError::MethodIndexOutOfRange`] for an index past the method table.
    /// * [`ConfigError::Json`] when the value type does not match the key.
    pub fn set(&mut self, key: SettingKey, value: SettingValue) -> Result<(), ConfigError> {
        match (key, value) {
            (SettingKey::L3Size, SettingValue::Bytes(bytes)) => {
                let bytes = validate_l3_size(bytes)?;
                let size = usize::try_from(bytes).map_err(|_| ConfigError::L3SizeOutOfRange {
                    value: bytes,
                    min: crate::common::constants::MIN_L3_SIZE,
                    max: usize::MAX as u64,
                })?;
                self.l3_size = Some(size);
            }
            (SettingKey::Method, SettingValue::Index(index)) => {
                let _ = method::method(index)?;
                self.method = Some(index);
            }
            (key, value) => {
                return Err(ConfigError::Json(format!(
                    "{} cannot hold {value:?}",
                    key.name()
                )));
            }
        }
        Ok(())
    }

    /// Returns the value stored under `key`, if any.
    pub const fn get(&self, key: SettingKey) -> Option<SettingValue> {
        match key {
            SettingKey::L3Size => match self.l3_size {
                Some(size) => Some(SettingValue::Bytes(size as u64)),
                None => None,
            },
            SettingKey::Method => match self.method {
                Some(index) => Some(SettingValue::Index(index)),
                None => None,
            },
        }
    }

    /// Option handler for `prefetch-L3-size`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for malformed or out-of-range sizes.
    pub fn set_l3_size_str(&mut self, text: &str) -> Result<(), ConfigError> {
        let bytes = parse_byte_count(text)?;
        self.set(SettingKey::L3Size, SettingValue::Bytes(bytes))
    }

    /// Option handler for `prefetch-method`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownMethod`] listing every valid name.
    pub fn set_method_str(&mut self, name: &str) -> Result<(), ConfigError> {
        let index = method::method_by_name(name)?;
        self.set(SettingKey::Method, SettingValue::Index(index))
    }

    /// Enables or disables verification.
    #[must_use]
    pub const fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Sets the instance number.
    #[must_use]
    pub const fn with_instance(mut self, instance: u32) -> Self {
        self.instance = instance;
        self
    }

    /// Data size override in bytes, if one was configured.
    pub const fn l3_size(&self) -> Option<usize> {
        self.l3_size
    }

    /// Selected method index; the default method when none was configured.
    pub fn method_index(&self) -> usize {
        self.method.unwrap_or(DEFAULT_METHOD)
    }

    /// Name of the selected method.
    pub fn method_name(&self) -> &'static str {
        METHODS
            .get(self.method_index())
            .map_or(defaults::METHOD, |m| m.name)
    }

    /// Whether verification is enabled.
    pub const fn verify(&self) -> bool {
        self.verify
    }

    /// Instance number.
    pub const fn instance(&self) -> u32 {
        self.instance
    }
}
