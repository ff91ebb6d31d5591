//! # Configuration Tests
//!
//! Tests for byte-count parsing, JSON documents, defaults, and validation of
//! the settings store.

use std::io::Write;

use pretty_assertions::assert_eq;
use prefbench_core::common::ConfigError;
use prefbench_core::common::constants::{MAX_MEM_LIMIT, MIN_L3_SIZE};
use prefbench_core::config::*;
use proptest::prelude::*;
use rstest::rstest;

#[rstest]
#[case("0", 0)]
#[case("4096", 4096)]
#[case("64b", 64)]
#[case("4k", 4 * 1024)]
#[case("4K", 4 * 1024)]
#[case("8m", 8 * 1024 * 1024)]
#[case("2G", 2 * 1024 * 1024 * 1024)]
#[case("1t", 1 << 40)]
#[case(" 16k ", 16 * 1024)]
fn test_parse_byte_count_accepts(#[case] text: &str, #[case] expected: u64) {
    assert_eq!(parse_byte_count(text), Ok(expected));
}

#[rstest]
#[case("")]
#[case("k")]
#[case("4x")]
#[case("4kb")]
#[case("-4")]
#[case("1.5m")]
#[case("99999999999t")]
fn test_parse_byte_count_rejects(#[case] text: &str) {
    assert_eq!(
        parse_byte_count(text),
        Err(ConfigError::InvalidByteCount(text.to_owned()))
    );
}

proptest! {
    #[test]
    fn test_kilobyte_suffix_scales(n in 0u64..(1 << 40)) {
        prop_assert_eq!(parse_byte_count(&format!("{n}k")), Ok(n * 1024));
    }
}

#[test]
fn test_config_default() {
    let config = Config::default();
    assert_eq!(config.prefetch.l3_size, None);
    assert_eq!(config.prefetch.method, "builtin");
    assert!(!config.prefetch.verify);
    assert_eq!(config.prefetch.instance, 0);
    assert_eq!(config.run, RunConfig::default());
}

#[test]
fn test_default_settings_select_builtin() {
    let settings = Config::default().settings().unwrap();
    assert_eq!(settings.method_index(), 0);
    assert_eq!(settings.method_name(), "builtin");
    assert_eq!(settings.l3_size(), None);
    assert_eq!(settings.get(SettingKey::L3Size), None);
}

#[test]
fn test_empty_document_uses_defaults() {
    let config = Config::from_json("{}").unwrap();
    assert_eq!(config.prefetch.method, "builtin");
    assert_eq!(config.run.max_ops, None);
}

#[test]
fn test_numeric_and_text_sizes() {
    let config = Config::from_json(r#"{ "prefetch": { "l3_size": 65536 } }"#).unwrap();
    assert_eq!(config.settings().unwrap().l3_size(), Some(65536));

    let config = Config::from_json(r#"{ "prefetch": { "l3_size": "64k" } }"#).unwrap();
    assert_eq!(config.settings().unwrap().l3_size(), Some(65536));
}

#[test]
fn test_malformed_document() {
    assert!(matches!(
        Config::from_json(r#"{ "prefetch": "#),
        Err(ConfigError::Json(_))
    ));
}

#[test]
fn test_config_file_round_trip() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{ "prefetch": {{ "method": "builtinl3", "verify": true, "instance": 2 }},
             "run": {{ "max_ops": 3, "timeout_secs": 1.5 }} }}"#
    )
    .unwrap();

    let text = std::fs::read_to_string(file.path()).unwrap();
    let config = Config::from_json(&text).unwrap();
    let settings = config.settings().unwrap();

    assert_eq!(settings.method_name(), "builtinl3");
    assert!(settings.verify());
    assert_eq!(settings.instance(), 2);
    assert_eq!(config.run.max_ops, Some(3));
    assert_eq!(config.run.timeout_secs, Some(1.5));
}

#[rstest]
#[case(MIN_L3_SIZE, true)]
#[case(MIN_L3_SIZE - 1, false)]
#[case(0, false)]
#[case(MAX_MEM_LIMIT, true)]
#[case(MAX_MEM_LIMIT + 1, false)]
fn test_l3_size_range(#[case] bytes: u64, #[case] accepted: bool) {
    let mut settings = Settings::default();
    let result = settings.set(SettingKey::L3Size, SettingValue::Bytes(bytes));
    assert_eq!(result.is_ok(), accepted);
    if accepted {
        assert_eq!(
            settings.get(SettingKey::L3Size),
            Some(SettingValue::Bytes(bytes))
        );
    } else {
        assert_eq!(
            result,
            Err(ConfigError::L3SizeOutOfRange {
                value: bytes,
                min: MIN_L3_SIZE,
                max: MAX_MEM_LIMIT,
            })
        );
        assert_eq!(settings.l3_size(), None);
    }
}

#[test]
fn test_l3_size_error_message() {
    let err = Settings::default().set_l3_size_str("1k").unwrap_err();
    assert!(err.to_string().starts_with("prefetch-L3-size must be in range 4096"));
}

#[test]
fn test_unknown_method_lists_names() {
    let err = Settings::default().set_method_str("warp").unwrap_err();
    match &err {
        ConfigError::UnknownMethod { name, available } => {
            assert_eq!(name, "warp");
            assert!(available.starts_with("builtin builtinl0 builtinl3"));
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(err.to_string().contains("prefetch-method must be one of:"));
}

#[test]
fn test_method_index_validation() {
    let mut settings = Settings::default();
    assert_eq!(
        settings.set(SettingKey::Method, SettingValue::Index(usize::MAX)),
        Err(ConfigError::MethodIndexOutOfRange(usize::MAX))
    );
    settings
        .set(SettingKey::Method, SettingValue::Index(2))
        .unwrap();
    assert_eq!(settings.method_name(), "builtinl3");
    assert_eq!(settings.get(SettingKey::Method), Some(SettingValue::Index(2)));
}

#[test]
fn test_mismatched_value_type() {
    let mut settings = Settings::default();
    assert!(settings
        .set(SettingKey::Method, SettingValue::Bytes(4096))
        .is_err());
    assert!(settings
        .set(SettingKey::L3Size, SettingValue::Index(1))
        .is_err());
}

#[test]
fn test_setting_names() {
    assert_eq!(SettingKey::L3Size.name(), "prefetch-L3-size");
    assert_eq!(SettingKey::Method.name(), "prefetch-method");
}
