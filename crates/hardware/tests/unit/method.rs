//! # Method Table Tests

use std::collections::HashSet;

use prefbench_core::common::ConfigError;
use prefbench_core::method::*;
use rstest::rstest;

#[test]
fn test_default_method_is_builtin() {
    let default = method(DEFAULT_METHOD).unwrap();
    assert_eq!(default.name, "builtin");
    assert_eq!(default.kind, MethodKind::Builtin);
    assert!(default.is_available());
}

#[test]
fn test_names_are_unique() {
    let names: Vec<_> = method_names().collect();
    let unique: HashSet<_> = names.iter().collect();
    assert_eq!(names.len(), unique.len());
    assert_eq!(names.len(), METHODS.len());
}

#[rstest]
#[case("builtin", 0)]
#[case("builtinl0", 1)]
#[case("builtinl3", 2)]
fn test_portable_methods(#[case] name: &str, #[case] index: usize) {
    assert_eq!(method_by_name(name), Ok(index));
    let entry = method(index).unwrap();
    assert!(entry.is_available());
    assert!(!entry.rate_checked);
    assert_eq!(entry.checks_rate(), ALWAYS_RATE_CHECK);
}

#[test]
fn test_names_are_case_sensitive() {
    assert!(matches!(
        method_by_name("Builtin"),
        Err(ConfigError::UnknownMethod { .. })
    ));
}

#[test]
fn test_index_out_of_range() {
    assert!(matches!(
        method(METHODS.len()),
        Err(ConfigError::MethodIndexOutOfRange(_))
    ));
}

#[test]
fn test_labels_name_the_hint() {
    assert_eq!(MethodKind::Builtin.label(), "builtin_prefetch");
    assert_eq!(MethodKind::BuiltinLocality0.label(), "builtin_prefetch locality 0");
    assert_eq!(MethodKind::BuiltinLocality3.label(), "builtin_prefetch locality 3");
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
#[rstest]
#[case("prefetcht0", MethodKind::X86Prefetcht0, "x86 prefetcht0")]
#[case("prefetcht1", MethodKind::X86Prefetcht1, "x86 prefetcht1")]
#[case("prefetcht2", MethodKind::X86Prefetcht2, "x86 prefetcht2")]
#[case("prefetchnta", MethodKind::X86Prefetchnta, "x86 prefetchnta")]
fn test_x86_methods(#[case] name: &str, #[case] kind: MethodKind, #[case] label: &str) {
    let entry = method(method_by_name(name).unwrap()).unwrap();
    assert_eq!(entry.kind, kind);
    assert_eq!(entry.kind.label(), label);
    assert!(entry.rate_checked);
    assert!(entry.checks_rate());
    assert_eq!(entry.is_available(), std::arch::is_x86_feature_detected!("sse"));
}

#[cfg(target_arch = "aarch64")]
#[rstest]
#[case("pldl1keep", MethodKind::Aarch64PldL1Keep)]
#[case("pldl2keep", MethodKind::Aarch64PldL2Keep)]
#[case("pldl3keep", MethodKind::Aarch64PldL3Keep)]
#[case("pldl1strm", MethodKind::Aarch64PldL1Strm)]
fn test_aarch64_methods(#[case] name: &str, #[case] kind: MethodKind) {
    let entry = method(method_by_name(name).unwrap()).unwrap();
    assert_eq!(entry.kind, kind);
    assert!(entry.is_available());
    assert!(entry.checks_rate());
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
#[test]
fn test_x86_names_unknown_elsewhere() {
    assert!(method_by_name("prefetcht0").is_err());
}
