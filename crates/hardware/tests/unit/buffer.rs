//! # Pattern Buffer Tests
//!
//! Sizing, guard region, and the reference checksum of the mapped buffer.

use prefbench_core::common::constants::{GUARD_BYTES, STRIDE_BYTES};
use prefbench_core::memory::{PatternBuffer, PatternGenerator};
use prefbench_core::platform::flush_data_cache;
use rstest::rstest;

#[rstest]
#[case(4096, 4096)]
#[case(4100, 4096)]
#[case(127, 64)]
#[case(1, 64)]
#[case(0, 64)]
fn test_size_rounds_to_whole_strides(#[case] requested: usize, #[case] expected: usize) {
    let buffer = PatternBuffer::build(requested).unwrap();
    assert_eq!(buffer.len(), expected);
    assert_eq!(buffer.len() % STRIDE_BYTES, 0);
    assert!(!buffer.is_empty());
}

#[test]
fn test_guard_follows_pattern() {
    let buffer = PatternBuffer::build(8192).unwrap();
    assert_eq!(buffer.mapped_len(), 8192 + GUARD_BYTES);
    assert_eq!(buffer.guard().len(), GUARD_BYTES);
    assert!(buffer.guard().iter().all(|b| *b == 0));
}

#[test]
fn test_contents_match_generator() {
    let buffer = PatternBuffer::build(4096).unwrap();
    assert_eq!(buffer.words().len(), 512);
    assert!(buffer
        .words()
        .iter()
        .zip(PatternGenerator::default())
        .all(|(w, g)| *w == g));
}

#[test]
fn test_checksum_depends_on_length_only() {
    let a = PatternBuffer::build(16384).unwrap();
    let b = PatternBuffer::build(16384).unwrap();
    assert_eq!(a.checksum(), b.checksum());
    assert_eq!(
        a.checksum(),
        a.words().iter().fold(0u64, |acc, w| acc.wrapping_add(*w))
    );

    let c = PatternBuffer::build(8192).unwrap();
    assert_ne!(a.checksum(), c.checksum());
}

#[test]
fn test_buffer_moves_across_threads() {
    let buffer = PatternBuffer::build(4096).unwrap();
    let checksum = buffer.checksum();
    let moved = std::thread::spawn(move || buffer.checksum()).join().unwrap();
    assert_eq!(moved, checksum);
}

#[test]
fn test_flip_bits_leaves_checksum_untouched() {
    let mut buffer = PatternBuffer::build(4096).unwrap();
    let before = buffer.words()[3];
    let checksum = buffer.checksum();

    buffer.flip_bits(3, 0b101);
    assert_eq!(buffer.words()[3], before ^ 0b101);
    assert_eq!(buffer.checksum(), checksum);

    buffer.flip_bits(buffer.words().len(), u64::MAX);
    assert!(buffer.guard().iter().all(|b| *b == 0));
}

#[test]
fn test_flush_preserves_contents() {
    let buffer = PatternBuffer::build(8192).unwrap();
    let copy = buffer.words().to_vec();
    flush_data_cache(buffer.as_ptr().cast::<u8>(), buffer.len());
    flush_data_cache(buffer.as_ptr().cast::<u8>().wrapping_add(3), 5);
    flush_data_cache(buffer.as_ptr().cast::<u8>(), 0);
    assert_eq!(buffer.words(), &copy[..]);
}
