//! Row-range decomposition for chunked tables.
//!
//! The adapters here turn a logical row range into the sequence of physical
//! row ranges that are actually requested from a store:
//!
//! - [`ChunkedRanges`](transform::chunk::ChunkedRanges) bounds every output range
//!   to a maximum length, without regard to where chunks begin.
//! - [`AlignedChunkedRanges`](transform::aligned::AlignedChunkedRanges) splits at
//!   every multiple of the chunk size, so no output range crosses a chunk boundary.
//!
//! Both are reachable through the [`RangeIteratorsExt`] extension trait.

pub mod transform;

pub use transform::RangeIteratorsExt;

use std::ops::Range;

/// Converts an inclusive `first..=last` row span into a half-open range.
///
/// Returns an empty range when `last < first`. The end saturates at `u64::MAX`;
/// callers check `last` against their bounds before converting.
pub fn inclusive_to_range(first: u64, last: u64) -> Range<u64> {
    if last < first {
        first..first
    } else {
        first..last.saturating_add(1)
    }
}
