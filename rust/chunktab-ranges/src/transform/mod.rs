//! Iterator adapters for working with `Range<u64>` sequences.
//!
//! # Provided Adapters
//!
//! - [`ChunkedRanges`](chunk::ChunkedRanges): Splits each input range into subranges
//!   of at most a given size.
//! - [`AlignedChunkedRanges`](aligned::AlignedChunkedRanges): Splits each input range
//!   at the boundaries of a fixed chunk grid.
//!
//! The [`RangeIteratorsExt`] trait is implemented for all iterators over `Range<u64>`.

use std::ops::Range;

pub mod aligned;
pub mod chunk;

/// Extension trait for more idiomatic usage of the range iterator adapters.
pub trait RangeIteratorsExt: Iterator<Item = Range<u64>> + Sized {
    /// Adapts an iterator of `Range<u64>` to yield ranges chunked to a maximum size.
    ///
    /// Each output range will have a length at most `chunk_size`.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` is 0.
    fn chunk_ranges(self, chunk_size: u64) -> chunk::ChunkedRanges<Self> {
        chunk::ChunkedRanges::new(self, chunk_size)
    }

    /// Adapts an iterator of `Range<u64>` to yield ranges that never cross a
    /// multiple of `chunk_size`.
    ///
    /// Every output range after the first one of each input range starts on
    /// a chunk boundary.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` is 0.
    fn align_to_chunks(self, chunk_size: u64) -> aligned::AlignedChunkedRanges<Self> {
        aligned::AlignedChunkedRanges::new(self, chunk_size)
    }
}

impl<I: Iterator<Item = Range<u64>>> RangeIteratorsExt for I {}
