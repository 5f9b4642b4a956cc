//! Splits row ranges along a fixed chunk grid.

use std::ops::Range;

/// An iterator adapter that splits ranges at every multiple of `chunk_size`.
///
/// For an input range `start..end`, the k-th output piece begins at
/// `max(start, (start / chunk_size + k) * chunk_size)` and extends to the end of
/// that aligned chunk or to `end`, whichever comes first. Iteration over the
/// input range stops once the computed start reaches `end`.
///
/// As a consequence:
/// - every piece except possibly the first begins on a chunk boundary;
/// - no piece spans more than one chunk.
///
/// Empty input ranges are skipped.
#[derive(Debug, Clone)]
pub struct AlignedChunkedRanges<I>
where
    I: Iterator<Item = Range<u64>>,
{
    inner: I,
    chunk_size: u64,
    current: Range<u64>,
    /// Index of the next aligned chunk, counted from the chunk holding `current.start`
    /// at the time the range was taken from `inner`.
    chunk_idx: u64,
    /// Chunk index of the first row of the range being split.
    base_chunk: u64,
}

impl<I> AlignedChunkedRanges<I>
where
    I: Iterator<Item = Range<u64>>,
{
    /// Creates a new `AlignedChunkedRanges` iterator.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` is 0.
    pub fn new(inner: I, chunk_size: u64) -> Self {
        assert_ne!(chunk_size, 0, "chunk_size must be greater than 0");
        Self {
            inner,
            chunk_size,
            current: 0..0,
            chunk_idx: 0,
            base_chunk: 0,
        }
    }

    fn take_next_range(&mut self) -> Option<()> {
        loop {
            let range = self.inner.next()?;
            if !range.is_empty() {
                self.base_chunk = range.start / self.chunk_size;
                self.chunk_idx = 0;
                self.current = range;
                return Some(());
            }
        }
    }
}

impl<I> Iterator for AlignedChunkedRanges<I>
where
    I: Iterator<Item = Range<u64>>,
{
    type Item = Range<u64>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if !self.current.is_empty() {
                let aligned_start = (self.base_chunk + self.chunk_idx) * self.chunk_size;
                let first = self.current.start.max(aligned_start);
                if first < self.current.end {
                    let chunk_end = (first / self.chunk_size + 1) * self.chunk_size;
                    let end = chunk_end.min(self.current.end);
                    self.chunk_idx += 1;
                    return Some(first..end);
                }
                self.current = 0..0;
            }
            self.take_next_range()?;
        }
    }
}
