//! Splits row ranges into pieces of bounded length.

use std::ops::Range;

/// An iterator adapter that bounds the length of every range it yields.
///
/// Each input range is cut into consecutive pieces of `max_len` rows, the last
/// piece carrying whatever remains. Piece boundaries are relative to the start
/// of the input range, not to any global grid, so this adapter is suitable when
/// only the size of a single physical request matters (e.g. when reading one
/// column into a freshly allocated vector).
///
/// Empty input ranges are skipped.
#[derive(Debug, Clone)]
pub struct ChunkedRanges<I>
where
    I: Iterator<Item = Range<u64>>,
{
    inner: I,
    max_len: u64,
    /// Unconsumed part of the range currently being split.
    current: Range<u64>,
}

impl<I> ChunkedRanges<I>
where
    I: Iterator<Item = Range<u64>>,
{
    /// Creates a new `ChunkedRanges` iterator.
    ///
    /// # Panics
    ///
    /// Panics if `max_len` is 0, since no progress could be made.
    pub fn new(inner: I, max_len: u64) -> Self {
        assert_ne!(max_len, 0, "max_len must be greater than 0");
        Self {
            inner,
            max_len,
            current: 0..0,
        }
    }
}

impl<I> Iterator for ChunkedRanges<I>
where
    I: Iterator<Item = Range<u64>>,
{
    type Item = Range<u64>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.current.is_empty() {
            self.current = self.inner.next()?;
        }
        let start = self.current.start;
        let end = start.saturating_add(self.max_len).min(self.current.end);
        self.current.start = end;
        Some(start..end)
    }
}
