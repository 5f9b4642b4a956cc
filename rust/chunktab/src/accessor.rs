//! Chunk-aligned reads of column slices and rectangular blocks.

use chunktab_common::{Result, error::Error};
use chunktab_format::{ChunkedStore, Extent, Hyperslab, MemShape};
use chunktab_ranges::{RangeIteratorsExt, inclusive_to_range};

/// Reads column slices and rectangular blocks from a [`ChunkedStore`], splitting
/// every request into physical reads that follow the store's row chunking.
///
/// The accessor owns the store and a single read buffer used by
/// [`grid_block`](Self::grid_block). The buffer only ever grows, so repeated
/// block reads of similar size do not allocate.
///
/// The accessor is meant for single-threaded use; the buffer is mutable state
/// shared by successive calls.
pub struct ChunkAlignedAccessor<S> {
    store: S,
    extent: Extent,
    chunk_rows: u64,
    read_buffer: Vec<f32>,
}

impl<S: ChunkedStore> ChunkAlignedAccessor<S> {
    /// Creates an accessor over `store`, capturing its extent and chunk geometry.
    pub fn new(store: S) -> ChunkAlignedAccessor<S> {
        let extent = store.extent();
        let chunk_rows = store.chunk_rows();
        ChunkAlignedAccessor {
            store,
            extent,
            chunk_rows,
            read_buffer: Vec::new(),
        }
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    /// Rows per physical chunk; the full row count for an unchunked store.
    pub fn chunk_rows(&self) -> u64 {
        self.chunk_rows
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Current capacity of the block read buffer, in values.
    pub fn buffer_capacity(&self) -> usize {
        self.read_buffer.capacity()
    }

    /// Reads rows `first_row..=last_row` of one column into a new vector.
    ///
    /// `last_row` defaults to the last row of the table. A range with
    /// `last_row < first_row` yields an empty vector.
    ///
    /// Each physical read covers at most one chunk's worth of rows (capped at
    /// the requested count), counted from `first_row`.
    pub fn column_slice(
        &self,
        column: usize,
        first_row: u64,
        last_row: Option<u64>,
    ) -> Result<Vec<f32>> {
        self.verify_column(column, "column")?;
        let last_row = match last_row {
            Some(last_row) => last_row,
            None if self.extent.rows == 0 => return Ok(Vec::new()),
            None => self.extent.rows - 1,
        };
        if last_row < first_row {
            return Ok(Vec::new());
        }
        self.verify_last_row(first_row, last_row)?;
        let rows = inclusive_to_range(first_row, last_row);

        let count = rows.end - rows.start;
        let mut values = vec![0f32; count as usize];
        let first_row = rows.start;
        for piece in std::iter::once(rows).chunk_ranges(self.chunk_rows.min(count)) {
            let len = piece.end - piece.start;
            let offset = (piece.start - first_row) as usize;
            self.store.read_hyperslab(
                &Hyperslab::column(piece, column as u64),
                MemShape::flat(len),
                &mut values[offset..offset + len as usize],
            )?;
        }
        Ok(values)
    }

    /// Reads the block `first_row..=last_row` × `first_col..=last_col` and returns
    /// a row-major view of it.
    ///
    /// The view borrows the accessor's internal buffer: it is valid only until the
    /// next read through this accessor. Use [`GridView::to_vec`] to retain the data.
    ///
    /// Physical reads are aligned to the store's chunk grid. Every read except
    /// possibly the first starts on a chunk boundary, and none crosses one.
    /// An inverted row or column range yields an empty view.
    pub fn grid_block(
        &mut self,
        first_row: u64,
        last_row: u64,
        first_col: usize,
        last_col: usize,
    ) -> Result<GridView<'_>> {
        if last_row < first_row || last_col < first_col {
            return Ok(GridView::empty(first_row, first_col));
        }
        self.verify_last_row(first_row, last_row)?;
        self.verify_column(last_col, "last_col")?;
        let rows = inclusive_to_range(first_row, last_row);
        let cols = inclusive_to_range(first_col as u64, last_col as u64);

        let row_count = (rows.end - rows.start) as usize;
        let col_count = (cols.end - cols.start) as usize;
        let total = row_count * col_count;
        if self.read_buffer.len() < total {
            self.read_buffer.resize(total, 0.0);
        }

        for piece in std::iter::once(rows).align_to_chunks(self.chunk_rows) {
            let block_rows = piece.end - piece.start;
            let offset = (piece.start - first_row) as usize * col_count;
            let len = block_rows as usize * col_count;
            self.store.read_hyperslab(
                &Hyperslab::new(piece, cols.clone()),
                MemShape::for_block(block_rows, col_count as u64),
                &mut self.read_buffer[offset..offset + len],
            )?;
        }

        Ok(GridView {
            values: &self.read_buffer[..total],
            rows: row_count,
            cols: col_count,
            first_row,
            first_col,
        })
    }

    fn verify_column(&self, column: usize, name: &str) -> Result<()> {
        if column as u64 >= self.extent.cols {
            return Err(Error::invalid_arg(
                name,
                format!("column {column} out of bounds ({} columns)", self.extent.cols),
            ));
        }
        Ok(())
    }

    fn verify_last_row(&self, first_row: u64, last_row: u64) -> Result<()> {
        if last_row >= self.extent.rows {
            return Err(Error::invalid_arg(
                "last_row",
                format!(
                    "rows {first_row}..={last_row} out of bounds ({} rows)",
                    self.extent.rows
                ),
            ));
        }
        Ok(())
    }
}

/// A borrowed, row-major view of the block returned by
/// [`ChunkAlignedAccessor::grid_block`].
#[derive(Debug, Clone, Copy)]
pub struct GridView<'a> {
    values: &'a [f32],
    rows: usize,
    cols: usize,
    first_row: u64,
    first_col: usize,
}

impl<'a> GridView<'a> {
    fn empty(first_row: u64, first_col: usize) -> GridView<'a> {
        GridView {
            values: &[],
            rows: 0,
            cols: 0,
            first_row,
            first_col,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Table row of the first row in the view.
    pub fn first_row(&self) -> u64 {
        self.first_row
    }

    /// Table column of the first column in the view.
    pub fn first_col(&self) -> usize {
        self.first_col
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &'a [f32] {
        self.values
    }

    /// The values of row `index` of the view (not the table row).
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.rows()`. Use [`get`](Self::get) for a checked lookup.
    pub fn row(&self, index: usize) -> &'a [f32] {
        &self.values[index * self.cols..(index + 1) * self.cols]
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row < self.rows && col < self.cols {
            Some(self.values[row * self.cols + col])
        } else {
            None
        }
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &'a [f32]> + use<'a> {
        let cols = self.cols.max(1);
        self.values.chunks_exact(cols)
    }

    pub fn to_vec(&self) -> Vec<f32> {
        self.values.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use chunktab_format::{Hyperslab, MemShape, MemoryTable};
    use chunktab_testkit::recording::RecordingStore;

    use super::ChunkAlignedAccessor;

    /// 6 rows x 4 columns; value = row * 10 + col.
    fn table(chunk_rows: Option<u64>) -> MemoryTable {
        let values = (0..6)
            .flat_map(|r| (0..4).map(move |c| (r * 10 + c) as f32))
            .collect();
        MemoryTable::new(4, values)
            .unwrap()
            .with_chunk_rows(chunk_rows)
    }

    #[test]
    fn test_column_slice_matches_table() {
        let t = table(Some(2));
        let accessor = ChunkAlignedAccessor::new(&t);
        for col in 0..4 {
            for first in 0..6u64 {
                for last in first..6u64 {
                    let values = accessor.column_slice(col, first, Some(last)).unwrap();
                    let expected: Vec<f32> =
                        (first..=last).map(|r| t.value(r, col as u64)).collect();
                    assert_eq!(values, expected);
                }
            }
        }
    }

    #[test]
    fn test_column_slice_default_last_row() {
        let t = table(Some(4));
        let accessor = ChunkAlignedAccessor::new(&t);
        assert_eq!(
            accessor.column_slice(2, 1, None).unwrap(),
            accessor.column_slice(2, 1, Some(5)).unwrap()
        );
    }

    #[test]
    fn test_column_slice_empty_range() {
        let t = table(Some(2));
        let accessor = ChunkAlignedAccessor::new(&t);
        for col in 0..4 {
            for row in 1..6 {
                assert!(accessor.column_slice(col, row, Some(row - 1)).unwrap().is_empty());
            }
        }
    }

    #[test]
    fn test_column_slice_piece_sizes() {
        let store = RecordingStore::new(table(Some(4)));
        let accessor = ChunkAlignedAccessor::new(&store);
        accessor.column_slice(1, 1, Some(5)).unwrap();
        let reads = store.reads();
        let rows: Vec<_> = reads.iter().map(|r| r.slab.rows.clone()).collect();
        assert_eq!(rows, vec![1..5, 5..6]);
        assert!(reads.iter().all(|r| r.slab.cols == (1..2)));
        assert_eq!(reads[0].mem, MemShape::flat(4));

        // Chunk size is capped at the requested row count.
        store.clear();
        accessor.column_slice(1, 2, Some(3)).unwrap();
        assert_eq!(store.reads()[0].slab, Hyperslab::column(2..4, 1));
    }

    #[test]
    fn test_column_slice_out_of_bounds() {
        let t = table(None);
        let accessor = ChunkAlignedAccessor::new(&t);
        assert!(accessor.column_slice(4, 0, None).is_err());
        assert!(accessor.column_slice(0, 0, Some(6)).is_err());
    }

    #[test]
    fn test_last_index_at_type_limit_is_rejected() {
        let t = MemoryTable::new(2, (0..8).map(|v| v as f32).collect())
            .unwrap()
            .with_chunk_rows(Some(2));
        let mut accessor = ChunkAlignedAccessor::new(&t);
        assert!(accessor.column_slice(0, 0, Some(u64::MAX)).is_err());
        assert!(accessor.column_slice(1, u64::MAX, Some(u64::MAX)).is_err());
        assert!(accessor.grid_block(0, u64::MAX, 0, 1).is_err());
        assert!(accessor.grid_block(0, 1, 0, usize::MAX).is_err());
    }

    #[test]
    fn test_grid_block_alignment() {
        let store = RecordingStore::new(table(Some(2)));
        let mut accessor = ChunkAlignedAccessor::new(&store);
        let view = accessor.grid_block(1, 4, 1, 3).unwrap();
        assert_eq!((view.rows(), view.cols()), (4, 3));
        assert_eq!(view.row(0), &[11.0, 12.0, 13.0]);
        assert_eq!(view.row(3), &[41.0, 42.0, 43.0]);
        assert_eq!(view.get(2, 2), Some(33.0));
        assert_eq!(view.get(4, 0), None);

        let reads = store.reads();
        let rows: Vec<_> = reads.iter().map(|r| r.slab.rows.clone()).collect();
        assert_eq!(rows, vec![1..2, 2..4, 4..5]);
        assert_eq!(reads[0].mem, MemShape::flat(3));
        assert_eq!(reads[1].mem, MemShape::grid(2, 3));
        assert_eq!(reads[2].mem, MemShape::flat(3));
    }

    #[test]
    fn test_grid_block_single_column_shape() {
        let store = RecordingStore::new(table(Some(3)));
        let mut accessor = ChunkAlignedAccessor::new(&store);
        let view = accessor.grid_block(0, 5, 2, 2).unwrap();
        assert_eq!(view.to_vec(), vec![2.0, 12.0, 22.0, 32.0, 42.0, 52.0]);
        assert!(store.reads().iter().all(|r| r.mem == MemShape::flat(3)));
    }

    #[test]
    fn test_grid_block_buffer_reuse() {
        let t = table(Some(2));
        let mut accessor = ChunkAlignedAccessor::new(&t);
        let large = accessor.grid_block(0, 5, 0, 3).unwrap().to_vec();
        assert_eq!(large.len(), 24);
        let capacity = accessor.buffer_capacity();
        assert!(capacity >= 24);

        let small = accessor.grid_block(3, 4, 2, 3).unwrap().to_vec();
        assert_eq!(small, vec![32.0, 33.0, 42.0, 43.0]);
        assert_eq!(accessor.buffer_capacity(), capacity);

        let again = accessor.grid_block(3, 4, 2, 3).unwrap().to_vec();
        assert_eq!(again, small);
    }

    #[test]
    fn test_grid_block_empty_and_invalid() {
        let t = table(Some(2));
        let mut accessor = ChunkAlignedAccessor::new(&t);
        assert!(accessor.grid_block(3, 2, 0, 1).unwrap().is_empty());
        assert!(accessor.grid_block(0, 1, 2, 1).unwrap().is_empty());
        assert!(accessor.grid_block(0, 6, 0, 1).is_err());
        assert!(accessor.grid_block(0, 1, 0, 4).is_err());
    }

    #[test]
    fn test_unchunked_store_reads_once() {
        let store = RecordingStore::new(table(None));
        let mut accessor = ChunkAlignedAccessor::new(&store);
        assert_eq!(accessor.chunk_rows(), 6);
        accessor.grid_block(1, 4, 0, 3).unwrap();
        assert_eq!(store.read_count(), 1);
        store.clear();
        accessor.column_slice(0, 0, None).unwrap();
        assert_eq!(store.read_count(), 1);
    }
}
