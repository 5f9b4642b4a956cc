//! Reader for event-structured summary tables.

use std::{cell::OnceCell, collections::BTreeSet, ops::RangeInclusive, path::Path};

use chunktab_common::{Result, error::Error};
use chunktab_format::{ChunkedStore, ContainerTable, Extent, TableContainer};

use crate::{
    accessor::{ChunkAlignedAccessor, GridView},
    catalog::ColumnCatalog,
    config::ReaderConfig,
    event_index::EventRowIndex,
};

/// Reads a summary table: named columns, chunk-aligned column and block reads,
/// and the event → row range index.
///
/// The column catalog and chunk geometry are read when the reader is created.
/// The event column index and the event row map are resolved on first use and
/// cached for the lifetime of the reader.
///
/// Not designed for concurrent use: block reads share one internal buffer.
pub struct SummaryTableReader<S> {
    accessor: ChunkAlignedAccessor<S>,
    catalog: ColumnCatalog,
    config: ReaderConfig,
    event_column: OnceCell<usize>,
    event_index: OnceCell<EventRowIndex>,
}

impl SummaryTableReader<ContainerTable> {
    /// Opens `config.table` in the container file at `path`.
    pub fn open(
        path: impl AsRef<Path>,
        config: ReaderConfig,
    ) -> Result<SummaryTableReader<ContainerTable>> {
        let container = TableContainer::open(path)?;
        let table = container.open_table(&config.table)?;
        SummaryTableReader::from_store(table, config)
    }
}

impl<S: ChunkedStore> SummaryTableReader<S> {
    pub fn from_store(store: S, config: ReaderConfig) -> Result<SummaryTableReader<S>> {
        let catalog = ColumnCatalog::from_store(&store, &config.column_names_attribute)?;
        let accessor = ChunkAlignedAccessor::new(store);
        log::debug!(
            "summary table '{}': {} rows x {} cols, {} rows per chunk",
            config.table,
            accessor.extent().rows,
            accessor.extent().cols,
            accessor.chunk_rows()
        );
        Ok(SummaryTableReader {
            accessor,
            catalog,
            config,
            event_column: OnceCell::new(),
            event_index: OnceCell::new(),
        })
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    pub fn extent(&self) -> Extent {
        self.accessor.extent()
    }

    pub fn column_names(&self) -> &ColumnCatalog {
        &self.catalog
    }

    pub fn accessor(&self) -> &ChunkAlignedAccessor<S> {
        &self.accessor
    }

    /// Resolves a column name to its index.
    pub fn resolve_column(&self, name: &str) -> Result<usize> {
        self.catalog.resolve(name)
    }

    /// Index of the configured event identifier column.
    pub fn event_column_index(&self) -> Result<usize> {
        if let Some(&index) = self.event_column.get() {
            return Ok(index);
        }
        let index = self.catalog.resolve(&self.config.event_column)?;
        Ok(*self.event_column.get_or_init(|| index))
    }

    /// Index of the first product column: the column right after the event column.
    ///
    /// This is a layout convention of the table producer; only the existence of the
    /// column is checked.
    pub fn product_first_column(&self) -> Result<usize> {
        let event_column = self.event_column_index()?;
        let first = event_column + 1;
        if first as u64 >= self.extent().cols {
            return Err(Error::invalid_format(
                &self.config.event_column,
                "event column is the last column; no product columns follow it",
            ));
        }
        Ok(first)
    }

    /// The event row map, read from the event column on first use.
    pub fn event_index(&self) -> Result<&EventRowIndex> {
        if let Some(index) = self.event_index.get() {
            return Ok(index);
        }
        let index = self.build_event_index()?;
        Ok(self.event_index.get_or_init(|| index))
    }

    /// See [`ChunkAlignedAccessor::column_slice`].
    pub fn column_slice(
        &self,
        column: usize,
        first_row: u64,
        last_row: Option<u64>,
    ) -> Result<Vec<f32>> {
        self.accessor.column_slice(column, first_row, last_row)
    }

    /// See [`ChunkAlignedAccessor::grid_block`]. The returned view is valid until the
    /// next block read through this reader.
    pub fn grid_block(
        &mut self,
        first_row: u64,
        last_row: u64,
        first_col: usize,
        last_col: usize,
    ) -> Result<GridView<'_>> {
        self.accessor
            .grid_block(first_row, last_row, first_col, last_col)
    }

    /// The distinct event identifiers in the table.
    pub fn events(&self) -> Result<BTreeSet<u64>> {
        Ok(self.event_index()?.events())
    }

    /// Inclusive row range of `event`, or `None` if absent.
    ///
    /// See [`event_row_edges`](Self::event_row_edges) for the contiguity precondition.
    pub fn row_range_for_event(&self, event: u64) -> Result<Option<RangeInclusive<u64>>> {
        self.event_index()?.row_range(event)
    }

    /// `(first_row, last_row)` of `event`, `(-1, -1)` if absent.
    ///
    /// The rows of every event must be contiguous. Debug builds cross-check each
    /// lookup against a full scan. Release builds trust the precondition: for an
    /// event split across several runs they return the edges of the run found
    /// first, without an error, unless
    /// [`ReaderConfig::verify_event_contiguity`] is set, in which case the whole
    /// map is checked once when it is built.
    pub fn event_row_edges(&self, event: u64) -> Result<(i64, i64)> {
        self.event_index()?.row_edges(event)
    }

    /// Reads all product columns of the rows belonging to `event`.
    ///
    /// Returns `None` if the event is absent.
    pub fn event_block(&mut self, event: u64) -> Result<Option<GridView<'_>>> {
        let Some(rows) = self.row_range_for_event(event)? else {
            return Ok(None);
        };
        let first_col = self.product_first_column()?;
        let last_col = (self.extent().cols - 1) as usize;
        self.accessor
            .grid_block(*rows.start(), *rows.end(), first_col, last_col)
            .map(Some)
    }

    fn build_event_index(&self) -> Result<EventRowIndex> {
        let column = self.event_column_index()?;
        let values = self.accessor.column_slice(column, 0, None)?;
        let index = EventRowIndex::from_column_values(&values)?;
        if self.config.verify_event_contiguity {
            index.check_contiguity()?;
        }
        log::debug!(
            "event row map: {} rows, first event {:?}, last event {:?}",
            index.len(),
            index.as_slice().first(),
            index.as_slice().last()
        );
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use chunktab_common::error::ErrorKind;
    use chunktab_format::MemoryTable;
    use chunktab_testkit::recording::RecordingStore;

    use super::SummaryTableReader;
    use crate::config::ReaderConfig;

    /// Event column `[5, 5, 5, 7, 7, 9]` followed by three product columns.
    fn scenario_table() -> MemoryTable {
        let events = [5.0f32, 5.0, 5.0, 7.0, 7.0, 9.0];
        let rows: Vec<[f32; 4]> = events
            .iter()
            .enumerate()
            .map(|(r, &e)| [e, r as f32, r as f32 * 2.0, r as f32 * 3.0])
            .collect();
        MemoryTable::from_rows(&rows)
            .unwrap()
            .with_chunk_rows(Some(2))
            .with_column_names("column_names", &["event_id", "x", "y", "z"])
    }

    #[test]
    fn test_event_scenario() {
        let reader = SummaryTableReader::from_store(scenario_table(), ReaderConfig::default())
            .unwrap();
        assert_eq!(reader.event_row_edges(7).unwrap(), (3, 4));
        assert_eq!(reader.event_row_edges(9).unwrap(), (5, 5));
        assert_eq!(reader.event_row_edges(6).unwrap(), (-1, -1));
        assert_eq!(
            reader.events().unwrap().into_iter().collect::<Vec<_>>(),
            vec![5, 7, 9]
        );
        assert_eq!(reader.row_range_for_event(5).unwrap(), Some(0..=2));
        assert_eq!(reader.event_column_index().unwrap(), 0);
        assert_eq!(reader.product_first_column().unwrap(), 1);
        assert_eq!(reader.resolve_column("y").unwrap(), 2);
    }

    #[test]
    fn test_event_map_read_once() {
        let store = RecordingStore::new(scenario_table());
        let reader = SummaryTableReader::from_store(&store, ReaderConfig::default()).unwrap();
        reader.events().unwrap();
        let reads = store.read_count();
        assert_eq!(reads, 3);
        reader.row_range_for_event(7).unwrap();
        reader.event_row_edges(9).unwrap();
        assert_eq!(store.read_count(), reads);
    }

    #[test]
    fn test_event_block() {
        let mut reader =
            SummaryTableReader::from_store(scenario_table(), ReaderConfig::default()).unwrap();
        let block = reader.event_block(7).unwrap().unwrap();
        assert_eq!((block.rows(), block.cols()), (2, 3));
        assert_eq!(block.first_row(), 3);
        assert_eq!(block.first_col(), 1);
        assert_eq!(block.to_vec(), vec![3.0, 6.0, 9.0, 4.0, 8.0, 12.0]);
        assert!(reader.event_block(42).unwrap().is_none());
    }

    #[test]
    fn test_missing_event_column() {
        let reader = SummaryTableReader::from_store(
            scenario_table(),
            ReaderConfig::default().with_event_column("evid"),
        )
        .unwrap();
        assert!(matches!(
            reader.events().unwrap_err().kind(),
            ErrorKind::ColumnNotFound { name } if name == "evid"
        ));
    }

    #[test]
    fn test_event_column_must_not_be_last() {
        let reader = SummaryTableReader::from_store(
            scenario_table(),
            ReaderConfig::default().with_event_column("z"),
        )
        .unwrap();
        assert!(reader.product_first_column().is_err());
    }

    #[test]
    fn test_missing_names_attribute() {
        let result = SummaryTableReader::from_store(
            scenario_table(),
            ReaderConfig::default().with_column_names_attribute("names"),
        );
        assert!(matches!(
            result.err().unwrap().kind(),
            ErrorKind::AttributeNotFound { .. }
        ));
    }

    #[test]
    fn test_contiguity_verification() {
        let rows = [[1.0f32, 0.0], [2.0, 0.0], [1.0, 0.0]];
        let table = MemoryTable::from_rows(&rows)
            .unwrap()
            .with_column_names("column_names", &["event_id", "x"]);
        let reader = SummaryTableReader::from_store(
            table,
            ReaderConfig::default().with_verify_event_contiguity(true),
        )
        .unwrap();
        assert!(matches!(
            reader.events().unwrap_err().kind(),
            ErrorKind::EventRowsNotContiguous { event: 1, .. }
        ));
    }

    #[test]
    fn test_split_event_rejected_when_verifying() {
        let rows = [[5.0f32, 0.0], [7.0, 1.0], [5.0, 2.0], [9.0, 3.0]];
        let table = MemoryTable::from_rows(&rows)
            .unwrap()
            .with_column_names("column_names", &["event_id", "x"]);
        let reader = SummaryTableReader::from_store(
            table,
            ReaderConfig::default().with_verify_event_contiguity(true),
        )
        .unwrap();
        for event in [5, 7, 9] {
            assert!(matches!(
                reader.event_row_edges(event).unwrap_err().kind(),
                ErrorKind::EventRowsNotContiguous { event: 5, .. }
            ));
        }
    }
}
