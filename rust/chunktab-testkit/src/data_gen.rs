//! Synthetic event-structured tables.

use std::ops::Range;

use chunktab_format::MemoryTable;

/// Parameters of a generated table.
///
/// The table has `leading_cols` filler columns, then the event identifier column,
/// then `product_cols` product columns. Events get between 1 and
/// `max_rows_per_event` rows each, stored contiguously.
#[derive(Debug, Clone)]
pub struct EventTableSpec {
    pub events: usize,
    pub max_rows_per_event: usize,
    pub leading_cols: usize,
    pub product_cols: usize,
    /// Assign event identifiers in a shuffled rather than ascending order.
    pub shuffle_ids: bool,
    pub seed: u64,
}

impl Default for EventTableSpec {
    fn default() -> Self {
        EventTableSpec {
            events: 20,
            max_rows_per_event: 8,
            leading_cols: 0,
            product_cols: 3,
            shuffle_ids: false,
            seed: 7,
        }
    }
}

/// A generated table together with its ground truth.
#[derive(Debug, Clone)]
pub struct GeneratedTable {
    pub column_names: Vec<String>,
    pub cols: usize,
    /// Row-major values.
    pub values: Vec<f32>,
    pub event_column: usize,
    /// Event identifier and half-open row range of every event, in row order.
    pub event_rows: Vec<(u64, Range<u64>)>,
}

impl GeneratedTable {
    pub fn rows(&self) -> u64 {
        (self.values.len() / self.cols) as u64
    }

    pub fn value(&self, row: u64, col: usize) -> f32 {
        self.values[row as usize * self.cols + col]
    }

    /// Row-major values of `rows` × `cols`, read directly from the generated data.
    pub fn rectangle(&self, rows: Range<u64>, cols: Range<usize>) -> Vec<f32> {
        rows.flat_map(|row| cols.clone().map(move |col| (row, col)))
            .map(|(row, col)| self.value(row, col))
            .collect()
    }

    /// Builds an in-memory store over the table, with column names under `attribute`.
    pub fn to_memory_table(&self, chunk_rows: Option<u64>, attribute: &str) -> MemoryTable {
        MemoryTable::new(self.cols as u64, self.values.clone())
            .expect("generated values form whole rows")
            .with_chunk_rows(chunk_rows)
            .with_column_names(attribute, &self.column_names)
    }
}

/// Generates a table according to `spec`, deterministically for a given seed.
pub fn generate_event_table(spec: &EventTableSpec) -> GeneratedTable {
    assert_ne!(spec.max_rows_per_event, 0);
    let mut rng = fastrand::Rng::with_seed(spec.seed);

    let mut ids: Vec<u64> = (0..spec.events as u64).map(|i| 100 + i * 3).collect();
    if spec.shuffle_ids {
        rng.shuffle(&mut ids);
    }

    let mut column_names: Vec<String> = (0..spec.leading_cols).map(|i| format!("lead_{i}")).collect();
    let event_column = column_names.len();
    column_names.push("event_id".to_string());
    column_names.extend((0..spec.product_cols).map(|i| format!("product_{i}")));
    let cols = column_names.len();

    let mut values = Vec::new();
    let mut event_rows = Vec::with_capacity(ids.len());
    let mut row = 0u64;
    for &id in &ids {
        let count = rng.usize(1..=spec.max_rows_per_event) as u64;
        for _ in 0..count {
            for col in 0..cols {
                let value = if col == event_column {
                    id as f32
                } else {
                    // Unique per cell, so misplaced reads are detectable.
                    (row * cols as u64 + col as u64) as f32 + 0.25
                };
                values.push(value);
            }
            row += 1;
        }
        event_rows.push((id, row - count..row));
    }

    GeneratedTable {
        column_names,
        cols,
        values,
        event_column,
        event_rows,
    }
}
