//! The chunked store abstraction and the request types it operates on.

use std::ops::Range;

use chunktab_common::{Result, error::Error, error::ErrorKind, verify_arg};
use serde::{Deserialize, Serialize};

/// Dimensions of a table: number of rows and number of columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Extent {
    pub rows: u64,
    pub cols: u64,
}

impl Extent {
    pub fn new(rows: u64, cols: u64) -> Extent {
        Extent { rows, cols }
    }

    /// Total number of values in the table.
    pub fn len(&self) -> u64 {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A row-range × column-range sub-selection of a table; the unit of a physical read.
///
/// Both ranges are half-open.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Hyperslab {
    pub rows: Range<u64>,
    pub cols: Range<u64>,
}

impl Hyperslab {
    pub fn new(rows: Range<u64>, cols: Range<u64>) -> Hyperslab {
        Hyperslab { rows, cols }
    }

    /// A single-column slab.
    pub fn column(rows: Range<u64>, col: u64) -> Hyperslab {
        Hyperslab {
            rows,
            cols: col..col + 1,
        }
    }

    pub fn row_count(&self) -> u64 {
        self.rows.end.saturating_sub(self.rows.start)
    }

    pub fn col_count(&self) -> u64 {
        self.cols.end.saturating_sub(self.cols.start)
    }

    /// Number of values covered by the slab.
    pub fn len(&self) -> u64 {
        self.row_count() * self.col_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fails with `InvalidArgument` unless the slab is non-inverted and lies
    /// entirely within `extent`.
    pub fn verify_within(&self, extent: Extent) -> Result<()> {
        verify_arg!(rows, self.rows.start <= self.rows.end);
        verify_arg!(cols, self.cols.start <= self.cols.end);
        if self.rows.end > extent.rows || self.cols.end > extent.cols {
            return Err(Error::invalid_arg(
                "hyperslab",
                format!(
                    "rows {:?} x cols {:?} out of bounds for {} x {} table",
                    self.rows, self.cols, extent.rows, extent.cols
                ),
            ));
        }
        Ok(())
    }
}

/// Shape of the destination memory region for one physical read.
///
/// Either rank 1 (a flat run of values) or rank 2 (rows × columns, row-major).
/// The dimensions live inline, so selecting a shape per request never allocates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemShape {
    dims: [u64; 2],
    rank: usize,
}

impl MemShape {
    pub fn flat(len: u64) -> MemShape {
        MemShape {
            dims: [len, 1],
            rank: 1,
        }
    }

    pub fn grid(rows: u64, cols: u64) -> MemShape {
        MemShape {
            dims: [rows, cols],
            rank: 2,
        }
    }

    /// Selects the shape matching a `rows` × `cols` block.
    ///
    /// A block that is a single row or a single column degenerates to a flat
    /// shape; anything else is a rank-2 grid.
    pub fn for_block(rows: u64, cols: u64) -> MemShape {
        if rows == 1 {
            MemShape::flat(cols)
        } else if cols == 1 {
            MemShape::flat(rows)
        } else {
            MemShape::grid(rows, cols)
        }
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn dims(&self) -> &[u64] {
        &self.dims[..self.rank]
    }

    /// Number of values the shape describes.
    pub fn len(&self) -> u64 {
        self.dims().iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A typed attribute attached to a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AttributeValue {
    StringArray(Vec<String>),
    String(String),
    Int(i64),
    Float(f64),
}

impl AttributeValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            AttributeValue::StringArray(_) => "string_array",
            AttributeValue::String(_) => "string",
            AttributeValue::Int(_) => "int",
            AttributeValue::Float(_) => "float",
        }
    }

    /// Unwraps a string-array attribute, failing with `AttributeType` for any other type.
    pub fn into_string_array(self, name: &str) -> Result<Vec<String>> {
        match self {
            AttributeValue::StringArray(values) => Ok(values),
            other => Err(ErrorKind::AttributeType {
                name: name.to_string(),
                found: other.type_name().to_string(),
            }
            .into()),
        }
    }
}

impl From<Vec<String>> for AttributeValue {
    fn from(values: Vec<String>) -> Self {
        AttributeValue::StringArray(values)
    }
}

impl From<&[&str]> for AttributeValue {
    fn from(values: &[&str]) -> Self {
        AttributeValue::StringArray(values.iter().map(|s| s.to_string()).collect())
    }
}

/// A read-only two-dimensional `f32` table whose rows are physically stored
/// in fixed-size chunks.
///
/// Implementations are not required to be thread-safe: readers own their store
/// exclusively and issue one request at a time.
pub trait ChunkedStore {
    /// Number of rows and columns.
    fn extent(&self) -> Extent;

    /// Number of rows per physical chunk, or `None` for an unchunked layout.
    fn row_chunking(&self) -> Option<u64>;

    /// Reads `slab` into the first `mem.len()` elements of `dest`, row-major.
    ///
    /// `mem` describes the destination shape and must cover exactly as many values
    /// as `slab`. On error, the contents of `dest` are unspecified.
    fn read_hyperslab(&self, slab: &Hyperslab, mem: MemShape, dest: &mut [f32]) -> Result<()>;

    /// Reads a string-array attribute of the table.
    ///
    /// Fails with `AttributeNotFound` if absent, or `AttributeType` if the
    /// attribute has another type.
    fn read_string_array_attribute(&self, name: &str) -> Result<Vec<String>>;

    /// Effective rows-per-chunk: the store's chunk size, or the whole table for an
    /// unchunked layout. Never zero.
    fn chunk_rows(&self) -> u64 {
        self.row_chunking()
            .filter(|&rows| rows != 0)
            .unwrap_or_else(|| self.extent().rows)
            .max(1)
    }
}

impl<S: ChunkedStore + ?Sized> ChunkedStore for &S {
    fn extent(&self) -> Extent {
        (**self).extent()
    }

    fn row_chunking(&self) -> Option<u64> {
        (**self).row_chunking()
    }

    fn read_hyperslab(&self, slab: &Hyperslab, mem: MemShape, dest: &mut [f32]) -> Result<()> {
        (**self).read_hyperslab(slab, mem, dest)
    }

    fn read_string_array_attribute(&self, name: &str) -> Result<Vec<String>> {
        (**self).read_string_array_attribute(name)
    }
}

impl<S: ChunkedStore + ?Sized> ChunkedStore for Box<S> {
    fn extent(&self) -> Extent {
        self.as_ref().extent()
    }

    fn row_chunking(&self) -> Option<u64> {
        self.as_ref().row_chunking()
    }

    fn read_hyperslab(&self, slab: &Hyperslab, mem: MemShape, dest: &mut [f32]) -> Result<()> {
        self.as_ref().read_hyperslab(slab, mem, dest)
    }

    fn read_string_array_attribute(&self, name: &str) -> Result<Vec<String>> {
        self.as_ref().read_string_array_attribute(name)
    }
}

/// Validates a read request against the table extent and the destination buffer.
///
/// Shared by the store implementations before they touch any data.
pub fn verify_read_request(
    extent: Extent,
    slab: &Hyperslab,
    mem: MemShape,
    dest_len: usize,
) -> Result<()> {
    slab.verify_within(extent)?;
    if mem.len() != slab.len() {
        return Err(Error::invalid_arg(
            "mem",
            format!(
                "memory shape {:?} holds {} values, hyperslab holds {}",
                mem.dims(),
                mem.len(),
                slab.len()
            ),
        ));
    }
    if (dest_len as u64) < mem.len() {
        return Err(Error::invalid_arg(
            "dest",
            format!("destination holds {dest_len} values, {} required", mem.len()),
        ));
    }
    Ok(())
}
