use std::collections::BTreeMap;

use chunktab_common::{Result, error::ErrorKind, verify_arg};

use crate::store::{
    AttributeValue, ChunkedStore, Extent, Hyperslab, MemShape, verify_read_request,
};

/// An in-memory table holding its values in row-major order.
///
/// Chunking is purely nominal here: `row_chunking` reports whatever was configured,
/// which lets tests exercise chunk-aware readers without touching disk.
#[derive(Debug, Clone)]
pub struct MemoryTable {
    extent: Extent,
    values: Vec<f32>,
    chunk_rows: Option<u64>,
    attributes: BTreeMap<String, AttributeValue>,
}

impl MemoryTable {
    /// Creates an unchunked table with `cols` columns from row-major `values`.
    pub fn new(cols: u64, values: Vec<f32>) -> Result<MemoryTable> {
        verify_arg!(cols, cols > 0);
        verify_arg!(values, values.len() as u64 % cols == 0);
        let rows = values.len() as u64 / cols;
        Ok(MemoryTable {
            extent: Extent::new(rows, cols),
            values,
            chunk_rows: None,
            attributes: BTreeMap::new(),
        })
    }

    /// Creates a table from a list of equally sized rows.
    pub fn from_rows<R: AsRef<[f32]>>(rows: &[R]) -> Result<MemoryTable> {
        let cols = rows.first().map_or(0, |row| row.as_ref().len());
        verify_arg!(rows, rows.iter().all(|row| row.as_ref().len() == cols));
        let values = rows
            .iter()
            .flat_map(|row| row.as_ref().iter().copied())
            .collect();
        MemoryTable::new(cols as u64, values)
    }

    pub fn with_chunk_rows(mut self, chunk_rows: Option<u64>) -> MemoryTable {
        self.chunk_rows = chunk_rows;
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: AttributeValue) -> MemoryTable {
        self.attributes.insert(name.into(), value);
        self
    }

    pub fn with_column_names<S: AsRef<str>>(self, attribute: &str, names: &[S]) -> MemoryTable {
        let names = names.iter().map(|n| n.as_ref().to_string()).collect();
        self.with_attribute(attribute, AttributeValue::StringArray(names))
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn value(&self, row: u64, col: u64) -> f32 {
        self.values[(row * self.extent.cols + col) as usize]
    }
}

impl ChunkedStore for MemoryTable {
    fn extent(&self) -> Extent {
        self.extent
    }

    fn row_chunking(&self) -> Option<u64> {
        self.chunk_rows
    }

    fn read_hyperslab(&self, slab: &Hyperslab, mem: MemShape, dest: &mut [f32]) -> Result<()> {
        verify_read_request(self.extent, slab, mem, dest.len())?;
        let width = slab.col_count() as usize;
        if width == 0 {
            return Ok(());
        }
        let table_cols = self.extent.cols as usize;
        for (row, out) in slab.rows.clone().zip(dest.chunks_exact_mut(width)) {
            let start = row as usize * table_cols + slab.cols.start as usize;
            out.copy_from_slice(&self.values[start..start + width]);
        }
        Ok(())
    }

    fn read_string_array_attribute(&self, name: &str) -> Result<Vec<String>> {
        let value = self
            .attributes
            .get(name)
            .cloned()
            .ok_or_else(|| ErrorKind::AttributeNotFound {
                name: name.to_string(),
            })?;
        value.into_string_array(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> MemoryTable {
        let values = (0..24).map(|v| v as f32).collect();
        MemoryTable::new(4, values)
            .unwrap()
            .with_chunk_rows(Some(2))
            .with_column_names("column_names", &["a", "b", "c", "d"])
    }

    #[test]
    fn test_extent_and_chunking() {
        let t = table();
        assert_eq!(t.extent(), Extent::new(6, 4));
        assert_eq!(t.row_chunking(), Some(2));
        assert_eq!(t.chunk_rows(), 2);
        assert_eq!(t.clone().with_chunk_rows(None).chunk_rows(), 6);
    }

    #[test]
    fn test_read_rectangle() {
        let t = table();
        let mut dest = vec![0.0; 8];
        t.read_hyperslab(&Hyperslab::new(1..3, 1..4), MemShape::grid(2, 3), &mut dest)
            .unwrap();
        assert_eq!(&dest[..6], &[5.0, 6.0, 7.0, 9.0, 10.0, 11.0]);
        assert_eq!(&dest[6..], &[0.0, 0.0]);
    }

    #[test]
    fn test_read_column() {
        let t = table();
        let mut dest = vec![0.0; 3];
        t.read_hyperslab(&Hyperslab::column(3..6, 2), MemShape::flat(3), &mut dest)
            .unwrap();
        assert_eq!(dest, vec![14.0, 18.0, 22.0]);
    }

    #[test]
    fn test_out_of_range_fails() {
        let t = table();
        let mut dest = vec![0.0; 4];
        assert!(
            t.read_hyperslab(&Hyperslab::new(5..7, 0..2), MemShape::grid(2, 2), &mut dest)
                .is_err()
        );
    }

    #[test]
    fn test_attributes() {
        let t = table().with_attribute("version", AttributeValue::Int(2));
        assert_eq!(t.read_string_array_attribute("column_names").unwrap().len(), 4);
        assert!(matches!(
            t.read_string_array_attribute("missing").unwrap_err().kind(),
            ErrorKind::AttributeNotFound { .. }
        ));
        assert!(matches!(
            t.read_string_array_attribute("version").unwrap_err().kind(),
            ErrorKind::AttributeType { .. }
        ));
    }

    #[test]
    fn test_from_rows() {
        let t = MemoryTable::from_rows(&[[1.0f32, 2.0], [3.0, 4.0]]).unwrap();
        assert_eq!(t.extent(), Extent::new(2, 2));
        assert_eq!(t.value(1, 0), 3.0);
        assert!(MemoryTable::from_rows(&[vec![1.0f32], vec![1.0, 2.0]]).is_err());
    }
}
