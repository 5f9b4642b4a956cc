//! Reading tables from a single-file container.

use std::{ops::Range, path::Path, sync::Arc};

use chunktab_common::{
    Result,
    error::{Error, ErrorKind},
    verify_data,
};
use chunktab_io::{FileReader, ReadAt};

use crate::{
    directory::{
        ContainerDirectory, FOOTER_SIZE, Footer, HEADER_SIZE, TableDescriptor, decode_header,
    },
    store::{ChunkedStore, Extent, Hyperslab, MemShape, verify_read_request},
};

const VALUE_SIZE: u64 = std::mem::size_of::<f32>() as u64;

/// An opened container holding one or more named tables.
pub struct TableContainer {
    reader: Arc<dyn ReadAt>,
    directory: ContainerDirectory,
}

impl TableContainer {
    /// Opens the container file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<TableContainer> {
        let path = path.as_ref();
        let reader =
            FileReader::open(path).map_err(|e| Error::io(path.display().to_string(), e))?;
        TableContainer::from_reader(Arc::new(reader))
    }

    /// Opens a container over an arbitrary positional reader.
    pub fn from_reader(reader: Arc<dyn ReadAt>) -> Result<TableContainer> {
        let size = reader.size()?;
        verify_data!(container_size, size >= HEADER_SIZE + FOOTER_SIZE);

        let header = read_exact(reader.as_ref(), 0..HEADER_SIZE, "container header")?;
        decode_header(&header)?;

        let footer = read_exact(
            reader.as_ref(),
            size - FOOTER_SIZE..size,
            "container footer",
        )?;
        let footer = Footer::decode(&footer)?;
        let directory_end = footer
            .directory_offset
            .checked_add(footer.directory_len)
            .ok_or_else(|| Error::invalid_format("footer", "directory range overflows"))?;
        verify_data!(
            footer,
            footer.directory_offset >= HEADER_SIZE && directory_end <= size - FOOTER_SIZE
        );

        let directory_bytes = read_exact(
            reader.as_ref(),
            footer.directory_offset..directory_end,
            "container directory",
        )?;
        let directory: ContainerDirectory = serde_json::from_slice(&directory_bytes)
            .map_err(|e| Error::serialization("container directory", e))?;
        for (name, table) in &directory.tables {
            table.validate(name, size)?;
        }
        log::debug!(
            "opened table container: {} bytes, {} table(s)",
            size,
            directory.tables.len()
        );
        Ok(TableContainer { reader, directory })
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.directory.tables.keys().map(String::as_str)
    }

    pub fn directory(&self) -> &ContainerDirectory {
        &self.directory
    }

    /// Opens the named table; fails with `TableNotFound` if the container has no such table.
    pub fn open_table(&self, name: &str) -> Result<ContainerTable> {
        let descriptor =
            self.directory
                .tables
                .get(name)
                .cloned()
                .ok_or_else(|| ErrorKind::TableNotFound {
                    table: name.to_string(),
                })?;
        log::debug!(
            "opened table '{}': {} rows x {} cols, chunk rows {:?}, {:?}",
            name,
            descriptor.rows,
            descriptor.cols,
            descriptor.chunk_rows,
            descriptor.compression
        );
        Ok(ContainerTable {
            name: name.to_string(),
            reader: self.reader.clone(),
            descriptor,
        })
    }
}

/// One table of a [`TableContainer`], readable through [`ChunkedStore`].
///
/// Every hyperslab read decodes each chunk it touches in full, so requests
/// that stay within one chunk are the cheapest.
pub struct ContainerTable {
    name: String,
    reader: Arc<dyn ReadAt>,
    descriptor: TableDescriptor,
}

impl ContainerTable {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn descriptor(&self) -> &TableDescriptor {
        &self.descriptor
    }

    /// Reads and decodes the chunk at `index` into its raw little-endian bytes.
    fn read_chunk(&self, index: usize) -> Result<Vec<u8>> {
        let location = self.descriptor.chunks[index];
        let payload = self
            .reader
            .read_at(location.offset..location.offset + location.len)
            .map_err(|e| Error::io(format!("{} chunk {index}", self.name), e))?;
        if payload.len() as u64 != location.len {
            return Err(Error::short_read(
                format!("{} chunk {index}", self.name),
                location.len,
                payload.len() as u64,
            ));
        }
        let raw_len = location.rows * self.descriptor.cols * VALUE_SIZE;
        self.descriptor
            .compression
            .decode(payload, raw_len as usize)
    }
}

impl ChunkedStore for ContainerTable {
    fn extent(&self) -> Extent {
        Extent::new(self.descriptor.rows, self.descriptor.cols)
    }

    fn row_chunking(&self) -> Option<u64> {
        self.descriptor.chunk_rows
    }

    fn read_hyperslab(&self, slab: &Hyperslab, mem: MemShape, dest: &mut [f32]) -> Result<()> {
        verify_read_request(self.extent(), slab, mem, dest.len())?;
        log::trace!(
            "{}: read rows {:?} cols {:?} into {:?}",
            self.name,
            slab.rows,
            slab.cols,
            mem.dims()
        );
        if slab.is_empty() {
            return Ok(());
        }

        let chunk_rows = self.descriptor.effective_chunk_rows();
        let table_cols = self.descriptor.cols as usize;
        let width = slab.col_count() as usize;
        let first_chunk = slab.rows.start / chunk_rows;
        let last_chunk = (slab.rows.end - 1) / chunk_rows;

        for chunk_index in first_chunk..=last_chunk {
            let raw = self.read_chunk(chunk_index as usize)?;
            let chunk_first_row = chunk_index * chunk_rows;
            let rows = slab.rows.start.max(chunk_first_row)
                ..slab.rows.end.min(chunk_first_row + chunk_rows);
            for row in rows {
                let src_row = (row - chunk_first_row) as usize;
                let dest_row = (row - slab.rows.start) as usize;
                let out = &mut dest[dest_row * width..(dest_row + 1) * width];
                let src_start = (src_row * table_cols + slab.cols.start as usize) * 4;
                let src = &raw[src_start..src_start + width * 4];
                for (value, bytes) in out.iter_mut().zip(src.chunks_exact(4)) {
                    *value = f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
                }
            }
        }
        Ok(())
    }

    fn read_string_array_attribute(&self, name: &str) -> Result<Vec<String>> {
        let value = self
            .descriptor
            .attributes
            .get(name)
            .cloned()
            .ok_or_else(|| ErrorKind::AttributeNotFound {
                name: name.to_string(),
            })?;
        value.into_string_array(name)
    }
}

fn read_exact(reader: &dyn ReadAt, range: Range<u64>, context: &str) -> Result<Vec<u8>> {
    let expected = range.end - range.start;
    let buf = reader
        .read_at(range)
        .map_err(|e| Error::io(context, e))?;
    if buf.len() as u64 != expected {
        return Err(Error::short_read(context, expected, buf.len() as u64));
    }
    Ok(buf)
}
