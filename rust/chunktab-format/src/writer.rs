//! Writing tables into a single-file container.

use std::{collections::BTreeMap, path::Path};

use chunktab_common::{Result, error::Error, verify_arg};
use chunktab_io::{FileWriter, SealingWrite};

use crate::{
    compression::Compression,
    directory::{
        ChunkLocation, ContainerDirectory, FORMAT_VERSION, Footer, HEADER_SIZE, TableDescriptor,
        encode_header,
    },
    store::AttributeValue,
};

/// Physical layout of a table being written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableLayout {
    pub cols: u64,
    /// Rows per chunk, or `None` to store the table as a single chunk.
    pub chunk_rows: Option<u64>,
    pub compression: Compression,
}

impl TableLayout {
    pub fn unchunked(cols: u64) -> TableLayout {
        TableLayout {
            cols,
            chunk_rows: None,
            compression: Compression::None,
        }
    }

    pub fn chunked(cols: u64, chunk_rows: u64) -> TableLayout {
        TableLayout {
            cols,
            chunk_rows: Some(chunk_rows),
            compression: Compression::None,
        }
    }

    pub fn with_compression(mut self, compression: Compression) -> TableLayout {
        self.compression = compression;
        self
    }
}

/// Writes a table container: header, chunk payloads, then directory and footer
/// on [`finish`](ContainerWriter::finish).
pub struct ContainerWriter<W: SealingWrite> {
    writer: W,
    position: u64,
    directory: ContainerDirectory,
}

impl ContainerWriter<FileWriter> {
    /// Creates a new container file; fails if `path` already exists.
    pub fn create(path: impl AsRef<Path>) -> Result<ContainerWriter<FileWriter>> {
        let path = path.as_ref();
        let file = FileWriter::create(path).map_err(|e| Error::io(path.display().to_string(), e))?;
        ContainerWriter::new(file)
    }
}

impl<W: SealingWrite> ContainerWriter<W> {
    pub fn new(mut writer: W) -> Result<ContainerWriter<W>> {
        writer.write_all(&encode_header())?;
        Ok(ContainerWriter {
            writer,
            position: HEADER_SIZE,
            directory: ContainerDirectory {
                version: FORMAT_VERSION,
                tables: BTreeMap::new(),
            },
        })
    }

    /// Appends a table with row-major `values` to the container.
    pub fn add_table(
        &mut self,
        name: &str,
        layout: &TableLayout,
        values: &[f32],
        attributes: BTreeMap<String, AttributeValue>,
    ) -> Result<()> {
        verify_arg!(layout, layout.cols > 0);
        verify_arg!(layout, layout.chunk_rows != Some(0));
        verify_arg!(values, values.len() as u64 % layout.cols == 0);
        if self.directory.tables.contains_key(name) {
            return Err(Error::invalid_arg(
                "name",
                format!("table '{name}' already written"),
            ));
        }

        let rows = values.len() as u64 / layout.cols;
        let chunk_rows = layout.chunk_rows.unwrap_or(rows).max(1);
        let chunk_len = (chunk_rows * layout.cols) as usize;
        let mut chunks = Vec::new();
        for chunk in values.chunks(chunk_len.max(1)) {
            let raw: Vec<u8> = chunk.iter().flat_map(|v| v.to_le_bytes()).collect();
            let payload = layout.compression.encode(raw)?;
            chunks.push(ChunkLocation {
                offset: self.position,
                len: payload.len() as u64,
                rows: chunk.len() as u64 / layout.cols,
            });
            self.write(&payload)?;
        }

        log::debug!(
            "wrote table '{}': {} rows x {} cols in {} chunk(s)",
            name,
            rows,
            layout.cols,
            chunks.len()
        );
        self.directory.tables.insert(
            name.to_string(),
            TableDescriptor {
                rows,
                cols: layout.cols,
                chunk_rows: layout.chunk_rows,
                compression: layout.compression,
                chunks,
                attributes,
            },
        );
        Ok(())
    }

    /// Writes the directory and footer, seals the underlying writer and returns it.
    pub fn finish(mut self) -> Result<W> {
        let directory = serde_json::to_vec(&self.directory)
            .map_err(|e| Error::serialization("container directory", e))?;
        let footer = Footer {
            directory_offset: self.position,
            directory_len: directory.len() as u64,
        };
        self.write(&directory)?;
        self.write(&footer.encode())?;
        self.writer.seal()?;
        Ok(self.writer)
    }

    fn write(&mut self, buf: &[u8]) -> Result<()> {
        self.writer.write_all(buf)?;
        self.position += buf.len() as u64;
        Ok(())
    }
}
