//! Container directory and footer.
//!
//! A container file is laid out as follows:
//!
//! ```text
//! ┌────────┬─────────┬──────────────────────┬──────────────────┬──────────────────────────────┐
//! │ "CTAB" │ version │ chunk payloads       │ directory (JSON) │ footer: dir_off, dir_len, "CTAB" │
//! └────────┴─────────┴──────────────────────┴──────────────────┴──────────────────────────────┘
//! ```
//!
//! All integers are little-endian. The directory describes every table in the
//! container: its extent, chunking, compression, the location of each chunk
//! payload, and the table attributes.

use std::collections::BTreeMap;

use chunktab_common::{Result, error::Error, verify_data};
use serde::{Deserialize, Serialize};

use crate::{compression::Compression, store::AttributeValue};

pub const MAGIC: &[u8; 4] = b"CTAB";
pub const FORMAT_VERSION: u32 = 1;
pub const HEADER_SIZE: u64 = 8;
pub const FOOTER_SIZE: u64 = 20;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContainerDirectory {
    pub version: u32,
    pub tables: BTreeMap<String, TableDescriptor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub rows: u64,
    pub cols: u64,
    /// Rows per chunk; absent for an unchunked table (a single chunk holding all rows).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_rows: Option<u64>,
    #[serde(default)]
    pub compression: Compression,
    pub chunks: Vec<ChunkLocation>,
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeValue>,
}

/// Location of one chunk payload within the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkLocation {
    pub offset: u64,
    pub len: u64,
    /// Number of table rows held by the chunk.
    pub rows: u64,
}

impl TableDescriptor {
    /// Rows per chunk as used for addressing: the whole table when unchunked.
    pub fn effective_chunk_rows(&self) -> u64 {
        self.chunk_rows.unwrap_or(self.rows).max(1)
    }

    /// Checks that the chunk list is consistent with the extent and chunking.
    pub fn validate(&self, name: &str, container_size: u64) -> Result<()> {
        verify_data!(chunk_rows, self.chunk_rows != Some(0));
        let chunk_rows = self.effective_chunk_rows();
        let expected_chunks = self.rows.div_ceil(chunk_rows);
        if self.chunks.len() as u64 != expected_chunks {
            return Err(Error::invalid_format(
                name,
                format!(
                    "expected {expected_chunks} chunks for {} rows, found {}",
                    self.rows,
                    self.chunks.len()
                ),
            ));
        }
        for (i, chunk) in self.chunks.iter().enumerate() {
            let first_row = i as u64 * chunk_rows;
            let expected_rows = chunk_rows.min(self.rows - first_row);
            if chunk.rows != expected_rows {
                return Err(Error::invalid_format(
                    name,
                    format!(
                        "chunk {i} holds {} rows, expected {expected_rows}",
                        chunk.rows
                    ),
                ));
            }
            let end = chunk.offset.checked_add(chunk.len);
            if chunk.offset < HEADER_SIZE || end.is_none_or(|end| end > container_size) {
                return Err(Error::invalid_format(
                    name,
                    format!("chunk {i} payload lies outside the container"),
                ));
            }
        }
        Ok(())
    }
}

/// Trailing fixed-size record pointing at the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footer {
    pub directory_offset: u64,
    pub directory_len: u64,
}

impl Footer {
    pub fn encode(&self) -> [u8; FOOTER_SIZE as usize] {
        let mut buf = [0u8; FOOTER_SIZE as usize];
        buf[0..8].copy_from_slice(&self.directory_offset.to_le_bytes());
        buf[8..16].copy_from_slice(&self.directory_len.to_le_bytes());
        buf[16..20].copy_from_slice(MAGIC);
        buf
    }

    pub fn decode(buf: &[u8]) -> Result<Footer> {
        verify_data!(footer, buf.len() == FOOTER_SIZE as usize);
        verify_data!(footer, &buf[16..20] == MAGIC);
        let directory_offset = u64::from_le_bytes(read_array(&buf[0..8]));
        let directory_len = u64::from_le_bytes(read_array(&buf[8..16]));
        Ok(Footer {
            directory_offset,
            directory_len,
        })
    }
}

pub fn encode_header() -> [u8; HEADER_SIZE as usize] {
    let mut buf = [0u8; HEADER_SIZE as usize];
    buf[0..4].copy_from_slice(MAGIC);
    buf[4..8].copy_from_slice(&FORMAT_VERSION.to_le_bytes());
    buf
}

pub fn decode_header(buf: &[u8]) -> Result<u32> {
    verify_data!(header, buf.len() == HEADER_SIZE as usize);
    verify_data!(header, &buf[0..4] == MAGIC);
    let version = u32::from_le_bytes(read_array(&buf[4..8]));
    verify_data!(version, version == FORMAT_VERSION);
    Ok(version)
}

fn read_array<const N: usize>(buf: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&buf[..N]);
    out
}
