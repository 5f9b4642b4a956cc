//! Per-chunk payload compression.

use chunktab_common::{Result, error::Error};
use serde::{Deserialize, Serialize};

/// Codec applied independently to every chunk payload of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "codec", rename_all = "snake_case")]
pub enum Compression {
    #[default]
    None,
    Zstd {
        level: i32,
    },
}

impl Compression {
    pub fn zstd() -> Compression {
        Compression::Zstd {
            level: zstd::DEFAULT_COMPRESSION_LEVEL,
        }
    }

    pub fn encode(&self, raw: Vec<u8>) -> Result<Vec<u8>> {
        match *self {
            Compression::None => Ok(raw),
            Compression::Zstd { level } => {
                zstd::bulk::compress(&raw, level).map_err(|e| Error::io("zstd compress", e))
            }
        }
    }

    /// Decodes a payload back into exactly `raw_len` bytes.
    pub fn decode(&self, payload: Vec<u8>, raw_len: usize) -> Result<Vec<u8>> {
        let raw = match *self {
            Compression::None => payload,
            Compression::Zstd { .. } => zstd::bulk::decompress(&payload, raw_len)
                .map_err(|e| Error::io("zstd decompress", e))?,
        };
        if raw.len() != raw_len {
            return Err(Error::short_read(
                "decoded chunk",
                raw_len as u64,
                raw.len() as u64,
            ));
        }
        Ok(raw)
    }
}
