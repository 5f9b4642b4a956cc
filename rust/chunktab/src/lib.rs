//! Chunk-aware random access to event-structured summary tables.
//!
//! A summary table is a two-dimensional `f32` table whose columns are named by a
//! string-array attribute and whose rows are grouped into events: one column holds
//! an event identifier, and all rows of an event are stored contiguously. The
//! columns following the event identifier hold the per-row product values.
//!
//! The main entry point is [`SummaryTableReader`], composed of:
//! - [`ColumnCatalog`]: column name to index resolution;
//! - [`ChunkAlignedAccessor`]: column-slice and rectangular-block reads that respect
//!   the physical row chunking of the underlying [`ChunkedStore`];
//! - [`EventRowIndex`]: event identifier to contiguous row range lookup.

pub mod accessor;
pub mod catalog;
pub mod config;
pub mod event_index;
pub mod reader;

pub use accessor::{ChunkAlignedAccessor, GridView};
pub use catalog::ColumnCatalog;
pub use config::ReaderConfig;
pub use event_index::EventRowIndex;
pub use reader::SummaryTableReader;

pub use chunktab_common::{Result, error::Error, error::ErrorKind};
pub use chunktab_format::{ChunkedStore, Extent, Hyperslab, MemShape};
