//! Chunked table storage.
//!
//! This crate defines the [`ChunkedStore`] abstraction consumed by the readers in
//! `chunktab`: a two-dimensional `f32` table with a known extent, an optional
//! chunk size along the row axis, named attributes, and a primitive that reads a
//! rectangular [`Hyperslab`] into a caller-supplied buffer.
//!
//! Two implementations are provided:
//! - [`MemoryTable`](memory::MemoryTable): an in-memory table, mostly for tests.
//! - [`ContainerTable`](container::ContainerTable): a table inside a single-file
//!   container written by [`ContainerWriter`](writer::ContainerWriter).

pub mod compression;
pub mod container;
pub mod directory;
pub mod memory;
pub mod store;
pub mod writer;

pub use compression::Compression;
pub use container::{ContainerTable, TableContainer};
pub use memory::MemoryTable;
pub use store::{AttributeValue, ChunkedStore, Extent, Hyperslab, MemShape};
pub use writer::{ContainerWriter, TableLayout};
