//! Error and result definitions shared by all chunktab-* crates.

pub mod error;
pub mod result;

pub use result::Result;
