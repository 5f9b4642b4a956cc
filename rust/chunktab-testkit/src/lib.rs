//! Test utilities for the chunktab crates.
//!
//! This crate provides:
//! - Generation of synthetic event-structured tables
//! - Store wrappers that record or fail physical reads
//! - Helpers writing tables into temporary container files
//!
//! It is intended for use by the workspace's test suites only.

pub mod containers;
pub mod data_gen;
pub mod recording;

/// Routes `log` output to the test harness. Safe to call from every test.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
