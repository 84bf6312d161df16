//! NexusDB Performance Benchmarks
//!
//! This crate contains benchmarks for the row codec and window layer:
//! - Row encoding and field decoding
//! - Column scans over row lists
//! - ROWS and RANGE window framing per evaluated row
//!
//! Run benchmarks with:
//! ```bash
//! cargo bench -p nexus-bench
//! ```

pub mod utils;
