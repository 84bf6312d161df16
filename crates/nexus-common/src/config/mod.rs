//! Configuration for NexusDB.
//!
//! This module provides configuration structures for the row codec.

mod row_format;

pub use row_format::RowFormatConfig;
