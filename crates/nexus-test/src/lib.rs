//! # nexus-test
//!
//! Integration tests for the NexusDB row codec and window layer.
//!
//! This crate contains:
//! - Shared fixtures: schemas, row encoders, and keyed partitions
//! - Window framing tests over encoded rows
//! - Partition traversal tests

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Test utilities and helpers
pub mod utils;
