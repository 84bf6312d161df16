//! # nexus-common
//!
//! Common types, errors, and utilities for NexusDB.
//!
//! This crate provides the foundational types shared by the row codec and
//! the executor. It includes:
//!
//! - **Types**: Scalar values (`Timestamp`, `Date`, `StringRef`) and partition keys
//! - **Errors**: Unified error handling with `NexusError`
//! - **Config**: Row format configuration
//! - **Constants**: Row header layout and size limits
//!
//! ## Example
//!
//! ```rust
//! use nexus_common::types::{Date, Key, Timestamp};
//! use nexus_common::error::NexusResult;
//!
//! fn example() -> NexusResult<()> {
//!     let ts = Timestamp::from_millis(1_700_000_000_000);
//!     let date = Date::from_ymd(2024, 3, 15).expect("valid date");
//!     let key = Key::from_str("user:1");
//!     assert!(ts > Timestamp::ZERO);
//!     assert_eq!(date.year(), 2024);
//!     assert_eq!(key.len(), 6);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod constants;
pub mod error;
pub mod types;

// Re-export commonly used items at the crate root
pub use constants::*;
pub use error::{NexusError, NexusResult};
pub use types::{Date, Key, StringRef, Timestamp};
