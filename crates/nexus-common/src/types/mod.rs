//! Type definitions for NexusDB.
//!
//! This module contains the scalar value types decoded from rows and the
//! key type used to address partitions.

mod keys;
mod strings;
mod timestamps;

pub use keys::{Key, MAX_KEY_SIZE};
pub use strings::StringRef;
pub use timestamps::{Date, Timestamp};
