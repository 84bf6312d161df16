//! Partition key type for NexusDB.
//!
//! Partition keys are variable-length byte strings; partitions of a table
//! are visited in ascending key order.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::Deref;

pub use crate::constants::MAX_KEY_SIZE;

/// A partition key.
///
/// Keys are variable-length byte sequences that identify a partition of a
/// table. They compare lexicographically, which defines partition order.
///
/// # Size Limits
///
/// Keys are limited to [`MAX_KEY_SIZE`] bytes (16 KB). Constructors accept
/// any length; tables reject longer keys when they group rows.
///
/// # Example
///
/// ```rust
/// use nexus_common::types::Key;
///
/// let key = Key::from_bytes(b"user:1234");
/// assert_eq!(key.len(), 9);
/// assert!(Key::from_str("user:1") < key);
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Key(Bytes);

impl Key {
    /// Creates an empty key.
    #[inline]
    #[must_use]
    pub const fn empty() -> Self {
        Self(Bytes::new())
    }

    /// Creates a key from a byte slice.
    #[inline]
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(Bytes::copy_from_slice(bytes))
    }

    /// Creates a key from owned bytes.
    #[inline]
    #[must_use]
    pub fn from_vec(vec: Vec<u8>) -> Self {
        Self(Bytes::from(vec))
    }

    /// Creates a key from a `Bytes` instance.
    #[inline]
    #[must_use]
    pub const fn from_raw(bytes: Bytes) -> Self {
        Self(bytes)
    }

    /// Creates a key from a string.
    #[inline]
    #[must_use]
    pub fn from_str(s: &str) -> Self {
        Self::from_bytes(s.as_bytes())
    }

    /// Returns the length of the key in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the key is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the key as a byte slice.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the underlying `Bytes`.
    #[inline]
    #[must_use]
    pub fn into_bytes(self) -> Bytes {
        self.0
    }

    /// Returns a reference to the underlying `Bytes`.
    #[inline]
    #[must_use]
    pub fn as_raw(&self) -> &Bytes {
        &self.0
    }

    /// Creates a key from an integer partition value.
    ///
    /// The value is encoded big-endian so that byte order matches numeric order.
    #[inline]
    #[must_use]
    pub fn from_u64(value: u64) -> Self {
        Self::from_bytes(&value.to_be_bytes())
    }

    /// Decodes a key created with [`Key::from_u64`].
    ///
    /// Returns `None` if the key is not exactly eight bytes long.
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        let bytes: [u8; 8] = self.0[..].try_into().ok()?;
        Some(u64::from_be_bytes(bytes))
    }
}

impl Deref for Key {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<[u8]> for Key {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Ord for Key {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl PartialOrd for Key {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Try to display as UTF-8 string if valid, otherwise show hex
        match std::str::from_utf8(&self.0) {
            Ok(s) if s.chars().all(|c| !c.is_control() || c == ' ') => {
                write!(f, "Key({:?})", s)
            }
            _ => {
                write!(f, "Key(0x")?;
                for byte in &self.0[..self.0.len().min(32)] {
                    write!(f, "{byte:02x}")?;
                }
                if self.0.len() > 32 {
                    write!(f, "...")?;
                }
                write!(f, ")")
            }
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match std::str::from_utf8(&self.0) {
            Ok(s) => write!(f, "{s}"),
            Err(_) => {
                for byte in &self.0[..self.0.len().min(32)] {
                    write!(f, "{byte:02x}")?;
                }
                if self.0.len() > 32 {
                    write!(f, "...")?;
                }
                Ok(())
            }
        }
    }
}

impl From<&[u8]> for Key {
    #[inline]
    fn from(bytes: &[u8]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<Vec<u8>> for Key {
    #[inline]
    fn from(vec: Vec<u8>) -> Self {
        Self::from_vec(vec)
    }
}

impl From<&str> for Key {
    #[inline]
    fn from(s: &str) -> Self {
        Self::from_str(s)
    }
}

impl From<String> for Key {
    #[inline]
    fn from(s: String) -> Self {
        Self::from_vec(s.into_bytes())
    }
}

impl From<Bytes> for Key {
    #[inline]
    fn from(bytes: Bytes) -> Self {
        Self::from_raw(bytes)
    }
}
