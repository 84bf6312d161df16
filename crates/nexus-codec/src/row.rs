//! Encoded row representation.
//!
//! A `Row` is an opaque binary record made of one or more fragments. Each
//! fragment is an independently encoded buffer (for example the columns of
//! a joined table) and starts with the standard row header:
//!
//! ```text
//! +----------------+----------------+---------------------+
//! | format_version | schema_version | total_size (u32 LE) |
//! |     1 byte     |     1 byte     |       4 bytes       |
//! +----------------+----------------+---------------------+
//! ```
//!
//! Rows are never mutated by the codec. Cloning a row only bumps reference
//! counts, and every decoded string view shares the fragment buffer.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use nexus_common::constants::{HEADER_LENGTH, VERSION_LENGTH};

use crate::error::{CodecError, CodecResult};

/// An encoded row.
#[derive(Clone, PartialEq, Eq)]
pub struct Row {
    fragments: Arc<[Bytes]>,
}

impl Row {
    /// Creates a row with a single fragment.
    pub fn new(buf: Bytes) -> Self {
        Self {
            fragments: Arc::from(vec![buf]),
        }
    }

    /// Creates a row from several fragments.
    pub fn from_fragments(fragments: Vec<Bytes>) -> Self {
        Self {
            fragments: Arc::from(fragments),
        }
    }

    /// Creates a row with no fragments.
    pub fn empty() -> Self {
        Self {
            fragments: Arc::from(Vec::new()),
        }
    }

    /// Returns the number of fragments.
    #[inline]
    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    /// Returns true if the row has no fragments.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Returns the fragment at `index`.
    #[inline]
    pub fn fragment(&self, index: usize) -> Option<&Bytes> {
        self.fragments.get(index)
    }

    /// Returns the fragment at `index`, or an error if it does not exist.
    pub fn try_fragment(&self, index: usize) -> CodecResult<&Bytes> {
        self.fragments
            .get(index)
            .ok_or(CodecError::FragmentNotFound {
                index,
                count: self.fragments.len(),
            })
    }

    /// Returns the bytes of fragment `index` (empty if it does not exist).
    #[inline]
    pub fn buffer(&self, index: usize) -> &[u8] {
        self.fragments.get(index).map_or(&[][..], |b| &b[..])
    }

    /// Returns the byte length of fragment `index` (0 if it does not exist).
    #[inline]
    pub fn size(&self, index: usize) -> u32 {
        self.fragments.get(index).map_or(0, |b| b.len() as u32)
    }

    /// Returns the format version from the fragment header.
    pub fn format_version(&self, index: usize) -> Option<u8> {
        self.header(index).map(|h| h[0])
    }

    /// Returns the schema version from the fragment header.
    pub fn schema_version(&self, index: usize) -> Option<u8> {
        self.header(index).map(|h| h[1])
    }

    /// Returns the total size recorded in the fragment header.
    pub fn declared_size(&self, index: usize) -> Option<u32> {
        let header = self.header(index)?;
        let size: [u8; 4] = header[VERSION_LENGTH..HEADER_LENGTH].try_into().ok()?;
        Some(u32::from_le_bytes(size))
    }

    fn header(&self, index: usize) -> Option<&[u8]> {
        self.buffer(index).get(..HEADER_LENGTH)
    }
}

impl Default for Row {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Bytes> for Row {
    fn from(buf: Bytes) -> Self {
        Self::new(buf)
    }
}

impl fmt::Debug for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sizes: Vec<usize> = self.fragments.iter().map(Bytes::len).collect();
        f.debug_struct("Row").field("fragments", &sizes).finish()
    }
}
