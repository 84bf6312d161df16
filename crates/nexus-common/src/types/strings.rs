//! Zero-copy string view.

use bytes::Bytes;
use std::fmt;
use std::ops::Deref;

/// A view of a variable-length string field.
///
/// The view shares the buffer of the row it was decoded from, so creating
/// one never copies string data. Cloning is a reference-count increment.
///
/// # Example
///
/// ```rust
/// use bytes::Bytes;
/// use nexus_common::types::StringRef;
///
/// let row = Bytes::from_static(b"..hello..");
/// let view = StringRef::new(row.slice(2..7));
/// assert_eq!(view.as_str(), Some("hello"));
/// ```
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StringRef(Bytes);

impl StringRef {
    /// The empty string.
    pub const EMPTY: Self = Self(Bytes::new());

    /// Wraps a slice of a row buffer.
    #[inline]
    #[must_use]
    pub const fn new(bytes: Bytes) -> Self {
        Self(bytes)
    }

    /// Creates a view over a static string.
    #[inline]
    #[must_use]
    pub const fn from_static(s: &'static str) -> Self {
        Self(Bytes::from_static(s.as_bytes()))
    }

    /// Returns the length in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the string is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the raw bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the string if it is valid UTF-8.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }

    /// Returns the underlying buffer slice.
    #[inline]
    #[must_use]
    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl Deref for StringRef {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<[u8]> for StringRef {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl PartialEq<str> for StringRef {
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<&str> for StringRef {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl fmt::Debug for StringRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_str() {
            Some(s) => write!(f, "StringRef({s:?})"),
            None => write!(f, "StringRef({} bytes)", self.0.len()),
        }
    }
}

impl fmt::Display for StringRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}
