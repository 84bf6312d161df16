//! List capability and the array-backed list.
//!
//! A [`List`] is a logical, ordered sequence that hands out independent
//! cursors. Rows, decoded columns and windows are all lists, which is what
//! lets the adapters in this crate stack on top of each other.

use crate::cursor::{Cursor, CursorSlot, OrderKey};

/// A logical sequence of `V` that produces cursors.
///
/// Cursor types are allowed to outlive the `&self` borrow that created them
/// when they only borrow the list's root data. Views such as windows and
/// columns rely on this so that a [`CursorSlot`] can be reused across view
/// objects that are rebuilt for every evaluated row.
pub trait List<V> {
    /// Cursor type produced by this list.
    type Cursor<'a>: Cursor<V>
    where
        Self: 'a;

    /// Returns a fresh cursor positioned at the first entry.
    fn cursor(&self) -> Self::Cursor<'_>;

    /// Writes a fresh cursor into a caller-owned slot and returns it.
    ///
    /// The previous occupant of the slot is dropped. This is the
    /// allocation-free path for evaluation loops.
    fn cursor_in<'a, 's>(
        &'a self,
        slot: &'s mut CursorSlot<Self::Cursor<'a>>,
    ) -> &'s mut Self::Cursor<'a> {
        slot.reset(self.cursor())
    }

    /// Returns the number of entries.
    ///
    /// The default drains a fresh cursor.
    fn count(&self) -> u64 {
        let mut cursor = self.cursor();
        let mut count = 0;
        while cursor.valid() {
            cursor.next();
            count += 1;
        }
        count
    }

    /// Returns the entry at ordinal `pos`, or `None` past the end.
    ///
    /// The default walks a fresh cursor.
    fn at(&self, pos: u64) -> Option<V>
    where
        V: Clone,
    {
        let mut cursor = self.cursor();
        for _ in 0..pos {
            if !cursor.valid() {
                return None;
            }
            cursor.next();
        }
        let value = cursor.value().cloned();
        value
    }
}

/// A list over a borrowed slice, restricted to `[start, end)`.
///
/// Counting and random access are O(1).
///
/// # Example
///
/// ```rust
/// use nexus_codec::list::{ArrayList, List};
///
/// let data = vec![10, 20, 30, 40, 50];
/// let list = ArrayList::with_bounds(&data, 1, 4);
/// assert_eq!(list.count(), 3);
/// assert_eq!(list.at(0), Some(20));
/// assert_eq!(list.at(3), None);
/// ```
#[derive(Debug)]
pub struct ArrayList<'a, V> {
    buffer: &'a [V],
    start: usize,
    end: usize,
}

impl<'a, V> ArrayList<'a, V> {
    /// Creates a list over the whole slice.
    pub fn new(buffer: &'a [V]) -> Self {
        Self {
            buffer,
            start: 0,
            end: buffer.len(),
        }
    }

    /// Creates a list over `buffer[start..end]`, clamping both bounds.
    pub fn with_bounds(buffer: &'a [V], start: usize, end: usize) -> Self {
        let end = end.min(buffer.len());
        Self {
            buffer,
            start: start.min(end),
            end,
        }
    }

    /// Returns a reference to the entry at ordinal `pos`.
    #[inline]
    pub fn get(&self, pos: u64) -> Option<&'a V> {
        let index = self.start.checked_add(usize::try_from(pos).ok()?)?;
        if index < self.end {
            self.buffer.get(index)
        } else {
            None
        }
    }

    /// Returns the visible entries as a slice.
    pub fn as_slice(&self) -> &'a [V] {
        &self.buffer[self.start..self.end]
    }

    /// Returns true if the list has no entries.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

// Manual impls: the list only holds a shared slice, so it is always copyable.
impl<V> Clone for ArrayList<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for ArrayList<'_, V> {}

impl<'a, V> List<V> for ArrayList<'a, V> {
    type Cursor<'c> = ArrayCursor<'a, V> where Self: 'c;

    fn cursor(&self) -> ArrayCursor<'a, V> {
        ArrayCursor::new(self.buffer, self.start, self.end)
    }

    fn count(&self) -> u64 {
        (self.end - self.start) as u64
    }

    fn at(&self, pos: u64) -> Option<V>
    where
        V: Clone,
    {
        self.get(pos).cloned()
    }
}

/// Cursor over an [`ArrayList`].
///
/// `key()` is the ordinal position relative to the list start, which is
/// also what `seek` accepts. The number of entries left, including the
/// current one, is available separately through [`ArrayCursor::remaining`].
#[derive(Debug)]
pub struct ArrayCursor<'a, V> {
    buffer: &'a [V],
    start: usize,
    end: usize,
    pos: usize,
}

impl<'a, V> ArrayCursor<'a, V> {
    fn new(buffer: &'a [V], start: usize, end: usize) -> Self {
        Self {
            buffer,
            start,
            end,
            pos: start,
        }
    }

    /// Returns the ordinal position relative to the cursor's start.
    pub fn position(&self) -> u64 {
        (self.pos - self.start) as u64
    }

    /// Returns the number of entries from the current one to the end.
    pub fn remaining(&self) -> u64 {
        (self.end - self.pos) as u64
    }

    /// Returns a cursor over the ordinals `[lo, hi)` of this cursor's range.
    ///
    /// Bounds are clamped to the current range. An inverted or disjoint
    /// range yields a cursor that is already exhausted.
    pub fn range(&self, lo: u64, hi: u64) -> Self {
        let len = (self.end - self.start) as u64;
        if lo > hi || lo >= len {
            return Self::new(self.buffer, self.start, self.start);
        }
        let hi = hi.min(len);
        Self::new(
            self.buffer,
            self.start + lo as usize,
            self.start + hi as usize,
        )
    }

    /// Returns the current entry with the slice lifetime.
    #[inline]
    pub fn current(&self) -> Option<&'a V> {
        if self.pos < self.end {
            self.buffer.get(self.pos)
        } else {
            None
        }
    }
}

impl<V> Clone for ArrayCursor<'_, V> {
    fn clone(&self) -> Self {
        Self {
            buffer: self.buffer,
            start: self.start,
            end: self.end,
            pos: self.pos,
        }
    }
}

impl<V> Cursor<V> for ArrayCursor<'_, V> {
    fn seek(&mut self, key: OrderKey) {
        let offset = usize::try_from(key).unwrap_or(usize::MAX);
        self.pos = self.start.saturating_add(offset).min(self.end);
    }

    fn seek_to_first(&mut self) {
        self.pos = self.start;
    }

    fn next(&mut self) {
        if self.pos < self.end {
            self.pos += 1;
        }
    }

    fn valid(&self) -> bool {
        self.pos < self.end
    }

    fn value(&mut self) -> Option<&V> {
        self.current()
    }

    fn key(&self) -> Option<OrderKey> {
        self.valid().then(|| self.position())
    }

    fn is_seekable(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_matches_backing_slice() {
        let data: Vec<u32> = (100..120).collect();
        let list = ArrayList::with_bounds(&data, 5, 15);
        for pos in 0..list.count() {
            assert_eq!(list.at(pos), Some(data[5 + pos as usize]));
        }
        assert_eq!(list.at(10), None);
        assert_eq!(list.at(u64::MAX), None);
    }

    #[test]
    fn test_bounds_are_clamped() {
        let data = vec![1, 2, 3];
        let list = ArrayList::with_bounds(&data, 2, 10);
        assert_eq!(list.count(), 1);
        assert_eq!(list.as_slice(), &[3]);

        let list = ArrayList::with_bounds(&data, 5, 1);
        assert!(list.is_empty());
        assert_eq!(list.count(), 0);
        assert!(!list.cursor().valid());
    }

    #[test]
    fn test_cursor_traversal() {
        let data = vec!["a", "b", "c"];
        let list = ArrayList::new(&data);
        let mut cursor = list.cursor();

        assert_eq!(cursor.key(), Some(0));
        assert_eq!(cursor.remaining(), 3);
        assert_eq!(cursor.value(), Some(&"a"));
        cursor.next();
        cursor.next();
        assert_eq!(cursor.key(), Some(2));
        assert_eq!(cursor.remaining(), 1);
        cursor.next();
        assert!(!cursor.valid());
        assert_eq!(cursor.value(), None);
        assert_eq!(cursor.key(), None);
        cursor.next();
        assert_eq!(cursor.remaining(), 0);

        cursor.seek_to_first();
        assert_eq!(cursor.value(), Some(&"a"));
    }

    #[test]
    fn test_seek_is_ordinal_and_clamped() {
        let data: Vec<i32> = (0..10).collect();
        let list = ArrayList::with_bounds(&data, 3, 8);
        let mut cursor = list.cursor();
        assert!(cursor.is_seekable());

        cursor.seek(2);
        assert_eq!(cursor.value(), Some(&5));
        assert_eq!(cursor.position(), 2);

        cursor.seek(5);
        assert!(!cursor.valid());
        cursor.seek(u64::MAX);
        assert!(!cursor.valid());
    }

    #[test]
    fn test_range_narrows() {
        let data: Vec<i32> = (0..10).collect();
        let cursor = ArrayList::with_bounds(&data, 2, 9).cursor();
        let values: Vec<i32> = cursor.range(1, 4).entries().map(|(_, v)| v).collect();
        assert_eq!(values, vec![3, 4, 5]);

        let values: Vec<i32> = cursor.range(5, 100).entries().map(|(_, v)| v).collect();
        assert_eq!(values, vec![7, 8]);
    }

    #[test]
    fn test_range_inverted_or_disjoint_is_empty() {
        let data: Vec<i32> = (0..10).collect();
        let cursor = ArrayList::new(&data).cursor();
        assert!(!cursor.range(6, 2).valid());
        assert!(!cursor.range(10, 20).valid());
        assert!(!cursor.range(3, 3).valid());
    }

    #[test]
    fn test_count_default_matches_override() {
        struct Drained<'a>(ArrayList<'a, u8>);

        impl<'a> List<u8> for Drained<'a> {
            type Cursor<'c> = ArrayCursor<'a, u8> where Self: 'c;

            fn cursor(&self) -> ArrayCursor<'a, u8> {
                self.0.cursor()
            }
        }

        for len in [0usize, 1, 7, 64] {
            let data = vec![0u8; len];
            let list = ArrayList::new(&data);
            assert_eq!(Drained(list).count(), len as u64);
            assert_eq!(list.count(), len as u64);
            assert_eq!(Drained(list).at(len as u64), None);
        }
    }

    #[test]
    fn test_independent_cursors() {
        let data = vec![1, 2, 3];
        let list = ArrayList::new(&data);
        let mut a = list.cursor();
        let mut b = list.cursor();
        a.next();
        a.next();
        assert_eq!(a.value(), Some(&3));
        assert_eq!(b.value(), Some(&1));
        b.next();
        assert_eq!(a.value(), Some(&3));
    }

    #[test]
    fn test_cursor_in_slot() {
        let data: Vec<u16> = (0..6).collect();
        let mut slot = CursorSlot::new();
        let mut total = 0u16;
        for start in 0..3 {
            let window = ArrayList::with_bounds(&data, start, start + 3);
            let cursor = window.cursor_in(&mut slot);
            while let Some(v) = cursor.value() {
                total += *v;
                cursor.next();
            }
        }
        // (0+1+2) + (1+2+3) + (2+3+4)
        assert_eq!(total, 18);
    }
}
