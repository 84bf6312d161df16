//! Cursor capability shared by every list, column and window.
//!
//! A cursor is a stateful position over a [`List`](crate::list::List). All
//! adapters in this crate speak the same contract, so a window can wrap a
//! column, a column can wrap an array, and evaluation code only ever sees
//! `Cursor<V>`:
//!
//! - `seek(key)` positions at the first entry satisfying the backend's seek
//!   rule (an ordinal for array lists, an ordering key for row lists)
//! - `seek_to_first()` rewinds
//! - `next()` advances one entry
//! - `valid()` reports whether the cursor is positioned on an entry
//! - `value()` / `key()` read the current entry and return `None` once the
//!   cursor is exhausted
//!
//! Cursors never allocate while traversing. For hot loops that need a new
//! cursor per output row, [`CursorSlot`] keeps one cursor value alive and
//! overwrites it in place.

/// Ordering key type shared by all lists.
pub type OrderKey = u64;

/// Uniform traversal over a list of `V`.
pub trait Cursor<V> {
    /// Positions the cursor according to the backend's seek rule.
    fn seek(&mut self, key: OrderKey);

    /// Positions the cursor at the first entry.
    fn seek_to_first(&mut self);

    /// Advances to the next entry. No-op once exhausted.
    fn next(&mut self);

    /// Returns true if the cursor is positioned on an entry.
    fn valid(&self) -> bool;

    /// Returns the current value.
    fn value(&mut self) -> Option<&V>;

    /// Returns the current key.
    fn key(&self) -> Option<OrderKey>;

    /// Returns true if `seek` is supported.
    fn is_seekable(&self) -> bool;

    /// Adapts the cursor into a std iterator over `(key, value)` pairs.
    ///
    /// Values are cloned; use the cursor directly on hot paths.
    fn entries(self) -> Entries<Self, V>
    where
        Self: Sized,
        V: Clone,
    {
        Entries {
            cursor: self,
            _value: std::marker::PhantomData,
        }
    }
}

impl<V, C: Cursor<V> + ?Sized> Cursor<V> for &mut C {
    fn seek(&mut self, key: OrderKey) {
        (**self).seek(key);
    }

    fn seek_to_first(&mut self) {
        (**self).seek_to_first();
    }

    fn next(&mut self) {
        (**self).next();
    }

    fn valid(&self) -> bool {
        (**self).valid()
    }

    fn value(&mut self) -> Option<&V> {
        (**self).value()
    }

    fn key(&self) -> Option<OrderKey> {
        (**self).key()
    }

    fn is_seekable(&self) -> bool {
        (**self).is_seekable()
    }
}

/// Iterator returned by [`Cursor::entries`].
#[derive(Debug)]
pub struct Entries<C, V> {
    cursor: C,
    _value: std::marker::PhantomData<fn() -> V>,
}

impl<C: Cursor<V>, V: Clone> Iterator for Entries<C, V> {
    type Item = (OrderKey, V);

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.cursor.key()?;
        let value = self.cursor.value()?.clone();
        self.cursor.next();
        Some((key, value))
    }
}

/// A caller-owned, reusable cursor.
///
/// The slot holds at most one cursor inline. [`List::cursor_in`] writes a
/// fresh cursor into the slot, dropping the previous one, and hands back a
/// mutable reference; no heap allocation takes place. Because the slot is
/// borrowed mutably for as long as the cursor is in use, two evaluation
/// contexts can never drive it at the same time.
///
/// [`List::cursor_in`]: crate::list::List::cursor_in
#[derive(Debug)]
pub struct CursorSlot<C> {
    cursor: Option<C>,
}

impl<C> CursorSlot<C> {
    /// Creates an empty slot.
    pub const fn new() -> Self {
        Self { cursor: None }
    }

    /// Replaces the slot contents and returns the new cursor.
    pub fn reset(&mut self, cursor: C) -> &mut C {
        self.cursor.insert(cursor)
    }

    /// Returns the cursor currently held, if any.
    pub fn get_mut(&mut self) -> Option<&mut C> {
        self.cursor.as_mut()
    }

    /// Returns true if the slot holds a cursor.
    pub fn is_occupied(&self) -> bool {
        self.cursor.is_some()
    }

    /// Drops the held cursor.
    pub fn clear(&mut self) {
        self.cursor = None;
    }
}

impl<C> Default for CursorSlot<C> {
    fn default() -> Self {
        Self::new()
    }
}
