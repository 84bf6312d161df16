//! Window views over a root list.
//!
//! Two framing modes back SQL `OVER (...)` evaluation:
//!
//! - [`RowCountWindow`] restricts the root to the ordinal range
//!   `[start, end]`, inclusive on both ends (`ROWS BETWEEN`).
//! - [`KeyRangeWindow`] restricts the root to entries whose ordering key
//!   lies in `[lower, upper]` (`RANGE BETWEEN`). Roots are expected to be
//!   sorted by descending key, so iteration starts at `upper` and walks
//!   down towards `lower`.
//!
//! Windows never touch the root's data. They borrow the root list and their
//! cursors wrap a root cursor, so a window can be built per output row and
//! its cursor placed in a reused [`CursorSlot`](crate::cursor::CursorSlot).

use tracing::trace;

use crate::cursor::{Cursor, OrderKey};
use crate::list::List;

// =============================================================================
// Row-count window
// =============================================================================

/// Ordinal window `[start, end]` over a root list.
///
/// The window's cursor seeks by window ordinal, not by the root's key:
/// `seek(k)` lands on the `k`-th row of the window even when the root is an
/// [`OrderedRows`](crate::ordered::OrderedRows) keyed by event time. `key()`
/// still reports the root's key. Use a [`KeyRangeWindow`] to seek by
/// ordering key.
#[derive(Debug)]
pub struct RowCountWindow<'r, L> {
    root: &'r L,
    start: u64,
    end: u64,
}

impl<'r, L> RowCountWindow<'r, L> {
    /// Creates a window over ordinals `start..=end` of `root`.
    ///
    /// A window with `start > end` is empty.
    pub fn new(root: &'r L, start: u64, end: u64) -> Self {
        trace!(start, end, "row count window created");
        Self { root, start, end }
    }

    /// Returns the first ordinal in the window.
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Returns the last ordinal in the window.
    pub fn end(&self) -> u64 {
        self.end
    }
}

impl<'r, V, L: List<V>> List<V> for RowCountWindow<'r, L> {
    type Cursor<'a> = RowCountCursor<L::Cursor<'r>> where Self: 'a;

    fn cursor(&self) -> RowCountCursor<L::Cursor<'r>> {
        RowCountCursor::new::<V>(self.root.cursor(), self.start, self.end)
    }

    fn count(&self) -> u64 {
        let total = self.root.count();
        if self.start > self.end || self.start >= total {
            return 0;
        }
        self.end.min(total - 1) - self.start + 1
    }

    fn at(&self, pos: u64) -> Option<V>
    where
        V: Clone,
    {
        let ordinal = self.start.checked_add(pos)?;
        if ordinal > self.end {
            return None;
        }
        self.root.at(ordinal)
    }
}

/// Cursor over a [`RowCountWindow`].
#[derive(Debug, Clone)]
pub struct RowCountCursor<C> {
    root: C,
    start: u64,
    end: u64,
    /// Root ordinal of the entry under `root`.
    pos: u64,
}

impl<C> RowCountCursor<C> {
    /// Returns the root ordinal of the current entry.
    pub fn position(&self) -> u64 {
        self.pos
    }
}

impl<C> RowCountCursor<C> {
    /// Wraps `root`, positioning it at ordinal `start`.
    pub fn new<V>(root: C, start: u64, end: u64) -> Self
    where
        C: Cursor<V>,
    {
        let mut cursor = Self {
            root,
            start,
            end,
            pos: 0,
        };
        cursor.rewind::<V>();
        cursor
    }

    fn rewind<V>(&mut self)
    where
        C: Cursor<V>,
    {
        self.root.seek_to_first();
        self.pos = 0;
        while self.pos < self.start && self.root.valid() {
            self.root.next();
            self.pos += 1;
        }
    }

    fn in_bounds(&self) -> bool {
        self.start <= self.pos && self.pos <= self.end
    }
}

impl<V, C: Cursor<V>> Cursor<V> for RowCountCursor<C> {
    /// Positions at window ordinal `key` (0 is the window's first row).
    fn seek(&mut self, key: OrderKey) {
        self.rewind::<V>();
        let mut remaining = key;
        while remaining > 0 && Cursor::<V>::valid(self) {
            self.root.next();
            self.pos += 1;
            remaining -= 1;
        }
    }

    fn seek_to_first(&mut self) {
        self.rewind::<V>();
    }

    fn next(&mut self) {
        if self.root.valid() && self.pos <= self.end {
            self.root.next();
            self.pos += 1;
        }
    }

    fn valid(&self) -> bool {
        self.root.valid() && self.in_bounds()
    }

    fn value(&mut self) -> Option<&V> {
        if self.in_bounds() {
            self.root.value()
        } else {
            None
        }
    }

    fn key(&self) -> Option<OrderKey> {
        if self.in_bounds() {
            self.root.key()
        } else {
            None
        }
    }

    fn is_seekable(&self) -> bool {
        self.root.is_seekable()
    }
}

// =============================================================================
// Key-range window
// =============================================================================

/// Ordering-key window `[lower, upper]` over a root sorted by descending key.
#[derive(Debug)]
pub struct KeyRangeWindow<'r, L> {
    root: &'r L,
    upper: OrderKey,
    lower: OrderKey,
}

impl<'r, L> KeyRangeWindow<'r, L> {
    /// Creates a window over keys `lower..=upper` of `root`.
    ///
    /// A window with `lower > upper` is empty.
    pub fn new(root: &'r L, upper: OrderKey, lower: OrderKey) -> Self {
        trace!(upper, lower, "key range window created");
        Self { root, upper, lower }
    }

    /// Returns the high bound.
    pub fn upper(&self) -> OrderKey {
        self.upper
    }

    /// Returns the low bound.
    pub fn lower(&self) -> OrderKey {
        self.lower
    }
}

impl<'r, V, L: List<V>> List<V> for KeyRangeWindow<'r, L> {
    type Cursor<'a> = KeyRangeCursor<L::Cursor<'r>> where Self: 'a;

    fn cursor(&self) -> KeyRangeCursor<L::Cursor<'r>> {
        KeyRangeCursor::new::<V>(self.root.cursor(), self.upper, self.lower)
    }
}

/// Cursor over a [`KeyRangeWindow`].
#[derive(Debug, Clone)]
pub struct KeyRangeCursor<C> {
    root: C,
    upper: OrderKey,
    lower: OrderKey,
}

impl<C> KeyRangeCursor<C> {
    /// Wraps `root`, seeking it to `upper`.
    pub fn new<V>(mut root: C, upper: OrderKey, lower: OrderKey) -> Self
    where
        C: Cursor<V>,
    {
        root.seek(upper);
        Self { root, upper, lower }
    }

    fn in_bounds(&self, key: Option<OrderKey>) -> bool {
        key.is_some_and(|k| self.lower <= k && k <= self.upper)
    }
}

impl<V, C: Cursor<V>> Cursor<V> for KeyRangeCursor<C> {
    /// Positions at the first entry at or below `key`, never above `upper`.
    fn seek(&mut self, key: OrderKey) {
        self.root.seek(key.min(self.upper));
    }

    fn seek_to_first(&mut self) {
        self.root.seek(self.upper);
    }

    fn next(&mut self) {
        if Cursor::<V>::valid(self) {
            self.root.next();
        }
    }

    fn valid(&self) -> bool {
        self.root.valid() && self.in_bounds(self.root.key())
    }

    fn value(&mut self) -> Option<&V> {
        if self.in_bounds(self.root.key()) {
            self.root.value()
        } else {
            None
        }
    }

    fn key(&self) -> Option<OrderKey> {
        self.root.key().filter(|&k| self.in_bounds(Some(k)))
    }

    fn is_seekable(&self) -> bool {
        self.root.is_seekable()
    }
}
