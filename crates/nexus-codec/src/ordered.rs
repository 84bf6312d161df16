//! Row lists keyed by an ordering column.
//!
//! Partitions hand their rows to window evaluation sorted by a descending
//! ordering key (typically event time), newest first. [`OrderedRows`] is the
//! root row list for that layout: `seek(key)` lands on the first row whose
//! key is not greater than `key`.

use crate::cursor::{Cursor, OrderKey};
use crate::list::List;
use crate::row::Row;

/// A row tagged with its ordering key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedRow {
    /// Ordering key, e.g. event time in milliseconds.
    pub key: OrderKey,
    /// Encoded row.
    pub row: Row,
}

impl KeyedRow {
    /// Creates a keyed row.
    pub fn new(key: OrderKey, row: Row) -> Self {
        Self { key, row }
    }
}

/// Root row list over rows sorted by descending key.
#[derive(Debug, Clone, Copy)]
pub struct OrderedRows<'a> {
    rows: &'a [KeyedRow],
}

impl<'a> OrderedRows<'a> {
    /// Wraps rows that are already sorted by descending key.
    pub fn new(rows: &'a [KeyedRow]) -> Self {
        debug_assert!(
            rows.windows(2).all(|w| w[0].key >= w[1].key),
            "rows must be sorted by descending key"
        );
        Self { rows }
    }

    /// Returns the underlying rows.
    pub fn rows(&self) -> &'a [KeyedRow] {
        self.rows
    }

    /// Returns true if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<'a> List<Row> for OrderedRows<'a> {
    type Cursor<'c> = OrderedCursor<'a> where Self: 'c;

    fn cursor(&self) -> OrderedCursor<'a> {
        OrderedCursor {
            rows: self.rows,
            pos: 0,
        }
    }

    fn count(&self) -> u64 {
        self.rows.len() as u64
    }

    fn at(&self, pos: u64) -> Option<Row> {
        let pos = usize::try_from(pos).ok()?;
        self.rows.get(pos).map(|r| r.row.clone())
    }
}

/// Cursor over [`OrderedRows`].
#[derive(Debug, Clone)]
pub struct OrderedCursor<'a> {
    rows: &'a [KeyedRow],
    pos: usize,
}

impl<'a> OrderedCursor<'a> {
    /// Returns the current keyed row with the slice lifetime.
    pub fn current(&self) -> Option<&'a KeyedRow> {
        self.rows.get(self.pos)
    }
}

impl Cursor<Row> for OrderedCursor<'_> {
    fn seek(&mut self, key: OrderKey) {
        self.pos = self.rows.partition_point(|r| r.key > key);
    }

    fn seek_to_first(&mut self) {
        self.pos = 0;
    }

    fn next(&mut self) {
        if self.pos < self.rows.len() {
            self.pos += 1;
        }
    }

    fn valid(&self) -> bool {
        self.pos < self.rows.len()
    }

    fn value(&mut self) -> Option<&Row> {
        self.rows.get(self.pos).map(|r| &r.row)
    }

    fn key(&self) -> Option<OrderKey> {
        self.rows.get(self.pos).map(|r| r.key)
    }

    fn is_seekable(&self) -> bool {
        true
    }
}
