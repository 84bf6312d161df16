//! Window frame definitions.
//!
//! A planner ships a frame with each window function; at evaluation time
//! the frame turns the current row into a window over the partition:
//!
//! ```text
//! ROWS BETWEEN 2 PRECEDING AND 1 FOLLOWING, current ordinal 5
//!   -> RowCountWindow [4, 7]
//!
//! RANGE BETWEEN 100 PRECEDING AND CURRENT ROW, current key 1000
//!   -> KeyRangeWindow upper 1000, lower 900
//! ```
//!
//! Partitions are ordered newest first, so rows that precede the current
//! row in SQL terms sit at higher ordinals and lower keys. Both frames read
//! "preceding" that way. Extents saturate, so [`UNBOUNDED`] on either side
//! reaches the partition edge.

use serde::{Deserialize, Serialize};

use crate::cursor::OrderKey;
use crate::window::{KeyRangeWindow, RowCountWindow};

/// Extent that reaches the partition edge.
pub const UNBOUNDED: u64 = u64::MAX;

/// `ROWS BETWEEN preceding PRECEDING AND following FOLLOWING`.
///
/// Offsets count rows over a descending partition: "preceding" rows are
/// older and come after the current row in the partition's row list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RowsFrame {
    /// Older rows, at higher ordinals than the current row.
    pub preceding: u64,
    /// Newer rows, at lower ordinals than the current row.
    pub following: u64,
}

impl RowsFrame {
    /// Creates a frame.
    pub const fn new(preceding: u64, following: u64) -> Self {
        Self {
            preceding,
            following,
        }
    }

    /// `ROWS BETWEEN UNBOUNDED PRECEDING AND CURRENT ROW`.
    pub const fn running() -> Self {
        Self::new(UNBOUNDED, 0)
    }

    /// `ROWS BETWEEN UNBOUNDED PRECEDING AND UNBOUNDED FOLLOWING`.
    pub const fn whole_partition() -> Self {
        Self::new(UNBOUNDED, UNBOUNDED)
    }

    /// Returns the inclusive ordinal bounds `(start, end)` around `pos`.
    pub const fn bounds(&self, pos: u64) -> (u64, u64) {
        (
            pos.saturating_sub(self.following),
            pos.saturating_add(self.preceding),
        )
    }

    /// Returns the window around ordinal `pos` of `root`.
    pub fn window<'r, L>(&self, root: &'r L, pos: u64) -> RowCountWindow<'r, L> {
        let (start, end) = self.bounds(pos);
        RowCountWindow::new(root, start, end)
    }
}

/// `RANGE BETWEEN preceding PRECEDING AND following FOLLOWING`.
///
/// Offsets are distances on the ordering key. The window covers keys from
/// `key - preceding` up to `key + following`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RangeFrame {
    /// Key distance below the current key.
    pub preceding: u64,
    /// Key distance above the current key.
    pub following: u64,
}

impl RangeFrame {
    /// Creates a frame.
    pub const fn new(preceding: u64, following: u64) -> Self {
        Self {
            preceding,
            following,
        }
    }

    /// `RANGE BETWEEN UNBOUNDED PRECEDING AND CURRENT ROW`.
    pub const fn running() -> Self {
        Self::new(UNBOUNDED, 0)
    }

    /// Returns the inclusive key bounds `(upper, lower)` around `key`.
    pub const fn bounds(&self, key: OrderKey) -> (OrderKey, OrderKey) {
        (
            key.saturating_add(self.following),
            key.saturating_sub(self.preceding),
        )
    }

    /// Returns the window around `key` over `root`.
    pub fn window<'r, L>(&self, root: &'r L, key: OrderKey) -> KeyRangeWindow<'r, L> {
        let (upper, lower) = self.bounds(key);
        KeyRangeWindow::new(root, upper, lower)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::Cursor;
    use crate::list::{ArrayList, List};
    use crate::ordered::{KeyedRow, OrderedRows};
    use crate::row::Row;

    #[test]
    fn test_rows_bounds_saturate() {
        let frame = RowsFrame::new(2, 1);
        assert_eq!(frame.bounds(5), (4, 7));
        assert_eq!(frame.bounds(0), (0, 2));
        assert_eq!(RowsFrame::new(0, 3).bounds(1), (0, 1));
        assert_eq!(RowsFrame::running().bounds(7), (7, u64::MAX));
        assert_eq!(RowsFrame::whole_partition().bounds(7), (0, u64::MAX));
    }

    #[test]
    fn test_rows_window() {
        let data: Vec<u32> = (0..8).collect();
        let root = ArrayList::new(&data);
        let frame = RowsFrame::new(1, 1);

        let sums: Vec<u32> = (0..data.len() as u64)
            .map(|pos| frame.window(&root, pos).cursor().entries().map(|(_, v)| v).sum())
            .collect();
        assert_eq!(sums, vec![1, 3, 6, 9, 12, 15, 18, 13]);

        let running = RowsFrame::running();
        assert_eq!(running.window(&root, 3).count(), 5);
        assert_eq!(running.window(&root, 7).count(), 1);
    }

    #[test]
    fn test_range_bounds_saturate() {
        let frame = RangeFrame::new(100, 10);
        assert_eq!(frame.bounds(1000), (1010, 900));
        assert_eq!(frame.bounds(50), (60, 0));
        assert_eq!(RangeFrame::new(0, UNBOUNDED).bounds(1), (u64::MAX, 1));
    }

    #[test]
    fn test_range_window_over_event_time() {
        let rows: Vec<KeyedRow> = [500u64, 450, 400, 300, 100]
            .iter()
            .map(|&k| KeyedRow::new(k, Row::empty()))
            .collect();
        let root = OrderedRows::new(&rows);
        let frame = RangeFrame::new(100, 0);

        let keys: Vec<u64> = frame
            .window(&root, 450)
            .cursor()
            .entries()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec![450, 400]);

        let mut cursor = RangeFrame::running().window(&root, 300).cursor();
        let mut seen = 0;
        while cursor.valid() {
            seen += 1;
            cursor.next();
        }
        assert_eq!(seen, 2);
    }

    #[test]
    fn test_running_frames_cover_same_rows() {
        let rows: Vec<KeyedRow> = [500u64, 400, 300, 200, 100]
            .iter()
            .map(|&k| KeyedRow::new(k, Row::empty()))
            .collect();
        let root = OrderedRows::new(&rows);

        for (pos, row) in rows.iter().enumerate() {
            let by_rows: Vec<u64> = RowsFrame::running()
                .window(&root, pos as u64)
                .cursor()
                .entries()
                .map(|(k, _)| k)
                .collect();
            let by_range: Vec<u64> = RangeFrame::running()
                .window(&root, row.key)
                .cursor()
                .entries()
                .map(|(k, _)| k)
                .collect();
            assert_eq!(by_rows, by_range);
        }

        let keys: Vec<u64> = RowsFrame::running()
            .window(&root, 2)
            .cursor()
            .entries()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec![300, 200, 100]);

        // One older row and the current row.
        let keys: Vec<u64> = RowsFrame::new(1, 0)
            .window(&root, 2)
            .cursor()
            .entries()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec![300, 200]);
    }

    #[test]
    fn test_frames_serde() {
        let rows = RowsFrame::new(3, 0);
        let json = serde_json::to_string(&rows).unwrap();
        assert_eq!(json, r#"{"preceding":3,"following":0}"#);
        assert_eq!(serde_json::from_str::<RowsFrame>(&json).unwrap(), rows);

        let range = RangeFrame::running();
        let back: RangeFrame = serde_json::from_str(&serde_json::to_string(&range).unwrap()).unwrap();
        assert_eq!(back, range);
    }
}
