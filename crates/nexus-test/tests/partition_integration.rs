//! Partition traversal integration tests.
//!
//! Rows are grouped by user and ordered by event time, then window
//! functions are evaluated partition by partition the way the executor
//! drives them.

use nexus_codec::column::{Column, FixedField};
use nexus_codec::cursor::{Cursor, CursorSlot};
use nexus_codec::frame::{RangeFrame, RowsFrame};
use nexus_codec::list::List;
use nexus_codec::partition::{PartitionCursor, PartitionedTable};
use nexus_codec::CodecError;
use nexus_common::error::{ErrorCode, NexusError};
use nexus_common::types::{Key, MAX_KEY_SIZE};
use nexus_test::utils::{
    cols, collect_keys, collect_values, encode_events, event_layout, init_tracing, Event,
};

fn events() -> Vec<Event> {
    vec![
        Event::new("bob", 100, 5),
        Event::new("alice", 300, 3),
        Event::new("carol", 50, 7),
        Event::new("alice", 100, 1),
        Event::new("bob", 250, 6),
        Event::new("alice", 200, 2),
        Event::new("bob", 400, 8),
    ]
}

fn table() -> PartitionedTable {
    let layout = event_layout();
    let rows = encode_events(&layout, &events());
    PartitionedTable::from_columns(&layout, rows, "user", "ts").unwrap()
}

#[test]
fn test_partitions_in_key_order() {
    init_tracing();
    let table = table();
    assert_eq!(table.partition_count(), 3);
    assert_eq!(table.row_count(), 7);

    let mut cursor = table.cursor();
    let mut seen = Vec::new();
    while cursor.valid() {
        let rows = cursor.value().unwrap();
        seen.push((cursor.key().unwrap().to_string(), collect_keys(&rows)));
        cursor.next();
    }
    assert_eq!(
        seen,
        vec![
            ("alice".to_string(), vec![300, 200, 100]),
            ("bob".to_string(), vec![400, 250, 100]),
            ("carol".to_string(), vec![50]),
        ]
    );
}

#[test]
fn test_running_total_per_partition() {
    init_tracing();
    let layout = event_layout();
    let table = table();
    let amount = FixedField::<i64>::for_column(&layout, cols::AMOUNT, 0).unwrap();
    let frame = RowsFrame::running();

    let mut results = Vec::new();
    let mut partitions = table.cursor();
    partitions.seek_to_first();
    while let Some(rows) = partitions.value() {
        let mut slot = CursorSlot::new();
        let mut totals = Vec::new();
        for pos in 0..rows.count() {
            let window = frame.window(&rows, pos);
            let column = Column::new(&window, amount);
            let cursor = column.cursor_in(&mut slot);
            let mut total = 0;
            while let Some(v) = cursor.value() {
                total += *v;
                cursor.next();
            }
            totals.push(total);
        }
        results.push(totals);
        partitions.next();
    }

    // Rows are newest first; each total covers the current event and every
    // older one.
    assert_eq!(results, vec![vec![6, 3, 1], vec![19, 11, 5], vec![7]]);
}

#[test]
fn test_rows_and_range_running_totals_agree() {
    let layout = event_layout();
    let table = table();
    let amount = FixedField::<i64>::for_column(&layout, cols::AMOUNT, 0).unwrap();

    let mut partitions = table.cursor();
    while let Some(rows) = partitions.value() {
        let mut row_cursor = rows.cursor();
        let mut pos = 0;
        while let Some(ts) = row_cursor.key() {
            let by_rows = RowsFrame::running().window(&rows, pos);
            let by_range = RangeFrame::running().window(&rows, ts);
            assert_eq!(
                collect_values(&Column::new(&by_rows, amount)),
                collect_values(&Column::new(&by_range, amount))
            );
            pos += 1;
            row_cursor.next();
        }
        partitions.next();
    }
}

#[test]
fn test_range_frame_per_partition() {
    let layout = event_layout();
    let table = table();
    let amount = FixedField::<i64>::for_column(&layout, cols::AMOUNT, 0).unwrap();
    let frame = RangeFrame::new(150, 0);

    let mut partitions = table.cursor();
    partitions.seek(&Key::from("bob"));
    let rows = partitions.value().unwrap();

    let mut totals = Vec::new();
    let mut row_cursor = rows.cursor();
    while let Some(ts) = row_cursor.key() {
        let window = frame.window(&rows, ts);
        totals.push(Column::new(&window, amount).cursor().entries().map(|(_, v)| v).sum::<i64>());
        row_cursor.next();
    }
    // 400: [250, 400] -> 8 + 6
    // 250: [100, 250] -> 6 + 5
    // 100: [0, 100]   -> 5
    assert_eq!(totals, vec![14, 11, 5]);
}

#[test]
fn test_seek_between_partitions() {
    let table = table();
    let mut cursor = table.cursor();

    cursor.seek(&Key::from("b"));
    assert_eq!(cursor.key(), Some(&Key::from("bob")));
    cursor.seek(&Key::from("carol"));
    assert_eq!(cursor.value().map(|rows| rows.count()), Some(1));
    cursor.seek(&Key::from("dave"));
    assert!(!cursor.valid());
    assert!(cursor.value().is_none());
}

#[test]
fn test_partition_errors_convert() {
    let layout = event_layout();
    let err = PartitionedTable::from_columns(&layout, Vec::new(), "missing", "ts").unwrap_err();
    assert!(matches!(err, CodecError::ColumnNotFound(_)));

    let err: NexusError = err.into();
    assert_eq!(err.code(), ErrorCode::ColumnNotFound);

    let err: NexusError = PartitionedTable::from_columns(&layout, Vec::new(), "score", "ts")
        .unwrap_err()
        .into();
    assert_eq!(err.code(), ErrorCode::InvalidArgument);
}

#[test]
fn test_oversized_partition_key_rejected() {
    let layout = event_layout();
    let user = "u".repeat(MAX_KEY_SIZE + 1);
    let rows = encode_events(&layout, &[Event::new("alice", 1, 1), Event::new(&user, 2, 2)]);

    let err = PartitionedTable::from_columns(&layout, rows, "user", "ts").unwrap_err();
    assert!(matches!(err, CodecError::KeyTooLarge { .. }));
    let err: NexusError = err.into();
    assert_eq!(err.code(), ErrorCode::KeyTooLarge);
}
