//! Partition traversal.
//!
//! Window functions evaluate one partition at a time. A [`PartitionCursor`]
//! walks the partitions of a table in ascending partition-key order and
//! hands out each partition's rows as a root row list, on top of which the
//! column and window views are built.
//!
//! [`PartitionedTable`] is the in-memory implementation: rows grouped by
//! partition key, each group sorted by descending ordering key.

use std::collections::BTreeMap;

use nexus_common::types::{Key, MAX_KEY_SIZE};
use tracing::debug;

use crate::column::{ColumnDecoder, FieldDecode, ScalarValue};
use crate::cursor::OrderKey;
use crate::error::{CodecError, CodecResult};
use crate::layout::{DataType, RowLayout};
use crate::list::List;
use crate::ordered::{KeyedRow, OrderedRows};
use crate::row::Row;

/// Cursor over the partitions of a table.
pub trait PartitionCursor {
    /// Row list of one partition.
    type Rows<'a>: List<Row>
    where
        Self: 'a;

    /// Positions at the first partition whose key is not less than `key`.
    fn seek(&mut self, key: &Key);

    /// Positions at the first partition.
    fn seek_to_first(&mut self);

    /// Advances to the next partition.
    fn next(&mut self);

    /// Returns true if the cursor is positioned on a partition.
    fn valid(&self) -> bool;

    /// Returns the current partition key.
    fn key(&self) -> Option<&Key>;

    /// Returns the rows of the current partition.
    fn value(&self) -> Option<Self::Rows<'_>>;
}

/// Rows sharing one partition key.
#[derive(Debug, Clone)]
pub struct Partition {
    key: Key,
    rows: Vec<KeyedRow>,
}

impl Partition {
    /// Returns the partition key.
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// Returns the rows, newest first.
    pub fn rows(&self) -> OrderedRows<'_> {
        OrderedRows::new(&self.rows)
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the partition has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// An in-memory table split into partitions.
#[derive(Debug, Clone, Default)]
pub struct PartitionedTable {
    partitions: Vec<Partition>,
    row_count: usize,
}

impl PartitionedTable {
    /// Groups rows by partition key.
    ///
    /// Partitions are ordered by ascending key; rows inside a partition by
    /// descending ordering key. Rows with equal ordering keys keep their
    /// input order.
    ///
    /// Fails with [`CodecError::KeyTooLarge`] if a partition key is longer
    /// than [`MAX_KEY_SIZE`].
    pub fn build(rows: impl IntoIterator<Item = (Key, KeyedRow)>) -> CodecResult<Self> {
        let mut groups: BTreeMap<Key, Vec<KeyedRow>> = BTreeMap::new();
        let mut row_count = 0;
        for (key, row) in rows {
            if key.len() > MAX_KEY_SIZE {
                return Err(CodecError::KeyTooLarge {
                    size: key.len(),
                    max: MAX_KEY_SIZE,
                });
            }
            groups.entry(key).or_default().push(row);
            row_count += 1;
        }

        let partitions: Vec<Partition> = groups
            .into_iter()
            .map(|(key, mut rows)| {
                rows.sort_by(|a, b| b.key.cmp(&a.key));
                Partition { key, rows }
            })
            .collect();

        debug!(
            partitions = partitions.len(),
            rows = row_count,
            "partitioned table built"
        );
        Ok(Self {
            partitions,
            row_count,
        })
    }

    /// Groups encoded rows using two columns of `layout`: the partition
    /// column and the ordering column.
    ///
    /// The ordering column must be an integer, TIMESTAMP or DATE column.
    /// Floating point columns cannot be used for either role.
    pub fn from_columns(
        layout: &RowLayout,
        rows: impl IntoIterator<Item = Row>,
        partition_column: &str,
        order_column: &str,
    ) -> CodecResult<Self> {
        let partition = ColumnDecoder::for_name(layout, partition_column, 0)?;
        let order = ColumnDecoder::for_name(layout, order_column, 0)?;

        if matches!(partition.data_type(), DataType::Float | DataType::Double) {
            return Err(CodecError::invalid_schema(format!(
                "cannot partition by {} column '{partition_column}'",
                partition.data_type()
            )));
        }
        if !matches!(
            order.data_type(),
            DataType::Int16 | DataType::Int32 | DataType::Int64 | DataType::Timestamp | DataType::Date
        ) {
            return Err(CodecError::invalid_schema(format!(
                "cannot order by {} column '{order_column}'",
                order.data_type()
            )));
        }

        Self::build(rows.into_iter().map(|row| {
            let key = partition_key(&partition.decode(&row));
            let order_key = order_key(&order.decode(&row));
            (key, KeyedRow::new(order_key, row))
        }))
    }

    /// Returns the number of partitions.
    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    /// Returns the total number of rows.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Returns true if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }

    /// Looks up one partition.
    pub fn partition(&self, key: &Key) -> Option<&Partition> {
        self.partitions
            .binary_search_by(|p| p.key.cmp(key))
            .ok()
            .map(|i| &self.partitions[i])
    }

    /// Returns all partitions in key order.
    pub fn partitions(&self) -> &[Partition] {
        &self.partitions
    }

    /// Returns a cursor over the partitions.
    pub fn cursor(&self) -> TablePartitionCursor<'_> {
        TablePartitionCursor {
            partitions: &self.partitions,
            pos: 0,
        }
    }
}

/// Order-preserving offset applied to signed ordering values.
const SIGN_FLIP: u64 = 1 << 63;

fn partition_key(value: &ScalarValue) -> Key {
    match value {
        ScalarValue::Null | ScalarValue::Float(_) | ScalarValue::Double(_) => Key::empty(),
        ScalarValue::Bool(v) => Key::from_u64(u64::from(*v)),
        ScalarValue::Int16(_) | ScalarValue::Int32(_) | ScalarValue::Int64(_) => {
            Key::from_u64(value.as_i64().map_or(0, |v| v as u64 ^ SIGN_FLIP))
        }
        ScalarValue::Timestamp(ts) => Key::from_u64(ts.as_millis() as u64),
        ScalarValue::Date(date) => Key::from_u64(date.packed() as u64),
        ScalarValue::Varchar(s) => Key::from_raw(s.clone().into_bytes()),
    }
}

fn order_key(value: &ScalarValue) -> OrderKey {
    match value {
        ScalarValue::Timestamp(ts) => ts.as_millis() as u64,
        ScalarValue::Date(date) => date.packed() as u64,
        _ => value.as_i64().map_or(0, |v| v as u64 ^ SIGN_FLIP),
    }
}

/// Cursor over the partitions of a [`PartitionedTable`].
#[derive(Debug, Clone)]
pub struct TablePartitionCursor<'t> {
    partitions: &'t [Partition],
    pos: usize,
}

impl<'t> TablePartitionCursor<'t> {
    /// Returns the current partition.
    pub fn partition(&self) -> Option<&'t Partition> {
        self.partitions.get(self.pos)
    }
}

impl<'t> PartitionCursor for TablePartitionCursor<'t> {
    type Rows<'a> = OrderedRows<'t> where Self: 'a;

    fn seek(&mut self, key: &Key) {
        self.pos = self.partitions.partition_point(|p| p.key < *key);
    }

    fn seek_to_first(&mut self) {
        self.pos = 0;
    }

    fn next(&mut self) {
        if self.pos < self.partitions.len() {
            self.pos += 1;
        }
    }

    fn valid(&self) -> bool {
        self.pos < self.partitions.len()
    }

    fn key(&self) -> Option<&Key> {
        self.partition().map(Partition::key)
    }

    fn value(&self) -> Option<OrderedRows<'t>> {
        self.partition().map(|p| OrderedRows::new(&p.rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::RowBuilder;
    use crate::cursor::Cursor;
    use crate::layout::Schema;
    use nexus_common::config::RowFormatConfig;
    use nexus_common::types::Timestamp;

    fn table() -> PartitionedTable {
        let input = [("b", 5), ("a", 1), ("b", 9), ("c", 4), ("a", 3), ("b", 7)];
        PartitionedTable::build(
            input
                .iter()
                .map(|&(p, k)| (Key::from(p), KeyedRow::new(k, Row::empty()))),
        )
        .unwrap()
    }

    fn keys_of<L: List<Row>>(rows: &L) -> Vec<u64> {
        rows.cursor().entries().map(|(k, _)| k).collect()
    }

    #[test]
    fn test_build_groups_and_sorts() {
        let table = table();
        assert_eq!(table.partition_count(), 3);
        assert_eq!(table.row_count(), 6);

        let b = table.partition(&Key::from("b")).unwrap();
        assert_eq!(b.len(), 3);
        assert_eq!(keys_of(&b.rows()), vec![9, 7, 5]);
        assert!(table.partition(&Key::from("z")).is_none());
    }

    #[test]
    fn test_cursor_walks_partitions_in_key_order() {
        let table = table();
        let mut cursor = table.cursor();
        let mut seen = Vec::new();
        while cursor.valid() {
            let rows = cursor.value().unwrap();
            seen.push((cursor.key().unwrap().to_string(), rows.count()));
            cursor.next();
        }
        assert_eq!(
            seen,
            vec![("a".to_string(), 2), ("b".to_string(), 3), ("c".to_string(), 1)]
        );
        assert!(cursor.key().is_none());
        assert!(cursor.value().is_none());
    }

    #[test]
    fn test_seek_lands_on_first_key_not_less() {
        let table = table();
        let mut cursor = table.cursor();

        cursor.seek(&Key::from("b"));
        assert_eq!(cursor.key(), Some(&Key::from("b")));
        cursor.seek(&Key::from("bb"));
        assert_eq!(cursor.key(), Some(&Key::from("c")));
        cursor.seek(&Key::from("d"));
        assert!(!cursor.valid());
        cursor.seek_to_first();
        assert_eq!(cursor.key(), Some(&Key::from("a")));
    }

    #[test]
    fn test_partition_rows_outlive_cursor() {
        let table = table();
        let rows = {
            let mut cursor = table.cursor();
            cursor.seek(&Key::from("c"));
            cursor.value().unwrap()
        };
        assert_eq!(keys_of(&rows), vec![4]);
    }

    #[test]
    fn test_empty_table() {
        let table = PartitionedTable::build(Vec::new()).unwrap();
        assert!(table.is_empty());
        assert!(!table.cursor().valid());
    }

    #[test]
    fn test_from_columns() {
        let layout = RowLayout::new(
            Schema::default()
                .with_column("user", DataType::Varchar)
                .with_column("ts", DataType::Timestamp)
                .with_column("amount", DataType::Double),
        )
        .unwrap();
        let mut builder = RowBuilder::new(&layout, RowFormatConfig::default()).unwrap();
        let mut rows = Vec::new();
        for (user, ts) in [("u2", 30), ("u1", 10), ("u2", 50), ("u1", 20)] {
            builder.set_string(0, user).unwrap();
            builder.set_timestamp(1, Timestamp::from_millis(ts)).unwrap();
            builder.set_f64(2, 1.0).unwrap();
            rows.push(builder.build().unwrap());
        }

        let table = PartitionedTable::from_columns(&layout, rows, "user", "ts").unwrap();
        assert_eq!(table.partition_count(), 2);
        let u2 = table.partition(&Key::from("u2")).unwrap();
        assert_eq!(keys_of(&u2.rows()), vec![50, 30]);

        assert!(matches!(
            PartitionedTable::from_columns(&layout, Vec::new(), "amount", "ts"),
            Err(CodecError::InvalidSchema(_))
        ));
        assert!(matches!(
            PartitionedTable::from_columns(&layout, Vec::new(), "user", "user"),
            Err(CodecError::InvalidSchema(_))
        ));
        assert!(PartitionedTable::from_columns(&layout, Vec::new(), "nope", "ts").is_err());
    }

    #[test]
    fn test_partition_key_size_limit() {
        let at_limit = Key::from_vec(vec![b'k'; MAX_KEY_SIZE]);
        let table = PartitionedTable::build(vec![(at_limit, KeyedRow::new(1, Row::empty()))]);
        assert_eq!(table.unwrap().partition_count(), 1);

        let too_long = Key::from_vec(vec![b'k'; MAX_KEY_SIZE + 1]);
        let err = PartitionedTable::build(vec![
            (Key::from("a"), KeyedRow::new(1, Row::empty())),
            (too_long, KeyedRow::new(2, Row::empty())),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            CodecError::KeyTooLarge { size, max } if size == MAX_KEY_SIZE + 1 && max == MAX_KEY_SIZE
        ));
    }

    #[test]
    fn test_signed_order_keys_keep_order() {
        let low = order_key(&ScalarValue::Int64(-5));
        let high = order_key(&ScalarValue::Int64(5));
        assert!(low < high);
        assert_eq!(high - low, 10);
        assert!(partition_key(&ScalarValue::Int32(-1)) < partition_key(&ScalarValue::Int32(1)));
    }
}
