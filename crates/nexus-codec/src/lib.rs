//! # nexus-codec
//!
//! Row codec and column/window iteration for the NexusDB executor.
//!
//! Window functions evaluate over partitions of binary-encoded rows. This
//! crate lets evaluation code see such a partition as:
//!
//! - a randomly addressable [`List`] of rows
//! - a lazily decoded scalar [`Column`] of one field
//! - a framed sub-view: a [`RowCountWindow`] (`ROWS BETWEEN`) or a
//!   [`KeyRangeWindow`] (`RANGE BETWEEN`)
//!
//! All of these share one [`Cursor`] contract and compose freely. None of
//! them copy row data, and cursors can be recycled through a [`CursorSlot`]
//! so that the per-row evaluation loop does not allocate.
//!
//! ## Example
//!
//! ```rust
//! use nexus_codec::prelude::*;
//! use nexus_common::config::RowFormatConfig;
//! use nexus_common::types::Timestamp;
//!
//! let schema = Schema::default()
//!     .with_column("ts", DataType::Timestamp)
//!     .with_column("amount", DataType::Int64);
//! let layout = RowLayout::new(schema).unwrap();
//! let mut builder = RowBuilder::new(&layout, RowFormatConfig::default()).unwrap();
//!
//! let mut rows = Vec::new();
//! for (ts, amount) in [(400, 4), (300, 3), (200, 2), (100, 1)] {
//!     builder.set_timestamp(0, Timestamp::from_millis(ts)).unwrap();
//!     builder.set_i64(1, amount).unwrap();
//!     rows.push(KeyedRow::new(ts as u64, builder.build().unwrap()));
//! }
//! let partition = OrderedRows::new(&rows);
//!
//! // RANGE BETWEEN 100 PRECEDING AND CURRENT ROW, for the row at ts = 300
//! let window = RangeFrame::new(100, 0).window(&partition, 300);
//! let amount = FixedField::<i64>::for_column(&layout, 1, 0).unwrap();
//! let column = Column::new(&window, amount);
//!
//! let total: i64 = column.cursor().entries().map(|(_, v)| v).sum();
//! assert_eq!(total, 3 + 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod column;
pub mod cursor;
pub mod error;
pub mod frame;
pub mod layout;
pub mod list;
pub mod ordered;
pub mod partition;
pub mod row;
pub mod string_field;
pub mod window;

pub use builder::RowBuilder;
pub use column::{
    Column, ColumnCursor, ColumnDecoder, DateField, FieldDecode, FixedField, Nullable,
    ScalarValue, StringField, TimestampField,
};
pub use cursor::{Cursor, CursorSlot, OrderKey};
pub use error::{CodecError, CodecResult};
pub use frame::{RangeFrame, RowsFrame};
pub use layout::{ColumnDef, DataType, RowLayout, Schema};
pub use list::{ArrayList, List};
pub use ordered::{KeyedRow, OrderedRows};
pub use partition::{PartitionCursor, PartitionedTable};
pub use row::Row;
pub use window::{KeyRangeWindow, RowCountWindow};

/// Prelude for executor code.
pub mod prelude {
    pub use crate::builder::RowBuilder;
    pub use crate::column::{Column, ColumnDecoder, FieldDecode, FixedField, StringField};
    pub use crate::cursor::{Cursor, CursorSlot};
    pub use crate::frame::{RangeFrame, RowsFrame};
    pub use crate::layout::{DataType, RowLayout, Schema};
    pub use crate::list::{ArrayList, List};
    pub use crate::ordered::{KeyedRow, OrderedRows};
    pub use crate::partition::{PartitionCursor, PartitionedTable};
    pub use crate::row::Row;
    pub use crate::window::{KeyRangeWindow, RowCountWindow};
}
