//! Fixtures shared by the integration tests.

use nexus_codec::builder::RowBuilder;
use nexus_codec::cursor::Cursor;
use nexus_codec::layout::{DataType, RowLayout, Schema};
use nexus_codec::list::List;
use nexus_codec::ordered::KeyedRow;
use nexus_codec::row::Row;
use nexus_common::config::RowFormatConfig;
use nexus_common::types::{Date, Timestamp};
use tracing_subscriber::EnvFilter;

/// Column indexes of [`event_schema`].
pub mod cols {
    /// VARCHAR user name.
    pub const USER: usize = 0;
    /// TIMESTAMP event time.
    pub const TS: usize = 1;
    /// DATE event day.
    pub const DAY: usize = 2;
    /// BIGINT amount.
    pub const AMOUNT: usize = 3;
    /// DOUBLE score.
    pub const SCORE: usize = 4;
    /// SMALLINT priority.
    pub const PRIORITY: usize = 5;
    /// VARCHAR note.
    pub const NOTE: usize = 6;
}

/// Installs a `tracing` subscriber once per test binary.
///
/// Set `RUST_LOG=nexus_codec=trace` to see window construction.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Schema of the event table used across tests.
pub fn event_schema() -> Schema {
    Schema::default()
        .with_column("user", DataType::Varchar)
        .with_column("ts", DataType::Timestamp)
        .with_column("day", DataType::Date)
        .with_column("amount", DataType::Int64)
        .with_column("score", DataType::Double)
        .with_column("priority", DataType::Int16)
        .with_column("note", DataType::Varchar)
}

/// Layout of [`event_schema`].
pub fn event_layout() -> RowLayout {
    RowLayout::new(event_schema()).expect("event schema is valid")
}

/// One row of the event table.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// User name.
    pub user: String,
    /// Event time in milliseconds.
    pub ts: i64,
    /// Event day.
    pub day: Date,
    /// Amount.
    pub amount: i64,
    /// Score.
    pub score: f64,
    /// Priority.
    pub priority: i16,
    /// Free-form note.
    pub note: String,
}

impl Event {
    /// Creates an event with derived defaults for the remaining columns.
    pub fn new(user: &str, ts: i64, amount: i64) -> Self {
        Self {
            user: user.to_string(),
            ts,
            day: Date::from_ymd(2024, 1, 1 + (ts.rem_euclid(28)) as u32).unwrap_or(Date::ZERO),
            amount,
            score: amount as f64 / 2.0,
            priority: (amount % 5) as i16,
            note: format!("event {ts}"),
        }
    }

    /// Encodes the event.
    pub fn encode(&self, builder: &mut RowBuilder<'_>) -> Row {
        builder.set_string(cols::USER, &self.user).expect("user");
        builder
            .set_timestamp(cols::TS, Timestamp::from_millis(self.ts))
            .expect("ts");
        builder.set_date(cols::DAY, self.day).expect("day");
        builder.set_i64(cols::AMOUNT, self.amount).expect("amount");
        builder.set_f64(cols::SCORE, self.score).expect("score");
        builder.set_i16(cols::PRIORITY, self.priority).expect("priority");
        builder.set_string(cols::NOTE, &self.note).expect("note");
        builder.build().expect("event row fits")
    }
}

/// Encodes events as rows keyed by event time, newest first.
pub fn keyed_events(layout: &RowLayout, events: &[Event]) -> Vec<KeyedRow> {
    let mut builder =
        RowBuilder::new(layout, RowFormatConfig::for_testing()).expect("test config is valid");
    let mut rows: Vec<KeyedRow> = events
        .iter()
        .map(|e| KeyedRow::new(e.ts as u64, e.encode(&mut builder)))
        .collect();
    rows.sort_by(|a, b| b.key.cmp(&a.key));
    rows
}

/// Encodes one event per ordering key for user `"u"`, amount equal to the key.
pub fn keyed_rows(layout: &RowLayout, keys: &[u64]) -> Vec<KeyedRow> {
    let events: Vec<Event> = keys
        .iter()
        .map(|&k| Event::new("u", k as i64, k as i64))
        .collect();
    keyed_events(layout, &events)
}

/// Encodes events in input order.
pub fn encode_events(layout: &RowLayout, events: &[Event]) -> Vec<Row> {
    let mut builder =
        RowBuilder::new(layout, RowFormatConfig::for_testing()).expect("test config is valid");
    events.iter().map(|e| e.encode(&mut builder)).collect()
}

/// Collects the keys a list's cursor visits.
pub fn collect_keys<L: List<Row>>(list: &L) -> Vec<u64> {
    list.cursor().entries().map(|(k, _)| k).collect()
}

/// Collects the values a list's cursor visits.
pub fn collect_values<V: Clone, L: List<V>>(list: &L) -> Vec<V> {
    let mut cursor = list.cursor();
    let mut out = Vec::new();
    while let Some(v) = cursor.value() {
        out.push(v.clone());
        cursor.next();
    }
    out
}
