//! Benchmark utilities and helpers.

use nexus_codec::builder::RowBuilder;
use nexus_codec::layout::{DataType, RowLayout, Schema};
use nexus_codec::ordered::KeyedRow;
use nexus_common::config::RowFormatConfig;
use nexus_common::types::Timestamp;
use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Column index of the event time.
pub const TS: usize = 0;
/// Column index of the amount.
pub const AMOUNT: usize = 1;
/// Column index of the price.
pub const PRICE: usize = 2;
/// Column index of the symbol.
pub const SYMBOL: usize = 3;

/// Generates random string data for benchmarks.
pub fn random_string(rng: &mut StdRng, len: usize) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Layout of the trade rows used by the benchmarks.
pub fn trade_layout() -> RowLayout {
    RowLayout::new(
        Schema::default()
            .with_column("ts", DataType::Timestamp)
            .with_column("amount", DataType::Int64)
            .with_column("price", DataType::Double)
            .with_column("symbol", DataType::Varchar),
    )
    .expect("trade schema is valid")
}

/// Generates one partition of trades, newest first.
///
/// Event times advance by a random step of 1 to 100 ms.
pub fn generate_partition(layout: &RowLayout, count: usize, symbol_len: usize) -> Vec<KeyedRow> {
    let mut rng = StdRng::seed_from_u64(42);
    let mut builder =
        RowBuilder::new(layout, RowFormatConfig::default()).expect("default config is valid");
    let mut ts: i64 = 1_700_000_000_000;

    let mut rows: Vec<KeyedRow> = (0..count)
        .map(|_| {
            ts += rng.gen_range(1..=100);
            let symbol = random_string(&mut rng, symbol_len);
            builder.set_timestamp(TS, Timestamp::from_millis(ts)).expect("ts");
            builder.set_i64(AMOUNT, rng.gen_range(1..1_000)).expect("amount");
            builder.set_f64(PRICE, rng.gen_range(1.0..500.0)).expect("price");
            builder.set_string(SYMBOL, symbol).expect("symbol");
            KeyedRow::new(ts as u64, builder.build().expect("row fits"))
        })
        .collect();
    rows.reverse();
    rows
}
