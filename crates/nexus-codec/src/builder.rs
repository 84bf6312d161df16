//! Row encoding.
//!
//! `RowBuilder` writes rows in the layout described in [`crate::layout`].
//! A builder is reusable: `build` resets it so the next row can be filled
//! without reallocating the fixed-width scratch area.

use bytes::{BufMut, Bytes, BytesMut};
use nexus_common::config::RowFormatConfig;
use nexus_common::constants::HEADER_LENGTH;
use nexus_common::types::{Date, Timestamp};
use tracing::debug;

use crate::error::{CodecError, CodecResult};
use crate::layout::{DataType, FieldLocation, RowLayout};
use crate::row::Row;
use crate::string_field::total_row_size;

/// Encodes rows for a layout.
///
/// Columns that are never set are encoded as null.
///
/// # Example
///
/// ```rust
/// use nexus_codec::builder::RowBuilder;
/// use nexus_codec::layout::{DataType, RowLayout, Schema};
/// use nexus_common::config::RowFormatConfig;
///
/// let schema = Schema::default()
///     .with_column("id", DataType::Int64)
///     .with_column("name", DataType::Varchar);
/// let layout = RowLayout::new(schema).unwrap();
/// let mut builder = RowBuilder::new(&layout, RowFormatConfig::default()).unwrap();
///
/// builder.set_i64(0, 7).unwrap();
/// builder.set_string(1, "seven").unwrap();
/// let row = builder.build().unwrap();
/// assert_eq!(row.declared_size(0), Some(row.size(0)));
/// ```
#[derive(Debug)]
pub struct RowBuilder<'a> {
    layout: &'a RowLayout,
    config: RowFormatConfig,
    /// Header, null bitmap and fixed-width columns.
    fixed: Vec<u8>,
    /// String column values by string ordinal.
    strings: Vec<Option<Bytes>>,
}

impl<'a> RowBuilder<'a> {
    /// Creates a builder for `layout`.
    pub fn new(layout: &'a RowLayout, config: RowFormatConfig) -> CodecResult<Self> {
        config.validate().map_err(CodecError::InvalidConfig)?;
        let mut builder = Self {
            layout,
            config,
            fixed: vec![0u8; layout.str_start_offset() as usize],
            strings: vec![None; layout.string_field_count() as usize],
        };
        builder.reset();
        Ok(builder)
    }

    /// Returns the layout this builder encodes.
    pub fn layout(&self) -> &RowLayout {
        self.layout
    }

    /// Clears all column values (every column becomes null).
    pub fn reset(&mut self) {
        self.fixed.fill(0);
        let bitmap = HEADER_LENGTH..HEADER_LENGTH + self.layout.bitmap_size();
        self.fixed[bitmap].fill(0xFF);
        self.strings.iter_mut().for_each(|s| *s = None);
    }

    /// Sets a BOOL column.
    pub fn set_bool(&mut self, column: usize, value: bool) -> CodecResult<()> {
        self.put_fixed(column, DataType::Bool, &[u8::from(value)])
    }

    /// Sets a SMALLINT column.
    pub fn set_i16(&mut self, column: usize, value: i16) -> CodecResult<()> {
        self.put_fixed(column, DataType::Int16, &value.to_le_bytes())
    }

    /// Sets an INT column.
    pub fn set_i32(&mut self, column: usize, value: i32) -> CodecResult<()> {
        self.put_fixed(column, DataType::Int32, &value.to_le_bytes())
    }

    /// Sets a BIGINT column.
    pub fn set_i64(&mut self, column: usize, value: i64) -> CodecResult<()> {
        self.put_fixed(column, DataType::Int64, &value.to_le_bytes())
    }

    /// Sets a FLOAT column.
    pub fn set_f32(&mut self, column: usize, value: f32) -> CodecResult<()> {
        self.put_fixed(column, DataType::Float, &value.to_le_bytes())
    }

    /// Sets a DOUBLE column.
    pub fn set_f64(&mut self, column: usize, value: f64) -> CodecResult<()> {
        self.put_fixed(column, DataType::Double, &value.to_le_bytes())
    }

    /// Sets a TIMESTAMP column. The raw millisecond value is written as is.
    pub fn set_timestamp(&mut self, column: usize, value: Timestamp) -> CodecResult<()> {
        self.put_fixed(column, DataType::Timestamp, &value.as_millis().to_le_bytes())
    }

    /// Sets a DATE column. The packed value is written as is.
    pub fn set_date(&mut self, column: usize, value: Date) -> CodecResult<()> {
        self.put_fixed(column, DataType::Date, &value.packed().to_le_bytes())
    }

    /// Sets a VARCHAR column.
    pub fn set_string(&mut self, column: usize, value: impl AsRef<[u8]>) -> CodecResult<()> {
        match self.layout.typed_location(column, DataType::Varchar)? {
            FieldLocation::String { field_index, .. } => {
                self.strings[field_index as usize] =
                    Some(Bytes::copy_from_slice(value.as_ref()));
                self.set_null_bit(column, false);
                Ok(())
            }
            FieldLocation::Fixed { .. } => Err(CodecError::invalid_schema(format!(
                "column {column} is declared VARCHAR but has a fixed location"
            ))),
        }
    }

    /// Marks a column as null.
    pub fn set_null(&mut self, column: usize) -> CodecResult<()> {
        let data_type = self.layout.data_type(column)?;
        match self.layout.location(column)? {
            FieldLocation::Fixed { offset } => {
                let width = data_type.fixed_width().unwrap_or_default();
                let offset = offset as usize;
                self.fixed[offset..offset + width].fill(0);
            }
            FieldLocation::String { field_index, .. } => {
                self.strings[field_index as usize] = None;
            }
        }
        self.set_null_bit(column, true);
        Ok(())
    }

    /// Encodes the current values and resets the builder.
    pub fn build(&mut self) -> CodecResult<Row> {
        let string_bytes: usize = self.strings.iter().flatten().map(Bytes::len).sum();
        let max = self.config.max_row_size as usize;
        let too_large = || CodecError::RowTooLarge {
            size: self.fixed.len() + string_bytes,
            max,
        };

        let (total, tier) = total_row_size(
            self.layout.str_start_offset(),
            self.layout.string_field_count(),
            string_bytes,
        )
        .ok_or_else(too_large)?;

        if total as usize > max {
            debug!(size = total, max, "rejecting oversized row");
            return Err(CodecError::RowTooLarge {
                size: total as usize,
                max,
            });
        }

        let mut buf = BytesMut::with_capacity(total as usize);
        buf.put_u8(self.config.format_version);
        buf.put_u8(self.config.schema_version);
        buf.put_u32_le(total);
        buf.put_slice(&self.fixed[HEADER_LENGTH..]);

        let table_len = self.strings.len() * tier.width();
        let mut entry = [0u8; 4];
        let mut next = self.fixed.len() + table_len;
        for s in &self.strings {
            tier.write(next as u32, &mut entry);
            buf.put_slice(&entry[..tier.width()]);
            next += s.as_ref().map_or(0, Bytes::len);
        }
        for s in self.strings.iter().flatten() {
            buf.put_slice(s);
        }
        debug_assert_eq!(buf.len(), total as usize);

        self.reset();
        Ok(Row::new(buf.freeze()))
    }

    fn put_fixed(&mut self, column: usize, expected: DataType, bytes: &[u8]) -> CodecResult<()> {
        match self.layout.typed_location(column, expected)? {
            FieldLocation::Fixed { offset } => {
                let offset = offset as usize;
                self.fixed[offset..offset + bytes.len()].copy_from_slice(bytes);
                self.set_null_bit(column, false);
                Ok(())
            }
            FieldLocation::String { .. } => Err(CodecError::invalid_schema(format!(
                "column {column} is declared {expected} but has a string location"
            ))),
        }
    }

    fn set_null_bit(&mut self, column: usize, null: bool) {
        let byte = &mut self.fixed[HEADER_LENGTH + column / 8];
        let mask = 1u8 << (column % 8);
        if null {
            *byte |= mask;
        } else {
            *byte &= !mask;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Schema;
    use crate::string_field::{resolve_str_field, AddrSpace};

    fn layout() -> RowLayout {
        RowLayout::new(
            Schema::default()
                .with_column("id", DataType::Int32)
                .with_column("name", DataType::Varchar)
                .with_column("score", DataType::Double)
                .with_column("note", DataType::Varchar),
        )
        .unwrap()
    }

    #[test]
    fn test_build_header_and_fixed() {
        let layout = layout();
        let mut builder = RowBuilder::new(&layout, RowFormatConfig::default()).unwrap();
        builder.set_i32(0, -17).unwrap();
        builder.set_f64(2, 2.5).unwrap();
        let row = builder.build().unwrap();

        assert_eq!(row.format_version(0), Some(1));
        assert_eq!(row.declared_size(0), Some(row.size(0)));
        // header 6 + bitmap 1 + i32 4 + f64 8 + table 2 * 1
        assert_eq!(row.size(0), 21);
        let buf = row.buffer(0);
        assert_eq!(i32::from_le_bytes(buf[7..11].try_into().unwrap()), -17);
        assert_eq!(f64::from_le_bytes(buf[11..19].try_into().unwrap()), 2.5);
    }

    #[test]
    fn test_null_bits() {
        let layout = layout();
        let mut builder = RowBuilder::new(&layout, RowFormatConfig::default()).unwrap();
        builder.set_i32(0, 1).unwrap();
        builder.set_string(3, "n").unwrap();
        let row = builder.build().unwrap();

        assert!(!layout.is_null(&row, 0, 0));
        assert!(layout.is_null(&row, 0, 1));
        assert!(layout.is_null(&row, 0, 2));
        assert!(!layout.is_null(&row, 0, 3));

        builder.set_i32(0, 1).unwrap();
        builder.set_null(0).unwrap();
        let row = builder.build().unwrap();
        assert!(layout.is_null(&row, 0, 0));
    }

    #[test]
    fn test_strings_resolve() {
        let layout = layout();
        let mut builder = RowBuilder::new(&layout, RowFormatConfig::default()).unwrap();
        builder.set_string(1, "hello").unwrap();
        builder.set_string(3, "world!").unwrap();
        let row = builder.build().unwrap();

        let buf = row.fragment(0).unwrap();
        let tier = AddrSpace::for_row_size(row.size(0));
        let start = layout.str_start_offset();
        assert_eq!(&resolve_str_field(buf, 0, Some(1), start, tier).unwrap()[..], b"hello");
        assert_eq!(&resolve_str_field(buf, 1, None, start, tier).unwrap()[..], b"world!");
    }

    #[test]
    fn test_type_mismatch() {
        let layout = layout();
        let mut builder = RowBuilder::new(&layout, RowFormatConfig::default()).unwrap();
        assert!(matches!(
            builder.set_i64(0, 1),
            Err(CodecError::TypeMismatch {
                column: 0,
                expected: DataType::Int64,
                found: DataType::Int32,
            })
        ));
        assert!(matches!(
            builder.set_string(0, "x"),
            Err(CodecError::TypeMismatch { .. })
        ));
        assert!(matches!(
            builder.set_i32(10, 1),
            Err(CodecError::ColumnIndexOutOfRange { .. })
        ));
    }

    #[test]
    fn test_row_too_large() {
        let layout = layout();
        let config = RowFormatConfig {
            max_row_size: 64,
            ..Default::default()
        };
        let mut builder = RowBuilder::new(&layout, config).unwrap();
        builder.set_string(1, "x".repeat(100)).unwrap();
        assert!(matches!(
            builder.build(),
            Err(CodecError::RowTooLarge { max: 64, .. })
        ));
    }

    #[test]
    fn test_invalid_config() {
        let layout = layout();
        let config = RowFormatConfig {
            format_version: 2,
            ..Default::default()
        };
        assert!(matches!(
            RowBuilder::new(&layout, config),
            Err(CodecError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_builder_resets_after_build() {
        let layout = layout();
        let mut builder = RowBuilder::new(&layout, RowFormatConfig::default()).unwrap();
        builder.set_string(1, "first").unwrap();
        let first = builder.build().unwrap();
        let second = builder.build().unwrap();
        assert!(first.size(0) > second.size(0));
        assert!(layout.is_null(&second, 0, 1));
    }

    #[test]
    fn test_check_header() {
        let layout = layout();
        let mut builder = RowBuilder::new(&layout, RowFormatConfig::default()).unwrap();
        let row = builder.build().unwrap();
        assert!(layout.check_header(&row, 0, &RowFormatConfig::default()).is_ok());

        let strict = RowFormatConfig {
            schema_version: 4,
            strict_header: true,
            ..Default::default()
        };
        assert!(matches!(
            layout.check_header(&row, 0, &strict),
            Err(CodecError::InvalidHeader(_))
        ));

        let truncated = Row::new(row.fragment(0).unwrap().slice(..10));
        assert!(layout.check_header(&truncated, 0, &RowFormatConfig::default()).is_err());
    }
}
