//! Row layout computed from a schema.
//!
//! The layout assigns every column a location inside an encoded fragment:
//!
//! ```text
//! +--------+-------------+------------------+---------------------+-------------+
//! | header | null bitmap | fixed-width cols | string offset table | string data |
//! | 6 B    | ceil(n/8) B | schema order, LE | tier bytes / string |             |
//! +--------+-------------+------------------+---------------------+-------------+
//! ```
//!
//! Fixed-width columns live at a byte offset. Variable-length columns are
//! addressed by their ordinal among the string columns; the offset table
//! starts at `str_start_offset` and each entry is as wide as the row's
//! address-space tier.

use std::fmt;

use nexus_common::config::RowFormatConfig;
use nexus_common::constants::HEADER_LENGTH;
use serde::{Deserialize, Serialize};

use crate::error::{CodecError, CodecResult};
use crate::row::Row;

/// Column data types supported by the row format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// 1-byte boolean.
    Bool,
    /// 2-byte signed integer.
    Int16,
    /// 4-byte signed integer.
    Int32,
    /// 8-byte signed integer.
    Int64,
    /// 4-byte IEEE float.
    Float,
    /// 8-byte IEEE float.
    Double,
    /// 8-byte millisecond timestamp.
    Timestamp,
    /// 4-byte packed date.
    Date,
    /// Variable-length string.
    Varchar,
}

impl DataType {
    /// Returns the encoded width, or `None` for variable-length types.
    #[must_use]
    pub const fn fixed_width(self) -> Option<usize> {
        match self {
            Self::Bool => Some(1),
            Self::Int16 => Some(2),
            Self::Int32 | Self::Float | Self::Date => Some(4),
            Self::Int64 | Self::Double | Self::Timestamp => Some(8),
            Self::Varchar => None,
        }
    }

    /// Returns true for variable-length types.
    #[must_use]
    pub const fn is_variable_length(self) -> bool {
        self.fixed_width().is_none()
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "BOOL",
            Self::Int16 => "SMALLINT",
            Self::Int32 => "INT",
            Self::Int64 => "BIGINT",
            Self::Float => "FLOAT",
            Self::Double => "DOUBLE",
            Self::Timestamp => "TIMESTAMP",
            Self::Date => "DATE",
            Self::Varchar => "VARCHAR",
        };
        f.write_str(name)
    }
}

/// A column definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Column name.
    pub name: String,
    /// Declared type.
    pub data_type: DataType,
}

impl ColumnDef {
    /// Creates a new column definition.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// An ordered list of column definitions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    columns: Vec<ColumnDef>,
}

impl Schema {
    /// Creates a schema from column definitions.
    pub fn new(columns: Vec<ColumnDef>) -> Self {
        Self { columns }
    }

    /// Adds a column, builder style.
    #[must_use]
    pub fn with_column(mut self, name: impl Into<String>, data_type: DataType) -> Self {
        self.columns.push(ColumnDef::new(name, data_type));
        self
    }

    /// Returns the columns.
    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    /// Returns the number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if the schema has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Where a column is stored inside an encoded fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldLocation {
    /// Fixed-width value at a byte offset.
    Fixed {
        /// Byte offset from the start of the fragment.
        offset: u32,
    },
    /// Variable-length value resolved through the string offset table.
    String {
        /// Ordinal of this column among the string columns.
        field_index: u32,
        /// Ordinal of the next string column, if any.
        next_field_index: Option<u32>,
        /// Byte offset of the string offset table.
        str_start_offset: u32,
    },
}

/// Column locations for a schema.
#[derive(Debug, Clone)]
pub struct RowLayout {
    schema: Schema,
    locations: Vec<FieldLocation>,
    bitmap_size: usize,
    str_start_offset: u32,
    string_field_count: u32,
}

impl RowLayout {
    /// Computes the layout of a schema.
    pub fn new(schema: Schema) -> CodecResult<Self> {
        if schema.is_empty() {
            return Err(CodecError::invalid_schema("schema has no columns"));
        }
        for (i, col) in schema.columns().iter().enumerate() {
            if schema.columns()[..i].iter().any(|c| c.name == col.name) {
                return Err(CodecError::invalid_schema(format!(
                    "duplicate column name '{}'",
                    col.name
                )));
            }
        }

        let bitmap_size = schema.len().div_ceil(8);
        let mut offset = HEADER_LENGTH + bitmap_size;
        let mut string_field_count = 0u32;
        let mut locations = Vec::with_capacity(schema.len());

        for col in schema.columns() {
            match col.data_type.fixed_width() {
                Some(width) => {
                    locations.push(FieldLocation::Fixed {
                        offset: offset as u32,
                    });
                    offset += width;
                }
                None => {
                    locations.push(FieldLocation::String {
                        field_index: string_field_count,
                        next_field_index: None,
                        str_start_offset: 0,
                    });
                    string_field_count += 1;
                }
            }
        }

        let str_start_offset = offset as u32;
        for loc in &mut locations {
            if let FieldLocation::String {
                field_index,
                next_field_index,
                str_start_offset: start,
            } = loc
            {
                *start = str_start_offset;
                if *field_index + 1 < string_field_count {
                    *next_field_index = Some(*field_index + 1);
                }
            }
        }

        Ok(Self {
            schema,
            locations,
            bitmap_size,
            str_start_offset,
            string_field_count,
        })
    }

    /// Returns the schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Returns the number of columns.
    pub fn column_count(&self) -> usize {
        self.locations.len()
    }

    /// Returns the number of variable-length columns.
    pub fn string_field_count(&self) -> u32 {
        self.string_field_count
    }

    /// Returns the byte offset of the string offset table.
    ///
    /// This is also the size of the fixed part of an encoded row.
    pub fn str_start_offset(&self) -> u32 {
        self.str_start_offset
    }

    /// Returns the size of the null bitmap in bytes.
    pub fn bitmap_size(&self) -> usize {
        self.bitmap_size
    }

    /// Looks up a column index by name.
    pub fn column_index(&self, name: &str) -> CodecResult<usize> {
        self.schema
            .columns()
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| CodecError::ColumnNotFound(name.to_string()))
    }

    /// Returns the declared type of a column.
    pub fn data_type(&self, column: usize) -> CodecResult<DataType> {
        self.schema
            .columns()
            .get(column)
            .map(|c| c.data_type)
            .ok_or(CodecError::ColumnIndexOutOfRange {
                index: column,
                count: self.locations.len(),
            })
    }

    /// Returns the location of a column.
    pub fn location(&self, column: usize) -> CodecResult<FieldLocation> {
        self.locations
            .get(column)
            .copied()
            .ok_or(CodecError::ColumnIndexOutOfRange {
                index: column,
                count: self.locations.len(),
            })
    }

    /// Returns the location of a column after checking its declared type.
    pub fn typed_location(&self, column: usize, expected: DataType) -> CodecResult<FieldLocation> {
        let found = self.data_type(column)?;
        if found != expected {
            return Err(CodecError::TypeMismatch {
                column,
                expected,
                found,
            });
        }
        self.location(column)
    }

    /// Returns true if the column's null bit is set in the given fragment.
    ///
    /// Columns beyond the bitmap (or truncated rows) are reported as null.
    pub fn is_null(&self, row: &Row, fragment: usize, column: usize) -> bool {
        column >= self.locations.len() || null_bit(row, fragment, column)
    }

    /// Verifies the header of a fragment against this layout and a configuration.
    ///
    /// The declared size must match the fragment length and cover at least the
    /// fixed part of the layout. Versions are only compared when the
    /// configuration asks for strict headers.
    pub fn check_header(
        &self,
        row: &Row,
        fragment: usize,
        config: &RowFormatConfig,
    ) -> CodecResult<()> {
        let buf = row.try_fragment(fragment)?;
        let declared = row
            .declared_size(fragment)
            .ok_or_else(|| CodecError::invalid_header("fragment shorter than header"))?;

        if declared as usize != buf.len() {
            return Err(CodecError::invalid_header(format!(
                "declared size {} does not match fragment size {}",
                declared,
                buf.len()
            )));
        }
        if declared < self.str_start_offset {
            return Err(CodecError::invalid_header(format!(
                "row of {} bytes is smaller than the fixed layout ({} bytes)",
                declared, self.str_start_offset
            )));
        }
        if config.strict_header {
            let format_version = row.format_version(fragment).unwrap_or_default();
            let schema_version = row.schema_version(fragment).unwrap_or_default();
            if format_version != config.format_version || schema_version != config.schema_version
            {
                return Err(CodecError::invalid_header(format!(
                    "version {}.{} does not match expected {}.{}",
                    format_version, schema_version, config.format_version, config.schema_version
                )));
            }
        }
        Ok(())
    }
}

/// Reads the null bit of `column`. A bitmap byte missing from a truncated
/// fragment reads as null.
pub(crate) fn null_bit(row: &Row, fragment: usize, column: usize) -> bool {
    row.buffer(fragment)
        .get(HEADER_LENGTH + column / 8)
        .map_or(true, |byte| byte & (1 << (column % 8)) != 0)
}
