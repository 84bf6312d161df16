//! Column accessors: lazily decoded scalar columns over a row list.
//!
//! A field decoder knows where one column lives inside a row fragment and
//! turns the row's bytes into a scalar. Wrapping a root row list with a
//! decoder gives a [`Column`], which is itself a [`List`] of decoded values:
//!
//! ```text
//! OrderedRows ──► Column<_, FixedField<i64>> ──► cursor yields i64
//!      │
//!      └────────► RowCountWindow ──► Column<_, StringField> ──► StringRef
//! ```
//!
//! Decoding never copies string data; [`StringRef`] shares the row buffer.
//!
//! Typed decoders ([`FixedField`], [`TimestampField`], [`DateField`],
//! [`StringField`]) give static dispatch when the column type is known at
//! compile time. [`ColumnDecoder`] is the closed set of all of them, picked
//! from the layout at runtime.

use std::fmt;
use std::marker::PhantomData;

use nexus_common::types::{Date, StringRef, Timestamp};
use tracing::trace;

use crate::cursor::{Cursor, OrderKey};
use crate::error::{CodecError, CodecResult};
use crate::layout::{null_bit, DataType, FieldLocation, RowLayout};
use crate::list::List;
use crate::row::Row;
use crate::string_field::{resolve_str_field, AddrSpace};

// =============================================================================
// Field decoding
// =============================================================================

/// Decodes one field from a row.
pub trait FieldDecode {
    /// Decoded value type.
    type Value: Clone + Default;

    /// Decodes the field, reporting malformed rows.
    fn try_decode(&self, row: &Row) -> CodecResult<Self::Value>;

    /// Decodes the field, falling back to the default value on malformed rows.
    ///
    /// This is the path used by cursors: evaluation loops never fail.
    fn decode(&self, row: &Row) -> Self::Value {
        match self.try_decode(row) {
            Ok(value) => value,
            Err(error) => {
                trace!(%error, "field decode fell back to default");
                Self::Value::default()
            }
        }
    }
}

/// Rust scalars stored as fixed-width little-endian fields.
pub trait FixedWidth: Copy + Default + fmt::Debug + sealed::Sealed {
    /// Column type this scalar is stored as.
    const DATA_TYPE: DataType;

    /// Reinterprets exactly `size_of::<Self>()` little-endian bytes.
    fn from_le_slice(bytes: &[u8]) -> Option<Self>;
}

mod sealed {
    pub trait Sealed {}
}

macro_rules! fixed_width {
    ($($ty:ty => $data_type:ident),* $(,)?) => {$(
        impl sealed::Sealed for $ty {}

        impl FixedWidth for $ty {
            const DATA_TYPE: DataType = DataType::$data_type;

            #[inline]
            fn from_le_slice(bytes: &[u8]) -> Option<Self> {
                bytes.try_into().ok().map(<$ty>::from_le_bytes)
            }
        }
    )*};
}

fixed_width! {
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    f32 => Float,
    f64 => Double,
}

impl sealed::Sealed for bool {}

impl FixedWidth for bool {
    const DATA_TYPE: DataType = DataType::Bool;

    #[inline]
    fn from_le_slice(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [b] => Some(*b != 0),
            _ => None,
        }
    }
}

/// Reads `width` bytes at `offset` of fragment `fragment`.
#[inline]
fn read_field(row: &Row, fragment: usize, offset: u32, width: usize) -> CodecResult<&[u8]> {
    let buf = row.try_fragment(fragment)?;
    let start = offset as usize;
    buf.get(start..start + width)
        .ok_or(CodecError::FieldOutOfBounds {
            fragment,
            offset: start,
            width,
            size: buf.len(),
        })
}

fn fixed_offset(layout: &RowLayout, column: usize, expected: DataType) -> CodecResult<u32> {
    match layout.typed_location(column, expected)? {
        FieldLocation::Fixed { offset } => Ok(offset),
        FieldLocation::String { .. } => Err(CodecError::invalid_schema(format!(
            "column {column} is declared {expected} but has a string location"
        ))),
    }
}

/// Fixed-width scalar at a byte offset.
#[derive(Debug)]
pub struct FixedField<T> {
    fragment: usize,
    offset: u32,
    _type: PhantomData<fn() -> T>,
}

impl<T: FixedWidth> FixedField<T> {
    /// Creates a decoder for the value at `offset` in fragment `fragment`.
    pub const fn new(fragment: usize, offset: u32) -> Self {
        Self {
            fragment,
            offset,
            _type: PhantomData,
        }
    }

    /// Creates a decoder for a column of `layout`, checking its declared type.
    pub fn for_column(layout: &RowLayout, column: usize, fragment: usize) -> CodecResult<Self> {
        Ok(Self::new(fragment, fixed_offset(layout, column, T::DATA_TYPE)?))
    }

    /// Returns the byte offset of the field.
    pub fn offset(&self) -> u32 {
        self.offset
    }
}

impl<T> Clone for FixedField<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for FixedField<T> {}

impl<T: FixedWidth> FieldDecode for FixedField<T> {
    type Value = T;

    #[inline]
    fn try_decode(&self, row: &Row) -> CodecResult<T> {
        let width = std::mem::size_of::<T>();
        let bytes = read_field(row, self.fragment, self.offset, width)?;
        T::from_le_slice(bytes).ok_or(CodecError::FieldOutOfBounds {
            fragment: self.fragment,
            offset: self.offset as usize,
            width,
            size: bytes.len(),
        })
    }
}

/// TIMESTAMP column. Non-positive raw values decode to [`Timestamp::ZERO`].
#[derive(Debug, Clone, Copy)]
pub struct TimestampField {
    raw: FixedField<i64>,
}

impl TimestampField {
    /// Creates a decoder for the timestamp at `offset` in fragment `fragment`.
    pub const fn new(fragment: usize, offset: u32) -> Self {
        Self {
            raw: FixedField::new(fragment, offset),
        }
    }

    /// Creates a decoder for a TIMESTAMP column of `layout`.
    pub fn for_column(layout: &RowLayout, column: usize, fragment: usize) -> CodecResult<Self> {
        Ok(Self::new(
            fragment,
            fixed_offset(layout, column, DataType::Timestamp)?,
        ))
    }
}

impl FieldDecode for TimestampField {
    type Value = Timestamp;

    #[inline]
    fn try_decode(&self, row: &Row) -> CodecResult<Timestamp> {
        self.raw.try_decode(row).map(Timestamp::from_raw)
    }
}

/// DATE column. Non-positive raw values decode to [`Date::ZERO`].
#[derive(Debug, Clone, Copy)]
pub struct DateField {
    raw: FixedField<i32>,
}

impl DateField {
    /// Creates a decoder for the date at `offset` in fragment `fragment`.
    pub const fn new(fragment: usize, offset: u32) -> Self {
        Self {
            raw: FixedField::new(fragment, offset),
        }
    }

    /// Creates a decoder for a DATE column of `layout`.
    pub fn for_column(layout: &RowLayout, column: usize, fragment: usize) -> CodecResult<Self> {
        Ok(Self::new(fragment, fixed_offset(layout, column, DataType::Date)?))
    }
}

impl FieldDecode for DateField {
    type Value = Date;

    #[inline]
    fn try_decode(&self, row: &Row) -> CodecResult<Date> {
        self.raw.try_decode(row).map(Date::from_raw)
    }
}

/// VARCHAR column resolved through the string offset table.
///
/// The offset-table tier is picked per row from the fragment size.
#[derive(Debug, Clone, Copy)]
pub struct StringField {
    fragment: usize,
    field_index: u32,
    next_field_index: Option<u32>,
    str_start_offset: u32,
}

impl StringField {
    /// Creates a decoder from raw offset-table parameters.
    pub const fn new(
        fragment: usize,
        field_index: u32,
        next_field_index: Option<u32>,
        str_start_offset: u32,
    ) -> Self {
        Self {
            fragment,
            field_index,
            next_field_index,
            str_start_offset,
        }
    }

    /// Creates a decoder for a VARCHAR column of `layout`.
    pub fn for_column(layout: &RowLayout, column: usize, fragment: usize) -> CodecResult<Self> {
        match layout.typed_location(column, DataType::Varchar)? {
            FieldLocation::String {
                field_index,
                next_field_index,
                str_start_offset,
            } => Ok(Self::new(
                fragment,
                field_index,
                next_field_index,
                str_start_offset,
            )),
            FieldLocation::Fixed { .. } => Err(CodecError::invalid_schema(format!(
                "column {column} is declared VARCHAR but has a fixed location"
            ))),
        }
    }
}

impl FieldDecode for StringField {
    type Value = StringRef;

    fn try_decode(&self, row: &Row) -> CodecResult<StringRef> {
        let buf = row.try_fragment(self.fragment)?;
        let tier = AddrSpace::for_row_size(row.size(self.fragment));
        resolve_str_field(
            buf,
            self.field_index,
            self.next_field_index,
            self.str_start_offset,
            tier,
        )
        .map(StringRef::new)
    }
}

/// Wraps a decoder so that null columns decode to `None`.
#[derive(Debug, Clone, Copy)]
pub struct Nullable<D> {
    inner: D,
    column: usize,
    fragment: usize,
    column_count: usize,
}

impl<D> Nullable<D> {
    /// Wraps `inner`, consulting the null bitmap of `layout` for `column`.
    pub fn new(inner: D, layout: &RowLayout, column: usize, fragment: usize) -> Self {
        Self {
            inner,
            column,
            fragment,
            column_count: layout.column_count(),
        }
    }

    fn is_null(&self, row: &Row) -> bool {
        self.column >= self.column_count || null_bit(row, self.fragment, self.column)
    }
}

impl<D: FieldDecode> FieldDecode for Nullable<D> {
    type Value = Option<D::Value>;

    fn try_decode(&self, row: &Row) -> CodecResult<Self::Value> {
        if self.is_null(row) {
            return Ok(None);
        }
        self.inner.try_decode(row).map(Some)
    }
}

// =============================================================================
// Runtime-selected decoder
// =============================================================================

/// A decoded scalar of any supported type.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ScalarValue {
    /// No value could be decoded.
    #[default]
    Null,
    /// BOOL.
    Bool(bool),
    /// SMALLINT.
    Int16(i16),
    /// INT.
    Int32(i32),
    /// BIGINT.
    Int64(i64),
    /// FLOAT.
    Float(f32),
    /// DOUBLE.
    Double(f64),
    /// TIMESTAMP.
    Timestamp(Timestamp),
    /// DATE.
    Date(Date),
    /// VARCHAR.
    Varchar(StringRef),
}

impl ScalarValue {
    /// Returns the type of the value, or `None` for [`ScalarValue::Null`].
    pub fn data_type(&self) -> Option<DataType> {
        Some(match self {
            Self::Null => return None,
            Self::Bool(_) => DataType::Bool,
            Self::Int16(_) => DataType::Int16,
            Self::Int32(_) => DataType::Int32,
            Self::Int64(_) => DataType::Int64,
            Self::Float(_) => DataType::Float,
            Self::Double(_) => DataType::Double,
            Self::Timestamp(_) => DataType::Timestamp,
            Self::Date(_) => DataType::Date,
            Self::Varchar(_) => DataType::Varchar,
        })
    }

    /// Returns true for [`ScalarValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Widens integer values to `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::Int16(v) => Some(i64::from(v)),
            Self::Int32(v) => Some(i64::from(v)),
            Self::Int64(v) => Some(v),
            _ => None,
        }
    }

    /// Widens numeric values to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Float(v) => Some(f64::from(v)),
            Self::Double(v) => Some(v),
            _ => self.as_i64().map(|v| v as f64),
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int16(v) => write!(f, "{v}"),
            Self::Int32(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::Timestamp(v) => write!(f, "{v}"),
            Self::Date(v) => write!(f, "{v}"),
            Self::Varchar(v) => write!(f, "{v}"),
        }
    }
}

/// Decoder for any column, selected from the layout's declared type.
#[derive(Debug, Clone, Copy)]
pub enum ColumnDecoder {
    /// BOOL column.
    Bool(FixedField<bool>),
    /// SMALLINT column.
    Int16(FixedField<i16>),
    /// INT column.
    Int32(FixedField<i32>),
    /// BIGINT column.
    Int64(FixedField<i64>),
    /// FLOAT column.
    Float(FixedField<f32>),
    /// DOUBLE column.
    Double(FixedField<f64>),
    /// TIMESTAMP column.
    Timestamp(TimestampField),
    /// DATE column.
    Date(DateField),
    /// VARCHAR column.
    Varchar(StringField),
}

impl ColumnDecoder {
    /// Picks the decoder for `column` of `layout`.
    pub fn for_column(layout: &RowLayout, column: usize, fragment: usize) -> CodecResult<Self> {
        Ok(match layout.data_type(column)? {
            DataType::Bool => Self::Bool(FixedField::for_column(layout, column, fragment)?),
            DataType::Int16 => Self::Int16(FixedField::for_column(layout, column, fragment)?),
            DataType::Int32 => Self::Int32(FixedField::for_column(layout, column, fragment)?),
            DataType::Int64 => Self::Int64(FixedField::for_column(layout, column, fragment)?),
            DataType::Float => Self::Float(FixedField::for_column(layout, column, fragment)?),
            DataType::Double => Self::Double(FixedField::for_column(layout, column, fragment)?),
            DataType::Timestamp => {
                Self::Timestamp(TimestampField::for_column(layout, column, fragment)?)
            }
            DataType::Date => Self::Date(DateField::for_column(layout, column, fragment)?),
            DataType::Varchar => Self::Varchar(StringField::for_column(layout, column, fragment)?),
        })
    }

    /// Picks the decoder for the column named `name`.
    pub fn for_name(layout: &RowLayout, name: &str, fragment: usize) -> CodecResult<Self> {
        Self::for_column(layout, layout.column_index(name)?, fragment)
    }

    /// Returns the type this decoder produces.
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Bool(_) => DataType::Bool,
            Self::Int16(_) => DataType::Int16,
            Self::Int32(_) => DataType::Int32,
            Self::Int64(_) => DataType::Int64,
            Self::Float(_) => DataType::Float,
            Self::Double(_) => DataType::Double,
            Self::Timestamp(_) => DataType::Timestamp,
            Self::Date(_) => DataType::Date,
            Self::Varchar(_) => DataType::Varchar,
        }
    }
}

impl FieldDecode for ColumnDecoder {
    type Value = ScalarValue;

    fn try_decode(&self, row: &Row) -> CodecResult<ScalarValue> {
        Ok(match self {
            Self::Bool(d) => ScalarValue::Bool(d.try_decode(row)?),
            Self::Int16(d) => ScalarValue::Int16(d.try_decode(row)?),
            Self::Int32(d) => ScalarValue::Int32(d.try_decode(row)?),
            Self::Int64(d) => ScalarValue::Int64(d.try_decode(row)?),
            Self::Float(d) => ScalarValue::Float(d.try_decode(row)?),
            Self::Double(d) => ScalarValue::Double(d.try_decode(row)?),
            Self::Timestamp(d) => ScalarValue::Timestamp(d.try_decode(row)?),
            Self::Date(d) => ScalarValue::Date(d.try_decode(row)?),
            Self::Varchar(d) => ScalarValue::Varchar(d.try_decode(row)?),
        })
    }
}

// =============================================================================
// Column list and cursor
// =============================================================================

/// A list of decoded values over a root row list.
///
/// `count` and `at` delegate to the root; the column itself holds no rows.
#[derive(Debug)]
pub struct Column<'r, L, D> {
    root: &'r L,
    decoder: D,
}

impl<'r, L, D> Column<'r, L, D> {
    /// Creates a column view over `root`.
    pub fn new(root: &'r L, decoder: D) -> Self {
        trace!("column view created");
        Self { root, decoder }
    }

    /// Returns the decoder.
    pub fn decoder(&self) -> &D {
        &self.decoder
    }
}

impl<'r, L> Column<'r, L, ColumnDecoder> {
    /// Creates a column view for `column` of `layout`, choosing the decoder
    /// from the declared type.
    pub fn for_column(
        root: &'r L,
        layout: &RowLayout,
        column: usize,
        fragment: usize,
    ) -> CodecResult<Self> {
        Ok(Self::new(
            root,
            ColumnDecoder::for_column(layout, column, fragment)?,
        ))
    }
}

impl<'r, L, D> List<D::Value> for Column<'r, L, D>
where
    L: List<Row>,
    D: FieldDecode + Clone,
{
    type Cursor<'a> = ColumnCursor<L::Cursor<'r>, D> where Self: 'a;

    fn cursor(&self) -> ColumnCursor<L::Cursor<'r>, D> {
        ColumnCursor::new(self.root.cursor(), self.decoder.clone())
    }

    fn count(&self) -> u64 {
        self.root.count()
    }

    fn at(&self, pos: u64) -> Option<D::Value> {
        self.root.at(pos).map(|row| self.decoder.decode(&row))
    }
}

/// Cursor that decodes one field from the rows of a root cursor.
///
/// `value()` decodes into a scratch slot owned by the cursor; the returned
/// reference is valid until the cursor is next used.
pub struct ColumnCursor<C, D: FieldDecode> {
    root: C,
    decoder: D,
    scratch: Option<D::Value>,
}

impl<C: Cursor<Row>, D: FieldDecode> ColumnCursor<C, D> {
    /// Wraps a root row cursor, rewinding it to the first row.
    pub fn new(mut root: C, decoder: D) -> Self {
        root.seek_to_first();
        Self {
            root,
            decoder,
            scratch: None,
        }
    }

    /// Returns the row under the cursor.
    pub fn row(&mut self) -> Option<&Row> {
        self.root.value()
    }
}

impl<C, D> fmt::Debug for ColumnCursor<C, D>
where
    C: fmt::Debug,
    D: FieldDecode + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnCursor")
            .field("root", &self.root)
            .field("decoder", &self.decoder)
            .finish_non_exhaustive()
    }
}

impl<C: Cursor<Row>, D: FieldDecode> Cursor<D::Value> for ColumnCursor<C, D> {
    fn seek(&mut self, key: OrderKey) {
        self.root.seek(key);
    }

    fn seek_to_first(&mut self) {
        self.root.seek_to_first();
    }

    fn next(&mut self) {
        self.root.next();
    }

    fn valid(&self) -> bool {
        self.root.valid()
    }

    fn value(&mut self) -> Option<&D::Value> {
        let decoded = self.decoder.decode(self.root.value()?);
        Some(self.scratch.insert(decoded))
    }

    fn key(&self) -> Option<OrderKey> {
        self.root.key()
    }

    fn is_seekable(&self) -> bool {
        self.root.is_seekable()
    }
}
