//! Error types for the row codec.
//!
//! Construction and validation paths return these errors. Traversal never
//! does: cursors and lists report exhaustion through `Option`.

use nexus_common::NexusError;
use thiserror::Error;

use crate::layout::DataType;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while encoding or decoding rows.
#[derive(Debug, Error)]
pub enum CodecError {
    /// A field lies outside the row buffer.
    #[error("field at offset {offset} (width {width}) exceeds fragment {fragment} of size {size}")]
    FieldOutOfBounds {
        /// Fragment index.
        fragment: usize,
        /// Byte offset of the field.
        offset: usize,
        /// Width of the field in bytes.
        width: usize,
        /// Size of the fragment.
        size: usize,
    },

    /// The row has no fragment at the requested index.
    #[error("fragment {index} not found (row has {count})")]
    FragmentNotFound {
        /// Requested fragment index.
        index: usize,
        /// Number of fragments in the row.
        count: usize,
    },

    /// The row header is missing or inconsistent.
    #[error("invalid row header: {0}")]
    InvalidHeader(String),

    /// A string offset points outside the row.
    #[error("string field {field_index} spans {start}..{end} outside row of size {size}")]
    StringOutOfBounds {
        /// String field index.
        field_index: u32,
        /// Resolved start offset.
        start: usize,
        /// Resolved end offset.
        end: usize,
        /// Size of the row.
        size: usize,
    },

    /// Column name not present in the schema.
    #[error("column not found: {0}")]
    ColumnNotFound(String),

    /// Column index beyond the schema.
    #[error("column index {index} out of range (schema has {count} columns)")]
    ColumnIndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of columns.
        count: usize,
    },

    /// The declared column type does not match the requested accessor.
    #[error("type mismatch for column {column}: expected {expected:?}, found {found:?}")]
    TypeMismatch {
        /// Column index.
        column: usize,
        /// Type the caller asked for.
        expected: DataType,
        /// Type declared in the schema.
        found: DataType,
    },

    /// Encoded row exceeds the configured size limit.
    #[error("row too large: {size} bytes (max: {max})")]
    RowTooLarge {
        /// Encoded size.
        size: usize,
        /// Maximum allowed size.
        max: usize,
    },

    /// Partition key exceeds the maximum key size.
    #[error("key too large: {size} bytes (max: {max})")]
    KeyTooLarge {
        /// Key size.
        size: usize,
        /// Maximum allowed size.
        max: usize,
    },

    /// Invalid schema definition.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    /// Invalid row format configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CodecError {
    /// Creates a new invalid header error.
    pub fn invalid_header(msg: impl Into<String>) -> Self {
        Self::InvalidHeader(msg.into())
    }

    /// Creates a new invalid schema error.
    pub fn invalid_schema(msg: impl Into<String>) -> Self {
        Self::InvalidSchema(msg.into())
    }
}

impl From<CodecError> for NexusError {
    fn from(e: CodecError) -> Self {
        match e {
            CodecError::ColumnNotFound(column) => NexusError::ColumnNotFound { column },
            CodecError::TypeMismatch {
                expected, found, ..
            } => NexusError::TypeMismatch {
                expected: expected.to_string(),
                actual: found.to_string(),
            },
            CodecError::RowTooLarge { size, max } => NexusError::RowTooLarge {
                size,
                max_size: max,
            },
            CodecError::KeyTooLarge { size, max } => NexusError::KeyTooLarge {
                size,
                max_size: max,
            },
            CodecError::ColumnIndexOutOfRange { index, count } => NexusError::OutOfRange {
                position: index as u64,
                len: count as u64,
            },
            CodecError::InvalidSchema(message) => NexusError::InvalidArgument { message },
            CodecError::InvalidConfig(message) => NexusError::InvalidConfig { message },
            other => NexusError::corruption(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexus_common::error::ErrorCode;

    #[test]
    fn test_error_display() {
        let err = CodecError::FieldOutOfBounds {
            fragment: 0,
            offset: 30,
            width: 8,
            size: 32,
        };
        assert!(err.to_string().contains("offset 30"));
        assert!(err.to_string().contains("size 32"));

        let err = CodecError::TypeMismatch {
            column: 2,
            expected: DataType::Int64,
            found: DataType::Varchar,
        };
        assert!(err.to_string().contains("Int64"));
        assert!(err.to_string().contains("Varchar"));
    }

    #[test]
    fn test_into_nexus_error() {
        let err: NexusError = CodecError::ColumnNotFound("ts".into()).into();
        assert_eq!(err.code(), ErrorCode::ColumnNotFound);

        let err: NexusError = CodecError::RowTooLarge { size: 10, max: 5 }.into();
        assert_eq!(err.code(), ErrorCode::RowTooLarge);

        let err: NexusError = CodecError::KeyTooLarge { size: 10, max: 5 }.into();
        assert_eq!(err.code(), ErrorCode::KeyTooLarge);

        let err: NexusError = CodecError::invalid_header("short row").into();
        assert_eq!(err.code(), ErrorCode::Corruption);
    }
}
