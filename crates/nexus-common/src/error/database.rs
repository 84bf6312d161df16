//! Database error types.
//!
//! Provides the error types shared by the codec and executor layers.

use std::fmt;
use thiserror::Error;

/// Error codes for categorizing errors.
///
/// These codes can be used for programmatic error handling and
/// are stable across versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    // General errors (0x0000 - 0x00FF)
    /// Unknown or unspecified error.
    Unknown = 0x0000,
    /// Internal error (bug).
    Internal = 0x0001,
    /// Operation not supported.
    NotSupported = 0x0002,
    /// Invalid argument provided.
    InvalidArgument = 0x0003,
    /// Position or index outside of the addressable range.
    OutOfRange = 0x0004,

    // Data errors (0x0100 - 0x01FF)
    /// Data corruption detected.
    Corruption = 0x0100,
    /// Encoded row exceeds the configured size limit.
    RowTooLarge = 0x0101,
    /// Key exceeds the maximum key size.
    KeyTooLarge = 0x0102,

    // Query errors (0x0600 - 0x06FF)
    /// Column not found.
    ColumnNotFound = 0x0602,
    /// Type mismatch.
    TypeMismatch = 0x0603,
}

impl ErrorCode {
    /// Returns the numeric code.
    #[inline]
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Returns the error category name.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match (*self as u16) >> 8 {
            0x00 => "General",
            0x01 => "Data",
            0x06 => "Query",
            _ => "Unknown",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The main error type for NexusDB.
///
/// Each variant includes relevant context for debugging.
///
/// # Example
///
/// ```rust
/// use nexus_common::error::{NexusError, NexusResult};
///
/// fn column(name: &str) -> NexusResult<usize> {
///     Err(NexusError::ColumnNotFound { column: name.to_string() })
/// }
/// assert!(column("ts").is_err());
/// ```
#[derive(Debug, Error)]
pub enum NexusError {
    // ==========================================================================
    // General Errors
    // ==========================================================================
    /// Internal error - this indicates a bug.
    #[error("internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },

    /// Operation not supported.
    #[error("operation not supported: {operation}")]
    NotSupported {
        /// The unsupported operation.
        operation: String,
    },

    /// Invalid argument provided.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Error message.
        message: String,
    },

    /// Position outside of the addressable range.
    #[error("position {position} out of range (len: {len})")]
    OutOfRange {
        /// Requested position.
        position: u64,
        /// Number of addressable elements.
        len: u64,
    },

    // ==========================================================================
    // Data Errors
    // ==========================================================================
    /// Data corruption detected.
    #[error("data corruption detected: {message}")]
    Corruption {
        /// Description of the corruption.
        message: String,
    },

    /// Encoded row is larger than allowed.
    #[error("row size {size} exceeds maximum {max_size}")]
    RowTooLarge {
        /// Actual encoded size.
        size: usize,
        /// Maximum allowed size.
        max_size: usize,
    },

    /// Key is larger than allowed.
    #[error("key size {size} exceeds maximum {max_size}")]
    KeyTooLarge {
        /// Actual key size.
        size: usize,
        /// Maximum allowed size.
        max_size: usize,
    },

    // ==========================================================================
    // Query Errors
    // ==========================================================================
    /// Column not found.
    #[error("column '{column}' not found")]
    ColumnNotFound {
        /// The missing column.
        column: String,
    },

    /// Type mismatch.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Expected type.
        expected: String,
        /// Actual type.
        actual: String,
    },

    // ==========================================================================
    // Configuration Errors
    // ==========================================================================
    /// Invalid configuration.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Error message.
        message: String,
    },
}

impl NexusError {
    /// Returns the error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Internal { .. } => ErrorCode::Internal,
            Self::NotSupported { .. } => ErrorCode::NotSupported,
            Self::InvalidArgument { .. } => ErrorCode::InvalidArgument,
            Self::OutOfRange { .. } => ErrorCode::OutOfRange,
            Self::Corruption { .. } => ErrorCode::Corruption,
            Self::RowTooLarge { .. } => ErrorCode::RowTooLarge,
            Self::KeyTooLarge { .. } => ErrorCode::KeyTooLarge,
            Self::ColumnNotFound { .. } => ErrorCode::ColumnNotFound,
            Self::TypeMismatch { .. } => ErrorCode::TypeMismatch,
            Self::InvalidConfig { .. } => ErrorCode::InvalidArgument,
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Creates an invalid argument error.
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a corruption error.
    #[must_use]
    pub fn corruption(message: impl Into<String>) -> Self {
        Self::Corruption {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        let err = NexusError::OutOfRange { position: 7, len: 3 };
        assert_eq!(err.code(), ErrorCode::OutOfRange);
        assert_eq!(err.code().category(), "General");

        let err = NexusError::corruption("truncated row");
        assert_eq!(err.code().category(), "Data");

        let err = NexusError::ColumnNotFound {
            column: "ts".to_string(),
        };
        assert_eq!(err.code().category(), "Query");
    }

    #[test]
    fn test_error_display() {
        let err = NexusError::OutOfRange { position: 7, len: 3 };
        assert_eq!(err.to_string(), "position 7 out of range (len: 3)");

        let err = NexusError::RowTooLarge {
            size: 2048,
            max_size: 1024,
        };
        assert!(err.to_string().contains("2048"));
        assert!(err.to_string().contains("1024"));
    }

    #[test]
    fn test_error_code_numeric() {
        assert_eq!(ErrorCode::TypeMismatch.as_u16(), 0x0603);
        assert_eq!(ErrorCode::Corruption.to_string(), "Corruption");
        assert_eq!(ErrorCode::KeyTooLarge.category(), "Data");
    }
}
