//! System-wide constants for NexusDB.
//!
//! This module defines constants used across the database.
//! Row format constants must match the layout written by the row encoder.

// =============================================================================
// Row Header Constants
// =============================================================================

/// Size of the version prefix of an encoded row (format + schema version).
pub const VERSION_LENGTH: usize = 2;

/// Size of the total-length field that follows the version prefix.
pub const SIZE_LENGTH: usize = 4;

/// Total row header size in bytes.
///
/// The header contains: format_version (1), schema_version (1), total_size (4).
pub const HEADER_LENGTH: usize = VERSION_LENGTH + SIZE_LENGTH;

/// Current row format version.
pub const ROW_FORMAT_VERSION: u8 = 1;

/// Default schema version written into new rows.
pub const DEFAULT_SCHEMA_VERSION: u8 = 1;

// =============================================================================
// Row Size Limits
// =============================================================================

/// Default maximum encoded row size (16 MB).
pub const DEFAULT_MAX_ROW_SIZE: u32 = 16 * 1024 * 1024;

/// Largest row addressable with 1-byte string offsets.
pub const ADDR_SPACE_U8_MAX: u32 = u8::MAX as u32;

/// Largest row addressable with 2-byte string offsets.
pub const ADDR_SPACE_U16_MAX: u32 = u16::MAX as u32;

/// Largest row addressable with 3-byte string offsets.
pub const ADDR_SPACE_U24_MAX: u32 = (1 << 24) - 1;

// =============================================================================
// Partition Constants
// =============================================================================

/// Maximum partition key size in bytes (16 KB).
pub const MAX_KEY_SIZE: usize = 16 * 1024;
