//! Row format configuration.
//!
//! Controls how rows are encoded by the row builder and how strictly
//! encoded rows are checked before they are decoded.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_MAX_ROW_SIZE, DEFAULT_SCHEMA_VERSION, HEADER_LENGTH,
    ROW_FORMAT_VERSION,
};

/// Row format configuration.
///
/// # Example
///
/// ```rust
/// use nexus_common::config::RowFormatConfig;
///
/// let config = RowFormatConfig::default();
/// assert_eq!(config.format_version, 1);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RowFormatConfig {
    /// Format version written into the row header.
    /// Default: 1
    pub format_version: u8,

    /// Schema version written into the row header.
    /// Default: 1
    pub schema_version: u8,

    /// Maximum encoded row size in bytes.
    /// Default: 16777216 (16 MB)
    pub max_row_size: u32,

    /// Reject rows whose header versions differ from this configuration.
    /// Default: false
    pub strict_header: bool,
}

impl Default for RowFormatConfig {
    fn default() -> Self {
        Self {
            format_version: ROW_FORMAT_VERSION,
            schema_version: DEFAULT_SCHEMA_VERSION,
            max_row_size: DEFAULT_MAX_ROW_SIZE,
            strict_header: false,
        }
    }
}

impl RowFormatConfig {
    /// Creates a configuration with the given schema version.
    #[must_use]
    pub fn with_schema_version(schema_version: u8) -> Self {
        Self {
            schema_version,
            ..Default::default()
        }
    }

    /// Creates a configuration for testing: small rows, strict headers.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            max_row_size: 1024 * 1024,
            strict_header: true,
            ..Default::default()
        }
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.format_version != ROW_FORMAT_VERSION {
            return Err(format!(
                "unsupported format_version {} (expected {})",
                self.format_version, ROW_FORMAT_VERSION
            ));
        }

        if (self.max_row_size as usize) <= HEADER_LENGTH {
            return Err("max_row_size must be larger than the row header".to_string());
        }

        Ok(())
    }
}
