//! String offset table primitives.
//!
//! Variable-length fields are stored after the fixed part of a row. An
//! offset table with one entry per string column records where each string
//! starts; a string ends where the next one starts, and the last string
//! ends at the row's declared size.
//!
//! Offset table entries are as narrow as the row allows: the address-space
//! tier is chosen from the total row size, so small rows spend one byte per
//! string column. All tiers store offsets little-endian.

use bytes::Bytes;
use nexus_common::constants::{ADDR_SPACE_U16_MAX, ADDR_SPACE_U24_MAX, ADDR_SPACE_U8_MAX};

use crate::error::{CodecError, CodecResult};

/// Width of string offset table entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AddrSpace {
    /// 1-byte offsets, rows up to 255 bytes.
    U8,
    /// 2-byte offsets, rows up to 65535 bytes.
    U16,
    /// 3-byte offsets, rows up to 16 MB.
    U24,
    /// 4-byte offsets.
    U32,
}

impl AddrSpace {
    /// Selects the tier for a row of `size` bytes.
    #[must_use]
    pub const fn for_row_size(size: u32) -> Self {
        if size <= ADDR_SPACE_U8_MAX {
            Self::U8
        } else if size <= ADDR_SPACE_U16_MAX {
            Self::U16
        } else if size <= ADDR_SPACE_U24_MAX {
            Self::U24
        } else {
            Self::U32
        }
    }

    /// Returns the entry width in bytes.
    #[must_use]
    pub const fn width(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::U24 => 3,
            Self::U32 => 4,
        }
    }

    /// Returns the largest offset representable in this tier.
    #[must_use]
    pub const fn max_offset(self) -> u32 {
        match self {
            Self::U8 => ADDR_SPACE_U8_MAX,
            Self::U16 => ADDR_SPACE_U16_MAX,
            Self::U24 => ADDR_SPACE_U24_MAX,
            Self::U32 => u32::MAX,
        }
    }

    /// Reads one table entry.
    #[inline]
    pub(crate) fn read(self, entry: &[u8]) -> u32 {
        let mut le = [0u8; 4];
        le[..self.width()].copy_from_slice(&entry[..self.width()]);
        u32::from_le_bytes(le)
    }

    /// Writes one table entry.
    #[inline]
    pub(crate) fn write(self, offset: u32, out: &mut [u8]) {
        out[..self.width()].copy_from_slice(&offset.to_le_bytes()[..self.width()]);
    }
}

/// Computes the total size of a row whose fixed part ends at `str_start_offset`,
/// holding `string_count` strings totalling `string_bytes`.
///
/// Returns the size together with the tier that addresses it, or `None` if
/// the row cannot be addressed with 32-bit offsets.
#[must_use]
pub fn total_row_size(
    str_start_offset: u32,
    string_count: u32,
    string_bytes: usize,
) -> Option<(u32, AddrSpace)> {
    let base = u64::from(str_start_offset) + string_bytes as u64;
    for tier in [AddrSpace::U8, AddrSpace::U16, AddrSpace::U24, AddrSpace::U32] {
        let total = base + u64::from(string_count) * tier.width() as u64;
        if total <= u64::from(tier.max_offset()) {
            return Some((total as u32, tier));
        }
    }
    None
}

/// Resolves a string field to a zero-copy slice of `buf`.
///
/// `field_index` is the column's ordinal among the string columns;
/// `next_field_index` is the ordinal of the following string column, or
/// `None` for the last one, whose end is the size recorded in the row header.
pub fn resolve_str_field(
    buf: &Bytes,
    field_index: u32,
    next_field_index: Option<u32>,
    str_start_offset: u32,
    tier: AddrSpace,
) -> CodecResult<Bytes> {
    let entry = |index: u32| -> CodecResult<u32> {
        let pos = str_start_offset as usize + index as usize * tier.width();
        buf.get(pos..pos + tier.width())
            .map(|slot| tier.read(slot))
            .ok_or(CodecError::StringOutOfBounds {
                field_index: index,
                start: pos,
                end: pos + tier.width(),
                size: buf.len(),
            })
    };

    let start = entry(field_index)? as usize;
    let end = match next_field_index {
        Some(next) => entry(next)? as usize,
        None => declared_size(buf)? as usize,
    };

    if start > end || end > buf.len() {
        return Err(CodecError::StringOutOfBounds {
            field_index,
            start,
            end,
            size: buf.len(),
        });
    }
    Ok(buf.slice(start..end))
}

fn declared_size(buf: &Bytes) -> CodecResult<u32> {
    use nexus_common::constants::{HEADER_LENGTH, VERSION_LENGTH};

    buf.get(VERSION_LENGTH..HEADER_LENGTH)
        .and_then(|b| b.try_into().ok())
        .map(u32::from_le_bytes)
        .ok_or_else(|| CodecError::invalid_header("fragment shorter than header"))
}
