//! Temporal scalar types for NexusDB.
//!
//! `Timestamp` and `Date` are the values produced when decoding temporal
//! columns from encoded rows. Both treat non-positive raw values as the
//! zero sentinel.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A point in time (milliseconds since the Unix epoch).
///
/// Decoded timestamps are never negative: raw values `<= 0` decode to
/// [`Timestamp::ZERO`].
///
/// # Example
///
/// ```rust
/// use nexus_common::types::Timestamp;
///
/// let ts = Timestamp::from_raw(1_700_000_000_000);
/// assert_eq!(ts.as_millis(), 1_700_000_000_000);
/// assert_eq!(Timestamp::from_raw(-5), Timestamp::ZERO);
/// ```
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Zero timestamp (epoch), also the decode sentinel.
    pub const ZERO: Self = Self(0);

    /// Maximum timestamp value.
    pub const MAX: Self = Self(i64::MAX);

    /// Creates a timestamp from milliseconds since the Unix epoch.
    #[inline]
    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Creates a timestamp from a raw encoded value, clamping `<= 0` to zero.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: i64) -> Self {
        if raw > 0 {
            Self(raw)
        } else {
            Self::ZERO
        }
    }

    /// Returns the timestamp as milliseconds since the Unix epoch.
    #[inline]
    #[must_use]
    pub const fn as_millis(self) -> i64 {
        self.0
    }

    /// Returns the timestamp as whole seconds since the Unix epoch.
    #[inline]
    #[must_use]
    pub const fn as_secs(self) -> i64 {
        self.0 / 1000
    }

    /// Returns true if this is the zero sentinel.
    #[inline]
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({}ms)", self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(dt) = chrono::DateTime::from_timestamp_millis(self.0) {
            return write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.3fZ"));
        }
        write!(f, "{}ms", self.0)
    }
}

impl From<Timestamp> for i64 {
    #[inline]
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

/// A calendar date.
///
/// Dates are packed into 32 bits as `(year - 1900) << 16 | (month - 1) << 8 | day`,
/// the same representation used on disk. Raw values `<= 0` decode to
/// [`Date::ZERO`].
///
/// # Example
///
/// ```rust
/// use nexus_common::types::Date;
///
/// let date = Date::from_ymd(2020, 5, 17).unwrap();
/// assert_eq!((date.year(), date.month(), date.day()), (2020, 5, 17));
/// assert_eq!(date.to_string(), "2020-05-17");
/// ```
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Date(i32);

impl Date {
    /// Zero date, also the decode sentinel.
    pub const ZERO: Self = Self(0);

    /// Creates a date from year, month (1-12) and day (1-31).
    ///
    /// Returns `None` for dates before 1900 or out-of-range components.
    #[must_use]
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        if !(1900..=1900 + 0x7FFF).contains(&year) {
            return None;
        }
        chrono::NaiveDate::from_ymd_opt(year, month, day)?;
        let packed = ((year - 1900) << 16) | ((month as i32 - 1) << 8) | day as i32;
        Some(Self(packed))
    }

    /// Creates a date from its packed 32-bit representation.
    #[inline]
    #[must_use]
    pub const fn from_packed(packed: i32) -> Self {
        Self(packed)
    }

    /// Creates a date from a raw encoded value, clamping `<= 0` to zero.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: i32) -> Self {
        if raw > 0 {
            Self(raw)
        } else {
            Self::ZERO
        }
    }

    /// Returns the packed 32-bit representation.
    #[inline]
    #[must_use]
    pub const fn packed(self) -> i32 {
        self.0
    }

    /// Returns the year.
    #[inline]
    #[must_use]
    pub const fn year(self) -> i32 {
        (self.0 >> 16) + 1900
    }

    /// Returns the month (1-12).
    #[inline]
    #[must_use]
    pub const fn month(self) -> u32 {
        (((self.0 >> 8) & 0xFF) + 1) as u32
    }

    /// Returns the day of month.
    #[inline]
    #[must_use]
    pub const fn day(self) -> u32 {
        (self.0 & 0xFF) as u32
    }

    /// Returns true if this is the zero sentinel.
    #[inline]
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Date({self})")
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year(), self.month(), self.day())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_clamps_non_positive() {
        assert_eq!(Timestamp::from_raw(0), Timestamp::ZERO);
        assert_eq!(Timestamp::from_raw(-1), Timestamp::ZERO);
        assert_eq!(Timestamp::from_raw(i64::MIN), Timestamp::ZERO);
        assert_eq!(Timestamp::from_raw(1).as_millis(), 1);
        assert!(Timestamp::from_raw(-1).is_zero());
    }

    #[test]
    fn test_timestamp_ordering() {
        let a = Timestamp::from_millis(1000);
        let b = Timestamp::from_millis(2000);
        assert!(a < b);
        assert_eq!(b.as_secs(), 2);
        assert_eq!(i64::from(b), 2000);
    }

    #[test]
    fn test_timestamp_display() {
        let ts = Timestamp::from_millis(1_000);
        assert_eq!(ts.to_string(), "1970-01-01T00:00:01.000Z");
        assert_eq!(format!("{:?}", ts), "Timestamp(1000ms)");
    }

    #[test]
    fn test_date_packing() {
        let date = Date::from_ymd(2024, 2, 29).unwrap();
        assert_eq!(date.packed(), (124 << 16) | (1 << 8) | 29);
        assert_eq!(date.year(), 2024);
        assert_eq!(date.month(), 2);
        assert_eq!(date.day(), 29);
        assert_eq!(Date::from_packed(date.packed()), date);
    }

    #[test]
    fn test_date_rejects_invalid() {
        assert!(Date::from_ymd(2023, 2, 29).is_none());
        assert!(Date::from_ymd(1899, 12, 31).is_none());
        assert!(Date::from_ymd(2020, 13, 1).is_none());
    }

    #[test]
    fn test_date_clamps_non_positive() {
        assert_eq!(Date::from_raw(0), Date::ZERO);
        assert_eq!(Date::from_raw(-42), Date::ZERO);
        let valid = Date::from_ymd(1999, 12, 31).unwrap();
        assert_eq!(Date::from_raw(valid.packed()), valid);
    }

    #[test]
    fn test_date_ordering_follows_calendar() {
        let a = Date::from_ymd(2020, 1, 31).unwrap();
        let b = Date::from_ymd(2020, 2, 1).unwrap();
        let c = Date::from_ymd(2021, 1, 1).unwrap();
        assert!(a < b);
        assert!(b < c);
    }
}
