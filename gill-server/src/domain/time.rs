//! Route time and day-of-week handling.
//!
//! Departure times arrive as "HH:mm" strings and days of week as integers
//! 1 (Monday) through 7 (Sunday). Both are validated at the boundary so
//! the matching core never sees a malformed time or an out-of-range day.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A time of day in "HH:mm" resolution.
///
/// Subway routes repeat daily, so a wall-clock time without a date is the
/// natural representation for departures, pickup windows, and deadlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RouteTime {
    hour: u8,
    minute: u8,
}

impl RouteTime {
    /// Parse a time from strict "HH:mm" format.
    pub fn parse(s: &str) -> Result<Self, TimeError> {
        // Must be exactly 5 characters: HH:mm
        if s.len() != 5 {
            return Err(TimeError::new("expected HH:mm format"));
        }

        let bytes = s.as_bytes();
        if bytes[2] != b':' {
            return Err(TimeError::new("expected colon at position 2"));
        }

        let hour =
            parse_two_digits(&bytes[0..2]).ok_or_else(|| TimeError::new("invalid hour digits"))?;
        if hour > 23 {
            return Err(TimeError::new("hour must be 0-23"));
        }

        let minute = parse_two_digits(&bytes[3..5])
            .ok_or_else(|| TimeError::new("invalid minute digits"))?;
        if minute > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }

        Ok(Self { hour, minute })
    }

    /// Build a time from components, if valid.
    pub fn from_hm(hour: u8, minute: u8) -> Option<Self> {
        (hour <= 23 && minute <= 59).then_some(Self { hour, minute })
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    /// Minutes since midnight.
    pub fn minutes_from_midnight(&self) -> u16 {
        self.hour as u16 * 60 + self.minute as u16
    }
}

impl fmt::Display for RouteTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl TryFrom<String> for RouteTime {
    type Error = TimeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<RouteTime> for String {
    fn from(t: RouteTime) -> Self {
        t.to_string()
    }
}

/// Parse two ASCII digit bytes into a u8.
fn parse_two_digits(bytes: &[u8]) -> Option<u8> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = (bytes[0] as char).to_digit(10)?;
    let d2 = (bytes[1] as char).to_digit(10)?;
    Some((d1 * 10 + d2) as u8)
}

/// Error returned when building a day set from out-of-range days.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid day of week: {day} (expected 1-7)")]
pub struct DayError {
    day: u8,
}

/// A set of days of week, 1 (Monday) through 7 (Sunday).
///
/// Stored as a bitmask; serialized as a sorted list of day numbers, which
/// is how the document store represents it.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct DaySet(u8);

impl DaySet {
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Monday through Friday.
    pub const fn weekdays() -> Self {
        Self(0b0001_1111)
    }

    /// Saturday and Sunday.
    pub const fn weekend() -> Self {
        Self(0b0110_0000)
    }

    pub const fn all() -> Self {
        Self(0b0111_1111)
    }

    /// Build a set from day numbers, rejecting anything outside 1-7.
    pub fn from_days(days: &[u8]) -> Result<Self, DayError> {
        let mut set = Self::empty();
        for &day in days {
            if !(1..=7).contains(&day) {
                return Err(DayError { day });
            }
            set.0 |= 1 << (day - 1);
        }
        Ok(set)
    }

    pub fn contains(&self, day: u8) -> bool {
        (1..=7).contains(&day) && self.0 & (1 << (day - 1)) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn intersects(&self, other: &DaySet) -> bool {
        self.0 & other.0 != 0
    }

    pub fn has_weekday(&self) -> bool {
        self.intersects(&Self::weekdays())
    }

    pub fn has_weekend(&self) -> bool {
        self.intersects(&Self::weekend())
    }

    /// Iterate over contained days in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (1..=7u8).filter(|d| self.contains(*d))
    }
}

impl fmt::Debug for DaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl TryFrom<Vec<u8>> for DaySet {
    type Error = DayError;

    fn try_from(days: Vec<u8>) -> Result<Self, Self::Error> {
        Self::from_days(&days)
    }
}

impl From<DaySet> for Vec<u8> {
    fn from(set: DaySet) -> Self {
        set.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_times() {
        let t = RouteTime::parse("00:00").unwrap();
        assert_eq!((t.hour(), t.minute()), (0, 0));

        let t = RouteTime::parse("23:59").unwrap();
        assert_eq!((t.hour(), t.minute()), (23, 59));

        let t = RouteTime::parse("08:15").unwrap();
        assert_eq!(t.minutes_from_midnight(), 8 * 60 + 15);
    }

    #[test]
    fn parse_invalid_times() {
        assert!(RouteTime::parse("0815").is_err());
        assert!(RouteTime::parse("8:15").is_err());
        assert!(RouteTime::parse("08-15").is_err());
        assert!(RouteTime::parse("24:00").is_err());
        assert!(RouteTime::parse("12:60").is_err());
        assert!(RouteTime::parse("ab:cd").is_err());
        assert!(RouteTime::parse("").is_err());
    }

    #[test]
    fn display_format() {
        assert_eq!(RouteTime::parse("09:05").unwrap().to_string(), "09:05");
        assert_eq!(RouteTime::parse("00:00").unwrap().to_string(), "00:00");
    }

    #[test]
    fn day_set_membership() {
        let days = DaySet::from_days(&[1, 3, 5]).unwrap();
        assert!(days.contains(1));
        assert!(!days.contains(2));
        assert!(days.contains(5));
        assert!(!days.contains(7));
        assert_eq!(days.len(), 3);
    }

    #[test]
    fn day_set_rejects_out_of_range() {
        assert!(DaySet::from_days(&[0]).is_err());
        assert!(DaySet::from_days(&[8]).is_err());
        assert!(DaySet::from_days(&[1, 2, 9]).is_err());
    }

    #[test]
    fn day_set_weekday_weekend() {
        let commute = DaySet::from_days(&[1, 2, 3, 4, 5]).unwrap();
        assert!(commute.has_weekday());
        assert!(!commute.has_weekend());

        let mixed = DaySet::from_days(&[5, 6]).unwrap();
        assert!(mixed.has_weekday());
        assert!(mixed.has_weekend());

        assert!(!DaySet::empty().has_weekday());
    }

    #[test]
    fn day_set_intersection() {
        let a = DaySet::from_days(&[1, 2]).unwrap();
        let b = DaySet::from_days(&[2, 3]).unwrap();
        let c = DaySet::from_days(&[6, 7]).unwrap();

        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn day_set_serde_roundtrip() {
        let days = DaySet::from_days(&[1, 4, 7]).unwrap();
        let json = serde_json::to_string(&days).unwrap();
        assert_eq!(json, "[1,4,7]");

        let back: DaySet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, days);

        // Out-of-range days are rejected at deserialization time
        assert!(serde_json::from_str::<DaySet>("[0,3]").is_err());
    }

    #[test]
    fn route_time_serde_roundtrip() {
        let t = RouteTime::parse("18:45").unwrap();
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, "\"18:45\"");
        assert_eq!(serde_json::from_str::<RouteTime>(&json).unwrap(), t);
        assert!(serde_json::from_str::<RouteTime>("\"25:00\"").is_err());
    }
}
