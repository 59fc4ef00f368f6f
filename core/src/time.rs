//! Time-of-day arithmetic.
//!
//! Booking times are local wall-clock values. They are stored as minutes since
//! midnight so that end-time computation and overlap checks are integer
//! arithmetic, and rendered as zero-padded `HH:mm` on the wire.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Minutes in a day. A [`TimeOfDay`] is always strictly below this value.
pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// Errors produced by time-of-day parsing and arithmetic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeError {
    /// Input is not an `HH:mm` string.
    #[error("invalid time '{0}', expected HH:mm")]
    Malformed(String),

    /// Minute count is not within a single day.
    #[error("{0} minutes is outside a single day")]
    OutOfRange(u32),

    /// `start + hours` reaches or passes midnight.
    #[error("a {hours} hour booking starting at {start} would end after midnight")]
    CrossesMidnight {
        /// Requested start.
        start: TimeOfDay,
        /// Requested duration in hours.
        hours: u32,
    },
}

/// A local time of day with minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    /// 00:00.
    pub const MIDNIGHT: Self = Self(0);

    /// Build from minutes since midnight.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError::OutOfRange`] for values of a full day or more.
    pub const fn from_minutes(minutes: u16) -> Result<Self, TimeError> {
        if minutes >= MINUTES_PER_DAY {
            return Err(TimeError::OutOfRange(minutes as u32));
        }
        Ok(Self(minutes))
    }

    /// Build from an hour and minute pair.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError::OutOfRange`] when the pair is not a valid time.
    pub fn from_hm(hour: u8, minute: u8) -> Result<Self, TimeError> {
        if minute >= 60 {
            return Err(TimeError::OutOfRange(u32::from(hour) * 60 + u32::from(minute)));
        }
        Self::from_minutes(u16::from(hour) * 60 + u16::from(minute))
    }

    /// Minutes since midnight.
    #[must_use]
    pub const fn minutes(self) -> u16 {
        self.0
    }

    /// Hour component (0-23).
    #[must_use]
    pub const fn hour(self) -> u16 {
        self.0 / 60
    }

    /// Minute component (0-59).
    #[must_use]
    pub const fn minute(self) -> u16 {
        self.0 % 60
    }

    /// Add whole hours, refusing results that reach the next day.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError::CrossesMidnight`] when the result would be 24:00 or later.
    pub fn checked_add_hours(self, hours: u32) -> Result<Self, TimeError> {
        let end = hours
            .checked_mul(60)
            .and_then(|m| m.checked_add(u32::from(self.0)))
            .filter(|m| *m < u32::from(MINUTES_PER_DAY))
            .ok_or(TimeError::CrossesMidnight { start: self, hours })?;
        u16::try_from(end)
            .map(Self)
            .map_err(|_| TimeError::OutOfRange(end))
    }

    /// Add minutes, returning `None` past the end of the day.
    #[must_use]
    pub fn checked_add_minutes(self, minutes: u16) -> Option<Self> {
        self.0
            .checked_add(minutes)
            .filter(|m| *m < MINUTES_PER_DAY)
            .map(Self)
    }

    /// Convert to a `chrono` time for calendar payloads.
    #[must_use]
    pub fn to_naive_time(self) -> NaiveTime {
        NaiveTime::from_hms_opt(u32::from(self.hour()), u32::from(self.minute()), 0)
            .unwrap_or(NaiveTime::MIN)
    }

    /// Build from a `chrono` time, dropping seconds.
    #[must_use]
    pub fn from_naive_time(time: NaiveTime) -> Self {
        // hour < 24 and minute < 60, always in range
        #[allow(clippy::cast_possible_truncation)]
        Self((time.hour() * 60 + time.minute()) as u16)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        NaiveTime::parse_from_str(trimmed, "%H:%M")
            .map(Self::from_naive_time)
            .map_err(|_| TimeError::Malformed(trimmed.to_string()))
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A half-open `[start, end)` interval within one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Inclusive start.
    pub start: TimeOfDay,
    /// Exclusive end.
    pub end: TimeOfDay,
}

impl TimeSlot {
    /// Create a slot.
    #[must_use]
    pub const fn new(start: TimeOfDay, end: TimeOfDay) -> Self {
        Self { start, end }
    }

    /// Whether two half-open intervals share any minute.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}
