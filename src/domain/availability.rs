// Copyright (c) 2025 - Cowboy AI, Inc.
//! Weekly availability windows
//!
//! A resource is offered in weekly slots. Each slot names a weekday and a
//! local time range, and the range must be a whole number of half hours.
//!
//! # Examples
//!
//! ```rust
//! use chrono::NaiveTime;
//! use resource_directory::domain::{Availability, DayOfWeek};
//!
//! let slot = Availability::new(
//!     DayOfWeek::Monday,
//!     NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
//!     NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
//! );
//! assert!(slot.validate().is_ok());
//! assert_eq!(slot.duration_minutes(), 90);
//! ```

use chrono::{Datelike, NaiveDateTime, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Slot granularity in minutes
pub const SLOT_MINUTES: i64 = 30;

/// Day of the week an availability window falls on
///
/// Serialized in upper case (`"MONDAY"`); parsing ignores case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    /// All days, Monday first
    pub const ALL: [DayOfWeek; 7] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
        Self::Sunday,
    ];

    /// Canonical upper-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monday => "MONDAY",
            Self::Tuesday => "TUESDAY",
            Self::Wednesday => "WEDNESDAY",
            Self::Thursday => "THURSDAY",
            Self::Friday => "FRIDAY",
            Self::Saturday => "SATURDAY",
            Self::Sunday => "SUNDAY",
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayOfWeek {
    type Err = AvailabilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|day| day.as_str() == wanted)
            .ok_or_else(|| AvailabilityError::UnknownDay(s.to_string()))
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Mon => Self::Monday,
            Weekday::Tue => Self::Tuesday,
            Weekday::Wed => Self::Wednesday,
            Weekday::Thu => Self::Thursday,
            Weekday::Fri => Self::Friday,
            Weekday::Sat => Self::Saturday,
            Weekday::Sun => Self::Sunday,
        }
    }
}

impl Serialize for DayOfWeek {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DayOfWeek {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Availability validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AvailabilityError {
    #[error("window {start}-{end} on {day} must span a positive multiple of 30 minutes, got {minutes}")]
    NotSlotAligned {
        day: DayOfWeek,
        start: NaiveTime,
        end: NaiveTime,
        minutes: i64,
    },

    #[error("unknown day of week: {0}")]
    UnknownDay(String),
}

/// One weekly window during which a resource may be scheduled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    pub day_of_week: DayOfWeek,
    #[serde(with = "local_time")]
    pub start_time: NaiveTime,
    #[serde(with = "local_time")]
    pub end_time: NaiveTime,
}

impl Availability {
    pub fn new(day_of_week: DayOfWeek, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self {
            day_of_week,
            start_time,
            end_time,
        }
    }

    /// Signed length of the window in whole minutes
    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }

    /// Check the half-hour slot rule
    pub fn validate(&self) -> Result<(), AvailabilityError> {
        let span = self.end_time - self.start_time;
        let minutes = span.num_minutes();
        let whole_minutes = span == chrono::Duration::minutes(minutes);

        if minutes > 0 && whole_minutes && minutes % SLOT_MINUTES == 0 {
            Ok(())
        } else {
            Err(AvailabilityError::NotSlotAligned {
                day: self.day_of_week,
                start: self.start_time,
                end: self.end_time,
                minutes,
            })
        }
    }

    /// Does this window contain `at`, start inclusive, end exclusive
    pub fn covers_start(&self, at: &NaiveDateTime) -> bool {
        self.falls_on(at) && self.start_time <= at.time() && at.time() < self.end_time
    }

    /// Does this window reach `at`, start exclusive, end inclusive
    pub fn covers_end(&self, at: &NaiveDateTime) -> bool {
        self.falls_on(at) && self.start_time < at.time() && at.time() <= self.end_time
    }

    /// Does this single window span `[from, to]` on one weekday
    pub fn covers_range(&self, from: &NaiveDateTime, to: &NaiveDateTime) -> bool {
        from.date() == to.date()
            && from <= to
            && self.falls_on(from)
            && self.start_time <= from.time()
            && to.time() <= self.end_time
    }

    fn falls_on(&self, at: &NaiveDateTime) -> bool {
        DayOfWeek::from(at.weekday()) == self.day_of_week
    }
}

/// Validate every window of a schedule
pub fn validate_all(windows: &[Availability]) -> Result<(), AvailabilityError> {
    windows.iter().try_for_each(Availability::validate)
}

/// `HH:MM` or `HH:MM:SS` local times
mod local_time {
    use super::*;

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        let text = if time.second() == 0 && time.nanosecond() == 0 {
            time.format("%H:%M").to_string()
        } else {
            time.format("%H:%M:%S").to_string()
        };
        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, "%H:%M:%S%.f")
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M"))
            .map_err(|e| serde::de::Error::custom(format!("invalid time '{}': {}", raw, e)))
    }
}
