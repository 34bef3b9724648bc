use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

const KEY_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateKeyError {
    #[error("invalid date key `{0}`, expected YYYY-MM-DD")]
    Invalid(String),
    #[error("invalid reset time `{0}`, expected HH:MM")]
    InvalidResetTime(String),
}

/// One habit-day on the local calendar.
///
/// The string form is `YYYY-MM-DD`, and the derived ordering agrees with the
/// lexicographic ordering of that form. There is no time-of-day or zone
/// attached, so weekday and day-of-month lookups never drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(NaiveDate);

impl DateKey {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn date(self) -> NaiveDate {
        self.0
    }

    pub fn weekday(self) -> Weekday {
        self.0.weekday()
    }

    pub fn day_of_month(self) -> u32 {
        self.0.day()
    }

    pub fn add_days(self, days: i64) -> Self {
        let shifted = self.0.checked_add_signed(Duration::days(days));
        match shifted {
            Some(date) => Self(date),
            None if days < 0 => Self(NaiveDate::MIN),
            None => Self(NaiveDate::MAX),
        }
    }

    pub fn sub_days(self, days: i64) -> Self {
        self.add_days(-days)
    }

    /// Signed number of days from `earlier` to `self`.
    pub fn days_since(self, earlier: DateKey) -> i64 {
        (self.0 - earlier.0).num_days()
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(KEY_FORMAT))
    }
}

impl FromStr for DateKey {
    type Err = DateKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        // chrono accepts unpadded fields; keys must stay fixed-width to sort as strings
        if trimmed.len() != 10 {
            return Err(DateKeyError::Invalid(s.to_string()));
        }
        NaiveDate::parse_from_str(trimmed, KEY_FORMAT)
            .map(Self)
            .map_err(|_| DateKeyError::Invalid(s.to_string()))
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Wall-clock time at which a new habit-day begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetTime {
    hour: u32,
    minute: u32,
}

impl ResetTime {
    pub fn new(hour: u32, minute: u32) -> Result<Self, DateKeyError> {
        if hour > 23 || minute > 59 {
            return Err(DateKeyError::InvalidResetTime(format!("{hour}:{minute:02}")));
        }
        Ok(Self { hour, minute })
    }

    pub fn midnight() -> Self {
        Self { hour: 0, minute: 0 }
    }

    pub fn hour(self) -> u32 {
        self.hour
    }

    pub fn minute(self) -> u32 {
        self.minute
    }

    pub fn as_time(self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0).unwrap_or_default()
    }
}

impl Default for ResetTime {
    fn default() -> Self {
        Self { hour: 4, minute: 0 }
    }
}

impl fmt::Display for ResetTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for ResetTime {
    type Err = DateKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DateKeyError::InvalidResetTime(s.to_string());
        let (hour, minute) = s.trim().split_once(':').ok_or_else(invalid)?;
        let hour = hour.trim().parse::<u32>().map_err(|_| invalid())?;
        let minute = minute.trim().parse::<u32>().map_err(|_| invalid())?;
        Self::new(hour, minute).map_err(|_| invalid())
    }
}

/// Map a local wall-clock timestamp to the habit-day it belongs to.
///
/// Times earlier than the reset time still belong to the previous calendar day.
pub fn habit_day_key(timestamp: NaiveDateTime, reset: ResetTime) -> DateKey {
    let date = timestamp.date();
    if timestamp.time() < reset.as_time() {
        DateKey(date.pred_opt().unwrap_or(date))
    } else {
        DateKey(date)
    }
}

/// Same as [`habit_day_key`] for a zoned timestamp, read on its own local clock.
pub fn habit_day_key_at<Tz: TimeZone>(timestamp: &DateTime<Tz>, reset: ResetTime) -> DateKey {
    habit_day_key(timestamp.naive_local(), reset)
}
