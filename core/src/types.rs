//! Shared primitive types used across generator and analyzer.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sequential user identifier, starting at 1.
pub type UserId = u64;

/// Timestamp text layout used in every table.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Funnel stages that produce events, in funnel order.
/// Signup is stage zero and lives on the user row, not in the event table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    FirstWorkout,
    FirstReward,
    RepeatVisit,
}

impl EventType {
    pub const ALL: [EventType; 3] = [
        EventType::FirstWorkout,
        EventType::FirstReward,
        EventType::RepeatVisit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstWorkout => "first_workout",
            Self::FirstReward  => "first_reward",
            Self::RepeatVisit  => "repeat_visit",
        }
    }

    /// Position in the funnel, 0-based.
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A calendar month. Ordering and arithmetic go through `ordinal()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    pub year:  i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        Self { year: date.year(), month: date.month() }
    }

    /// Months since year 0, so differences are whole-month distances.
    pub fn ordinal(&self) -> i64 {
        self.year as i64 * 12 + self.month as i64 - 1
    }

    pub fn months_until(&self, later: YearMonth) -> i64 {
        later.ordinal() - self.ordinal()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Round half away from zero to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// serde adapter for `NaiveDateTime` columns written as `YYYY-MM-DD HH:MM:SS`.
pub mod timestamp_format {
    use super::TIMESTAMP_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(D::Error::custom)
    }
}
