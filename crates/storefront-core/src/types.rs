//! Shared datetime types and query-string date parsing

use chrono::{DateTime as ChronoDateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::ops::Deref;
use utoipa::ToSchema;

/// Timestamp type stored in TIMESTAMPTZ columns
pub type DBDateTime = ChronoDateTime<Utc>;

/// Timestamp type used in API responses (serializes with a `Z` suffix).
///
/// Add `#[schema(value_type = String, format = DateTime)]` when used in a
/// `ToSchema` struct.
pub type UtcDateTime = ChronoDateTime<Utc>;

/// Query parameter datetime that accepts the formats the dashboard sends:
/// - `2024-01-15T14:30:00Z` / `2024-01-15T14:30:00+07:00` (RFC 3339)
/// - `2024-01-15T14:30:00` (naive, assumed UTC)
/// - `2024-01-15` (midnight UTC)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ToSchema)]
#[schema(value_type = String, example = "2024-01-15T14:30:00Z")]
pub struct DateTime(pub ChronoDateTime<Utc>);

impl DateTime {
    pub fn parse(s: &str) -> Option<Self> {
        parse_query_datetime(s, NaiveTime::MIN).map(DateTime)
    }
}

/// Upper bound of an inclusive window. Same formats as [`DateTime`], but a
/// bare date covers that whole day (`2024-01-15` is `23:59:59.999999Z`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ToSchema)]
#[schema(value_type = String, example = "2024-01-15")]
pub struct EndDateTime(pub ChronoDateTime<Utc>);

impl EndDateTime {
    pub fn parse(s: &str) -> Option<Self> {
        let end_of_day = NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999)?;
        parse_query_datetime(s, end_of_day).map(EndDateTime)
    }
}

/// `date_time` is the time of day used when only a date is given
fn parse_query_datetime(s: &str, date_time: NaiveTime) -> Option<ChronoDateTime<Utc>> {
    if let Ok(dt) = s.parse::<ChronoDateTime<Utc>>() {
        return Some(dt);
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(date_time).and_utc())
}

const INVALID_DATETIME: &str =
    "Invalid datetime format. Use ISO 8601: YYYY-MM-DDTHH:MM:SSZ or YYYY-MM-DD";

impl<'de> Deserialize<'de> for DateTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = Deserialize::deserialize(deserializer)?;
        DateTime::parse(&s).ok_or_else(|| serde::de::Error::custom(INVALID_DATETIME))
    }
}

impl<'de> Deserialize<'de> for EndDateTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = Deserialize::deserialize(deserializer)?;
        EndDateTime::parse(&s).ok_or_else(|| serde::de::Error::custom(INVALID_DATETIME))
    }
}

impl Deref for EndDateTime {
    type Target = ChronoDateTime<Utc>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Serialize for DateTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_rfc3339())
    }
}

impl Deref for DateTime {
    type Target = ChronoDateTime<Utc>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<ChronoDateTime<Utc>> for DateTime {
    fn from(dt: ChronoDateTime<Utc>) -> Self {
        DateTime(dt)
    }
}

impl From<DateTime> for ChronoDateTime<Utc> {
    fn from(dt: DateTime) -> Self {
        dt.0
    }
}
