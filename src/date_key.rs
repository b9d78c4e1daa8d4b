use chrono::NaiveDate;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::de::{self, Deserialize, Deserializer};
use serde::{Serialize, Serializer};
use thiserror::Error;

use std::fmt;
use std::str::FromStr;

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// A calendar day in canonical `YYYY-MM-DD` form.
///
/// Ordering is chronological, which matches the lexicographic order of the
/// string form stored in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(NaiveDate);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid date '{0}', expected YYYY-MM-DD")]
pub struct DateKeyError(String);

impl DateKey {
    pub fn new(date: NaiveDate) -> DateKey {
        DateKey(date)
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<DateKey> {
        NaiveDate::from_ymd_opt(year, month, day).map(DateKey)
    }

    pub fn pred(&self) -> Option<DateKey> {
        self.0.pred_opt().map(DateKey)
    }

    pub fn days_since(&self, earlier: &DateKey) -> i64 {
        (self.0 - earlier.0).num_days()
    }
}

impl FromStr for DateKey {
    type Err = DateKeyError;

    fn from_str(s: &str) -> Result<DateKey, DateKeyError> {
        let date = NaiveDate::parse_from_str(s, DATE_KEY_FORMAT)
            .map_err(|_| DateKeyError(s.to_string()))?;

        // chrono accepts unpadded fields, the canonical form does not
        if date.format(DATE_KEY_FORMAT).to_string() != s {
            return Err(DateKeyError(s.to_string()));
        }

        Ok(DateKey(date))
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_KEY_FORMAT))
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<DateKey, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

impl ToSql for DateKey {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_string()))
    }
}

impl FromSql for DateKey {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<DateKey> {
        value
            .as_str()?
            .parse()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_dates() {
        let key: DateKey = "2024-06-03".parse().unwrap();

        assert_eq!(key, DateKey::from_ymd(2024, 6, 3).unwrap());
        assert_eq!(key.to_string(), "2024-06-03");
    }

    #[test]
    fn rejects_malformed_and_impossible_dates() {
        assert!("2024-6-3".parse::<DateKey>().is_err());
        assert!("2024-02-30".parse::<DateKey>().is_err());
        assert!("2024-06-03T00:00:00Z".parse::<DateKey>().is_err());
        assert!("".parse::<DateKey>().is_err());
    }

    #[test]
    fn pred_crosses_month_and_year_boundaries() {
        let new_year = DateKey::from_ymd(2024, 1, 1).unwrap();
        let leap_march = DateKey::from_ymd(2024, 3, 1).unwrap();

        assert_eq!(new_year.pred(), DateKey::from_ymd(2023, 12, 31));
        assert_eq!(leap_march.pred(), DateKey::from_ymd(2024, 2, 29));
    }

    #[test]
    fn ordering_is_chronological() {
        let earlier = DateKey::from_ymd(2023, 12, 31).unwrap();
        let later = DateKey::from_ymd(2024, 1, 1).unwrap();

        assert!(earlier < later);
        assert_eq!(later.days_since(&earlier), 1);
    }

    #[test]
    fn serializes_as_plain_string() {
        let key = DateKey::from_ymd(2024, 6, 1).unwrap();

        assert_eq!(serde_json::to_string(&key).unwrap(), "\"2024-06-01\"");
        assert_eq!(
            serde_json::from_str::<DateKey>("\"2024-06-01\"").unwrap(),
            key
        );
        assert!(serde_json::from_str::<DateKey>("\"06/01/2024\"").is_err());
    }
}
