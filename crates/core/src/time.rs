//! Calendar-day keys and search-time helpers.
//!
//! Clip history is indexed by calendar day. [`DayKey`] is the
//! `YYYYMMDD` form used both as a cache key and as a navigable path
//! segment in the surrounding application.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::CoreError;

const DAY_KEY_FORMAT: &str = "%Y%m%d";

/// A calendar day, rendered as a zero-padded `YYYYMMDD` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DayKey(NaiveDate);

impl DayKey {
    /// Parse a `YYYYMMDD` string.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        NaiveDate::parse_from_str(s, DAY_KEY_FORMAT)
            .map(Self)
            .map_err(|e| CoreError::Validation(format!("Invalid day key '{s}': {e}")))
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self(date)
    }

    /// The day containing `now`.
    pub fn for_now(now: DateTime<Utc>) -> Self {
        Self(now.date_naive())
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// The preceding calendar day, if representable.
    pub fn previous(&self) -> Option<Self> {
        self.0.pred_opt().map(Self)
    }

    /// The following calendar day, if representable.
    pub fn next(&self) -> Option<Self> {
        self.0.succ_opt().map(Self)
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DAY_KEY_FORMAT))
    }
}

/// Search timestamp sent to the appliance for a day's clip query: the
/// selected day combined with `now`'s time of day, as epoch seconds.
pub fn search_time_for_day(day: DayKey, now: DateTime<Utc>) -> i64 {
    day.date().and_time(now.time()).and_utc().timestamp()
}

/// Epoch seconds `days` whole days before `now`.
pub fn epoch_days_ago(now: DateTime<Utc>, days: i64) -> i64 {
    now.timestamp() - 86_400 * days
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_and_displays_zero_padded() {
        let key = DayKey::parse("20220403").unwrap();
        assert_eq!(key.date(), NaiveDate::from_ymd_opt(2022, 4, 3).unwrap());
        assert_eq!(key.to_string(), "20220403");
    }

    #[test]
    fn rejects_garbage() {
        assert!(DayKey::parse("2022-04-03").is_err());
        assert!(DayKey::parse("April 3").is_err());
        assert!(DayKey::parse("20221345").is_err());
    }

    #[test]
    fn previous_and_next_cross_month_boundary() {
        let key = DayKey::parse("20220301").unwrap();
        assert_eq!(key.previous().unwrap().to_string(), "20220228");
        assert_eq!(key.next().unwrap().to_string(), "20220302");
    }

    #[test]
    fn search_time_uses_selected_day_at_current_time_of_day() {
        let now = Utc.with_ymd_and_hms(2022, 4, 10, 13, 45, 30).unwrap();
        let day = DayKey::parse("20220403").unwrap();
        let expected = Utc
            .with_ymd_and_hms(2022, 4, 3, 13, 45, 30)
            .unwrap()
            .timestamp();
        assert_eq!(search_time_for_day(day, now), expected);
    }

    #[test]
    fn days_ago_subtracts_whole_days() {
        let now = Utc.with_ymd_and_hms(2022, 4, 10, 0, 0, 0).unwrap();
        assert_eq!(epoch_days_ago(now, 2), now.timestamp() - 172_800);
    }
}
