//! Weekly trigger arithmetic.
//!
//! A [`Schedule`] names one weekday and one UTC hour. [`next_occurrence`]
//! turns it into the next concrete instant after a clock reading, using
//! calendar dates so month lengths, leap days and year ends come for free.

use crate::error::{ReaperError, Result};
use chrono::{DateTime, Datelike, Days, NaiveTime, TimeZone, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Earliest instant on `weekday` at `hour:00:00` that is strictly after the
/// hour containing `now`.
///
/// When `now` already falls on `weekday` at or past `hour`, the trigger is
/// treated as passed and the result lands one week later. Re-applying the
/// function to its own result therefore always advances by seven days.
pub fn next_occurrence(now: DateTime<Utc>, weekday: Weekday, hour: u32) -> DateTime<Utc> {
    let current = now.weekday().num_days_from_sunday();
    let target = weekday.num_days_from_sunday();

    let mut day_delta = (target + 7 - current) % 7;
    if day_delta == 0 && now.hour() >= hour {
        day_delta = 7;
    }

    let date = now.date_naive() + Days::new(u64::from(day_delta));
    let midnight = date.and_time(NaiveTime::MIN);
    Utc.from_utc_datetime(&midnight) + chrono::Duration::hours(i64::from(hour))
}

/// Parse a weekday name, full or abbreviated, ignoring case.
pub fn parse_weekday(s: &str) -> Result<Weekday> {
    s.trim()
        .parse::<Weekday>()
        .map_err(|_| ReaperError::config(format!("invalid weekday '{s}'")))
}

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

/// A validated weekly trigger: one weekday, one hour of the day (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    weekday: Weekday,
    hour: u32,
}

impl Schedule {
    pub fn new(weekday: Weekday, hour: u32) -> Result<Self> {
        if hour > 23 {
            return Err(ReaperError::config(format!(
                "hour must be between 0 and 23, got {hour}"
            )));
        }
        Ok(Self { weekday, hour })
    }

    pub fn weekday(&self) -> Weekday {
        self.weekday
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn next_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        next_occurrence(now, self.weekday, self.hour)
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "every {} at {:02}:00 UTC", self.weekday, self.hour)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn later_in_same_week() {
        // 2019-01-20 is a Sunday
        let next = next_occurrence(at(2019, 1, 20, 10, 0, 0), Weekday::Fri, 22);
        assert_eq!(next, at(2019, 1, 25, 22, 0, 0));
    }

    #[test]
    fn crosses_month_end_in_non_leap_february() {
        let next = next_occurrence(at(2019, 2, 26, 10, 0, 0), Weekday::Fri, 22);
        assert_eq!(next, at(2019, 3, 1, 22, 0, 0));
    }

    #[test]
    fn leap_day_rolls_into_march() {
        // 2020-02-29 is a Saturday
        let next = next_occurrence(at(2020, 2, 29, 10, 0, 0), Weekday::Fri, 22);
        assert_eq!(next, at(2020, 3, 6, 22, 0, 0));
    }

    #[test]
    fn leap_february_keeps_day_29() {
        // 2024-02-26 is a Monday
        let next = next_occurrence(at(2024, 2, 26, 8, 0, 0), Weekday::Thu, 6);
        assert_eq!(next, at(2024, 2, 29, 6, 0, 0));
    }

    #[test]
    fn crosses_year_end() {
        // 2019-12-30 is a Monday
        let next = next_occurrence(at(2019, 12, 30, 12, 0, 0), Weekday::Sun, 3);
        assert_eq!(next, at(2020, 1, 5, 3, 0, 0));
    }

    #[test]
    fn earlier_weekday_wraps_to_next_week() {
        // 2019-01-25 is a Friday; Monday is three days ahead
        let next = next_occurrence(at(2019, 1, 25, 9, 0, 0), Weekday::Mon, 9);
        assert_eq!(next, at(2019, 1, 28, 9, 0, 0));
    }

    #[test]
    fn same_day_before_hour_fires_today() {
        let next = next_occurrence(at(2019, 1, 25, 21, 59, 59), Weekday::Fri, 22);
        assert_eq!(next, at(2019, 1, 25, 22, 0, 0));
    }

    #[test]
    fn same_day_at_hour_rolls_a_week() {
        let next = next_occurrence(at(2019, 1, 25, 22, 30, 0), Weekday::Fri, 22);
        assert_eq!(next, at(2019, 2, 1, 22, 0, 0));
    }

    #[test]
    fn same_day_after_hour_rolls_a_week() {
        let next = next_occurrence(at(2019, 1, 25, 23, 0, 0), Weekday::Fri, 22);
        assert_eq!(next, at(2019, 2, 1, 22, 0, 0));
    }

    #[test]
    fn reapplying_at_result_advances_one_week() {
        let first = next_occurrence(at(2021, 6, 1, 0, 0, 0), Weekday::Wed, 4);
        let second = next_occurrence(first, Weekday::Wed, 4);
        assert_eq!(second - first, chrono::Duration::weeks(1));
    }

    #[test]
    fn result_has_no_sub_hour_components() {
        let now = at(2022, 3, 14, 5, 17, 42) + chrono::Duration::milliseconds(250);
        let next = next_occurrence(now, Weekday::Tue, 0);
        assert_eq!(next, at(2022, 3, 15, 0, 0, 0));
        assert_eq!(next.timestamp_subsec_nanos(), 0);
    }

    #[test]
    fn result_is_always_in_the_future() {
        let base = at(2023, 12, 25, 0, 0, 0);
        for step in 0..(24 * 9) {
            let now = base + chrono::Duration::minutes(step * 60 + 7);
            for weekday in [Weekday::Mon, Weekday::Thu, Weekday::Sun] {
                for hour in [0, 11, 23] {
                    let next = next_occurrence(now, weekday, hour);
                    assert!(next > now, "{now} -> {next}");
                    assert!(next - now <= chrono::Duration::weeks(1));
                    assert_eq!(next.weekday(), weekday);
                    assert_eq!(next.hour(), hour);
                }
            }
        }
    }

    #[test]
    fn parse_weekday_accepts_full_and_short_names() {
        assert_eq!(parse_weekday("Friday").unwrap(), Weekday::Fri);
        assert_eq!(parse_weekday("sun").unwrap(), Weekday::Sun);
        assert_eq!(parse_weekday(" WEDNESDAY ").unwrap(), Weekday::Wed);
    }

    #[test]
    fn parse_weekday_rejects_garbage() {
        let err = parse_weekday("Funday").unwrap_err();
        assert!(matches!(err, ReaperError::Config(_)));
        assert!(err.to_string().contains("Funday"));
    }

    #[test]
    fn schedule_rejects_hour_24() {
        assert!(Schedule::new(Weekday::Mon, 23).is_ok());
        let err = Schedule::new(Weekday::Mon, 24).unwrap_err();
        assert!(matches!(err, ReaperError::Config(_)));
    }

    #[test]
    fn schedule_display() {
        let s = Schedule::new(Weekday::Fri, 7).unwrap();
        assert_eq!(s.to_string(), "every Fri at 07:00 UTC");
    }
}
