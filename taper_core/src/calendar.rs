//! Calendar math on plain Y/M/D dates.
//!
//! Everything here works on `NaiveDate`, which carries no time of day and no
//! timezone, so month boundaries and DST changes cannot shift a day.

use chrono::{Datelike, Duration, NaiveDate};

/// Format a date as zero-padded `YYYY-MM-DD`
pub fn iso_date(date: NaiveDate) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

/// Parse `YYYY-MM-DD`, or the date part of a local timestamp such as
/// `2026-03-02T07:15:00Z`
pub fn parse_iso_date(input: &str) -> Option<NaiveDate> {
    let date_part = input.trim().split('T').next()?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Sunday on or before the given date
pub fn week_anchor(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_sunday()))
}

/// Saturday that closes the Sunday-anchored week containing `date`
pub fn week_saturday(date: NaiveDate) -> NaiveDate {
    date + Duration::days(6 - i64::from(date.weekday().num_days_from_sunday()))
}

/// Whole days from `a` to `b` (negative when `b` is earlier)
pub fn days_between(a: NaiveDate, b: NaiveDate) -> i64 {
    (b - a).num_days()
}

/// Short `M/D` label used for week buckets
pub fn short_label(date: NaiveDate) -> String {
    format!("{}/{}", date.month(), date.day())
}

/// Every date from `start` to `end`, inclusive
pub fn date_range(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d <= end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_iso_date_is_zero_padded() {
        assert_eq!(iso_date(ymd(2026, 2, 1)), "2026-02-01");
        assert_eq!(iso_date(ymd(2026, 12, 31)), "2026-12-31");
    }

    #[test]
    fn test_parse_iso_date_accepts_timestamps() {
        assert_eq!(parse_iso_date("2026-03-02"), Some(ymd(2026, 3, 2)));
        assert_eq!(parse_iso_date("2026-03-02T07:15:00Z"), Some(ymd(2026, 3, 2)));
        assert_eq!(parse_iso_date("03/02/2026"), None);
        assert_eq!(parse_iso_date(""), None);
    }

    #[test]
    fn test_week_anchor_crosses_month_boundary() {
        // 2026-03-04 is a Wednesday; its week starts Sunday 2026-03-01
        assert_eq!(week_anchor(ymd(2026, 3, 4)), ymd(2026, 3, 1));
        // 2026-04-02 is a Thursday; its week starts in March
        assert_eq!(week_anchor(ymd(2026, 4, 2)), ymd(2026, 3, 29));
        // Sundays anchor to themselves
        assert_eq!(week_anchor(ymd(2026, 2, 1)), ymd(2026, 2, 1));
        assert_eq!(week_anchor(ymd(2026, 4, 2)).weekday(), Weekday::Sun);
    }

    #[test]
    fn test_week_saturday() {
        assert_eq!(week_saturday(ymd(2026, 2, 1)), ymd(2026, 2, 7));
        assert_eq!(week_saturday(ymd(2026, 2, 7)), ymd(2026, 2, 7));
        assert_eq!(week_saturday(ymd(2026, 4, 27)), ymd(2026, 5, 2));
    }

    #[test]
    fn test_days_between_across_dst_change() {
        // US DST starts 2026-03-08; whole-day math must ignore it
        assert_eq!(days_between(ymd(2026, 3, 1), ymd(2026, 3, 8)), 7);
        assert_eq!(days_between(ymd(2026, 3, 8), ymd(2026, 3, 1)), -7);
        assert_eq!(days_between(ymd(2026, 2, 1), ymd(2026, 8, 31)), 211);
    }

    #[test]
    fn test_short_label() {
        assert_eq!(short_label(ymd(2026, 2, 1)), "2/1");
        assert_eq!(short_label(ymd(2026, 11, 22)), "11/22");
    }

    #[test]
    fn test_date_range_inclusive() {
        let days: Vec<_> = date_range(ymd(2026, 2, 27), ymd(2026, 3, 2)).collect();
        assert_eq!(days.len(), 4);
        assert_eq!(days[1], ymd(2026, 2, 28));
        assert_eq!(days[2], ymd(2026, 3, 1));
    }
}
