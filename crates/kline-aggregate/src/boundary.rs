//! Wall-clock aligned window boundaries.

use chrono::{DateTime, Datelike, Utc, Weekday};
use kline_types::Resolution;

/// Returns the first boundary of `resolution` strictly after `now`, in epoch
/// seconds.
///
/// Every resolution except [`Resolution::Week1`] aligns to a multiple of its
/// length since the Unix epoch. Weekly windows instead close at the end of
/// the current or coming Sunday (UTC), which epoch alignment would miss since
/// the epoch fell on a Thursday.
#[must_use]
pub fn first_boundary(resolution: Resolution, now: DateTime<Utc>) -> i64 {
    match resolution {
        Resolution::Week1 => end_of_week(now),
        other => align_up(now.timestamp(), other.seconds()),
    }
}

/// Returns the next UTC midnight strictly after `now`, in epoch seconds.
#[must_use]
pub fn end_of_day(now: DateTime<Utc>) -> i64 {
    align_up(now.timestamp(), Resolution::DAY)
}

/// Returns the end of the calendar week containing `now` (Monday 00:00 UTC
/// following the current or coming Sunday), in epoch seconds.
#[must_use]
pub fn end_of_week(now: DateTime<Utc>) -> i64 {
    let end_of_today = end_of_day(now);
    match now.weekday() {
        Weekday::Sun => end_of_today,
        weekday => {
            let days_until_saturday = 6 - i64::from(weekday.num_days_from_sunday());
            end_of_today + (days_until_saturday + 1) * Resolution::DAY
        }
    }
}

/// Rounds `ts` up to the next multiple of `step`; an exact multiple moves a
/// full step forward.
const fn align_up(ts: i64, step: i64) -> i64 {
    ts - ts.rem_euclid(step) + step
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    fn as_dt(ts: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(ts, 0).unwrap()
    }

    #[test]
    fn test_minute_alignment() {
        let now = at(2024, 1, 17, 14, 37, 45);
        assert_eq!(
            as_dt(first_boundary(Resolution::Minute1, now)),
            at(2024, 1, 17, 14, 38, 0)
        );
        assert_eq!(
            as_dt(first_boundary(Resolution::Minute5, now)),
            at(2024, 1, 17, 14, 40, 0)
        );
        assert_eq!(
            as_dt(first_boundary(Resolution::Minute10, now)),
            at(2024, 1, 17, 14, 40, 0)
        );
        assert_eq!(
            as_dt(first_boundary(Resolution::Minute15, now)),
            at(2024, 1, 17, 14, 45, 0)
        );
        assert_eq!(
            as_dt(first_boundary(Resolution::Minute30, now)),
            at(2024, 1, 17, 15, 0, 0)
        );
        assert_eq!(
            as_dt(first_boundary(Resolution::Hour1, now)),
            at(2024, 1, 17, 15, 0, 0)
        );
        assert_eq!(
            as_dt(first_boundary(Resolution::Day1, now)),
            at(2024, 1, 18, 0, 0, 0)
        );
    }

    #[test]
    fn test_exact_boundary_moves_forward() {
        let now = at(2024, 1, 17, 14, 40, 0);
        assert_eq!(
            as_dt(first_boundary(Resolution::Minute5, now)),
            at(2024, 1, 17, 14, 45, 0)
        );
    }

    #[test]
    fn test_week_boundary_from_wednesday() {
        // 2024-01-17 is a Wednesday; the week closes at the end of Sunday 21st.
        let now = at(2024, 1, 17, 9, 30, 0);
        assert_eq!(now.weekday(), Weekday::Wed);

        let boundary = as_dt(first_boundary(Resolution::Week1, now));
        assert_eq!(boundary, at(2024, 1, 22, 0, 0, 0));
        assert_eq!((boundary - chrono::TimeDelta::seconds(1)).weekday(), Weekday::Sun);
    }

    #[test]
    fn test_week_boundary_from_sunday() {
        let now = at(2024, 1, 21, 18, 5, 0);
        assert_eq!(now.weekday(), Weekday::Sun);
        assert_eq!(
            as_dt(first_boundary(Resolution::Week1, now)),
            at(2024, 1, 22, 0, 0, 0)
        );
    }

    #[test]
    fn test_week_boundary_from_saturday_and_monday() {
        assert_eq!(
            as_dt(end_of_week(at(2024, 1, 20, 23, 59, 59))),
            at(2024, 1, 22, 0, 0, 0)
        );
        assert_eq!(
            as_dt(end_of_week(at(2024, 1, 22, 0, 0, 0))),
            at(2024, 1, 29, 0, 0, 0)
        );
    }

    #[test]
    fn test_end_of_day() {
        let boundary = as_dt(end_of_day(at(2024, 2, 29, 23, 0, 1)));
        assert_eq!(boundary, at(2024, 3, 1, 0, 0, 0));
        assert_eq!(boundary.hour(), 0);
    }
}
