//! Day-boundary date utilities
//!
//! All reservation dates are timezone-less wall-clock values, so a "day" is
//! simply the calendar date of a `NaiveDateTime`. Every function here is pure
//! and total.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// Same calendar day at 00:00:00.000
#[inline]
pub fn start_of_day(d: NaiveDateTime) -> NaiveDateTime {
    day_start(d.date())
}

/// Same calendar day at 23:59:59.999
#[inline]
pub fn end_of_day(d: NaiveDateTime) -> NaiveDateTime {
    d.date().and_time(last_millisecond())
}

/// Whole calendar days from `a` to `b` (negative when `b` is earlier)
#[inline]
pub fn days_between(a: NaiveDateTime, b: NaiveDateTime) -> i64 {
    (start_of_day(b) - start_of_day(a)).num_days()
}

/// True iff both instants fall on the same calendar day
#[inline]
pub fn is_same_day(a: NaiveDateTime, b: NaiveDateTime) -> bool {
    start_of_day(a) == start_of_day(b)
}

/// Midnight of the given calendar date
#[inline]
pub fn day_start(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Start of the day after `now`, the earliest bookable instant
#[inline]
pub fn tomorrow(now: NaiveDateTime) -> NaiveDateTime {
    start_of_day(now) + Duration::days(1)
}

/// Up to `count` consecutive calendar dates starting at `from`
///
/// Stops early at the last representable date instead of overflowing.
pub fn days_starting(from: NaiveDate, count: usize) -> impl Iterator<Item = NaiveDate> {
    from.iter_days().take(count)
}

fn last_millisecond() -> NaiveTime {
    // 23:59:59.999 always exists
    NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn dt(y: i32, m: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    #[test]
    fn test_day_boundaries() {
        let d = dt(2024, 6, 10, 14, 35);
        assert_eq!(start_of_day(d), dt(2024, 6, 10, 0, 0));
        assert_eq!(
            end_of_day(d),
            NaiveDate::from_ymd_opt(2024, 6, 10)
                .unwrap()
                .and_hms_milli_opt(23, 59, 59, 999)
                .unwrap()
        );
    }

    #[test]
    fn test_days_between_ignores_time_of_day() {
        let a = dt(2024, 6, 10, 23, 0);
        let b = dt(2024, 6, 11, 1, 0);
        assert_eq!(days_between(a, b), 1);
        assert_eq!(days_between(b, a), -1);
        assert_eq!(days_between(start_of_day(a), end_of_day(a)), 0);
    }

    #[test]
    fn test_days_between_across_month_end() {
        assert_eq!(days_between(dt(2024, 2, 27, 0, 0), dt(2024, 3, 2, 0, 0)), 4);
    }

    #[test]
    fn test_tomorrow() {
        assert_eq!(tomorrow(dt(2024, 6, 10, 18, 0)), dt(2024, 6, 11, 0, 0));
    }

    #[test]
    fn test_days_starting() {
        let from = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let days: Vec<NaiveDate> = days_starting(from, 3).collect();
        assert_eq!(days.len(), 3);
        assert_eq!(days[2], NaiveDate::from_ymd_opt(2024, 6, 12).unwrap());
        assert_eq!(days_starting(from, 0).count(), 0);
    }

    #[test]
    fn test_days_starting_stops_at_last_date() {
        let near_end = NaiveDate::MAX - Duration::days(1);
        assert!(days_starting(near_end, 5).count() <= 2);
    }

    fn any_datetime() -> impl Strategy<Value = NaiveDateTime> {
        // 2000-01-01 .. ~2060, minute resolution
        (0i64..(60 * 365 * 24 * 60)).prop_map(|minutes| {
            dt(2000, 1, 1, 0, 0) + Duration::minutes(minutes)
        })
    }

    proptest! {
        #[test]
        fn prop_same_day_has_zero_days_between(d in any_datetime()) {
            prop_assert_eq!(days_between(start_of_day(d), end_of_day(d)), 0);
            prop_assert!(is_same_day(start_of_day(d), end_of_day(d)));
        }

        #[test]
        fn prop_days_between_is_antisymmetric(a in any_datetime(), b in any_datetime()) {
            prop_assert_eq!(days_between(a, b), -days_between(b, a));
            if !is_same_day(a, b) {
                prop_assert!(days_between(a, b) != 0);
            }
        }

        #[test]
        fn prop_days_between_matches_floor_of_day_difference(a in any_datetime(), b in any_datetime()) {
            let millis = (start_of_day(b) - start_of_day(a)).num_milliseconds();
            prop_assert_eq!(days_between(a, b), millis.div_euclid(86_400_000));
        }
    }
}
