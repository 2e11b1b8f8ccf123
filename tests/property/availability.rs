// Copyright (c) 2025 - Cowboy AI, Inc.
//! Properties of availability windows

use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use proptest::prelude::*;
use resource_directory::domain::{Availability, DayOfWeek};

fn day() -> impl Strategy<Value = DayOfWeek> {
    prop::sample::select(DayOfWeek::ALL.to_vec())
}

fn minute_of_day() -> impl Strategy<Value = u32> {
    0u32..(24 * 60)
}

fn at_minute(minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(minute / 60, minute % 60, 0).unwrap()
}

proptest! {
    /// A window is valid iff it is a positive multiple of 30 minutes
    #[test]
    fn prop_half_hour_rule(day in day(), start in minute_of_day(), end in minute_of_day()) {
        let window = Availability::new(day, at_minute(start), at_minute(end));
        let minutes = end as i64 - start as i64;

        prop_assert_eq!(window.duration_minutes(), minutes);
        prop_assert_eq!(window.validate().is_ok(), minutes > 0 && minutes % 30 == 0);
    }

    /// Seconds off the minute grid are never slot aligned
    #[test]
    fn prop_seconds_break_alignment(start in 0u32..(23 * 60), second in 1u32..60) {
        let begin = at_minute(start);
        let end = NaiveTime::from_hms_opt((start + 30) / 60, (start + 30) % 60, second).unwrap();
        let window = Availability::new(DayOfWeek::Monday, begin, end);

        prop_assert!(window.validate().is_err());
    }

    /// Any sub-range of a window on its own weekday is covered by it
    #[test]
    fn prop_window_covers_its_sub_ranges(
        start in 0u32..(20 * 60),
        slots in 1u32..8,
        a in 0u32..240,
        b in 0u32..240,
    ) {
        let end = start + slots * 30;
        let window = Availability::new(DayOfWeek::Wednesday, at_minute(start), at_minute(end));

        // 2024-01-03 is a Wednesday
        let date = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        let span = end - start;
        let (lo, hi) = (start + a % (span + 1), start + b % (span + 1));
        let from = date.and_time(at_minute(lo.min(hi)));
        let to = date.and_time(at_minute(lo.max(hi)));

        prop_assert_eq!(from.weekday().num_days_from_monday(), 2);
        prop_assert!(window.covers_range(&from, &to));
        prop_assert!(!window.covers_range(&(from + Duration::days(1)), &(to + Duration::days(1))));
    }

    /// Day names parse regardless of case
    #[test]
    fn prop_day_parse_ignores_case(day in day(), upper in any::<bool>()) {
        let text = if upper {
            day.as_str().to_ascii_uppercase()
        } else {
            day.as_str().to_ascii_lowercase()
        };
        prop_assert_eq!(text.parse::<DayOfWeek>().unwrap(), day);
    }
}
