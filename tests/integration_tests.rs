//! Integration tests for occurrence expansion and range queries.

use chrono::{Datelike, NaiveDate, NaiveDateTime};

use recurcal::expander::{expand, expand_all, expand_with_prior};
use recurcal::query::{
    month_range, month_view, month_window_range, month_window_view, week_range, week_view,
    week_view_starting,
};
use recurcal::types::{
    DateRange, Event, Frequency, Occurrence, OverridePatch, Recurrence, RecurrenceOverride,
    RecurrenceRule, WeekStart, WeekdayToken,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(h, min, 0).unwrap()
}

fn range(start: NaiveDate, end: NaiveDate) -> DateRange {
    DateRange::new(start, end)
}

/// One-hour class starting at 09:00 on `anchor`.
fn class(id: &str, anchor: NaiveDate, recurrence: Option<Recurrence>) -> Event {
    let event = Event::new(id, "Class", anchor.and_hms_opt(9, 0, 0).unwrap())
        .with_end(anchor.and_hms_opt(10, 0, 0).unwrap())
        .with_location("Room 12");
    match recurrence {
        Some(recurrence) => event.with_recurrence(recurrence),
        None => event,
    }
}

fn dates(occurrences: &[Occurrence]) -> Vec<NaiveDate> {
    occurrences.iter().map(Occurrence::date).collect()
}

mod non_recurring {
    use super::*;

    #[test]
    fn included_once_when_in_range() {
        let event = class("assembly", date(2025, 3, 7), None);
        let result = expand(&event, range(date(2025, 3, 1), date(2025, 3, 31)));
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "assembly");
        assert_eq!(result[0].base_event_id, "assembly");
        assert_eq!(result[0].start, at(2025, 3, 7, 9, 0));
        assert_eq!(result[0].end, Some(at(2025, 3, 7, 10, 0)));
    }

    #[test]
    fn included_on_range_edges() {
        let event = class("assembly", date(2025, 3, 7), None);
        assert_eq!(expand(&event, range(date(2025, 3, 7), date(2025, 3, 7))).len(), 1);
        assert_eq!(expand(&event, range(date(2025, 3, 1), date(2025, 3, 7))).len(), 1);
    }

    #[test]
    fn excluded_when_outside_range() {
        let event = class("assembly", date(2025, 3, 7), None);
        assert!(expand(&event, range(date(2025, 3, 8), date(2025, 3, 31))).is_empty());
        assert!(expand(&event, range(date(2025, 2, 1), date(2025, 3, 6))).is_empty());
    }
}

mod daily {
    use super::*;

    #[test]
    fn interval_two() {
        let rule = RecurrenceRule::daily().with_interval(2);
        let event = class("lab", date(2025, 3, 1), Some(Recurrence::new(rule)));
        let result = expand(&event, range(date(2025, 3, 1), date(2025, 3, 11)));
        assert_eq!(
            dates(&result),
            vec![
                date(2025, 3, 1),
                date(2025, 3, 3),
                date(2025, 3, 5),
                date(2025, 3, 7),
                date(2025, 3, 9),
                date(2025, 3, 11),
            ]
        );
    }

    #[test]
    fn keeps_time_of_day_and_duration() {
        let event = class("lab", date(2025, 3, 1), Some(Recurrence::new(RecurrenceRule::daily())));
        let result = expand(&event, range(date(2025, 3, 4), date(2025, 3, 4)));
        assert_eq!(result[0].start, at(2025, 3, 4, 9, 0));
        assert_eq!(result[0].end, Some(at(2025, 3, 4, 10, 0)));
        assert_eq!(result[0].location.as_deref(), Some("Room 12"));
        assert!(!result[0].overridden);
    }

    #[test]
    fn range_before_anchor_is_skipped() {
        let event = class("lab", date(2025, 3, 10), Some(Recurrence::new(RecurrenceRule::daily())));
        let result = expand(&event, range(date(2025, 3, 1), date(2025, 3, 12)));
        assert_eq!(
            dates(&result),
            vec![date(2025, 3, 10), date(2025, 3, 11), date(2025, 3, 12)]
        );
        assert!(expand(&event, range(date(2025, 3, 1), date(2025, 3, 9))).is_empty());
    }

    #[test]
    fn until_is_inclusive() {
        let rule = RecurrenceRule::daily().with_until(date(2025, 3, 5));
        let event = class("lab", date(2025, 3, 1), Some(Recurrence::new(rule)));
        let result = expand(&event, range(date(2025, 3, 1), date(2025, 3, 31)));
        assert_eq!(result.len(), 5);
        assert_eq!(result.last().unwrap().date(), date(2025, 3, 5));
    }

    #[test]
    fn until_before_range_yields_nothing() {
        let rule = RecurrenceRule::daily().with_until(date(2025, 3, 5));
        let event = class("lab", date(2025, 3, 1), Some(Recurrence::new(rule)));
        assert!(expand(&event, range(date(2025, 3, 6), date(2025, 3, 31))).is_empty());
    }
}

mod weekly {
    use super::*;

    fn mon_wed() -> Event {
        let rule = RecurrenceRule::weekly().on([WeekdayToken::Mo, WeekdayToken::We]);
        class("algebra", date(2025, 3, 3), Some(Recurrence::new(rule)))
    }

    #[test]
    fn weekday_set_over_two_weeks() {
        let result = expand(&mon_wed(), range(date(2025, 3, 3), date(2025, 3, 16)));
        assert_eq!(
            dates(&result),
            vec![
                date(2025, 3, 3),
                date(2025, 3, 5),
                date(2025, 3, 10),
                date(2025, 3, 12),
            ]
        );
    }

    #[test]
    fn weekday_set_over_shifted_window() {
        let result = expand(&mon_wed(), range(date(2025, 3, 6), date(2025, 3, 19)));
        assert_eq!(
            dates(&result),
            vec![
                date(2025, 3, 10),
                date(2025, 3, 12),
                date(2025, 3, 17),
                date(2025, 3, 19),
            ]
        );
    }

    #[test]
    fn empty_weekday_set_uses_anchor_weekday() {
        let event = class(
            "seminar",
            date(2025, 3, 6),
            Some(Recurrence::new(RecurrenceRule::weekly())),
        );
        let result = expand(&event, range(date(2025, 3, 1), date(2025, 3, 31)));
        assert_eq!(
            dates(&result),
            vec![
                date(2025, 3, 6),
                date(2025, 3, 13),
                date(2025, 3, 20),
                date(2025, 3, 27),
            ]
        );
    }

    #[test]
    fn every_other_week() {
        let rule = RecurrenceRule::weekly().with_interval(2);
        let event = class("club", date(2025, 3, 3), Some(Recurrence::new(rule)));
        let result = expand(&event, range(date(2025, 3, 1), date(2025, 4, 6)));
        assert_eq!(
            dates(&result),
            vec![date(2025, 3, 3), date(2025, 3, 17), date(2025, 3, 31)]
        );
    }

    #[test]
    fn occurrence_ids_are_deterministic() {
        let result = expand(&mon_wed(), range(date(2025, 3, 3), date(2025, 3, 5)));
        let ids: Vec<_> = result.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["algebra__2025-03-03", "algebra__2025-03-05"]);
        assert!(result.iter().all(|o| o.base_event_id == "algebra"));
    }
}

mod exceptions_and_overrides {
    use super::*;

    fn daily_with(recurrence: impl FnOnce(Recurrence) -> Recurrence) -> Event {
        class(
            "lab",
            date(2025, 3, 1),
            Some(recurrence(Recurrence::new(RecurrenceRule::daily()))),
        )
    }

    #[test]
    fn exception_suppresses_day() {
        let event = daily_with(|r| r.with_exception(date(2025, 3, 3), Some("Holiday")));
        let result = expand(&event, range(date(2025, 3, 1), date(2025, 3, 5)));
        assert_eq!(
            dates(&result),
            vec![
                date(2025, 3, 1),
                date(2025, 3, 2),
                date(2025, 3, 4),
                date(2025, 3, 5),
            ]
        );
    }

    #[test]
    fn override_wins_over_exception() {
        let patch = OverridePatch {
            start: Some(at(2025, 3, 3, 14, 0)),
            title: Some("Moved".to_string()),
            ..OverridePatch::default()
        };
        let event = daily_with(|r| {
            r.with_exception(date(2025, 3, 3), None)
                .with_override(date(2025, 3, 3), patch)
        });
        let result = expand(&event, range(date(2025, 3, 3), date(2025, 3, 3)));

        assert_eq!(result.len(), 1);
        let moved = &result[0];
        assert!(moved.overridden);
        assert_eq!(moved.id, "lab__2025-03-03");
        assert_eq!(moved.title, "Moved");
        assert_eq!(moved.start, at(2025, 3, 3, 14, 0));
        assert_eq!(moved.end, Some(at(2025, 3, 3, 15, 0)));
        assert_eq!(moved.location.as_deref(), Some("Room 12"));
    }

    #[test]
    fn override_injects_unmatched_day() {
        let rule = RecurrenceRule::weekly();
        let event = class(
            "algebra",
            date(2025, 3, 3),
            Some(Recurrence::new(rule).with_override(date(2025, 3, 6), OverridePatch::default())),
        );
        let result = expand(&event, range(date(2025, 3, 3), date(2025, 3, 9)));
        assert_eq!(dates(&result), vec![date(2025, 3, 3), date(2025, 3, 6)]);
        assert_eq!(result[1].id, "algebra__2025-03-06");
        assert_eq!(result[1].start, at(2025, 3, 6, 9, 0));
        assert!(result[1].overridden);
    }

    #[test]
    fn override_can_move_to_another_day() {
        let mut recurrence = Recurrence::new(RecurrenceRule::weekly());
        recurrence.overrides.push(RecurrenceOverride {
            original_date: date(2025, 3, 10),
            patch: OverridePatch {
                start: Some(at(2025, 3, 11, 13, 0)),
                end: Some(at(2025, 3, 11, 13, 30)),
                location: Some("Gym".to_string()),
                ..OverridePatch::default()
            },
            reason: Some("Room swap".to_string()),
        });
        let event = class("algebra", date(2025, 3, 3), Some(recurrence));
        let result = expand(&event, range(date(2025, 3, 10), date(2025, 3, 10)));

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].original_date, date(2025, 3, 10));
        assert_eq!(result[0].id, "algebra__2025-03-10");
        assert_eq!(result[0].date(), date(2025, 3, 11));
        assert_eq!(result[0].end, Some(at(2025, 3, 11, 13, 30)));
        assert_eq!(result[0].location.as_deref(), Some("Gym"));
        assert_eq!(result[0].override_reason.as_deref(), Some("Room swap"));
    }

    #[test]
    fn unknown_frequency_only_emits_overrides() {
        let event = class(
            "odd",
            date(2025, 3, 1),
            Some(
                Recurrence::new(RecurrenceRule::new(Frequency::Unknown))
                    .with_override(date(2025, 3, 4), OverridePatch::default()),
            ),
        );
        let result = expand(&event, range(date(2025, 3, 1), date(2025, 3, 31)));
        assert_eq!(dates(&result), vec![date(2025, 3, 4)]);
    }
}

mod count {
    use super::*;

    fn weekly_three() -> Event {
        let rule = RecurrenceRule::weekly().with_count(3);
        class("tutoring", date(2025, 3, 3), Some(Recurrence::new(rule)))
    }

    #[test]
    fn caps_at_earliest_matches() {
        let result = expand(&weekly_three(), range(date(2025, 3, 3), date(2025, 5, 11)));
        assert_eq!(
            dates(&result),
            vec![date(2025, 3, 3), date(2025, 3, 10), date(2025, 3, 17)]
        );
    }

    #[test]
    fn exceptions_do_not_consume_count() {
        let rule = RecurrenceRule::daily().with_count(3);
        let event = class(
            "lab",
            date(2025, 3, 1),
            Some(Recurrence::new(rule).with_exception(date(2025, 3, 2), None)),
        );
        let result = expand(&event, range(date(2025, 3, 1), date(2025, 3, 31)));
        assert_eq!(
            dates(&result),
            vec![date(2025, 3, 1), date(2025, 3, 3), date(2025, 3, 4)]
        );
    }

    #[test]
    fn overrides_consume_count() {
        let rule = RecurrenceRule::weekly().with_count(2);
        let event = class(
            "tutoring",
            date(2025, 3, 3),
            Some(Recurrence::new(rule).with_override(date(2025, 3, 5), OverridePatch::default())),
        );
        let result = expand(&event, range(date(2025, 3, 1), date(2025, 3, 31)));
        assert_eq!(dates(&result), vec![date(2025, 3, 3), date(2025, 3, 5)]);
    }

    #[test]
    fn zero_count_emits_nothing() {
        let rule = RecurrenceRule::daily().with_count(0);
        let event = class("lab", date(2025, 3, 1), Some(Recurrence::new(rule)));
        assert!(expand(&event, range(date(2025, 3, 1), date(2025, 3, 31))).is_empty());
    }

    #[test]
    fn count_and_until_both_apply() {
        let rule = RecurrenceRule::daily()
            .with_count(10)
            .with_until(date(2025, 3, 3));
        let event = class("lab", date(2025, 3, 1), Some(Recurrence::new(rule)));
        assert_eq!(expand(&event, range(date(2025, 3, 1), date(2025, 3, 31))).len(), 3);
    }

    /// The cap restarts for every call: a later window gets its own three
    /// occurrences even though the series already produced three.
    #[test]
    fn count_resets_per_call_when_paginating() {
        let later = expand(&weekly_three(), range(date(2025, 3, 24), date(2025, 5, 11)));
        assert_eq!(
            dates(&later),
            vec![date(2025, 3, 24), date(2025, 3, 31), date(2025, 4, 7)]
        );
    }

    #[test]
    fn prior_count_carries_across_pages() {
        let event = weekly_three();
        let first = expand_with_prior(&event, range(date(2025, 3, 3), date(2025, 3, 9)), 0);
        assert_eq!(dates(&first), vec![date(2025, 3, 3)]);

        let second = expand_with_prior(
            &event,
            range(date(2025, 3, 10), date(2025, 4, 30)),
            first.len() as u32,
        );
        assert_eq!(dates(&second), vec![date(2025, 3, 10), date(2025, 3, 17)]);

        let third = expand_with_prior(&event, range(date(2025, 5, 1), date(2025, 5, 31)), 3);
        assert!(third.is_empty());
    }
}

mod totality {
    use super::*;

    #[test]
    fn reversed_range_is_empty() {
        let recurring = class("lab", date(2025, 3, 1), Some(Recurrence::new(RecurrenceRule::daily())));
        let single = class("assembly", date(2025, 3, 7), None);
        let reversed = range(date(2025, 3, 31), date(2025, 3, 1));
        assert!(reversed.is_empty());
        assert!(expand(&recurring, reversed).is_empty());
        assert!(expand(&single, reversed).is_empty());
    }

    #[test]
    fn idempotent() {
        let rule = RecurrenceRule::weekly()
            .on([WeekdayToken::Tu, WeekdayToken::Th])
            .with_count(5);
        let event = class(
            "chem",
            date(2025, 3, 4),
            Some(
                Recurrence::new(rule)
                    .with_exception(date(2025, 3, 6), None)
                    .with_override(date(2025, 3, 8), OverridePatch::default()),
            ),
        );
        let window = range(date(2025, 3, 1), date(2025, 4, 30));
        assert_eq!(expand(&event, window), expand(&event, window));
    }

    #[test]
    fn timezone_is_informational() {
        let plain = class("lab", date(2025, 3, 1), Some(Recurrence::new(RecurrenceRule::daily())));
        let zoned = class(
            "lab",
            date(2025, 3, 1),
            Some(Recurrence::new(
                RecurrenceRule::daily().with_timezone("Asia/Colombo"),
            )),
        );
        let window = range(date(2025, 3, 1), date(2025, 3, 10));
        assert_eq!(expand(&plain, window), expand(&zoned, window));
    }

    #[test]
    fn date_range_from_datetimes_ignores_time() {
        let window = DateRange::from_datetimes(at(2025, 3, 1, 23, 59), at(2025, 3, 2, 0, 1));
        assert_eq!(window, range(date(2025, 3, 1), date(2025, 3, 2)));
        assert!(window.contains(date(2025, 3, 2)));
    }

    #[test]
    fn far_future_range_does_not_panic() {
        let rule = RecurrenceRule::daily().with_count(2);
        let event = class("lab", date(2025, 3, 1), Some(Recurrence::new(rule)));
        let result = expand(&event, range(date(2025, 3, 1), NaiveDate::MAX));
        assert_eq!(result.len(), 2);
    }
}

mod views {
    use super::*;

    fn schedule() -> Vec<Event> {
        vec![
            class(
                "algebra",
                date(2025, 3, 3),
                Some(Recurrence::new(
                    RecurrenceRule::weekly().on([WeekdayToken::Mo, WeekdayToken::We]),
                )),
            ),
            class("assembly", date(2025, 3, 7), None),
            class(
                "sunday-club",
                date(2025, 3, 2),
                Some(Recurrence::new(RecurrenceRule::weekly())),
            ),
        ]
    }

    #[test]
    fn week_range_monday_start() {
        assert_eq!(
            week_range(date(2025, 3, 5), WeekStart::Monday),
            range(date(2025, 3, 3), date(2025, 3, 9))
        );
        // Sunday belongs to the week that began the previous Monday
        assert_eq!(
            week_range(date(2025, 3, 9), WeekStart::Monday),
            range(date(2025, 3, 3), date(2025, 3, 9))
        );
    }

    #[test]
    fn week_range_sunday_start() {
        assert_eq!(
            week_range(date(2025, 3, 5), WeekStart::Sunday),
            range(date(2025, 3, 2), date(2025, 3, 8))
        );
    }

    #[test]
    fn week_view_flattens_in_event_order() {
        let result = week_view(&schedule(), date(2025, 3, 9));
        let ids: Vec<_> = result.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "algebra__2025-03-03",
                "algebra__2025-03-05",
                "assembly",
                "sunday-club__2025-03-09",
            ]
        );
    }

    #[test]
    fn sunday_week_view() {
        let result = week_view_starting(&schedule(), date(2025, 3, 5), WeekStart::Sunday);
        let ids: Vec<_> = result.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "algebra__2025-03-03",
                "algebra__2025-03-05",
                "assembly",
                "sunday-club__2025-03-02",
            ]
        );
    }

    #[test]
    fn month_range_covers_leap_february() {
        assert_eq!(
            month_range(date(2024, 2, 10)),
            range(date(2024, 2, 1), date(2024, 2, 29))
        );
    }

    #[test]
    fn month_view_counts() {
        let result = month_view(&schedule(), date(2025, 3, 20));
        // Mondays 3,10,17,24,31 + Wednesdays 5,12,19,26, assembly, Sundays 2,9,16,23,30
        assert_eq!(result.len(), 9 + 1 + 5);
        assert!(result.iter().all(|o| o.date().month0() == 2));
    }

    #[test]
    fn month_window_crosses_years() {
        assert_eq!(
            month_window_range(date(2025, 1, 10), 2, 1),
            range(date(2024, 11, 1), date(2025, 2, 28))
        );
        assert_eq!(
            month_window_range(date(2025, 3, 15), 0, 0),
            month_range(date(2025, 3, 15))
        );
    }

    #[test]
    fn month_window_view_prefetches_neighbours() {
        let result = month_window_view(&schedule(), date(2025, 3, 15), 1, 1);
        let first = result.iter().map(Occurrence::date).min().unwrap();
        let last = result.iter().map(Occurrence::date).max().unwrap();
        // Series anchor in March, so nothing in February
        assert_eq!(first, date(2025, 3, 2));
        assert_eq!(last, date(2025, 4, 30));
    }

    #[test]
    fn expand_all_matches_per_event_expansion() {
        let events = schedule();
        let window = range(date(2025, 3, 1), date(2025, 3, 31));
        let combined = expand_all(&events, window);
        let separate: Vec<Occurrence> = events.iter().flat_map(|e| expand(e, window)).collect();
        assert_eq!(combined, separate);
    }
}
