//! Week, month and multi-month views over a list of events.

use chrono::NaiveDate;

use crate::calendar::{add_days, add_months, first_of_month, last_of_month, week_start_of};
use crate::expander::expand_all;
use crate::types::{DateRange, Event, Occurrence, WeekStart};

/// Seven-day range containing `date`.
pub fn week_range(date: NaiveDate, week_start: WeekStart) -> DateRange {
    let start = week_start_of(date, week_start);
    let end = add_days(start, 6).unwrap_or(NaiveDate::MAX);
    DateRange::new(start, end)
}

/// First to last day of `date`'s month.
pub fn month_range(date: NaiveDate) -> DateRange {
    DateRange::new(first_of_month(date), last_of_month(date))
}

/// From the first day `months_before` months earlier to the last day
/// `months_after` months later, relative to `date`'s month.
pub fn month_window_range(date: NaiveDate, months_before: u32, months_after: u32) -> DateRange {
    let anchor = first_of_month(date);
    let before = i32::try_from(months_before).unwrap_or(i32::MAX);
    let after = i32::try_from(months_after).unwrap_or(i32::MAX);

    let start = add_months(anchor, -before).unwrap_or(NaiveDate::MIN);
    let end = add_months(anchor, after)
        .map(last_of_month)
        .unwrap_or(NaiveDate::MAX);
    DateRange::new(start, end)
}

/// Occurrences in the ISO (Monday-start) week containing `date`.
pub fn week_view(events: &[Event], date: NaiveDate) -> Vec<Occurrence> {
    week_view_starting(events, date, WeekStart::Monday)
}

pub fn week_view_starting(
    events: &[Event],
    date: NaiveDate,
    week_start: WeekStart,
) -> Vec<Occurrence> {
    expand_all(events, week_range(date, week_start))
}

pub fn month_view(events: &[Event], date: NaiveDate) -> Vec<Occurrence> {
    expand_all(events, month_range(date))
}

/// Occurrences across a window of months around `date`, used to prefetch
/// adjacent months.
pub fn month_window_view(
    events: &[Event],
    date: NaiveDate,
    months_before: u32,
    months_after: u32,
) -> Vec<Occurrence> {
    expand_all(events, month_window_range(date, months_before, months_after))
}
