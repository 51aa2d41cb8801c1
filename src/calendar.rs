//! Calendar arithmetic on naive dates.
//!
//! All helpers are Gregorian and day-granular; time of day and time zones are
//! never consulted.

use chrono::{Datelike, Days, Months, NaiveDate, NaiveDateTime, NaiveTime};

use crate::types::{DATE_KEY_FORMAT, WeekStart, WeekdayToken};

/// Truncate a date-time to midnight of the same day.
pub fn start_of_day(dt: NaiveDateTime) -> NaiveDateTime {
    dt.date().and_time(NaiveTime::MIN)
}

/// Add (or subtract, for negative `days`) whole days. `None` on overflow.
pub fn add_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    if days >= 0 {
        date.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
    }
}

/// Whole days from `from` to `to` (negative when `to` is earlier).
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    to.signed_duration_since(from).num_days()
}

pub fn weekday_token(date: NaiveDate) -> WeekdayToken {
    WeekdayToken::from(date.weekday())
}

/// `YYYY-MM-DD` key for a date.
pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

/// Gregorian leap year: divisible by 4, except centuries unless divisible by 400.
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 30,
    }
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn last_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(days_in_month(date.year(), date.month()))
        .unwrap_or(date)
}

/// Shift by whole months, clamping the day to the target month's length.
pub fn add_months(date: NaiveDate, months: i32) -> Option<NaiveDate> {
    let shift = Months::new(months.unsigned_abs());
    if months >= 0 {
        date.checked_add_months(shift)
    } else {
        date.checked_sub_months(shift)
    }
}

/// First day of the week containing `date`.
///
/// With Monday-start weeks a Sunday belongs to the week that began the
/// previous Monday.
pub fn week_start_of(date: NaiveDate, week_start: WeekStart) -> NaiveDate {
    let offset = match week_start {
        WeekStart::Monday => date.weekday().num_days_from_monday(),
        WeekStart::Sunday => date.weekday().num_days_from_sunday(),
    };
    add_days(date, -i64::from(offset)).unwrap_or(date)
}

/// Iterate every day from `start` to `end` inclusive.
pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start
        .iter_days()
        .take_while(move |day| *day <= end)
}
