//! Type definitions and constants for recurrence expansion.

use std::collections::BTreeSet;
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use chrono::{Locale, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::RecurError;

/// Two-letter weekday token as used in recurrence rules.
///
/// Ordinals follow the Sunday-first convention: `SU = 0` through `SA = 6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WeekdayToken {
    Su,
    Mo,
    Tu,
    We,
    Th,
    Fr,
    Sa,
}

impl WeekdayToken {
    pub const ALL: [WeekdayToken; 7] = [
        WeekdayToken::Su,
        WeekdayToken::Mo,
        WeekdayToken::Tu,
        WeekdayToken::We,
        WeekdayToken::Th,
        WeekdayToken::Fr,
        WeekdayToken::Sa,
    ];

    /// Map a Sunday-first ordinal (0..=6) to its token. Values wrap modulo 7.
    pub fn from_ordinal(ordinal: u32) -> Self {
        Self::ALL[(ordinal % 7) as usize]
    }

    /// Sunday-first ordinal of this token.
    pub fn ordinal(self) -> u32 {
        self as u32
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WeekdayToken::Su => "SU",
            WeekdayToken::Mo => "MO",
            WeekdayToken::Tu => "TU",
            WeekdayToken::We => "WE",
            WeekdayToken::Th => "TH",
            WeekdayToken::Fr => "FR",
            WeekdayToken::Sa => "SA",
        }
    }

    pub fn to_weekday(self) -> Weekday {
        match self {
            WeekdayToken::Su => Weekday::Sun,
            WeekdayToken::Mo => Weekday::Mon,
            WeekdayToken::Tu => Weekday::Tue,
            WeekdayToken::We => Weekday::Wed,
            WeekdayToken::Th => Weekday::Thu,
            WeekdayToken::Fr => Weekday::Fri,
            WeekdayToken::Sa => Weekday::Sat,
        }
    }
}

impl From<Weekday> for WeekdayToken {
    fn from(weekday: Weekday) -> Self {
        Self::from_ordinal(weekday.num_days_from_sunday())
    }
}

impl fmt::Display for WeekdayToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeekdayToken {
    type Err = RecurError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        WeekdayToken::ALL
            .into_iter()
            .find(|token| token.as_str() == upper)
            .ok_or_else(|| RecurError::InvalidWeekday(s.to_string()))
    }
}

/// How often a rule repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    /// Any frequency this engine does not understand. Matches no day.
    #[serde(other)]
    Unknown,
}

fn default_interval() -> NonZeroU32 {
    NonZeroU32::MIN
}

/// Description of a repeating pattern anchored at an event's start date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    #[serde(default = "default_interval")]
    pub interval: NonZeroU32,
    /// Only used by weekly rules. Empty means the anchor's own weekday.
    #[serde(default)]
    pub by_weekday: BTreeSet<WeekdayToken>,
    /// Cap on emitted occurrences per expansion.
    #[serde(default)]
    pub count: Option<u32>,
    /// Inclusive last date of the series.
    #[serde(default)]
    pub until: Option<NaiveDate>,
    /// Informational only; dates are compared as naive calendar dates.
    #[serde(default)]
    pub timezone: Option<String>,
}

impl RecurrenceRule {
    pub fn new(frequency: Frequency) -> Self {
        RecurrenceRule {
            frequency,
            interval: default_interval(),
            by_weekday: BTreeSet::new(),
            count: None,
            until: None,
            timezone: None,
        }
    }

    pub fn daily() -> Self {
        Self::new(Frequency::Daily)
    }

    pub fn weekly() -> Self {
        Self::new(Frequency::Weekly)
    }

    /// Set the interval. Zero is clamped to 1.
    pub fn with_interval(mut self, interval: u32) -> Self {
        self.interval = NonZeroU32::new(interval).unwrap_or(NonZeroU32::MIN);
        self
    }

    pub fn on(mut self, weekdays: impl IntoIterator<Item = WeekdayToken>) -> Self {
        self.by_weekday = weekdays.into_iter().collect();
        self
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_until(mut self, until: NaiveDate) -> Self {
        self.until = Some(until);
        self
    }

    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }
}

/// A date on which a naturally generated occurrence is suppressed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceException {
    pub date: NaiveDate,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Replacement fields applied to an overridden occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverridePatch {
    #[serde(default)]
    pub start: Option<NaiveDateTime>,
    #[serde(default)]
    pub end: Option<NaiveDateTime>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Reschedules (or injects) the occurrence originally scheduled on `original_date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceOverride {
    pub original_date: NaiveDate,
    #[serde(default)]
    pub patch: OverridePatch,
    #[serde(default)]
    pub reason: Option<String>,
}

/// A rule together with its exceptions and overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recurrence {
    pub rule: RecurrenceRule,
    #[serde(default)]
    pub exceptions: Vec<RecurrenceException>,
    #[serde(default)]
    pub overrides: Vec<RecurrenceOverride>,
}

impl Recurrence {
    pub fn new(rule: RecurrenceRule) -> Self {
        Recurrence {
            rule,
            exceptions: Vec::new(),
            overrides: Vec::new(),
        }
    }

    pub fn with_exception(mut self, date: NaiveDate, reason: Option<&str>) -> Self {
        self.exceptions.push(RecurrenceException {
            date,
            reason: reason.map(str::to_string),
        });
        self
    }

    pub fn with_override(mut self, original_date: NaiveDate, patch: OverridePatch) -> Self {
        self.overrides.push(RecurrenceOverride {
            original_date,
            patch,
            reason: None,
        });
        self
    }
}

/// A base calendar event or class schedule entry.
///
/// The anchor date of a recurring series is `start.date()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub start: NaiveDateTime,
    #[serde(default)]
    pub end: Option<NaiveDateTime>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub recurrence: Option<Recurrence>,
}

impl Event {
    pub fn new(id: impl Into<String>, title: impl Into<String>, start: NaiveDateTime) -> Self {
        Event {
            id: id.into(),
            title: title.into(),
            start,
            end: None,
            location: None,
            description: None,
            recurrence: None,
        }
    }

    pub fn with_end(mut self, end: NaiveDateTime) -> Self {
        self.end = Some(end);
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_recurrence(mut self, recurrence: Recurrence) -> Self {
        self.recurrence = Some(recurrence);
        self
    }

    pub fn anchor_date(&self) -> NaiveDate {
        self.start.date()
    }
}

/// A materialized instance of an event on a single day.
///
/// Occurrences carry no recurrence data and are rebuilt on every query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Occurrence {
    /// `<base_event_id>__<YYYY-MM-DD>` for recurring events, the event id otherwise.
    pub id: String,
    pub base_event_id: String,
    /// The scheduled day this occurrence was generated for.
    pub original_date: NaiveDate,
    pub start: NaiveDateTime,
    pub end: Option<NaiveDateTime>,
    pub title: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub overridden: bool,
    pub override_reason: Option<String>,
}

impl Occurrence {
    pub fn date(&self) -> NaiveDate {
        self.start.date()
    }
}

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    /// Build a range from date-times, dropping the time of day.
    pub fn from_datetimes(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        DateRange {
            start: start.date(),
            end: end.date(),
        }
    }

    /// True when `start > end`; such ranges contain no days.
    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// First day of a displayed week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeekStart {
    /// ISO 8601 weeks.
    #[default]
    Monday,
    Sunday,
}

/// Rendering options for command-line output.
#[derive(Clone, Debug)]
pub struct OutputContext {
    /// Whether to use ANSI color codes in output.
    pub color: bool,
    /// Locale for weekday names.
    pub locale: Locale,
    /// Today's date for highlighting.
    pub today: NaiveDate,
}

// Date key format used for exceptions, overrides and occurrence ids
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";
pub const OCCURRENCE_ID_SEPARATOR: &str = "__";
pub const DAYS_PER_WEEK: i64 = 7;

// Upper bound for --before/--after month windows
pub const MAX_WINDOW_MONTHS: i64 = 120;

// Agenda column widths
pub const TIME_COLUMN_WIDTH: usize = 13;
pub const TITLE_COLUMN_WIDTH: usize = 28;

// Color is enabled by default for better user experience
pub const COLOR_ENABLED_BY_DEFAULT: bool = true;

// ANSI color codes
pub const COLOR_RESET: &str = "\x1b[0m";
pub const COLOR_REVERSE: &str = "\x1b[7m";
pub const COLOR_RED: &str = "\x1b[91m";
pub const COLOR_TEAL: &str = "\x1b[96m";
pub const COLOR_SAND_YELLOW: &str = "\x1b[93m";
