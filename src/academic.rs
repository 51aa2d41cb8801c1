//! Academic-year boundaries and rollover windows per regional policy.
//!
//! Two systems are supported. A policy whose year starts on January 1 is a
//! calendar-year system and its key repeats the year (`2026-2026`). Any other
//! start date gives a spanning system keyed by the two calendar years the
//! academic year touches (`2025-2026`).

use std::borrow::Cow;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calendar::{days_between, days_in_month};
use crate::error::{RecurError, RecurResult};

/// A month and day without a year. Orders chronologically within a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawMonthDay")]
pub struct MonthDay {
    pub month: u32,
    pub day: u32,
}

#[derive(Deserialize)]
struct RawMonthDay {
    month: u32,
    day: u32,
}

impl TryFrom<RawMonthDay> for MonthDay {
    type Error = RecurError;

    fn try_from(raw: RawMonthDay) -> Result<Self, Self::Error> {
        MonthDay::try_new(raw.month, raw.day)
    }
}

impl MonthDay {
    pub const NEW_YEAR: MonthDay = MonthDay::new(1, 1);

    /// Unchecked constructor for static tables.
    pub const fn new(month: u32, day: u32) -> Self {
        MonthDay { month, day }
    }

    /// Validate against the longest possible month (Feb 29 is accepted).
    pub fn try_new(month: u32, day: u32) -> RecurResult<Self> {
        if !(1..=12).contains(&month) || day == 0 || day > days_in_month(2000, month) {
            return Err(RecurError::InvalidMonthDay { month, day });
        }
        Ok(MonthDay { month, day })
    }

    pub fn of(date: NaiveDate) -> Self {
        MonthDay {
            month: date.month(),
            day: date.day(),
        }
    }

    /// Resolve in `year`, clamping the day to the month's length
    /// (Feb 29 becomes Feb 28 outside leap years).
    pub fn in_year(self, year: i32) -> NaiveDate {
        let month = self.month.clamp(1, 12);
        let day = self.day.clamp(1, days_in_month(year, month));
        NaiveDate::from_ymd_opt(year, month, day).unwrap_or(if year < 0 {
            NaiveDate::MIN
        } else {
            NaiveDate::MAX
        })
    }
}

impl fmt::Display for MonthDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}

/// Rollover thresholds around the year boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolloverWindow {
    /// Days before year end at which next year starts being proposed.
    pub propose_before_end_days: u32,
    /// Days after year start during which late confirmation is allowed.
    pub allow_after_start_days: u32,
}

/// Age cutoff used to suggest a grade for a birth date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeCutoff {
    /// Age is measured on this day of the academic year's start year.
    pub cutoff: MonthDay,
    /// Age at which a child enters the first (index 0) grade.
    pub entry_age: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcademicYearPolicy {
    pub region: Cow<'static, str>,
    pub year_start: MonthDay,
    pub year_end: MonthDay,
    pub rollover: RolloverWindow,
    #[serde(default)]
    pub grade_suggestion: Option<GradeCutoff>,
}

impl AcademicYearPolicy {
    /// True when the academic year coincides with the calendar year.
    pub fn is_calendar_year(&self) -> bool {
        self.year_start == MonthDay::NEW_YEAR
    }
}

const fn policy(
    region: &'static str,
    year_start: MonthDay,
    year_end: MonthDay,
    propose_before_end_days: u32,
    allow_after_start_days: u32,
    grade_suggestion: Option<GradeCutoff>,
) -> AcademicYearPolicy {
    AcademicYearPolicy {
        region: Cow::Borrowed(region),
        year_start,
        year_end,
        rollover: RolloverWindow {
            propose_before_end_days,
            allow_after_start_days,
        },
        grade_suggestion,
    }
}

const fn cutoff(month: u32, day: u32, entry_age: u32) -> Option<GradeCutoff> {
    Some(GradeCutoff {
        cutoff: MonthDay::new(month, day),
        entry_age,
    })
}

/// Builtin regional policies.
pub static POLICIES: [AcademicYearPolicy; 8] = [
    policy("us_ny", MonthDay::new(9, 1), MonthDay::new(6, 30), 60, 30, cutoff(12, 31, 5)),
    policy("us_ca", MonthDay::new(8, 15), MonthDay::new(6, 15), 60, 30, cutoff(9, 1, 5)),
    policy("uk_england", MonthDay::new(9, 1), MonthDay::new(8, 31), 60, 30, cutoff(8, 31, 4)),
    policy("india", MonthDay::new(4, 1), MonthDay::new(3, 31), 45, 30, cutoff(3, 31, 6)),
    policy("japan", MonthDay::new(4, 1), MonthDay::new(3, 31), 45, 21, cutoff(4, 1, 6)),
    policy("sri_lanka", MonthDay::new(1, 1), MonthDay::new(12, 31), 60, 30, cutoff(1, 31, 5)),
    policy("australia_nsw", MonthDay::new(1, 1), MonthDay::new(12, 31), 60, 30, cutoff(7, 31, 5)),
    policy("singapore", MonthDay::new(1, 1), MonthDay::new(12, 31), 45, 14, None),
];

pub fn builtin_policy(region: &str) -> Option<&'static AcademicYearPolicy> {
    POLICIES.iter().find(|policy| policy.region == region)
}

/// Builtin policies with per-tenant replacements layered on top.
#[derive(Debug, Clone, Default)]
pub struct PolicyTable {
    overrides: HashMap<String, AcademicYearPolicy>,
}

impl PolicyTable {
    pub fn builtin() -> Self {
        Self::default()
    }

    /// Policies given here replace builtin ones with the same region id.
    pub fn with_overrides(policies: impl IntoIterator<Item = AcademicYearPolicy>) -> Self {
        PolicyTable {
            overrides: policies
                .into_iter()
                .map(|policy| (policy.region.to_string(), policy))
                .collect(),
        }
    }

    pub fn get(&self, region: &str) -> Option<&AcademicYearPolicy> {
        if let Some(policy) = self.overrides.get(region) {
            debug!(region, "using policy override");
            return Some(policy);
        }
        builtin_policy(region)
    }

    pub fn require(&self, region: &str) -> RecurResult<&AcademicYearPolicy> {
        self.get(region)
            .ok_or_else(|| RecurError::UnknownRegion(region.to_string()))
    }

    /// All known region ids, sorted.
    pub fn regions(&self) -> Vec<&str> {
        let regions: BTreeSet<&str> = POLICIES
            .iter()
            .map(|policy| &*policy.region)
            .chain(self.overrides.keys().map(String::as_str))
            .collect();
        regions.into_iter().collect()
    }
}

/// Academic year identified by the calendar years it starts and ends in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AcademicYearKey {
    pub start_year: i32,
    pub end_year: i32,
}

impl AcademicYearKey {
    /// Saturates at `i32::MAX`; parsed keys stay far below it.
    pub fn next(self) -> Self {
        AcademicYearKey {
            start_year: self.start_year.saturating_add(1),
            end_year: self.end_year.saturating_add(1),
        }
    }
}

impl fmt::Display for AcademicYearKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start_year, self.end_year)
    }
}

impl FromStr for AcademicYearKey {
    type Err = RecurError;

    /// Parse `YYYY-YYYY`. The end year must equal the start year or follow it,
    /// and both must lie within the supported date range.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RecurError::InvalidAcademicYearKey(s.to_string());
        let (start, end) = s.trim().split_once('-').ok_or_else(invalid)?;
        let start_year: i32 = start.parse().map_err(|_| invalid())?;
        let end_year: i32 = end.parse().map_err(|_| invalid())?;
        let supported = NaiveDate::MIN.year()..=NaiveDate::MAX.year();
        if !supported.contains(&start_year) || !supported.contains(&end_year) {
            return Err(invalid());
        }
        if !(end_year == start_year || start_year.checked_add(1) == Some(end_year)) {
            return Err(invalid());
        }
        Ok(AcademicYearKey {
            start_year,
            end_year,
        })
    }
}

/// Concrete bounds of one academic year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcademicYearBounds {
    pub key: AcademicYearKey,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

fn start_year_for(date: NaiveDate, policy: &AcademicYearPolicy) -> i32 {
    if policy.is_calendar_year() || MonthDay::of(date) >= policy.year_start {
        date.year()
    } else {
        date.year() - 1
    }
}

pub fn academic_year_for_date(date: NaiveDate, policy: &AcademicYearPolicy) -> AcademicYearKey {
    let start_year = start_year_for(date, policy);
    let end_year = if policy.is_calendar_year() {
        start_year
    } else {
        start_year + 1
    };
    AcademicYearKey {
        start_year,
        end_year,
    }
}

/// Start and end dates of the academic year containing `now`.
pub fn academic_year_start_end_dates(
    now: NaiveDate,
    policy: &AcademicYearPolicy,
) -> AcademicYearBounds {
    let key = academic_year_for_date(now, policy);
    let end_calendar_year = if policy.year_end < policy.year_start {
        key.start_year + 1
    } else {
        key.start_year
    };

    AcademicYearBounds {
        key,
        start: policy.year_start.in_year(key.start_year),
        end: policy.year_end.in_year(end_calendar_year),
    }
}

/// True from `propose_before_end_days` before the year's end through the end
/// date itself. Never true after the year has ended.
pub fn is_in_rollover_proposal_window(now: NaiveDate, policy: &AcademicYearPolicy) -> bool {
    let bounds = academic_year_start_end_dates(now, policy);
    let days_until_end = days_between(now, bounds.end);
    (0..=i64::from(policy.rollover.propose_before_end_days)).contains(&days_until_end)
}

/// True from the year's start through `allow_after_start_days` after it.
pub fn is_in_late_confirmation_window(now: NaiveDate, policy: &AcademicYearPolicy) -> bool {
    let bounds = academic_year_start_end_dates(now, policy);
    let days_since_start = days_between(bounds.start, now);
    (0..=i64::from(policy.rollover.allow_after_start_days)).contains(&days_since_start)
}

/// Increment both halves of the key. Calendar-year keys advance too
/// (`2026-2026` becomes `2027-2027`).
pub fn next_academic_year(key: AcademicYearKey) -> AcademicYearKey {
    key.next()
}

/// Suggested grade index (0 = entry grade) for a child born on `birth_date`
/// in academic year `key`. `None` when the policy has no cutoff or the child
/// is below entry age.
pub fn suggest_grade(
    birth_date: NaiveDate,
    key: AcademicYearKey,
    policy: &AcademicYearPolicy,
) -> Option<u32> {
    let cutoff = policy.grade_suggestion?;
    let cutoff_date = cutoff.cutoff.in_year(key.start_year);
    let age = age_on(birth_date, cutoff_date)?;
    age.checked_sub(cutoff.entry_age)
}

/// Completed years of age on `on`, `None` if not yet born.
fn age_on(birth_date: NaiveDate, on: NaiveDate) -> Option<u32> {
    if birth_date > on {
        return None;
    }
    let mut years = on.year() - birth_date.year();
    if MonthDay::of(on) < MonthDay::of(birth_date) {
        years -= 1;
    }
    u32::try_from(years).ok()
}
