//! Occurrence expansion for recurring events.
//!
//! Walks every day of the query range, matches it against the event's rule and
//! resolves exceptions and overrides for that day. Overrides always win: a day
//! with an override produces an occurrence even when it is also listed as an
//! exception, or when the rule would not generate it at all.

use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use tracing::{debug, trace};

use crate::calendar::{date_key, days_between, days_inclusive, weekday_token};
use crate::types::{
    DAYS_PER_WEEK, DateRange, Event, Frequency, OCCURRENCE_ID_SEPARATOR, Occurrence, Recurrence,
    RecurrenceOverride, RecurrenceRule, WeekdayToken,
};

/// Outcome of resolving a single candidate day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// The rule does not match and there is no override.
    NoMatch,
    /// The rule matches but the day is an exception.
    Suppressed,
    /// The rule matches; emit the base occurrence.
    Generated,
    /// An override exists; emit the patched occurrence.
    Overridden(&'a RecurrenceOverride),
}

impl Resolution<'_> {
    /// Whether this resolution emits an occurrence (and consumes `count`).
    pub fn emits(&self) -> bool {
        matches!(self, Resolution::Generated | Resolution::Overridden(_))
    }
}

/// Per-day lookup of exceptions and overrides for one recurrence.
///
/// When several overrides share an original date, the last one listed wins.
#[derive(Debug)]
pub struct ExceptionOverrideResolver<'a> {
    exceptions: HashSet<NaiveDate>,
    overrides: HashMap<NaiveDate, &'a RecurrenceOverride>,
}

impl<'a> ExceptionOverrideResolver<'a> {
    pub fn new(recurrence: &'a Recurrence) -> Self {
        ExceptionOverrideResolver {
            exceptions: recurrence.exceptions.iter().map(|ex| ex.date).collect(),
            overrides: recurrence
                .overrides
                .iter()
                .map(|ovr| (ovr.original_date, ovr))
                .collect(),
        }
    }

    pub fn resolve(&self, day: NaiveDate, matches: bool) -> Resolution<'a> {
        if let Some(ovr) = self.overrides.get(&day) {
            return Resolution::Overridden(ovr);
        }
        if !matches {
            return Resolution::NoMatch;
        }
        if self.exceptions.contains(&day) {
            return Resolution::Suppressed;
        }
        Resolution::Generated
    }
}

/// Check whether `rule`, anchored at `anchor`, naturally generates `day`.
///
/// Days before the anchor never match. `until` is not consulted here.
pub fn rule_matches(rule: &RecurrenceRule, anchor: NaiveDate, day: NaiveDate) -> bool {
    let diff = days_between(anchor, day);
    if diff < 0 {
        return false;
    }
    let interval = i64::from(rule.interval.get());

    match rule.frequency {
        Frequency::Daily => diff % interval == 0,
        Frequency::Weekly => {
            (diff / DAYS_PER_WEEK) % interval == 0
                && weekday_allowed(rule, anchor, weekday_token(day))
        }
        Frequency::Unknown => false,
    }
}

fn weekday_allowed(rule: &RecurrenceRule, anchor: NaiveDate, token: WeekdayToken) -> bool {
    if rule.by_weekday.is_empty() {
        weekday_token(anchor) == token
    } else {
        rule.by_weekday.contains(&token)
    }
}

/// Expand `event` into the occurrences that fall within `range`.
///
/// The `count` cap is applied to occurrences emitted by this call only; see
/// [`expand_with_prior`] for paginated callers.
pub fn expand(event: &Event, range: DateRange) -> Vec<Occurrence> {
    expand_with_prior(event, range, 0)
}

/// Expand `event` over `range`, treating `prior` occurrences as already
/// emitted by earlier calls when applying the rule's `count`.
pub fn expand_with_prior(event: &Event, range: DateRange, prior: u32) -> Vec<Occurrence> {
    if range.is_empty() {
        return Vec::new();
    }

    let Some(recurrence) = &event.recurrence else {
        return if range.contains(event.anchor_date()) {
            vec![single_occurrence(event)]
        } else {
            Vec::new()
        };
    };

    let rule = &recurrence.rule;
    let anchor = event.anchor_date();
    let resolver = ExceptionOverrideResolver::new(recurrence);

    let first = range.start.max(anchor);
    let last = match rule.until {
        Some(until) => range.end.min(until),
        None => range.end,
    };

    let mut occurrences = Vec::new();
    let mut emitted = prior;
    let exhausted = |emitted: u32| rule.count.is_some_and(|limit| emitted >= limit);

    if exhausted(emitted) {
        debug!(event = %event.id, prior, "count already exhausted");
        return occurrences;
    }

    for day in days_inclusive(first, last) {
        let matches = rule_matches(rule, anchor, day);
        let resolution = resolver.resolve(day, matches);
        match resolution {
            Resolution::NoMatch => continue,
            Resolution::Suppressed => {
                trace!(event = %event.id, day = %day, "suppressed by exception");
                continue;
            }
            Resolution::Generated => occurrences.push(generated_occurrence(event, day)),
            Resolution::Overridden(ovr) => {
                trace!(event = %event.id, day = %day, matches, "override applied");
                occurrences.push(overridden_occurrence(event, day, ovr));
            }
        }

        emitted += 1;
        if exhausted(emitted) {
            break;
        }
    }

    debug!(
        event = %event.id,
        start = %range.start,
        end = %range.end,
        emitted = occurrences.len(),
        "expanded recurring event"
    );
    occurrences
}

/// Expand every event over `range`, concatenated in input order.
pub fn expand_all(events: &[Event], range: DateRange) -> Vec<Occurrence> {
    events
        .iter()
        .flat_map(|event| expand(event, range))
        .collect()
}

fn occurrence_id(event_id: &str, day: NaiveDate) -> String {
    format!("{event_id}{OCCURRENCE_ID_SEPARATOR}{}", date_key(day))
}

fn base_duration(event: &Event) -> Option<TimeDelta> {
    event.end.map(|end| end - event.start)
}

fn shifted_end(event: &Event, start: NaiveDateTime) -> Option<NaiveDateTime> {
    base_duration(event).and_then(|duration| start.checked_add_signed(duration))
}

fn single_occurrence(event: &Event) -> Occurrence {
    Occurrence {
        id: event.id.clone(),
        base_event_id: event.id.clone(),
        original_date: event.anchor_date(),
        start: event.start,
        end: event.end,
        title: event.title.clone(),
        location: event.location.clone(),
        description: event.description.clone(),
        overridden: false,
        override_reason: None,
    }
}

fn generated_occurrence(event: &Event, day: NaiveDate) -> Occurrence {
    let start = day.and_time(event.start.time());
    Occurrence {
        id: occurrence_id(&event.id, day),
        base_event_id: event.id.clone(),
        original_date: day,
        start,
        end: shifted_end(event, start),
        title: event.title.clone(),
        location: event.location.clone(),
        description: event.description.clone(),
        overridden: false,
        override_reason: None,
    }
}

fn overridden_occurrence(event: &Event, day: NaiveDate, ovr: &RecurrenceOverride) -> Occurrence {
    let patch = &ovr.patch;
    let start = patch
        .start
        .unwrap_or_else(|| day.and_time(event.start.time()));
    let end = patch.end.or_else(|| shifted_end(event, start));

    Occurrence {
        id: occurrence_id(&event.id, day),
        base_event_id: event.id.clone(),
        original_date: day,
        start,
        end,
        title: patch.title.clone().unwrap_or_else(|| event.title.clone()),
        location: patch.location.clone().or_else(|| event.location.clone()),
        description: patch
            .description
            .clone()
            .or_else(|| event.description.clone()),
        overridden: true,
        override_reason: ovr.reason.clone(),
    }
}
