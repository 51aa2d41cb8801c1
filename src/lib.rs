//! Recurring occurrence expansion and academic-year calendar arithmetic.
//!
//! Features:
//! - Daily and weekly rules with intervals, weekday sets, `count` and `until`
//! - Exceptions that suppress generated days, overrides that always win
//! - Week, month and multi-month views over many events
//! - Academic-year keys, bounds and rollover windows per regional policy

pub mod academic;
pub mod args;
pub mod calendar;
pub mod config;
pub mod error;
pub mod expander;
pub mod formatter;
pub mod query;
pub mod types;
