//! Error types for recurcal.
//!
//! The expansion engine and the academic-year calculator never fail; these
//! errors only come from the boundary (text parsing, input files, region lookup).

use thiserror::Error;

/// Errors that can occur while reading inputs for the calendar engine.
#[derive(Error, Debug)]
pub enum RecurError {
    #[error("Invalid date '{0}'. Expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid weekday token '{0}'. Expected one of SU, MO, TU, WE, TH, FR, SA")]
    InvalidWeekday(String),

    #[error("Invalid academic year key '{0}'. Expected YYYY-YYYY")]
    InvalidAcademicYearKey(String),

    #[error("Invalid month/day: {month}/{day}")]
    InvalidMonthDay { month: u32, day: u32 },

    #[error("No academic year policy for region '{0}'")]
    UnknownRegion(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Config(#[from] toml::de::Error),
}

/// Result type alias for recurcal operations.
pub type RecurResult<T> = Result<T, RecurError>;
