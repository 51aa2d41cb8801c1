//! Command-line argument parsing using clap.

use std::io::IsTerminal;
use std::path::PathBuf;

use chrono::{Locale, NaiveDate};
use clap::{Parser, Subcommand, ValueHint};

use crate::error::{RecurError, RecurResult};
use crate::types::{
    COLOR_ENABLED_BY_DEFAULT, DATE_KEY_FORMAT, MAX_WINDOW_MONTHS, OutputContext, WeekStart,
};

#[derive(Parser, Debug)]
#[command(name = "recurcal")]
#[command(about = "Expands recurring events and computes academic years", long_about = None)]
#[command(version)]
#[command(after_help = HELP_MESSAGE)]
pub struct Args {
    /// Disable colorized output.
    #[arg(long = "no-color", global = true, help_heading = "Output options")]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List occurrences between two dates (inclusive).
    Expand {
        /// Events file (TOML).
        #[arg(short = 'e', long, value_name = "file", value_hint = ValueHint::FilePath)]
        events: PathBuf,

        /// First day of the range (YYYY-MM-DD).
        #[arg(long, value_name = "date", value_parser = parse_date)]
        from: NaiveDate,

        /// Last day of the range (YYYY-MM-DD).
        #[arg(long, value_name = "date", value_parser = parse_date)]
        to: NaiveDate,
    },

    /// List occurrences in the week containing a date.
    Week {
        #[arg(short = 'e', long, value_name = "file", value_hint = ValueHint::FilePath)]
        events: PathBuf,

        /// Reference date (default: today).
        #[arg(short = 'd', long, value_name = "date", value_parser = parse_date)]
        date: Option<NaiveDate>,

        /// Week starts on Sunday (default is Monday).
        #[arg(short = 's', long)]
        sunday: bool,
    },

    /// List occurrences in the month containing a date, optionally widened.
    Month {
        #[arg(short = 'e', long, value_name = "file", value_hint = ValueHint::FilePath)]
        events: PathBuf,

        /// Reference date (default: today).
        #[arg(short = 'd', long, value_name = "date", value_parser = parse_date)]
        date: Option<NaiveDate>,

        /// Number of months to include before the reference month.
        #[arg(
            short = 'B',
            long,
            default_value_t = 0,
            value_name = "num",
            value_parser = clap::value_parser!(u32).range(0..=MAX_WINDOW_MONTHS)
        )]
        before: u32,

        /// Number of months to include after the reference month.
        #[arg(
            short = 'A',
            long,
            default_value_t = 0,
            value_name = "num",
            value_parser = clap::value_parser!(u32).range(0..=MAX_WINDOW_MONTHS)
        )]
        after: u32,
    },

    /// Show the academic year, its bounds and rollover state for a region.
    Academic {
        /// Region id (see `recurcal regions`).
        #[arg(short = 'r', long, value_name = "id")]
        region: String,

        /// Reference date (default: today).
        #[arg(short = 'd', long, value_name = "date", value_parser = parse_date)]
        date: Option<NaiveDate>,

        /// Policy overrides file (TOML).
        #[arg(short = 'p', long, value_name = "file", value_hint = ValueHint::FilePath)]
        policies: Option<PathBuf>,

        /// Birth date for a grade suggestion (YYYY-MM-DD).
        #[arg(long = "birth-date", value_name = "date", value_parser = parse_date)]
        birth_date: Option<NaiveDate>,
    },

    /// List known region ids.
    Regions {
        /// Policy overrides file (TOML).
        #[arg(short = 'p', long, value_name = "file", value_hint = ValueHint::FilePath)]
        policies: Option<PathBuf>,
    },
}

impl Command {
    pub fn week_start(&self) -> WeekStart {
        match self {
            Command::Week { sunday: true, .. } => WeekStart::Sunday,
            _ => WeekStart::Monday,
        }
    }
}

/// Help message displayed with --help.
const HELP_MESSAGE: &str = "Examples:
  recurcal expand -e events.toml --from 2025-03-01 --to 2025-03-31
  recurcal week -e events.toml -d 2025-03-05
  recurcal week -e events.toml --sunday
  recurcal month -e events.toml -B 1 -A 1
  recurcal academic -r us_ny -d 2025-05-01
  recurcal academic -r acme -p policies.toml --birth-date 2019-10-02
  recurcal regions

Set RUST_LOG=debug to trace expansion.";

impl Args {
    pub fn parse() -> Self {
        Parser::parse()
    }
}

impl OutputContext {
    pub fn new(args: &Args) -> Self {
        OutputContext {
            color: !args.no_color && COLOR_ENABLED_BY_DEFAULT && std::io::stdout().is_terminal(),
            locale: get_system_locale(),
            today: get_today_date(),
        }
    }
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> RecurResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_KEY_FORMAT)
        .map_err(|_| RecurError::InvalidDate(s.to_string()))
}

/// Get today's date, respecting RECURCAL_TEST_TIME environment variable for testing.
pub fn get_today_date() -> NaiveDate {
    if let Ok(test_time) = std::env::var("RECURCAL_TEST_TIME")
        && let Ok(date) = parse_date(&test_time)
    {
        return date;
    }
    chrono::Local::now().date_naive()
}

/// Get system locale from environment (LC_ALL > LC_TIME > LANG > en_US).
pub fn get_system_locale() -> Locale {
    std::env::var("LC_ALL")
        .or_else(|_| std::env::var("LC_TIME"))
        .or_else(|_| std::env::var("LANG"))
        .unwrap_or_else(|_| "en_US.UTF-8".to_string())
        .split('.')
        .next()
        .unwrap_or("en_US")
        .split('@')
        .next()
        .unwrap_or("en_US")
        .parse()
        .unwrap_or(Locale::en_US)
}
