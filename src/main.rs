//! recurcal CLI application.
//!
//! # Usage
//! ```ignore
//! recurcal expand -e events.toml --from 2025-03-01 --to 2025-03-31
//! recurcal week -e events.toml          // Current week
//! recurcal month -e events.toml -B 1    // Previous and current month
//! recurcal academic -r us_ny            // Current academic year
//! ```

use recurcal::academic::PolicyTable;
use recurcal::args::{Args, Command};
use recurcal::config::{EventsFile, PolicyFile};
use recurcal::error::RecurResult;
use recurcal::expander::expand_all;
use recurcal::formatter::{print_academic_summary, print_agenda};
use recurcal::query::{month_window_view, week_view_starting};
use recurcal::types::{DateRange, OutputContext};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("recurcal: {}", e);
        std::process::exit(1);
    }
}

fn load_policies(path: Option<&std::path::Path>) -> RecurResult<PolicyTable> {
    match path {
        Some(path) => Ok(PolicyFile::load(path)?.into_table()),
        None => Ok(PolicyTable::builtin()),
    }
}

fn run(args: &Args) -> RecurResult<()> {
    let ctx = OutputContext::new(args);

    match &args.command {
        Command::Expand { events, from, to } => {
            let file = EventsFile::load(events)?;
            print_agenda(&ctx, &expand_all(&file.events, DateRange::new(*from, *to)));
        }
        Command::Week { events, date, .. } => {
            let file = EventsFile::load(events)?;
            let date = date.unwrap_or(ctx.today);
            let occurrences = week_view_starting(&file.events, date, args.command.week_start());
            print_agenda(&ctx, &occurrences);
        }
        Command::Month {
            events,
            date,
            before,
            after,
        } => {
            let file = EventsFile::load(events)?;
            let date = date.unwrap_or(ctx.today);
            print_agenda(
                &ctx,
                &month_window_view(&file.events, date, *before, *after),
            );
        }
        Command::Academic {
            region,
            date,
            policies,
            birth_date,
        } => {
            let table = load_policies(policies.as_deref())?;
            let policy = table.require(region)?;
            print_academic_summary(&ctx, policy, date.unwrap_or(ctx.today), *birth_date);
        }
        Command::Regions { policies } => {
            let table = load_policies(policies.as_deref())?;
            for region in table.regions() {
                println!("{}", region);
            }
        }
    }

    Ok(())
}
