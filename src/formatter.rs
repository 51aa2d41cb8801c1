//! Plain-text rendering of occurrences and academic-year summaries.

use chrono::NaiveDate;
use unicode_width::UnicodeWidthStr;

use crate::academic::{
    AcademicYearPolicy, academic_year_start_end_dates, is_in_late_confirmation_window,
    is_in_rollover_proposal_window, next_academic_year, suggest_grade,
};
use crate::calendar::date_key;
use crate::types::{
    COLOR_RED, COLOR_RESET, COLOR_REVERSE, COLOR_SAND_YELLOW, COLOR_TEAL, Occurrence,
    OutputContext, TIME_COLUMN_WIDTH, TITLE_COLUMN_WIDTH,
};

/// Pad text on the right to a display width, accounting for Unicode character widths.
fn pad_right(text: &str, width: usize) -> String {
    let text_width = text.width();
    if text_width >= width {
        return text.to_string();
    }
    format!("{}{}", text, " ".repeat(width - text_width))
}

fn paint(ctx: &OutputContext, color: &str, text: &str) -> String {
    if ctx.color {
        format!("{}{}{}", color, text, COLOR_RESET)
    } else {
        text.to_string()
    }
}

/// Format a day heading such as `Wed 2025-03-05`. Today is shown reversed.
pub fn format_day_header(ctx: &OutputContext, date: NaiveDate) -> String {
    let weekday = date.format_localized("%a", ctx.locale).to_string();
    let header = format!("{} {}", weekday, date_key(date));
    if date == ctx.today {
        paint(ctx, COLOR_REVERSE, &header)
    } else {
        header
    }
}

fn format_time_span(occurrence: &Occurrence) -> String {
    let start = occurrence.start.format("%H:%M");
    match occurrence.end {
        Some(end) => format!("{}-{}", start, end.format("%H:%M")),
        None => start.to_string(),
    }
}

/// Format one agenda line. Overridden occurrences are marked with `*`.
pub fn format_occurrence_line(ctx: &OutputContext, occurrence: &Occurrence) -> String {
    let marker = if occurrence.overridden { "*" } else { " " };
    let mut line = format!(
        "  {}{}{}",
        marker,
        pad_right(&format_time_span(occurrence), TIME_COLUMN_WIDTH),
        pad_right(&occurrence.title, TITLE_COLUMN_WIDTH),
    );
    line.push_str(&format!(" [{}]", occurrence.id));
    if let Some(location) = &occurrence.location {
        line.push_str(&format!(" @ {}", location));
    }
    if let Some(reason) = &occurrence.override_reason {
        line.push_str(&format!(" ({})", reason));
    }

    if occurrence.overridden {
        paint(ctx, COLOR_TEAL, &line)
    } else {
        line
    }
}

/// Format occurrences as a day-grouped agenda, earliest first.
pub fn format_agenda(ctx: &OutputContext, occurrences: &[Occurrence]) -> Vec<String> {
    if occurrences.is_empty() {
        return vec!["No occurrences.".to_string()];
    }

    let mut sorted: Vec<&Occurrence> = occurrences.iter().collect();
    sorted.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));

    let mut lines = Vec::new();
    let mut current_day = None;
    for occurrence in sorted {
        let day = occurrence.date();
        if current_day != Some(day) {
            if current_day.is_some() {
                lines.push(String::new());
            }
            lines.push(format_day_header(ctx, day));
            current_day = Some(day);
        }
        lines.push(format_occurrence_line(ctx, occurrence));
    }
    lines
}

pub fn print_agenda(ctx: &OutputContext, occurrences: &[Occurrence]) {
    for line in format_agenda(ctx, occurrences) {
        println!("{}", line);
    }
}

fn yes_no(ctx: &OutputContext, value: bool) -> String {
    if value {
        paint(ctx, COLOR_SAND_YELLOW, "yes")
    } else {
        "no".to_string()
    }
}

/// Format the academic year containing `date` under `policy`.
pub fn format_academic_summary(
    ctx: &OutputContext,
    policy: &AcademicYearPolicy,
    date: NaiveDate,
    birth_date: Option<NaiveDate>,
) -> Vec<String> {
    let bounds = academic_year_start_end_dates(date, policy);
    let mut lines = vec![
        format!("Region:            {}", policy.region),
        format!("Date:              {}", date_key(date)),
        format!("Academic year:     {}", bounds.key),
        format!("Starts:            {}", date_key(bounds.start)),
        format!("Ends:              {}", date_key(bounds.end)),
        format!("Next year:         {}", next_academic_year(bounds.key)),
        format!(
            "Propose rollover:  {}",
            yes_no(ctx, is_in_rollover_proposal_window(date, policy))
        ),
        format!(
            "Late confirmation: {}",
            yes_no(ctx, is_in_late_confirmation_window(date, policy))
        ),
    ];

    if let Some(birth_date) = birth_date {
        let grade = match suggest_grade(birth_date, bounds.key, policy) {
            Some(grade) => format!("grade index {}", grade),
            None if policy.grade_suggestion.is_none() => "no cutoff for region".to_string(),
            None => paint(ctx, COLOR_RED, "below entry age"),
        };
        lines.push(format!("Suggested grade:   {}", grade));
    }
    lines
}

pub fn print_academic_summary(
    ctx: &OutputContext,
    policy: &AcademicYearPolicy,
    date: NaiveDate,
    birth_date: Option<NaiveDate>,
) {
    for line in format_academic_summary(ctx, policy, date, birth_date) {
        println!("{}", line);
    }
}
