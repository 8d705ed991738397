//! CLI output formatting.
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure — no I/O, no side effects. Warnings are the one
//! exception to the stdout rule: they go to stderr at the call sites that
//! produce them, not here.
//!
//! Show display is information-first: the header line is the show's
//! identity (name, theater, status), with everything else as indented
//! context lines, so a `list` reads as a catalog inventory.

use crate::generate::{GenerateOutcome, GenerateSummary};
use crate::scan::ScanReport;
use crate::types::ShowRecord;

/// Compact show block: the fields you'd rattle off about a ticket stub.
pub fn format_show(show: &ShowRecord) -> Vec<String> {
    let mut lines = vec![
        format!("#{} {} — {}", show.id, show.show_name, show.theater_name),
        format!("    Status: {}", show.seen_status),
    ];
    if let Some(date) = show.date_attended {
        lines.push(format!("    Attended: {}", date.format("%Y-%m-%d")));
    }
    if let Some(rating) = show.rating {
        lines.push(format!("    Rating: {}/10", rating));
    }
    lines
}

/// Full show block: everything enrichment knows, absent fields omitted.
pub fn format_show_detailed(show: &ShowRecord) -> Vec<String> {
    let mut lines = format_show(show);

    let mut field = |label: &str, value: &Option<String>| {
        if let Some(value) = value
            && !value.is_empty()
        {
            lines.push(format!("    {}: {}", label, value));
        }
    };
    field("Genre", &show.genre);
    field("Production Type", &show.production_type);
    field("Opening Date", &show.opening_date);
    field("Closing Date", &show.closing_date);
    field("Plot", &show.plot_summary);
    field("Director", &show.director);
    field("Choreographer", &show.choreographer);
    field("Composer", &show.composer);
    field("Lyricist", &show.lyricist);
    field("Book", &show.book_writer);

    if let Some(cast) = &show.lead_cast
        && !cast.is_empty()
    {
        lines.push("    Lead Cast:".to_string());
        for member in cast {
            lines.push(format!("        - {}", member));
        }
    }

    let mut list = |label: &str, value: &Option<Vec<String>>| {
        if let Some(items) = value
            && !items.is_empty()
        {
            lines.push(format!("    {}: {}", label, items.join(", ")));
        }
    };
    list("Tony Awards", &show.tony_awards);
    list("Other Awards", &show.other_awards);
    list("Themes", &show.themes);
    list("Categories", &show.llm_categories);
    list("User Categories", &show.user_categories);

    if show.is_revival == Some(true) {
        match show.original_production_year {
            Some(year) => lines.push(format!("    Revival of: {} production", year)),
            None => lines.push("    Revival: yes".to_string()),
        }
    }
    if let Some(minutes) = show.running_time {
        lines.push(format!("    Running Time: {} minutes", minutes));
    }
    if let Some(notes) = &show.personal_notes
        && !notes.is_empty()
    {
        lines.push(format!("    Notes: {}", notes));
    }
    if let Some(path) = &show.source_image_path {
        lines.push(format!("    Source: {}", path));
    }
    lines.push(format!("    Added: {}", show.date_added));

    lines
}

pub fn format_scan_report(report: &ScanReport) -> Vec<String> {
    let mut lines = vec![format!(
        "{} new image(s), {} processed, {} show(s) added",
        report.images_found, report.images_processed, report.shows_added
    )];
    if report.duplicates > 0 {
        lines.push(format!("{} duplicate(s) skipped", report.duplicates));
    }
    if report.failures > 0 {
        lines.push(format!(
            "{} image(s) failed and will be retried next scan",
            report.failures
        ));
    }
    lines
}

pub fn format_generate_outcome(outcome: &GenerateOutcome) -> Vec<String> {
    match outcome {
        GenerateOutcome::Unchanged => {
            vec!["Site is up to date (catalog unchanged), nothing written".to_string()]
        }
        GenerateOutcome::Generated(summary) => format_generate_summary(summary),
    }
}

fn format_generate_summary(summary: &GenerateSummary) -> Vec<String> {
    let mut lines = Vec::new();
    for warning in &summary.warnings {
        lines.push(format!("warning: {}", warning));
    }
    lines.push(format!("Generated {} page(s)", summary.pages_written));
    lines
}

pub fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}
