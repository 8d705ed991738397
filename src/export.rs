//! Catalog export to JSON and CSV.
//!
//! JSON is a straight serde dump of the records — lists stay lists, absent
//! stays `null`. CSV flattens list fields to `"a, b, c"` cells since a cell
//! can hold only text; consumers that need structure should take the JSON.

use crate::types::ShowRecord;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub fn write_json(shows: &[ShowRecord], path: &Path) -> Result<(), ExportError> {
    let mut file = File::create(path)?;
    let json = serde_json::to_string_pretty(shows)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

const CSV_HEADER: [&str; 31] = [
    "id",
    "show_name",
    "theater_name",
    "seen_status",
    "date_attended",
    "rating",
    "personal_notes",
    "lead_cast",
    "director",
    "choreographer",
    "composer",
    "lyricist",
    "book_writer",
    "opening_date",
    "closing_date",
    "is_revival",
    "original_production_year",
    "production_type",
    "plot_summary",
    "genre",
    "tony_awards",
    "other_awards",
    "musical_numbers",
    "themes",
    "running_time",
    "intermission_count",
    "llm_categories",
    "user_categories",
    "source_image_path",
    "date_added",
    "last_updated",
];

pub fn write_csv(shows: &[ShowRecord], path: &Path) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(CSV_HEADER)?;

    for show in shows {
        writer.write_record(csv_row(show))?;
    }
    writer.flush()?;
    Ok(())
}

fn csv_row(show: &ShowRecord) -> Vec<String> {
    fn opt(v: &Option<String>) -> String {
        v.clone().unwrap_or_default()
    }
    fn num<T: ToString>(v: Option<T>) -> String {
        v.map(|n| n.to_string()).unwrap_or_default()
    }
    fn list(v: &Option<Vec<String>>) -> String {
        v.as_deref().map(|l| l.join(", ")).unwrap_or_default()
    }

    vec![
        show.id.to_string(),
        show.show_name.clone(),
        show.theater_name.clone(),
        show.seen_status.as_str().to_string(),
        num(show.date_attended),
        num(show.rating),
        opt(&show.personal_notes),
        list(&show.lead_cast),
        opt(&show.director),
        opt(&show.choreographer),
        opt(&show.composer),
        opt(&show.lyricist),
        opt(&show.book_writer),
        opt(&show.opening_date),
        opt(&show.closing_date),
        num(show.is_revival),
        num(show.original_production_year),
        opt(&show.production_type),
        opt(&show.plot_summary),
        opt(&show.genre),
        list(&show.tony_awards),
        list(&show.other_awards),
        list(&show.musical_numbers),
        list(&show.themes),
        num(show.running_time),
        num(show.intermission_count),
        list(&show.llm_categories),
        list(&show.user_categories),
        opt(&show.source_image_path),
        show.date_added.clone(),
        show.last_updated.clone(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::record;
    use tempfile::TempDir;

    #[test]
    fn json_round_trips() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("shows.json");
        let mut show = record(1, "Hadestown", "Walter Kerr Theatre");
        show.themes = Some(vec!["love".into(), "fate".into()]);

        write_json(&[show.clone()], &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<ShowRecord> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, vec![show]);
    }

    #[test]
    fn csv_has_header_and_one_row_per_show() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("shows.csv");
        let shows = vec![
            record(1, "Hadestown", "Walter Kerr Theatre"),
            record(2, "Wicked", "Gershwin Theatre"),
        ];

        write_csv(&shows, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("id,show_name,theater_name"));
        assert!(lines[1].contains("Hadestown"));
    }

    #[test]
    fn csv_flattens_lists_and_quotes_commas() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("shows.csv");
        let mut show = record(1, "Company", "Bernard B. Jacobs Theatre");
        show.tony_awards = Some(vec!["Best Revival".into(), "Best Direction".into()]);

        write_csv(&[show], &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"Best Revival, Best Direction\""));
    }

    #[test]
    fn csv_header_width_matches_rows() {
        let show = record(1, "Six", "Lena Horne Theatre");
        assert_eq!(csv_row(&show).len(), CSV_HEADER.len());
    }
}
