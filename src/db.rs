//! SQLite-backed show store.
//!
//! One `shows` table holds the whole catalog; `processed_images` records
//! which playbill photos have already been scanned so they are never sent to
//! a provider twice. List-valued columns (cast, awards, songs, themes,
//! categories) are JSON-serialized TEXT: `NULL` means the field was never
//! filled, `"[]"` means it was filled and came back empty, and the two
//! survive a round-trip distinctly.
//!
//! Rows are fully materialized on read — no lazy fields, no pagination. The
//! site renderer depends on that: `fetch_all_shows` is its entire input.

use crate::types::{NewShow, SeenStatus, ShowRecord};
use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, Row, params};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database unavailable: {0}")]
    Unavailable(String),
    #[error("SQL error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Column list shared by every SELECT so row mapping stays by fixed index.
const SHOW_COLUMNS: &str = "id, show_name, theater_name, seen_status, rating, personal_notes, \
     date_attended, lead_cast, director, choreographer, composer, lyricist, book_writer, \
     opening_date, closing_date, is_revival, original_production_year, production_type, \
     plot_summary, genre, tony_awards, other_awards, musical_numbers, themes, running_time, \
     intermission_count, llm_categories, user_categories, source_image_path, date_added, \
     last_updated";

pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (creating if necessary) the database at `path` and ensure the
    /// schema exists.
    pub fn open(path: &Path) -> Result<Store, StoreError> {
        let conn = Connection::open(path)
            .map_err(|e| StoreError::Unavailable(format!("{}: {}", path.display(), e)))?;
        let store = Store { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Open an existing database, refusing to create one. Read-only
    /// consumers (site generation, export) use this so a missing store is a
    /// hard error instead of an empty catalog.
    pub fn open_existing(path: &Path) -> Result<Store, StoreError> {
        if !path.exists() {
            return Err(StoreError::Unavailable(format!(
                "{}: no such database",
                path.display()
            )));
        }
        Store::open(path)
    }

    /// In-memory store for tests.
    pub fn open_in_memory() -> Result<Store, StoreError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StoreError::Unavailable(format!(":memory:: {}", e)))?;
        let store = Store { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS shows (
                id INTEGER PRIMARY KEY AUTOINCREMENT,

                show_name TEXT NOT NULL,
                theater_name TEXT NOT NULL,
                seen_status TEXT CHECK (seen_status IN ('seen', 'wishlist')),
                rating INTEGER CHECK (rating >= 1 AND rating <= 10),
                personal_notes TEXT,
                date_attended TEXT,

                lead_cast TEXT,
                director TEXT,
                choreographer TEXT,
                composer TEXT,
                lyricist TEXT,
                book_writer TEXT,

                opening_date TEXT,
                closing_date TEXT,
                is_revival BOOLEAN,
                original_production_year INTEGER,
                production_type TEXT,

                plot_summary TEXT,
                genre TEXT,
                tony_awards TEXT,
                other_awards TEXT,

                musical_numbers TEXT,
                themes TEXT,
                running_time INTEGER,
                intermission_count INTEGER,

                llm_categories TEXT,
                user_categories TEXT,

                source_image_path TEXT,
                date_added TEXT NOT NULL,
                last_updated TEXT NOT NULL,

                UNIQUE(show_name, theater_name, date_attended)
            );
            CREATE TABLE IF NOT EXISTS processed_images (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                image_path TEXT UNIQUE NOT NULL,
                processed_date TEXT NOT NULL,
                shows_extracted INTEGER DEFAULT 0
            );",
        )?;
        Ok(())
    }

    /// Insert a new show. Timestamps are set here; everything enrichable
    /// starts NULL.
    pub fn add_show(&self, new: &NewShow) -> Result<i64, StoreError> {
        let now = Utc::now().to_rfc3339();
        let status = new.seen_status.unwrap_or(SeenStatus::Wishlist);
        self.conn.execute(
            "INSERT INTO shows (show_name, theater_name, seen_status, rating, personal_notes, \
             date_attended, source_image_path, date_added, last_updated) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                new.show_name,
                new.theater_name,
                status.as_str(),
                new.rating,
                new.personal_notes,
                new.date_attended.map(|d| d.to_string()),
                new.source_image_path,
                now,
                now,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Apply the present fields of `update` and bump `last_updated`. Fields
    /// left `None` are untouched.
    pub fn update_show(&self, id: i64, update: &ShowUpdate) -> Result<(), StoreError> {
        let mut sets: Vec<&'static str> = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        let mut scalar = |col: &'static str, v: Box<dyn rusqlite::ToSql>| {
            sets.push(col);
            values.push(v);
        };

        if let Some(v) = update.seen_status {
            scalar("seen_status = ?", Box::new(v.as_str()));
        }
        if let Some(v) = update.rating {
            scalar("rating = ?", Box::new(v));
        }
        if let Some(v) = &update.personal_notes {
            scalar("personal_notes = ?", Box::new(v.clone()));
        }
        if let Some(v) = update.date_attended {
            scalar("date_attended = ?", Box::new(v.to_string()));
        }
        if let Some(v) = &update.director {
            scalar("director = ?", Box::new(v.clone()));
        }
        if let Some(v) = &update.choreographer {
            scalar("choreographer = ?", Box::new(v.clone()));
        }
        if let Some(v) = &update.composer {
            scalar("composer = ?", Box::new(v.clone()));
        }
        if let Some(v) = &update.lyricist {
            scalar("lyricist = ?", Box::new(v.clone()));
        }
        if let Some(v) = &update.book_writer {
            scalar("book_writer = ?", Box::new(v.clone()));
        }
        if let Some(v) = &update.opening_date {
            scalar("opening_date = ?", Box::new(v.clone()));
        }
        if let Some(v) = &update.closing_date {
            scalar("closing_date = ?", Box::new(v.clone()));
        }
        if let Some(v) = update.is_revival {
            scalar("is_revival = ?", Box::new(v));
        }
        if let Some(v) = update.original_production_year {
            scalar("original_production_year = ?", Box::new(v));
        }
        if let Some(v) = &update.production_type {
            scalar("production_type = ?", Box::new(v.clone()));
        }
        if let Some(v) = &update.plot_summary {
            scalar("plot_summary = ?", Box::new(v.clone()));
        }
        if let Some(v) = &update.genre {
            scalar("genre = ?", Box::new(v.clone()));
        }
        if let Some(v) = update.running_time {
            scalar("running_time = ?", Box::new(v));
        }
        if let Some(v) = update.intermission_count {
            scalar("intermission_count = ?", Box::new(v));
        }
        if let Some(v) = &update.lead_cast {
            scalar("lead_cast = ?", Box::new(serde_json::to_string(v)?));
        }
        if let Some(v) = &update.tony_awards {
            scalar("tony_awards = ?", Box::new(serde_json::to_string(v)?));
        }
        if let Some(v) = &update.other_awards {
            scalar("other_awards = ?", Box::new(serde_json::to_string(v)?));
        }
        if let Some(v) = &update.musical_numbers {
            scalar("musical_numbers = ?", Box::new(serde_json::to_string(v)?));
        }
        if let Some(v) = &update.themes {
            scalar("themes = ?", Box::new(serde_json::to_string(v)?));
        }
        if let Some(v) = &update.llm_categories {
            scalar("llm_categories = ?", Box::new(serde_json::to_string(v)?));
        }
        if let Some(v) = &update.user_categories {
            scalar("user_categories = ?", Box::new(serde_json::to_string(v)?));
        }

        sets.push("last_updated = ?");
        values.push(Box::new(Utc::now().to_rfc3339()));
        values.push(Box::new(id));

        let sql = format!(
            "UPDATE shows SET {} WHERE id = ?",
            sets.join(", ")
        );
        self.conn.execute(
            &sql,
            rusqlite::params_from_iter(values.iter().map(|v| v.as_ref())),
        )?;
        Ok(())
    }

    pub fn get_show(&self, id: i64) -> Result<Option<ShowRecord>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {SHOW_COLUMNS} FROM shows WHERE id = ?1"))?;
        let mut rows = stmt.query(params![id])?;
        match rows.next()? {
            Some(row) => Ok(Some(row_to_show(row)?)),
            None => Ok(None),
        }
    }

    /// The full catalog, fully materialized, in id order. This is the
    /// renderer's input snapshot.
    pub fn fetch_all_shows(&self) -> Result<Vec<ShowRecord>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {SHOW_COLUMNS} FROM shows ORDER BY id"))?;
        let rows = stmt.query_map([], row_to_show)?;
        let mut shows = Vec::new();
        for show in rows {
            shows.push(show?);
        }
        Ok(shows)
    }

    /// Filtered search. Name/theater/genre/category filters are substring
    /// matches; category filters match against the stored JSON text, which
    /// is how the catalog has always searched list columns.
    pub fn search_shows(&self, filters: &SearchFilters) -> Result<Vec<ShowRecord>, StoreError> {
        let mut sql = format!("SELECT {SHOW_COLUMNS} FROM shows WHERE 1=1");
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(name) = &filters.show_name {
            sql.push_str(" AND show_name LIKE ?");
            values.push(Box::new(format!("%{}%", name)));
        }
        if let Some(theater) = &filters.theater_name {
            sql.push_str(" AND theater_name LIKE ?");
            values.push(Box::new(format!("%{}%", theater)));
        }
        if let Some(status) = filters.seen_status {
            sql.push_str(" AND seen_status = ?");
            values.push(Box::new(status.as_str()));
        }
        if let Some(min) = filters.rating_min {
            sql.push_str(" AND rating >= ?");
            values.push(Box::new(min));
        }
        if let Some(max) = filters.rating_max {
            sql.push_str(" AND rating <= ?");
            values.push(Box::new(max));
        }
        if let Some(genre) = &filters.genre {
            sql.push_str(" AND genre LIKE ?");
            values.push(Box::new(format!("%{}%", genre)));
        }
        if let Some(category) = &filters.category {
            sql.push_str(" AND llm_categories LIKE ?");
            values.push(Box::new(format!("%{}%", category)));
        }
        if let Some(category) = &filters.user_category {
            sql.push_str(" AND user_categories LIKE ?");
            values.push(Box::new(format!("%{}%", category)));
        }

        // Secondary id sort keeps results deterministic when the primary
        // key ties (or is NULL, as unrated rows are under `rating`).
        match filters.sort {
            SortBy::DateAdded => sql.push_str(" ORDER BY date_added DESC, id"),
            SortBy::Name => sql.push_str(" ORDER BY show_name, id"),
            SortBy::Theater => sql.push_str(" ORDER BY theater_name, id"),
            SortBy::Rating => sql.push_str(" ORDER BY rating DESC, id"),
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(
            rusqlite::params_from_iter(values.iter().map(|v| v.as_ref())),
            row_to_show,
        )?;
        let mut shows = Vec::new();
        for show in rows {
            shows.push(show?);
        }
        Ok(shows)
    }

    pub fn mark_image_processed(&self, image_path: &str, shows_extracted: i64) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO processed_images (image_path, processed_date, shows_extracted) \
             VALUES (?1, ?2, ?3)",
            params![image_path, Utc::now().to_rfc3339(), shows_extracted],
        )?;
        Ok(())
    }

    pub fn is_image_processed(&self, image_path: &str) -> Result<bool, StoreError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM processed_images WHERE image_path = ?1",
            params![image_path],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

/// A partial update: `None` fields are left untouched. There is no way to
/// clear a field back to NULL — the catalog never does that, it only fills
/// or overwrites.
#[derive(Debug, Clone, Default)]
pub struct ShowUpdate {
    pub seen_status: Option<SeenStatus>,
    pub rating: Option<i64>,
    pub personal_notes: Option<String>,
    pub date_attended: Option<NaiveDate>,
    pub lead_cast: Option<Vec<String>>,
    pub director: Option<String>,
    pub choreographer: Option<String>,
    pub composer: Option<String>,
    pub lyricist: Option<String>,
    pub book_writer: Option<String>,
    pub opening_date: Option<String>,
    pub closing_date: Option<String>,
    pub is_revival: Option<bool>,
    pub original_production_year: Option<i64>,
    pub production_type: Option<String>,
    pub plot_summary: Option<String>,
    pub genre: Option<String>,
    pub tony_awards: Option<Vec<String>>,
    pub other_awards: Option<Vec<String>>,
    pub musical_numbers: Option<Vec<String>>,
    pub themes: Option<Vec<String>>,
    pub running_time: Option<i64>,
    pub intermission_count: Option<i64>,
    pub llm_categories: Option<Vec<String>>,
    pub user_categories: Option<Vec<String>>,
}

impl ShowUpdate {
    pub fn is_empty(&self) -> bool {
        // Cheap structural check via Debug would be fragile; spell it out.
        self.seen_status.is_none()
            && self.rating.is_none()
            && self.personal_notes.is_none()
            && self.date_attended.is_none()
            && self.lead_cast.is_none()
            && self.director.is_none()
            && self.choreographer.is_none()
            && self.composer.is_none()
            && self.lyricist.is_none()
            && self.book_writer.is_none()
            && self.opening_date.is_none()
            && self.closing_date.is_none()
            && self.is_revival.is_none()
            && self.original_production_year.is_none()
            && self.production_type.is_none()
            && self.plot_summary.is_none()
            && self.genre.is_none()
            && self.tony_awards.is_none()
            && self.other_awards.is_none()
            && self.musical_numbers.is_none()
            && self.themes.is_none()
            && self.running_time.is_none()
            && self.intermission_count.is_none()
            && self.llm_categories.is_none()
            && self.user_categories.is_none()
    }
}

/// Search filters for `search_shows`. Absent filters do not constrain.
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    pub show_name: Option<String>,
    pub theater_name: Option<String>,
    pub seen_status: Option<SeenStatus>,
    pub rating_min: Option<i64>,
    pub rating_max: Option<i64>,
    pub genre: Option<String>,
    pub category: Option<String>,
    pub user_category: Option<String>,
    pub sort: SortBy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortBy {
    #[default]
    DateAdded,
    Name,
    Theater,
    Rating,
}

fn row_to_show(row: &Row) -> rusqlite::Result<ShowRecord> {
    let status: String = row.get(3)?;
    let date_attended: Option<String> = row.get(6)?;
    Ok(ShowRecord {
        id: row.get(0)?,
        show_name: row.get(1)?,
        theater_name: row.get(2)?,
        seen_status: SeenStatus::parse(&status),
        rating: row.get(4)?,
        personal_notes: row.get(5)?,
        date_attended: date_attended.and_then(|d| parse_stored_date(&d)),
        lead_cast: parse_list(row.get(7)?),
        director: row.get(8)?,
        choreographer: row.get(9)?,
        composer: row.get(10)?,
        lyricist: row.get(11)?,
        book_writer: row.get(12)?,
        opening_date: row.get(13)?,
        closing_date: row.get(14)?,
        is_revival: row.get(15)?,
        original_production_year: row.get(16)?,
        production_type: row.get(17)?,
        plot_summary: row.get(18)?,
        genre: row.get(19)?,
        tony_awards: parse_list(row.get(20)?),
        other_awards: parse_list(row.get(21)?),
        musical_numbers: parse_list(row.get(22)?),
        themes: parse_list(row.get(23)?),
        running_time: row.get(24)?,
        intermission_count: row.get(25)?,
        llm_categories: parse_list(row.get(26)?),
        user_categories: parse_list(row.get(27)?),
        source_image_path: row.get(28)?,
        date_added: row.get(29)?,
        last_updated: row.get(30)?,
    })
}

/// Parse a stored `YYYY-MM-DD` date. A value that doesn't parse degrades to
/// absent with a warning rather than failing the whole row.
fn parse_stored_date(text: &str) -> Option<NaiveDate> {
    match NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        Ok(d) => Some(d),
        Err(_) => {
            eprintln!("warning: unparsable date_attended {:?}, treating as absent", text);
            None
        }
    }
}

/// Parse a JSON list column. NULL stays absent; a stored value that isn't
/// valid JSON degrades to absent with a warning rather than failing the row.
fn parse_list(text: Option<String>) -> Option<Vec<String>> {
    let text = text?;
    match serde_json::from_str(&text) {
        Ok(list) => Some(list),
        Err(_) => {
            eprintln!("warning: unparsable list column {:?}, treating as absent", text);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::new_show;

    // =========================================================================
    // Round trips
    // =========================================================================

    #[test]
    fn add_and_get_round_trip() {
        let store = Store::open_in_memory().unwrap();
        let id = store
            .add_show(&NewShow {
                show_name: "Hadestown".into(),
                theater_name: "Walter Kerr Theatre".into(),
                seen_status: Some(SeenStatus::Seen),
                date_attended: NaiveDate::from_ymd_opt(2024, 3, 9),
                rating: Some(9),
                personal_notes: Some("road to hell".into()),
                source_image_path: None,
            })
            .unwrap();

        let show = store.get_show(id).unwrap().unwrap();
        assert_eq!(show.show_name, "Hadestown");
        assert_eq!(show.theater_name, "Walter Kerr Theatre");
        assert_eq!(show.seen_status, SeenStatus::Seen);
        assert_eq!(show.rating, Some(9));
        assert_eq!(show.date_attended, NaiveDate::from_ymd_opt(2024, 3, 9));
        assert_eq!(show.personal_notes.as_deref(), Some("road to hell"));
        // Enrichable fields start absent
        assert!(show.genre.is_none());
        assert!(show.tony_awards.is_none());
        assert!(!show.date_added.is_empty());
    }

    #[test]
    fn get_missing_show_is_none() {
        let store = Store::open_in_memory().unwrap();
        assert!(store.get_show(42).unwrap().is_none());
    }

    #[test]
    fn list_columns_distinguish_absent_from_empty() {
        let store = Store::open_in_memory().unwrap();
        let id = store.add_show(&new_show("Six", "Lena Horne Theatre")).unwrap();

        let update = ShowUpdate {
            tony_awards: Some(vec![]),
            themes: Some(vec!["history".into(), "empowerment".into()]),
            ..Default::default()
        };
        store.update_show(id, &update).unwrap();

        let show = store.get_show(id).unwrap().unwrap();
        assert_eq!(show.tony_awards, Some(vec![]));
        assert_eq!(
            show.themes,
            Some(vec!["history".to_string(), "empowerment".to_string()])
        );
        assert_eq!(show.other_awards, None);
    }

    #[test]
    fn update_bumps_last_updated_and_leaves_rest() {
        let store = Store::open_in_memory().unwrap();
        let id = store.add_show(&new_show("Wicked", "Gershwin Theatre")).unwrap();
        let before = store.get_show(id).unwrap().unwrap();

        let update = ShowUpdate {
            rating: Some(8),
            ..Default::default()
        };
        store.update_show(id, &update).unwrap();

        let after = store.get_show(id).unwrap().unwrap();
        assert_eq!(after.rating, Some(8));
        assert_eq!(after.show_name, before.show_name);
        assert_eq!(after.date_added, before.date_added);
        assert!(after.last_updated >= before.last_updated);
    }

    #[test]
    fn duplicate_triple_rejected_by_unique_constraint() {
        let store = Store::open_in_memory().unwrap();
        let mut show = new_show("The Lion King", "Minskoff Theatre");
        show.date_attended = NaiveDate::from_ymd_opt(2023, 7, 1);
        store.add_show(&show).unwrap();
        assert!(store.add_show(&show).is_err());
    }

    #[test]
    fn same_show_different_date_allowed() {
        let store = Store::open_in_memory().unwrap();
        let mut show = new_show("The Lion King", "Minskoff Theatre");
        show.date_attended = NaiveDate::from_ymd_opt(2023, 7, 1);
        store.add_show(&show).unwrap();
        show.date_attended = NaiveDate::from_ymd_opt(2024, 7, 1);
        store.add_show(&show).unwrap();
        assert_eq!(store.fetch_all_shows().unwrap().len(), 2);
    }

    // =========================================================================
    // Snapshot and search
    // =========================================================================

    #[test]
    fn fetch_all_orders_by_id() {
        let store = Store::open_in_memory().unwrap();
        store.add_show(&new_show("Zorba", "Imperial Theatre")).unwrap();
        store.add_show(&new_show("Annie", "Palace Theatre")).unwrap();

        let shows = store.fetch_all_shows().unwrap();
        let ids: Vec<i64> = shows.iter().map(|s| s.id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn search_by_name_substring() {
        let store = Store::open_in_memory().unwrap();
        store.add_show(&new_show("Sweeney Todd", "Lunt-Fontanne Theatre")).unwrap();
        store.add_show(&new_show("Company", "Bernard B. Jacobs Theatre")).unwrap();

        let filters = SearchFilters {
            show_name: Some("weeney".into()),
            ..Default::default()
        };
        let hits = store.search_shows(&filters).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].show_name, "Sweeney Todd");
    }

    #[test]
    fn search_by_status_and_rating_range() {
        let store = Store::open_in_memory().unwrap();
        let mut seen = new_show("Parade", "Bernard B. Jacobs Theatre");
        seen.seen_status = Some(SeenStatus::Seen);
        seen.rating = Some(9);
        store.add_show(&seen).unwrap();
        store.add_show(&new_show("Shucked", "Nederlander Theatre")).unwrap();

        let filters = SearchFilters {
            seen_status: Some(SeenStatus::Seen),
            rating_min: Some(8),
            ..Default::default()
        };
        let hits = store.search_shows(&filters).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].show_name, "Parade");
    }

    #[test]
    fn search_sort_by_name() {
        let store = Store::open_in_memory().unwrap();
        store.add_show(&new_show("Zorba", "Imperial Theatre")).unwrap();
        store.add_show(&new_show("Annie", "Palace Theatre")).unwrap();

        let filters = SearchFilters {
            sort: SortBy::Name,
            ..Default::default()
        };
        let hits = store.search_shows(&filters).unwrap();
        assert_eq!(hits[0].show_name, "Annie");
        assert_eq!(hits[1].show_name, "Zorba");
    }

    // =========================================================================
    // Processed images
    // =========================================================================

    #[test]
    fn processed_image_ledger() {
        let store = Store::open_in_memory().unwrap();
        assert!(!store.is_image_processed("/photos/playbill.jpg").unwrap());

        store.mark_image_processed("/photos/playbill.jpg", 2).unwrap();
        assert!(store.is_image_processed("/photos/playbill.jpg").unwrap());

        // Re-marking is an upsert, not an error
        store.mark_image_processed("/photos/playbill.jpg", 3).unwrap();
        assert!(store.is_image_processed("/photos/playbill.jpg").unwrap());
    }

    // =========================================================================
    // Degraded reads
    // =========================================================================

    #[test]
    fn malformed_list_column_degrades_to_absent() {
        let store = Store::open_in_memory().unwrap();
        let id = store.add_show(&new_show("Cabaret", "August Wilson Theatre")).unwrap();
        store
            .conn
            .execute(
                "UPDATE shows SET themes = 'not json' WHERE id = ?1",
                params![id],
            )
            .unwrap();

        let show = store.get_show(id).unwrap().unwrap();
        assert_eq!(show.themes, None);
    }

    #[test]
    fn malformed_date_degrades_to_absent() {
        let store = Store::open_in_memory().unwrap();
        let id = store.add_show(&new_show("Cabaret", "August Wilson Theatre")).unwrap();
        store
            .conn
            .execute(
                "UPDATE shows SET date_attended = 'sometime in June' WHERE id = ?1",
                params![id],
            )
            .unwrap();

        let show = store.get_show(id).unwrap().unwrap();
        assert_eq!(show.date_attended, None);
    }

    #[test]
    fn open_existing_refuses_missing_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let missing = tmp.path().join("nope.db");
        assert!(matches!(
            Store::open_existing(&missing),
            Err(StoreError::Unavailable(_))
        ));
    }

    #[test]
    fn open_creates_then_open_existing_succeeds() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("shows.db");
        {
            let store = Store::open(&path).unwrap();
            store.add_show(&new_show("Chicago", "Ambassador Theatre")).unwrap();
        }
        let store = Store::open_existing(&path).unwrap();
        assert_eq!(store.fetch_all_shows().unwrap().len(), 1);
    }
}
