//! Catalog operations: duplicate-checked adds, updates, and enrichment.
//!
//! Sits between the CLI and the store. The store enforces the raw
//! `(show_name, theater_name, date_attended)` uniqueness constraint, but
//! SQLite treats NULLs as distinct, so the equivalence class for "no date"
//! lives here: duplicate detection normalizes names (lowercase, punctuation
//! stripped, whitespace collapsed) and compares dates literally, absent
//! matching absent.
//!
//! Enrichment is fill-only-missing by default: only fields that are absent
//! or empty are requested from the provider and written back. `force`
//! re-fetches and overwrites every enrichable field.

use crate::config::Settings;
use crate::db::{ShowUpdate, Store, StoreError};
use crate::llm::{Provider, ProviderError};
use crate::types::{Enrichment, NewShow, ShowRecord};
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),
    #[error("show not found: {0}")]
    NotFound(i64),
    #[error("no LLM provider configured (set an API key in stagebill.toml)")]
    NoProvider,
}

/// Result of an add attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added(i64),
    /// An equivalent record already exists; its id is returned.
    Duplicate(i64),
}

/// The fields enrichment may fill, in the order the provider is asked for
/// them. `user_categories` is deliberately not here — it is derived from the
/// predefined list, not fetched.
const ENRICHABLE_FIELDS: [&str; 20] = [
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
];

pub struct Catalog<'a> {
    store: &'a Store,
    provider: Option<&'a dyn Provider>,
    settings: &'a Settings,
}

impl<'a> Catalog<'a> {
    pub fn new(
        store: &'a Store,
        provider: Option<&'a dyn Provider>,
        settings: &'a Settings,
    ) -> Self {
        Self {
            store,
            provider,
            settings,
        }
    }

    /// Add a show unless an equivalent record exists. Auto-enriches when a
    /// provider is available and `settings.auto_enrich` is on; enrichment
    /// failure at add time is a warning, never a lost record.
    pub fn add_show(&self, new: &NewShow) -> Result<AddOutcome, CatalogError> {
        if let Some(existing) =
            self.find_duplicate(&new.show_name, &new.theater_name, new.date_attended)?
        {
            return Ok(AddOutcome::Duplicate(existing.id));
        }

        let id = self.store.add_show(new)?;

        if self.provider.is_some() && self.settings.auto_enrich {
            if let Err(e) = self.enrich_show(id, false) {
                eprintln!("warning: failed to enrich show {}: {}", id, e);
            }
        }

        Ok(AddOutcome::Added(id))
    }

    pub fn update_show(&self, id: i64, update: &ShowUpdate) -> Result<(), CatalogError> {
        if self.store.get_show(id)?.is_none() {
            return Err(CatalogError::NotFound(id));
        }
        self.store.update_show(id, update)?;
        Ok(())
    }

    pub fn get_show(&self, id: i64) -> Result<Option<ShowRecord>, CatalogError> {
        Ok(self.store.get_show(id)?)
    }

    /// Look for an existing record equivalent to (name, theater, date).
    /// Names match after normalization; dates compare literally, with absent
    /// forming its own equivalence class.
    pub fn find_duplicate(
        &self,
        show_name: &str,
        theater_name: &str,
        date_attended: Option<NaiveDate>,
    ) -> Result<Option<ShowRecord>, CatalogError> {
        let wanted_show = normalize(show_name);
        let wanted_theater = normalize(theater_name);

        for show in self.store.fetch_all_shows()? {
            if normalize(&show.show_name) == wanted_show
                && normalize(&show.theater_name) == wanted_theater
                && show.date_attended == date_attended
            {
                return Ok(Some(show));
            }
        }
        Ok(None)
    }

    /// Enrich a show with provider metadata.
    ///
    /// `force = false` fetches only absent/empty fields and returns early if
    /// nothing is missing. `force = true` re-fetches everything. When a plot
    /// summary is available and predefined user categories are configured,
    /// the show is also matched against those categories.
    pub fn enrich_show(&self, id: i64, force: bool) -> Result<ShowRecord, CatalogError> {
        let provider = self.provider.ok_or(CatalogError::NoProvider)?;
        let show = self.store.get_show(id)?.ok_or(CatalogError::NotFound(id))?;

        let missing = missing_fields(&show);
        let request: Option<Vec<&str>> = if force {
            None
        } else {
            if missing.is_empty() {
                return Ok(show);
            }
            Some(missing.clone())
        };

        let enrichment = provider.enrich(
            &show.show_name,
            &show.theater_name,
            request.as_deref(),
        )?;

        let allowed: &[&str] = if force { &ENRICHABLE_FIELDS } else { &missing };
        let mut update = enrichment_to_update(&enrichment, allowed);

        // Category matching needs a plot summary, freshly fetched or stored.
        let plot = update
            .plot_summary
            .clone()
            .or_else(|| show.plot_summary.clone());
        if let Some(plot) = plot
            && !self.settings.user_categories.is_empty()
        {
            match provider.match_categories(
                &show.show_name,
                &show.theater_name,
                &plot,
                &self.settings.user_categories,
            ) {
                Ok(categories) => update.user_categories = Some(categories),
                Err(e) => eprintln!("warning: category matching failed: {}", e),
            }
        }

        if !update.is_empty() {
            self.store.update_show(id, &update)?;
        }

        self.store.get_show(id)?.ok_or(CatalogError::NotFound(id))
    }
}

/// Normalize a name for duplicate comparison: lowercase, strip punctuation,
/// collapse whitespace.
pub fn normalize(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut pending_space = false;
    for c in s.trim().chars() {
        if c.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            for lower in c.to_lowercase() {
                out.push(lower);
            }
        } else if c.is_whitespace() {
            pending_space = true;
        }
        // Punctuation drops without becoming a separator: "Ain't" == "Aint"
    }
    out
}

/// Enrichable fields currently absent or empty on a record.
fn missing_fields(show: &ShowRecord) -> Vec<&'static str> {
    fn empty_str(v: &Option<String>) -> bool {
        v.as_deref().is_none_or(|s| s.is_empty())
    }
    fn empty_list(v: &Option<Vec<String>>) -> bool {
        v.as_deref().is_none_or(|l| l.is_empty())
    }

    let mut missing = Vec::new();
    for field in ENRICHABLE_FIELDS {
        let absent = match field {
            "lead_cast" => empty_list(&show.lead_cast),
            "director" => empty_str(&show.director),
            "choreographer" => empty_str(&show.choreographer),
            "composer" => empty_str(&show.composer),
            "lyricist" => empty_str(&show.lyricist),
            "book_writer" => empty_str(&show.book_writer),
            "opening_date" => empty_str(&show.opening_date),
            "closing_date" => empty_str(&show.closing_date),
            "is_revival" => show.is_revival.is_none(),
            "original_production_year" => show.original_production_year.is_none(),
            "production_type" => empty_str(&show.production_type),
            "plot_summary" => empty_str(&show.plot_summary),
            "genre" => empty_str(&show.genre),
            "tony_awards" => empty_list(&show.tony_awards),
            "other_awards" => empty_list(&show.other_awards),
            "musical_numbers" => empty_list(&show.musical_numbers),
            "themes" => empty_list(&show.themes),
            "running_time" => show.running_time.is_none(),
            "intermission_count" => show.intermission_count.is_none(),
            "llm_categories" => empty_list(&show.llm_categories),
            _ => unreachable!("unknown enrichable field"),
        };
        if absent {
            missing.push(field);
        }
    }
    missing
}

/// Convert a provider enrichment into a store update, keeping only the
/// fields in `allowed` (the missing set, or everything under force).
fn enrichment_to_update(e: &Enrichment, allowed: &[&str]) -> ShowUpdate {
    let ok = |field: &str| allowed.contains(&field);
    let mut update = ShowUpdate::default();

    if ok("lead_cast")
        && let Some(cast) = &e.lead_cast
    {
        update.lead_cast = Some(cast.iter().map(|c| c.display()).collect());
    }
    if ok("director") {
        update.director = e.director.clone();
    }
    if ok("choreographer") {
        update.choreographer = e.choreographer.clone();
    }
    if ok("composer") {
        update.composer = e.composer.clone();
    }
    if ok("lyricist") {
        update.lyricist = e.lyricist.clone();
    }
    if ok("book_writer") {
        update.book_writer = e.book_writer.clone();
    }
    if ok("opening_date") {
        update.opening_date = e.opening_date.clone();
    }
    if ok("closing_date") {
        update.closing_date = e.closing_date.clone();
    }
    if ok("is_revival") {
        update.is_revival = e.is_revival;
    }
    if ok("original_production_year") {
        update.original_production_year = e.original_production_year;
    }
    if ok("production_type") {
        update.production_type = e.production_type.clone();
    }
    if ok("plot_summary") {
        update.plot_summary = e.plot_summary.clone();
    }
    if ok("genre") {
        update.genre = e.genre.clone();
    }
    if ok("tony_awards") {
        update.tony_awards = e.tony_awards.clone();
    }
    if ok("other_awards") {
        update.other_awards = e.other_awards.clone();
    }
    if ok("musical_numbers") {
        update.musical_numbers = e.musical_numbers.clone();
    }
    if ok("themes") {
        update.themes = e.themes.clone();
    }
    if ok("running_time") {
        update.running_time = e.running_time;
    }
    if ok("intermission_count") {
        update.intermission_count = e.intermission_count;
    }
    if ok("llm_categories") {
        update.llm_categories = e.categories.clone();
    }

    update
}
