//! Shared test utilities for the stagebill test suite.
//!
//! Provides record builders with sensible defaults and a scriptable stub
//! provider, so tests construct only the fields they care about and never
//! touch the network.

use std::cell::{Cell, RefCell};

use crate::llm::{Provider, ProviderError};
use crate::types::{Enrichment, ExtractedShow, NewShow, SeenStatus, ShowRecord};

/// A wishlist record with every optional field absent. Tests set just the
/// fields under test.
pub fn record(id: i64, show_name: &str, theater_name: &str) -> ShowRecord {
    ShowRecord {
        id,
        show_name: show_name.to_string(),
        theater_name: theater_name.to_string(),
        seen_status: SeenStatus::Wishlist,
        rating: None,
        personal_notes: None,
        date_attended: None,
        lead_cast: None,
        director: None,
        choreographer: None,
        composer: None,
        lyricist: None,
        book_writer: None,
        opening_date: None,
        closing_date: None,
        is_revival: None,
        original_production_year: None,
        production_type: None,
        plot_summary: None,
        genre: None,
        tony_awards: None,
        other_awards: None,
        musical_numbers: None,
        themes: None,
        running_time: None,
        intermission_count: None,
        llm_categories: None,
        user_categories: None,
        source_image_path: None,
        date_added: "2026-01-01T00:00:00+00:00".to_string(),
        last_updated: "2026-01-01T00:00:00+00:00".to_string(),
    }
}

/// A minimal insertable show.
pub fn new_show(show_name: &str, theater_name: &str) -> NewShow {
    NewShow {
        show_name: show_name.to_string(),
        theater_name: theater_name.to_string(),
        ..Default::default()
    }
}

/// Scriptable in-memory provider. Returns canned answers and records what
/// it was asked, so catalog tests can assert on the requests.
pub struct StubProvider {
    enrichment: Enrichment,
    categories: Vec<String>,
    extracted: Vec<ExtractedShow>,
    fail_extraction: bool,
    enrich_calls: Cell<usize>,
    last_missing: RefCell<Vec<String>>,
}

impl StubProvider {
    pub fn new(enrichment: Enrichment) -> Self {
        Self {
            enrichment,
            categories: Vec::new(),
            extracted: Vec::new(),
            fail_extraction: false,
            enrich_calls: Cell::new(0),
            last_missing: RefCell::new(Vec::new()),
        }
    }

    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        self.categories = categories;
        self
    }

    pub fn with_extracted(mut self, extracted: Vec<ExtractedShow>) -> Self {
        self.extracted = extracted;
        self
    }

    pub fn failing_extraction(mut self) -> Self {
        self.fail_extraction = true;
        self
    }

    pub fn enrich_calls(&self) -> usize {
        self.enrich_calls.get()
    }

    /// The `missing_fields` list from the most recent enrich call.
    pub fn last_missing_fields(&self) -> Vec<String> {
        self.last_missing.borrow().clone()
    }
}

impl Provider for StubProvider {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn extract_shows(
        &self,
        _image: &[u8],
        _media_type: &str,
    ) -> Result<Vec<ExtractedShow>, ProviderError> {
        if self.fail_extraction {
            return Err(ProviderError::BadResponse("stubbed failure".to_string()));
        }
        Ok(self.extracted.clone())
    }

    fn enrich(
        &self,
        _show_name: &str,
        _theater_name: &str,
        missing_fields: Option<&[&str]>,
    ) -> Result<Enrichment, ProviderError> {
        self.enrich_calls.set(self.enrich_calls.get() + 1);
        *self.last_missing.borrow_mut() = missing_fields
            .unwrap_or_default()
            .iter()
            .map(|f| f.to_string())
            .collect();
        Ok(self.enrichment.clone())
    }

    fn match_categories(
        &self,
        _show_name: &str,
        _theater_name: &str,
        _plot_summary: &str,
        _predefined: &[String],
    ) -> Result<Vec<String>, ProviderError> {
        Ok(self.categories.clone())
    }
}
