//! Shared types used across the catalog, store, enrichment, and site modules.
//!
//! `ShowRecord` is the one entity everything else revolves around. Absence is
//! modeled explicitly: `Option<Vec<String>>` distinguishes "never enriched"
//! from "enriched, came back empty", and both survive a round-trip through
//! the store.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a show has been attended or is still on the wishlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeenStatus {
    Seen,
    Wishlist,
}

impl SeenStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SeenStatus::Seen => "seen",
            SeenStatus::Wishlist => "wishlist",
        }
    }

    /// Parse the stored text form. Unknown values fall back to `Wishlist`,
    /// matching how rows written before the CHECK constraint are treated.
    pub fn parse(s: &str) -> SeenStatus {
        match s {
            "seen" => SeenStatus::Seen,
            _ => SeenStatus::Wishlist,
        }
    }
}

impl fmt::Display for SeenStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One catalog entry: a production attended or desired.
///
/// Field groups mirror the `shows` table. Everything beyond the core
/// (name, theater, status) is optional and typically filled by enrichment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowRecord {
    /// Row id. Unique, assigned at insert, immutable.
    pub id: i64,

    // Core fields
    pub show_name: String,
    pub theater_name: String,
    pub seen_status: SeenStatus,
    /// 1–10. New rows are validated at entry; aggregation still defends
    /// against out-of-range values arriving from an old or hand-edited store.
    pub rating: Option<i64>,
    pub personal_notes: Option<String>,
    pub date_attended: Option<NaiveDate>,

    // Cast & creative team
    pub lead_cast: Option<Vec<String>>,
    pub director: Option<String>,
    pub choreographer: Option<String>,
    pub composer: Option<String>,
    pub lyricist: Option<String>,
    pub book_writer: Option<String>,

    // Production details. Opening/closing stay free-form strings because
    // enrichment legitimately produces values like "still running".
    pub opening_date: Option<String>,
    pub closing_date: Option<String>,
    pub is_revival: Option<bool>,
    pub original_production_year: Option<i64>,
    pub production_type: Option<String>,

    // Content & awards
    pub plot_summary: Option<String>,
    pub genre: Option<String>,
    pub tony_awards: Option<Vec<String>>,
    pub other_awards: Option<Vec<String>>,

    // Technical & themes
    pub musical_numbers: Option<Vec<String>>,
    pub themes: Option<Vec<String>>,
    /// Minutes.
    pub running_time: Option<i64>,
    pub intermission_count: Option<i64>,

    // Classification
    pub llm_categories: Option<Vec<String>>,
    pub user_categories: Option<Vec<String>>,

    // Bookkeeping
    pub source_image_path: Option<String>,
    /// RFC 3339, set at insert.
    pub date_added: String,
    /// RFC 3339, bumped on every mutation.
    pub last_updated: String,
}

impl ShowRecord {
    /// Union of LLM-derived and user-assigned categories, order-preserving,
    /// first occurrence wins on duplicates.
    pub fn all_categories(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for cat in self
            .llm_categories
            .iter()
            .flatten()
            .chain(self.user_categories.iter().flatten())
        {
            if !seen.contains(&cat.as_str()) {
                seen.push(cat.as_str());
            }
        }
        seen
    }

    /// True when `rating` is present and within the valid 1–10 range.
    pub fn has_valid_rating(&self) -> bool {
        matches!(self.rating, Some(r) if (1..=10).contains(&r))
    }
}

/// Fields supplied when a show is first created, by hand or from a scanned
/// playbill. Everything else starts absent and is filled by enrichment.
#[derive(Debug, Clone, Default)]
pub struct NewShow {
    pub show_name: String,
    pub theater_name: String,
    pub seen_status: Option<SeenStatus>,
    pub date_attended: Option<NaiveDate>,
    pub rating: Option<i64>,
    pub personal_notes: Option<String>,
    pub source_image_path: Option<String>,
}

/// A cast entry as returned by enrichment. Providers answer either a plain
/// name or a `{"role": ..., "actor": ...}` pair; both flatten to one line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CastEntry {
    Name(String),
    RoleActor { role: String, actor: String },
}

impl CastEntry {
    pub fn display(&self) -> String {
        match self {
            CastEntry::Name(name) => name.clone(),
            CastEntry::RoleActor { role, actor } => format!("{}: {}", role, actor),
        }
    }
}

/// Partial record returned by a provider's enrichment call.
///
/// Every field is optional: when only missing fields were requested, the
/// provider answers only those. `deny_unknown_fields` is deliberately NOT
/// set — providers occasionally volunteer extra keys and those are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Enrichment {
    pub lead_cast: Option<Vec<CastEntry>>,
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
    /// Auto-detected categories ("jukebox musical", "golden age musical", ...).
    pub categories: Option<Vec<String>>,
}

/// A show identified in a playbill or poster image.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExtractedShow {
    pub show_name: String,
    pub theater_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seen_status_round_trips() {
        assert_eq!(SeenStatus::parse("seen"), SeenStatus::Seen);
        assert_eq!(SeenStatus::parse("wishlist"), SeenStatus::Wishlist);
        assert_eq!(SeenStatus::Seen.as_str(), "seen");
    }

    #[test]
    fn seen_status_unknown_defaults_to_wishlist() {
        assert_eq!(SeenStatus::parse("maybe"), SeenStatus::Wishlist);
        assert_eq!(SeenStatus::parse(""), SeenStatus::Wishlist);
    }

    #[test]
    fn cast_entry_displays_both_shapes() {
        let plain = CastEntry::Name("Patti LuPone".into());
        assert_eq!(plain.display(), "Patti LuPone");

        let pair = CastEntry::RoleActor {
            role: "Evita".into(),
            actor: "Patti LuPone".into(),
        };
        assert_eq!(pair.display(), "Evita: Patti LuPone");
    }

    #[test]
    fn cast_entry_deserializes_untagged() {
        let from_str: Vec<CastEntry> = serde_json::from_str(r#"["Nathan Lane"]"#).unwrap();
        assert_eq!(from_str, vec![CastEntry::Name("Nathan Lane".into())]);

        let from_obj: Vec<CastEntry> =
            serde_json::from_str(r#"[{"role": "Pseudolus", "actor": "Nathan Lane"}]"#).unwrap();
        assert_eq!(
            from_obj,
            vec![CastEntry::RoleActor {
                role: "Pseudolus".into(),
                actor: "Nathan Lane".into()
            }]
        );
    }

    #[test]
    fn enrichment_ignores_unknown_keys() {
        let e: Enrichment =
            serde_json::from_str(r#"{"director": "Hal Prince", "confidence": 0.9}"#).unwrap();
        assert_eq!(e.director.as_deref(), Some("Hal Prince"));
    }

    #[test]
    fn all_categories_unions_and_dedupes() {
        let mut show = crate::test_helpers::record(1, "Company", "Bernard B. Jacobs Theatre");
        show.llm_categories = Some(vec!["revival".into(), "sondheim".into()]);
        show.user_categories = Some(vec!["sondheim".into(), "date night".into()]);
        assert_eq!(
            show.all_categories(),
            vec!["revival", "sondheim", "date night"]
        );
    }

    #[test]
    fn all_categories_handles_absent_lists() {
        let show = crate::test_helpers::record(1, "Company", "Bernard B. Jacobs Theatre");
        assert!(show.all_categories().is_empty());
    }

    #[test]
    fn valid_rating_range() {
        let mut show = crate::test_helpers::record(1, "Cats", "Winter Garden Theatre");
        assert!(!show.has_valid_rating());
        show.rating = Some(7);
        assert!(show.has_valid_rating());
        show.rating = Some(11);
        assert!(!show.has_valid_rating());
        show.rating = Some(0);
        assert!(!show.has_valid_rating());
    }
}
