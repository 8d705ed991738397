//! Content digest and site state for incremental regeneration.
//!
//! Rendering the site is cheap but not free, and publishing workflows key
//! off file mtimes, so `generate` skips work entirely when nothing changed.
//! This module decides "changed or not":
//!
//! - [`hash_shows`] computes a SHA-256 digest over a canonical serialization
//!   of every record. Records are sorted by id first, so the digest is
//!   independent of the order the store happened to return them, and every
//!   field participates, so changing a single rating changes the digest.
//! - [`SiteState`] is a small JSON file persisted next to the generated
//!   site, holding the digest of the snapshot the site was rendered from.
//!
//! The state file is written **only after** all output writes succeed. A
//! crash mid-render leaves the previous state in place, so the next run
//! re-renders rather than believing output it never wrote.
//!
//! A missing, corrupt, or version-mismatched state file is never an error:
//! it loads as "no previous digest", which simply forces regeneration.

use crate::types::ShowRecord;
use sha2::{Digest, Sha256};
use std::io;
use std::path::Path;

/// Name of the state file within the output directory.
pub const STATE_FILENAME: &str = ".stagebill-state.json";

/// Version of the state file format. Bump to invalidate all existing state
/// when the digest computation changes.
const STATE_VERSION: u32 = 1;

/// Unit separator between fields; record separator between records. Control
/// characters cannot occur in field data, so concatenation is unambiguous.
const FIELD_SEP: u8 = 0x1f;
const RECORD_SEP: u8 = 0x1e;

/// Persisted regeneration state.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SiteState {
    pub version: u32,
    /// Digest of the record snapshot the site was last rendered from.
    pub digest: Option<String>,
    /// RFC 3339 timestamp of the last successful regeneration.
    pub generated_at: Option<String>,
}

impl SiteState {
    /// State representing "never generated".
    pub fn empty() -> Self {
        Self {
            version: STATE_VERSION,
            digest: None,
            generated_at: None,
        }
    }

    /// Load from a state file path. Returns the empty state if the file
    /// doesn't exist or can't be parsed (corruption, version mismatch) —
    /// an unreadable state forces regeneration, it never aborts the run.
    pub fn load(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return Self::empty(),
        };
        let state: Self = match serde_json::from_str(&content) {
            Ok(s) => s,
            Err(_) => {
                eprintln!(
                    "warning: unreadable state file {}, regenerating from scratch",
                    path.display()
                );
                return Self::empty();
            }
        };
        if state.version != STATE_VERSION {
            return Self::empty();
        }
        state
    }

    /// Save to the state file path.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }
}

/// SHA-256 digest over the canonical serialization of a record snapshot,
/// as a hex string. Input order does not matter; any field change does.
pub fn hash_shows(shows: &[ShowRecord]) -> String {
    let mut sorted: Vec<&ShowRecord> = shows.iter().collect();
    sorted.sort_by_key(|s| s.id);

    let mut hasher = Sha256::new();
    for show in sorted {
        feed_record(&mut hasher, show);
        hasher.update([RECORD_SEP]);
    }
    format!("{:x}", hasher.finalize())
}

fn feed_record(hasher: &mut Sha256, show: &ShowRecord) {
    let mut field = |bytes: &[u8]| {
        hasher.update(bytes);
        hasher.update([FIELD_SEP]);
    };
    // Present values are prefixed so None and Some("") hash differently.
    fn opt(v: Option<&str>) -> Vec<u8> {
        match v {
            Some(s) => {
                let mut b = vec![b'+'];
                b.extend_from_slice(s.as_bytes());
                b
            }
            None => vec![b'-'],
        }
    }
    fn opt_list(v: Option<&Vec<String>>) -> Vec<u8> {
        match v {
            Some(list) => {
                let mut b = vec![b'+'];
                for item in list {
                    b.extend_from_slice(item.as_bytes());
                    b.push(FIELD_SEP);
                }
                b
            }
            None => vec![b'-'],
        }
    }

    field(show.id.to_string().as_bytes());
    field(show.show_name.as_bytes());
    field(show.theater_name.as_bytes());
    field(show.seen_status.as_str().as_bytes());
    field(&opt(show.rating.map(|r| r.to_string()).as_deref()));
    field(&opt(show.personal_notes.as_deref()));
    field(&opt(show.date_attended.map(|d| d.to_string()).as_deref()));
    field(&opt_list(show.lead_cast.as_ref()));
    field(&opt(show.director.as_deref()));
    field(&opt(show.choreographer.as_deref()));
    field(&opt(show.composer.as_deref()));
    field(&opt(show.lyricist.as_deref()));
    field(&opt(show.book_writer.as_deref()));
    field(&opt(show.opening_date.as_deref()));
    field(&opt(show.closing_date.as_deref()));
    field(&opt(show.is_revival.map(|b| b.to_string()).as_deref()));
    field(&opt(
        show.original_production_year.map(|y| y.to_string()).as_deref(),
    ));
    field(&opt(show.production_type.as_deref()));
    field(&opt(show.plot_summary.as_deref()));
    field(&opt(show.genre.as_deref()));
    field(&opt_list(show.tony_awards.as_ref()));
    field(&opt_list(show.other_awards.as_ref()));
    field(&opt_list(show.musical_numbers.as_ref()));
    field(&opt_list(show.themes.as_ref()));
    field(&opt(show.running_time.map(|t| t.to_string()).as_deref()));
    field(&opt(
        show.intermission_count.map(|c| c.to_string()).as_deref(),
    ));
    field(&opt_list(show.llm_categories.as_ref()));
    field(&opt_list(show.user_categories.as_ref()));
    field(&opt(show.source_image_path.as_deref()));
    field(show.date_added.as_bytes());
    field(show.last_updated.as_bytes());
}
