//! Playbill photo scanning and ingestion.
//!
//! The photo directories are the casual entry path into the catalog: drop a
//! picture of a playbill into `shows_seen/` or `shows_wishlist/`, run
//! `stagebill scan`, and the provider reads the show and theater names off
//! the image. Which directory a photo is in decides the initial seen
//! status of the shows extracted from it.
//!
//! Every successfully handled image lands in the store's processed-image
//! ledger and is skipped on later scans. An image the provider choked on is
//! NOT marked processed — it gets retried next scan — while an image that
//! legitimately contains no recognizable show is marked with a zero count
//! so it stops being retried.

use crate::catalog::{AddOutcome, Catalog, CatalogError};
use crate::db::{Store, StoreError};
use crate::llm::{Provider, media_type_for};
use crate::types::{NewShow, SeenStatus};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

/// Tally of one scan pass. Merged across directories by the CLI.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanReport {
    pub images_found: usize,
    pub images_processed: usize,
    pub shows_added: usize,
    pub duplicates: usize,
    /// Images the provider failed on; left unprocessed for the next scan.
    pub failures: usize,
}

impl ScanReport {
    pub fn merge(&mut self, other: &ScanReport) {
        self.images_found += other.images_found;
        self.images_processed += other.images_processed;
        self.shows_added += other.shows_added;
        self.duplicates += other.duplicates;
        self.failures += other.failures;
    }
}

/// Images in `dir` that match the configured extensions and are not in the
/// processed ledger, sorted by path for a deterministic scan order. A
/// missing directory is created, not an error.
pub fn find_unprocessed(
    dir: &Path,
    extensions: &[String],
    store: &Store,
) -> Result<Vec<PathBuf>, ScanError> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
        return Ok(Vec::new());
    }

    let mut images = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| ScanError::Io(e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.into_path();
        if !has_image_extension(&path, extensions) {
            continue;
        }
        if !store.is_image_processed(&path.to_string_lossy())? {
            images.push(path);
        }
    }
    Ok(images)
}

fn has_image_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    let dotted = format!(".{}", ext.to_lowercase());
    extensions.iter().any(|e| e.eq_ignore_ascii_case(&dotted))
}

/// Scan one directory: extract shows from each new image and ingest them
/// with the given status. Per-image provider failures are reported and
/// skipped; they never abort the pass.
pub fn scan_directory(
    dir: &Path,
    status: SeenStatus,
    extensions: &[String],
    store: &Store,
    catalog: &Catalog<'_>,
    provider: &dyn Provider,
) -> Result<ScanReport, ScanError> {
    let images = find_unprocessed(dir, extensions, store)?;
    let mut report = ScanReport {
        images_found: images.len(),
        ..Default::default()
    };

    for image_path in images {
        let bytes = fs::read(&image_path)?;
        let extracted = match provider.extract_shows(&bytes, media_type_for(&image_path)) {
            Ok(shows) => shows,
            Err(e) => {
                eprintln!(
                    "warning: could not read {}: {}",
                    image_path.display(),
                    e
                );
                report.failures += 1;
                continue;
            }
        };

        let mut added = 0i64;
        for show in &extracted {
            let new = NewShow {
                show_name: show.show_name.clone(),
                theater_name: show.theater_name.clone(),
                seen_status: Some(status),
                source_image_path: Some(image_path.to_string_lossy().into_owned()),
                ..Default::default()
            };
            match catalog.add_show(&new)? {
                AddOutcome::Added(_) => {
                    added += 1;
                    report.shows_added += 1;
                }
                AddOutcome::Duplicate(_) => report.duplicates += 1,
            }
        }

        store.mark_image_processed(&image_path.to_string_lossy(), added)?;
        report.images_processed += 1;
    }

    Ok(report)
}
