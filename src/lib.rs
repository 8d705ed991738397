//! # Stagebill
//!
//! A personal Broadway show catalog. Shows enter the catalog by hand
//! (`add`) or from photographed playbills (`scan`), get fleshed out with
//! LLM-fetched metadata (`enrich`), and are published as a static HTML site
//! (`generate`).
//!
//! # Architecture: Catalog → Snapshot → Site
//!
//! ```text
//! 1. Ingest    add / scan / update / enrich  →  shows.db  (SQLite)
//! 2. Snapshot  fetch_all_shows()             →  Vec<ShowRecord>
//! 3. Publish   generate                      →  site/     (static HTML)
//! ```
//!
//! The boundary between 2 and 3 is deliberate: the site generator consumes
//! a fully materialized, read-only snapshot and owns nothing but its output
//! directory and a small state file. It never talks to the store beyond
//! `fetch_all_shows`, never mutates a record, and decides for itself
//! whether anything changed since the last run (content digest), so
//! `generate` on an unchanged catalog is a no-op.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`db`] | SQLite store: shows table, processed-image ledger, filtered search |
//! | [`catalog`] | Duplicate-checked adds, updates, fill-only-missing enrichment |
//! | [`llm`] | Provider capability (extract / enrich / match) over Anthropic or OpenAI |
//! | [`scan`] | Playbill photo directories → extracted shows |
//! | [`aggregate`] | Snapshot → theater/genre/category groups, timeline, stats |
//! | [`digest`] | Content digest + persisted site state for change detection |
//! | [`generate`] | Aggregates → staged Maud pages → atomic per-file writes |
//! | [`naming`] | Display names → stable filesystem slugs |
//! | [`themes`] | Fine-grained themes → major theme buckets |
//! | [`export`] | Catalog dumps to JSON and CSV |
//! | [`config`] | `stagebill.toml` loading, validation, stock config |
//! | [`types`] | `ShowRecord` and friends, shared by everything above |
//! | [`output`] | CLI output formatting — pure `format_*`, thin `print_*` |
//!
//! # Design Decisions
//!
//! ## Digest-Gated Regeneration
//!
//! The generator hashes the whole snapshot (sorted by id, every field) and
//! compares against the digest persisted by the last successful run. Match
//! means stop before touching the filesystem; mismatch (or `--force`, or a
//! missing/corrupt state file) means re-render everything. The digest is
//! written only after all pages are on disk, so a crash mid-render can
//! never record state describing output that was never written.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/), a compile-time
//! HTML macro system: malformed markup is a build error, interpolation is
//! auto-escaped, and there is no template directory to ship or get out of
//! sync.
//!
//! ## Absence Is Typed
//!
//! Enrichable fields are `Option`s all the way down, and list fields are
//! `Option<Vec<String>>`: "never enriched" (`None`) and "enriched, empty
//! answer" (`Some(vec![])`) are different values, survive the store
//! round-trip, and hash differently in the digest.
//!
//! ## Providers Are a Capability, Not a Hierarchy
//!
//! The catalog needs exactly three things from a language model — read a
//! playbill, fetch metadata, match categories — so that is the whole
//! [`llm::Provider`] trait. Anthropic and OpenAI are two structs
//! implementing it; picking one is a config string.

pub mod aggregate;
pub mod catalog;
pub mod config;
pub mod db;
pub mod digest;
pub mod export;
pub mod generate;
pub mod llm;
pub mod naming;
pub mod output;
pub mod scan;
pub mod themes;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
