//! Static site generation.
//!
//! Takes the record snapshot and produces the published HTML tree:
//!
//! ```text
//! site/
//! ├── index.html                 # Dashboard: stats, years, highlights
//! ├── timeline.html              # Attended shows by (year, month)
//! ├── shows.html                 # Flat listing of every show
//! ├── shows/
//! │   └── hadestown.html         # One detail page per show
//! ├── theaters/
//! │   ├── index.html
//! │   └── walter-kerr-theatre.html
//! ├── genres/
//! │   ├── index.html
//! │   └── musical.html
//! ├── categories/
//! │   ├── index.html
//! │   └── jukebox-musical.html
//! └── .stagebill-state.json      # Digest of the rendered snapshot
//! ```
//!
//! ## Regeneration discipline
//!
//! The run is a short pipeline with one early exit:
//!
//! ```text
//! CHECK_STALENESS → (unchanged: stop) | AGGREGATE → RENDER → WRITE → PERSIST_DIGEST
//! ```
//!
//! - Staleness is decided by comparing [`digest::hash_shows`] against the
//!   persisted state; `force` overrides the comparison, never the digest.
//! - Rendering completes fully in memory before the first write, and each
//!   file is committed via write-to-temp + rename, so a failure partway
//!   through never leaves a half-written document.
//! - The state file is persisted only after every write succeeded. A failed
//!   run keeps the old state, and the next run retries from AGGREGATE.
//!
//! Section indexes (theaters, genres, categories) are omitted entirely when
//! they would be empty — no page, no nav link — so the site never contains
//! a link to a page listing nothing.
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Templates are type-safe Rust code with automatic XSS escaping.

use crate::aggregate::{self, Aggregates, Group};
use crate::digest::{self, STATE_FILENAME, SiteState};
use crate::naming::SlugSet;
use crate::themes;
use crate::types::{SeenStatus, ShowRecord};
use chrono::Utc;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

const CSS: &str = include_str!("../static/style.css");

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("output write failure: {0}")]
    Write(#[from] io::Error),
}

/// Explicit renderer configuration, passed in per invocation. No ambient
/// globals: everything the run needs to know is here.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub output_dir: PathBuf,
    /// Where the digest state lives. Defaults to inside the output
    /// directory so the state travels with the published tree.
    pub state_path: PathBuf,
    /// Regenerate even when the digest says nothing changed.
    pub force: bool,
}

impl RenderOptions {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        let output_dir = output_dir.into();
        let state_path = output_dir.join(STATE_FILENAME);
        Self {
            output_dir,
            state_path,
            force: false,
        }
    }
}

/// What a `generate` invocation did.
#[derive(Debug)]
pub enum GenerateOutcome {
    /// Digest matched the previous run; zero filesystem writes happened.
    Unchanged,
    Generated(GenerateSummary),
}

#[derive(Debug)]
pub struct GenerateSummary {
    pub pages_written: usize,
    pub digest: String,
    /// Data-quality warnings from aggregation, for the caller to report.
    pub warnings: Vec<String>,
}

/// A fully rendered page, staged in memory until the write phase.
struct RenderedPage {
    /// Path relative to the output directory.
    path: PathBuf,
    html: String,
}

/// Run the regeneration pipeline over a snapshot.
pub fn generate(
    shows: &[ShowRecord],
    opts: &RenderOptions,
) -> Result<GenerateOutcome, GenerateError> {
    let current = digest::hash_shows(shows);
    let state = SiteState::load(&opts.state_path);

    if !opts.force && state.digest.as_deref() == Some(current.as_str()) {
        return Ok(GenerateOutcome::Unchanged);
    }

    let aggregates = aggregate::aggregate(shows);
    let pages = render_site(shows, &aggregates);

    // All pages exist in memory before the first byte hits disk.
    fs::create_dir_all(&opts.output_dir)?;
    for page in &pages {
        write_page(&opts.output_dir, page)?;
    }

    let state = SiteState {
        digest: Some(current.clone()),
        generated_at: Some(Utc::now().to_rfc3339()),
        ..SiteState::empty()
    };
    state.save(&opts.state_path)?;

    Ok(GenerateOutcome::Generated(GenerateSummary {
        pages_written: pages.len(),
        digest: current,
        warnings: aggregates.warnings,
    }))
}

/// Commit one page: write to a temp name, then rename into place, so a
/// document is never observable half-written.
fn write_page(output_dir: &Path, page: &RenderedPage) -> io::Result<()> {
    let final_path = output_dir.join(&page.path);
    if let Some(parent) = final_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = final_path.with_extension("html.tmp");
    fs::write(&tmp_path, &page.html)?;
    fs::rename(&tmp_path, &final_path)?;
    Ok(())
}

// ============================================================================
// Site assembly
// ============================================================================

/// Which optional sections exist, for nav rendering.
#[derive(Debug, Clone, Copy)]
struct Sections {
    theaters: bool,
    genres: bool,
    categories: bool,
}

/// Render every page of the site into memory, deterministically.
fn render_site(shows: &[ShowRecord], agg: &Aggregates) -> Vec<RenderedPage> {
    let sections = Sections {
        theaters: !agg.theaters.is_empty(),
        genres: !agg.genres.is_empty(),
        categories: !agg.categories.is_empty(),
    };

    // Show slugs are assigned in id order so they are stable across runs
    // for a fixed input set.
    let mut show_order: Vec<usize> = (0..shows.len()).collect();
    show_order.sort_by_key(|&i| shows[i].id);
    let mut slugs = SlugSet::new();
    let mut show_slugs: Vec<String> = vec![String::new(); shows.len()];
    for &i in &show_order {
        show_slugs[i] = slugs.assign(&shows[i].show_name);
    }

    // Group slugs are assigned in sorted-name order (the order aggregation
    // emits groups), also deterministic.
    let theater_slugs = assign_group_slugs(&agg.theaters);
    let genre_slugs = assign_group_slugs(&agg.genres);
    let category_slugs = assign_group_slugs(&agg.categories);

    let mut pages = Vec::new();

    pages.push(RenderedPage {
        path: PathBuf::from("index.html"),
        html: render_dashboard(shows, agg, sections, &show_slugs).into_string(),
    });
    pages.push(RenderedPage {
        path: PathBuf::from("timeline.html"),
        html: render_timeline(shows, agg, sections, &show_slugs).into_string(),
    });
    pages.push(RenderedPage {
        path: PathBuf::from("shows.html"),
        html: render_show_listing(shows, sections, &show_slugs).into_string(),
    });

    for (dir, title, groups, group_slugs) in [
        ("theaters", "Theaters", &agg.theaters, &theater_slugs),
        ("genres", "Genres", &agg.genres, &genre_slugs),
        ("categories", "Categories", &agg.categories, &category_slugs),
    ] {
        if groups.is_empty() {
            continue;
        }
        pages.push(RenderedPage {
            path: PathBuf::from(dir).join("index.html"),
            html: render_group_index(title, groups, group_slugs, sections).into_string(),
        });
        for group in groups {
            pages.push(RenderedPage {
                path: PathBuf::from(dir).join(format!("{}.html", group_slugs[&group.name])),
                html: render_group_detail(title, group, shows, sections, &show_slugs)
                    .into_string(),
            });
        }
    }

    for (i, show) in shows.iter().enumerate() {
        pages.push(RenderedPage {
            path: PathBuf::from("shows").join(format!("{}.html", show_slugs[i])),
            html: render_show_detail(
                show,
                sections,
                &theater_slugs,
                &genre_slugs,
                &category_slugs,
            )
            .into_string(),
        });
    }

    pages
}

fn assign_group_slugs(groups: &[Group]) -> BTreeMap<String, String> {
    let mut slugs = SlugSet::new();
    // The section index occupies index.html in each group directory, so a
    // group literally named "Index" must not claim that filename.
    slugs.assign("index");
    groups
        .iter()
        .map(|g| (g.name.clone(), slugs.assign(&g.name)))
        .collect()
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure.
fn base_document(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(CSS)) }
            }
            body {
                (content)
                footer { "Generated by stagebill" }
            }
        }
    }
}

/// Renders the site header with breadcrumb and navigation.
fn site_header(breadcrumb: Markup, nav: Markup) -> Markup {
    html! {
        header.site-header {
            nav.breadcrumb { (breadcrumb) }
            nav.site-nav { (nav) }
        }
    }
}

/// Top navigation. `prefix` is the relative path back to the output root
/// ("" on root pages, "../" one level down) — all links stay relative so
/// the tree is servable straight from the filesystem.
fn render_nav(prefix: &str, sections: Sections) -> Markup {
    html! {
        a href={ (prefix) "index.html" } { "Dashboard" }
        a href={ (prefix) "timeline.html" } { "Timeline" }
        a href={ (prefix) "shows.html" } { "All Shows" }
        @if sections.theaters {
            a href={ (prefix) "theaters/index.html" } { "Theaters" }
        }
        @if sections.genres {
            a href={ (prefix) "genres/index.html" } { "Genres" }
        }
        @if sections.categories {
            a href={ (prefix) "categories/index.html" } { "Categories" }
        }
    }
}

fn status_badge(status: SeenStatus) -> Markup {
    html! {
        span class={ "status " (status.as_str()) } { (status.as_str()) }
    }
}

fn rating_markup(rating: i64) -> Markup {
    let clamped = rating.clamp(0, 10) as usize;
    html! {
        span.rating {
            ("★".repeat(clamped))
            ("☆".repeat(10 - clamped))
            " " (rating) "/10"
        }
    }
}

/// One line in a show list: name, theater, badge, date, rating.
fn show_line(show: &ShowRecord, slug: &str, prefix: &str) -> Markup {
    html! {
        li {
            a href={ (prefix) "shows/" (slug) ".html" } { (show.show_name) }
            " "
            span.theater { (show.theater_name) }
            " "
            (status_badge(show.seen_status))
            @if let Some(date) = show.date_attended {
                " " (date.to_string())
            }
            @if show.has_valid_rating() {
                " " (rating_markup(show.rating.unwrap_or_default()))
            }
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

fn render_dashboard(
    shows: &[ShowRecord],
    agg: &Aggregates,
    sections: Sections,
    show_slugs: &[String],
) -> Markup {
    let nav = render_nav("", sections);
    let breadcrumb = html! { "Dashboard" };

    // Most recently attended shows, read off the tail of the timeline.
    let recent: Vec<usize> = agg
        .timeline
        .iter()
        .rev()
        .flat_map(|b| b.entries.iter().rev().copied())
        .take(5)
        .collect();

    // Major-theme roll-up across the whole catalog, most common first,
    // alphabetical on ties.
    let mut theme_counts: Vec<(&'static str, usize)> = Vec::new();
    for show in shows {
        if let Some(major) = show.themes.as_deref().and_then(themes::major_theme) {
            match theme_counts.iter_mut().find(|(m, _)| *m == major) {
                Some((_, n)) => *n += 1,
                None => theme_counts.push((major, 1)),
            }
        }
    }
    theme_counts.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

    let content = html! {
        (site_header(breadcrumb, nav))
        main {
            h1 { "Broadway Catalog" }
            div.stats {
                div.stat {
                    div.stat-value { (agg.stats.total) }
                    div.stat-label { "Shows" }
                }
                div.stat {
                    div.stat-value { (agg.stats.seen) }
                    div.stat-label { "Seen" }
                }
                div.stat {
                    div.stat-value { (agg.stats.wishlist) }
                    div.stat-label { "Wishlist" }
                }
                div.stat {
                    div.stat-value {
                        @match agg.stats.avg_rating {
                            Some(avg) => { (format!("{:.1}", avg)) }
                            None => { "–" }
                        }
                    }
                    div.stat-label { "Avg Rating" }
                }
                div.stat {
                    div.stat-value { (agg.stats.theater_count) }
                    div.stat-label { "Theaters" }
                }
            }
            @if !agg.stats.per_year.is_empty() {
                h2 { "Shows per year" }
                table.group-table {
                    tr { th { "Year" } th { "Shows attended" } }
                    @for (year, count) in &agg.stats.per_year {
                        tr { td { (year) } td { (count) } }
                    }
                }
            }
            @if !theme_counts.is_empty() {
                h2 { "Major themes" }
                table.group-table {
                    tr { th { "Theme" } th { "Shows" } }
                    @for (theme, count) in &theme_counts {
                        tr { td { (theme) } td { (count) } }
                    }
                }
            }
            @if !recent.is_empty() {
                h2 { "Recently attended" }
                ul.show-list {
                    @for &i in &recent {
                        (show_line(&shows[i], &show_slugs[i], ""))
                    }
                }
            }
        }
    };

    base_document("Broadway Catalog", content)
}

fn render_timeline(
    shows: &[ShowRecord],
    agg: &Aggregates,
    sections: Sections,
    show_slugs: &[String],
) -> Markup {
    let nav = render_nav("", sections);
    let breadcrumb = html! {
        a href="index.html" { "Dashboard" }
        " › Timeline"
    };

    let content = html! {
        (site_header(breadcrumb, nav))
        main {
            h1 { "Timeline" }
            @if agg.timeline.is_empty() {
                p { "No shows attended yet." }
            }
            @for bucket in &agg.timeline {
                section.timeline-bucket {
                    h2 { (bucket.month_name()) " " (bucket.year) }
                    ul.show-list {
                        @for &i in &bucket.entries {
                            (show_line(&shows[i], &show_slugs[i], ""))
                        }
                    }
                }
            }
        }
    };

    base_document("Timeline", content)
}

fn render_show_listing(
    shows: &[ShowRecord],
    sections: Sections,
    show_slugs: &[String],
) -> Markup {
    let nav = render_nav("", sections);
    let breadcrumb = html! {
        a href="index.html" { "Dashboard" }
        " › All Shows"
    };

    let mut order: Vec<usize> = (0..shows.len()).collect();
    order.sort_by(|&a, &b| {
        shows[a]
            .show_name
            .cmp(&shows[b].show_name)
            .then(shows[a].id.cmp(&shows[b].id))
    });

    let content = html! {
        (site_header(breadcrumb, nav))
        main {
            h1 { "All Shows" }
            @if shows.is_empty() {
                p { "The catalog is empty." }
            } @else {
                ul.show-list {
                    @for &i in &order {
                        (show_line(&shows[i], &show_slugs[i], ""))
                    }
                }
            }
        }
    };

    base_document("All Shows", content)
}

/// Index page for theaters, genres, or categories.
fn render_group_index(
    title: &str,
    groups: &[Group],
    group_slugs: &BTreeMap<String, String>,
    sections: Sections,
) -> Markup {
    let nav = render_nav("../", sections);
    let breadcrumb = html! {
        a href="../index.html" { "Dashboard" }
        " › " (title)
    };

    let content = html! {
        (site_header(breadcrumb, nav))
        main {
            h1 { (title) }
            table.group-table {
                tr { th { "Name" } th { "Shows" } th { "Avg rating" } }
                @for group in groups {
                    tr {
                        td {
                            a href={ (group_slugs[&group.name]) ".html" } { (group.name) }
                        }
                        td { (group.count()) }
                        td {
                            @match group.avg_rating {
                                Some(avg) => { (format!("{:.1}", avg)) }
                                None => { "–" }
                            }
                        }
                    }
                }
            }
        }
    };

    base_document(title, content)
}

/// Detail page for one theater, genre, or category: its shows, most recent
/// first.
fn render_group_detail(
    parent_title: &str,
    group: &Group,
    shows: &[ShowRecord],
    sections: Sections,
    show_slugs: &[String],
) -> Markup {
    let nav = render_nav("../", sections);
    let breadcrumb = html! {
        a href="../index.html" { "Dashboard" }
        " › "
        a href="index.html" { (parent_title) }
        " › " (group.name)
    };

    let content = html! {
        (site_header(breadcrumb, nav))
        main {
            h1 { (group.name) }
            p {
                (group.count()) " show" @if group.count() != 1 { "s" }
                @if let Some(avg) = group.avg_rating {
                    ", average rating " (format!("{:.1}", avg))
                }
            }
            ul.show-list {
                @for &i in &group.members {
                    (show_line(&shows[i], &show_slugs[i], "../"))
                }
            }
        }
    };

    base_document(&group.name, content)
}

/// A labeled metadata row, omitted entirely when the value is absent.
fn meta_row(label: &str, value: Option<&str>) -> Markup {
    html! {
        @if let Some(value) = value {
            div.meta-row {
                span.label { (label) }
                (value)
            }
        }
    }
}

fn meta_list(label: &str, values: Option<&Vec<String>>) -> Markup {
    match values {
        Some(values) if !values.is_empty() => html! {
            div.meta-row {
                span.label { (label) }
                (values.join(", "))
            }
        },
        _ => html! {},
    }
}

fn render_show_detail(
    show: &ShowRecord,
    sections: Sections,
    theater_slugs: &BTreeMap<String, String>,
    genre_slugs: &BTreeMap<String, String>,
    category_slugs: &BTreeMap<String, String>,
) -> Markup {
    let nav = render_nav("../", sections);
    let breadcrumb = html! {
        a href="../index.html" { "Dashboard" }
        " › "
        a href="../shows.html" { "All Shows" }
        " › " (show.show_name)
    };

    let major = show
        .themes
        .as_deref()
        .and_then(|t| themes::major_theme(t));

    let content = html! {
        (site_header(breadcrumb, nav))
        main {
            h1 { (show.show_name) }
            p {
                @match theater_slugs.get(&show.theater_name) {
                    Some(slug) => {
                        a href={ "../theaters/" (slug) ".html" } { (show.theater_name) }
                    }
                    None => { (show.theater_name) }
                }
                " "
                (status_badge(show.seen_status))
                @if let Some(date) = show.date_attended {
                    " · attended " (date.to_string())
                }
                @if show.has_valid_rating() {
                    " · " (rating_markup(show.rating.unwrap_or_default()))
                }
            }

            @if let Some(genre) = &show.genre {
                div.meta-row {
                    span.label { "Genre" }
                    @match genre_slugs.get(genre) {
                        Some(slug) => {
                            a href={ "../genres/" (slug) ".html" } { (genre) }
                        }
                        None => { (genre) }
                    }
                }
            }
            @if !show.all_categories().is_empty() {
                div.meta-row {
                    span.label { "Categories" }
                    @for (pos, category) in show.all_categories().iter().enumerate() {
                        @if pos > 0 { ", " }
                        @match category_slugs.get(*category) {
                            Some(slug) => {
                                a href={ "../categories/" (slug) ".html" } { (category) }
                            }
                            None => { (category) }
                        }
                    }
                }
            }

            (meta_row("Plot", show.plot_summary.as_deref()))
            (meta_row("Production type", show.production_type.as_deref()))
            @if show.is_revival == Some(true) {
                div.meta-row {
                    span.label { "Revival" }
                    @match show.original_production_year {
                        Some(year) => { "originally produced " (year) }
                        None => { "yes" }
                    }
                }
            }
            (meta_row("Opened", show.opening_date.as_deref()))
            (meta_row("Closed", show.closing_date.as_deref()))
            @if let Some(minutes) = show.running_time {
                div.meta-row {
                    span.label { "Running time" }
                    (minutes) " minutes"
                    @if let Some(count) = show.intermission_count {
                        " (" (count) " intermission" @if count != 1 { "s" } ")"
                    }
                }
            }

            (meta_row("Director", show.director.as_deref()))
            (meta_row("Choreographer", show.choreographer.as_deref()))
            (meta_row("Composer", show.composer.as_deref()))
            (meta_row("Lyricist", show.lyricist.as_deref()))
            (meta_row("Book", show.book_writer.as_deref()))
            (meta_list("Lead cast", show.lead_cast.as_ref()))
            (meta_list("Tony Awards", show.tony_awards.as_ref()))
            (meta_list("Other awards", show.other_awards.as_ref()))

            @if let Some(songs) = show.musical_numbers.as_deref().filter(|s| !s.is_empty()) {
                div.meta-row {
                    span.label { "Musical numbers" }
                    ul.songs {
                        @for song in songs { li { (song) } }
                    }
                }
            }

            (meta_list("Themes", show.themes.as_ref()))
            (meta_row("Major theme", major))
            (meta_row("Notes", show.personal_notes.as_deref()))
        }
    };

    base_document(&show.show_name, content)
}

// ============================================================================
// Tests
// ============================================================================
