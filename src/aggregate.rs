//! Derived views over the record snapshot.
//!
//! The site is a fixed set of cross-cutting views — by theater, by genre, by
//! category, by month attended — plus global statistics. All of them are
//! recomputed from scratch on every regeneration; nothing here is cached or
//! incremental.
//!
//! Determinism is a hard requirement: for a fixed snapshot, every grouping
//! and ordering must come out identical on every run, or regeneration would
//! rewrite byte-different pages for unchanged data. Groups are accumulated
//! in `BTreeMap`s (sorted keys, no hash-iteration artifacts) and members are
//! explicitly sorted with id tiebreaks.
//!
//! Groups refer to records by index into the snapshot slice, so the caller
//! keeps one `Vec<ShowRecord>` and everything else borrows from it.

use crate::types::{SeenStatus, ShowRecord};
use std::collections::BTreeMap;

/// One named group (a theater, a genre, or a category) and its members.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub name: String,
    /// Indices into the snapshot, sorted date-attended descending, absent
    /// dates last, id ascending on ties.
    pub members: Vec<usize>,
    /// Mean over members with a valid rating. `None` when none are rated —
    /// never zero.
    pub avg_rating: Option<f64>,
}

impl Group {
    pub fn count(&self) -> usize {
        self.members.len()
    }
}

/// One (year, month) bucket of attended shows.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineBucket {
    pub year: i32,
    /// 1–12.
    pub month: u32,
    /// Indices into the snapshot, date ascending, id ascending on ties.
    pub entries: Vec<usize>,
}

impl TimelineBucket {
    pub fn month_name(&self) -> &'static str {
        const MONTHS: [&str; 12] = [
            "January", "February", "March", "April", "May", "June", "July", "August",
            "September", "October", "November", "December",
        ];
        MONTHS[(self.month as usize).saturating_sub(1).min(11)]
    }
}

/// Global statistics for the dashboard.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stats {
    pub total: usize,
    pub seen: usize,
    pub wishlist: usize,
    /// Mean rating over rated **seen** shows only.
    pub avg_rating: Option<f64>,
    pub theater_count: usize,
    /// (year, shows attended that year), chronological.
    pub per_year: Vec<(i32, usize)>,
}

/// Everything the page renderer needs, derived in one pass.
#[derive(Debug, Clone, Default)]
pub struct Aggregates {
    /// Sorted by theater name (case-sensitive, byte order).
    pub theaters: Vec<Group>,
    /// Sorted by genre name. Records without a genre appear in no genre
    /// group but still count everywhere else.
    pub genres: Vec<Group>,
    /// Union of LLM and user categories, sorted by name; a record lists
    /// under every category it holds.
    pub categories: Vec<Group>,
    /// Chronological (year, month) buckets; dateless records never appear.
    pub timeline: Vec<TimelineBucket>,
    pub stats: Stats,
    /// Data-quality warnings (e.g. out-of-range ratings). Reported, never
    /// fatal.
    pub warnings: Vec<String>,
}

/// Derive all views from a snapshot.
pub fn aggregate(shows: &[ShowRecord]) -> Aggregates {
    let mut warnings = Vec::new();

    // Out-of-range ratings participate in groupings but are excluded from
    // every statistic. One warning per offending record.
    for show in shows {
        if let Some(r) = show.rating
            && !(1..=10).contains(&r)
        {
            warnings.push(format!(
                "show {} ({:?}) has rating {} outside 1-10; excluded from statistics",
                show.id, show.show_name, r
            ));
        }
    }

    let mut theaters: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    let mut genres: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    let mut categories: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    let mut buckets: BTreeMap<(i32, u32), Vec<usize>> = BTreeMap::new();
    let mut per_year: BTreeMap<i32, usize> = BTreeMap::new();

    for (idx, show) in shows.iter().enumerate() {
        theaters
            .entry(show.theater_name.clone())
            .or_default()
            .push(idx);

        if let Some(genre) = &show.genre
            && !genre.is_empty()
        {
            genres.entry(genre.clone()).or_default().push(idx);
        }

        for category in show.all_categories() {
            categories.entry(category.to_string()).or_default().push(idx);
        }

        if let Some(date) = show.date_attended {
            use chrono::Datelike;
            buckets
                .entry((date.year(), date.month()))
                .or_default()
                .push(idx);
            *per_year.entry(date.year()).or_default() += 1;
        }
    }

    let theaters = finish_groups(theaters, shows);
    let genres = finish_groups(genres, shows);
    let categories = finish_groups(categories, shows);

    let timeline = buckets
        .into_iter()
        .map(|((year, month), mut entries)| {
            entries.sort_by_key(|&i| (shows[i].date_attended, shows[i].id));
            TimelineBucket {
                year,
                month,
                entries,
            }
        })
        .collect();

    let seen = shows
        .iter()
        .filter(|s| s.seen_status == SeenStatus::Seen)
        .count();
    let seen_ratings: Vec<i64> = shows
        .iter()
        .filter(|s| s.seen_status == SeenStatus::Seen && s.has_valid_rating())
        .map(|s| s.rating.unwrap_or_default())
        .collect();

    let stats = Stats {
        total: shows.len(),
        seen,
        wishlist: shows.len() - seen,
        avg_rating: mean(&seen_ratings),
        theater_count: theaters.len(),
        per_year: per_year.into_iter().collect(),
    };

    Aggregates {
        theaters,
        genres,
        categories,
        timeline,
        stats,
        warnings,
    }
}

/// Sort each group's members (date descending, absent last, id tiebreak),
/// compute the average rating, and emit groups in key order.
fn finish_groups(map: BTreeMap<String, Vec<usize>>, shows: &[ShowRecord]) -> Vec<Group> {
    map.into_iter()
        .map(|(name, mut members)| {
            members.sort_by(|&a, &b| {
                // Reverse on the date only: absent (None) sorts after any
                // Some under reversed Option ordering comparison below.
                let da = shows[a].date_attended;
                let db = shows[b].date_attended;
                match (da, db) {
                    (Some(x), Some(y)) => y.cmp(&x),
                    (Some(_), None) => std::cmp::Ordering::Less,
                    (None, Some(_)) => std::cmp::Ordering::Greater,
                    (None, None) => std::cmp::Ordering::Equal,
                }
                .then(shows[a].id.cmp(&shows[b].id))
            });
            let ratings: Vec<i64> = members
                .iter()
                .filter(|&&i| shows[i].has_valid_rating())
                .map(|&i| shows[i].rating.unwrap_or_default())
                .collect();
            Group {
                name,
                avg_rating: mean(&ratings),
                members,
            }
        })
        .collect()
}

fn mean(values: &[i64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<i64>() as f64 / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::record;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    // =========================================================================
    // Theater grouping
    // =========================================================================

    #[test]
    fn theater_groups_count_and_average() {
        let mut a1 = record(1, "Show One", "A");
        a1.rating = Some(8);
        let mut a2 = record(2, "Show Two", "A");
        a2.rating = Some(10);
        let b = record(3, "Show Three", "B");

        let agg = aggregate(&[a1, a2, b]);
        assert_eq!(agg.theaters.len(), 2);

        let group_a = &agg.theaters[0];
        assert_eq!(group_a.name, "A");
        assert_eq!(group_a.count(), 2);
        assert_eq!(group_a.avg_rating, Some(9.0));

        let group_b = &agg.theaters[1];
        assert_eq!(group_b.count(), 1);
        assert_eq!(group_b.avg_rating, None); // not 0
    }

    #[test]
    fn theater_names_are_case_sensitive() {
        let shows = vec![
            record(1, "One", "Majestic Theatre"),
            record(2, "Two", "majestic theatre"),
        ];
        let agg = aggregate(&shows);
        assert_eq!(agg.theaters.len(), 2);
    }

    #[test]
    fn theater_members_sorted_date_desc_absent_last() {
        let mut early = record(1, "Early", "A");
        early.date_attended = date(2023, 1, 1);
        let mut late = record(2, "Late", "A");
        late.date_attended = date(2024, 6, 1);
        let undated = record(3, "Undated", "A");

        let agg = aggregate(&[early, late, undated]);
        assert_eq!(agg.theaters[0].members, vec![1, 0, 2]);
    }

    // =========================================================================
    // Genre and category grouping
    // =========================================================================

    #[test]
    fn absent_genre_excluded_from_genre_views_only() {
        let mut musical = record(1, "One", "A");
        musical.genre = Some("Musical".into());
        let plain = record(2, "Two", "B");

        let agg = aggregate(&[musical, plain]);
        assert_eq!(agg.genres.len(), 1);
        assert_eq!(agg.genres[0].name, "Musical");
        assert_eq!(agg.genres[0].members, vec![0]);
        // Still present in global views
        assert_eq!(agg.stats.total, 2);
        assert_eq!(agg.theaters.len(), 2);
    }

    #[test]
    fn no_records_with_genre_means_no_genre_groups() {
        let agg = aggregate(&[record(1, "One", "A")]);
        assert!(agg.genres.is_empty());
    }

    #[test]
    fn categories_union_llm_and_user_many_to_many() {
        let mut show = record(1, "One", "A");
        show.llm_categories = Some(vec!["jukebox musical".into()]);
        show.user_categories = Some(vec!["date night".into(), "jukebox musical".into()]);
        let mut other = record(2, "Two", "B");
        other.user_categories = Some(vec!["date night".into()]);

        let agg = aggregate(&[show, other]);
        let names: Vec<&str> = agg.categories.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["date night", "jukebox musical"]);

        let date_night = &agg.categories[0];
        assert_eq!(date_night.members, vec![0, 1]);
        let jukebox = &agg.categories[1];
        assert_eq!(jukebox.members, vec![0]); // listed once despite two sources
    }

    // =========================================================================
    // Timeline
    // =========================================================================

    #[test]
    fn timeline_buckets_by_year_month() {
        let mut jan15 = record(1, "Mid January", "A");
        jan15.date_attended = date(2024, 1, 15);
        let mut jan20 = record(2, "Late January", "B");
        jan20.date_attended = date(2024, 1, 20);
        let mut feb = record(3, "February", "C");
        feb.date_attended = date(2024, 2, 2);
        let undated = record(4, "Undated", "D");

        let agg = aggregate(&[jan20.clone(), feb, jan15, undated]);
        assert_eq!(agg.timeline.len(), 2);

        let january = &agg.timeline[0];
        assert_eq!((january.year, january.month), (2024, 1));
        assert_eq!(january.month_name(), "January");
        // Date ascending within the bucket: the 15th before the 20th
        assert_eq!(january.entries, vec![2, 0]);

        let february = &agg.timeline[1];
        assert_eq!((february.year, february.month), (2024, 2));

        // Undated record appears in no bucket
        let all: Vec<usize> = agg.timeline.iter().flat_map(|b| b.entries.clone()).collect();
        assert!(!all.contains(&3));
    }

    #[test]
    fn timeline_same_date_ties_break_by_id() {
        let mut a = record(7, "Seven", "A");
        a.date_attended = date(2024, 5, 5);
        let mut b = record(3, "Three", "B");
        b.date_attended = date(2024, 5, 5);

        let agg = aggregate(&[a, b]);
        // Index 1 holds id 3, which sorts first
        assert_eq!(agg.timeline[0].entries, vec![1, 0]);
    }

    #[test]
    fn timeline_buckets_chronological_across_years() {
        let mut d23 = record(1, "Dec 23", "A");
        d23.date_attended = date(2023, 12, 1);
        let mut j24 = record(2, "Jan 24", "B");
        j24.date_attended = date(2024, 1, 1);

        let agg = aggregate(&[j24, d23]);
        assert_eq!(
            agg.timeline.iter().map(|b| (b.year, b.month)).collect::<Vec<_>>(),
            vec![(2023, 12), (2024, 1)]
        );
    }

    // =========================================================================
    // Stats
    // =========================================================================

    #[test]
    fn stats_counts_and_mean_over_rated_seen_only() {
        let mut seen_rated = record(1, "One", "A");
        seen_rated.seen_status = SeenStatus::Seen;
        seen_rated.rating = Some(8);
        let mut seen_unrated = record(2, "Two", "B");
        seen_unrated.seen_status = SeenStatus::Seen;
        let mut wishlist_rated = record(3, "Three", "C");
        wishlist_rated.rating = Some(2); // wishlist rating must not count

        let agg = aggregate(&[seen_rated, seen_unrated, wishlist_rated]);
        assert_eq!(agg.stats.total, 3);
        assert_eq!(agg.stats.seen, 2);
        assert_eq!(agg.stats.wishlist, 1);
        assert_eq!(agg.stats.avg_rating, Some(8.0));
        assert_eq!(agg.stats.theater_count, 3);
    }

    #[test]
    fn stats_no_rated_seen_shows_means_no_average() {
        let agg = aggregate(&[record(1, "One", "A")]);
        assert_eq!(agg.stats.avg_rating, None);
    }

    #[test]
    fn per_year_counts() {
        let mut a = record(1, "One", "A");
        a.date_attended = date(2023, 3, 1);
        let mut b = record(2, "Two", "B");
        b.date_attended = date(2023, 9, 1);
        let mut c = record(3, "Three", "C");
        c.date_attended = date(2024, 1, 1);

        let agg = aggregate(&[a, b, c]);
        assert_eq!(agg.stats.per_year, vec![(2023, 2), (2024, 1)]);
    }

    // =========================================================================
    // Malformed records
    // =========================================================================

    #[test]
    fn out_of_range_rating_warns_and_is_excluded() {
        let mut good = record(1, "Good", "A");
        good.seen_status = SeenStatus::Seen;
        good.rating = Some(8);
        let mut bad = record(2, "Bad", "A");
        bad.seen_status = SeenStatus::Seen;
        bad.rating = Some(42);

        let agg = aggregate(&[good, bad]);
        assert_eq!(agg.warnings.len(), 1);
        assert!(agg.warnings[0].contains("42"));
        // Excluded from both global and group averages, but still a member
        assert_eq!(agg.stats.avg_rating, Some(8.0));
        assert_eq!(agg.theaters[0].avg_rating, Some(8.0));
        assert_eq!(agg.theaters[0].count(), 2);
    }

    #[test]
    fn determinism_across_repeated_invocations() {
        let mut shows = Vec::new();
        for i in 0..20 {
            let mut s = record(i, &format!("Show {}", i % 7), &format!("Theater {}", i % 3));
            if i % 2 == 0 {
                s.date_attended = date(2020 + (i as i32 % 4), 1 + (i as u32 % 12), 1);
            }
            if i % 3 == 0 {
                s.genre = Some(format!("Genre {}", i % 2));
            }
            shows.push(s);
        }

        let a = aggregate(&shows);
        let b = aggregate(&shows);
        assert_eq!(a.theaters, b.theaters);
        assert_eq!(a.genres, b.genres);
        assert_eq!(a.categories, b.categories);
        assert_eq!(a.timeline, b.timeline);
        assert_eq!(a.stats, b.stats);
    }
}
