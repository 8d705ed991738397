//! Slug derivation for generated pages.
//!
//! Theater, genre, category, and show names become filesystem-safe slugs:
//! lowercased, with every run of non-alphanumeric characters collapsed to a
//! single `-`. The mapping is a pure function of the name, so regenerating
//! the site never renames files or breaks external bookmarks.
//!
//! Collisions ("Rock of Ages" vs "Rock of Ages!") are resolved by a
//! [`SlugSet`], which appends `-2`, `-3`, ... in assignment order. Callers
//! assign in a deterministic order (sorted names, or record id order) so the
//! suffixes are stable across runs for a fixed input set.

use std::collections::HashMap;

/// Derive a filesystem-safe slug from a display name.
///
/// - `"Richard Rodgers Theatre"` → `"richard-rodgers-theatre"`
/// - `"Ain't Too Proud"` → `"ain-t-too-proud"`
/// - `"  Golden Age!  Musical "` → `"golden-age-musical"`
/// - all-punctuation input → `"untitled"`
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_sep = false;
    for c in name.chars() {
        if c.is_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('-');
            }
            pending_sep = false;
            for lower in c.to_lowercase() {
                slug.push(lower);
            }
        } else {
            pending_sep = true;
        }
    }
    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug
    }
}

/// Assigns unique slugs within one namespace (one output directory).
///
/// The first claimant of a base slug gets it bare; later claimants get
/// `base-2`, `base-3`, ... Assignment order is the caller's responsibility
/// and must be deterministic.
#[derive(Debug, Default)]
pub struct SlugSet {
    taken: HashMap<String, u32>,
}

impl SlugSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive and claim a unique slug for `name`.
    pub fn assign(&mut self, name: &str) -> String {
        let base = slugify(name);
        match self.taken.get_mut(&base) {
            None => {
                self.taken.insert(base.clone(), 1);
                base
            }
            Some(count) => {
                *count += 1;
                let slug = format!("{}-{}", base, count);
                // The suffixed form itself occupies a slot, so a literal
                // "foo-2" arriving later still gets a fresh suffix.
                self.taken.insert(slug.clone(), 1);
                slug
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_theater_name() {
        assert_eq!(
            slugify("Richard Rodgers Theatre"),
            "richard-rodgers-theatre"
        );
    }

    #[test]
    fn apostrophes_become_separators() {
        assert_eq!(slugify("Ain't Too Proud"), "ain-t-too-proud");
    }

    #[test]
    fn runs_of_punctuation_collapse() {
        assert_eq!(slugify("  Golden Age!  Musical "), "golden-age-musical");
        assert_eq!(slugify("a - - b"), "a-b");
    }

    #[test]
    fn leading_and_trailing_separators_trimmed() {
        assert_eq!(slugify("...dots..."), "dots");
    }

    #[test]
    fn unicode_lowercases() {
        assert_eq!(slugify("Les Misérables"), "les-misérables");
    }

    #[test]
    fn all_punctuation_falls_back() {
        assert_eq!(slugify("!!!"), "untitled");
        assert_eq!(slugify(""), "untitled");
    }

    #[test]
    fn slug_is_stable_across_calls() {
        let a = slugify("Richard Rodgers Theatre");
        let b = slugify("Richard Rodgers Theatre");
        assert_eq!(a, b);
    }

    #[test]
    fn slug_set_first_claim_is_bare() {
        let mut set = SlugSet::new();
        assert_eq!(set.assign("Hamlet"), "hamlet");
    }

    #[test]
    fn slug_set_collisions_get_numeric_suffixes() {
        let mut set = SlugSet::new();
        assert_eq!(set.assign("Rock of Ages"), "rock-of-ages");
        assert_eq!(set.assign("Rock of Ages!"), "rock-of-ages-2");
        assert_eq!(set.assign("Rock. Of. Ages."), "rock-of-ages-3");
    }

    #[test]
    fn slug_set_namespaces_are_independent() {
        let mut theaters = SlugSet::new();
        let mut genres = SlugSet::new();
        assert_eq!(theaters.assign("Majestic"), "majestic");
        assert_eq!(genres.assign("Majestic"), "majestic");
    }

    #[test]
    fn slug_set_same_order_same_result() {
        let names = ["Hamlet", "Hamlet!", "Hamlet?"];
        let run = || {
            let mut set = SlugSet::new();
            names.iter().map(|n| set.assign(n)).collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
        assert_eq!(run(), vec!["hamlet", "hamlet-2", "hamlet-3"]);
    }
}
