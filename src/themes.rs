//! Theme roll-up: maps fine-grained show themes to major theme categories.
//!
//! Enrichment returns free-form themes like "redemption" or "cold war"; the
//! site rolls these up into seventeen broad buckets for display. Themes not
//! in the mapping simply don't contribute to a roll-up.

/// The major theme buckets, in display order.
pub const MAJOR_THEMES: [&str; 17] = [
    "Human Condition & Emotions",
    "Identity & Self",
    "Personal Growth & Resilience",
    "Family & Relationships",
    "Morality & Ethics",
    "Faith & Spirituality",
    "Music & Arts",
    "Philosophy & Ideas",
    "Politics & Power",
    "War & Conflict",
    "Society & Culture",
    "Social Justice & Equality",
    "Business & Leadership",
    "Science & Technology",
    "Psychology & Behavior",
    "Nature & Environment",
    "Sports & Competition",
];

/// Fine theme (lowercase) → major bucket.
const THEME_TO_MAJOR: [(&str, &str); 89] = [
    ("acceptance", "Human Condition & Emotions"),
    ("anxiety", "Human Condition & Emotions"),
    ("belonging", "Human Condition & Emotions"),
    ("connection", "Human Condition & Emotions"),
    ("death", "Human Condition & Emotions"),
    ("dreams", "Human Condition & Emotions"),
    ("empathy", "Human Condition & Emotions"),
    ("existential fear", "Human Condition & Emotions"),
    ("fate", "Human Condition & Emotions"),
    ("forgiveness", "Human Condition & Emotions"),
    ("isolation", "Human Condition & Emotions"),
    ("joy", "Human Condition & Emotions"),
    ("loss", "Human Condition & Emotions"),
    ("love", "Human Condition & Emotions"),
    ("madness", "Human Condition & Emotions"),
    ("personal struggle", "Human Condition & Emotions"),
    ("reality vs. illusion", "Human Condition & Emotions"),
    ("romance", "Human Condition & Emotions"),
    ("sacrifice", "Human Condition & Emotions"),
    ("trauma", "Human Condition & Emotions"),
    ("circle of life", "Human Condition & Emotions"),
    ("magic", "Human Condition & Emotions"),
    ("adolescence", "Identity & Self"),
    ("ambition", "Identity & Self"),
    ("cultural identity", "Identity & Self"),
    ("identity", "Identity & Self"),
    ("identity and responsibility", "Identity & Self"),
    ("self-discovery", "Identity & Self"),
    ("self-identity", "Identity & Self"),
    ("autism", "Identity & Self"),
    ("jewish experience", "Identity & Self"),
    ("change", "Personal Growth & Resilience"),
    ("empowerment", "Personal Growth & Resilience"),
    ("moral growth", "Personal Growth & Resilience"),
    ("perseverance", "Personal Growth & Resilience"),
    ("redemption", "Personal Growth & Resilience"),
    ("resilience", "Personal Growth & Resilience"),
    ("survival", "Personal Growth & Resilience"),
    ("betrayal", "Family & Relationships"),
    ("community", "Family & Relationships"),
    ("family", "Family & Relationships"),
    ("family legacy", "Family & Relationships"),
    ("fatherhood", "Family & Relationships"),
    ("friendship", "Family & Relationships"),
    ("legacy", "Family & Relationships"),
    ("corruption", "Morality & Ethics"),
    ("crime", "Morality & Ethics"),
    ("ethics", "Morality & Ethics"),
    ("justice", "Morality & Ethics"),
    ("murder", "Morality & Ethics"),
    ("revenge", "Morality & Ethics"),
    ("truth and lies", "Morality & Ethics"),
    ("faith", "Faith & Spirituality"),
    ("religion", "Faith & Spirituality"),
    ("celebrity", "Music & Arts"),
    ("fame", "Music & Arts"),
    ("music industry", "Music & Arts"),
    ("theater", "Music & Arts"),
    ("1950s television", "Music & Arts"),
    ("capitalism", "Politics & Power"),
    ("cold war", "Politics & Power"),
    ("political history", "Politics & Power"),
    ("politics", "Politics & Power"),
    ("power", "Politics & Power"),
    ("revolution", "Politics & Power"),
    ("war", "War & Conflict"),
    ("american dream", "Society & Culture"),
    ("the american dream", "Society & Culture"),
    ("class struggle", "Society & Culture"),
    ("cultural clashes", "Society & Culture"),
    ("cultural conflict", "Society & Culture"),
    ("history", "Society & Culture"),
    ("immigration", "Society & Culture"),
    ("social class", "Society & Culture"),
    ("societal norms", "Society & Culture"),
    ("socioeconomic struggles", "Society & Culture"),
    ("popularity", "Society & Culture"),
    ("mystery", "Society & Culture"),
    ("hiv/aids", "Social Justice & Equality"),
    ("prejudice", "Social Justice & Equality"),
    ("racial injustice", "Social Justice & Equality"),
    ("competition", "Business & Leadership"),
    ("success", "Business & Leadership"),
    ("technology", "Science & Technology"),
    ("media", "Science & Technology"),
    ("journalism", "Science & Technology"),
    ("mental health", "Psychology & Behavior"),
    ("education", "Psychology & Behavior"),
    ("nature", "Nature & Environment"),
];

fn lookup(theme: &str) -> Option<&'static str> {
    let needle = theme.trim().to_lowercase();
    THEME_TO_MAJOR
        .iter()
        .find(|(fine, _)| *fine == needle)
        .map(|(_, major)| *major)
}

/// The most frequent major bucket among a show's themes, ties broken
/// alphabetically so repeated runs agree. `None` when nothing maps.
pub fn major_theme(themes: &[String]) -> Option<&'static str> {
    let mut counts: Vec<(&'static str, usize)> = Vec::new();
    for theme in themes {
        if let Some(major) = lookup(theme) {
            match counts.iter_mut().find(|(m, _)| *m == major) {
                Some((_, n)) => *n += 1,
                None => counts.push((major, 1)),
            }
        }
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(a.0)))
        .map(|(major, _)| major)
}

/// All distinct major buckets among a show's themes, sorted.
pub fn all_major_themes(themes: &[String]) -> Vec<&'static str> {
    let mut majors: Vec<&'static str> = Vec::new();
    for theme in themes {
        if let Some(major) = lookup(theme)
            && !majors.contains(&major)
        {
            majors.push(major);
        }
    }
    majors.sort_unstable();
    majors
}
