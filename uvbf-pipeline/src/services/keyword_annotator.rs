//! Keyword heuristic for automatic labeling
//!
//! A post scores one point per positive keyword and one per negative keyword
//! it contains (case-insensitive). More positive points gives `positive`,
//! more negative gives `negative`, and a tie (including 0-0) gives `neutral`.
//!
//! A word matches a keyword when it is the keyword itself or the keyword
//! followed by a French plural or feminine ending ("problèmes", "déçue",
//! "excellente", "bonne", "nulle"). Words that merely start with a keyword do
//! not match, so "excellent" never counts as "lent" and "chercher" never
//! counts as "cher". Irregular forms ("heureuse", "mauvaise") are missed.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use uvbf_common::{Record, Sentiment};

pub const POSITIVE_KEYWORDS: &[&str] = &[
    "excellent",
    "super",
    "génial",
    "parfait",
    "bravo",
    "merci",
    "formidable",
    "content",
    "satisfait",
    "motivé",
    "qualité",
    "bon",
    "bien",
    "meilleur",
    "apprécier",
    "heureux",
    "félicitations",
];

pub const NEGATIVE_KEYWORDS: &[&str] = &[
    "mauvais",
    "nul",
    "problème",
    "difficile",
    "échec",
    "déçu",
    "insatisfait",
    "pire",
    "insuffisant",
    "manque",
    "erreur",
    "lent",
    "compliqué",
    "frustrant",
    "cher",
    "inadapté",
];

/// Plural and feminine endings accepted after a keyword
const INFLECTIONS: &[&str] = &["s", "e", "es", "x", "ne", "nes", "le", "les"];

fn is_form_of(word: &str, keyword: &str) -> bool {
    match word.strip_prefix(keyword) {
        Some("") => true,
        Some(ending) => INFLECTIONS.contains(&ending),
        None => false,
    }
}

/// Keyword hits in one text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeywordScore {
    pub positive: usize,
    pub negative: usize,
}

impl KeywordScore {
    pub fn of(text: &str) -> Self {
        let lowered = text.to_lowercase();
        let words: HashSet<&str> = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        let hits = |keywords: &[&str]| {
            keywords
                .iter()
                .filter(|k| words.iter().any(|w| is_form_of(w, k)))
                .count()
        };
        Self {
            positive: hits(POSITIVE_KEYWORDS),
            negative: hits(NEGATIVE_KEYWORDS),
        }
    }

    pub fn sentiment(&self) -> Sentiment {
        use std::cmp::Ordering;
        match self.positive.cmp(&self.negative) {
            Ordering::Greater => Sentiment::Positive,
            Ordering::Less => Sentiment::Negative,
            Ordering::Equal => Sentiment::Neutral,
        }
    }
}

/// Heuristic label for `text`
pub fn classify(text: &str) -> Sentiment {
    KeywordScore::of(text).sentiment()
}

/// Label up to `count` unlabeled records, in dataset order
///
/// Records that already carry a label are neither counted nor touched.
/// Returns the number of labels added, `min(count, unlabeled)`.
pub fn annotate_auto(records: &mut [Record], count: usize, at: DateTime<Utc>) -> usize {
    let mut added = 0;
    for record in records.iter_mut().filter(|r| !r.is_labeled()).take(count) {
        let sentiment = classify(&record.text);
        if record.assign(sentiment, true, at) {
            added += 1;
        }
    }
    added
}
