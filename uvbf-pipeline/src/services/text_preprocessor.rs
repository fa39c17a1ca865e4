//! Preprocessing stage: cleaning, tokenization and lemmatization
//!
//! Cleaning removes @mentions, #hashtags, URLs and punctuation, collapses
//! whitespace and lowercases. The cleaned text is then handed to a
//! [`LanguageModel`], which drops stop words, digit tokens and tokens of two
//! characters or fewer, and reduces the remaining words to a base form.

use regex::Regex;
use std::collections::HashSet;
use tracing::info;
use uvbf_common::artifacts::{ANNOTATED_RECORDS, PREPROCESSED_RECORDS};
use uvbf_common::{ArtifactStore, Error, Record, Result};

/// Tokens of this many characters or fewer are dropped
const MIN_TOKEN_CHARS: usize = 2;

/// Tokenizer + lemmatizer for one language
pub trait LanguageModel {
    /// Content-word lemmas of already cleaned, lowercased text
    fn lemmas(&self, cleaned: &str) -> Vec<String>;
}

/// Regex-based text cleaner
pub struct TextCleaner {
    mention: Regex,
    hashtag: Regex,
    url: Regex,
    punctuation: Regex,
}

impl TextCleaner {
    pub fn new() -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern)
                .map_err(|e| Error::Config(format!("invalid cleaning pattern '{}': {}", pattern, e)))
        };
        Ok(Self {
            mention: compile(r"@\w+")?,
            hashtag: compile(r"#\w+")?,
            url: compile(r"https?://\S+|www\.\S+")?,
            punctuation: compile(r"[^\w\s]")?,
        })
    }

    pub fn clean(&self, text: &str) -> String {
        let text = self.mention.replace_all(text, "");
        let text = self.hashtag.replace_all(&text, "");
        let text = self.url.replace_all(&text, "");
        let text = self.punctuation.replace_all(&text, " ");
        text.split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }
}

const FRENCH_STOP_WORDS: &[&str] = &[
    "alors", "au", "aucun", "aussi", "autre", "aux", "avant", "avec", "avoir", "bon", "car", "ce",
    "cela", "celle", "celui", "ces", "cet", "cette", "ceux", "chaque", "chez", "comme", "comment",
    "dans", "de", "des", "doit", "donc", "dont", "du", "elle", "elles", "en", "encore", "est",
    "et", "été", "être", "eu", "fait", "faire", "fois", "font", "ici", "il", "ils", "je", "juste",
    "la", "le", "les", "leur", "leurs", "lui", "ma", "mais", "me", "même", "mes", "moi", "mon",
    "ne", "nos", "notre", "nous", "on", "ont", "ou", "où", "par", "parce", "pas", "peu", "peut",
    "plus", "pour", "pourquoi", "quand", "que", "quel", "quelle", "quelles", "quels", "qui",
    "quoi", "sa", "sans", "se", "ses", "si", "sien", "son", "sont", "sous", "soit", "sur", "ta",
    "tandis", "te", "tes", "toi", "ton", "tous", "tout", "toute", "toutes", "très", "trop", "tu",
    "un", "une", "vos", "votre", "vous", "vu", "ça", "était", "étaient", "avons", "avez", "suis",
    "sommes", "êtes", "ai", "as", "avait", "cependant", "depuis", "entre", "vers", "voici",
    "voilà", "quelqu", "ceci", "celles", "lors", "puis", "selon",
];

/// Built-in French model: stop-word list plus light suffix rules
///
/// The suffix rules fold common plural and participle endings
/// (`formations` → `formation`, `journaux` → `journal`,
/// `organisées` → `organisé`). They do not conjugate verbs.
pub struct FrenchRules {
    stop_words: HashSet<&'static str>,
}

impl FrenchRules {
    pub fn new() -> Self {
        Self {
            stop_words: FRENCH_STOP_WORDS.iter().copied().collect(),
        }
    }

    fn lemmatize(word: &str) -> String {
        let chars: Vec<char> = word.chars().collect();
        let n = chars.len();
        let stem = |drop: usize| chars[..n - drop].iter().collect::<String>();

        if n > 5 && word.ends_with("aux") {
            return format!("{}al", stem(3));
        }
        if n > 4 && (word.ends_with("ées") || word.ends_with("és")) {
            return format!("{}é", stem(if word.ends_with("ées") { 3 } else { 2 }));
        }
        if n > 4 && word.ends_with("ée") {
            return format!("{}é", stem(2));
        }
        if n > 4 && word.ends_with('s') && !word.ends_with("ss") && !word.ends_with("us") {
            return stem(1);
        }
        word.to_string()
    }
}

impl Default for FrenchRules {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageModel for FrenchRules {
    fn lemmas(&self, cleaned: &str) -> Vec<String> {
        cleaned
            .split_whitespace()
            .filter(|token| token.chars().count() > MIN_TOKEN_CHARS)
            .filter(|token| !token.chars().all(|c| c.is_numeric()))
            .filter(|token| !self.stop_words.contains(token))
            .map(Self::lemmatize)
            .collect()
    }
}

/// Clean + lemmatize one text into the space-joined normalized form
pub fn normalize(cleaner: &TextCleaner, model: &dyn LanguageModel, text: &str) -> String {
    let cleaned = cleaner.clean(text);
    if cleaned.is_empty() {
        return String::new();
    }
    model.lemmas(&cleaned).join(" ")
}

/// Summary of a preprocessing run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreprocessOutcome {
    pub records: usize,
    /// Records whose normalized text came out empty
    pub empty: usize,
}

/// Preprocessing stage: annotated records in, records with `normalized_text` out
pub fn preprocess(store: &ArtifactStore, model: &dyn LanguageModel) -> Result<PreprocessOutcome> {
    let cleaner = TextCleaner::new()?;
    let mut records: Vec<Record> = store.read(&ANNOTATED_RECORDS)?;

    let mut empty = 0;
    for record in records.iter_mut() {
        let normalized = normalize(&cleaner, model, &record.text);
        if normalized.is_empty() {
            empty += 1;
        }
        record.normalized_text = Some(normalized);
    }

    store.write(&PREPROCESSED_RECORDS, &records)?;
    info!(records = records.len(), empty, "Preprocessing complete");
    Ok(PreprocessOutcome {
        records: records.len(),
        empty,
    })
}
