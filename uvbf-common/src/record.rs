//! Record data model
//!
//! A [`Record`] is one social-media post together with everything later
//! stages attach to it (sentiment label, annotation metadata, normalized
//! text). Field names follow the English canonical schema; the French names
//! written by earlier collectors are accepted as aliases on read.
//!
//! Unknown fields survive a read/write cycle through [`Record::extra`].

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Source platform of a post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Platform {
    Twitter,
    Facebook,
    Instagram,
    TikTok,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::Twitter,
        Platform::Facebook,
        Platform::Instagram,
        Platform::TikTok,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Twitter => "Twitter",
            Platform::Facebook => "Facebook",
            Platform::Instagram => "Instagram",
            Platform::TikTok => "TikTok",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sentiment class
///
/// Serialized in English; the French spellings are accepted on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    #[serde(alias = "positif")]
    Positive,
    #[serde(alias = "negatif", alias = "négatif")]
    Negative,
    #[serde(alias = "neutre")]
    Neutral,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "positive" | "positif" => Ok(Sentiment::Positive),
            "negative" | "negatif" | "négatif" => Ok(Sentiment::Negative),
            "neutral" | "neutre" => Ok(Sentiment::Neutral),
            other => Err(Error::InvalidInput(format!("unknown sentiment '{}'", other))),
        }
    }
}

/// One social-media post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Unique within a dataset
    pub id: String,

    #[serde(alias = "auteur")]
    pub author: String,

    #[serde(alias = "plateforme")]
    pub platform: Platform,

    /// Original post text (UTF-8, may contain diacritics and emoji)
    #[serde(alias = "texte")]
    pub text: String,

    #[serde(alias = "date_publication", with = "crate::time::timestamp")]
    pub published_at: DateTime<Utc>,

    #[serde(default)]
    pub hashtags: Vec<String>,

    #[serde(default)]
    pub likes: u64,

    #[serde(default, alias = "retweets_partages")]
    pub shares: u64,

    #[serde(default, alias = "commentaires")]
    pub comments: u64,

    /// Once set, never cleared by any stage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,

    #[serde(
        default,
        alias = "date_annotation",
        skip_serializing_if = "Option::is_none",
        with = "crate::time::optional_timestamp"
    )]
    pub annotated_at: Option<DateTime<Utc>>,

    /// `true` when the label came from the keyword heuristic
    #[serde(default, alias = "annotation_auto", skip_serializing_if = "Option::is_none")]
    pub auto_annotated: Option<bool>,

    /// Added by preprocessing; may be empty
    #[serde(default, alias = "texte_traite", skip_serializing_if = "Option::is_none")]
    pub normalized_text: Option<String>,

    /// Fields this version does not know about, preserved verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record {
    /// Create an unlabeled record with zero engagement counts
    pub fn new(
        id: impl Into<String>,
        author: impl Into<String>,
        platform: Platform,
        text: impl Into<String>,
        published_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            author: author.into(),
            platform,
            text: text.into(),
            published_at,
            hashtags: Vec::new(),
            likes: 0,
            shares: 0,
            comments: 0,
            sentiment: None,
            annotated_at: None,
            auto_annotated: None,
            normalized_text: None,
            extra: Map::new(),
        }
    }

    pub fn is_labeled(&self) -> bool {
        self.sentiment.is_some()
    }

    /// Attach a label if the record has none yet
    ///
    /// Returns `false` (and leaves the record untouched) when a label is
    /// already present.
    pub fn assign(&mut self, sentiment: Sentiment, auto: bool, at: DateTime<Utc>) -> bool {
        if self.sentiment.is_some() {
            return false;
        }
        self.sentiment = Some(sentiment);
        self.annotated_at = Some(at);
        self.auto_annotated = Some(auto);
        true
    }

    /// Normalized text, or an empty string before preprocessing has run
    pub fn normalized(&self) -> &str {
        self.normalized_text.as_deref().unwrap_or("")
    }
}

/// Count of records carrying a label
pub fn labeled_count(records: &[Record]) -> usize {
    records.iter().filter(|r| r.is_labeled()).count()
}
