//! Pipeline stage identifiers
//!
//! Every stage owns one directory under the project root; the directory
//! prefix encodes the stage order so a directory listing reads like the
//! pipeline itself.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One discrete transformation step of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Raw record collection (or demo generation)
    Collection,
    /// Sentiment labeling
    Annotation,
    /// Text normalization and lemmatization
    Preprocessing,
    /// TF-IDF feature extraction
    Vectorization,
    /// Classifier roster training and selection
    Training,
    /// Optional embedding-based enhancement
    Embedding,
    /// Hold-out evaluation of the selected model
    Evaluation,
    /// Final report aggregation
    Report,
}

impl Stage {
    /// All stages in pipeline order
    pub const ALL: [Stage; 8] = [
        Stage::Collection,
        Stage::Annotation,
        Stage::Preprocessing,
        Stage::Vectorization,
        Stage::Training,
        Stage::Embedding,
        Stage::Evaluation,
        Stage::Report,
    ];

    /// Stable name used on the command line and in logs
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Collection => "collection",
            Stage::Annotation => "annotation",
            Stage::Preprocessing => "preprocessing",
            Stage::Vectorization => "vectorization",
            Stage::Training => "training",
            Stage::Embedding => "embedding",
            Stage::Evaluation => "evaluation",
            Stage::Report => "report",
        }
    }

    /// Directory (relative to the project root) holding this stage's artifacts
    pub fn directory(&self) -> &'static str {
        match self {
            Stage::Collection => "01_collection",
            Stage::Annotation => "02_annotation",
            Stage::Preprocessing => "03_preprocessing",
            Stage::Vectorization => "04_vectorization",
            Stage::Training => "05_training",
            Stage::Embedding => "06_embedding",
            Stage::Evaluation => "07_evaluation",
            Stage::Report => "08_report",
        }
    }

    /// Human-readable title for summaries
    pub fn title(&self) -> &'static str {
        match self {
            Stage::Collection => "Data collection",
            Stage::Annotation => "Sentiment annotation",
            Stage::Preprocessing => "Text preprocessing",
            Stage::Vectorization => "TF-IDF vectorization",
            Stage::Training => "Model training",
            Stage::Embedding => "Embedding enhancement",
            Stage::Evaluation => "Model evaluation",
            Stage::Report => "Final report",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Stage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        Stage::ALL
            .iter()
            .copied()
            .find(|stage| stage.name() == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = Stage::ALL.iter().map(|s| s.name()).collect();
                Error::InvalidInput(format!(
                    "unknown stage '{}' (expected one of: {})",
                    s,
                    names.join(", ")
                ))
            })
    }
}
