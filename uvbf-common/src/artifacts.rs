//! Artifact catalog
//!
//! Every file exchanged between stages is declared here once: the owning
//! stage, the file name and the on-disk format. Stages never build paths by
//! hand.

use crate::stage::Stage;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// On-disk encoding of an artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactFormat {
    /// UTF-8 JSON, pretty-printed, non-ASCII kept literal
    Json,
    /// bincode-encoded model state
    Binary,
    /// Headered CSV table
    Csv,
    /// Plain UTF-8 text
    Text,
}

/// Typed reference to one artifact of one stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactRef {
    pub stage: Stage,
    pub name: &'static str,
    pub format: ArtifactFormat,
}

impl ArtifactRef {
    pub const fn new(stage: Stage, name: &'static str, format: ArtifactFormat) -> Self {
        Self {
            stage,
            name,
            format,
        }
    }

    /// Path relative to the project root
    pub fn relative_path(&self) -> PathBuf {
        PathBuf::from(self.stage.directory()).join(self.name)
    }
}

impl fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.stage.directory(), self.name)
    }
}

pub const RAW_RECORDS: ArtifactRef =
    ArtifactRef::new(Stage::Collection, "raw_records.json", ArtifactFormat::Json);

pub const ANNOTATED_RECORDS: ArtifactRef =
    ArtifactRef::new(Stage::Annotation, "annotated_records.json", ArtifactFormat::Json);

pub const PREPROCESSED_RECORDS: ArtifactRef = ArtifactRef::new(
    Stage::Preprocessing,
    "preprocessed_records.json",
    ArtifactFormat::Json,
);

pub const TFIDF_VECTORIZER: ArtifactRef =
    ArtifactRef::new(Stage::Vectorization, "tfidf_vectorizer.bin", ArtifactFormat::Binary);

pub const TFIDF_MATRIX: ArtifactRef =
    ArtifactRef::new(Stage::Vectorization, "tfidf_matrix.bin", ArtifactFormat::Binary);

pub const MODEL: ArtifactRef =
    ArtifactRef::new(Stage::Training, "model.bin", ArtifactFormat::Binary);

pub const LABEL_ENCODER: ArtifactRef =
    ArtifactRef::new(Stage::Training, "label_encoder.bin", ArtifactFormat::Binary);

pub const HOLDOUT: ArtifactRef =
    ArtifactRef::new(Stage::Training, "holdout.bin", ArtifactFormat::Binary);

pub const COMPARISON: ArtifactRef =
    ArtifactRef::new(Stage::Training, "comparison.csv", ArtifactFormat::Csv);

pub const EMBEDDING_MODEL: ArtifactRef =
    ArtifactRef::new(Stage::Embedding, "embedding_model.bin", ArtifactFormat::Binary);

pub const EMBEDDING_LABEL_ENCODER: ArtifactRef = ArtifactRef::new(
    Stage::Embedding,
    "embedding_label_encoder.bin",
    ArtifactFormat::Binary,
);

pub const EMBEDDING_COMPARISON: ArtifactRef =
    ArtifactRef::new(Stage::Embedding, "embedding_comparison.csv", ArtifactFormat::Csv);

pub const CLASSIFICATION_REPORT: ArtifactRef = ArtifactRef::new(
    Stage::Evaluation,
    "classification_report.csv",
    ArtifactFormat::Csv,
);

pub const CONFUSION_MATRIX: ArtifactRef =
    ArtifactRef::new(Stage::Evaluation, "confusion_matrix.csv", ArtifactFormat::Csv);

pub const EVALUATION_SUMMARY: ArtifactRef =
    ArtifactRef::new(Stage::Evaluation, "evaluation.json", ArtifactFormat::Json);

pub const REPORT_TEXT: ArtifactRef =
    ArtifactRef::new(Stage::Report, "report.txt", ArtifactFormat::Text);

pub const REPORT_JSON: ArtifactRef =
    ArtifactRef::new(Stage::Report, "report.json", ArtifactFormat::Json);

/// Every artifact the pipeline can produce, in stage order
pub const CATALOG: [ArtifactRef; 17] = [
    RAW_RECORDS,
    ANNOTATED_RECORDS,
    PREPROCESSED_RECORDS,
    TFIDF_VECTORIZER,
    TFIDF_MATRIX,
    MODEL,
    LABEL_ENCODER,
    HOLDOUT,
    COMPARISON,
    EMBEDDING_MODEL,
    EMBEDDING_LABEL_ENCODER,
    EMBEDDING_COMPARISON,
    CLASSIFICATION_REPORT,
    CONFUSION_MATRIX,
    EVALUATION_SUMMARY,
    REPORT_TEXT,
    REPORT_JSON,
];

/// Artifacts owned by `stage`
pub fn owned_by(stage: Stage) -> impl Iterator<Item = &'static ArtifactRef> {
    CATALOG.iter().filter(move |artifact| artifact.stage == stage)
}
