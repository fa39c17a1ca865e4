//! Common error types for the UVBF pipeline

use crate::stage::Stage;
use std::path::PathBuf;
use thiserror::Error;

/// Common result type for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by every stage and the orchestrator
#[derive(Error, Debug)]
pub enum Error {
    /// Required input file absent (or empty)
    #[error("[{stage}] artifact missing: {}", .path.display())]
    ArtifactMissing { stage: Stage, path: PathBuf },

    /// File present but could not be deserialized
    #[error("[{stage}] artifact corrupt: {} ({reason})", .path.display())]
    ArtifactCorrupt {
        stage: Stage,
        path: PathBuf,
        reason: String,
    },

    /// Vectorization received no usable text
    #[error("no non-empty normalized text to vectorize; re-run the preprocessing stage")]
    EmptyCorpus,

    /// Document-frequency pruning removed every term
    #[error("no terms remain after pruning (min_df = {min_df}, max_df = {max_df}); lower min_df or collect more data")]
    EmptyVocabulary { min_df: usize, max_df: f64 },

    /// Prediction references a class the label encoder does not know
    #[error("labels {labels:?} are absent from the label encoder (known classes: {classes:?})")]
    ClassMismatch {
        labels: Vec<String>,
        classes: Vec<String>,
    },

    /// Orchestrator-level: an upstream artifact is absent, the stage was not invoked
    #[error("missing prerequisite for stage '{stage}': {}", .artifact.display())]
    MissingPrerequisite { stage: Stage, artifact: PathBuf },

    /// Not enough labeled samples for a split or cross-validation
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input or parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
