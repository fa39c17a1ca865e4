//! Evaluation stage outputs

use crate::ml::metrics::ClassScores;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of `classification_report.csv`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRow {
    /// Class name, or `macro avg` / `weighted avg`
    pub class: String,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

impl ClassificationRow {
    pub fn new(class: impl Into<String>, scores: &ClassScores) -> Self {
        Self {
            class: class.into(),
            precision: scores.precision,
            recall: scores.recall,
            f1_score: scores.f1_score,
            support: scores.support,
        }
    }
}

/// Contents of `evaluation.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub model: String,
    pub evaluated_at: DateTime<Utc>,
    pub test_size: usize,
    pub accuracy: f64,
    pub classes: Vec<String>,
    pub per_class: Vec<ClassificationRow>,
    pub macro_avg: ClassificationRow,
    pub weighted_avg: ClassificationRow,
    /// `confusion_matrix[actual][predicted]`, indexed like `classes`
    pub confusion_matrix: Vec<Vec<usize>>,
}
