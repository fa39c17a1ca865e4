//! Payloads of the binary and CSV artifacts produced by vectorization,
//! training and embedding

use crate::ml::{Classifier, ClassifierSpec};
use chrono::{DateTime, Utc};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// TF-IDF matrix of the non-empty preprocessed records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureMatrix {
    /// Record id of each row
    pub record_ids: Vec<String>,
    pub values: Array2<f64>,
}

/// Feature space a model was trained in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FeatureKind {
    TfIdf { vocabulary_size: usize },
    Embedding { embedder: String, dimension: usize },
}

/// Selected model with enough context to be reloaded and explained
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedModel {
    /// Name as shown in the comparison table
    pub name: String,
    pub spec: ClassifierSpec,
    pub features: FeatureKind,
    pub classifier: Classifier,
    pub test_score: f64,
    pub trained_at: DateTime<Utc>,
}

/// Held-out test partition, already in the model's feature space
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldOutSet {
    pub record_ids: Vec<String>,
    pub features: Array2<f64>,
    /// Encoded with the label encoder saved next to the model
    pub labels: Vec<usize>,
    pub seed: u64,
    pub test_ratio: f64,
}

/// One row of `comparison.csv` / `embedding_comparison.csv`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub model: String,
    pub train_score: f64,
    pub cv_score: f64,
    pub cv_std: f64,
    pub test_score: f64,
}

impl ComparisonRow {
    /// Row with the highest test score; the earliest row wins ties
    pub fn best(rows: &[ComparisonRow]) -> Option<&ComparisonRow> {
        Self::best_index(rows).map(|idx| &rows[idx])
    }

    pub fn best_index(rows: &[ComparisonRow]) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (idx, row) in rows.iter().enumerate() {
            if best.map_or(true, |b| row.test_score > rows[b].test_score) {
                best = Some(idx);
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(model: &str, test_score: f64) -> ComparisonRow {
        ComparisonRow {
            model: model.to_string(),
            train_score: 1.0,
            cv_score: 0.5,
            cv_std: 0.0,
            test_score,
        }
    }

    #[test]
    fn test_best_row_prefers_earliest_on_tie() {
        let rows = vec![row("a", 0.7), row("b", 0.9), row("c", 0.9)];
        assert_eq!(ComparisonRow::best(&rows).unwrap().model, "b");
        assert_eq!(ComparisonRow::best_index(&rows), Some(1));
        assert!(ComparisonRow::best(&[]).is_none());
    }
}
