//! Learning collaborators
//!
//! In-process estimators used by the training and embedding stages. They
//! work on dense `ndarray` matrices with class labels encoded as indices
//! `0..n_classes` (see [`LabelEncoder`]).

pub mod classifier;
pub mod knn;
pub mod label_encoder;
pub mod linear_svm;
pub mod logistic;
pub mod metrics;
pub mod model_selection;
pub mod naive_bayes;
pub mod tfidf;

pub use classifier::{Classifier, ClassifierSpec, Model};
pub use label_encoder::LabelEncoder;
pub use tfidf::{TfIdfConfig, TfIdfVectorizer};

use ndarray::ArrayView2;
use uvbf_common::{Error, Result};

/// Index of the largest score; the first one wins ties, NaN never wins
pub(crate) fn argmax(scores: impl IntoIterator<Item = f64>) -> usize {
    let mut best = 0;
    let mut best_score = f64::NEG_INFINITY;
    for (idx, score) in scores.into_iter().enumerate() {
        if score > best_score {
            best = idx;
            best_score = score;
        }
    }
    best
}

/// Shape and label checks shared by every `fit`
pub(crate) fn check_training_set(
    x: &ArrayView2<'_, f64>,
    y: &[usize],
    n_classes: usize,
) -> Result<()> {
    if y.is_empty() {
        return Err(Error::InsufficientData(
            "cannot fit a classifier on zero samples".to_string(),
        ));
    }
    if x.nrows() != y.len() {
        return Err(Error::InvalidInput(format!(
            "feature matrix has {} rows but {} labels were given",
            x.nrows(),
            y.len()
        )));
    }
    if let Some(bad) = y.iter().find(|&&label| label >= n_classes) {
        return Err(Error::InvalidInput(format!(
            "label index {} out of range for {} classes",
            bad, n_classes
        )));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod fixtures {
    use ndarray::{array, Array2};

    /// Three well separated clusters of L2-normalized, non-negative rows
    pub fn three_clusters() -> (Array2<f64>, Vec<usize>) {
        let x = array![
            [0.95, 0.05, 0.0, 0.0],
            [0.9, 0.1, 0.1, 0.0],
            [1.0, 0.0, 0.0, 0.1],
            [0.85, 0.0, 0.1, 0.1],
            [0.05, 0.95, 0.0, 0.0],
            [0.1, 0.9, 0.0, 0.1],
            [0.0, 1.0, 0.1, 0.0],
            [0.0, 0.85, 0.1, 0.1],
            [0.0, 0.05, 0.95, 0.1],
            [0.1, 0.0, 0.9, 0.2],
            [0.0, 0.1, 1.0, 0.0],
            [0.05, 0.0, 0.85, 0.15],
        ];
        let y = vec![0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2];
        (x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argmax_prefers_first_on_tie() {
        assert_eq!(argmax([0.2, 0.7, 0.7]), 1);
        assert_eq!(argmax([f64::NAN, 0.1]), 1);
        assert_eq!(argmax(Vec::<f64>::new()), 0);
    }
}
