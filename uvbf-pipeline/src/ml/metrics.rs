//! Classification metrics
//!
//! Precision, recall and F1 follow the zero-division-is-zero convention:
//! a class that is never predicted (or never present) scores 0 rather than
//! NaN.

use serde::{Deserialize, Serialize};

/// Fraction of matching predictions; 0 for empty input
pub fn accuracy(y_true: &[usize], y_pred: &[usize]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true
        .iter()
        .zip(y_pred)
        .filter(|(t, p)| t == p)
        .count();
    correct as f64 / y_true.len() as f64
}

/// `matrix[actual][predicted]` counts
///
/// Pairs referencing a class outside `0..n_classes` are skipped; callers
/// validate indices first.
pub fn confusion_matrix(y_true: &[usize], y_pred: &[usize], n_classes: usize) -> Vec<Vec<usize>> {
    let mut matrix = vec![vec![0usize; n_classes]; n_classes];
    for (&actual, &predicted) in y_true.iter().zip(y_pred) {
        if actual < n_classes && predicted < n_classes {
            matrix[actual][predicted] += 1;
        }
    }
    matrix
}

/// Per-class scores
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassScores {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

pub fn per_class_scores(y_true: &[usize], y_pred: &[usize], n_classes: usize) -> Vec<ClassScores> {
    let matrix = confusion_matrix(y_true, y_pred, n_classes);
    (0..n_classes)
        .map(|class| {
            let tp = matrix[class][class] as f64;
            let support: usize = matrix[class].iter().sum();
            let predicted: usize = matrix.iter().map(|row| row[class]).sum();
            let precision = ratio(tp, predicted as f64);
            let recall = ratio(tp, support as f64);
            let f1_score = ratio(2.0 * precision * recall, precision + recall);
            ClassScores {
                precision,
                recall,
                f1_score,
                support,
            }
        })
        .collect()
}

/// Unweighted mean over classes
pub fn macro_average(scores: &[ClassScores]) -> ClassScores {
    let n = scores.len() as f64;
    let support = scores.iter().map(|s| s.support).sum();
    if scores.is_empty() {
        return ClassScores {
            precision: 0.0,
            recall: 0.0,
            f1_score: 0.0,
            support,
        };
    }
    ClassScores {
        precision: scores.iter().map(|s| s.precision).sum::<f64>() / n,
        recall: scores.iter().map(|s| s.recall).sum::<f64>() / n,
        f1_score: scores.iter().map(|s| s.f1_score).sum::<f64>() / n,
        support,
    }
}

/// Support-weighted mean over classes
pub fn weighted_average(scores: &[ClassScores]) -> ClassScores {
    let support: usize = scores.iter().map(|s| s.support).sum();
    let total = support as f64;
    let weighted = |f: fn(&ClassScores) -> f64| {
        ratio(
            scores.iter().map(|s| f(s) * s.support as f64).sum::<f64>(),
            total,
        )
    };
    ClassScores {
        precision: weighted(|s| s.precision),
        recall: weighted(|s| s.recall),
        f1_score: weighted(|s| s.f1_score),
        support,
    }
}

/// Mean and population standard deviation
pub fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}
