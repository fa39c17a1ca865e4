//! Classifier roster
//!
//! [`ClassifierSpec`] names an estimator and its hyperparameters;
//! [`Classifier`] is a fitted (or fittable) instance. Keeping the two apart
//! lets cross-validation build a fresh estimator per fold from the same spec.

use super::knn::KNearestNeighbors;
use super::linear_svm::LinearSvm;
use super::logistic::LogisticRegression;
use super::metrics::accuracy;
use super::naive_bayes::MultinomialNb;
use ndarray::{ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};
use std::fmt;
use uvbf_common::Result;

/// Common estimator interface
pub trait Model {
    /// Fit on `x` (one row per sample) with labels in `0..n_classes`
    fn fit(&mut self, x: ArrayView2<'_, f64>, y: &[usize], n_classes: usize) -> Result<()>;

    fn predict_row(&self, row: ArrayView1<'_, f64>) -> usize;

    fn predict(&self, x: ArrayView2<'_, f64>) -> Vec<usize> {
        x.rows().into_iter().map(|row| self.predict_row(row)).collect()
    }

    /// Mean accuracy on `x` against `y`
    fn score(&self, x: ArrayView2<'_, f64>, y: &[usize]) -> f64 {
        accuracy(y, &self.predict(x))
    }
}

/// Estimator family plus hyperparameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ClassifierSpec {
    NaiveBayes { alpha: f64 },
    LogisticRegression { c: f64 },
    LinearSvm { c: f64 },
    NearestNeighbors { k: usize },
}

impl ClassifierSpec {
    /// Unfitted estimator for this spec
    pub fn build(&self) -> Classifier {
        match *self {
            ClassifierSpec::NaiveBayes { alpha } => Classifier::NaiveBayes(MultinomialNb::new(alpha)),
            ClassifierSpec::LogisticRegression { c } => {
                Classifier::LogisticRegression(LogisticRegression::new(c))
            }
            ClassifierSpec::LinearSvm { c } => Classifier::LinearSvm(LinearSvm::new(c)),
            ClassifierSpec::NearestNeighbors { k } => {
                Classifier::NearestNeighbors(KNearestNeighbors::new(k))
            }
        }
    }

    /// Family name used in comparison tables
    pub fn family(&self) -> &'static str {
        match self {
            ClassifierSpec::NaiveBayes { .. } => "Naive Bayes",
            ClassifierSpec::LogisticRegression { .. } => "Logistic Regression",
            ClassifierSpec::LinearSvm { .. } => "Linear SVM",
            ClassifierSpec::NearestNeighbors { .. } => "k-Nearest Neighbors",
        }
    }
}

impl fmt::Display for ClassifierSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifierSpec::NaiveBayes { alpha } => write!(f, "{} (alpha={})", self.family(), alpha),
            ClassifierSpec::LogisticRegression { c } | ClassifierSpec::LinearSvm { c } => {
                write!(f, "{} (C={})", self.family(), c)
            }
            ClassifierSpec::NearestNeighbors { k } => write!(f, "{} (k={})", self.family(), k),
        }
    }
}

/// Concrete estimator, serializable as a whole for the model artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Classifier {
    NaiveBayes(MultinomialNb),
    LogisticRegression(LogisticRegression),
    LinearSvm(LinearSvm),
    NearestNeighbors(KNearestNeighbors),
}

impl Classifier {
    fn inner(&self) -> &dyn Model {
        match self {
            Classifier::NaiveBayes(m) => m,
            Classifier::LogisticRegression(m) => m,
            Classifier::LinearSvm(m) => m,
            Classifier::NearestNeighbors(m) => m,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Model {
        match self {
            Classifier::NaiveBayes(m) => m,
            Classifier::LogisticRegression(m) => m,
            Classifier::LinearSvm(m) => m,
            Classifier::NearestNeighbors(m) => m,
        }
    }
}

impl Model for Classifier {
    fn fit(&mut self, x: ArrayView2<'_, f64>, y: &[usize], n_classes: usize) -> Result<()> {
        self.inner_mut().fit(x, y, n_classes)
    }

    fn predict_row(&self, row: ArrayView1<'_, f64>) -> usize {
        self.inner().predict_row(row)
    }
}
