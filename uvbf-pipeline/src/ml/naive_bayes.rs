//! Multinomial Naive Bayes
//!
//! Laplace/Lidstone-smoothed feature likelihoods per class. Expects
//! non-negative features (term weights or hashed counts).

use super::{argmax, check_training_set, Model};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};
use uvbf_common::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultinomialNb {
    alpha: f64,
    class_log_prior: Array1<f64>,
    feature_log_prob: Array2<f64>,
}

impl MultinomialNb {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            class_log_prior: Array1::zeros(0),
            feature_log_prob: Array2::zeros((0, 0)),
        }
    }
}

impl Model for MultinomialNb {
    fn fit(&mut self, x: ArrayView2<'_, f64>, y: &[usize], n_classes: usize) -> Result<()> {
        check_training_set(&x, y, n_classes)?;
        let n_features = x.ncols();

        let mut feature_count = Array2::<f64>::zeros((n_classes, n_features));
        let mut class_count = vec![0usize; n_classes];
        for (row, &label) in x.rows().into_iter().zip(y) {
            let mut acc = feature_count.row_mut(label);
            acc += &row;
            class_count[label] += 1;
        }

        let n = y.len() as f64;
        self.class_log_prior = class_count
            .iter()
            .map(|&c| {
                if c == 0 {
                    f64::NEG_INFINITY
                } else {
                    (c as f64 / n).ln()
                }
            })
            .collect();

        let alpha = self.alpha;
        for mut row in feature_count.rows_mut() {
            let total = row.sum() + alpha * n_features as f64;
            row.mapv_inplace(|count| ((count + alpha) / total).ln());
        }
        self.feature_log_prob = feature_count;
        Ok(())
    }

    fn predict_row(&self, row: ArrayView1<'_, f64>) -> usize {
        let joint = self.feature_log_prob.dot(&row) + &self.class_log_prior;
        argmax(joint.iter().copied())
    }
}
