//! Multinomial logistic regression
//!
//! Softmax model fitted by full-batch gradient descent on the mean
//! cross-entropy plus an L2 penalty scaled by `1 / (C * n)`, so larger `C`
//! means weaker regularization. Weights start at zero, which keeps fitting
//! deterministic.

use super::{argmax, check_training_set, Model};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use uvbf_common::{Error, Result};

const DEFAULT_MAX_ITER: usize = 300;
const DEFAULT_LEARNING_RATE: f64 = 1.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    c: f64,
    max_iter: usize,
    learning_rate: f64,
    weights: Array2<f64>,
    bias: Array1<f64>,
}

impl LogisticRegression {
    pub fn new(c: f64) -> Self {
        Self {
            c,
            max_iter: DEFAULT_MAX_ITER,
            learning_rate: DEFAULT_LEARNING_RATE,
            weights: Array2::zeros((0, 0)),
            bias: Array1::zeros(0),
        }
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn c(&self) -> f64 {
        self.c
    }

    /// Class probabilities, one row per sample
    pub fn predict_proba(&self, x: ArrayView2<'_, f64>) -> Array2<f64> {
        let mut logits = x.dot(&self.weights) + &self.bias;
        softmax_rows(&mut logits);
        logits
    }
}

impl Model for LogisticRegression {
    fn fit(&mut self, x: ArrayView2<'_, f64>, y: &[usize], n_classes: usize) -> Result<()> {
        check_training_set(&x, y, n_classes)?;
        if self.c <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "regularization strength C must be positive, got {}",
                self.c
            )));
        }

        let n = y.len() as f64;
        let mut targets = Array2::<f64>::zeros((y.len(), n_classes));
        for (i, &label) in y.iter().enumerate() {
            targets[[i, label]] = 1.0;
        }

        let mut weights = Array2::<f64>::zeros((x.ncols(), n_classes));
        let mut bias = Array1::<f64>::zeros(n_classes);
        let penalty = 1.0 / (self.c * n);

        for _ in 0..self.max_iter {
            let mut probs = x.dot(&weights) + &bias;
            softmax_rows(&mut probs);
            let residual = probs - &targets;

            let grad_w = x.t().dot(&residual) / n + &weights * penalty;
            let grad_b = residual.sum_axis(Axis(0)) / n;

            weights.scaled_add(-self.learning_rate, &grad_w);
            bias.scaled_add(-self.learning_rate, &grad_b);
        }

        self.weights = weights;
        self.bias = bias;
        Ok(())
    }

    fn predict_row(&self, row: ArrayView1<'_, f64>) -> usize {
        let logits = row.dot(&self.weights) + &self.bias;
        argmax(logits.iter().copied())
    }
}

fn softmax_rows(logits: &mut Array2<f64>) {
    for mut row in logits.rows_mut() {
        let max = row.fold(f64::NEG_INFINITY, |acc, &v| acc.max(v));
        row.mapv_inplace(|v| (v - max).exp());
        let total = row.sum();
        if total > 0.0 {
            row /= total;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::fixtures::three_clusters;

    #[test]
    fn test_separates_clusters() {
        let (x, y) = three_clusters();
        let mut lr = LogisticRegression::new(10.0);
        lr.fit(x.view(), &y, 3).unwrap();
        assert_eq!(lr.predict(x.view()), y);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let (x, y) = three_clusters();
        let mut lr = LogisticRegression::new(1.0).with_max_iter(50);
        lr.fit(x.view(), &y, 3).unwrap();
        for row in lr.predict_proba(x.view()).rows() {
            assert!((row.sum() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_fit_is_deterministic() {
        let (x, y) = three_clusters();
        let mut a = LogisticRegression::new(1.0);
        let mut b = LogisticRegression::new(1.0);
        a.fit(x.view(), &y, 3).unwrap();
        b.fit(x.view(), &y, 3).unwrap();
        assert_eq!(a.weights, b.weights);
    }

    #[test]
    fn test_rejects_non_positive_c() {
        let (x, y) = three_clusters();
        let mut lr = LogisticRegression::new(0.0);
        assert!(matches!(
            lr.fit(x.view(), &y, 3),
            Err(Error::InvalidInput(_))
        ));
    }
}
