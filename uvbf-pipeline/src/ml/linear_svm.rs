//! Linear support vector machine (one-vs-rest)
//!
//! Each class gets a hinge-loss separator fitted with deterministic
//! full-batch Pegasos steps. The bias is learned as the weight of a constant
//! feature and is regularized with the rest.

use super::{argmax, check_training_set, Model};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};
use uvbf_common::{Error, Result};

const DEFAULT_EPOCHS: usize = 200;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearSvm {
    c: f64,
    epochs: usize,
    /// One row per class
    weights: Array2<f64>,
    bias: Array1<f64>,
}

impl LinearSvm {
    pub fn new(c: f64) -> Self {
        Self {
            c,
            epochs: DEFAULT_EPOCHS,
            weights: Array2::zeros((0, 0)),
            bias: Array1::zeros(0),
        }
    }

    /// Signed distance to each class separator
    pub fn decision_function(&self, row: ArrayView1<'_, f64>) -> Array1<f64> {
        self.weights.dot(&row) + &self.bias
    }

    fn fit_binary(&self, x: &ArrayView2<'_, f64>, signs: &Array1<f64>) -> (Array1<f64>, f64) {
        let n = x.nrows() as f64;
        let lambda = 1.0 / (self.c * n);
        let radius = 1.0 / lambda.sqrt();

        let mut w = Array1::<f64>::zeros(x.ncols());
        let mut b = 0.0;
        for t in 1..=self.epochs {
            let eta = 1.0 / (lambda * t as f64);
            let margins = (x.dot(&w) + b) * signs;

            let mut step = Array1::<f64>::zeros(x.ncols());
            let mut step_b = 0.0;
            for (i, &margin) in margins.iter().enumerate() {
                if margin < 1.0 {
                    step.scaled_add(signs[i], &x.row(i));
                    step_b += signs[i];
                }
            }

            let shrink = 1.0 - eta * lambda;
            w *= shrink;
            b *= shrink;
            w.scaled_add(eta / n, &step);
            b += eta / n * step_b;

            let norm = (w.dot(&w) + b * b).sqrt();
            if norm > radius {
                w *= radius / norm;
                b *= radius / norm;
            }
        }
        (w, b)
    }
}

impl Model for LinearSvm {
    fn fit(&mut self, x: ArrayView2<'_, f64>, y: &[usize], n_classes: usize) -> Result<()> {
        check_training_set(&x, y, n_classes)?;
        if self.c <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "regularization strength C must be positive, got {}",
                self.c
            )));
        }

        let mut weights = Array2::<f64>::zeros((n_classes, x.ncols()));
        let mut bias = Array1::<f64>::zeros(n_classes);
        for class in 0..n_classes {
            let signs: Array1<f64> = y
                .iter()
                .map(|&label| if label == class { 1.0 } else { -1.0 })
                .collect();
            let (w, b) = self.fit_binary(&x, &signs);
            weights.row_mut(class).assign(&w);
            bias[class] = b;
        }

        self.weights = weights;
        self.bias = bias;
        Ok(())
    }

    fn predict_row(&self, row: ArrayView1<'_, f64>) -> usize {
        argmax(self.decision_function(row).iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::fixtures::three_clusters;

    #[test]
    fn test_separates_clusters() {
        let (x, y) = three_clusters();
        let mut svm = LinearSvm::new(1.0);
        svm.fit(x.view(), &y, 3).unwrap();
        assert_eq!(svm.predict(x.view()), y);
    }

    #[test]
    fn test_decision_function_has_one_score_per_class() {
        let (x, y) = three_clusters();
        let mut svm = LinearSvm::new(1.0);
        svm.fit(x.view(), &y, 3).unwrap();
        assert_eq!(svm.decision_function(x.row(0)).len(), 3);
    }
}
