//! k-nearest-neighbors classifier with cosine similarity

use super::{check_training_set, Model};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};
use uvbf_common::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KNearestNeighbors {
    k: usize,
    n_classes: usize,
    x_train: Array2<f64>,
    norms: Array1<f64>,
    y_train: Vec<usize>,
}

impl KNearestNeighbors {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            n_classes: 0,
            x_train: Array2::zeros((0, 0)),
            norms: Array1::zeros(0),
            y_train: Vec::new(),
        }
    }
}

impl Model for KNearestNeighbors {
    fn fit(&mut self, x: ArrayView2<'_, f64>, y: &[usize], n_classes: usize) -> Result<()> {
        check_training_set(&x, y, n_classes)?;
        if self.k == 0 {
            return Err(Error::InvalidInput("k must be at least 1".to_string()));
        }
        self.x_train = x.to_owned();
        self.norms = x.rows().into_iter().map(|r| r.dot(&r).sqrt()).collect();
        self.y_train = y.to_vec();
        self.n_classes = n_classes;
        Ok(())
    }

    /// Majority vote among the `k` most similar training rows
    ///
    /// Vote ties go to the class with the larger summed similarity, then to
    /// the lower class index.
    fn predict_row(&self, row: ArrayView1<'_, f64>) -> usize {
        let row_norm = row.dot(&row).sqrt();
        let dots = self.x_train.dot(&row);
        let mut neighbors: Vec<(usize, f64)> = dots
            .iter()
            .zip(self.norms.iter())
            .map(|(&dot, &norm)| {
                if norm > 0.0 && row_norm > 0.0 {
                    dot / (norm * row_norm)
                } else {
                    0.0
                }
            })
            .enumerate()
            .collect();
        neighbors.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let mut votes = vec![0usize; self.n_classes];
        let mut weight = vec![0.0f64; self.n_classes];
        for &(idx, similarity) in neighbors.iter().take(self.k) {
            let label = self.y_train[idx];
            votes[label] += 1;
            weight[label] += similarity;
        }

        (0..self.n_classes)
            .fold(None::<usize>, |best, class| match best {
                None => Some(class),
                Some(b) if votes[class] > votes[b]
                    || (votes[class] == votes[b] && weight[class] > weight[b]) =>
                {
                    Some(class)
                }
                keep => keep,
            })
            .unwrap_or(0)
    }
}
