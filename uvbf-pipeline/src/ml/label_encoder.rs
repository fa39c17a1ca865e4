//! Sentiment label <-> class index mapping

use serde::{Deserialize, Serialize};
use uvbf_common::{Error, Result, Sentiment};

/// Bijection between sentiment labels and `0..n_classes`
///
/// Classes are ordered alphabetically by their serialized name, so the same
/// label set always yields the same indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<Sentiment>,
}

impl LabelEncoder {
    /// Learn the class set from observed labels
    pub fn fit(labels: &[Sentiment]) -> Self {
        let mut classes: Vec<Sentiment> = labels.to_vec();
        classes.sort_by_key(|s| s.as_str());
        classes.dedup();
        Self { classes }
    }

    pub fn classes(&self) -> &[Sentiment] {
        &self.classes
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn class_names(&self) -> Vec<String> {
        self.classes.iter().map(|c| c.as_str().to_string()).collect()
    }

    pub fn transform(&self, labels: &[Sentiment]) -> Result<Vec<usize>> {
        let mut unknown = Vec::new();
        let encoded: Vec<usize> = labels
            .iter()
            .filter_map(|label| match self.classes.iter().position(|c| c == label) {
                Some(idx) => Some(idx),
                None => {
                    unknown.push(label.as_str().to_string());
                    None
                }
            })
            .collect();

        if !unknown.is_empty() {
            unknown.sort();
            unknown.dedup();
            return Err(Error::ClassMismatch {
                labels: unknown,
                classes: self.class_names(),
            });
        }
        Ok(encoded)
    }

    pub fn inverse_transform(&self, indices: &[usize]) -> Result<Vec<Sentiment>> {
        self.check_indices(indices)?;
        Ok(indices.iter().map(|&idx| self.classes[idx]).collect())
    }

    /// Fails with [`Error::ClassMismatch`] if any index is outside the encoder
    pub fn check_indices(&self, indices: &[usize]) -> Result<()> {
        let mut offending: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|&idx| idx >= self.classes.len())
            .collect();
        if offending.is_empty() {
            return Ok(());
        }
        offending.sort_unstable();
        offending.dedup();
        Err(Error::ClassMismatch {
            labels: offending.iter().map(|idx| format!("class #{}", idx)).collect(),
            classes: self.class_names(),
        })
    }
}
