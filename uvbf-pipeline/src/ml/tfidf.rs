//! TF-IDF vectorizer
//!
//! Word n-grams over whitespace tokens, document-frequency pruning, a
//! frequency-capped vocabulary and smoothed inverse document frequency:
//!
//! ```text
//! idf(t) = ln((1 + n) / (1 + df(t))) + 1
//! ```
//!
//! Rows of the resulting matrix are L2-normalized.

use ndarray::{Array1, Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uvbf_common::{Error, Result};

/// Vectorizer hyperparameters (`[vectorizer]` config section)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TfIdfConfig {
    /// Keep at most this many terms, ranked by corpus frequency
    pub max_features: usize,
    /// Minimum number of documents a term must appear in
    pub min_df: usize,
    /// Maximum fraction of documents a term may appear in
    pub max_df: f64,
    /// Inclusive n-gram range
    pub ngram_range: (usize, usize),
}

impl Default for TfIdfConfig {
    fn default() -> Self {
        Self {
            max_features: 5000,
            min_df: 2,
            max_df: 0.8,
            ngram_range: (1, 2),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfIdfVectorizer {
    config: TfIdfConfig,
    vocabulary: HashMap<String, usize>,
    terms: Vec<String>,
    idf: Array1<f64>,
}

impl TfIdfVectorizer {
    pub fn new(config: TfIdfConfig) -> Self {
        Self {
            config,
            vocabulary: HashMap::new(),
            terms: Vec::new(),
            idf: Array1::zeros(0),
        }
    }

    pub fn config(&self) -> &TfIdfConfig {
        &self.config
    }

    /// Terms in column order (alphabetical)
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn n_features(&self) -> usize {
        self.terms.len()
    }

    pub fn idf(&self) -> &Array1<f64> {
        &self.idf
    }

    /// Learn vocabulary and idf weights
    ///
    /// Blank documents are ignored. Fails with [`Error::EmptyCorpus`] when no
    /// document has text and [`Error::EmptyVocabulary`] when pruning removes
    /// every term.
    pub fn fit(&mut self, documents: &[&str]) -> Result<()> {
        let docs: Vec<Vec<String>> = documents
            .iter()
            .filter(|d| !d.trim().is_empty())
            .map(|d| self.ngrams(d))
            .collect();
        if docs.is_empty() {
            return Err(Error::EmptyCorpus);
        }

        let n_docs = docs.len();
        let mut doc_freq: HashMap<&str, usize> = HashMap::new();
        let mut corpus_freq: HashMap<&str, usize> = HashMap::new();
        for doc in &docs {
            let mut seen: HashSet<&str> = HashSet::new();
            for term in doc {
                *corpus_freq.entry(term.as_str()).or_insert(0) += 1;
                if seen.insert(term.as_str()) {
                    *doc_freq.entry(term.as_str()).or_insert(0) += 1;
                }
            }
        }

        let max_doc_count = self.config.max_df * n_docs as f64;
        let mut kept: Vec<(&str, usize)> = doc_freq
            .iter()
            .filter(|(_, &df)| df >= self.config.min_df && (df as f64) <= max_doc_count)
            .map(|(&term, _)| (term, corpus_freq.get(term).copied().unwrap_or(0)))
            .collect();

        if kept.len() > self.config.max_features {
            kept.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
            kept.truncate(self.config.max_features);
        }
        if kept.is_empty() {
            return Err(Error::EmptyVocabulary {
                min_df: self.config.min_df,
                max_df: self.config.max_df,
            });
        }

        let mut terms: Vec<String> = kept.into_iter().map(|(t, _)| t.to_string()).collect();
        terms.sort();

        let n = n_docs as f64;
        self.idf = terms
            .iter()
            .map(|t| {
                let df = doc_freq.get(t.as_str()).copied().unwrap_or(0) as f64;
                ((1.0 + n) / (1.0 + df)).ln() + 1.0
            })
            .collect();
        self.vocabulary = terms
            .iter()
            .enumerate()
            .map(|(idx, t)| (t.clone(), idx))
            .collect();
        self.terms = terms;
        Ok(())
    }

    /// Map documents onto the learned vocabulary
    ///
    /// Documents with no known term become zero rows.
    pub fn transform(&self, documents: &[&str]) -> Array2<f64> {
        let mut matrix = Array2::<f64>::zeros((documents.len(), self.terms.len()));
        for (row_idx, doc) in documents.iter().enumerate() {
            let mut row = matrix.row_mut(row_idx);
            for term in self.ngrams(doc) {
                if let Some(&col) = self.vocabulary.get(&term) {
                    row[col] += 1.0;
                }
            }
            row *= &self.idf;
            let norm = row.dot(&row).sqrt();
            if norm > 0.0 {
                row /= norm;
            }
        }
        matrix
    }

    pub fn fit_transform(&mut self, documents: &[&str]) -> Result<Array2<f64>> {
        self.fit(documents)?;
        Ok(self.transform(documents))
    }

    /// Terms with the largest summed weight over `matrix`, heaviest first
    pub fn top_terms(&self, matrix: &ArrayView2<'_, f64>, n: usize) -> Vec<(String, f64)> {
        let totals = matrix.sum_axis(Axis(0));
        let mut ranked: Vec<(String, f64)> = self
            .terms
            .iter()
            .cloned()
            .zip(totals.iter().copied())
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(n);
        ranked
    }

    fn ngrams(&self, document: &str) -> Vec<String> {
        let tokens: Vec<&str> = document.split_whitespace().collect();
        let (low, high) = self.config.ngram_range;
        let mut grams = Vec::new();
        for n in low.max(1)..=high {
            if n > tokens.len() {
                break;
            }
            grams.extend(tokens.windows(n).map(|w| w.join(" ")));
        }
        grams
    }
}
