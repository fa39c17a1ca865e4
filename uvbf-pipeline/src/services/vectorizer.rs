//! Vectorization stage
//!
//! Fits the TF-IDF vectorizer on the non-empty normalized texts and stores
//! both the fitted vectorizer (reused by training) and the matrix.

use crate::ml::{TfIdfConfig, TfIdfVectorizer};
use crate::models::FeatureMatrix;
use tracing::{debug, info, warn};
use uvbf_common::artifacts::{PREPROCESSED_RECORDS, TFIDF_MATRIX, TFIDF_VECTORIZER};
use uvbf_common::{ArtifactStore, Error, Record, Result};

/// Terms logged after fitting
const TOP_TERMS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VectorizeOutcome {
    pub documents: usize,
    pub vocabulary_size: usize,
}

/// Ids and normalized texts of records that kept at least one token
pub fn documents(records: &[Record]) -> Vec<(&str, &str)> {
    records
        .iter()
        .map(|r| (r.id.as_str(), r.normalized()))
        .filter(|(_, text)| !text.trim().is_empty())
        .collect()
}

pub fn vectorize(store: &ArtifactStore, config: &TfIdfConfig) -> Result<VectorizeOutcome> {
    let records: Vec<Record> = store.read(&PREPROCESSED_RECORDS)?;
    let docs = documents(&records);
    if docs.is_empty() {
        warn!(
            records = records.len(),
            "No record has normalized text; re-run the preprocessing stage"
        );
        return Err(Error::EmptyCorpus);
    }
    if docs.len() < records.len() {
        debug!(
            dropped = records.len() - docs.len(),
            "Records with empty normalized text left out of the matrix"
        );
    }

    let texts: Vec<&str> = docs.iter().map(|(_, text)| *text).collect();
    let mut vectorizer = TfIdfVectorizer::new(config.clone());
    let values = vectorizer.fit_transform(&texts)?;

    info!(
        documents = values.nrows(),
        vocabulary = vectorizer.n_features(),
        "TF-IDF matrix built"
    );
    for (rank, (term, weight)) in vectorizer
        .top_terms(&values.view(), TOP_TERMS)
        .into_iter()
        .enumerate()
    {
        info!(rank = rank + 1, term = %term, weight = %format!("{:.3}", weight), "Top term");
    }

    let matrix = FeatureMatrix {
        record_ids: docs.iter().map(|(id, _)| id.to_string()).collect(),
        values,
    };
    store.write(&TFIDF_VECTORIZER, &vectorizer)?;
    store.write(&TFIDF_MATRIX, &matrix)?;

    Ok(VectorizeOutcome {
        documents: matrix.record_ids.len(),
        vocabulary_size: vectorizer.n_features(),
    })
}
