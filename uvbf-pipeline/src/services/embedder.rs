//! Embedding stage
//!
//! Dense sentence vectors as an alternative to TF-IDF. The [`Embedder`]
//! trait is the seam for a real encoder; the built-in [`HashingEmbedder`]
//! hashes word unigrams and character trigrams into a fixed number of
//! buckets, which needs no model download and is deterministic.
//!
//! Texts are embedded in fixed-size batches with coarse progress logging.
//! The stage trains logistic regression, linear SVM and k-NN on the vectors
//! with the same stratified split as the training stage and compares the
//! winner against the TF-IDF winner when `comparison.csv` exists.

use super::trainer::{fit_candidate, take_best, LabeledSet, Partition};
use crate::config::{EmbeddingConfig, TrainingConfig};
use crate::ml::ClassifierSpec;
use crate::models::{ComparisonRow, FeatureKind, TrainedModel};
use ndarray::Array2;
use sha2::{Digest, Sha256};
use tracing::{debug, info};
use uvbf_common::artifacts::{
    ANNOTATED_RECORDS, COMPARISON, EMBEDDING_COMPARISON, EMBEDDING_LABEL_ENCODER, EMBEDDING_MODEL,
};
use uvbf_common::{time, ArtifactStore, Error, Record, Result};

/// Text to fixed-length vector encoder
pub trait Embedder {
    fn name(&self) -> &str;

    fn dimension(&self) -> usize;

    /// One row per text, `dimension()` columns
    fn embed_batch(&self, texts: &[&str]) -> Array2<f64>;
}

/// Feature-hashing embedder over SHA-256 digests
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn bucket(&self, feature: &str) -> usize {
        let digest = Sha256::digest(feature.as_bytes());
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        (u64::from_le_bytes(prefix) % self.dimension as u64) as usize
    }

    /// Hashed features of one text: `w:<word>` and `c:<trigram>`
    fn features(text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        let mut features = Vec::new();
        for word in lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            features.push(format!("w:{}", word));
            let padded: Vec<char> = format!("<{}>", word).chars().collect();
            for gram in padded.windows(3) {
                features.push(format!("c:{}", gram.iter().collect::<String>()));
            }
        }
        features
    }
}

impl Embedder for HashingEmbedder {
    fn name(&self) -> &str {
        "hashing-sha256"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed_batch(&self, texts: &[&str]) -> Array2<f64> {
        let mut matrix = Array2::<f64>::zeros((texts.len(), self.dimension));
        for (row_idx, text) in texts.iter().enumerate() {
            let mut row = matrix.row_mut(row_idx);
            for feature in Self::features(text) {
                row[self.bucket(&feature)] += 1.0;
            }
            let norm = row.dot(&row).sqrt();
            if norm > 0.0 {
                row /= norm;
            }
        }
        matrix
    }
}

/// Embed all `texts` in batches of `batch_size`
pub fn embed_all(embedder: &dyn Embedder, texts: &[&str], batch_size: usize) -> Array2<f64> {
    let batch_size = batch_size.max(1);
    let total_batches = texts.len().div_ceil(batch_size);
    let mut matrix = Array2::<f64>::zeros((texts.len(), embedder.dimension()));

    for (batch_idx, chunk) in texts.chunks(batch_size).enumerate() {
        let start = batch_idx * batch_size;
        let embedded = embedder.embed_batch(chunk);
        matrix
            .slice_mut(ndarray::s![start..start + chunk.len(), ..])
            .assign(&embedded);

        let done = batch_idx + 1;
        if done % 10 == 0 || done == total_batches {
            debug!(batch = done, total = total_batches, "Embedding progress");
        }
    }
    matrix
}

#[derive(Debug, Clone)]
pub struct EmbeddingOutcome {
    pub best: ComparisonRow,
    pub rows: Vec<ComparisonRow>,
    /// Best TF-IDF row, when the training stage ran
    pub tfidf_best: Option<ComparisonRow>,
}

/// Embedding stage over labeled annotated records (raw text)
pub fn run_embedding(
    store: &ArtifactStore,
    embedder: &dyn Embedder,
    embedding: &EmbeddingConfig,
    training: &TrainingConfig,
) -> Result<EmbeddingOutcome> {
    let records: Vec<Record> = store.read(&ANNOTATED_RECORDS)?;
    let selected: Vec<&Record> = records
        .iter()
        .filter(|r| r.is_labeled() && !r.text.trim().is_empty())
        .collect();
    if selected.is_empty() {
        return Err(Error::InsufficientData(
            "no labeled record with text to embed; run the annotation stage".to_string(),
        ));
    }

    info!(
        embedder = embedder.name(),
        dimension = embedder.dimension(),
        texts = selected.len(),
        batch_size = embedding.batch_size,
        "Embedding texts"
    );
    let texts: Vec<&str> = selected.iter().map(|r| r.text.as_str()).collect();
    let set = LabeledSet {
        record_ids: selected.iter().map(|r| r.id.clone()).collect(),
        features: embed_all(embedder, &texts, embedding.batch_size),
        labels: selected.iter().filter_map(|r| r.sentiment).collect(),
    };
    let partition = Partition::new(&set, training)?;

    let roster = [
        ClassifierSpec::LogisticRegression { c: 1.0 },
        ClassifierSpec::LinearSvm { c: 1.0 },
        ClassifierSpec::NearestNeighbors { k: training.knn_k },
    ];
    let candidates = roster
        .iter()
        .map(|spec| {
            let name = format!("{} + {}", spec.family(), embedder.name());
            fit_candidate(&name, *spec, &partition, training.cv_folds)
        })
        .collect::<Result<Vec<_>>>()?;
    let (best, rows) = take_best(candidates)?;

    let model = TrainedModel {
        name: best.row.model.clone(),
        spec: best.spec,
        features: FeatureKind::Embedding {
            embedder: embedder.name().to_string(),
            dimension: embedder.dimension(),
        },
        classifier: best.classifier,
        test_score: best.row.test_score,
        trained_at: time::now(),
    };
    store.write(&EMBEDDING_MODEL, &model)?;
    store.write(&EMBEDDING_LABEL_ENCODER, &partition.encoder)?;
    store.write_rows(&EMBEDDING_COMPARISON, &rows)?;

    let tfidf_best = if store.exists(&COMPARISON) {
        let tfidf_rows: Vec<ComparisonRow> = store.read_rows(&COMPARISON)?;
        ComparisonRow::best(&tfidf_rows).cloned()
    } else {
        None
    };
    match &tfidf_best {
        Some(tfidf) => info!(
            embedding_model = %best.row.model,
            embedding_test = %format!("{:.4}", best.row.test_score),
            tfidf_model = %tfidf.model,
            tfidf_test = %format!("{:.4}", tfidf.test_score),
            gain = %format!("{:+.4}", best.row.test_score - tfidf.test_score),
            "Embedding vs TF-IDF"
        ),
        None => info!(
            embedding_model = %best.row.model,
            embedding_test = %format!("{:.4}", best.row.test_score),
            "No TF-IDF comparison available"
        ),
    }

    Ok(EmbeddingOutcome {
        best: best.row,
        rows,
        tfidf_best,
    })
}
