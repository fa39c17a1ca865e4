//! Training stage
//!
//! Labeled, non-empty preprocessed records are joined by id to their rows of
//! the stored TF-IDF matrix, split 80/20 (stratified, seeded) and used to compare
//! a fixed roster of classifiers plus a tuned logistic regression. The
//! model with the best hold-out accuracy is stored together with its label
//! encoder and the hold-out partition used by the evaluation stage.

use crate::config::TrainingConfig;
use crate::ml::metrics::mean_std;
use crate::ml::model_selection::{cross_val_score, grid_search, pick, stratified_split};
use crate::ml::{Classifier, ClassifierSpec, LabelEncoder, Model, TfIdfVectorizer};
use crate::models::{
    AnnotationStats, ComparisonRow, FeatureKind, FeatureMatrix, HoldOutSet, TrainedModel,
};
use ndarray::{Array2, Axis};
use std::collections::HashMap;
use tracing::{debug, info};
use uvbf_common::artifacts::{
    COMPARISON, HOLDOUT, LABEL_ENCODER, MODEL, PREPROCESSED_RECORDS, TFIDF_MATRIX, TFIDF_VECTORIZER,
};
use uvbf_common::{time, ArtifactStore, Error, Record, Result, Sentiment};

/// Comparison-table name of the grid-searched logistic regression
pub const TUNED_LOGISTIC: &str = "Logistic Regression (tuned)";

/// Labeled samples projected into a feature space
#[derive(Debug, Clone)]
pub struct LabeledSet {
    pub record_ids: Vec<String>,
    pub features: Array2<f64>,
    pub labels: Vec<Sentiment>,
}

impl LabeledSet {
    /// Rows of `matrix` for `records`, in record order
    ///
    /// Every record must have a row; a miss means the matrix predates the
    /// current preprocessed records.
    pub fn from_matrix(matrix: &FeatureMatrix, records: &[&Record]) -> Result<Self> {
        if matrix.record_ids.len() != matrix.values.nrows() {
            return Err(Error::InvalidInput(format!(
                "feature matrix has {} rows but {} record ids",
                matrix.values.nrows(),
                matrix.record_ids.len()
            )));
        }
        let row_of: HashMap<&str, usize> = matrix
            .record_ids
            .iter()
            .enumerate()
            .map(|(row, id)| (id.as_str(), row))
            .collect();

        let mut rows = Vec::with_capacity(records.len());
        let mut labels = Vec::with_capacity(records.len());
        for record in records {
            let row = row_of.get(record.id.as_str()).copied().ok_or_else(|| {
                Error::InvalidInput(format!(
                    "record '{}' has no row in the TF-IDF matrix; re-run the vectorization stage",
                    record.id
                ))
            })?;
            let sentiment = record.sentiment.ok_or_else(|| {
                Error::InvalidInput(format!("record '{}' is not labeled", record.id))
            })?;
            rows.push(row);
            labels.push(sentiment);
        }

        Ok(Self {
            record_ids: records.iter().map(|r| r.id.clone()).collect(),
            features: matrix.values.select(Axis(0), &rows),
            labels,
        })
    }
}

/// Stratified train/test partition with encoded labels
#[derive(Debug, Clone)]
pub struct Partition {
    pub encoder: LabelEncoder,
    pub x_train: Array2<f64>,
    pub y_train: Vec<usize>,
    pub x_test: Array2<f64>,
    pub y_test: Vec<usize>,
    pub test_ids: Vec<String>,
}

impl Partition {
    /// Encode labels and split with the configured ratio and seed
    ///
    /// Needs at least two classes, and enough samples per side.
    pub fn new(set: &LabeledSet, config: &TrainingConfig) -> Result<Self> {
        let encoder = LabelEncoder::fit(&set.labels);
        if encoder.n_classes() < 2 {
            return Err(Error::InsufficientData(format!(
                "training needs at least two sentiment classes, found {:?}",
                encoder.class_names()
            )));
        }
        let y = encoder.transform(&set.labels)?;
        let split = stratified_split(&y, config.test_ratio, config.seed)?;

        Ok(Self {
            x_train: set.features.select(Axis(0), &split.train),
            y_train: pick(&y, &split.train),
            x_test: set.features.select(Axis(0), &split.test),
            y_test: pick(&y, &split.test),
            test_ids: split.test.iter().map(|&i| set.record_ids[i].clone()).collect(),
            encoder,
        })
    }

    pub fn n_classes(&self) -> usize {
        self.encoder.n_classes()
    }

    pub fn holdout(&self, config: &TrainingConfig) -> HoldOutSet {
        HoldOutSet {
            record_ids: self.test_ids.clone(),
            features: self.x_test.clone(),
            labels: self.y_test.clone(),
            seed: config.seed,
            test_ratio: config.test_ratio,
        }
    }
}

/// A classifier fitted on the training side, with its comparison row
#[derive(Debug, Clone)]
pub struct FittedCandidate {
    pub spec: ClassifierSpec,
    pub classifier: Classifier,
    pub row: ComparisonRow,
}

/// Cross-validate `spec` on the training side, then fit and score it
pub fn fit_candidate(
    name: &str,
    spec: ClassifierSpec,
    partition: &Partition,
    cv_folds: usize,
) -> Result<FittedCandidate> {
    let folds = cross_val_score(
        &spec,
        partition.x_train.view(),
        &partition.y_train,
        partition.n_classes(),
        cv_folds,
    )?;
    let (cv_score, cv_std) = mean_std(&folds);
    fitted_with_cv(name, spec, partition, cv_score, cv_std)
}

fn fitted_with_cv(
    name: &str,
    spec: ClassifierSpec,
    partition: &Partition,
    cv_score: f64,
    cv_std: f64,
) -> Result<FittedCandidate> {
    let mut classifier = spec.build();
    classifier.fit(partition.x_train.view(), &partition.y_train, partition.n_classes())?;
    let row = ComparisonRow {
        model: name.to_string(),
        train_score: classifier.score(partition.x_train.view(), &partition.y_train),
        cv_score,
        cv_std,
        test_score: classifier.score(partition.x_test.view(), &partition.y_test),
    };
    info!(
        model = name,
        train = %format!("{:.4}", row.train_score),
        cv = %format!("{:.4} ± {:.4}", row.cv_score, row.cv_std),
        test = %format!("{:.4}", row.test_score),
        "Model scored"
    );
    Ok(FittedCandidate {
        spec,
        classifier,
        row,
    })
}

/// Grid search over logistic-regression `C`, refit on the training side
pub fn tuned_logistic(
    grid_c: &[f64],
    partition: &Partition,
    cv_folds: usize,
) -> Result<FittedCandidate> {
    let candidates: Vec<ClassifierSpec> = grid_c
        .iter()
        .map(|&c| ClassifierSpec::LogisticRegression { c })
        .collect();
    let result = grid_search(
        &candidates,
        partition.x_train.view(),
        &partition.y_train,
        partition.n_classes(),
        cv_folds,
    )?;
    info!(best = %result.best, cv = %format!("{:.4}", result.best_score), "Grid search finished");
    fitted_with_cv(TUNED_LOGISTIC, result.best, partition, result.best_score, result.best_std)
}

/// Remove and return the candidate with the best test score (earliest on ties)
pub fn take_best(mut candidates: Vec<FittedCandidate>) -> Result<(FittedCandidate, Vec<ComparisonRow>)> {
    let rows: Vec<ComparisonRow> = candidates.iter().map(|c| c.row.clone()).collect();
    let best = ComparisonRow::best_index(&rows)
        .ok_or_else(|| Error::InvalidInput("no candidate model was trained".to_string()))?;
    Ok((candidates.swap_remove(best), rows))
}

/// Labeled records whose normalized text is non-empty
pub fn training_records(records: &[Record]) -> Vec<&Record> {
    records
        .iter()
        .filter(|r| r.is_labeled() && !r.normalized().trim().is_empty())
        .collect()
}

fn log_distribution(records: &[&Record]) {
    let stats = AnnotationStats::from_records(records.iter().copied());
    for sentiment in Sentiment::ALL {
        info!(
            sentiment = sentiment.as_str(),
            count = stats.count(sentiment),
            percent = %format!("{:.1}", stats.percentage(sentiment)),
            "Training distribution"
        );
    }
    for (platform, counts) in &stats.by_platform {
        debug!(platform = %platform, counts = ?counts, "Training distribution by platform");
    }
}

#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub best: ComparisonRow,
    pub rows: Vec<ComparisonRow>,
    pub train_size: usize,
    pub test_size: usize,
}

pub fn train(store: &ArtifactStore, config: &TrainingConfig) -> Result<TrainingOutcome> {
    let records: Vec<Record> = store.read(&PREPROCESSED_RECORDS)?;
    let vectorizer: TfIdfVectorizer = store.read(&TFIDF_VECTORIZER)?;
    let matrix: FeatureMatrix = store.read(&TFIDF_MATRIX)?;
    if matrix.values.ncols() != vectorizer.n_features() {
        return Err(Error::InvalidInput(format!(
            "TF-IDF matrix has {} columns but the vectorizer has {} terms; re-run the vectorization stage",
            matrix.values.ncols(),
            vectorizer.n_features()
        )));
    }

    let selected = training_records(&records);
    if selected.is_empty() {
        return Err(Error::InsufficientData(format!(
            "none of the {} preprocessed records is both labeled and non-empty; run the annotation stage",
            records.len()
        )));
    }
    log_distribution(&selected);

    let set = LabeledSet::from_matrix(&matrix, &selected)?;
    let partition = Partition::new(&set, config)?;
    info!(
        train = partition.y_train.len(),
        test = partition.y_test.len(),
        features = vectorizer.n_features(),
        "Stratified split ready"
    );

    let roster = [
        ClassifierSpec::NaiveBayes { alpha: 1.0 },
        ClassifierSpec::LogisticRegression { c: 1.0 },
        ClassifierSpec::LinearSvm { c: 1.0 },
        ClassifierSpec::NearestNeighbors { k: config.knn_k },
    ];
    let mut candidates = roster
        .iter()
        .map(|spec| fit_candidate(spec.family(), *spec, &partition, config.cv_folds))
        .collect::<Result<Vec<_>>>()?;
    candidates.push(tuned_logistic(&config.grid_c, &partition, config.cv_folds)?);

    let (best, rows) = take_best(candidates)?;
    info!(model = %best.row.model, test = %format!("{:.4}", best.row.test_score), "Best model selected");

    let model = TrainedModel {
        name: best.row.model.clone(),
        spec: best.spec,
        features: FeatureKind::TfIdf {
            vocabulary_size: vectorizer.n_features(),
        },
        classifier: best.classifier,
        test_score: best.row.test_score,
        trained_at: time::now(),
    };
    store.write(&MODEL, &model)?;
    store.write(&LABEL_ENCODER, &partition.encoder)?;
    store.write(&HOLDOUT, &partition.holdout(config))?;
    store.write_rows(&COMPARISON, &rows)?;

    Ok(TrainingOutcome {
        best: best.row,
        rows,
        train_size: partition.y_train.len(),
        test_size: partition.y_test.len(),
    })
}
