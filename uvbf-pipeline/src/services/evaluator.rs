//! Evaluation stage
//!
//! Scores the stored model on the stored hold-out set. Class indices are
//! checked against the stored label encoder before any metric is computed,
//! so a model and encoder from different training runs fail loudly.

use crate::ml::metrics::{accuracy, confusion_matrix, macro_average, per_class_scores, weighted_average};
use crate::ml::{LabelEncoder, Model};
use crate::models::{ClassificationRow, EvaluationSummary, FeatureKind, HoldOutSet, TrainedModel};
use tracing::info;
use uvbf_common::artifacts::{
    CLASSIFICATION_REPORT, CONFUSION_MATRIX, EVALUATION_SUMMARY, HOLDOUT, LABEL_ENCODER, MODEL,
};
use uvbf_common::{time, ArtifactStore, Error, Result};

/// Header cell above the class names of `confusion_matrix.csv`
const MATRIX_CORNER: &str = "actual/predicted";

/// Compute the summary for `model` on `holdout`
pub fn evaluate_model(
    model: &TrainedModel,
    encoder: &LabelEncoder,
    holdout: &HoldOutSet,
) -> Result<EvaluationSummary> {
    if let FeatureKind::TfIdf { vocabulary_size } = model.features {
        if vocabulary_size != holdout.features.ncols() {
            return Err(Error::InvalidInput(format!(
                "model expects {} features but the hold-out set has {}",
                vocabulary_size,
                holdout.features.ncols()
            )));
        }
    }
    if holdout.labels.len() != holdout.features.nrows() {
        return Err(Error::InvalidInput(format!(
            "hold-out set has {} rows but {} labels",
            holdout.features.nrows(),
            holdout.labels.len()
        )));
    }

    let predictions = model.classifier.predict(holdout.features.view());
    encoder.check_indices(&holdout.labels)?;
    encoder.check_indices(&predictions)?;

    let n_classes = encoder.n_classes();
    let scores = per_class_scores(&holdout.labels, &predictions, n_classes);
    let classes = encoder.class_names();
    let per_class = classes
        .iter()
        .zip(&scores)
        .map(|(class, s)| ClassificationRow::new(class.clone(), s))
        .collect();

    Ok(EvaluationSummary {
        model: model.name.clone(),
        evaluated_at: time::now(),
        test_size: holdout.labels.len(),
        accuracy: accuracy(&holdout.labels, &predictions),
        per_class,
        macro_avg: ClassificationRow::new("macro avg", &macro_average(&scores)),
        weighted_avg: ClassificationRow::new("weighted avg", &weighted_average(&scores)),
        confusion_matrix: confusion_matrix(&holdout.labels, &predictions, n_classes),
        classes,
    })
}

/// Rows of `confusion_matrix.csv`, header row first
pub fn confusion_rows(summary: &EvaluationSummary) -> Vec<Vec<String>> {
    let mut rows = Vec::with_capacity(summary.classes.len() + 1);
    let mut header = vec![MATRIX_CORNER.to_string()];
    header.extend(summary.classes.iter().cloned());
    rows.push(header);
    for (class, counts) in summary.classes.iter().zip(&summary.confusion_matrix) {
        let mut row = vec![class.clone()];
        row.extend(counts.iter().map(|c| c.to_string()));
        rows.push(row);
    }
    rows
}

pub fn evaluate(store: &ArtifactStore) -> Result<EvaluationSummary> {
    let model: TrainedModel = store.read(&MODEL)?;
    let encoder: LabelEncoder = store.read(&LABEL_ENCODER)?;
    let holdout: HoldOutSet = store.read(&HOLDOUT)?;

    let summary = evaluate_model(&model, &encoder, &holdout)?;

    let mut report_rows = summary.per_class.clone();
    report_rows.push(summary.macro_avg.clone());
    report_rows.push(summary.weighted_avg.clone());
    store.write_rows(&CLASSIFICATION_REPORT, &report_rows)?;
    store.write_rows(&CONFUSION_MATRIX, &confusion_rows(&summary))?;
    store.write(&EVALUATION_SUMMARY, &summary)?;

    info!(
        model = %summary.model,
        test_size = summary.test_size,
        accuracy = %format!("{:.4}", summary.accuracy),
        macro_f1 = %format!("{:.4}", summary.macro_avg.f1_score),
        "Evaluation complete"
    );
    for row in &summary.per_class {
        info!(
            class = %row.class,
            precision = %format!("{:.3}", row.precision),
            recall = %format!("{:.3}", row.recall),
            f1 = %format!("{:.3}", row.f1_score),
            support = row.support,
            "Class scores"
        );
    }
    Ok(summary)
}
