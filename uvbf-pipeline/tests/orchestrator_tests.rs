//! Integration tests for the pipeline orchestrator
//!
//! Covers:
//! - Prerequisite checks before a stage runs
//! - Full chain on generated demo data, with and without embedding
//! - A failing stage halts the chain and leaves earlier artifacts intact
//! - Collection never generates data implicitly
//! - Manual annotation through an injected operator

mod support;

use support::{demo_orchestrator, records, ScriptedOperator};
use tempfile::TempDir;
use uvbf_common::artifacts::*;
use uvbf_common::{ArtifactStore, Error, Record, Sentiment, Stage};
use uvbf_pipeline::config::AnnotationMode;
use uvbf_pipeline::models::{AnnotationCommand, ComparisonRow, EvaluationSummary, FinalReport, RunState};
use uvbf_pipeline::{PipelineConfig, RunOptions, WorkflowOrchestrator};

fn orchestrator(root: &std::path::Path, options: impl FnOnce(&mut RunOptions)) -> WorkflowOrchestrator {
    let config = PipelineConfig::default();
    let mut run_options = RunOptions::from_config(&config);
    options(&mut run_options);
    WorkflowOrchestrator::new(ArtifactStore::new(root), config, run_options)
}

#[test]
fn test_training_without_prerequisites_is_not_invoked() {
    // Given: an empty project root
    let dir = TempDir::new().unwrap();
    let mut orchestrator = orchestrator(dir.path(), |_| {});

    // When: only the training stage is requested
    let run = orchestrator.run_stage(Stage::Training);

    // Then: MissingPrerequisite(training) and no training artifact
    assert_eq!(run.state, RunState::Failed);
    let failure = run.failure.as_ref().unwrap();
    assert_eq!(failure.stage, Stage::Training);
    match &failure.error {
        Error::MissingPrerequisite { stage, artifact } => {
            assert_eq!(*stage, Stage::Training);
            assert!(artifact.ends_with("03_preprocessing/preprocessed_records.json"));
        }
        other => panic!("expected MissingPrerequisite, got {:?}", other),
    }
    assert!(run.completed.is_empty());
    let store = orchestrator.store();
    for artifact in [MODEL, LABEL_ENCODER, HOLDOUT, COMPARISON] {
        assert!(!store.exists(&artifact));
    }
    assert!(!dir.path().join(Stage::Training.directory()).exists());
}

/// Assert the run failed with MissingPrerequisite(training) on `file_name`
/// and left no training directory behind
fn assert_training_gated(run: &uvbf_pipeline::models::PipelineRun, root: &std::path::Path, file_name: &str) {
    let failure = run.failure.as_ref().unwrap();
    match &failure.error {
        Error::MissingPrerequisite { stage, artifact } => {
            assert_eq!(*stage, Stage::Training);
            assert!(artifact.ends_with(file_name), "unexpected artifact {}", artifact.display());
        }
        other => panic!("expected MissingPrerequisite, got {:?}", other),
    }
    assert!(run.completed.is_empty());
    assert!(!root.join(Stage::Training.directory()).exists());
}

#[test]
fn test_training_gated_when_vectorization_never_ran() {
    // Given: preprocessed records on disk, no vectorization output
    let dir = TempDir::new().unwrap();
    let mut orchestrator = demo_orchestrator(dir.path(), 120, false);
    for stage in [Stage::Collection, Stage::Annotation, Stage::Preprocessing] {
        assert!(orchestrator.run_stage(stage).is_success());
    }

    // When
    let run = orchestrator.run_stage(Stage::Training);

    // Then: the missing vectorizer stops training before it runs
    assert_training_gated(&run, dir.path(), "tfidf_vectorizer.bin");
}

#[test]
fn test_training_gated_when_only_matrix_is_missing() {
    // Given: a full vectorization output with the matrix removed
    let dir = TempDir::new().unwrap();
    let mut orchestrator = demo_orchestrator(dir.path(), 120, false);
    for stage in [
        Stage::Collection,
        Stage::Annotation,
        Stage::Preprocessing,
        Stage::Vectorization,
    ] {
        assert!(orchestrator.run_stage(stage).is_success());
    }
    std::fs::remove_file(orchestrator.store().path(&TFIDF_MATRIX)).unwrap();
    assert!(orchestrator.store().exists(&TFIDF_VECTORIZER));

    // When
    let run = orchestrator.run_stage(Stage::Training);

    // Then
    assert_training_gated(&run, dir.path(), "tfidf_matrix.bin");
    assert!(!orchestrator.store().exists(&MODEL));
}

#[test]
fn test_full_chain_on_demo_data() {
    // Given: an empty root and demo generation enabled
    let dir = TempDir::new().unwrap();
    let mut orchestrator = demo_orchestrator(dir.path(), 150, false);

    // When
    let run = orchestrator.run_all();

    // Then: every stage but embedding completed in order
    assert!(run.is_success(), "run failed: {:?}", run.failure);
    assert_eq!(
        run.completed_stages(),
        vec![
            Stage::Collection,
            Stage::Annotation,
            Stage::Preprocessing,
            Stage::Vectorization,
            Stage::Training,
            Stage::Evaluation,
            Stage::Report,
        ]
    );

    let store = orchestrator.store();
    let annotated: Vec<Record> = store.read(&ANNOTATED_RECORDS).unwrap();
    assert_eq!(annotated.len(), 150);
    assert!(annotated.iter().all(|r| r.auto_annotated == Some(true)));

    let comparison: Vec<ComparisonRow> = store.read_rows(&COMPARISON).unwrap();
    let names: Vec<&str> = comparison.iter().map(|r| r.model.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "Naive Bayes",
            "Logistic Regression",
            "Linear SVM",
            "k-Nearest Neighbors",
            "Logistic Regression (tuned)",
        ]
    );

    let evaluation: EvaluationSummary = store.read(&EVALUATION_SUMMARY).unwrap();
    assert_eq!(evaluation.classes, vec!["negative", "neutral", "positive"]);
    let report: FinalReport = store.read(&REPORT_JSON).unwrap();
    assert_eq!(report.data.total_records, 150);
    assert_eq!(
        report.best_model.as_ref().map(|b| b.model.clone()),
        ComparisonRow::best(&comparison).map(|b| b.model.clone())
    );
    assert!(store.read_text(&REPORT_TEXT).unwrap().contains("RECOMMENDATIONS"));
    assert!(!store.exists(&EMBEDDING_COMPARISON));

    let summary = run.render_summary(store);
    assert!(summary.contains("[ok]   report"));
    assert!(summary.contains("08_report/report.json"));
}

#[test]
fn test_full_chain_with_embedding() {
    let dir = TempDir::new().unwrap();
    let mut orchestrator = demo_orchestrator(dir.path(), 120, true);

    let run = orchestrator.run_all();

    assert!(run.is_success(), "run failed: {:?}", run.failure);
    assert_eq!(run.completed_stages()[5], Stage::Embedding);
    let store = orchestrator.store();
    let rows: Vec<ComparisonRow> = store.read_rows(&EMBEDDING_COMPARISON).unwrap();
    assert_eq!(rows.len(), 3);
    assert!(store.exists(&EMBEDDING_MODEL));
    assert!(store.exists(&EMBEDDING_LABEL_ENCODER));
    let report: FinalReport = store.read(&REPORT_JSON).unwrap();
    assert!(report.embedding.is_some());
}

#[test]
fn test_failing_stage_halts_chain_and_keeps_earlier_artifacts() {
    // Given: raw posts with no content words left after cleaning
    let dir = TempDir::new().unwrap();
    let store = ArtifactStore::new(dir.path());
    let mut raw = records(6);
    for (i, r) in raw.iter_mut().enumerate() {
        r.text = format!("#UVBF @compte{} le la de {}", i, i);
    }
    store.write(&RAW_RECORDS, &raw).unwrap();
    let raw_before = std::fs::read(store.path(&RAW_RECORDS)).unwrap();

    // When: the full chain runs
    let mut orchestrator = orchestrator(dir.path(), |_| {});
    let run = orchestrator.run_all();

    // Then: vectorization fails with EmptyCorpus and nothing after it ran
    assert_eq!(
        run.completed_stages(),
        vec![Stage::Collection, Stage::Annotation, Stage::Preprocessing]
    );
    let failure = run.failure.as_ref().unwrap();
    assert_eq!(failure.stage, Stage::Vectorization);
    assert!(matches!(failure.error, Error::EmptyCorpus));
    assert_eq!(
        run.skipped(),
        vec![Stage::Training, Stage::Evaluation, Stage::Report]
    );

    assert_eq!(std::fs::read(store.path(&RAW_RECORDS)).unwrap(), raw_before);
    assert!(store.exists(&ANNOTATED_RECORDS));
    let preprocessed: Vec<Record> = store.read(&PREPROCESSED_RECORDS).unwrap();
    assert!(preprocessed.iter().all(|r| r.normalized().is_empty()));
    assert!(!store.exists(&TFIDF_VECTORIZER));
    assert!(!store.exists(&MODEL));
}

#[test]
fn test_collection_requires_data_or_demo_flag() {
    let dir = TempDir::new().unwrap();
    let mut orchestrator = orchestrator(dir.path(), |_| {});

    let run = orchestrator.run_stage(Stage::Collection);

    let failure = run.failure.as_ref().unwrap();
    assert!(matches!(failure.error, Error::ArtifactMissing { stage: Stage::Collection, .. }));
    assert!(!orchestrator.store().exists(&RAW_RECORDS));
}

#[test]
fn test_collection_keeps_existing_raw_data() {
    let dir = TempDir::new().unwrap();
    let store = ArtifactStore::new(dir.path());
    store.write(&RAW_RECORDS, &records(3)).unwrap();

    let mut orchestrator = demo_orchestrator(dir.path(), 300, false);
    let run = orchestrator.run_stage(Stage::Collection);

    assert!(run.is_success());
    let raw: Vec<Record> = store.read(&RAW_RECORDS).unwrap();
    assert_eq!(raw.len(), 3);
    assert_eq!(run.completed[0].detail, "3 raw records present");
}

#[test]
fn test_manual_annotation_through_injected_operator() {
    let dir = TempDir::new().unwrap();
    let store = ArtifactStore::new(dir.path());
    store.write(&RAW_RECORDS, &records(4)).unwrap();

    let operator = ScriptedOperator::new([
        AnnotationCommand::Assign(Sentiment::Positive),
        AnnotationCommand::Skip,
        AnnotationCommand::Assign(Sentiment::Negative),
        AnnotationCommand::Quit,
    ]);
    let mut orchestrator = orchestrator(dir.path(), |o| {
        o.annotation_mode = AnnotationMode::Manual;
        o.annotation_count = 4;
    })
    .with_operator(Box::new(operator));

    let run = orchestrator.run_stage(Stage::Annotation);

    assert!(run.is_success(), "run failed: {:?}", run.failure);
    assert_eq!(run.completed[0].detail, "2 labeled, 1 skipped, stopped by operator");
    let annotated: Vec<Record> = store.read(&ANNOTATED_RECORDS).unwrap();
    assert_eq!(annotated[0].sentiment, Some(Sentiment::Positive));
    assert_eq!(annotated[1].sentiment, None);
    assert_eq!(annotated[2].sentiment, Some(Sentiment::Negative));
}

#[test]
fn test_stats_mode_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let store = ArtifactStore::new(dir.path());
    store.write(&RAW_RECORDS, &records(4)).unwrap();

    let mut orchestrator = orchestrator(dir.path(), |o| o.annotation_mode = AnnotationMode::Stats);
    let run = orchestrator.run_stage(Stage::Annotation);

    assert!(run.is_success());
    assert_eq!(run.completed[0].detail, "0/4 records labeled");
    assert!(!store.exists(&ANNOTATED_RECORDS));
}
