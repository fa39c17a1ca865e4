//! Pipeline orchestrator
//!
//! Runs the stages in order:
//! COLLECTION → ANNOTATION → PREPROCESSING → VECTORIZATION → TRAINING →
//! [EMBEDDING] → EVALUATION → REPORT
//!
//! Each stage has a contract: the artifacts it requires and the artifacts
//! it must leave behind. Requirements are checked before the stage runs
//! (a miss is [`Error::MissingPrerequisite`] and the stage is never
//! invoked); outputs are checked after it returns. The first failure ends
//! the run and leaves every artifact written so far in place.
//!
//! Each stage is handled by a `phase_*` method in its own module.

use crate::config::{AnnotationMode, PipelineConfig};
use crate::models::{PipelineRun, RunMode};
use crate::services::annotator::Operator;
use crate::services::embedder::{Embedder, HashingEmbedder};
use crate::services::text_preprocessor::{FrenchRules, LanguageModel};
use std::time::Instant;
use tracing::{error, info, info_span};
use uvbf_common::artifacts::*;
use uvbf_common::{ArtifactRef, ArtifactStore, Error, Result, Stage};

mod phase_annotation;
mod phase_collection;
mod phase_embedding;
mod phase_evaluation;
mod phase_preprocessing;
mod phase_report;
mod phase_training;
mod phase_vectorization;

/// Per-invocation switches (CLI flags layered over the config file)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Run the embedding stage as part of the full chain
    pub include_embedding: bool,
    /// Let the collection stage generate demo data when no raw data exists
    pub generate_demo: bool,
    pub annotation_mode: AnnotationMode,
    pub annotation_count: usize,
    pub start_index: usize,
}

impl RunOptions {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            include_embedding: false,
            generate_demo: false,
            annotation_mode: config.annotation.mode,
            annotation_count: config.annotation.count,
            start_index: config.annotation.start_index,
        }
    }
}

/// Artifacts a stage reads and writes
#[derive(Debug, Clone, Copy)]
pub struct StageContract {
    pub requires: &'static [ArtifactRef],
    pub produces: &'static [ArtifactRef],
}

const NONE: &[ArtifactRef] = &[];

/// Contract of `stage`
///
/// Annotation in stats mode writes nothing, so its outputs depend on the
/// annotation mode.
pub fn contract(stage: Stage, annotation_mode: AnnotationMode) -> StageContract {
    match stage {
        Stage::Collection => StageContract {
            requires: NONE,
            produces: &[RAW_RECORDS],
        },
        Stage::Annotation => StageContract {
            requires: &[RAW_RECORDS],
            produces: match annotation_mode {
                AnnotationMode::Stats => NONE,
                AnnotationMode::Auto | AnnotationMode::Manual => &[ANNOTATED_RECORDS],
            },
        },
        Stage::Preprocessing => StageContract {
            requires: &[ANNOTATED_RECORDS],
            produces: &[PREPROCESSED_RECORDS],
        },
        Stage::Vectorization => StageContract {
            requires: &[PREPROCESSED_RECORDS],
            produces: &[TFIDF_VECTORIZER, TFIDF_MATRIX],
        },
        Stage::Training => StageContract {
            requires: &[PREPROCESSED_RECORDS, TFIDF_VECTORIZER, TFIDF_MATRIX],
            produces: &[MODEL, LABEL_ENCODER, HOLDOUT, COMPARISON],
        },
        Stage::Embedding => StageContract {
            requires: &[ANNOTATED_RECORDS],
            produces: &[EMBEDDING_MODEL, EMBEDDING_LABEL_ENCODER, EMBEDDING_COMPARISON],
        },
        Stage::Evaluation => StageContract {
            requires: &[MODEL, LABEL_ENCODER, HOLDOUT],
            produces: &[CLASSIFICATION_REPORT, CONFUSION_MATRIX, EVALUATION_SUMMARY],
        },
        Stage::Report => StageContract {
            requires: &[ANNOTATED_RECORDS, COMPARISON],
            produces: &[REPORT_TEXT, REPORT_JSON],
        },
    }
}

/// Pipeline orchestrator service
pub struct WorkflowOrchestrator {
    store: ArtifactStore,
    config: PipelineConfig,
    options: RunOptions,
    language_model: Box<dyn LanguageModel>,
    embedder: Box<dyn Embedder>,
    /// Manual annotation operator; the terminal is used when unset
    operator: Option<Box<dyn Operator>>,
}

impl WorkflowOrchestrator {
    /// Orchestrator with the built-in French model and hashing embedder
    pub fn new(store: ArtifactStore, config: PipelineConfig, options: RunOptions) -> Self {
        let embedder = HashingEmbedder::new(config.embedding.dimension);
        Self {
            store,
            config,
            options,
            language_model: Box::new(FrenchRules::new()),
            embedder: Box::new(embedder),
            operator: None,
        }
    }

    pub fn with_operator(mut self, operator: Box<dyn Operator>) -> Self {
        self.operator = Some(operator);
        self
    }

    pub fn with_embedder(mut self, embedder: Box<dyn Embedder>) -> Self {
        self.embedder = embedder;
        self
    }

    pub fn with_language_model(mut self, language_model: Box<dyn LanguageModel>) -> Self {
        self.language_model = language_model;
        self
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Stages a run in `mode` will attempt, in order
    pub fn planned_stages(&self, mode: RunMode) -> Vec<Stage> {
        match mode {
            RunMode::Single(stage) => vec![stage],
            RunMode::Full => Stage::ALL
                .iter()
                .copied()
                .filter(|&s| s != Stage::Embedding || self.options.include_embedding)
                .collect(),
        }
    }

    pub fn run_all(&mut self) -> PipelineRun {
        self.run(RunMode::Full)
    }

    pub fn run_stage(&mut self, stage: Stage) -> PipelineRun {
        self.run(RunMode::Single(stage))
    }

    /// Execute the planned stages until one fails
    pub fn run(&mut self, mode: RunMode) -> PipelineRun {
        let mut run = PipelineRun::new(mode, self.planned_stages(mode));
        let span = info_span!("pipeline", run_id = %run.run_id);
        let _guard = span.enter();

        info!(
            run_id = %run.run_id,
            mode = ?mode,
            stages = ?run.planned.iter().map(|s| s.name()).collect::<Vec<_>>(),
            root = %self.store.root().display(),
            "Pipeline run started"
        );

        for stage in run.planned.clone() {
            let start = Instant::now();
            match self.execute(stage) {
                Ok(detail) => {
                    let elapsed = start.elapsed();
                    info!(
                        run_id = %run.run_id,
                        stage = stage.name(),
                        elapsed_ms = elapsed.as_millis() as u64,
                        detail = %detail,
                        "Stage completed"
                    );
                    run.record_success(stage, detail, elapsed);
                }
                Err(e) => {
                    error!(run_id = %run.run_id, stage = stage.name(), error = %e, "Stage failed");
                    run.record_failure(stage, e);
                    break;
                }
            }
        }

        run.finish();
        info!(
            run_id = %run.run_id,
            state = ?run.state,
            completed = run.completed.len(),
            "Pipeline run finished"
        );
        run
    }

    /// Contract check, stage body, output check
    fn execute(&mut self, stage: Stage) -> Result<String> {
        let contract = contract(stage, self.options.annotation_mode);

        if let Some(missing) = self.store.missing(contract.requires).first() {
            return Err(Error::MissingPrerequisite {
                stage,
                artifact: self.store.path(missing),
            });
        }

        info!(stage = stage.name(), "Stage {}: {}", stage.directory(), stage.title());
        let detail = match stage {
            Stage::Collection => self.phase_collection()?,
            Stage::Annotation => self.phase_annotation()?,
            Stage::Preprocessing => self.phase_preprocessing()?,
            Stage::Vectorization => self.phase_vectorization()?,
            Stage::Training => self.phase_training()?,
            Stage::Embedding => self.phase_embedding()?,
            Stage::Evaluation => self.phase_evaluation()?,
            Stage::Report => self.phase_report()?,
        };

        if let Some(missing) = self.store.missing(contract.produces).first() {
            return Err(Error::ArtifactMissing {
                stage,
                path: self.store.path(missing),
            });
        }
        Ok(detail)
    }
}
