//! Data models for uvbf-pipeline
//!
//! - Pipeline run state (which stages completed, where the chain stopped)
//! - Annotation session commands and statistics
//! - Artifact payloads exchanged through the store
//! - Evaluation and report summaries

pub mod annotation;
pub mod artifacts;
pub mod evaluation;
pub mod pipeline_run;
pub mod report;

pub use annotation::{AnnotationCommand, AnnotationStats, SessionOutcome};
pub use artifacts::{ComparisonRow, FeatureKind, FeatureMatrix, HoldOutSet, TrainedModel};
pub use evaluation::{ClassificationRow, EvaluationSummary};
pub use pipeline_run::{CompletedStage, PipelineRun, RunMode, RunState, StageFailure};
pub use report::FinalReport;
