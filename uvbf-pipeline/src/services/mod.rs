//! Stage services
//!
//! One module per pipeline stage, plus the keyword heuristic used by
//! automatic annotation and the orchestrator that chains the stages.

pub mod annotator;
pub mod demo_generator;
pub mod embedder;
pub mod evaluator;
pub mod keyword_annotator;
pub mod report_generator;
pub mod text_preprocessor;
pub mod trainer;
pub mod vectorizer;
pub mod workflow_orchestrator;

pub use annotator::{Operator, RecordPrompt, TerminalOperator, CHECKPOINT_INTERVAL};
pub use demo_generator::{CollectionOutcome, DemoGenerator};
pub use embedder::{Embedder, HashingEmbedder};
pub use text_preprocessor::{FrenchRules, LanguageModel, TextCleaner};
pub use workflow_orchestrator::{RunOptions, WorkflowOrchestrator};
