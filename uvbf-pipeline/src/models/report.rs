//! Final report structure (`report.json`)

use super::artifacts::ComparisonRow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalReport {
    pub generated_at: DateTime<Utc>,
    /// Binary version and commit that produced the report
    pub generator: String,
    pub data: DataSummary,
    pub models: Vec<ComparisonRow>,
    pub best_model: Option<ModelHighlight>,
    pub evaluation: Option<EvaluationHighlight>,
    pub embedding: Option<ModelHighlight>,
    pub recommendations: Recommendations,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSummary {
    pub total_records: usize,
    pub annotated_records: usize,
    pub distribution: Vec<ClassShare>,
    pub by_platform: Vec<PlatformShare>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassShare {
    pub sentiment: String,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformShare {
    pub platform: String,
    pub annotated: usize,
    pub shares: Vec<ClassShare>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelHighlight {
    pub model: String,
    pub test_accuracy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationHighlight {
    pub model: String,
    pub accuracy: f64,
    pub macro_f1: f64,
    pub weighted_f1: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendations {
    pub strengths: Vec<String>,
    pub improvements: Vec<Improvement>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Improvement {
    pub area: String,
    pub priority: Priority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}
