//! Pipeline configuration (`uvbf.toml`)
//!
//! Every section is optional; missing keys take the defaults below. Values
//! are validated once after loading so stages can trust them.

use crate::ml::TfIdfConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;
use uvbf_common::config::{load_toml_config, write_toml_config, LoggingConfig};
use uvbf_common::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Project root holding the stage directories
    pub root_folder: Option<PathBuf>,
    pub logging: LoggingConfig,
    pub collection: CollectionConfig,
    pub annotation: AnnotationConfig,
    pub vectorizer: TfIdfConfig,
    pub training: TrainingConfig,
    pub embedding: EmbeddingConfig,
}

/// Demo data generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionConfig {
    pub demo_count: usize,
    pub seed: u64,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            demo_count: 300,
            seed: 42,
        }
    }
}

/// How the annotation stage labels records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationMode {
    /// Operator labels records one by one
    Manual,
    /// Keyword heuristic labels unlabeled records
    #[default]
    Auto,
    /// Print the label distribution only
    Stats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationConfig {
    pub mode: AnnotationMode,
    /// Auto mode: maximum number of new labels; manual mode: window length
    pub count: usize,
    /// Manual mode: first index of the labeling window
    pub start_index: usize,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            mode: AnnotationMode::Auto,
            count: 300,
            start_index: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub test_ratio: f64,
    pub seed: u64,
    pub cv_folds: usize,
    /// Logistic-regression C values tried by the grid search
    pub grid_c: Vec<f64>,
    pub knn_k: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_ratio: 0.2,
            seed: 42,
            cv_folds: 5,
            grid_c: vec![0.1, 1.0, 10.0, 100.0],
            knn_k: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub dimension: usize,
    pub batch_size: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            dimension: 256,
            batch_size: 16,
        }
    }
}

impl PipelineConfig {
    /// Load from `path` (defaults if absent) and validate
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config: PipelineConfig = load_toml_config(path)?;
        config.validate()?;
        info!(
            annotation_mode = ?config.annotation.mode,
            max_features = config.vectorizer.max_features,
            cv_folds = config.training.cv_folds,
            "Pipeline configuration ready"
        );
        Ok(config)
    }

    /// Write to `path` atomically, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;
        write_toml_config(self, path)?;
        info!(path = %path.display(), "Configuration written");
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let v = &self.vectorizer;
        if v.max_features == 0 {
            return Err(Error::Config("vectorizer.max_features must be positive".into()));
        }
        if !(v.max_df > 0.0 && v.max_df <= 1.0) {
            return Err(Error::Config(format!(
                "vectorizer.max_df must be in (0, 1], got {}",
                v.max_df
            )));
        }
        let (low, high) = v.ngram_range;
        if low == 0 || low > high {
            return Err(Error::Config(format!(
                "vectorizer.ngram_range must satisfy 1 <= low <= high, got ({}, {})",
                low, high
            )));
        }

        let t = &self.training;
        if !(t.test_ratio > 0.0 && t.test_ratio < 1.0) {
            return Err(Error::Config(format!(
                "training.test_ratio must be in (0, 1), got {}",
                t.test_ratio
            )));
        }
        if t.cv_folds < 2 {
            return Err(Error::Config("training.cv_folds must be at least 2".into()));
        }
        if t.grid_c.is_empty() || t.grid_c.iter().any(|&c| c <= 0.0) {
            return Err(Error::Config(
                "training.grid_c must list at least one positive value".into(),
            ));
        }
        if t.knn_k == 0 {
            return Err(Error::Config("training.knn_k must be positive".into()));
        }

        if self.embedding.dimension == 0 || self.embedding.batch_size == 0 {
            return Err(Error::Config(
                "embedding.dimension and embedding.batch_size must be positive".into(),
            ));
        }
        Ok(())
    }
}
