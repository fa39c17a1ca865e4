//! Shared fixtures for uvbf-pipeline integration tests
#![allow(dead_code)]

use chrono::{Duration, TimeZone, Utc};
use std::collections::VecDeque;
use std::path::Path;
use uvbf_common::{ArtifactStore, Platform, Record, Result};
use uvbf_pipeline::models::AnnotationCommand;
use uvbf_pipeline::services::{Operator, RecordPrompt};
use uvbf_pipeline::{PipelineConfig, RunOptions, WorkflowOrchestrator};

/// Operator replaying a fixed command list, then quitting
pub struct ScriptedOperator {
    commands: VecDeque<AnnotationCommand>,
    /// Dataset index of every prompted record, in order
    pub prompted: Vec<usize>,
}

impl ScriptedOperator {
    pub fn new(commands: impl IntoIterator<Item = AnnotationCommand>) -> Self {
        Self {
            commands: commands.into_iter().collect(),
            prompted: Vec::new(),
        }
    }
}

impl Operator for ScriptedOperator {
    fn next_command(&mut self, prompt: &RecordPrompt<'_>) -> Result<AnnotationCommand> {
        self.prompted.push(prompt.index);
        Ok(self.commands.pop_front().unwrap_or(AnnotationCommand::Quit))
    }
}

/// `n` unlabeled records `R000`, `R001`, …
pub fn records(n: usize) -> Vec<Record> {
    let base = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap();
    (0..n)
        .map(|i| {
            Record::new(
                format!("R{:03}", i),
                "Aminata Ouédraogo",
                Platform::ALL[i % Platform::ALL.len()],
                format!("Publication numéro {} sur l'UVBF", i),
                base + Duration::hours(i as i64),
            )
        })
        .collect()
}

/// Orchestrator over `root` with demo generation enabled
pub fn demo_orchestrator(root: &Path, demo_count: usize, include_embedding: bool) -> WorkflowOrchestrator {
    let mut config = PipelineConfig::default();
    config.collection.demo_count = demo_count;
    let mut options = RunOptions::from_config(&config);
    options.generate_demo = true;
    options.include_embedding = include_embedding;
    WorkflowOrchestrator::new(ArtifactStore::new(root), config, options)
}
