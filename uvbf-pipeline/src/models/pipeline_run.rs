//! Pipeline run state
//!
//! A run progresses through its planned stages in order:
//! COLLECTION → ANNOTATION → PREPROCESSING → VECTORIZATION → TRAINING →
//! [EMBEDDING] → EVALUATION → REPORT
//!
//! The first failing stage ends the run; nothing after it is attempted.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write as _;
use std::time::Duration;
use uuid::Uuid;
use uvbf_common::artifacts::CATALOG;
use uvbf_common::{ArtifactStore, Error, Stage};

/// Run lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RunState {
    Running,
    Completed,
    Failed,
}

/// Whole chain or one stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Full,
    Single(Stage),
}

#[derive(Debug, Clone)]
pub struct CompletedStage {
    pub stage: Stage,
    /// Short human summary (e.g. "240 records labeled")
    pub detail: String,
    pub elapsed: Duration,
}

#[derive(Debug)]
pub struct StageFailure {
    pub stage: Stage,
    pub error: Error,
}

/// In-memory record of one orchestrator invocation
#[derive(Debug)]
pub struct PipelineRun {
    pub run_id: Uuid,
    pub mode: RunMode,
    pub state: RunState,
    pub planned: Vec<Stage>,
    pub completed: Vec<CompletedStage>,
    pub failure: Option<StageFailure>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl PipelineRun {
    pub fn new(mode: RunMode, planned: Vec<Stage>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            mode,
            state: RunState::Running,
            planned,
            completed: Vec::new(),
            failure: None,
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    pub fn record_success(&mut self, stage: Stage, detail: String, elapsed: Duration) {
        self.completed.push(CompletedStage {
            stage,
            detail,
            elapsed,
        });
    }

    /// Mark the run failed at `stage`; the run is terminal afterwards
    pub fn record_failure(&mut self, stage: Stage, error: Error) {
        self.failure = Some(StageFailure { stage, error });
        self.state = RunState::Failed;
        self.ended_at = Some(Utc::now());
    }

    pub fn finish(&mut self) {
        if self.state == RunState::Running {
            self.state = RunState::Completed;
            self.ended_at = Some(Utc::now());
        }
    }

    pub fn is_success(&self) -> bool {
        self.state == RunState::Completed
    }

    pub fn completed_stages(&self) -> Vec<Stage> {
        self.completed.iter().map(|c| c.stage).collect()
    }

    pub fn total_elapsed(&self) -> Duration {
        self.completed.iter().map(|c| c.elapsed).sum()
    }

    /// Planned stages that never ran because of a failure
    pub fn skipped(&self) -> Vec<Stage> {
        let done = self.completed_stages();
        let failed = self.failure.as_ref().map(|f| f.stage);
        self.planned
            .iter()
            .copied()
            .filter(|s| !done.contains(s) && Some(*s) != failed)
            .collect()
    }

    /// Human-readable summary: per-stage timings, failure, and which
    /// artifacts exist under the store root
    pub fn render_summary(&self, store: &ArtifactStore) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Run {} ({:?})", self.run_id, self.state);
        let _ = writeln!(out, "Root: {}", store.root().display());
        let _ = writeln!(out);

        for done in &self.completed {
            let _ = writeln!(
                out,
                "  [ok]   {:<14} {:>8.2}s  {}",
                done.stage.name(),
                done.elapsed.as_secs_f64(),
                done.detail
            );
        }
        if let Some(failure) = &self.failure {
            let _ = writeln!(out, "  [FAIL] {:<14} {}", failure.stage.name(), failure.error);
        }
        for stage in self.skipped() {
            let _ = writeln!(out, "  [skip] {}", stage.name());
        }
        let _ = writeln!(out, "Total: {:.2}s", self.total_elapsed().as_secs_f64());

        let _ = writeln!(out);
        let _ = writeln!(out, "Artifacts:");
        for artifact in CATALOG.iter().filter(|a| store.exists(a)) {
            let _ = writeln!(out, "  {}", artifact);
        }
        out
    }
}
