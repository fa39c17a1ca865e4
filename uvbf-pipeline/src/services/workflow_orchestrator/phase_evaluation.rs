//! Stage 7: EVALUATION

use super::WorkflowOrchestrator;
use crate::services::evaluator::evaluate;
use uvbf_common::Result;

impl WorkflowOrchestrator {
    pub(super) fn phase_evaluation(&mut self) -> Result<String> {
        let summary = evaluate(&self.store)?;
        Ok(format!(
            "{} on {} held-out records: accuracy {:.2}%, macro F1 {:.3}",
            summary.model,
            summary.test_size,
            summary.accuracy * 100.0,
            summary.macro_avg.f1_score
        ))
    }
}
