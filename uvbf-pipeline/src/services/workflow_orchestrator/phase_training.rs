//! Stage 5: TRAINING

use super::WorkflowOrchestrator;
use crate::services::trainer::train;
use uvbf_common::Result;

impl WorkflowOrchestrator {
    pub(super) fn phase_training(&mut self) -> Result<String> {
        let outcome = train(&self.store, &self.config.training)?;
        Ok(format!(
            "best {} at {:.2}% ({} train / {} test, {} models compared)",
            outcome.best.model,
            outcome.best.test_score * 100.0,
            outcome.train_size,
            outcome.test_size,
            outcome.rows.len()
        ))
    }
}
