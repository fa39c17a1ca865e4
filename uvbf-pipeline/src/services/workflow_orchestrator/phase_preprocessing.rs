//! Stage 3: PREPROCESSING

use super::WorkflowOrchestrator;
use crate::services::text_preprocessor::preprocess;
use tracing::warn;
use uvbf_common::Result;

impl WorkflowOrchestrator {
    pub(super) fn phase_preprocessing(&mut self) -> Result<String> {
        let outcome = preprocess(&self.store, self.language_model.as_ref())?;
        if outcome.empty > 0 {
            warn!(
                empty = outcome.empty,
                "Some records have no content words left and will not be vectorized"
            );
        }
        Ok(format!(
            "{} records normalized ({} empty)",
            outcome.records, outcome.empty
        ))
    }
}
