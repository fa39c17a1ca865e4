//! Stage 4: VECTORIZATION

use super::WorkflowOrchestrator;
use crate::services::vectorizer::vectorize;
use uvbf_common::Result;

impl WorkflowOrchestrator {
    pub(super) fn phase_vectorization(&mut self) -> Result<String> {
        let outcome = vectorize(&self.store, &self.config.vectorizer)?;
        Ok(format!(
            "{} documents x {} terms",
            outcome.documents, outcome.vocabulary_size
        ))
    }
}
