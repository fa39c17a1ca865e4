//! Stage 6: EMBEDDING (optional in the full chain)

use super::WorkflowOrchestrator;
use crate::services::embedder::run_embedding;
use uvbf_common::Result;

impl WorkflowOrchestrator {
    pub(super) fn phase_embedding(&mut self) -> Result<String> {
        let outcome = run_embedding(
            &self.store,
            self.embedder.as_ref(),
            &self.config.embedding,
            &self.config.training,
        )?;
        let comparison = match &outcome.tfidf_best {
            Some(tfidf) => format!(
                ", {:+.2} points vs TF-IDF",
                (outcome.best.test_score - tfidf.test_score) * 100.0
            ),
            None => String::new(),
        };
        Ok(format!(
            "best {} at {:.2}%{}",
            outcome.best.model,
            outcome.best.test_score * 100.0,
            comparison
        ))
    }
}
