//! Stage 1: COLLECTION
//!
//! Raw data is kept as-is when present. Demo data is only generated on
//! explicit request.

use super::WorkflowOrchestrator;
use crate::services::demo_generator::collect;
use uvbf_common::Result;

impl WorkflowOrchestrator {
    pub(super) fn phase_collection(&mut self) -> Result<String> {
        let outcome = collect(&self.store, &self.config.collection, self.options.generate_demo)?;
        Ok(outcome.to_string())
    }
}
