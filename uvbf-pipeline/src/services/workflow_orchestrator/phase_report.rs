//! Stage 8: REPORT

use super::WorkflowOrchestrator;
use crate::services::report_generator::generate_report;
use uvbf_common::artifacts::REPORT_TEXT;
use uvbf_common::Result;

impl WorkflowOrchestrator {
    pub(super) fn phase_report(&mut self) -> Result<String> {
        let report = generate_report(&self.store)?;
        Ok(format!(
            "{} annotated records summarized in {}",
            report.data.annotated_records, REPORT_TEXT
        ))
    }
}
