//! Stage 2: ANNOTATION

use super::WorkflowOrchestrator;
use crate::config::AnnotationMode;
use crate::services::annotator::{run_auto, run_manual, stats, TerminalOperator};
use uvbf_common::Result;

impl WorkflowOrchestrator {
    pub(super) fn phase_annotation(&mut self) -> Result<String> {
        let count = self.options.annotation_count;
        match self.options.annotation_mode {
            AnnotationMode::Auto => {
                let outcome = run_auto(&self.store, count)?;
                Ok(format!(
                    "{} records labeled automatically ({}/{} labeled)",
                    outcome.added, outcome.stats.labeled, outcome.stats.total
                ))
            }
            AnnotationMode::Manual => {
                let start = self.options.start_index;
                let outcome = match self.operator.as_mut() {
                    Some(operator) => run_manual(&self.store, &mut **operator, start, count)?,
                    None => run_manual(&self.store, &mut TerminalOperator::stdio(), start, count)?,
                };
                Ok(format!(
                    "{} labeled, {} skipped{}",
                    outcome.labeled,
                    outcome.skipped,
                    if outcome.quit { ", stopped by operator" } else { "" }
                ))
            }
            AnnotationMode::Stats => {
                let stats = stats(&self.store)?;
                println!("{}", stats);
                Ok(format!("{}/{} records labeled", stats.labeled, stats.total))
            }
        }
    }
}
