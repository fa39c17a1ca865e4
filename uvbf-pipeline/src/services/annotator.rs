//! Annotation stage
//!
//! Three modes share one working set: `annotated_records.json` when it
//! exists (so labels accumulate across sessions), otherwise the raw records.
//!
//! - **auto**: the keyword heuristic labels up to `count` unlabeled records,
//!   then the dataset is saved once.
//! - **manual**: an [`Operator`] labels records in the window
//!   `[start, start + count)`. Progress is saved every
//!   [`CHECKPOINT_INTERVAL`] labels, when the operator quits, and at the end
//!   of the window if anything was labeled.
//! - **stats**: label distribution only, nothing is written.

use super::keyword_annotator::annotate_auto;
use crate::models::{AnnotationCommand, AnnotationStats, SessionOutcome};
use std::io::{self, BufRead, Write};
use std::ops::Range;
use tracing::{debug, info, warn};
use uvbf_common::artifacts::{ANNOTATED_RECORDS, RAW_RECORDS};
use uvbf_common::{time, ArtifactStore, Record, Result};

/// Labels assigned between two automatic saves in manual mode
pub const CHECKPOINT_INTERVAL: usize = 20;

/// What the operator is shown for one record
#[derive(Debug, Clone, Copy)]
pub struct RecordPrompt<'a> {
    /// Zero-based dataset index
    pub index: usize,
    /// One-based position inside the session window
    pub position: usize,
    pub window_len: usize,
    pub record: &'a Record,
}

/// Source of manual labeling decisions
pub trait Operator {
    /// Block until the operator picks a command for the prompted record
    fn next_command(&mut self, prompt: &RecordPrompt<'_>) -> Result<AnnotationCommand>;
}

/// Line-oriented operator on any reader/writer pair (stdin/stdout by default)
///
/// Unrecognized input re-prompts; end of input counts as quit.
pub struct TerminalOperator<R, W> {
    input: R,
    output: W,
}

impl TerminalOperator<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalOperator<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn show(&mut self, prompt: &RecordPrompt<'_>) -> io::Result<()> {
        let r = prompt.record;
        writeln!(self.output)?;
        writeln!(
            self.output,
            "[{}/{}] #{} {} | {} | {}",
            prompt.position,
            prompt.window_len,
            prompt.index,
            r.id,
            r.platform,
            r.published_at.format("%Y-%m-%d")
        )?;
        writeln!(self.output, "Author: {}", r.author)?;
        writeln!(self.output, "{}", r.text)?;
        writeln!(
            self.output,
            "likes {} | shares {} | comments {}",
            r.likes, r.shares, r.comments
        )?;
        writeln!(self.output, "{}", AnnotationCommand::HELP)
    }
}

impl<R: BufRead, W: Write> Operator for TerminalOperator<R, W> {
    fn next_command(&mut self, prompt: &RecordPrompt<'_>) -> Result<AnnotationCommand> {
        self.show(prompt)?;
        loop {
            write!(self.output, "> ")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(AnnotationCommand::Quit);
            }
            match line.parse::<AnnotationCommand>() {
                Ok(command) => return Ok(command),
                Err(e) => writeln!(self.output, "{}", e)?,
            }
        }
    }
}

/// Run a manual session over `window`, calling `save` at each checkpoint
///
/// Records already labeled inside the window are passed over without
/// prompting. The window is clamped to the dataset.
pub fn annotate_manual<F>(
    records: &mut [Record],
    window: Range<usize>,
    operator: &mut dyn Operator,
    mut save: F,
) -> Result<SessionOutcome>
where
    F: FnMut(&[Record]) -> Result<()>,
{
    let end = window.end.min(records.len());
    let start = window.start.min(end);
    let window_len = end - start;
    let mut outcome = SessionOutcome::default();

    for index in start..end {
        if records[index].is_labeled() {
            continue;
        }

        let command = operator.next_command(&RecordPrompt {
            index,
            position: index - start + 1,
            window_len,
            record: &records[index],
        })?;

        match command {
            AnnotationCommand::Quit => {
                save(records)?;
                outcome.quit = true;
                info!(labeled = outcome.labeled, "Annotation session ended by operator, progress saved");
                return Ok(outcome);
            }
            AnnotationCommand::Skip => outcome.skipped += 1,
            AnnotationCommand::Assign(sentiment) => {
                records[index].assign(sentiment, false, time::now());
                outcome.labeled += 1;
                if outcome.labeled % CHECKPOINT_INTERVAL == 0 {
                    save(records)?;
                    outcome.checkpoints += 1;
                    debug!(labeled = outcome.labeled, "Checkpoint saved");
                }
            }
        }
    }

    if outcome.labeled > 0 {
        save(records)?;
    }
    Ok(outcome)
}

/// Records to annotate: previous annotations if any, else the raw dataset
pub fn load_working_set(store: &ArtifactStore) -> Result<Vec<Record>> {
    if store.exists(&ANNOTATED_RECORDS) {
        debug!("Resuming from existing annotations");
        store.read(&ANNOTATED_RECORDS)
    } else {
        store.read(&RAW_RECORDS)
    }
}

/// Outcome of automatic labeling
#[derive(Debug, Clone)]
pub struct AutoOutcome {
    pub added: usize,
    pub stats: AnnotationStats,
}

/// Auto mode: label up to `count` unlabeled records and save once
pub fn run_auto(store: &ArtifactStore, count: usize) -> Result<AutoOutcome> {
    let mut records = load_working_set(store)?;
    let added = annotate_auto(&mut records, count, time::now());
    store.write(&ANNOTATED_RECORDS, &records)?;

    let stats = AnnotationStats::from_records(&records);
    info!(
        added,
        labeled = stats.labeled,
        total = stats.total,
        "Automatic annotation complete"
    );
    if stats.labeled < stats.total {
        warn!(
            remaining = stats.unlabeled(),
            "Some records remain unlabeled; they are ignored by training"
        );
    }
    Ok(AutoOutcome { added, stats })
}

/// Manual mode over `[start_index, start_index + count)`
pub fn run_manual(
    store: &ArtifactStore,
    operator: &mut dyn Operator,
    start_index: usize,
    count: usize,
) -> Result<SessionOutcome> {
    let mut records = load_working_set(store)?;
    if start_index >= records.len() {
        warn!(
            start_index,
            total = records.len(),
            "Start index is past the end of the dataset; nothing to annotate"
        );
    }

    let window = start_index..start_index.saturating_add(count);
    let outcome = annotate_manual(&mut records, window, operator, |current| {
        store.write(&ANNOTATED_RECORDS, current).map(|_| ())
    })?;

    info!(
        labeled = outcome.labeled,
        skipped = outcome.skipped,
        checkpoints = outcome.checkpoints,
        "Manual annotation session finished"
    );
    Ok(outcome)
}

/// Stats mode
pub fn stats(store: &ArtifactStore) -> Result<AnnotationStats> {
    let records = load_working_set(store)?;
    Ok(AnnotationStats::from_records(&records))
}
