//! Annotation session models

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uvbf_common::{Error, Platform, Record, Sentiment};

/// One operator decision during manual labeling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationCommand {
    Assign(Sentiment),
    Skip,
    /// Save progress and end the session
    Quit,
}

impl AnnotationCommand {
    pub const HELP: &'static str = "p = positive, n = negative, e = neutral, s = skip, q = quit and save";
}

impl FromStr for AnnotationCommand {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "p" => Ok(AnnotationCommand::Assign(Sentiment::Positive)),
            "n" => Ok(AnnotationCommand::Assign(Sentiment::Negative)),
            "e" => Ok(AnnotationCommand::Assign(Sentiment::Neutral)),
            "s" => Ok(AnnotationCommand::Skip),
            "q" => Ok(AnnotationCommand::Quit),
            other => Err(Error::InvalidInput(format!(
                "unrecognized command '{}' ({})",
                other,
                AnnotationCommand::HELP
            ))),
        }
    }
}

/// What a manual session did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionOutcome {
    /// Labels assigned in this session
    pub labeled: usize,
    pub skipped: usize,
    /// Saves triggered by the checkpoint interval
    pub checkpoints: usize,
    /// Session ended by the operator rather than by reaching the window end
    pub quit: bool,
}

/// Label distribution over a dataset
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnnotationStats {
    pub total: usize,
    pub labeled: usize,
    pub counts: BTreeMap<Sentiment, usize>,
    pub by_platform: BTreeMap<Platform, BTreeMap<Sentiment, usize>>,
}

impl AnnotationStats {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a Record>) -> Self {
        let mut stats = AnnotationStats::default();
        for record in records {
            stats.total += 1;
            if let Some(sentiment) = record.sentiment {
                stats.labeled += 1;
                *stats.counts.entry(sentiment).or_insert(0) += 1;
                *stats
                    .by_platform
                    .entry(record.platform)
                    .or_default()
                    .entry(sentiment)
                    .or_insert(0) += 1;
            }
        }
        stats
    }

    pub fn unlabeled(&self) -> usize {
        self.total - self.labeled
    }

    pub fn count(&self, sentiment: Sentiment) -> usize {
        self.counts.get(&sentiment).copied().unwrap_or(0)
    }

    /// Share of labeled records carrying `sentiment`, in percent
    pub fn percentage(&self, sentiment: Sentiment) -> f64 {
        if self.labeled == 0 {
            0.0
        } else {
            self.count(sentiment) as f64 * 100.0 / self.labeled as f64
        }
    }
}

impl fmt::Display for AnnotationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Annotated: {}/{} ({} remaining)",
            self.labeled,
            self.total,
            self.unlabeled()
        )?;
        for sentiment in Sentiment::ALL {
            writeln!(
                f,
                "  {:<9} {:>5} ({:.1}%)",
                sentiment.as_str(),
                self.count(sentiment),
                self.percentage(sentiment)
            )?;
        }
        for (platform, counts) in &self.by_platform {
            let parts: Vec<String> = Sentiment::ALL
                .iter()
                .map(|s| format!("{}={}", s, counts.get(s).copied().unwrap_or(0)))
                .collect();
            writeln!(f, "  {:<9} {}", platform.as_str(), parts.join(" "))?;
        }
        Ok(())
    }
}
