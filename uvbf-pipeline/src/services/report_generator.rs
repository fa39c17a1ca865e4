//! Reporting stage
//!
//! Aggregates the annotated dataset, the model comparison and (when
//! present) the evaluation summary and embedding comparison into
//! `report.json`, and renders the same content as `report.txt`.

use crate::models::report::{
    ClassShare, DataSummary, EvaluationHighlight, Improvement, ModelHighlight, PlatformShare,
    Priority, Recommendations,
};
use crate::models::{AnnotationStats, ComparisonRow, EvaluationSummary, FinalReport};
use std::fmt::Write;
use tracing::info;
use uvbf_common::artifacts::{
    ANNOTATED_RECORDS, COMPARISON, EMBEDDING_COMPARISON, EVALUATION_SUMMARY, REPORT_JSON,
    REPORT_TEXT,
};
use uvbf_common::{time, ArtifactStore, Record, Result, Sentiment};

const RULE_WIDTH: usize = 70;

/// Version and commit of this binary
pub fn generator() -> String {
    format!(
        "{} {} ({})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH")
    )
}

fn shares(stats: &AnnotationStats) -> Vec<ClassShare> {
    Sentiment::ALL
        .iter()
        .map(|&s| ClassShare {
            sentiment: s.as_str().to_string(),
            count: stats.count(s),
            percentage: stats.percentage(s),
        })
        .collect()
}

pub fn data_summary(records: &[Record]) -> DataSummary {
    let stats = AnnotationStats::from_records(records);
    let by_platform = stats
        .by_platform
        .iter()
        .map(|(platform, counts)| {
            let annotated: usize = counts.values().sum();
            PlatformShare {
                platform: platform.to_string(),
                annotated,
                shares: Sentiment::ALL
                    .iter()
                    .map(|s| {
                        let count = counts.get(s).copied().unwrap_or(0);
                        ClassShare {
                            sentiment: s.as_str().to_string(),
                            count,
                            percentage: count as f64 * 100.0 / annotated as f64,
                        }
                    })
                    .collect(),
            }
        })
        .collect();

    DataSummary {
        total_records: stats.total,
        annotated_records: stats.labeled,
        distribution: shares(&stats),
        by_platform,
    }
}

pub fn recommendations() -> Recommendations {
    Recommendations {
        strengths: vec![
            "Teaching quality".to_string(),
            "Flexibility of the programmes".to_string(),
            "Pedagogical innovation".to_string(),
        ],
        improvements: vec![
            Improvement {
                area: "Technical infrastructure".to_string(),
                priority: Priority::High,
            },
            Improvement {
                area: "Financial accessibility".to_string(),
                priority: Priority::Medium,
            },
            Improvement {
                area: "Student support".to_string(),
                priority: Priority::Medium,
            },
        ],
    }
}

/// Assemble the report from already loaded inputs
pub fn build_report(
    records: &[Record],
    comparison: Vec<ComparisonRow>,
    evaluation: Option<&EvaluationSummary>,
    embedding: Option<&[ComparisonRow]>,
) -> FinalReport {
    let highlight = |row: &ComparisonRow| ModelHighlight {
        model: row.model.clone(),
        test_accuracy: row.test_score,
    };

    FinalReport {
        generated_at: time::now(),
        generator: generator(),
        data: data_summary(records),
        best_model: ComparisonRow::best(&comparison).map(highlight),
        evaluation: evaluation.map(|e| EvaluationHighlight {
            model: e.model.clone(),
            accuracy: e.accuracy,
            macro_f1: e.macro_avg.f1_score,
            weighted_f1: e.weighted_avg.f1_score,
        }),
        embedding: embedding.and_then(ComparisonRow::best).map(highlight),
        models: comparison,
        recommendations: recommendations(),
    }
}

fn priority_label(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "high",
        Priority::Medium => "medium",
        Priority::Low => "low",
    }
}

/// Plain-text rendering of `report`
pub fn render_text(report: &FinalReport) -> String {
    let heavy = "=".repeat(RULE_WIDTH);
    let light = "-".repeat(RULE_WIDTH);
    let mut out = String::new();

    // Writing into a String cannot fail
    let _ = writeln!(out, "{}", heavy);
    let _ = writeln!(out, "FINAL REPORT - UVBF SENTIMENT ANALYSIS");
    let _ = writeln!(out, "{}", heavy);
    let _ = writeln!(out, "Date      : {}", report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"));
    let _ = writeln!(out, "Generator : {}", report.generator);

    let d = &report.data;
    let _ = writeln!(out, "\n{}\n1. COLLECTED AND ANNOTATED DATA\n{}", light, light);
    let _ = writeln!(out, "Total records     : {}", d.total_records);
    let _ = writeln!(out, "Annotated records : {}", d.annotated_records);
    let _ = writeln!(out, "\nSentiment distribution:");
    for share in &d.distribution {
        let _ = writeln!(
            out,
            "  {:<9} {:>5.1}% ({})",
            share.sentiment, share.percentage, share.count
        );
    }
    if !d.by_platform.is_empty() {
        let _ = writeln!(out, "\nBy platform:");
        for platform in &d.by_platform {
            let parts: Vec<String> = platform
                .shares
                .iter()
                .map(|s| format!("{} {:.1}%", s.sentiment, s.percentage))
                .collect();
            let _ = writeln!(
                out,
                "  {:<10} {:>4} annotated | {}",
                platform.platform,
                platform.annotated,
                parts.join(", ")
            );
        }
    }

    let _ = writeln!(out, "\n{}\n2. MODEL PERFORMANCE\n{}", light, light);
    for row in &report.models {
        let _ = writeln!(
            out,
            "  {:<32} train {:.4} | cv {:.4} ± {:.4} | test {:.4}",
            row.model, row.train_score, row.cv_score, row.cv_std, row.test_score
        );
    }
    match &report.best_model {
        Some(best) => {
            let _ = writeln!(out, "\nBest model : {}", best.model);
            let _ = writeln!(out, "Accuracy   : {:.2}%", best.test_accuracy * 100.0);
        }
        None => {
            let _ = writeln!(out, "\nNo model was compared.");
        }
    }
    if let Some(e) = &report.evaluation {
        let _ = writeln!(
            out,
            "Evaluation : accuracy {:.2}%, macro F1 {:.4}, weighted F1 {:.4} ({})",
            e.accuracy * 100.0,
            e.macro_f1,
            e.weighted_f1,
            e.model
        );
    }
    if let Some(emb) = &report.embedding {
        let _ = writeln!(
            out,
            "Embedding  : {} at {:.2}%",
            emb.model,
            emb.test_accuracy * 100.0
        );
    }

    let _ = writeln!(out, "\n{}\n3. RECOMMENDATIONS\n{}", light, light);
    let _ = writeln!(out, "Strengths:");
    for strength in &report.recommendations.strengths {
        let _ = writeln!(out, "  + {}", strength);
    }
    let _ = writeln!(out, "\nAreas for improvement:");
    for improvement in &report.recommendations.improvements {
        let _ = writeln!(
            out,
            "  - {} ({} priority)",
            improvement.area,
            priority_label(improvement.priority)
        );
    }

    let _ = writeln!(out, "\n{}\nEND OF REPORT\n{}", heavy, heavy);
    out
}

pub fn generate_report(store: &ArtifactStore) -> Result<FinalReport> {
    let records: Vec<Record> = store.read(&ANNOTATED_RECORDS)?;
    let comparison: Vec<ComparisonRow> = store.read_rows(&COMPARISON)?;
    let evaluation: Option<EvaluationSummary> = if store.exists(&EVALUATION_SUMMARY) {
        Some(store.read(&EVALUATION_SUMMARY)?)
    } else {
        None
    };
    let embedding: Option<Vec<ComparisonRow>> = if store.exists(&EMBEDDING_COMPARISON) {
        Some(store.read_rows(&EMBEDDING_COMPARISON)?)
    } else {
        None
    };

    let report = build_report(&records, comparison, evaluation.as_ref(), embedding.as_deref());
    store.write(&REPORT_JSON, &report)?;
    store.write_text(&REPORT_TEXT, &render_text(&report))?;

    info!(
        annotated = report.data.annotated_records,
        best_model = report.best_model.as_ref().map(|b| b.model.as_str()).unwrap_or("none"),
        "Final report written"
    );
    Ok(report)
}
