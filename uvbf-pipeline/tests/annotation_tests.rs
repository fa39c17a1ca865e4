//! Integration tests for the annotation stage
//!
//! Covers:
//! - Manual sessions: labeling, skip, quit-and-save, checkpoint cadence, resume
//! - Terminal operator parsing and end of input
//! - Automatic labeling: label count, determinism, idempotence

mod support;

use std::io::Cursor;
use support::{records, ScriptedOperator};
use tempfile::TempDir;
use uvbf_common::artifacts::{ANNOTATED_RECORDS, RAW_RECORDS};
use uvbf_common::{labeled_count, ArtifactStore, Record, Sentiment};
use uvbf_pipeline::models::{AnnotationCommand, AnnotationStats};
use uvbf_pipeline::services::annotator::{annotate_manual, run_auto, run_manual};
use uvbf_pipeline::services::{TerminalOperator, CHECKPOINT_INTERVAL};

const P: AnnotationCommand = AnnotationCommand::Assign(Sentiment::Positive);
const N: AnnotationCommand = AnnotationCommand::Assign(Sentiment::Negative);
const E: AnnotationCommand = AnnotationCommand::Assign(Sentiment::Neutral);
const S: AnnotationCommand = AnnotationCommand::Skip;
const Q: AnnotationCommand = AnnotationCommand::Quit;

fn store_with(raw: &[Record]) -> (TempDir, ArtifactStore) {
    let dir = TempDir::new().unwrap();
    let store = ArtifactStore::new(dir.path());
    store.write(&RAW_RECORDS, raw).unwrap();
    (dir, store)
}

fn saved(store: &ArtifactStore) -> Vec<Record> {
    store.read(&ANNOTATED_RECORDS).unwrap()
}

#[test]
fn test_manual_session_labels_whole_window() {
    // Given: 10 unlabeled records
    let (_dir, store) = store_with(&records(10));
    let mut operator = ScriptedOperator::new([P, P, P, P, N, N, N, E, E, E]);

    // When: the operator labels all of them
    let outcome = run_manual(&store, &mut operator, 0, 10).unwrap();

    // Then: 4 positive, 3 negative, 3 neutral are persisted
    assert_eq!(outcome.labeled, 10);
    assert!(!outcome.quit);
    let stats = AnnotationStats::from_records(&saved(&store));
    assert_eq!(stats.count(Sentiment::Positive), 4);
    assert_eq!(stats.count(Sentiment::Negative), 3);
    assert_eq!(stats.count(Sentiment::Neutral), 3);
    assert_eq!(stats.unlabeled(), 0);
    assert!(saved(&store).iter().all(|r| r.auto_annotated == Some(false)));
}

#[test]
fn test_quit_before_checkpoint_persists_every_label() {
    // Given: 50 records and an operator who labels 7 then quits
    let (_dir, store) = store_with(&records(50));
    let mut operator = ScriptedOperator::new([P, N, E, P, N, E, P, Q]);

    // When
    let outcome = run_manual(&store, &mut operator, 0, 50).unwrap();

    // Then: no checkpoint fired, yet all 7 labels are on disk
    assert!(outcome.quit);
    assert_eq!(outcome.checkpoints, 0);
    let records = saved(&store);
    assert_eq!(labeled_count(&records), 7);
    assert!(records[..7].iter().all(|r| r.is_labeled()));
    assert!(records[7..].iter().all(|r| !r.is_labeled()));
}

#[test]
fn test_checkpoint_every_twenty_labels() {
    // Given: an operator labeling 45 records before quitting
    let mut records = records(60);
    let mut commands = vec![P; 45];
    commands.push(Q);
    let mut operator = ScriptedOperator::new(commands);
    let mut snapshots = Vec::new();

    // When
    let outcome = annotate_manual(&mut records, 0..60, &mut operator, |current| {
        snapshots.push(labeled_count(current));
        Ok(())
    })
    .unwrap();

    // Then: saves at 20 and 40 labels, then on quit
    assert_eq!(CHECKPOINT_INTERVAL, 20);
    assert_eq!(outcome.checkpoints, 2);
    assert_eq!(snapshots, vec![20, 40, 45]);
}

#[test]
fn test_skip_leaves_records_unlabeled() {
    let (_dir, store) = store_with(&records(3));
    let mut operator = ScriptedOperator::new([S, P, S]);

    let outcome = run_manual(&store, &mut operator, 0, 3).unwrap();

    assert_eq!(outcome.labeled, 1);
    assert_eq!(outcome.skipped, 2);
    let records = saved(&store);
    assert!(!records[0].is_labeled());
    assert_eq!(records[1].sentiment, Some(Sentiment::Positive));
    assert!(!records[2].is_labeled());
}

#[test]
fn test_session_without_labels_writes_nothing() {
    let (_dir, store) = store_with(&records(2));
    let mut operator = ScriptedOperator::new([S, S]);

    let outcome = run_manual(&store, &mut operator, 0, 2).unwrap();

    assert_eq!(outcome.labeled, 0);
    assert!(!store.exists(&ANNOTATED_RECORDS));
}

#[test]
fn test_resume_skips_labeled_records_without_prompting() {
    // Given: a first session labeled records 0 and 1, then quit
    let (_dir, store) = store_with(&records(5));
    let mut first = ScriptedOperator::new([P, N, Q]);
    run_manual(&store, &mut first, 0, 5).unwrap();

    // When: a second session covers the same window
    let mut second = ScriptedOperator::new([E, E, E]);
    let outcome = run_manual(&store, &mut second, 0, 5).unwrap();

    // Then: only the unlabeled records were shown; earlier labels kept
    assert_eq!(second.prompted, vec![2, 3, 4]);
    assert_eq!(outcome.labeled, 3);
    let records = saved(&store);
    assert_eq!(records[0].sentiment, Some(Sentiment::Positive));
    assert_eq!(records[1].sentiment, Some(Sentiment::Negative));
    assert_eq!(labeled_count(&records), 5);
}

#[test]
fn test_window_is_clamped_to_dataset() {
    let (_dir, store) = store_with(&records(4));
    let mut operator = ScriptedOperator::new([P, P, P, P]);

    let outcome = run_manual(&store, &mut operator, 2, 100).unwrap();

    assert_eq!(operator.prompted, vec![2, 3]);
    assert_eq!(outcome.labeled, 2);

    let mut past_end = ScriptedOperator::new([P]);
    let outcome = run_manual(&store, &mut past_end, 10, 5).unwrap();
    assert!(past_end.prompted.is_empty());
    assert_eq!(outcome.labeled, 0);
}

#[test]
fn test_terminal_operator_reprompts_and_treats_eof_as_quit() {
    // Given: one valid label, one typo, one valid label, then end of input
    let (_dir, store) = store_with(&records(5));
    let input = Cursor::new("p\nx\n N \n");
    let mut output = Vec::new();

    // When
    let outcome = {
        let mut operator = TerminalOperator::new(input, &mut output);
        run_manual(&store, &mut operator, 0, 5).unwrap()
    };

    // Then: two labels saved, the typo was reported
    assert!(outcome.quit);
    assert_eq!(outcome.labeled, 2);
    let records = saved(&store);
    assert_eq!(records[0].sentiment, Some(Sentiment::Positive));
    assert_eq!(records[1].sentiment, Some(Sentiment::Negative));
    let shown = String::from_utf8(output).unwrap();
    assert!(shown.contains("unrecognized command 'x'"));
    assert!(shown.contains("R000"));
}

fn keyword_records() -> Vec<Record> {
    let texts = [
        "Excellent cours, merci à l'équipe",
        "Problème de connexion, je suis déçu",
        "Les inscriptions ouvrent lundi",
        "Super tuteurs mais la plateforme est lente",
        "C'est bien mais c'est lent",
        "Formation de qualité, bravo",
        "Trop cher et compliqué",
        "Réunion samedi",
        "Génial !",
        "Pire session, erreur sur les notes",
    ];
    let mut base = records(texts.len());
    for (record, text) in base.iter_mut().zip(texts) {
        record.text = text.to_string();
    }
    base
}

#[test]
fn test_auto_adds_min_of_count_and_unlabeled() {
    // Given: 10 records, 3 already labeled by hand
    let mut raw = keyword_records();
    for r in raw.iter_mut().take(3) {
        r.assign(Sentiment::Neutral, false, chrono::Utc::now());
    }
    let (_dir, store) = store_with(&raw);

    // When: asking for 5, then for 20 more
    let first = run_auto(&store, 5).unwrap();
    let second = run_auto(&store, 20).unwrap();

    // Then: 5 added, then the remaining 2
    assert_eq!(first.added, 5);
    assert_eq!(second.added, 2);
    assert_eq!(second.stats.labeled, 10);
    let records = saved(&store);
    // hand labels untouched
    assert!(records[..3]
        .iter()
        .all(|r| r.sentiment == Some(Sentiment::Neutral) && r.auto_annotated == Some(false)));
}

#[test]
fn test_auto_is_deterministic_and_idempotent() {
    // Given: two identical datasets
    let (_dir_a, store_a) = store_with(&keyword_records());
    let (_dir_b, store_b) = store_with(&keyword_records());

    // When: labeled independently, and the first one twice
    run_auto(&store_a, 100).unwrap();
    let labels_once: Vec<_> = saved(&store_a).iter().map(|r| r.sentiment).collect();
    let again = run_auto(&store_a, 100).unwrap();
    run_auto(&store_b, 100).unwrap();

    // Then: same labels everywhere, nothing relabeled
    assert_eq!(again.added, 0);
    let labels_twice: Vec<_> = saved(&store_a).iter().map(|r| r.sentiment).collect();
    let labels_other: Vec<_> = saved(&store_b).iter().map(|r| r.sentiment).collect();
    assert_eq!(labels_once, labels_twice);
    assert_eq!(labels_once, labels_other);

    assert_eq!(
        labels_once,
        vec![
            Some(Sentiment::Positive),
            Some(Sentiment::Negative),
            Some(Sentiment::Neutral),
            // super vs lente
            Some(Sentiment::Neutral),
            Some(Sentiment::Neutral),
            Some(Sentiment::Positive),
            Some(Sentiment::Negative),
            Some(Sentiment::Neutral),
            Some(Sentiment::Positive),
            Some(Sentiment::Negative),
        ]
    );
}
