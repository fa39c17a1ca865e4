//! Integration tests for the Stage Artifact Store
//!
//! Covers:
//! - Record datasets round-trip through JSON (diacritics, legacy names, unknown fields)
//! - Missing and empty files report ArtifactMissing, garbage reports ArtifactCorrupt
//! - Binary and CSV artifacts
//! - Atomic writes leave no temporary files behind

use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tempfile::TempDir;
use uvbf_common::artifacts::{
    ANNOTATED_RECORDS, COMPARISON, MODEL, RAW_RECORDS, REPORT_JSON, REPORT_TEXT,
};
use uvbf_common::{ArtifactStore, Error, Platform, Record, Sentiment, Stage};

fn store() -> (TempDir, ArtifactStore) {
    let dir = TempDir::new().unwrap();
    let store = ArtifactStore::new(dir.path());
    (dir, store)
}

fn record(id: &str, text: &str) -> Record {
    Record::new(
        id,
        "Salif Kaboré",
        Platform::Twitter,
        text,
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap(),
    )
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct ScoreRow {
    model: String,
    score: f64,
}

#[test]
fn test_dataset_roundtrip_preserves_diacritics() {
    // Given: records with accents and emoji
    let (_dir, store) = store();
    let mut labeled = record("R1", "Génial, très motivé pour la formation à l'UVBF 🎓");
    labeled.assign(Sentiment::Positive, true, Utc::now());
    let records = vec![labeled, record("R2", "Problème de connexion à la plateforme, déçu")];

    // When: written and read back
    store.write(&ANNOTATED_RECORDS, &records).unwrap();
    let loaded: Vec<Record> = store.read(&ANNOTATED_RECORDS).unwrap();

    // Then: identical, and the file holds the literal characters
    assert_eq!(loaded, records);
    let raw = std::fs::read_to_string(store.path(&ANNOTATED_RECORDS)).unwrap();
    assert!(raw.contains("très motivé"));
    assert!(raw.contains("🎓"));
}

#[test]
fn test_unknown_fields_survive_rewrite() {
    let (_dir, store) = store();
    let json = r##"[{
        "id": "X1",
        "author": "Awa Traoré",
        "platform": "Instagram",
        "text": "Bonne session",
        "published_at": "2024-01-15T10:00:00Z",
        "hashtags": ["#UVBF"],
        "likes": 3,
        "shares": 1,
        "comments": 0,
        "campus": "Ouagadougou",
        "moderation": {"flagged": false}
    }]"##;
    std::fs::create_dir_all(store.path(&RAW_RECORDS).parent().unwrap()).unwrap();
    std::fs::write(store.path(&RAW_RECORDS), json).unwrap();

    let records: Vec<Record> = store.read(&RAW_RECORDS).unwrap();
    store.write(&ANNOTATED_RECORDS, &records).unwrap();
    let rewritten: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(store.path(&ANNOTATED_RECORDS)).unwrap(),
    )
    .unwrap();

    assert_eq!(rewritten[0]["campus"], "Ouagadougou");
    assert_eq!(rewritten[0]["moderation"]["flagged"], false);
}

#[test]
fn test_legacy_french_field_names_are_read() {
    let (_dir, store) = store();
    let json = r#"[{
        "id": "DEMO_0007",
        "auteur": "Issa Sawadogo",
        "plateforme": "TikTok",
        "texte": "Cours trop compliqué",
        "date_publication": "2024-03-02 18:45:00",
        "hashtags": [],
        "likes": 12,
        "retweets_partages": 4,
        "commentaires": 2,
        "sentiment": "negatif",
        "date_annotation": "2024-03-05T08:00:00.250000",
        "annotation_auto": true,
        "texte_traite": "cours compliqué"
    }]"#;
    std::fs::create_dir_all(store.path(&ANNOTATED_RECORDS).parent().unwrap()).unwrap();
    std::fs::write(store.path(&ANNOTATED_RECORDS), json).unwrap();

    let records: Vec<Record> = store.read(&ANNOTATED_RECORDS).unwrap();

    let r = &records[0];
    assert_eq!(r.author, "Issa Sawadogo");
    assert_eq!(r.platform, Platform::TikTok);
    assert_eq!(r.shares, 4);
    assert_eq!(r.comments, 2);
    assert_eq!(r.sentiment, Some(Sentiment::Negative));
    assert_eq!(r.auto_annotated, Some(true));
    assert_eq!(r.normalized(), "cours compliqué");
    assert!(r.annotated_at.is_some());
    assert!(r.extra.is_empty());
}

#[test]
fn test_missing_artifact_reports_path() {
    let (_dir, store) = store();

    let result: uvbf_common::Result<Vec<Record>> = store.read(&RAW_RECORDS);

    match result {
        Err(Error::ArtifactMissing { stage, path }) => {
            assert_eq!(stage, Stage::Collection);
            assert!(path.ends_with("01_collection/raw_records.json"));
        }
        other => panic!("expected ArtifactMissing, got {:?}", other),
    }
}

#[test]
fn test_empty_file_counts_as_absent() {
    let (_dir, store) = store();
    std::fs::create_dir_all(store.path(&RAW_RECORDS).parent().unwrap()).unwrap();
    std::fs::write(store.path(&RAW_RECORDS), "").unwrap();

    assert!(!store.exists(&RAW_RECORDS));
    let result: uvbf_common::Result<Vec<Record>> = store.read(&RAW_RECORDS);
    assert!(matches!(result, Err(Error::ArtifactMissing { .. })));
}

#[test]
fn test_garbage_reports_artifact_corrupt() {
    let (_dir, store) = store();
    std::fs::create_dir_all(store.path(&RAW_RECORDS).parent().unwrap()).unwrap();
    std::fs::write(store.path(&RAW_RECORDS), "{not json").unwrap();

    let result: uvbf_common::Result<Vec<Record>> = store.read(&RAW_RECORDS);

    assert!(matches!(
        result,
        Err(Error::ArtifactCorrupt { stage: Stage::Collection, .. })
    ));
}

#[test]
fn test_binary_artifact_roundtrip() {
    let (_dir, store) = store();
    let weights = vec![(String::from("bien"), 0.25_f64), (String::from("lent"), -1.5)];

    store.write(&MODEL, &weights).unwrap();
    let loaded: Vec<(String, f64)> = store.read(&MODEL).unwrap();

    assert_eq!(loaded, weights);
}

#[test]
fn test_truncated_binary_is_corrupt() {
    let (_dir, store) = store();
    std::fs::create_dir_all(store.path(&MODEL).parent().unwrap()).unwrap();
    std::fs::write(store.path(&MODEL), [0xFFu8, 0x01]).unwrap();

    let result: uvbf_common::Result<Vec<(String, f64)>> = store.read(&MODEL);

    assert!(matches!(result, Err(Error::ArtifactCorrupt { .. })));
}

#[test]
fn test_csv_rows_with_header() {
    let (_dir, store) = store();
    let rows = vec![
        ScoreRow { model: "Naive Bayes".into(), score: 0.81 },
        ScoreRow { model: "Linear SVM".into(), score: 0.86 },
    ];

    store.write_rows(&COMPARISON, &rows).unwrap();

    let raw = std::fs::read_to_string(store.path(&COMPARISON)).unwrap();
    assert!(raw.starts_with("model,score\n"));
    let loaded: Vec<ScoreRow> = store.read_rows(&COMPARISON).unwrap();
    assert_eq!(loaded, rows);
}

#[test]
fn test_format_mismatch_is_rejected() {
    let (_dir, store) = store();

    assert!(matches!(
        store.write(&COMPARISON, &vec![1, 2, 3]),
        Err(Error::InvalidInput(_))
    ));
    assert!(matches!(
        store.write_text(&REPORT_JSON, "plain"),
        Err(Error::InvalidInput(_))
    ));
}

#[test]
fn test_write_replaces_and_cleans_temp_file() {
    let (_dir, store) = store();

    store.write_text(&REPORT_TEXT, "first draft").unwrap();
    store.write_text(&REPORT_TEXT, "final").unwrap();

    assert_eq!(store.read_text(&REPORT_TEXT).unwrap(), "final");
    let leftovers: Vec<_> = std::fs::read_dir(store.path(&REPORT_TEXT).parent().unwrap())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn test_missing_lists_absent_artifacts() {
    let (_dir, store) = store();
    store.write(&RAW_RECORDS, &Vec::<Record>::new()).unwrap();

    let missing = store.missing(&[RAW_RECORDS, ANNOTATED_RECORDS]);

    assert_eq!(missing, vec![&ANNOTATED_RECORDS]);
}
