//! Demo dataset generator and collection stage
//!
//! Real posts are gathered by hand (platform APIs are closed or paid), so
//! the collection stage only checks that `raw_records.json` is present.
//! For trying the pipeline end to end, [`DemoGenerator`] produces a
//! synthetic French-language dataset from a seeded generator.

use crate::config::CollectionConfig;
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::fmt;
use tracing::{info, warn};
use uvbf_common::artifacts::RAW_RECORDS;
use uvbf_common::{ArtifactStore, Error, Platform, Record, Result};

const POSITIVE_TEMPLATES: &[&str] = &[
    "Excellent programme de formation à l'UVBF, je recommande vivement !",
    "Les cours en ligne de l'UVBF sont de grande qualité.",
    "Merci à l'UVBF pour cette formation accessible depuis Bobo-Dioulasso.",
    "Très satisfait de mon parcours à l'UVBF, les tuteurs sont compétents.",
    "Bravo à l'équipe pédagogique de l'UVBF pour le suivi des étudiants.",
    "Super expérience d'apprentissage à distance avec l'UVBF.",
    "La plateforme de l'UVBF est bien pensée, on trouve tout facilement.",
    "Génial de pouvoir suivre une licence en travaillant, merci l'UVBF.",
    "Je suis content des ressources mises à disposition par l'UVBF.",
];

const NEGATIVE_TEMPLATES: &[&str] = &[
    "Problème de connexion encore ce soir sur la plateforme UVBF...",
    "L'inscription à l'UVBF coûte trop cher pour beaucoup d'étudiants.",
    "Déçu par le manque de support technique à l'UVBF.",
    "Trop de bugs sur le site de l'UVBF, c'est frustrant.",
    "Le traitement des dossiers est lent à l'UVBF.",
    "Difficile de joindre le service scolarité de l'UVBF.",
    "Erreur sur mes notes et aucune réponse de l'UVBF, je suis insatisfait.",
    "Le calendrier des examens de l'UVBF est compliqué à suivre.",
];

const NEUTRAL_TEMPLATES: &[&str] = &[
    "Les inscriptions à l'UVBF ouvrent la semaine prochaine.",
    "L'UVBF propose des formations en ligne dans plusieurs domaines.",
    "Comment s'inscrire à l'UVBF ? Quelqu'un peut m'aider ?",
    "Réunion d'information de l'UVBF ce samedi à Ouagadougou.",
    "L'UVBF, c'est l'Université Virtuelle du Burkina Faso.",
    "Quelles filières sont disponibles à l'UVBF cette année ?",
    "Journée portes ouvertes de l'UVBF prévue pour le mois prochain.",
    "Quelqu'un a des retours sur le master en informatique de l'UVBF ?",
];

const FIRST_NAMES: &[&str] = &[
    "Aminata", "Ibrahim", "Fatoumata", "Moussa", "Aïcha", "Seydou", "Salimata", "Abdoulaye",
    "Mariam", "Hamidou", "Fanta", "Boureima", "Rasmata", "Souleymane", "Awa",
];

const LAST_NAMES: &[&str] = &[
    "Ouédraogo", "Traoré", "Kaboré", "Sawadogo", "Compaoré", "Nikièma", "Zongo", "Ilboudo",
    "Barry", "Sana", "Ouattara", "Diallo", "Koné", "Tapsoba", "Bila",
];

const HASHTAGS: &[&str] = &["#UVBF", "#UniversitéVirtuelle", "#BurkinaFaso", "#Formation"];

/// Platform draw weights, in percent: Twitter, Facebook, Instagram, TikTok
const PLATFORM_WEIGHTS: [(Platform, u32); 4] = [
    (Platform::Twitter, 40),
    (Platform::Facebook, 40),
    (Platform::Instagram, 15),
    (Platform::TikTok, 5),
];

/// Publication dates are spread over this many days before the reference time
const SPAN_DAYS: i64 = 270;

/// Seeded synthetic record generator
pub struct DemoGenerator {
    rng: StdRng,
    reference: DateTime<Utc>,
}

impl DemoGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            reference: Utc::now(),
        }
    }

    /// Anchor publication dates to a fixed instant (reproducible output)
    pub fn with_reference_time(mut self, reference: DateTime<Utc>) -> Self {
        self.reference = reference;
        self
    }

    /// Generate `count` unlabeled records with ids `DEMO_0000`, `DEMO_0001`, …
    pub fn generate(&mut self, count: usize) -> Vec<Record> {
        (0..count).map(|i| self.record(i)).collect()
    }

    fn record(&mut self, index: usize) -> Record {
        let templates = match self.rng.gen_range(0..3) {
            0 => POSITIVE_TEMPLATES,
            1 => NEGATIVE_TEMPLATES,
            _ => NEUTRAL_TEMPLATES,
        };
        let text = self.pick(templates);
        let platform = self.platform();
        let author = format!("{} {}", self.pick(FIRST_NAMES), self.pick(LAST_NAMES));

        let offset = Duration::days(self.rng.gen_range(0..=SPAN_DAYS))
            + Duration::seconds(self.rng.gen_range(0..86_400));
        let published_at = self.reference - Duration::days(SPAN_DAYS) + offset;

        let mut record = Record::new(format!("DEMO_{:04}", index), author, platform, text, published_at);
        let tag_count = self.rng.gen_range(1..=3);
        record.hashtags = HASHTAGS
            .choose_multiple(&mut self.rng, tag_count)
            .map(|t| t.to_string())
            .collect();
        record.likes = self.rng.gen_range(5..=200);
        record.shares = self.rng.gen_range(0..=100);
        record.comments = self.rng.gen_range(0..=50);
        record
    }

    fn pick(&mut self, choices: &[&'static str]) -> &'static str {
        choices.choose(&mut self.rng).copied().unwrap_or_default()
    }

    fn platform(&mut self) -> Platform {
        let total: u32 = PLATFORM_WEIGHTS.iter().map(|(_, w)| w).sum();
        let mut draw = self.rng.gen_range(0..total);
        for (platform, weight) in PLATFORM_WEIGHTS {
            if draw < weight {
                return platform;
            }
            draw -= weight;
        }
        Platform::Twitter
    }
}

/// What the collection stage found or produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionOutcome {
    /// Raw records were already present
    Existing(usize),
    Generated(usize),
}

impl fmt::Display for CollectionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionOutcome::Existing(n) => write!(f, "{} raw records present", n),
            CollectionOutcome::Generated(n) => write!(f, "{} demo records generated", n),
        }
    }
}

/// Collection stage
///
/// Keeps existing raw data untouched. Without raw data, demo records are
/// generated only when `generate_demo` is set; otherwise the stage fails
/// with [`Error::ArtifactMissing`].
pub fn collect(
    store: &ArtifactStore,
    config: &CollectionConfig,
    generate_demo: bool,
) -> Result<CollectionOutcome> {
    if store.exists(&RAW_RECORDS) {
        let records: Vec<Record> = store.read(&RAW_RECORDS)?;
        info!(records = records.len(), "Using existing raw records");
        return Ok(CollectionOutcome::Existing(records.len()));
    }

    if !generate_demo {
        warn!(
            path = %store.path(&RAW_RECORDS).display(),
            "No raw records found; place collected data there or pass --generate-demo"
        );
        return Err(Error::ArtifactMissing {
            stage: RAW_RECORDS.stage,
            path: store.path(&RAW_RECORDS),
        });
    }

    let count = write_demo_dataset(store, config.demo_count, config.seed)?;
    Ok(CollectionOutcome::Generated(count))
}

/// Generate and store a demo dataset, replacing any existing raw records
pub fn write_demo_dataset(store: &ArtifactStore, count: usize, seed: u64) -> Result<usize> {
    if count == 0 {
        return Err(Error::InvalidInput(
            "demo dataset size must be positive".to_string(),
        ));
    }
    let records = DemoGenerator::new(seed).generate(count);
    let path = store.write(&RAW_RECORDS, &records)?;
    warn!("Generated records are synthetic and must not be used for analysis");
    info!(records = records.len(), seed, path = %path.display(), "Demo dataset written");
    Ok(records.len())
}
