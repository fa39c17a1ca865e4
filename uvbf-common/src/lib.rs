//! # UVBF Common Library
//!
//! Shared code for the UVBF sentiment pipeline including:
//! - Record data model (social-media posts and their annotations)
//! - Stage identifiers and the artifact catalog
//! - Stage Artifact Store (file-based hand-off between stages)
//! - Configuration loading and root folder resolution
//! - Error taxonomy

pub mod artifacts;
pub mod config;
pub mod error;
pub mod record;
pub mod stage;
pub mod store;
pub mod time;

pub use artifacts::{ArtifactFormat, ArtifactRef};
pub use error::{Error, Result};
pub use record::{labeled_count, Platform, Record, Sentiment};
pub use stage::Stage;
pub use store::ArtifactStore;
