//! Stage Artifact Store
//!
//! The store is the only channel between stages. Each artifact lives at
//! `<root>/<stage directory>/<file name>` and is written atomically
//! (temporary file in the same directory, then rename), so a crash never
//! leaves a half-written artifact behind for the next stage to trip over.
//!
//! A file that exists but is empty counts as absent.

use crate::artifacts::{ArtifactFormat, ArtifactRef};
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File-system backed artifact store rooted at the project folder
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of an artifact
    pub fn path(&self, artifact: &ArtifactRef) -> PathBuf {
        self.root.join(artifact.relative_path())
    }

    /// True if the artifact file exists and is non-empty
    pub fn exists(&self, artifact: &ArtifactRef) -> bool {
        fs::metadata(self.path(artifact))
            .map(|meta| meta.is_file() && meta.len() > 0)
            .unwrap_or(false)
    }

    /// Artifacts from `artifacts` that are not present
    pub fn missing<'a>(&self, artifacts: &'a [ArtifactRef]) -> Vec<&'a ArtifactRef> {
        artifacts.iter().filter(|a| !self.exists(a)).collect()
    }

    /// Serialize a JSON or binary artifact
    pub fn write<T>(&self, artifact: &ArtifactRef, payload: &T) -> Result<PathBuf>
    where
        T: Serialize + ?Sized,
    {
        let bytes = match artifact.format {
            ArtifactFormat::Json => serde_json::to_vec_pretty(payload)
                .map_err(|e| self.encode_error(artifact, e))?,
            ArtifactFormat::Binary => {
                bincode::serialize(payload).map_err(|e| self.encode_error(artifact, e))?
            }
            ArtifactFormat::Csv | ArtifactFormat::Text => {
                return Err(self.format_error(artifact, "write"));
            }
        };
        self.write_atomic(artifact, &bytes)
    }

    /// Deserialize a JSON or binary artifact
    pub fn read<T>(&self, artifact: &ArtifactRef) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let bytes = self.read_bytes(artifact)?;
        match artifact.format {
            ArtifactFormat::Json => {
                serde_json::from_slice(&bytes).map_err(|e| self.corrupt(artifact, e))
            }
            ArtifactFormat::Binary => {
                bincode::deserialize(&bytes).map_err(|e| self.corrupt(artifact, e))
            }
            ArtifactFormat::Csv | ArtifactFormat::Text => Err(self.format_error(artifact, "read")),
        }
    }

    /// Write a headered CSV table
    ///
    /// Struct rows get a header derived from their field names; sequence rows
    /// are written as-is, so the caller supplies its own header row.
    pub fn write_rows<T>(&self, artifact: &ArtifactRef, rows: &[T]) -> Result<PathBuf>
    where
        T: Serialize,
    {
        if artifact.format != ArtifactFormat::Csv {
            return Err(self.format_error(artifact, "write_rows"));
        }
        let mut writer = csv::Writer::from_writer(Vec::new());
        for row in rows {
            writer
                .serialize(row)
                .map_err(|e| self.encode_error(artifact, e))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| self.encode_error(artifact, e))?;
        self.write_atomic(artifact, &bytes)
    }

    /// Read a headered CSV table into typed rows
    pub fn read_rows<T>(&self, artifact: &ArtifactRef) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        if artifact.format != ArtifactFormat::Csv {
            return Err(self.format_error(artifact, "read_rows"));
        }
        let bytes = self.read_bytes(artifact)?;
        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        reader
            .deserialize()
            .collect::<std::result::Result<Vec<T>, _>>()
            .map_err(|e| self.corrupt(artifact, e))
    }

    pub fn write_text(&self, artifact: &ArtifactRef, text: &str) -> Result<PathBuf> {
        if artifact.format != ArtifactFormat::Text {
            return Err(self.format_error(artifact, "write_text"));
        }
        self.write_atomic(artifact, text.as_bytes())
    }

    pub fn read_text(&self, artifact: &ArtifactRef) -> Result<String> {
        let bytes = self.read_bytes(artifact)?;
        String::from_utf8(bytes).map_err(|e| self.corrupt(artifact, e))
    }

    fn read_bytes(&self, artifact: &ArtifactRef) -> Result<Vec<u8>> {
        let path = self.path(artifact);
        if !self.exists(artifact) {
            return Err(Error::ArtifactMissing {
                stage: artifact.stage,
                path,
            });
        }
        debug!(artifact = %artifact, "Reading artifact");
        Ok(fs::read(&path)?)
    }

    fn write_atomic(&self, artifact: &ArtifactRef, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.path(artifact);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut temp = path.clone().into_os_string();
        temp.push(".tmp");
        let temp = PathBuf::from(temp);

        fs::write(&temp, bytes)?;
        if let Err(e) = fs::rename(&temp, &path) {
            let _ = fs::remove_file(&temp);
            return Err(e.into());
        }

        debug!(artifact = %artifact, bytes = bytes.len(), "Wrote artifact");
        Ok(path)
    }

    fn corrupt(&self, artifact: &ArtifactRef, reason: impl ToString) -> Error {
        Error::ArtifactCorrupt {
            stage: artifact.stage,
            path: self.path(artifact),
            reason: reason.to_string(),
        }
    }

    fn encode_error(&self, artifact: &ArtifactRef, reason: impl ToString) -> Error {
        Error::InvalidInput(format!(
            "cannot encode {}: {}",
            artifact,
            reason.to_string()
        ))
    }

    fn format_error(&self, artifact: &ArtifactRef, operation: &str) -> Error {
        Error::InvalidInput(format!(
            "{} does not support {:?} artifact {}",
            operation, artifact.format, artifact
        ))
    }
}
