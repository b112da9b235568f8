//! TrueTunes registry store.
//!
//! Implements [`pipeline::RegistryStore`] over three JSON documents in a data
//! directory (`pending.json`, `flagged.json`, `stats.json`). These are the
//! files the browser extension fetches, so they are pretty-printed and keep the
//! published field names.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** File layout, encoding and write atomicity live here;
//! the [`pipeline`] crate sees only [`pipeline::RegistrySnapshot`] and
//! [`pipeline::RegistryError`].
//!
//! ## Write atomicity
//!
//! [`FileRegistryStore::persist`] encodes all three documents first, writes
//! each to a uniquely named temp file next to its target, and only then renames
//! the temp files over the targets, `flagged.json` first. A crash leaves either
//! the old or the new version of each file, never a truncated one, and a
//! failed rename removes the temp files that were not committed.

mod init;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use pipeline::{
    FlaggedRegistry, PendingRegistry, RegistryError, RegistrySnapshot, RegistryStore, RunStats,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

pub use init::{InitOutcome, InitReport};

/// One of the three registry documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryFile {
    Pending,
    Flagged,
    Stats,
}

impl RegistryFile {
    pub const ALL: [RegistryFile; 3] = [Self::Pending, Self::Flagged, Self::Stats];

    pub fn file_name(self) -> &'static str {
        match self {
            Self::Pending => "pending.json",
            Self::Flagged => "flagged.json",
            Self::Stats => "stats.json",
        }
    }
}

impl std::fmt::Display for RegistryFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Registry documents stored as JSON files in one directory.
#[derive(Debug, Clone)]
pub struct FileRegistryStore {
    dir: PathBuf,
}

impl FileRegistryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, file: RegistryFile) -> PathBuf {
        self.dir.join(file.file_name())
    }

    async fn read_document<T: DeserializeOwned>(
        &self,
        file: RegistryFile,
    ) -> Result<T, RegistryError> {
        let path = self.path(file);
        let bytes = tokio::fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RegistryError::Missing {
                    path: path.display().to_string(),
                }
            } else {
                RegistryError::Read {
                    path: path.display().to_string(),
                    message: e.to_string(),
                }
            }
        })?;
        serde_json::from_slice(&bytes).map_err(|e| RegistryError::Corrupt {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}

pub(crate) fn encode<T: Serialize>(path: &Path, document: &T) -> Result<Vec<u8>, RegistryError> {
    serde_json::to_vec_pretty(document).map_err(|e| RegistryError::Write {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Writes `bytes` to a fresh temp file beside `path` and returns the temp path.
pub(crate) async fn stage(path: &Path, bytes: &[u8]) -> Result<PathBuf, RegistryError> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp = path.with_file_name(format!(".{file_name}.{}.tmp", Uuid::new_v4().simple()));
    tokio::fs::write(&temp, bytes)
        .await
        .map_err(|e| RegistryError::Write {
            path: temp.display().to_string(),
            message: e.to_string(),
        })?;
    Ok(temp)
}

pub(crate) async fn commit(temp: &Path, path: &Path) -> Result<(), RegistryError> {
    tokio::fs::rename(temp, path)
        .await
        .map_err(|e| RegistryError::Write {
            path: path.display().to_string(),
            message: format!("failed to finalize {}: {e}", temp.display()),
        })
}

/// Removes staged temp files that will not be committed.
async fn discard(staged: &[(PathBuf, PathBuf)]) {
    for (temp, _) in staged {
        if let Err(e) = tokio::fs::remove_file(temp).await {
            tracing::warn!(path = %temp.display(), error = %e, "Failed to remove staged file");
        }
    }
}

#[async_trait]
impl RegistryStore for FileRegistryStore {
    async fn load(&self) -> Result<RegistrySnapshot, RegistryError> {
        let pending: PendingRegistry = self.read_document(RegistryFile::Pending).await?;
        let flagged: FlaggedRegistry = self.read_document(RegistryFile::Flagged).await?;
        let stats: RunStats = self.read_document(RegistryFile::Stats).await?;

        tracing::debug!(
            dir = %self.dir.display(),
            pending = pending.artists.len(),
            flagged = flagged.artists.len(),
            "Loaded registry"
        );
        Ok(RegistrySnapshot {
            pending,
            flagged,
            stats,
        })
    }

    async fn persist(&self, snapshot: &RegistrySnapshot) -> Result<(), RegistryError> {
        // Flagged is committed first: if a later rename fails, a promoted
        // subject is left in both registries rather than in neither.
        let documents = [
            (
                self.path(RegistryFile::Flagged),
                encode(&self.path(RegistryFile::Flagged), &snapshot.flagged)?,
            ),
            (
                self.path(RegistryFile::Pending),
                encode(&self.path(RegistryFile::Pending), &snapshot.pending)?,
            ),
            (
                self.path(RegistryFile::Stats),
                encode(&self.path(RegistryFile::Stats), &snapshot.stats)?,
            ),
        ];

        let mut staged = Vec::with_capacity(documents.len());
        for (path, bytes) in documents {
            match stage(&path, &bytes).await {
                Ok(temp) => staged.push((temp, path)),
                Err(e) => {
                    discard(&staged).await;
                    return Err(e);
                }
            }
        }

        for (position, (temp, path)) in staged.iter().enumerate() {
            if let Err(e) = commit(temp, path).await {
                discard(&staged[position..]).await;
                return Err(e);
            }
        }

        tracing::info!(
            dir = %self.dir.display(),
            pending = snapshot.pending.artists.len(),
            flagged = snapshot.flagged.artists.len(),
            "Persisted registry"
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
