//! Data-directory scaffolding.
//!
//! `init` makes a data directory usable by a run: missing documents are
//! created empty, unreadable ones are backed up and replaced, and valid ones are
//! kept unless `force` is set.

use std::path::{Path, PathBuf};

use pipeline::{
    FlaggedRegistry, PendingRegistry, RegistryError, RegistrySnapshot, RunStats, Timestamp,
};
use serde::de::DeserializeOwned;

use crate::{commit, encode, stage, FileRegistryStore, RegistryFile};

/// What `init` did to one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    /// The file did not exist and was created empty.
    Created,
    /// The file was a valid document and was left alone.
    Kept,
    /// The file was a valid document and was replaced because `force` was set.
    Overwritten,
    /// The file could not be decoded; it was copied to `backup` and replaced.
    Replaced { backup: PathBuf },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitReport {
    pub files: Vec<(RegistryFile, InitOutcome)>,
}

impl InitReport {
    pub fn outcome(&self, file: RegistryFile) -> Option<&InitOutcome> {
        self.files.iter().find(|(f, _)| *f == file).map(|(_, o)| o)
    }

    pub fn changed(&self) -> bool {
        self.files.iter().any(|(_, o)| *o != InitOutcome::Kept)
    }
}

impl FileRegistryStore {
    /// Creates the data directory and brings each registry document into a
    /// loadable state. With `force`, every document is reset to empty.
    pub async fn init(&self, force: bool, now: Timestamp) -> Result<InitReport, RegistryError> {
        tokio::fs::create_dir_all(self.dir())
            .await
            .map_err(|e| RegistryError::Write {
                path: self.dir().display().to_string(),
                message: e.to_string(),
            })?;

        let empty = RegistrySnapshot::empty(now);
        let mut report = InitReport::default();

        for file in RegistryFile::ALL {
            let path = self.path(file);
            let fresh = match file {
                RegistryFile::Pending => encode(&path, &empty.pending)?,
                RegistryFile::Flagged => encode(&path, &empty.flagged)?,
                RegistryFile::Stats => encode(&path, &empty.stats)?,
            };

            let outcome = match inspect(file, &path).await? {
                Existing::Absent => InitOutcome::Created,
                Existing::Valid if force => InitOutcome::Overwritten,
                Existing::Valid => {
                    tracing::info!(file = %file, "Registry file is valid, keeping it");
                    report.files.push((file, InitOutcome::Kept));
                    continue;
                }
                Existing::Invalid(reason) => {
                    let backup = backup(&path, now).await?;
                    tracing::warn!(
                        file = %file,
                        backup = %backup.display(),
                        reason = %reason,
                        "Registry file is not valid, backed it up"
                    );
                    InitOutcome::Replaced { backup }
                }
            };

            let temp = stage(&path, &fresh).await?;
            commit(&temp, &path).await?;
            tracing::info!(file = %file, outcome = ?outcome, "Registry file written");
            report.files.push((file, outcome));
        }

        Ok(report)
    }
}

enum Existing {
    Absent,
    Valid,
    Invalid(String),
}

async fn inspect(file: RegistryFile, path: &Path) -> Result<Existing, RegistryError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Existing::Absent),
        Err(e) => {
            return Err(RegistryError::Read {
                path: path.display().to_string(),
                message: e.to_string(),
            })
        }
    };
    let decoded = match file {
        RegistryFile::Pending => check::<PendingRegistry>(&bytes),
        RegistryFile::Flagged => check::<FlaggedRegistry>(&bytes),
        RegistryFile::Stats => check::<RunStats>(&bytes),
    };
    Ok(match decoded {
        Ok(()) => Existing::Valid,
        Err(reason) => Existing::Invalid(reason),
    })
}

fn check<T: DeserializeOwned>(bytes: &[u8]) -> Result<(), String> {
    serde_json::from_slice::<T>(bytes)
        .map(|_| ())
        .map_err(|e| e.to_string())
}

async fn backup(path: &Path, now: Timestamp) -> Result<PathBuf, RegistryError> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let target = path.with_file_name(format!("{file_name}.backup.{}", now.unix_millis()));
    tokio::fs::copy(path, &target)
        .await
        .map_err(|e| RegistryError::Write {
            path: target.display().to_string(),
            message: e.to_string(),
        })?;
    Ok(target)
}
