//! JSON snapshot files backing the resource actors.
//!
//! Each store owns one file holding every record as a JSON array. The file is
//! rewritten after each mutation through a temp file and a rename, so a crash
//! mid-write leaves the previous snapshot intact.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Snapshot named `<store>.json` inside `dir`.
    pub fn in_dir(dir: &Path, store: &str) -> Self {
        Self::new(dir.join(format!("{store}.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every record. A missing file is an empty store.
    pub fn load<T: DeserializeOwned>(&self) -> Result<Vec<T>, PersistError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    pub async fn save<T: Serialize>(&self, items: &[&T]) -> Result<(), PersistError> {
        let content = serde_json::to_vec_pretty(items)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &content).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), records = items.len(), "Snapshot written");
        Ok(())
    }
}
