// # File Snapshot Store
//
// File-based implementation of SnapshotStore.
//
// ## Semantics
//
// - One JSON file holding the full CompanySnapshot in its wire
//   representation, overwritten in full every run.
// - Atomic writes: new state goes to a temporary file, then renames over
//   the target.
// - A missing or unreadable file loads as the empty baseline (with a
//   warning); there is no backup and no version field. Single writer
//   assumed, no locking.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::Error;
use crate::model::CompanySnapshot;
use crate::traits::snapshot_store::{SnapshotStore, SnapshotStoreFactory};

/// File-based snapshot store
///
/// # Example
///
/// ```rust,no_run
/// use credit_core::state::FileSnapshotStore;
/// use credit_core::traits::SnapshotStore;
/// use credit_core::model::CompanySnapshot;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileSnapshotStore::new("/var/lib/creditd/snapshot.json");
///
///     let previous = store.load().await?;
///     store.save(&CompanySnapshot::default()).await?;
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    /// Create a store for the given path
    ///
    /// No I/O happens here; the parent directory is created on first save.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        temp.set_extension("tmp");
        temp
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn load(&self) -> Result<CompanySnapshot, Error> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("snapshot file {} does not exist yet", self.path.display());
                return Ok(CompanySnapshot::default());
            }
            Err(e) => {
                warn!(
                    "snapshot file {} unreadable, starting from empty baseline: {}",
                    self.path.display(),
                    e
                );
                return Ok(CompanySnapshot::default());
            }
        };

        match serde_json::from_str(&content) {
            Ok(snapshot) => Ok(snapshot),
            Err(e) => {
                warn!(
                    "snapshot file {} corrupted, starting from empty baseline: {}",
                    self.path.display(),
                    e
                );
                Ok(CompanySnapshot::default())
            }
        }
    }

    async fn save(&self, snapshot: &CompanySnapshot) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    Error::persistence(format!(
                        "failed to create snapshot directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let json = serde_json::to_string_pretty(snapshot)
            .map_err(|e| Error::persistence(format!("failed to serialize snapshot: {}", e)))?;

        // Write to a temporary file, then rename over the target.
        let temp_path = self.temp_path();
        {
            let mut file = fs::File::create(&temp_path).await.map_err(|e| {
                Error::persistence(format!(
                    "failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.write_all(json.as_bytes()).await.map_err(|e| {
                Error::persistence(format!(
                    "failed to write temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.flush().await.map_err(|e| {
                Error::persistence(format!(
                    "failed to flush temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::persistence(format!(
                "failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        debug!("snapshot written to {}", self.path.display());
        Ok(())
    }
}

/// Factory for creating file snapshot stores
pub struct FileSnapshotStoreFactory;

impl SnapshotStoreFactory for FileSnapshotStoreFactory {
    fn create(
        &self,
        config: &crate::config::SnapshotStoreConfig,
    ) -> Result<Box<dyn SnapshotStore>, Error> {
        match config {
            crate::config::SnapshotStoreConfig::File { path } => {
                if path.is_empty() {
                    return Err(Error::config("file snapshot store path cannot be empty"));
                }
                Ok(Box::new(FileSnapshotStore::new(path)))
            }
            _ => Err(Error::config("invalid config for file snapshot store")),
        }
    }
}
