// # Memory Snapshot Store
//
// In-memory implementation of SnapshotStore.
//
// All state is lost on restart: the first run afterwards sees the empty
// baseline and reports every current record as added. Useful for tests and
// for deployments where re-notification after a restart is acceptable.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::Error;
use crate::model::CompanySnapshot;
use crate::traits::snapshot_store::{SnapshotStore, SnapshotStoreFactory};

/// In-memory snapshot store
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotStore {
    inner: Arc<RwLock<CompanySnapshot>>,
}

impl MemorySnapshotStore {
    /// Create a new store holding the empty baseline
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with a snapshot
    pub fn with_snapshot(snapshot: CompanySnapshot) -> Self {
        Self {
            inner: Arc::new(RwLock::new(snapshot)),
        }
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn load(&self) -> Result<CompanySnapshot, Error> {
        Ok(self.inner.read().await.clone())
    }

    async fn save(&self, snapshot: &CompanySnapshot) -> Result<(), Error> {
        *self.inner.write().await = snapshot.clone();
        Ok(())
    }
}

/// Factory for creating memory snapshot stores
pub struct MemorySnapshotStoreFactory;

impl SnapshotStoreFactory for MemorySnapshotStoreFactory {
    fn create(
        &self,
        config: &crate::config::SnapshotStoreConfig,
    ) -> Result<Box<dyn SnapshotStore>, Error> {
        match config {
            crate::config::SnapshotStoreConfig::Memory => Ok(Box::new(MemorySnapshotStore::new())),
            _ => Err(Error::config("invalid config for memory snapshot store")),
        }
    }
}
