// # Snapshot Store Trait
//
// Defines the interface for persisting the last-known company state.
//
// ## Purpose
//
// Exactly one snapshot is kept: the full state as of the most recent
// successful run. It is read at run start (the diff baseline) and replaced
// wholesale at run end. There is no history, no partial merge, and no
// locking; concurrent invocations can race on the backing file (documented
// limitation of the single-writer design).
//
// ## Implementations
//
// - File-based JSON: `crate::state::FileSnapshotStore`
// - In-memory: `crate::state::MemorySnapshotStore`

use async_trait::async_trait;

use crate::model::CompanySnapshot;

/// Trait for snapshot store implementations
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the previously persisted snapshot
    ///
    /// Missing or unreadable state degrades to the empty baseline rather
    /// than failing: a first run (or a corrupted file) simply reports every
    /// current record as added.
    ///
    /// # Returns
    ///
    /// - `Ok(CompanySnapshot)`: The stored snapshot, or an empty one
    /// - `Err(Error)`: Hard storage error (the engine degrades to empty)
    async fn load(&self) -> Result<CompanySnapshot, crate::Error>;

    /// Overwrite the store with a new snapshot
    ///
    /// The write replaces the previous state in full. A failure here is
    /// non-fatal at the run level: notifications already sent are never
    /// rolled back, so a lost save may cause the next run to re-detect the
    /// same changes.
    async fn save(&self, snapshot: &CompanySnapshot) -> Result<(), crate::Error>;
}

/// Helper trait for constructing snapshot stores from configuration
pub trait SnapshotStoreFactory: Send + Sync {
    /// Create a SnapshotStore instance from configuration
    fn create(
        &self,
        config: &crate::config::SnapshotStoreConfig,
    ) -> Result<Box<dyn SnapshotStore>, crate::Error>;
}
