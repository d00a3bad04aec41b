//! Plugin-based component registry
//!
//! The registry allows record sources, notifiers, and snapshot stores to be
//! registered dynamically at runtime, avoiding hardcoded if-else chains in
//! the daemon.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use credit_core::registry::ComponentRegistry;
//!
//! let registry = ComponentRegistry::new();
//! credit_source_http::register(&registry);
//! credit_notify_webhook::register(&registry);
//!
//! let source = registry.create_source(&config.source)?;
//! let notifier = registry.create_notifier(&config.notifier)?;
//! let store = registry.create_snapshot_store(&config.snapshot)?;
//! ```

use std::collections::HashMap;
use std::sync::RwLock;

use crate::config::{NotifierConfig, SnapshotStoreConfig, SourceConfig};
use crate::error::{Error, Result};
use crate::state::{FileSnapshotStoreFactory, MemorySnapshotStoreFactory};
use crate::traits::{
    Notifier, NotifierFactory, RecordSource, RecordSourceFactory, SnapshotStore,
    SnapshotStoreFactory,
};

/// Registry of component factories
///
/// Uses interior mutability with RwLock, allowing concurrent reads and
/// exclusive writes. The built-in snapshot store factories are registered
/// by [`ComponentRegistry::new`]; collaborator crates register their own
/// sources and notifiers via their `register()` functions.
#[derive(Default)]
pub struct ComponentRegistry {
    sources: RwLock<HashMap<String, Box<dyn RecordSourceFactory>>>,
    notifiers: RwLock<HashMap<String, Box<dyn NotifierFactory>>>,
    snapshot_stores: RwLock<HashMap<String, Box<dyn SnapshotStoreFactory>>>,
}

impl ComponentRegistry {
    /// Create a registry with the built-in snapshot stores registered
    pub fn new() -> Self {
        let registry = Self::default();
        registry.register_snapshot_store("file", Box::new(FileSnapshotStoreFactory));
        registry.register_snapshot_store("memory", Box::new(MemorySnapshotStoreFactory));
        registry
    }

    /// Register a record source factory
    pub fn register_source(&self, name: impl Into<String>, factory: Box<dyn RecordSourceFactory>) {
        self.sources.write().unwrap().insert(name.into(), factory);
    }

    /// Register a notifier factory
    pub fn register_notifier(&self, name: impl Into<String>, factory: Box<dyn NotifierFactory>) {
        self.notifiers.write().unwrap().insert(name.into(), factory);
    }

    /// Register a snapshot store factory
    pub fn register_snapshot_store(
        &self,
        name: impl Into<String>,
        factory: Box<dyn SnapshotStoreFactory>,
    ) {
        self.snapshot_stores
            .write()
            .unwrap()
            .insert(name.into(), factory);
    }

    /// Create a record source from configuration
    pub fn create_source(&self, config: &SourceConfig) -> Result<Box<dyn RecordSource>> {
        let source_type = config.type_name();
        let sources = self.sources.read().unwrap();

        let factory = sources
            .get(source_type)
            .ok_or_else(|| Error::config(format!("unknown record source type: {}", source_type)))?;

        factory.create(config)
    }

    /// Create a notifier from configuration
    pub fn create_notifier(&self, config: &NotifierConfig) -> Result<Box<dyn Notifier>> {
        let notifier_type = config.type_name();
        let notifiers = self.notifiers.read().unwrap();

        let factory = notifiers
            .get(notifier_type)
            .ok_or_else(|| Error::config(format!("unknown notifier type: {}", notifier_type)))?;

        factory.create(config)
    }

    /// Create a snapshot store from configuration
    pub fn create_snapshot_store(
        &self,
        config: &SnapshotStoreConfig,
    ) -> Result<Box<dyn SnapshotStore>> {
        let store_type = match config {
            SnapshotStoreConfig::File { .. } => "file",
            SnapshotStoreConfig::Memory => "memory",
            SnapshotStoreConfig::Custom { factory, .. } => factory,
        };

        let stores = self.snapshot_stores.read().unwrap();

        let factory = stores
            .get(store_type)
            .ok_or_else(|| Error::config(format!("unknown snapshot store type: {}", store_type)))?;

        factory.create(config)
    }

    /// Check if a record source type is registered
    pub fn has_source(&self, name: &str) -> bool {
        self.sources.read().unwrap().contains_key(name)
    }

    /// Check if a notifier type is registered
    pub fn has_notifier(&self, name: &str) -> bool {
        self.notifiers.read().unwrap().contains_key(name)
    }

    /// Check if a snapshot store type is registered
    pub fn has_snapshot_store(&self, name: &str) -> bool {
        self.snapshot_stores.read().unwrap().contains_key(name)
    }
}
