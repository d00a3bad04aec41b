//! Core traits for the credit monitor
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`RecordSource`]: Fetch the encrypted payload from the rating endpoint
//! - [`Notifier`]: Deliver one rendered Markdown chunk
//! - [`SnapshotStore`]: Persist the last-known full state between runs

pub mod notifier;
pub mod record_source;
pub mod snapshot_store;

pub use notifier::{Notifier, NotifierFactory};
pub use record_source::{RecordSource, RecordSourceFactory};
pub use snapshot_store::{SnapshotStore, SnapshotStoreFactory};
