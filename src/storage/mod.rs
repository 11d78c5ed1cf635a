//! Storage module for persisting pipeline artifacts
//!
//! This module handles the three flat snapshots the pipeline produces:
//! - Raw scraped records (checkpointed during the scrape)
//! - The verified schedule index (written once per verification crawl)
//! - The canonical, reconciled records

mod json;
mod memory;
mod traits;

pub use json::{read_snapshot, write_snapshot, JsonStorage};
pub use memory::MemoryStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::config::OutputConfig;

/// Opens the file-backed storage for the configured output paths
pub fn open_storage(output: &OutputConfig) -> JsonStorage {
    JsonStorage::new(output)
}
