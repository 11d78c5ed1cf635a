//! Storage traits and error types
//!
//! This module defines the trait interface for snapshot backends and
//! associated error types.

use crate::records::{CanonicalEventRecord, RawEventRecord, VerifiedScheduleIndex};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Serialization error on {path}: {source}")]
    Serialization {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid snapshot path: {0}")]
    Path(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for snapshot backends
///
/// Each artifact is stored whole: a save replaces the previous snapshot, and
/// a load returns `None` when nothing has been saved yet.
pub trait Storage {
    // ===== Raw records =====

    /// Replaces the raw record snapshot (checkpoints and the final save)
    fn save_raw_events(&mut self, records: &[RawEventRecord]) -> StorageResult<()>;

    /// Loads the raw record snapshot
    fn load_raw_events(&self) -> StorageResult<Option<Vec<RawEventRecord>>>;

    // ===== Verified schedule =====

    /// Replaces the verified schedule index
    fn save_verified_index(&mut self, index: &VerifiedScheduleIndex) -> StorageResult<()>;

    /// Loads the verified schedule index
    fn load_verified_index(&self) -> StorageResult<Option<VerifiedScheduleIndex>>;

    // ===== Canonical records =====

    /// Replaces the canonical record snapshot
    fn save_canonical_events(&mut self, records: &[CanonicalEventRecord]) -> StorageResult<()>;

    /// Loads the canonical record snapshot
    fn load_canonical_events(&self) -> StorageResult<Option<Vec<CanonicalEventRecord>>>;
}
