//! JSON file storage implementation
//!
//! Snapshots are pretty-printed JSON files. Writes go to a sibling temporary
//! file that is renamed over the target, so an interrupted run never leaves
//! a truncated snapshot behind.

use crate::config::OutputConfig;
use crate::records::{CanonicalEventRecord, RawEventRecord, VerifiedScheduleIndex};
use crate::storage::traits::{Storage, StorageError, StorageResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Flat-file snapshot backend
#[derive(Debug, Clone)]
pub struct JsonStorage {
    events_path: PathBuf,
    verified_path: PathBuf,
    canonical_path: PathBuf,
}

impl JsonStorage {
    /// Creates a storage backend writing to the configured output paths
    pub fn new(output: &OutputConfig) -> Self {
        Self {
            events_path: PathBuf::from(&output.events_path),
            verified_path: PathBuf::from(&output.verified_path),
            canonical_path: PathBuf::from(&output.canonical_path),
        }
    }

    pub fn events_path(&self) -> &Path {
        &self.events_path
    }

    pub fn verified_path(&self) -> &Path {
        &self.verified_path
    }

    pub fn canonical_path(&self) -> &Path {
        &self.canonical_path
    }
}

impl Storage for JsonStorage {
    fn save_raw_events(&mut self, records: &[RawEventRecord]) -> StorageResult<()> {
        write_snapshot(&self.events_path, records)
    }

    fn load_raw_events(&self) -> StorageResult<Option<Vec<RawEventRecord>>> {
        read_snapshot(&self.events_path)
    }

    fn save_verified_index(&mut self, index: &VerifiedScheduleIndex) -> StorageResult<()> {
        write_snapshot(&self.verified_path, index)
    }

    fn load_verified_index(&self) -> StorageResult<Option<VerifiedScheduleIndex>> {
        read_snapshot(&self.verified_path)
    }

    fn save_canonical_events(&mut self, records: &[CanonicalEventRecord]) -> StorageResult<()> {
        write_snapshot(&self.canonical_path, records)
    }

    fn load_canonical_events(&self) -> StorageResult<Option<Vec<CanonicalEventRecord>>> {
        read_snapshot(&self.canonical_path)
    }
}

/// Serializes `value` to `path` atomically
pub fn write_snapshot<T: Serialize + ?Sized>(path: &Path, value: &T) -> StorageResult<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| StorageError::Path(path.display().to_string()))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| StorageError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let json = serde_json::to_string_pretty(value).map_err(|source| {
        StorageError::Serialization {
            path: path.to_path_buf(),
            source,
        }
    })?;

    let mut tmp_name = file_name.to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    std::fs::write(&tmp_path, json).map_err(|source| StorageError::Io {
        path: tmp_path.clone(),
        source,
    })?;
    std::fs::rename(&tmp_path, path).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!("Wrote snapshot {}", path.display());
    Ok(())
}

/// Deserializes the snapshot at `path`, or `None` if it does not exist
pub fn read_snapshot<T: DeserializeOwned>(path: &Path) -> StorageResult<Option<T>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StorageError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_str(&content)
        .map(Some)
        .map_err(|source| StorageError::Serialization {
            path: path.to_path_buf(),
            source,
        })
}
