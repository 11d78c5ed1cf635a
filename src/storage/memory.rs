//! In-memory storage implementation
//!
//! Keeps snapshots in memory and counts saves, which lets callers observe
//! checkpoint cadence without touching the filesystem.

use crate::records::{CanonicalEventRecord, RawEventRecord, VerifiedScheduleIndex};
use crate::storage::traits::{Storage, StorageResult};

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    pub raw_events: Option<Vec<RawEventRecord>>,
    pub verified_index: Option<VerifiedScheduleIndex>,
    pub canonical_events: Option<Vec<CanonicalEventRecord>>,

    /// Size of the raw snapshot at every save, in order
    pub raw_save_sizes: Vec<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn save_raw_events(&mut self, records: &[RawEventRecord]) -> StorageResult<()> {
        self.raw_save_sizes.push(records.len());
        self.raw_events = Some(records.to_vec());
        Ok(())
    }

    fn load_raw_events(&self) -> StorageResult<Option<Vec<RawEventRecord>>> {
        Ok(self.raw_events.clone())
    }

    fn save_verified_index(&mut self, index: &VerifiedScheduleIndex) -> StorageResult<()> {
        self.verified_index = Some(index.clone());
        Ok(())
    }

    fn load_verified_index(&self) -> StorageResult<Option<VerifiedScheduleIndex>> {
        Ok(self.verified_index.clone())
    }

    fn save_canonical_events(&mut self, records: &[CanonicalEventRecord]) -> StorageResult<()> {
        self.canonical_events = Some(records.to_vec());
        Ok(())
    }

    fn load_canonical_events(&self) -> StorageResult<Option<Vec<CanonicalEventRecord>>> {
        Ok(self.canonical_events.clone())
    }
}
