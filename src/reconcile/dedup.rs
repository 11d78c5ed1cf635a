use crate::records::RawEventRecord;
use std::collections::HashSet;

/// Content identity of a raw record: `(title, venue, time, schedule text)`
///
/// Exact string equality only. Records that differ merely in whitespace are
/// kept apart, and the source URL is deliberately not part of the key since
/// the site publishes some events under more than one URL.
pub type DedupKey = (String, String, String, String);

/// Builds the identity key for a record (a missing title keys as empty)
pub fn dedup_key(record: &RawEventRecord) -> DedupKey {
    (
        record.title.clone().unwrap_or_default(),
        record.venue.clone(),
        record.time.clone(),
        record.schedule_text.clone(),
    )
}

/// Collapses records with identical identity keys, keeping the first seen
///
/// Stable: survivors keep their original relative order.
pub fn deduplicate(records: Vec<RawEventRecord>) -> Vec<RawEventRecord> {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|record| seen.insert(dedup_key(record)))
        .collect()
}
