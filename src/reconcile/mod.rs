//! Reconciliation module
//!
//! This module turns scraped records into the canonical dataset:
//! - Deduplication by content identity
//! - Cross-referencing against the verified schedule
//! - Fallback to the page's own schedule when no confident match exists

mod dedup;
mod reconciler;

pub use dedup::{dedup_key, deduplicate, DedupKey};
pub use reconciler::{reconcile, reconcile_record, Reconciliation};
