//! Run statistics and snapshot summaries
//!
//! `RunStatistics` is filled in by the coordinator as a run progresses;
//! `SnapshotSummary` describes whatever snapshots are already on disk.

use crate::records::VerificationStatus;
use crate::storage::{Storage, StorageResult};

/// Counters accumulated over one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStatistics {
    /// Unique event references found on the listing
    pub discovered: usize,

    /// References queued for scraping (priority list included)
    pub queued: usize,

    /// Event pages that produced a record
    pub scraped: usize,

    /// Event pages skipped after a fetch failure or robots.txt refusal
    pub failed: usize,

    /// Scraped records without a usable title
    pub untitled: usize,

    /// Records collapsed by deduplication
    pub duplicates_removed: usize,

    /// Listing days fetched during verification
    pub days_crawled: usize,

    /// Listing days skipped during verification
    pub days_failed: usize,

    /// Listing titles dropped for lack of a venue
    pub irregular_pairs: usize,

    /// Canonical records with verified dates
    pub verified: usize,

    /// Canonical records that kept their own dates
    pub fallback: usize,
}

/// Prints run statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &RunStatistics) {
    println!("=== Run Statistics ===\n");

    println!("Scrape:");
    println!("  Events discovered: {}", stats.discovered);
    println!("  Events queued: {}", stats.queued);
    println!("  Pages scraped: {}", stats.scraped);
    println!("  Pages failed: {}", stats.failed);
    println!("  Records without title: {}", stats.untitled);
    println!();

    println!("Verification:");
    println!("  Days crawled: {}", stats.days_crawled);
    println!("  Days failed: {}", stats.days_failed);
    println!("  Irregular pairs dropped: {}", stats.irregular_pairs);
    println!();

    println!("Reconciliation:");
    println!("  Duplicates removed: {}", stats.duplicates_removed);
    println!("  Verified: {}", stats.verified);
    println!("  Fallback: {}", stats.fallback);

    let total = stats.verified + stats.fallback;
    if total > 0 {
        println!(
            "\nVerification Rate: {:.1}% ({} / {} records verified)",
            stats.verified as f64 / total as f64 * 100.0,
            stats.verified,
            total
        );
    }
}

/// What the existing snapshots contain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotSummary {
    /// `None` when no raw snapshot exists
    pub raw_records: Option<usize>,
    pub raw_untitled: usize,

    /// `None` when no verified index exists
    pub verified_titles: Option<usize>,
    pub verified_observations: usize,

    /// `None` when no canonical snapshot exists
    pub canonical_records: Option<usize>,
    pub canonical_verified: usize,
    pub canonical_unverified: usize,
}

/// Summarizes the snapshots held by `storage`
pub fn load_snapshot_summary(storage: &dyn Storage) -> StorageResult<SnapshotSummary> {
    let mut summary = SnapshotSummary::default();

    if let Some(raw) = storage.load_raw_events()? {
        summary.raw_records = Some(raw.len());
        summary.raw_untitled = raw.iter().filter(|r| r.usable_title().is_none()).count();
    }

    if let Some(index) = storage.load_verified_index()? {
        summary.verified_titles = Some(index.len());
        summary.verified_observations = index.observation_count();
    }

    if let Some(canonical) = storage.load_canonical_events()? {
        summary.canonical_records = Some(canonical.len());
        summary.canonical_verified = canonical
            .iter()
            .filter(|r| r.verification == VerificationStatus::Verified)
            .count();
        summary.canonical_unverified = canonical.len() - summary.canonical_verified;
    }

    Ok(summary)
}

/// Prints a snapshot summary to stdout
pub fn print_snapshot_summary(summary: &SnapshotSummary) {
    println!("=== Snapshots ===\n");

    match summary.raw_records {
        Some(count) => println!(
            "Raw events: {} records ({} without title)",
            count, summary.raw_untitled
        ),
        None => println!("Raw events: not found"),
    }

    match summary.verified_titles {
        Some(count) => println!(
            "Verified schedule: {} titles, {} dated observations",
            count, summary.verified_observations
        ),
        None => println!("Verified schedule: not found"),
    }

    match summary.canonical_records {
        Some(count) => println!(
            "Canonical events: {} records ({} verified, {} unverified)",
            count, summary.canonical_verified, summary.canonical_unverified
        ),
        None => println!("Canonical events: not found"),
    }
}
