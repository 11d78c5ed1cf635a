//! Output module for run reports and presentation data
//!
//! This module handles:
//! - Counting what a run did and printing the report
//! - Summarizing existing snapshots
//! - Generating the venue colour palette read by the calendar front end

mod palette;
pub mod stats;

pub use palette::venue_palette;
pub use stats::{
    load_snapshot_summary, print_snapshot_summary, print_statistics, RunStatistics,
    SnapshotSummary,
};
