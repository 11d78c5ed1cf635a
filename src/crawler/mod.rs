//! Crawler module for fetching and processing the ticketing site
//!
//! This module contains the crawling side of the pipeline, including:
//! - HTTP fetching with optional bounded retry
//! - Event discovery from the all-events listing
//! - Priority queue construction
//! - Per-page event extraction
//! - The day-by-day verification crawl
//! - Overall run coordination

mod coordinator;
mod discover;
mod extractor;
mod fetcher;
mod priority;
mod verify;

pub use coordinator::{run_pipeline, Coordinator, Phase};
pub use discover::{discover_events, extract_event_links, listing_url};
pub use extractor::{extract_event, EventPage};
pub use fetcher::{
    build_http_client, fetch_url, fetch_with_retry, user_agent_string, FetchResult, RetryPolicy,
};
pub use priority::{build_queue, load_priority_list, parse_priority_list};
pub use verify::{
    crawl_verified_schedule, day_listing_url, extract_day_listing, DayListing,
    VerificationOutcome, VerificationPlan,
};
