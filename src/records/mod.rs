//! Event record types shared by every pipeline stage
//!
//! - `RawEventRecord`: what the scraper saw on an event page
//! - `CanonicalEventRecord`: the reconciled record consumed by renderers
//! - `VerifiedScheduleIndex`: dates observed on the per-day listings
//!
//! Field names on the wire follow the format the calendar front end reads
//! (`loc`, `desc`, `link`, ...).

mod index;

pub use index::{VenueDates, VerifiedScheduleIndex};

use serde::{Deserialize, Serialize};

/// One performance from a page's machine-readable schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Long-form calendar date, e.g. "20 February 2026"
    pub date: String,

    /// Clock time as displayed, e.g. "7:00 pm"
    pub time: String,

    /// Timestamp as published by the site, e.g. "2026-02-20 19:00:00"
    #[serde(default)]
    pub iso: Option<String>,
}

/// An event as scraped from its own page, before reconciliation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEventRecord {
    /// Missing when the page had no recognizable title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(rename = "loc", default)]
    pub venue: String,

    #[serde(rename = "desc", default)]
    pub description: String,

    /// Free-text date expression, usually a comma list of long-form dates
    #[serde(rename = "schedule", default)]
    pub schedule_text: String,

    /// Empty means unscheduled
    #[serde(default)]
    pub time: String,

    #[serde(rename = "link")]
    pub source_url: String,

    /// Authoritative over `schedule_text` when non-empty
    #[serde(rename = "detailedSchedule", default)]
    pub structured_schedule: Vec<ScheduleEntry>,
}

impl RawEventRecord {
    /// Returns the title if the record has a usable one
    pub fn usable_title(&self) -> Option<&str> {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|title| !title.is_empty())
    }
}

/// Whether a canonical record's dates came from the verification crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    /// Dates replaced with the verified schedule
    Verified,

    /// Dates derived from the page's own schedule
    Unverified,
}

/// The reconciled representation of an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalEventRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(rename = "loc")]
    pub venue: String,

    #[serde(rename = "desc")]
    pub description: String,

    pub time: String,

    #[serde(rename = "link")]
    pub source_url: String,

    #[serde(rename = "detailedSchedule", default)]
    pub structured_schedule: Vec<ScheduleEntry>,

    /// Long-form dates on which the event runs
    #[serde(rename = "dateList")]
    pub date_list: Vec<String>,

    pub verification: VerificationStatus,
}

impl CanonicalEventRecord {
    /// Builds a canonical record from the raw one, leaving the raw record untouched
    pub fn from_raw(
        raw: &RawEventRecord,
        date_list: Vec<String>,
        verification: VerificationStatus,
    ) -> Self {
        Self {
            title: raw.title.clone(),
            venue: raw.venue.clone(),
            description: raw.description.clone(),
            time: raw.time.clone(),
            source_url: raw.source_url.clone(),
            structured_schedule: raw.structured_schedule.clone(),
            date_list,
            verification,
        }
    }

    /// Returns true if the event runs on the given long-form date
    pub fn occurs_on(&self, date: &str) -> bool {
        self.date_list.iter().any(|d| d == date)
    }

    pub fn is_verified(&self) -> bool {
        self.verification == VerificationStatus::Verified
    }
}
