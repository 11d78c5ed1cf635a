use crate::schedule::slash_form;
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Venue name → `DD/MM/YYYY` dates, in the order venues were first observed
pub type VenueDates = IndexMap<String, Vec<String>>;

/// Title → venue → dates observed on the per-day listings
///
/// Insertion order is preserved (and survives serialization), which makes the
/// fuzzy venue tie-break deterministic: the venue seen first wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VerifiedScheduleIndex {
    titles: IndexMap<String, VenueDates>,
}

impl VerifiedScheduleIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one day's `(title, venue)` listings into the index
    ///
    /// Each pair gains the day's date unless it is already recorded, so
    /// crawling a day twice does not duplicate entries.
    pub fn with_day(mut self, date: NaiveDate, pairs: &[(String, String)]) -> Self {
        let stamp = slash_form(date);
        for (title, venue) in pairs {
            let dates = self
                .titles
                .entry(title.clone())
                .or_default()
                .entry(venue.clone())
                .or_default();
            if !dates.contains(&stamp) {
                dates.push(stamp.clone());
            }
        }
        self
    }

    /// Venue buckets recorded for a title (exact title match)
    pub fn venues_for(&self, title: &str) -> Option<&VenueDates> {
        self.titles.get(title)
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.titles.keys().map(String::as_str)
    }

    /// Number of distinct titles
    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    /// Total number of (title, venue, date) observations
    pub fn observation_count(&self) -> usize {
        self.titles
            .values()
            .flat_map(|venues| venues.values())
            .map(Vec::len)
            .sum()
    }
}
