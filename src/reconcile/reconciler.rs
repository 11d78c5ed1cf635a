use crate::records::{CanonicalEventRecord, RawEventRecord, VerificationStatus, VerifiedScheduleIndex};
use crate::schedule::{find_venue_bucket, slash_to_long, split_schedule_text};

/// Result of reconciling a batch of raw records
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    /// One canonical record per raw record, in input order
    pub records: Vec<CanonicalEventRecord>,

    /// Records whose dates came from the verified schedule
    pub verified: usize,

    /// Records that fell back to their own schedule
    pub fallback: usize,
}

/// Reconciles every raw record against the verified schedule
///
/// Never drops a record: each input yields exactly one canonical record.
pub fn reconcile(records: &[RawEventRecord], index: &VerifiedScheduleIndex) -> Reconciliation {
    let mut outcome = Reconciliation {
        records: Vec::with_capacity(records.len()),
        ..Reconciliation::default()
    };

    for record in records {
        let canonical = reconcile_record(record, index);
        match canonical.verification {
            VerificationStatus::Verified => outcome.verified += 1,
            VerificationStatus::Unverified => outcome.fallback += 1,
        }
        outcome.records.push(canonical);
    }

    outcome
}

/// Reconciles a single raw record
///
/// # Matching Rules
///
/// 1. Look up the record's title in the index (exact)
/// 2. Pick a venue bucket: trimmed case-insensitive equality first, then
///    substring containment in either direction (first observed wins)
/// 3. A bucket with at least one date replaces the record's dates
/// 4. Otherwise the record keeps its own dates and is marked unverified
pub fn reconcile_record(
    record: &RawEventRecord,
    index: &VerifiedScheduleIndex,
) -> CanonicalEventRecord {
    match verified_dates(record, index) {
        Some(dates) => CanonicalEventRecord::from_raw(record, dates, VerificationStatus::Verified),
        None => {
            tracing::debug!(
                "No verified schedule for {:?} at {:?}, using page schedule",
                record.title,
                record.venue
            );
            CanonicalEventRecord::from_raw(
                record,
                fallback_dates(record),
                VerificationStatus::Unverified,
            )
        }
    }
}

/// Long-form dates from the matching verified bucket, if there is one
fn verified_dates(record: &RawEventRecord, index: &VerifiedScheduleIndex) -> Option<Vec<String>> {
    let title = record.title.as_deref()?;
    let venues = index.venues_for(title)?;

    let buckets = venues.iter().map(|(venue, dates)| (venue.as_str(), dates));
    let (venue_key, dates) = find_venue_bucket(buckets, &record.venue)?;

    let mut long_dates: Vec<String> = Vec::with_capacity(dates.len());
    for date in dates {
        let long = slash_to_long(date).unwrap_or_else(|| {
            tracing::warn!(
                "Unparseable verified date {:?} for {:?} at {:?}",
                date,
                title,
                venue_key
            );
            date.clone()
        });
        if !long_dates.contains(&long) {
            long_dates.push(long);
        }
    }

    if long_dates.is_empty() {
        return None;
    }

    tracing::trace!(
        "Matched {:?} at {:?} to verified venue {:?}",
        title,
        record.venue,
        venue_key
    );
    Some(long_dates)
}

/// Dates the page itself reported, split from its schedule text
///
/// The structured schedule is carried through to the canonical record but
/// does not feed the date list.
fn fallback_dates(record: &RawEventRecord) -> Vec<String> {
    split_schedule_text(&record.schedule_text)
}
