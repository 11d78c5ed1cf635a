/// Normalizes a venue name for comparison: trimmed and lowercased
pub fn normalize_venue(venue: &str) -> String {
    venue.trim().to_lowercase()
}

/// Case-insensitive, trimmed equality between two venue names
///
/// Blank names never match anything, including each other.
pub fn venues_match_exactly(a: &str, b: &str) -> bool {
    let a = normalize_venue(a);
    !a.is_empty() && a == normalize_venue(b)
}

/// Case-insensitive substring containment in either direction
///
/// Blank names never match: an empty string is contained in everything.
///
/// # Examples
///
/// ```
/// use fringe_sift::schedule::venues_overlap;
///
/// assert!(venues_overlap("The Fringe Bar", "Fringe Bar"));
/// assert!(venues_overlap("fringe bar", "The Fringe Bar - Upstairs"));
/// assert!(!venues_overlap("Fringe Bar", "Hannah Playhouse"));
/// assert!(!venues_overlap("Fringe Bar", "  "));
/// ```
pub fn venues_overlap(a: &str, b: &str) -> bool {
    let a = normalize_venue(a);
    let b = normalize_venue(b);
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.contains(&b) || b.contains(&a)
}

/// Picks the venue bucket that best matches `venue`
///
/// An exact match anywhere wins; otherwise the first bucket (in iteration
/// order) that overlaps `venue` is chosen.
///
/// # Arguments
///
/// * `buckets` - `(venue key, value)` pairs in the order they were observed
/// * `venue` - The venue name reported by the event page
///
/// # Returns
///
/// * `Some((key, value))` - The chosen bucket
/// * `None` - No bucket matches, or `venue` is blank
pub fn find_venue_bucket<'a, V, I>(buckets: I, venue: &str) -> Option<(&'a str, V)>
where
    I: IntoIterator<Item = (&'a str, V)>,
{
    let mut fuzzy = None;
    for (key, value) in buckets {
        if venues_match_exactly(key, venue) {
            return Some((key, value));
        }
        if fuzzy.is_none() && venues_overlap(key, venue) {
            fuzzy = Some((key, value));
        }
    }
    fuzzy
}
