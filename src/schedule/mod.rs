//! Schedule normalization module for Fringe-Sift
//!
//! This module converts the site's inconsistent date expressions into the
//! long-form dates ("20 February 2026") used by every output, and provides
//! the venue matching rules the reconciler relies on.

mod dates;
mod venue;

// Re-export main functions
pub use dates::{
    date_range, expand_range, long_form, parse_slash_date, resolve_calendar_day, slash_form,
    slash_to_long, split_schedule_text, MONTH_NAMES,
};
pub use venue::{find_venue_bucket, normalize_venue, venues_match_exactly, venues_overlap};

/// Which month a date-picker day cell belongs to, relative to the displayed one
///
/// Date pickers pad the grid with trailing days of the previous month and
/// leading days of the next month, marked with `old` and `new` CSS classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MonthShift {
    /// Cell belongs to the displayed month
    Current,
    /// Cell belongs to the month before the displayed one
    Previous,
    /// Cell belongs to the month after the displayed one
    Next,
}

impl MonthShift {
    /// Determines the shift from a day cell's CSS classes
    ///
    /// # Examples
    ///
    /// ```
    /// use fringe_sift::schedule::MonthShift;
    ///
    /// assert_eq!(MonthShift::from_classes(["day", "new", "green"]), MonthShift::Next);
    /// assert_eq!(MonthShift::from_classes(["day", "old"]), MonthShift::Previous);
    /// assert_eq!(MonthShift::from_classes(["day", "green"]), MonthShift::Current);
    /// ```
    pub fn from_classes<'a>(classes: impl IntoIterator<Item = &'a str>) -> Self {
        let mut shift = Self::Current;
        for class in classes {
            match class {
                "new" => return Self::Next,
                "old" => shift = Self::Previous,
                _ => {}
            }
        }
        shift
    }

    /// Month offset applied to the displayed month
    pub fn offset(&self) -> i32 {
        match self {
            Self::Current => 0,
            Self::Previous => -1,
            Self::Next => 1,
        }
    }
}
