use crate::schedule::MonthShift;
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::sync::OnceLock;

/// English month names, indexed from January = 0
pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Formats a date in long form, e.g. "20 February 2026"
pub fn long_form(date: NaiveDate) -> String {
    format!(
        "{} {} {}",
        date.day(),
        MONTH_NAMES[date.month0() as usize],
        date.year()
    )
}

/// Formats a date as `DD/MM/YYYY`, the form the listing endpoint accepts
pub fn slash_form(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Parses a `DD/MM/YYYY` date
pub fn parse_slash_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%d/%m/%Y").ok()
}

/// Converts `DD/MM/YYYY` to long form
///
/// # Examples
///
/// ```
/// use fringe_sift::schedule::slash_to_long;
///
/// assert_eq!(slash_to_long("05/03/2026").as_deref(), Some("5 March 2026"));
/// assert_eq!(slash_to_long("31/02/2026"), None);
/// ```
pub fn slash_to_long(text: &str) -> Option<String> {
    parse_slash_date(text).map(long_form)
}

fn range_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{1,2})-(\d{1,2})\s+([A-Za-z]+)\s+(\d{4})$")
            .expect("day range pattern is valid")
    })
}

/// Expands a day range like "3-7 March 2026" into one long-form date per day
///
/// Text that is not a `START-END MONTH YEAR` range, or whose bounds are out
/// of order, is returned unchanged as a single entry.
///
/// # Examples
///
/// ```
/// use fringe_sift::schedule::expand_range;
///
/// assert_eq!(
///     expand_range("3-5 March 2026"),
///     vec!["3 March 2026", "4 March 2026", "5 March 2026"]
/// );
/// assert_eq!(expand_range("Every Friday"), vec!["Every Friday"]);
/// ```
pub fn expand_range(text: &str) -> Vec<String> {
    let trimmed = text.trim();
    let Some(caps) = range_pattern().captures(trimmed) else {
        return vec![text.to_string()];
    };

    let bounds = (caps[1].parse::<u32>(), caps[2].parse::<u32>());
    let (Ok(start), Ok(end)) = bounds else {
        return vec![text.to_string()];
    };

    if start == 0 || start > end || end > 31 {
        return vec![text.to_string()];
    }

    let month = &caps[3];
    let year = &caps[4];
    (start..=end)
        .map(|day| format!("{} {} {}", day, month, year))
        .collect()
}

/// Resolves a date-picker day cell to a long-form date
///
/// `month_year` is the picker's caption, e.g. "February 2026". Cells padded
/// in from a neighbouring month roll the month (and the year at the
/// boundaries) according to `shift`. Captions that cannot be interpreted are
/// appended verbatim.
///
/// # Examples
///
/// ```
/// use fringe_sift::schedule::{resolve_calendar_day, MonthShift};
///
/// let caption = Some("February 2026");
/// assert_eq!(resolve_calendar_day("1", caption, MonthShift::Next), "1 March 2026");
/// assert_eq!(resolve_calendar_day("28", caption, MonthShift::Previous), "28 January 2026");
/// ```
pub fn resolve_calendar_day(day: &str, month_year: Option<&str>, shift: MonthShift) -> String {
    let Some(caption) = month_year.map(str::trim).filter(|c| !c.is_empty()) else {
        return day.to_string();
    };

    let mut parts = caption.split_whitespace();
    let (Some(month_name), Some(year_text)) = (parts.next(), parts.next()) else {
        return format!("{} {}", day, caption);
    };

    let month_index = MONTH_NAMES
        .iter()
        .position(|name| name.eq_ignore_ascii_case(month_name));
    let (Some(month_index), Ok(year)) = (month_index, year_text.parse::<i32>()) else {
        return format!("{} {}", day, caption);
    };

    let Some(absolute) = year
        .checked_mul(12)
        .and_then(|months| months.checked_add(month_index as i32 + shift.offset()))
    else {
        return format!("{} {}", day, caption);
    };
    let resolved_year = absolute.div_euclid(12);
    let resolved_month = absolute.rem_euclid(12) as usize;

    format!("{} {} {}", day, MONTH_NAMES[resolved_month], resolved_year)
}

/// Splits a comma-separated schedule into trimmed, non-empty date strings
pub fn split_schedule_text(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Iterates every calendar day from `start` to `end`, inclusive
pub fn date_range(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |day| *day <= end)
}
