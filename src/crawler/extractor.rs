//! Event page extraction
//!
//! Every field is produced by an ordered chain of strategies; the first one
//! that yields a value wins. A strategy that finds nothing (or hits markup
//! it does not understand) simply yields `None`, so one broken field never
//! costs the rest of the record.

use crate::records::{RawEventRecord, ScheduleEntry};
use crate::schedule::{expand_range, resolve_calendar_day, slash_to_long, MonthShift};
use indexmap::IndexMap;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use serde::Deserialize;
use std::sync::OnceLock;

/// Paragraphs longer than this are taken as the event blurb
const DESCRIPTION_MIN_CHARS: usize = 50;

/// A parsed event page plus its raw markup
pub struct EventPage {
    document: Html,
    markup: String,
}

impl EventPage {
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
            markup: html.to_string(),
        }
    }

    fn select_first(&self, css: &str) -> Option<ElementRef<'_>> {
        let selector = Selector::parse(css).ok()?;
        self.document.select(&selector).next()
    }

    fn select_all(&self, css: &str) -> Vec<ElementRef<'_>> {
        match Selector::parse(css) {
            Ok(selector) => self.document.select(&selector).collect(),
            Err(_) => Vec::new(),
        }
    }
}

type Strategy = fn(&EventPage) -> Option<String>;

fn first_success(page: &EventPage, strategies: &[Strategy]) -> Option<String> {
    strategies.iter().find_map(|strategy| strategy(page))
}

const TITLE_STRATEGIES: &[Strategy] = &[title_from_heading];
const VENUE_STRATEGIES: &[Strategy] = &[venue_after_heading];
const DESCRIPTION_STRATEGIES: &[Strategy] = &[first_long_paragraph, first_paragraph];
const SCHEDULE_STRATEGIES: &[Strategy] = &[schedule_from_calendar, schedule_from_list];
const TIME_STRATEGIES: &[Strategy] = &[
    time_from_embedded_json,
    time_from_escaped_json,
    time_from_schedule_list,
];

/// Extracts a raw event record from an event page
///
/// # Arguments
///
/// * `html` - The event page markup
/// * `source_url` - The reference the page was fetched from
///
/// # Returns
///
/// A record with every field the page yielded; missing fields are empty
/// (or `None` for the title)
pub fn extract_event(html: &str, source_url: &str) -> RawEventRecord {
    let page = EventPage::parse(html);

    RawEventRecord {
        title: first_success(&page, TITLE_STRATEGIES),
        venue: first_success(&page, VENUE_STRATEGIES).unwrap_or_default(),
        description: first_success(&page, DESCRIPTION_STRATEGIES).unwrap_or_default(),
        schedule_text: first_success(&page, SCHEDULE_STRATEGIES).unwrap_or_default(),
        time: first_success(&page, TIME_STRATEGIES).unwrap_or_default(),
        source_url: source_url.to_string(),
        structured_schedule: structured_schedule(&page),
    }
}

/// Element text with whitespace runs collapsed to single spaces
fn collapsed_text(element: ElementRef<'_>) -> String {
    element.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ")
}

/// Elements that start a new rendered line
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "blockquote", "dd", "div", "dl", "dt", "footer", "h1", "h2", "h3",
    "h4", "h5", "h6", "header", "li", "ol", "p", "pre", "section", "table", "td", "th", "tr",
    "ul",
];

/// Appends the element's text as it would render
///
/// Source newlines are ordinary whitespace; only `<br>` and block boundaries
/// break lines.
fn push_rendered_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                out.extend(text.chars().map(|c| if c == '\n' { ' ' } else { c }));
            }
            Node::Element(inner) if inner.name() == "br" => out.push('\n'),
            Node::Element(inner) => {
                let Some(child_element) = ElementRef::wrap(child) else {
                    continue;
                };
                let block = BLOCK_ELEMENTS.contains(&inner.name());
                if block {
                    out.push('\n');
                }
                push_rendered_text(child_element, out);
                if block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

/// The first non-blank rendered line of an element
fn first_line(element: ElementRef<'_>) -> Option<String> {
    let mut rendered = String::new();
    push_rendered_text(element, &mut rendered);

    rendered
        .split('\n')
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .find(|line| !line.is_empty())
}

fn non_empty(text: String) -> Option<String> {
    Some(text).filter(|t| !t.is_empty())
}

// ===== Title =====

fn title_from_heading(page: &EventPage) -> Option<String> {
    page.select_first("h2.primary-color")
        .map(collapsed_text)
        .and_then(non_empty)
}

// ===== Venue =====

fn venue_after_heading(page: &EventPage) -> Option<String> {
    let heading = page
        .select_all("h2, h3, h4")
        .into_iter()
        .find(|heading| collapsed_text(*heading) == "Venue")?;

    heading
        .next_siblings()
        .find_map(ElementRef::wrap)
        .and_then(first_line)
}

// ===== Description =====

fn content_paragraphs(page: &EventPage) -> Vec<String> {
    let Some(container) = page
        .select_first(".container.py-5")
        .or_else(|| page.select_first("body"))
    else {
        return Vec::new();
    };
    let Ok(paragraph) = Selector::parse("p") else {
        return Vec::new();
    };

    container.select(&paragraph).map(collapsed_text).collect()
}

fn first_long_paragraph(page: &EventPage) -> Option<String> {
    content_paragraphs(page)
        .into_iter()
        .find(|text| text.chars().count() > DESCRIPTION_MIN_CHARS)
}

fn first_paragraph(page: &EventPage) -> Option<String> {
    content_paragraphs(page).into_iter().next()
}

// ===== Schedule =====

/// Available days on the embedded date picker, resolved against its caption
fn schedule_from_calendar(page: &EventPage) -> Option<String> {
    let caption = page
        .select_first(".datepicker-days th.datepicker-switch")
        .map(collapsed_text);

    let dates: Vec<String> = page
        .select_all("td.day.green")
        .into_iter()
        .filter_map(|cell| {
            let day = collapsed_text(cell);
            if day.is_empty() {
                return None;
            }
            let shift = MonthShift::from_classes(cell.value().classes());
            Some(resolve_calendar_day(&day, caption.as_deref(), shift))
        })
        .collect();

    non_empty(dates.join(", "))
}

/// The schedule list item tagged with a calendar icon, ranges expanded
fn schedule_from_list(page: &EventPage) -> Option<String> {
    let icon = Selector::parse(r#"img[src*="calendar.svg"]"#).ok()?;
    let item = page
        .select_all("ul.schedule li")
        .into_iter()
        .find(|item| item.select(&icon).next().is_some())?;

    let text = collapsed_text(item);
    if text.is_empty() {
        return None;
    }
    Some(expand_range(&text).join(", "))
}

// ===== Time =====

fn json_time_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#""performanceTime":"([^"]+)""#).expect("performance time pattern is valid")
    })
}

fn escaped_time_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"&quot;performanceTime&quot;:&quot;([^&]+)&quot;")
            .expect("escaped performance time pattern is valid")
    })
}

fn clock_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\d{1,2}:\d{2}").expect("clock pattern is valid"))
}

fn time_from_embedded_json(page: &EventPage) -> Option<String> {
    json_time_pattern()
        .captures(&page.markup)
        .map(|caps| caps[1].to_string())
}

fn time_from_escaped_json(page: &EventPage) -> Option<String> {
    escaped_time_pattern()
        .captures(&page.markup)
        .map(|caps| caps[1].to_string())
}

fn time_from_schedule_list(page: &EventPage) -> Option<String> {
    page.select_all("ul.schedule li")
        .into_iter()
        .map(collapsed_text)
        .find(|text| clock_pattern().is_match(text))
}

// ===== Structured schedule =====

#[derive(Debug, Deserialize)]
struct PerformanceData {
    #[serde(default)]
    times: Option<PerformanceTimes>,
}

/// An empty collection is sometimes published as `[]` instead of `{}`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PerformanceTimes {
    ByDate(IndexMap<String, Vec<Performance>>),
    Empty(Vec<serde_json::Value>),
}

#[derive(Debug, Deserialize)]
struct Performance {
    #[serde(rename = "performanceTime", default)]
    time: Option<String>,
    #[serde(rename = "performanceRealTime", default)]
    real_time: Option<String>,
}

/// Performances from the page's `#event-data` element, one entry per showing
fn structured_schedule(page: &EventPage) -> Vec<ScheduleEntry> {
    let Some(raw) = page
        .select_first("#event-data")
        .and_then(|element| element.value().attr("data-performances"))
    else {
        return Vec::new();
    };

    let data: PerformanceData = match serde_json::from_str(raw) {
        Ok(data) => data,
        Err(e) => {
            tracing::debug!("Unreadable performance data: {}", e);
            return Vec::new();
        }
    };

    let Some(PerformanceTimes::ByDate(times)) = data.times else {
        return Vec::new();
    };

    let mut entries = Vec::new();
    for (date_key, shows) in times {
        let Some(date) = slash_to_long(&date_key) else {
            tracing::debug!("Skipping performances with unreadable date '{}'", date_key);
            continue;
        };
        entries.extend(shows.into_iter().map(|show| ScheduleEntry {
            date: date.clone(),
            time: show.time.unwrap_or_default(),
            iso: show.real_time,
        }));
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "https://tickets.example.org/event/446:8221/";

    fn full_page() -> String {
        r#"<html><body>
            <div class="container py-5">
                <h2 class="primary-color">  Midnight
                    Cabaret </h2>
                <p>Short teaser.</p>
                <p>An hour of song, sequins and terrible puns, live from the back room of the bar.</p>
                <h3>Venue</h3>
                <div class="venue">
                    The Fringe Bar
                    <br>26 Allen Street, Te Aro
                </div>
                <div class="datepicker-days"><table><thead><tr>
                    <th class="datepicker-switch">February 2026</th>
                </tr></thead><tbody><tr>
                    <td class="old day green">28</td>
                    <td class="day green">13</td>
                    <td class="day">14</td>
                    <td class="new day green">1</td>
                </tr></tbody></table></div>
                <ul class="schedule">
                    <li><img src="/img/calendar.svg"> 13-14 February 2026</li>
                    <li><img src="/img/clock.svg"> 9:30 pm</li>
                </ul>
            </div>
        </body></html>"#
            .to_string()
    }

    #[test]
    fn test_extracts_all_fields() {
        let record = extract_event(&full_page(), SOURCE);

        assert_eq!(record.title.as_deref(), Some("Midnight Cabaret"));
        assert_eq!(record.venue, "The Fringe Bar");
        assert_eq!(
            record.description,
            "An hour of song, sequins and terrible puns, live from the back room of the bar."
        );
        assert_eq!(
            record.schedule_text,
            "28 January 2026, 13 February 2026, 1 March 2026"
        );
        assert_eq!(record.time, "9:30 pm");
        assert_eq!(record.source_url, SOURCE);
        assert!(record.structured_schedule.is_empty());
    }

    #[test]
    fn test_calendar_rolls_over_year_boundary() {
        let html = r#"
            <div class="datepicker-days"><table>
                <tr><th class="datepicker-switch">December 2025</th></tr>
                <tr><td class="day green new">2</td><td class="day green old">30</td></tr>
            </table></div>"#;
        let record = extract_event(html, SOURCE);
        assert_eq!(record.schedule_text, "2 January 2026, 30 November 2025");
    }

    #[test]
    fn test_calendar_with_out_of_range_year_keeps_raw_day() {
        let html = r#"
            <div class="datepicker-days"><table>
                <tr><th class="datepicker-switch">December 2147483647</th></tr>
                <tr><td class="day green new">1</td></tr>
            </table></div>"#;
        let record = extract_event(html, SOURCE);
        assert_eq!(record.schedule_text, "1 December 2147483647");
    }

    #[test]
    fn test_venue_keeps_inline_markup() {
        let html = r#"<h3>Venue</h3><div><strong>BATS</strong> Theatre<br>1 Kent Terrace</div>"#;
        assert_eq!(extract_event(html, SOURCE).venue, "BATS Theatre");
    }

    #[test]
    fn test_venue_breaks_on_nested_block() {
        let html = r#"<h4>Venue</h4><div>
                <p><em>Hannah</em>'s Laneway</p>
                <p>Leeds Street</p>
            </div>"#;
        assert_eq!(extract_event(html, SOURCE).venue, "Hannah's Laneway");
    }

    #[test]
    fn test_list_fallback_expands_range() {
        let html = r#"<ul class="schedule">
            <li><img src="/icons/clock.svg"> 7:00 pm</li>
            <li><img src="/icons/calendar.svg"> 3-5 March 2026</li>
        </ul>"#;
        let record = extract_event(html, SOURCE);
        assert_eq!(
            record.schedule_text,
            "3 March 2026, 4 March 2026, 5 March 2026"
        );
        assert_eq!(record.time, "7:00 pm");
    }

    #[test]
    fn test_list_fallback_keeps_non_range_text() {
        let html = r#"<ul class="schedule">
            <li><img src="calendar.svg"> Fridays in February</li>
        </ul>"#;
        assert_eq!(extract_event(html, SOURCE).schedule_text, "Fridays in February");
    }

    #[test]
    fn test_time_prefers_embedded_json() {
        let html = r#"<script>var show = {"performanceTime":"6:00 pm"};</script>
            <ul class="schedule"><li>9:30 pm</li></ul>"#;
        assert_eq!(extract_event(html, SOURCE).time, "6:00 pm");
    }

    #[test]
    fn test_time_from_escaped_attribute() {
        let html = r#"<div data-x="{&quot;performanceTime&quot;:&quot;8:15 pm&quot;}"></div>"#;
        assert_eq!(extract_event(html, SOURCE).time, "8:15 pm");
    }

    #[test]
    fn test_description_falls_back_to_first_paragraph() {
        let html = "<body><p>Tiny.</p><p>Also tiny.</p></body>";
        assert_eq!(extract_event(html, SOURCE).description, "Tiny.");
    }

    #[test]
    fn test_empty_page_yields_empty_record() {
        let record = extract_event("<html><body></body></html>", SOURCE);
        assert_eq!(record.title, None);
        assert_eq!(record.usable_title(), None);
        assert!(record.venue.is_empty());
        assert!(record.description.is_empty());
        assert!(record.schedule_text.is_empty());
        assert!(record.time.is_empty());
    }

    #[test]
    fn test_structured_schedule() {
        let html = r#"<div id="event-data" data-performances='{"times":{
            "20/02/2026":[
                {"performanceTime":"7:00 pm","performanceRealTime":"2026-02-20 19:00:00"},
                {"performanceTime":"9:00 pm","performanceRealTime":"2026-02-20 21:00:00"}
            ],
            "05/03/2026":[{"performanceTime":"6:00 pm"}]
        }}'></div>"#;
        let schedule = extract_event(html, SOURCE).structured_schedule;

        assert_eq!(schedule.len(), 3);
        assert_eq!(schedule[0].date, "20 February 2026");
        assert_eq!(schedule[0].time, "7:00 pm");
        assert_eq!(schedule[0].iso.as_deref(), Some("2026-02-20 19:00:00"));
        assert_eq!(schedule[1].time, "9:00 pm");
        assert_eq!(schedule[2].date, "5 March 2026");
        assert_eq!(schedule[2].iso, None);
    }

    #[test]
    fn test_structured_schedule_tolerates_bad_data() {
        let broken = r#"<div id="event-data" data-performances="not json"></div>"#;
        assert!(extract_event(broken, SOURCE).structured_schedule.is_empty());

        let empty_list = r#"<div id="event-data" data-performances='{"times":[]}'></div>"#;
        assert!(extract_event(empty_list, SOURCE).structured_schedule.is_empty());
    }
}
