//! Day-by-day verification crawl
//!
//! Each listing day is fetched on its own and the (title, venue) pairs it
//! shows are folded into a [`VerifiedScheduleIndex`]. The index is threaded
//! through the loop as a plain value and handed back once the whole date
//! range has been walked.

use crate::crawler::fetcher::{fetch_with_retry, RetryPolicy};
use crate::records::VerifiedScheduleIndex;
use crate::robots::RobotsPolicy;
use crate::schedule::{date_range, slash_form};
use chrono::NaiveDate;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use url::Url;

/// Event card title and event card venue, matched together so they come
/// back in document order
const CARD_MARKERS: &str =
    "h4.primary-color.two-line-clamp, p.dt-loc.event-location span.one-line-clamp";

/// Pairs read from one day's listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayListing {
    /// `(title, venue)` in listing order
    pub pairs: Vec<(String, String)>,

    /// Titles dropped because no venue followed them before the next title
    pub irregular: Vec<String>,
}

/// Result of a verification crawl
#[derive(Debug, Clone, Default)]
pub struct VerificationOutcome {
    pub index: VerifiedScheduleIndex,
    pub days_crawled: usize,
    pub days_failed: usize,
    pub irregular_pairs: usize,
}

/// What the verification crawl walks and how politely
#[derive(Debug, Clone)]
pub struct VerificationPlan {
    /// The listing with empty filters; each day adds `start_date`
    pub listing: Url,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Pause between consecutive day requests
    pub delay: Duration,
    pub retry: RetryPolicy,
}

impl VerificationPlan {
    /// Every day listing URL the plan will request, in order
    pub fn day_urls(&self) -> impl Iterator<Item = (NaiveDate, Url)> + '_ {
        date_range(self.start, self.end).map(|date| (date, day_listing_url(&self.listing, date)))
    }
}

/// Adds the `start_date=DD/MM/YYYY` parameter to the listing URL
pub fn day_listing_url(listing: &Url, date: NaiveDate) -> Url {
    let mut url = listing.clone();
    url.query_pairs_mut()
        .append_pair("start_date", &slash_form(date));
    url
}

/// Reads the (title, venue) pairs shown on one day's listing
///
/// Cards are assumed to render their title before their venue. Title and
/// venue markers are walked in document order; a venue pairs with the most
/// recent unpaired title. A title followed by another title is irregular and
/// dropped, as is a trailing title with no venue after it.
pub fn extract_day_listing(html: &str) -> DayListing {
    let document = Html::parse_document(html);
    let Ok(markers) = Selector::parse(CARD_MARKERS) else {
        return DayListing::default();
    };

    let mut listing = DayListing::default();
    let mut pending: Option<String> = None;

    for element in document.select(&markers) {
        let text = element
            .text()
            .flat_map(str::split_whitespace)
            .collect::<Vec<_>>()
            .join(" ");
        if text.is_empty() {
            continue;
        }

        if element.value().name() == "h4" {
            if let Some(orphan) = pending.replace(text) {
                listing.irregular.push(orphan);
            }
        } else if let Some(title) = pending.take() {
            listing.pairs.push((title, text));
        }
    }

    if let Some(orphan) = pending {
        listing.irregular.push(orphan);
    }

    listing
}

/// Crawls every day of the plan and builds the verified schedule index
///
/// A day that cannot be fetched (or that robots.txt disallows) is logged and
/// skipped; the crawl always covers the whole range.
pub async fn crawl_verified_schedule(
    client: &Client,
    robots: &RobotsPolicy,
    agent: &str,
    plan: &VerificationPlan,
) -> VerificationOutcome {
    let mut outcome = VerificationOutcome::default();
    let mut first = true;

    for (date, url) in plan.day_urls() {
        if !first {
            tokio::time::sleep(plan.delay).await;
        }
        first = false;

        let day = slash_form(date);
        tracing::info!("Checking date: {}", day);

        if !robots.is_allowed(url.as_str(), agent) {
            tracing::warn!("Day listing {} disallowed by robots.txt, skipping", url);
            outcome.days_failed += 1;
            continue;
        }

        let body = match fetch_with_retry(client, url.as_str(), plan.retry)
            .await
            .into_body(url.as_str())
        {
            Ok(body) => body,
            Err(e) => {
                tracing::error!("Failed to fetch listing for {}: {}", day, e);
                outcome.days_failed += 1;
                continue;
            }
        };

        let listing = extract_day_listing(&body);
        for title in &listing.irregular {
            tracing::warn!("Title '{}' on {} has no venue, dropped", title, day);
        }
        tracing::info!("  Found {} shows on {}", listing.pairs.len(), day);

        outcome.index = outcome.index.with_day(date, &listing.pairs);
        outcome.irregular_pairs += listing.irregular.len();
        outcome.days_crawled += 1;
    }

    tracing::info!(
        "Verification complete: {} days crawled, {} failed, {} titles indexed",
        outcome.days_crawled,
        outcome.days_failed,
        outcome.index.len()
    );

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(title: &str, venue: &str) -> String {
        format!(
            r#"<div class="card">
                <h4 class="primary-color two-line-clamp">{}</h4>
                <p class="dt-loc event-location"><img src="pin.svg"> <span class="one-line-clamp">{}</span></p>
            </div>"#,
            title, venue
        )
    }

    fn pair(title: &str, venue: &str) -> (String, String) {
        (title.to_string(), venue.to_string())
    }

    #[test]
    fn test_day_listing_url() {
        let listing =
            Url::parse("https://tickets.example.org/events?s=&venue=&subvenue=&event_type=")
                .unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 2, 13).unwrap();

        assert_eq!(
            day_listing_url(&listing, date).as_str(),
            "https://tickets.example.org/events?s=&venue=&subvenue=&event_type=&start_date=13%2F02%2F2026"
        );
    }

    #[test]
    fn test_extracts_pairs_in_order() {
        let html = format!(
            "<html><body>{}{}</body></html>",
            card("Show A", "The Fringe Bar"),
            card("Rock &amp; Roll", "Te Auaha")
        );
        let listing = extract_day_listing(&html);

        assert_eq!(
            listing.pairs,
            vec![pair("Show A", "The Fringe Bar"), pair("Rock & Roll", "Te Auaha")]
        );
        assert!(listing.irregular.is_empty());
    }

    #[test]
    fn test_title_without_venue_is_irregular() {
        let html = format!(
            r#"<h4 class="primary-color two-line-clamp">Lonely Show</h4>{}
               <h4 class="primary-color two-line-clamp">Trailing Show</h4>"#,
            card("Show B", "BATS")
        );
        let listing = extract_day_listing(&html);

        assert_eq!(listing.pairs, vec![pair("Show B", "BATS")]);
        assert_eq!(listing.irregular, vec!["Lonely Show", "Trailing Show"]);
    }

    #[test]
    fn test_ignores_unrelated_markup() {
        let html = r#"
            <h4 class="primary-color">Filters</h4>
            <span class="one-line-clamp">Stray</span>
            <p class="dt-loc event-location"><span class="one-line-clamp">No title before me</span></p>"#;
        assert_eq!(extract_day_listing(html), DayListing::default());
    }

    #[test]
    fn test_plan_walks_inclusive_range() {
        let plan = VerificationPlan {
            listing: Url::parse("https://tickets.example.org/events").unwrap(),
            start: NaiveDate::from_ymd_opt(2026, 2, 27).unwrap(),
            end: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            delay: Duration::ZERO,
            retry: RetryPolicy::none(),
        };
        let days: Vec<String> = plan.day_urls().map(|(date, _)| slash_form(date)).collect();
        assert_eq!(days, vec!["27/02/2026", "28/02/2026", "01/03/2026"]);
    }
}
