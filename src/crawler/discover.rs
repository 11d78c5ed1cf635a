//! Listing discovery
//!
//! The "all events" listing carries a booking button per event. Carousels
//! and repeated sections can render the same button several times, so the
//! references are deduplicated by their exact (resolved) string.

use crate::crawler::fetcher::{fetch_with_retry, RetryPolicy};
use crate::FringeError;
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// The booking button rendered once per event card
const EVENT_LINK_SELECTOR: &str = "a.btn.btn-success.secondary-border-color";

/// Builds the listing URL with every filter left empty (all venues, all types)
pub fn listing_url(base_url: &Url, listing_path: &str) -> Result<Url, FringeError> {
    let mut url = base_url.join(listing_path)?;
    url.query_pairs_mut()
        .clear()
        .append_pair("s", "")
        .append_pair("venue", "")
        .append_pair("subvenue", "")
        .append_pair("event_type", "");
    Ok(url)
}

/// Extracts unique event page references from listing markup
///
/// # Arguments
///
/// * `html` - The listing page markup
/// * `page_url` - The URL the markup came from, for resolving relative links
///
/// # Returns
///
/// Absolute references in first-seen order
pub fn extract_event_links(html: &str, page_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse(EVENT_LINK_SELECTOR) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty() && !href.starts_with('#'))
        .filter_map(|href| page_url.join(href).ok())
        .map(String::from)
        .filter(|link| seen.insert(link.clone()))
        .collect()
}

/// Fetches the listing and returns every event reference on it
///
/// Failing to fetch the listing, or finding no booking buttons on it, means
/// the site is unreachable or its layout changed; both are fatal.
pub async fn discover_events(
    client: &Client,
    listing: &Url,
    retry: RetryPolicy,
) -> Result<Vec<String>, FringeError> {
    tracing::info!("Discovering events from {}", listing);

    let body = fetch_with_retry(client, listing.as_str(), retry)
        .await
        .into_body(listing.as_str())
        .map_err(|e| FringeError::Discovery {
            url: listing.to_string(),
            reason: e.to_string(),
        })?;

    let links = extract_event_links(&body, listing);
    if links.is_empty() {
        return Err(FringeError::Discovery {
            url: listing.to_string(),
            reason: format!("no elements matching '{}'", EVENT_LINK_SELECTOR),
        });
    }

    tracing::info!("Found {} unique events", links.len());
    Ok(links)
}
