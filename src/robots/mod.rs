//! Robots.txt handling module
//!
//! The site's robots.txt is fetched once per run. Anything short of a
//! successful response is treated as "allow everything".

mod parser;

pub use parser::RobotsPolicy;

use reqwest::Client;
use url::Url;

/// Fetches and parses robots.txt from the site root
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `base_url` - The site root
///
/// # Returns
///
/// The parsed policy, or an allow-all policy if robots.txt is missing or
/// could not be fetched
pub async fn fetch_robots(client: &Client, base_url: &Url) -> RobotsPolicy {
    let robots_url = match base_url.join("/robots.txt") {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!("Cannot build robots.txt URL from {}: {}", base_url, e);
            return RobotsPolicy::allow_all();
        }
    };

    let response = match client.get(robots_url.clone()).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("Failed to fetch {}: {}, assuming allow-all", robots_url, e);
            return RobotsPolicy::allow_all();
        }
    };

    if !response.status().is_success() {
        tracing::debug!(
            "{} returned HTTP {}, assuming allow-all",
            robots_url,
            response.status()
        );
        return RobotsPolicy::allow_all();
    }

    match response.text().await {
        Ok(body) => {
            tracing::debug!("Loaded robots.txt ({} bytes)", body.len());
            RobotsPolicy::from_content(&body)
        }
        Err(e) => {
            tracing::warn!("Failed to read {}: {}, assuming allow-all", robots_url, e);
            RobotsPolicy::allow_all()
        }
    }
}
