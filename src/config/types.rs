use chrono::NaiveDate;
use serde::Deserialize;

/// Main configuration structure for Fringe-Sift
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    pub verification: VerificationConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub input: InputConfig,
    pub output: OutputConfig,
}

/// The ticketing site being scraped
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Site root, e.g. "https://tickets.fringe.co.nz"
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Path of the "all events" listing, relative to the site root
    #[serde(rename = "listing-path", default = "default_listing_path")]
    pub listing_path: String,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Upper bound on a single navigation (milliseconds)
    #[serde(default = "default_navigation_timeout")]
    pub navigation_timeout_ms: u64,

    /// Upper bound on establishing a connection (milliseconds)
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,

    /// Persist the raw records every N successfully scraped events
    #[serde(default = "default_checkpoint_interval")]
    pub checkpoint_interval: usize,

    /// Additional attempts for transient fetch failures (0 disables retry)
    #[serde(default)]
    pub max_retries: u32,

    /// Pause between retry attempts (milliseconds)
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,

    /// Whether to honor the site's robots.txt
    #[serde(default = "default_true")]
    pub respect_robots: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            navigation_timeout_ms: default_navigation_timeout(),
            connect_timeout_ms: default_connect_timeout(),
            checkpoint_interval: default_checkpoint_interval(),
            max_retries: 0,
            retry_delay_ms: default_retry_delay(),
            respect_robots: true,
        }
    }
}

/// Day-by-day verification crawl configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct VerificationConfig {
    /// First listing day to crawl (inclusive)
    pub start_date: NaiveDate,

    /// Last listing day to crawl (inclusive)
    pub end_date: NaiveDate,

    /// Fixed delay between consecutive day requests (milliseconds)
    #[serde(default = "default_request_delay")]
    pub request_delay_ms: u64,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// User-supplied inputs
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputConfig {
    /// File naming event pages to scrape first (JSON array or one per line)
    #[serde(rename = "priority-path")]
    pub priority_path: Option<String>,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Raw scraped records, checkpointed during the scrape
    pub events_path: String,

    /// Verified schedule index
    pub verified_path: String,

    /// Final reconciled records
    pub canonical_path: String,

    /// Venue display colours for the page generator
    #[serde(default)]
    pub palette_path: Option<String>,
}

fn default_listing_path() -> String {
    "/events".to_string()
}

fn default_navigation_timeout() -> u64 {
    60_000
}

fn default_connect_timeout() -> u64 {
    10_000
}

fn default_checkpoint_interval() -> usize {
    10
}

fn default_retry_delay() -> u64 {
    2_000
}

fn default_request_delay() -> u64 {
    200
}

fn default_true() -> bool {
    true
}
