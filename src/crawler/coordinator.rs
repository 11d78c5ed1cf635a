//! Pipeline coordinator - main orchestration logic
//!
//! This module drives the three phases of a run:
//! - Scrape: discover events, build the priority queue, extract each page
//!   and checkpoint the raw records as it goes
//! - Verify: crawl the per-day listings into the verified schedule index
//! - Reconcile: deduplicate the raw records and resolve their dates
//!
//! Everything is sequential; one page is fully processed before the next
//! request is made.

use crate::config::Config;
use crate::crawler::discover::{discover_events, listing_url};
use crate::crawler::extractor::extract_event;
use crate::crawler::fetcher::{build_http_client, fetch_with_retry, RetryPolicy};
use crate::crawler::priority::{build_queue, load_priority_list};
use crate::crawler::verify::{crawl_verified_schedule, VerificationPlan};
use crate::output::{venue_palette, RunStatistics};
use crate::reconcile::{deduplicate, reconcile};
use crate::records::{CanonicalEventRecord, RawEventRecord, VerifiedScheduleIndex};
use crate::robots::{fetch_robots, RobotsPolicy};
use crate::storage::{open_storage, write_snapshot, JsonStorage, Storage, StorageError};
use crate::FringeError;
use reqwest::Client;
use std::path::Path;
use std::time::{Duration, Instant};
use url::Url;

/// Which part of the pipeline to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Scrape,
    Verify,
    Reconcile,
    /// Scrape, verify and reconcile in sequence
    All,
}

/// Main pipeline coordinator structure
pub struct Coordinator<S: Storage> {
    config: Config,
    storage: S,
    client: Client,
    base_url: Url,
    robots: Option<RobotsPolicy>,
    stats: RunStatistics,
}

impl Coordinator<JsonStorage> {
    /// Creates a coordinator writing to the configured snapshot files
    ///
    /// # Arguments
    ///
    /// * `config` - The validated pipeline configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(FringeError)` - Failed to initialize
    pub fn new(config: Config) -> Result<Self, FringeError> {
        let storage = open_storage(&config.output);
        Self::with_storage(config, storage)
    }
}

impl<S: Storage> Coordinator<S> {
    /// Creates a coordinator over an explicit storage backend
    pub fn with_storage(config: Config, storage: S) -> Result<Self, FringeError> {
        let base_url = Url::parse(&config.site.base_url)?;
        let client = build_http_client(&config.user_agent, &config.crawler)?;

        Ok(Self {
            config,
            storage,
            client,
            base_url,
            robots: None,
            stats: RunStatistics::default(),
        })
    }

    pub fn stats(&self) -> &RunStatistics {
        &self.stats
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// The product token robots.txt groups are matched against
    fn agent(&self) -> &str {
        &self.config.user_agent.crawler_name
    }

    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::from_config(&self.config.crawler)
    }

    /// Returns the site's robots policy, fetching it on first use
    async fn robots(&mut self) -> RobotsPolicy {
        if let Some(robots) = &self.robots {
            return robots.clone();
        }

        let robots = if self.config.crawler.respect_robots {
            fetch_robots(&self.client, &self.base_url).await
        } else {
            tracing::debug!("robots.txt checks disabled");
            RobotsPolicy::allow_all()
        };
        self.robots = Some(robots.clone());
        robots
    }

    /// Runs the requested phase(s)
    pub async fn run(&mut self, phase: Phase) -> Result<(), FringeError> {
        let start_time = Instant::now();

        match phase {
            Phase::Scrape => {
                self.scrape_events().await?;
            }
            Phase::Verify => {
                self.verify_schedule().await?;
            }
            Phase::Reconcile => {
                self.reconcile_events()?;
            }
            Phase::All => {
                self.scrape_events().await?;
                self.verify_schedule().await?;
                self.reconcile_events()?;
            }
        }

        tracing::info!("{:?} finished in {:?}", phase, start_time.elapsed());
        Ok(())
    }

    /// Scrapes every discovered (and prioritized) event page
    ///
    /// The raw records are saved every `checkpoint-interval` scraped pages
    /// and once more at the end. A failed checkpoint is logged; a failed
    /// final save is returned as an error.
    pub async fn scrape_events(&mut self) -> Result<Vec<RawEventRecord>, FringeError> {
        let robots = self.robots().await;
        let retry = self.retry_policy();

        let listing = listing_url(&self.base_url, &self.config.site.listing_path)?;
        if !robots.is_allowed(listing.as_str(), self.agent()) {
            return Err(FringeError::Discovery {
                url: listing.to_string(),
                reason: "listing disallowed by robots.txt".to_string(),
            });
        }

        let discovered = discover_events(&self.client, &listing, retry).await?;
        let priority = match &self.config.input.priority_path {
            Some(path) => load_priority_list(Path::new(path)),
            None => Vec::new(),
        };
        let queue = build_queue(&priority, &discovered);

        self.stats.discovered = discovered.len();
        self.stats.queued = queue.len();
        tracing::info!(
            "Queued {} events ({} prioritized)",
            queue.len(),
            priority.len()
        );

        let interval = self.config.crawler.checkpoint_interval.max(1);
        let mut records: Vec<RawEventRecord> = Vec::new();

        for (i, url) in queue.iter().enumerate() {
            tracing::info!("[{}/{}] Scraping: {}", i + 1, queue.len(), url);

            if !robots.is_allowed(url, self.agent()) {
                tracing::warn!("{} disallowed by robots.txt, skipping", url);
                self.stats.failed += 1;
                continue;
            }

            let body = match fetch_with_retry(&self.client, url, retry)
                .await
                .into_body(url)
            {
                Ok(body) => body,
                Err(e) => {
                    tracing::error!("Error scraping {}: {}", url, e);
                    self.stats.failed += 1;
                    continue;
                }
            };

            let record = extract_event(&body, url);
            match record.usable_title() {
                Some(title) => tracing::debug!("Scraped: {} @ {}", title, record.venue),
                None => {
                    tracing::warn!("No title found on {}", url);
                    self.stats.untitled += 1;
                }
            }

            records.push(record);
            self.stats.scraped += 1;

            if records.len() % interval == 0 {
                match self.storage.save_raw_events(&records) {
                    Ok(()) => tracing::debug!("Checkpoint: {} records saved", records.len()),
                    Err(e) => tracing::error!("Checkpoint save failed: {}", e),
                }
            }
        }

        self.storage.save_raw_events(&records)?;
        tracing::info!(
            "Scrape complete: {} scraped, {} failed",
            self.stats.scraped,
            self.stats.failed
        );

        Ok(records)
    }

    /// Builds the verification plan from the configuration
    ///
    /// A robots.txt `Crawl-delay` longer than the configured delay wins.
    pub async fn verification_plan(&mut self) -> Result<VerificationPlan, FringeError> {
        let robots = self.robots().await;
        let configured = Duration::from_millis(self.config.verification.request_delay_ms);
        let delay = match robots.crawl_delay(self.agent()) {
            Some(crawl_delay) if crawl_delay > configured => {
                tracing::info!("Using robots.txt crawl delay of {:?}", crawl_delay);
                crawl_delay
            }
            _ => configured,
        };

        Ok(VerificationPlan {
            listing: listing_url(&self.base_url, &self.config.site.listing_path)?,
            start: self.config.verification.start_date,
            end: self.config.verification.end_date,
            delay,
            retry: self.retry_policy(),
        })
    }

    /// Crawls the per-day listings and saves the verified schedule index
    pub async fn verify_schedule(&mut self) -> Result<VerifiedScheduleIndex, FringeError> {
        let plan = self.verification_plan().await?;
        let robots = self.robots().await;

        let outcome = crawl_verified_schedule(&self.client, &robots, self.agent(), &plan).await;

        self.stats.days_crawled = outcome.days_crawled;
        self.stats.days_failed = outcome.days_failed;
        self.stats.irregular_pairs = outcome.irregular_pairs;

        self.storage.save_verified_index(&outcome.index)?;
        Ok(outcome.index)
    }

    /// Deduplicates and reconciles the saved raw records
    ///
    /// A missing raw snapshot is an error; a missing verified index only
    /// means every record falls back to its own schedule.
    pub fn reconcile_events(&mut self) -> Result<Vec<CanonicalEventRecord>, FringeError> {
        let raw = self.storage.load_raw_events()?.ok_or_else(|| {
            StorageError::Path(format!(
                "no raw events at {}, run the scrape phase first",
                self.config.output.events_path
            ))
        })?;

        let index = match self.storage.load_verified_index()? {
            Some(index) => index,
            None => {
                tracing::warn!(
                    "No verified schedule at {}, all records will be unverified",
                    self.config.output.verified_path
                );
                VerifiedScheduleIndex::new()
            }
        };

        let before = raw.len();
        let unique = deduplicate(raw);
        self.stats.duplicates_removed = before - unique.len();
        tracing::info!(
            "Deduplicated {} records to {}",
            before,
            unique.len()
        );

        let reconciliation = reconcile(&unique, &index);
        self.stats.verified = reconciliation.verified;
        self.stats.fallback = reconciliation.fallback;
        tracing::info!(
            "Reconciled {} records: {} verified, {} fallback",
            reconciliation.records.len(),
            reconciliation.verified,
            reconciliation.fallback
        );

        self.storage.save_canonical_events(&reconciliation.records)?;

        if let Some(path) = &self.config.output.palette_path {
            let palette = venue_palette(&reconciliation.records);
            write_snapshot(Path::new(path), &palette)?;
            tracing::info!("Wrote {} venue colours to {}", palette.len(), path);
        }

        Ok(reconciliation.records)
    }
}

/// Runs the pipeline against the configured snapshot files
///
/// # Arguments
///
/// * `config` - The pipeline configuration
/// * `phase` - Which phase(s) to run
///
/// # Returns
///
/// * `Ok(RunStatistics)` - The counters of the completed run
/// * `Err(FringeError)` - A fatal error aborted the run
pub async fn run_pipeline(config: Config, phase: Phase) -> Result<RunStatistics, FringeError> {
    let mut coordinator = Coordinator::new(config)?;
    coordinator.run(phase).await?;
    Ok(coordinator.stats().clone())
}
