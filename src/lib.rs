//! Fringe-Sift: an event schedule extraction and reconciliation pipeline
//!
//! This crate scrapes event pages from a festival ticketing site, normalizes
//! their schedules, and reconciles them against an independent day-by-day
//! crawl of the site's listings to produce a clean, deduplicated dataset.

pub mod config;
pub mod crawler;
pub mod output;
pub mod reconcile;
pub mod records;
pub mod robots;
pub mod schedule;
pub mod storage;

use thiserror::Error;

/// Main error type for Fringe-Sift operations
#[derive(Debug, Error)]
pub enum FringeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("Event discovery failed at {url}: {reason}")]
    Discovery { url: String, reason: String },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid date range: {0}")]
    InvalidDate(String),
}

/// Result type alias for Fringe-Sift operations
pub type Result<T> = std::result::Result<T, FringeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use records::{
    CanonicalEventRecord, RawEventRecord, ScheduleEntry, VerificationStatus,
    VerifiedScheduleIndex,
};
