//! Configuration module for Fringe-Sift
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use fringe_sift::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("fringe.toml")).unwrap();
//! println!("Verifying from {}", config.verification.start_date);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, InputConfig, OutputConfig, SiteConfig, UserAgentConfig,
    VerificationConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
