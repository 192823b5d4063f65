//! Configuration module for Rating-Harvester
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key is optional; the defaults target the BoardGameGeek listing and
//! XML ratings feed.
//!
//! # Example
//!
//! ```no_run
//! use rating_harvester::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvester.toml")).unwrap();
//! println!("Scanning {} listing pages", config.source.listing_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, FailurePolicyName, FetcherConfig, SourceConfig, UserAgentConfig,
    DEFAULT_ID_PATTERN, DEFAULT_LISTING_PAGES, DEFAULT_LISTING_URL_TEMPLATE, DEFAULT_PAGE_SIZE,
    DEFAULT_RATING_URL_TEMPLATE,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::{compile_id_pattern, validate};
