//! Rating-Harvester: a paginated ratings collector
//!
//! This crate scrapes catalog identifiers from a paginated HTML listing and then,
//! for each identifier, walks a paginated XML feed of user ratings until the
//! declared total has been covered.

pub mod config;
pub mod harvest;
pub mod model;
pub mod output;
pub mod url;

use thiserror::Error;

/// Main error type for Rating-Harvester operations
///
/// Only configuration and discovery failures reach this type; per-identifier
/// failures are logged and recovered inside the paginator.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Discovery error: {0}")]
    Discovery(#[from] harvest::DiscoveryError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
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

    #[error("Invalid URL template: {0}")]
    InvalidUrl(String),

    #[error("Invalid identifier pattern: {0}")]
    InvalidPattern(String),
}

/// URL template errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Template '{template}' is missing the {placeholder} placeholder")]
    MissingPlaceholder {
        template: String,
        placeholder: &'static str,
    },

    #[error("Failed to parse URL '{url}': {source}")]
    Parse {
        url: String,
        source: ::url::ParseError,
    },

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),
}

/// Transport-level errors for a single GET request
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Unexpected status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to read body of {url}: {source}")]
    Body { url: String, source: reqwest::Error },
}

/// Errors converting the untyped string fields of the rating feed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueParseError {
    #[error("Declared total is not a valid count: '{0}'")]
    InvalidTotal(String),

    #[error("Rating is not a number: '{0}'")]
    InvalidRating(String),
}

/// Result type alias for Rating-Harvester operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use harvest::{Harvester, PageFailurePolicy};
pub use model::{Identifier, RatingBatch, RatingRecord};
pub use crate::url::UrlTemplate;
