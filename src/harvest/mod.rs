//! Harvest module for listing discovery and rating pagination
//!
//! This module contains the core harvesting logic, including:
//! - HTTP fetching of listing and feed pages
//! - Identifier extraction from listing HTML
//! - XML rating feed parsing
//! - The per-identifier pagination state machine
//! - Overall run coordination

mod coordinator;
mod discoverer;
mod feed;
mod fetcher;
mod paginator;

pub use coordinator::Harvester;
pub use discoverer::{extract_identifiers, DiscoveryError, IdentifierDiscoverer};
pub use feed::{parse_rating_page, FeedEntry, FeedError, RatingPage};
pub use fetcher::{build_http_client, fetch_text};
pub use paginator::{
    HttpRatingSource, IdentifierOutcome, IdentifierReport, PageError, PageFailurePolicy,
    Paginator, RatingPages, RatingSource, SkipReason,
};

use crate::config::Config;
use crate::output::RunStatistics;
use crate::HarvestError;

/// Runs a complete harvest
///
/// This is the main entry point for starting a harvest. It will:
/// 1. Validate the configuration (templates, pattern, page size)
/// 2. Build the HTTP client
/// 3. Discover identifiers from the listing pages (fail-fast)
/// 4. Fetch every identifier's rating pages in order (fail-soft)
pub async fn harvest(config: &Config) -> Result<RunStatistics, HarvestError> {
    Harvester::new(config)?.run().await
}
