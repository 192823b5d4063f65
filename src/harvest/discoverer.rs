//! Identifier discovery from paginated listing pages
//!
//! Discovery is a one-time bulk prerequisite, so it fails fast: the first
//! listing page that cannot be fetched aborts the whole operation and any
//! identifiers gathered so far are dropped.

use crate::config::{compile_id_pattern, Config};
use crate::harvest::fetcher::fetch_text;
use crate::model::Identifier;
use crate::url::UrlTemplate;
use crate::{ConfigError, FetchError, UrlError};
use regex::Regex;
use reqwest::Client;
use thiserror::Error;

/// Errors that abort identifier discovery
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Failed to fetch listing page {page}: {source}")]
    Fetch { page: u32, source: FetchError },

    #[error("Failed to build URL for listing page {page}: {source}")]
    Url { page: u32, source: UrlError },
}

/// Scans listing pages and extracts catalog identifiers
pub struct IdentifierDiscoverer {
    client: Client,
    template: UrlTemplate,
    pattern: Regex,
    listing_pages: u32,
}

impl IdentifierDiscoverer {
    /// Creates a discoverer, compiling the identifier pattern up front
    ///
    /// # Returns
    ///
    /// * `Ok(IdentifierDiscoverer)` - Ready to scan
    /// * `Err(ConfigError)` - The URL template or the pattern is invalid
    pub fn new(config: &Config, client: Client) -> Result<Self, ConfigError> {
        let template = UrlTemplate::listing(&config.source.listing_url_template)
            .map_err(|e| ConfigError::InvalidUrl(e.to_string()))?;
        let pattern = compile_id_pattern(&config.source.id_pattern)?;

        Ok(Self {
            client,
            template,
            pattern,
            listing_pages: config.source.listing_pages,
        })
    }

    /// Number of listing pages this discoverer will request
    pub fn listing_pages(&self) -> u32 {
        self.listing_pages
    }

    /// Fetches listing pages `1..=listing_pages` in order and collects identifiers
    ///
    /// Identifiers keep their encounter order across pages and are not
    /// deduplicated. A page without matches is not an error.
    pub async fn discover(&self) -> Result<Vec<Identifier>, DiscoveryError> {
        let mut identifiers = Vec::new();

        for page in 1..=self.listing_pages {
            let url = self
                .template
                .render_listing(page)
                .map_err(|source| DiscoveryError::Url { page, source })?;

            let body = match fetch_text(&self.client, &url).await {
                Ok(body) => body,
                Err(source) => {
                    tracing::error!("Listing page {} failed, aborting discovery: {}", page, source);
                    return Err(DiscoveryError::Fetch { page, source });
                }
            };

            let found = extract_identifiers(&self.pattern, &body);
            if found.is_empty() {
                tracing::debug!("Listing page {} contained no identifiers", page);
            } else {
                tracing::info!("Listing page {}: {} identifiers", page, found.len());
            }
            identifiers.extend(found);
        }

        tracing::info!(
            "Discovered {} identifiers across {} listing pages",
            identifiers.len(),
            self.listing_pages
        );

        Ok(identifiers)
    }
}

/// Applies the capture pattern to a page body
///
/// Capture group 1 of each match becomes an identifier; empty captures are
/// dropped.
///
/// # Example
///
/// ```
/// use rating_harvester::harvest::extract_identifiers;
/// use regex::Regex;
///
/// let pattern = Regex::new(r#"href="/boardgame/(\d+)/"#).unwrap();
/// let ids = extract_identifiers(&pattern, r#"<a href="/boardgame/13/catan">Catan</a>"#);
/// assert_eq!(ids[0].as_str(), "13");
/// ```
pub fn extract_identifiers(pattern: &Regex, body: &str) -> Vec<Identifier> {
    pattern
        .captures_iter(body)
        .filter_map(|captures| captures.get(1))
        .map(|capture| capture.as_str())
        .filter(|value| !value.is_empty())
        .map(Identifier::from)
        .collect()
}
