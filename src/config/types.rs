use serde::Deserialize;

/// Default listing page template (BoardGameGeek browse pages)
pub const DEFAULT_LISTING_URL_TEMPLATE: &str = "https://boardgamegeek.com/browse/boardgame/page/{page}";

/// Default rating feed template (BoardGameGeek XML API v2)
pub const DEFAULT_RATING_URL_TEMPLATE: &str =
    "https://www.boardgamegeek.com/xmlapi2/thing?id={id}&ratingcomments=1&page={page}";

/// Default identifier capture pattern
pub const DEFAULT_ID_PATTERN: &str = r#"href="/boardgame/(\d+)/"#;

/// Default number of listing pages scanned during discovery
pub const DEFAULT_LISTING_PAGES: u32 = 5;

/// Number of rating records the upstream feed returns per page
pub const DEFAULT_PAGE_SIZE: u64 = 100;

/// Main configuration structure for Rating-Harvester
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub fetcher: FetcherConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
}

/// Upstream endpoints and pagination constants
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SourceConfig {
    /// Listing page URL, `{page}` is replaced by the 1-based page number
    pub listing_url_template: String,

    /// Rating feed URL, `{id}` and `{page}` are substituted per request
    pub rating_url_template: String,

    /// Regex applied to listing bodies; capture group 1 is the identifier
    pub id_pattern: String,

    /// Number of listing pages to scan
    pub listing_pages: u32,

    /// Rating records per feed page
    pub page_size: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            listing_url_template: DEFAULT_LISTING_URL_TEMPLATE.to_string(),
            rating_url_template: DEFAULT_RATING_URL_TEMPLATE.to_string(),
            id_pattern: DEFAULT_ID_PATTERN.to_string(),
            listing_pages: DEFAULT_LISTING_PAGES,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// How a failed rating page beyond the first is handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicyName {
    /// Stop fetching the identifier and move on to the next one
    #[default]
    AbandonIdentifier,

    /// Retry the same page a bounded number of times
    RetryPage,

    /// Log the failure and continue with the following page
    SkipPage,
}

/// Rating fetcher behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FetcherConfig {
    pub page_failure_policy: FailurePolicyName,

    /// Extra attempts per page when the policy is `retry-page`
    pub retry_attempts: u32,

    /// Per-request timeout; no timeout when absent
    pub request_timeout_secs: Option<u64>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            page_failure_policy: FailurePolicyName::default(),
            retry_attempts: 1,
            request_timeout_secs: None,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UserAgentConfig {
    pub name: String,
    pub version: String,

    /// URL with information about the harvester
    pub contact_url: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            name: "RatingHarvester".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the header value: `Name/Version` or `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!("{}/{} (+{})", self.name, self.version, contact),
            None => format!("{}/{}", self.name, self.version),
        }
    }
}
