//! Paginated rating fetcher
//!
//! For one identifier the fetcher reads page 1, takes the declared total and
//! display name from it, then walks pages `2, 3, ...` while
//! `(page - 1) * page_size < declared_total`. Each successful page is yielded
//! once, in increasing order.
//!
//! # States
//!
//! ```text
//! AwaitingFirstPage ──ok──▶ Paginating ──covered──▶ Done
//!        │                       │
//!        └──fail/empty/total──▶ Skipped      (page failure: see PageFailurePolicy)
//! ```

use crate::config::{Config, FailurePolicyName, FetcherConfig};
use crate::harvest::feed::{parse_rating_page, RatingPage};
use crate::harvest::fetcher::fetch_text;
use crate::model::{
    has_page, pages_for_total, parse_declared_total, resolve_display_name, Identifier,
    RatingBatch,
};
use crate::url::UrlTemplate;
use crate::{ConfigError, FetchError, UrlError, ValueParseError};
use reqwest::Client;
use thiserror::Error;

/// Errors for a single rating page
#[derive(Debug, Error)]
pub enum PageError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Failed to build rating URL for {id} page {page}: {source}")]
    Url {
        id: String,
        page: u32,
        source: UrlError,
    },

    #[error("Failed to parse rating feed for {id} page {page}: {message}")]
    Xml { id: String, page: u32, message: String },

    #[error(transparent)]
    Total(#[from] ValueParseError),
}

/// What to do when a page after the first one fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PageFailurePolicy {
    /// Drop the remaining pages of the identifier
    #[default]
    AbandonIdentifier,

    /// Request the same page again up to `attempts` more times, then abandon
    RetryPage { attempts: u32 },

    /// Log the failure and continue with the next page
    SkipPage,
}

impl From<&FetcherConfig> for PageFailurePolicy {
    fn from(config: &FetcherConfig) -> Self {
        match config.page_failure_policy {
            FailurePolicyName::AbandonIdentifier => Self::AbandonIdentifier,
            FailurePolicyName::RetryPage => Self::RetryPage {
                attempts: config.retry_attempts,
            },
            FailurePolicyName::SkipPage => Self::SkipPage,
        }
    }
}

impl PageFailurePolicy {
    fn extra_attempts(&self) -> u32 {
        match self {
            Self::RetryPage { attempts } => *attempts,
            _ => 0,
        }
    }
}

/// A source of rating feed pages for an identifier
#[allow(async_fn_in_trait)]
pub trait RatingSource {
    /// Fetches and parses one page (1-based) of ratings
    async fn fetch_page(&self, id: &Identifier, page: u32) -> Result<RatingPage, PageError>;
}

/// Rating source backed by the HTTP XML feed
pub struct HttpRatingSource {
    client: Client,
    template: UrlTemplate,
}

impl HttpRatingSource {
    pub fn new(config: &Config, client: Client) -> Result<Self, ConfigError> {
        let template = UrlTemplate::rating(&config.source.rating_url_template)
            .map_err(|e| ConfigError::InvalidUrl(e.to_string()))?;
        Ok(Self { client, template })
    }
}

impl RatingSource for HttpRatingSource {
    async fn fetch_page(&self, id: &Identifier, page: u32) -> Result<RatingPage, PageError> {
        let url = self
            .template
            .render_rating(id.as_str(), page)
            .map_err(|source| PageError::Url {
                id: id.to_string(),
                page,
                source,
            })?;

        let body = fetch_text(&self.client, &url).await?;

        parse_rating_page(&body).map_err(|e| PageError::Xml {
            id: id.to_string(),
            page,
            message: e.to_string(),
        })
    }
}

/// Why an identifier produced no usable first page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Network, status, or parse failure on page 1
    FirstPageFailed(String),

    /// Page 1 had no `item` elements
    NoData,

    /// The declared total was not a valid count
    InvalidTotal(String),
}

/// Final outcome of one identifier's fetch loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentifierOutcome {
    /// Every page covering the declared total was fetched
    Completed,

    /// Nothing was fetched for the identifier
    Skipped(SkipReason),

    /// Page `page` failed and the remaining pages were dropped
    Abandoned { page: u32 },

    /// The loop ran to the end but the listed pages failed
    Partial { failed_pages: Vec<u32> },
}

/// Transient loop state for one identifier
#[derive(Debug)]
struct PageCursor {
    identifier: Identifier,
    page: u32,
    pages_fetched: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    AwaitingFirstPage,
    Paginating,
    Done,
    Skipped,
}

/// First-page facts carried to every later batch
#[derive(Debug, Clone)]
struct EntryHeader {
    name: String,
    declared_total: u64,
}

/// Lazy sequence of rating batches for one identifier
pub struct RatingPages<'a, S: RatingSource> {
    source: &'a S,
    policy: PageFailurePolicy,
    page_size: u64,
    state: State,
    cursor: PageCursor,
    header: Option<EntryHeader>,
    failed_pages: Vec<u32>,
    outcome: Option<IdentifierOutcome>,
}

impl<'a, S: RatingSource> RatingPages<'a, S> {
    fn new(
        source: &'a S,
        policy: PageFailurePolicy,
        page_size: u64,
        identifier: Identifier,
    ) -> Self {
        Self {
            source,
            policy,
            page_size,
            state: State::AwaitingFirstPage,
            cursor: PageCursor {
                identifier,
                page: 1,
                pages_fetched: 0,
            },
            header: None,
            failed_pages: Vec::new(),
            outcome: None,
        }
    }

    /// Produces the next batch, a page-level failure, or `None` when finished
    ///
    /// After a failure that ends the identifier (first page, bad total,
    /// abandonment) the following call returns `None`.
    pub async fn next_batch(&mut self) -> Option<Result<RatingBatch, PageError>> {
        match self.state {
            State::AwaitingFirstPage => self.first_page().await,
            State::Paginating => self.next_page().await,
            State::Done | State::Skipped => None,
        }
    }

    pub fn identifier(&self) -> &Identifier {
        &self.cursor.identifier
    }

    /// Display name, known once page 1 has been read
    pub fn name(&self) -> Option<&str> {
        self.header.as_ref().map(|h| h.name.as_str())
    }

    /// Declared total, known once page 1 has been read
    pub fn declared_total(&self) -> Option<u64> {
        self.header.as_ref().map(|h| h.declared_total)
    }

    pub fn pages_fetched(&self) -> u32 {
        self.cursor.pages_fetched
    }

    /// Terminal outcome, `None` while pages remain
    pub fn outcome(&self) -> Option<&IdentifierOutcome> {
        self.outcome.as_ref()
    }

    async fn first_page(&mut self) -> Option<Result<RatingBatch, PageError>> {
        let id = self.cursor.identifier.clone();

        let page = match self.source.fetch_page(&id, 1).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("Skipping {}: first page failed: {}", id, e);
                self.skip(SkipReason::FirstPageFailed(e.to_string()));
                return Some(Err(e));
            }
        };

        let Some(entry) = page.into_first_entry() else {
            tracing::info!("No data found for {}, skipping", id);
            self.skip(SkipReason::NoData);
            return None;
        };

        let declared_total = match parse_declared_total(&entry.total_items) {
            Ok(total) => total,
            Err(e) => {
                tracing::warn!("Skipping {}: {}", id, e);
                self.skip(SkipReason::InvalidTotal(entry.total_items.clone()));
                return Some(Err(e.into()));
            }
        };

        let name = resolve_display_name(&entry.names);
        tracing::info!(
            "{} has {} ratings ({} pages)",
            name,
            declared_total,
            pages_for_total(declared_total, self.page_size)
        );

        self.header = Some(EntryHeader {
            name: name.clone(),
            declared_total,
        });
        self.cursor.pages_fetched = 1;
        self.cursor.page = 2;
        self.state = State::Paginating;
        self.finish_if_covered();

        Some(Ok(RatingBatch {
            identifier: id,
            page: 1,
            name,
            declared_total,
            ratings: entry.ratings,
        }))
    }

    async fn next_page(&mut self) -> Option<Result<RatingBatch, PageError>> {
        let header = self.header.clone()?;
        let id = self.cursor.identifier.clone();
        let page_number = self.cursor.page;

        match self.fetch_with_retries(&id, page_number).await {
            Ok(page) => {
                let ratings = page
                    .into_first_entry()
                    .map(|entry| entry.ratings)
                    .unwrap_or_default();
                if ratings.is_empty() {
                    tracing::debug!("{} page {} returned no ratings", id, page_number);
                }

                self.cursor.pages_fetched += 1;
                self.cursor.page += 1;
                self.finish_if_covered();

                Some(Ok(RatingBatch {
                    identifier: id,
                    page: page_number,
                    name: header.name,
                    declared_total: header.declared_total,
                    ratings,
                }))
            }
            Err(e) => {
                match self.policy {
                    PageFailurePolicy::SkipPage => {
                        tracing::warn!("{} page {} failed, skipping page: {}", id, page_number, e);
                        self.failed_pages.push(page_number);
                        self.cursor.page += 1;
                        self.finish_if_covered();
                    }
                    PageFailurePolicy::AbandonIdentifier | PageFailurePolicy::RetryPage { .. } => {
                        tracing::warn!(
                            "{} page {} failed, abandoning remaining pages: {}",
                            id,
                            page_number,
                            e
                        );
                        self.state = State::Done;
                        self.outcome = Some(IdentifierOutcome::Abandoned { page: page_number });
                    }
                }
                Some(Err(e))
            }
        }
    }

    async fn fetch_with_retries(
        &self,
        id: &Identifier,
        page: u32,
    ) -> Result<RatingPage, PageError> {
        let mut retries_left = self.policy.extra_attempts();
        loop {
            match self.source.fetch_page(id, page).await {
                Ok(page) => return Ok(page),
                Err(e) if retries_left > 0 => {
                    retries_left -= 1;
                    tracing::warn!(
                        "{} page {} failed, retrying ({} left): {}",
                        id,
                        page,
                        retries_left,
                        e
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn finish_if_covered(&mut self) {
        let Some(header) = &self.header else {
            return;
        };
        if has_page(self.cursor.page, header.declared_total, self.page_size) {
            return;
        }

        self.state = State::Done;
        self.outcome = Some(if self.failed_pages.is_empty() {
            IdentifierOutcome::Completed
        } else {
            IdentifierOutcome::Partial {
                failed_pages: self.failed_pages.clone(),
            }
        });
    }

    fn skip(&mut self, reason: SkipReason) {
        self.state = State::Skipped;
        self.outcome = Some(IdentifierOutcome::Skipped(reason));
    }
}

/// Summary of one identifier's fetch loop
#[derive(Debug, Clone)]
pub struct IdentifierReport {
    pub identifier: Identifier,
    pub name: Option<String>,
    pub declared_total: Option<u64>,
    pub outcome: IdentifierOutcome,
    pub pages_fetched: u32,
    pub ratings_seen: usize,
    pub numeric_ratings: usize,
}

/// Drives `RatingPages` for identifiers against a rating source
pub struct Paginator<S: RatingSource> {
    source: S,
    policy: PageFailurePolicy,
    page_size: u64,
}

impl<S: RatingSource> Paginator<S> {
    /// Creates a paginator
    ///
    /// A `page_size` of 0 is raised to 1 so the stop condition always
    /// terminates.
    pub fn new(source: S, policy: PageFailurePolicy, page_size: u64) -> Self {
        if page_size == 0 {
            tracing::warn!("Page size 0 is invalid, using 1");
        }

        Self {
            source,
            policy,
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    pub fn policy(&self) -> PageFailurePolicy {
        self.policy
    }

    /// Starts the lazy page sequence for one identifier
    pub fn pages(&self, identifier: Identifier) -> RatingPages<'_, S> {
        RatingPages::new(&self.source, self.policy, self.page_size, identifier)
    }

    /// Fetches every page for an identifier and reports what happened
    ///
    /// Batches are logged and dropped; nothing is retained beyond the counts.
    pub async fn fetch_all(&self, identifier: Identifier) -> IdentifierReport {
        let mut pages = self.pages(identifier);
        let mut ratings_seen = 0;
        let mut numeric_ratings = 0;

        while let Some(item) = pages.next_batch().await {
            match item {
                Ok(batch) => {
                    tracing::debug!(
                        "{} page {}: {} ratings",
                        batch.identifier,
                        batch.page,
                        batch.ratings.len()
                    );
                    ratings_seen += batch.ratings.len();
                    numeric_ratings += batch.numeric_ratings();
                }
                Err(e) => tracing::debug!("{} page error: {}", pages.identifier(), e),
            }
        }

        let outcome = pages
            .outcome()
            .cloned()
            .unwrap_or(IdentifierOutcome::Completed);

        IdentifierReport {
            identifier: pages.identifier().clone(),
            name: pages.name().map(str::to_string),
            declared_total: pages.declared_total(),
            outcome,
            pages_fetched: pages.pages_fetched(),
            ratings_seen,
            numeric_ratings,
        }
    }
}
