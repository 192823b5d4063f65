//! Harvest coordinator - run orchestration
//!
//! A run discovers identifiers once, then fetches each identifier's rating
//! pages sequentially. Only discovery can abort a run; per-identifier failures
//! are logged and counted.

use crate::config::{validate, Config};
use crate::harvest::discoverer::IdentifierDiscoverer;
use crate::harvest::fetcher::build_http_client;
use crate::harvest::paginator::{
    HttpRatingSource, IdentifierOutcome, IdentifierReport, PageFailurePolicy, Paginator,
};
use crate::model::Identifier;
use crate::output::RunStatistics;
use crate::HarvestError;

/// Main harvester structure
pub struct Harvester {
    discoverer: IdentifierDiscoverer,
    paginator: Paginator<HttpRatingSource>,
}

impl Harvester {
    /// Creates a new harvester instance
    ///
    /// The configuration is validated here (identifier pattern, URL templates,
    /// page size), before any network request is made.
    ///
    /// # Returns
    ///
    /// * `Ok(Harvester)` - Successfully created harvester
    /// * `Err(HarvestError)` - Invalid configuration or HTTP client setup failure
    pub fn new(config: &Config) -> Result<Self, HarvestError> {
        validate(config)?;

        let client = build_http_client(config)?;
        let discoverer = IdentifierDiscoverer::new(config, client.clone())?;
        let source = HttpRatingSource::new(config, client)?;
        let paginator = Paginator::new(
            source,
            PageFailurePolicy::from(&config.fetcher),
            config.source.page_size,
        );

        if paginator.policy() != PageFailurePolicy::AbandonIdentifier {
            tracing::info!("Page failure policy: {:?}", paginator.policy());
        }

        Ok(Self {
            discoverer,
            paginator,
        })
    }

    /// Runs discovery followed by the per-identifier fetch loop
    ///
    /// # Returns
    ///
    /// * `Ok(RunStatistics)` - The run finished; individual identifiers may have been skipped
    /// * `Err(HarvestError)` - Discovery failed and no identifier was fetched
    pub async fn run(&self) -> Result<RunStatistics, HarvestError> {
        let mut stats = RunStatistics::start();

        tracing::info!(
            "Scanning {} listing pages, {} ratings per feed page",
            self.discoverer.listing_pages(),
            self.paginator.page_size()
        );
        let identifiers = self.discoverer.discover().await?;
        stats.identifiers_discovered = identifiers.len();

        self.harvest(identifiers, &mut stats).await;

        stats.finish();
        Ok(stats)
    }

    /// Fetches every identifier in order, recording each report
    pub async fn harvest(&self, identifiers: Vec<Identifier>, stats: &mut RunStatistics) {
        let total = identifiers.len();

        for (index, identifier) in identifiers.into_iter().enumerate() {
            tracing::debug!("Identifier {} of {}: {}", index + 1, total, identifier);
            let report = self.paginator.fetch_all(identifier).await;
            log_report(&report);
            stats.record(&report);
        }
    }
}

/// Writes the per-identifier summary line
fn log_report(report: &IdentifierReport) {
    match &report.outcome {
        IdentifierOutcome::Completed => tracing::info!(
            "{} ({}) has {} ratings: fetched {} pages",
            report.name.as_deref().unwrap_or_default(),
            report.identifier,
            report.declared_total.unwrap_or_default(),
            report.pages_fetched
        ),
        IdentifierOutcome::Skipped(reason) => {
            tracing::info!("{} skipped: {:?}", report.identifier, reason)
        }
        IdentifierOutcome::Abandoned { page } => tracing::warn!(
            "{} ({}) has {} ratings: abandoned at page {} after {} pages",
            report.name.as_deref().unwrap_or_default(),
            report.identifier,
            report.declared_total.unwrap_or_default(),
            page,
            report.pages_fetched
        ),
        IdentifierOutcome::Partial { failed_pages } => tracing::warn!(
            "{} ({}) has {} ratings: fetched {} pages, failed pages {:?}",
            report.name.as_deref().unwrap_or_default(),
            report.identifier,
            report.declared_total.unwrap_or_default(),
            report.pages_fetched,
            failed_pages
        ),
    }
}
