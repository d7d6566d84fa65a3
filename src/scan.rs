//! One scan cycle: fetch, extract, filter, then notify-and-record each new listing.
//!
//! An id is written to the seen store only after its notification is confirmed.
//! A crash between the two re-sends that listing next run; it is never lost.

use crate::config::Config;
use crate::error::{FetchError, NotifyError, StoreError};
use crate::extract::{retain_in_window, Extractor};
use crate::models::{ListingRecord, PriceWindow};
use crate::notify::{self, Notifier};
use crate::scrapers::{self, Fetcher, RawPayload, SearchParams};
use crate::store::SeenStore;
use anyhow::{Context, Result};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Fetching,
    Extracting,
    Filtering,
    Checking(String),
    Notifying(String),
    Recording(String),
}

/// Counts reported at the end of every cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Records extracted from the payload, before the price window
    pub fetched: usize,
    pub in_range: usize,
    /// In-range records not yet seen
    pub new: usize,
    pub notified: usize,
    pub failed: usize,
    /// Set when the cycle ended early because the fetch failed
    pub fetch_error: Option<String>,
}

struct Cycle {
    state: ScanState,
}

impl Cycle {
    fn new() -> Self {
        Self {
            state: ScanState::Idle,
        }
    }

    fn enter(&mut self, next: ScanState) {
        debug!(from = ?self.state, to = ?next, "Scan state");
        self.state = next;
    }
}

pub struct Scanner {
    search: SearchParams,
    window: PriceWindow,
    fetcher: Box<dyn Fetcher>,
    extractor: Extractor,
    notifier: Box<dyn Notifier>,
    store: SeenStore,
    fetch_timeout: Duration,
    notify_timeout: Duration,
}

impl Scanner {
    pub fn new(config: &Config, fetcher: Box<dyn Fetcher>, notifier: Box<dyn Notifier>) -> Self {
        Self {
            search: config.search.clone(),
            window: config.window,
            fetcher,
            extractor: Extractor::new(config.fetch.base_url.clone()),
            notifier,
            store: SeenStore::new(&config.seen_file),
            fetch_timeout: config.fetch.timeout,
            notify_timeout: config.notify_timeout,
        }
    }

    /// Wire up the configured fetch strategy and notification channel.
    pub fn from_config(config: &Config) -> Result<Self> {
        let fetcher = scrapers::build_fetcher(&config.fetch)
            .with_context(|| format!("Failed to set up {} fetcher", config.fetch.strategy))?;
        let notifier = notify::build_notifier(&config.notifier, config.notify_timeout)
            .context("Failed to set up notifier")?;

        Ok(Self::new(config, fetcher, notifier))
    }

    async fn fetch(&self) -> Result<RawPayload, FetchError> {
        match timeout(self.fetch_timeout, self.fetcher.fetch(&self.search)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(self.fetch_timeout)),
        }
    }

    async fn notify(&self, listing: &ListingRecord) -> Result<(), NotifyError> {
        match timeout(self.notify_timeout, self.notifier.notify(listing)).await {
            Ok(result) => result,
            Err(_) => Err(NotifyError::Timeout(self.notify_timeout)),
        }
    }

    /// Run one complete cycle.
    ///
    /// Fetch and notify failures are reported in the summary, not as errors.
    /// Only a seen store that can't be read or written aborts the cycle.
    pub async fn run_cycle(&self) -> Result<ScanSummary, StoreError> {
        let mut cycle = Cycle::new();
        let mut summary = ScanSummary::default();

        let mut seen = self.store.load()?;

        cycle.enter(ScanState::Fetching);
        let payload = match self.fetch().await {
            Ok(payload) => payload,
            Err(e) => {
                warn!(strategy = %self.fetcher.strategy(), error = %e, "Fetch failed; will retry next run");
                summary.fetch_error = Some(e.to_string());
                cycle.enter(ScanState::Idle);
                log_summary(&summary);
                return Ok(summary);
            }
        };

        cycle.enter(ScanState::Extracting);
        let extraction = self.extractor.extract(&payload);
        let mut records = extraction.records;
        summary.fetched = records.len();
        if !extraction.warnings.is_empty() {
            warn!(skipped = extraction.warnings.len(), "Some listings could not be read");
        }
        if records.is_empty() && extraction.source_reports_empty {
            info!("No listings found matching criteria.");
        }

        cycle.enter(ScanState::Filtering);
        let excluded = retain_in_window(&mut records, &self.window);
        summary.in_range = records.len();
        if excluded > 0 {
            debug!(excluded, "Dropped listings outside the price window");
        }

        for listing in &records {
            cycle.enter(ScanState::Checking(listing.id.clone()));
            if seen.contains(&listing.id) {
                debug!(id = %listing.id, "Skipping already seen listing");
                continue;
            }

            summary.new += 1;
            info!(
                id = %listing.id,
                "New listing found: {} - €{}",
                listing.address,
                listing.price
            );

            cycle.enter(ScanState::Notifying(listing.id.clone()));
            if let Err(e) = self.notify(listing).await {
                warn!(
                    id = %listing.id,
                    channel = self.notifier.channel_name(),
                    error = %e,
                    "Notification failed for listing, will retry next run"
                );
                summary.failed += 1;
                continue;
            }

            cycle.enter(ScanState::Recording(listing.id.clone()));
            if let Err(e) = self.store.record(&listing.id) {
                error!(id = %listing.id, error = %e, "Notified but could not record listing");
                return Err(e);
            }
            seen.insert(listing.id.as_str());
            summary.notified += 1;
        }

        cycle.enter(ScanState::Idle);
        log_summary(&summary);
        Ok(summary)
    }
}

fn log_summary(summary: &ScanSummary) {
    info!("{}", "=".repeat(60));
    info!(
        failed = summary.failed,
        in_range = summary.in_range,
        "Scan complete: {} total, {} new, {} notified",
        summary.fetched,
        summary.new,
        summary.notified
    );
    info!("{}", "=".repeat(60));
}
