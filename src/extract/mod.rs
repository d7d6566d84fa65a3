//! Turns a raw fetch payload into normalized [`ListingRecord`]s.
//!
//! A malformed entry is skipped with a warning and never stops the rest of
//! the batch. Records come back in source order with duplicate ids collapsed.

pub mod html;
pub mod json;
pub mod normalize;

use crate::models::{ListingRecord, PriceWindow};
use crate::scrapers::{PayloadKind, RawPayload};
use normalize::{collapse_duplicates, normalize, RawListing};
use tracing::{debug, warn};
use url::Url;

#[derive(Debug, Default)]
pub struct Extraction {
    pub records: Vec<ListingRecord>,
    pub warnings: Vec<String>,
    /// The source itself says there are no listings for this query
    pub source_reports_empty: bool,
}

pub struct Extractor {
    base_url: Url,
}

impl Extractor {
    pub fn new(base_url: Url) -> Self {
        Self { base_url }
    }

    pub fn extract(&self, payload: &RawPayload) -> Extraction {
        let mut extraction = Extraction::default();

        let entries: Vec<Result<RawListing, String>> = match payload.kind {
            PayloadKind::Html => {
                let batch = html::parse_cards(&payload.body);
                extraction.source_reports_empty = batch.reports_empty;
                batch.entries.into_iter().map(Ok).collect()
            }
            PayloadKind::Json => match json::parse_listings(&payload.body) {
                Ok(batch) => {
                    extraction.source_reports_empty = batch.reports_empty;
                    batch.entries
                }
                Err(reason) => {
                    warn!(strategy = %payload.strategy, %reason, "Could not read payload");
                    extraction.warnings.push(reason);
                    Vec::new()
                }
            },
        };

        let mut records = Vec::with_capacity(entries.len());
        for (idx, entry) in entries.into_iter().enumerate() {
            match entry.and_then(|raw| normalize(raw, &self.base_url)) {
                Ok(record) => records.push(record),
                Err(reason) => {
                    warn!(entry = idx, %reason, "Skipping malformed listing");
                    extraction
                        .warnings
                        .push(format!("entry {}: {}", idx, reason));
                }
            }
        }

        let (records, duplicates) = collapse_duplicates(records);
        if duplicates > 0 {
            debug!(duplicates, "Collapsed duplicate listings");
        }
        extraction.records = records;

        if extraction.records.is_empty() && !extraction.source_reports_empty {
            warn!(
                strategy = %payload.strategy,
                source = %payload.source_url,
                "No listings extracted and the source did not report an empty result; markup may have changed"
            );
        }

        extraction
    }
}

/// Drop records whose known price lies outside the window. Returns how many were dropped.
pub fn retain_in_window(records: &mut Vec<ListingRecord>, window: &PriceWindow) -> usize {
    let before = records.len();
    records.retain(|record| {
        let keep = window.admits(&record.price);
        if !keep {
            debug!(id = %record.id, price = %record.price, "Outside price window");
        }
        keep
    });
    before - records.len()
}
