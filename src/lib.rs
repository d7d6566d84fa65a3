//! Room Scout: watches a rental listings site and sends one alert per new listing.

pub mod config;
pub mod error;
pub mod extract;
pub mod models;
pub mod notify;
pub mod scan;
pub mod scrapers;
pub mod store;

pub use config::Config;
pub use models::{ListingRecord, Price, PriceWindow};
pub use scan::{ScanSummary, Scanner};
