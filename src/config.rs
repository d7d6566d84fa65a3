use crate::error::ConfigError;
use crate::models::PriceWindow;
use crate::notify::email::{EmailSettings, DEFAULT_EMAIL_API_URL};
use crate::scrapers::{FetchStrategy, SearchParams};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

const DEFAULT_BASE_URL: &str = "https://www.daft.ie";
const DEFAULT_GATEWAY_URL: &str = "https://gateway.daft.ie/api/v2/ads/listings";

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub strategy: FetchStrategy,
    /// Site root; relative listing links resolve against it
    pub base_url: Url,
    pub gateway_url: String,
    pub zyte_api_key: Option<String>,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub enum NotifierSettings {
    Email(EmailSettings),
    Webhook { url: String },
}

/// Everything one scan cycle needs, read once at start-up
#[derive(Debug, Clone)]
pub struct Config {
    pub search: SearchParams,
    pub window: PriceWindow,
    pub fetch: FetchSettings,
    pub notifier: NotifierSettings,
    pub notify_timeout: Duration,
    pub seen_file: PathBuf,
}

fn parsed<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            value: value.clone(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

fn required(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<String, ConfigError> {
    lookup(name)
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(name))
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key/value source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let lookup = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let min_price: i64 = parsed(&lookup, "PRICE_MIN", 1000)?;
        let max_price: i64 = parsed(&lookup, "PRICE_MAX", 1700)?;
        let window = PriceWindow::new(min_price, max_price).ok_or_else(|| ConfigError::Invalid {
            name: "PRICE_MIN",
            value: min_price.to_string(),
            reason: format!("greater than PRICE_MAX ({})", max_price),
        })?;

        let search = SearchParams {
            location: lookup("LOCATION").unwrap_or_else(|| "dublin-city".to_string()),
            category: lookup("CATEGORY").unwrap_or_else(|| "sharing".to_string()),
            min_price,
            max_price,
        };

        let base_url_raw = lookup("BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = Url::parse(&base_url_raw).map_err(|e| ConfigError::Invalid {
            name: "BASE_URL",
            value: base_url_raw.clone(),
            reason: e.to_string(),
        })?;

        let strategy: FetchStrategy = parsed(&lookup, "FETCH_STRATEGY", FetchStrategy::Html)?;
        let zyte_api_key = lookup("ZYTE_API_KEY");
        if strategy == FetchStrategy::Zyte && zyte_api_key.is_none() {
            return Err(ConfigError::Missing("ZYTE_API_KEY"));
        }

        let fetch = FetchSettings {
            strategy,
            base_url,
            gateway_url: lookup("GATEWAY_URL").unwrap_or_else(|| DEFAULT_GATEWAY_URL.to_string()),
            zyte_api_key,
            timeout: Duration::from_secs(parsed(&lookup, "FETCH_TIMEOUT", 60u64)?),
        };

        let channel = lookup("NOTIFIER").unwrap_or_else(|| "email".to_string());
        let notifier = match channel.trim().to_ascii_lowercase().as_str() {
            "email" => {
                let sender = required(&lookup, "EMAIL_ADDRESS")?;
                NotifierSettings::Email(EmailSettings {
                    api_url: lookup("EMAIL_API_URL")
                        .unwrap_or_else(|| DEFAULT_EMAIL_API_URL.to_string()),
                    api_key: required(&lookup, "EMAIL_API_KEY")?,
                    recipient: lookup("EMAIL_TO").unwrap_or_else(|| sender.clone()),
                    sender,
                })
            }
            "webhook" => NotifierSettings::Webhook {
                url: required(&lookup, "WEBHOOK_URL")?,
            },
            _ => {
                return Err(ConfigError::Invalid {
                    name: "NOTIFIER",
                    value: channel,
                    reason: "expected 'email' or 'webhook'".to_string(),
                })
            }
        };

        Ok(Self {
            search,
            window,
            fetch,
            notifier,
            notify_timeout: Duration::from_secs(parsed(&lookup, "NOTIFY_TIMEOUT", 30u64)?),
            seen_file: lookup("SEEN_LISTINGS_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("seen_listings.txt")),
        })
    }
}
