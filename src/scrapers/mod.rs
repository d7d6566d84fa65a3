pub mod browser;
pub mod gateway;
pub mod html;
pub mod traits;
pub mod types;
pub mod zyte;

use crate::config::FetchSettings;
use crate::error::FetchError;

pub use browser::BrowserFetcher;
pub use gateway::GatewayFetcher;
pub use html::HtmlFetcher;
pub use traits::{FetchStrategy, Fetcher, PayloadKind, RawPayload};
pub use types::SearchParams;
pub use zyte::ZyteFetcher;

/// Instantiate the fetch strategy selected by configuration.
pub fn build_fetcher(settings: &FetchSettings) -> Result<Box<dyn Fetcher>, FetchError> {
    let fetcher: Box<dyn Fetcher> = match settings.strategy {
        FetchStrategy::Html => Box::new(HtmlFetcher::new(
            settings.base_url.clone(),
            settings.timeout,
        )?),
        FetchStrategy::Gateway => Box::new(GatewayFetcher::new(
            settings.gateway_url.clone(),
            settings.timeout,
        )?),
        FetchStrategy::Zyte => {
            let api_key = settings
                .zyte_api_key
                .clone()
                .ok_or_else(|| FetchError::Parse("ZYTE_API_KEY is not configured".to_string()))?;
            Box::new(ZyteFetcher::new(
                api_key,
                settings.base_url.clone(),
                settings.timeout,
            )?)
        }
        FetchStrategy::Browser => Box::new(BrowserFetcher::new(
            settings.base_url.clone(),
            settings.timeout,
        )),
    };
    Ok(fetcher)
}
