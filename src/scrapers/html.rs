use crate::error::FetchError;
use crate::scrapers::traits::{FetchStrategy, Fetcher, RawPayload};
use crate::scrapers::types::SearchParams;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

pub(crate) const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Markers of an anti-bot interstitial served with a 200 status.
const CHALLENGE_MARKERS: &[&str] = &[
    "challenge-platform",
    "cf-chl-",
    "Just a moment...",
    "captcha-delivery",
];

/// Plain GET of the public search page
pub struct HtmlFetcher {
    client: Client,
    base_url: Url,
}

impl HtmlFetcher {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::Network(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }
}

pub(crate) fn looks_blocked(body: &str) -> bool {
    CHALLENGE_MARKERS.iter().any(|marker| body.contains(marker))
}

#[async_trait]
impl Fetcher for HtmlFetcher {
    async fn fetch(&self, params: &SearchParams) -> Result<RawPayload, FetchError> {
        let url = params
            .search_url(&self.base_url)
            .map_err(|e| FetchError::Parse(format!("bad search URL: {}", e)))?;

        info!(url = %url, "Fetching search page");

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
            warn!(%status, "Search page refused");
            return Err(FetchError::Blocked(format!("status {}", status)));
        }
        if !status.is_success() {
            warn!(%status, "Search page returned error status");
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let html = response.text().await?;
        debug!(bytes = html.len(), "Downloaded search page");

        if looks_blocked(&html) {
            return Err(FetchError::Blocked("anti-bot challenge page".to_string()));
        }

        RawPayload::html(FetchStrategy::Html, url.as_str(), html).ensure_not_empty()
    }

    fn strategy(&self) -> FetchStrategy {
        FetchStrategy::Html
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_challenge_interstitial() {
        let body = "<html><head><title>Just a moment...</title></head></html>";
        assert!(looks_blocked(body));
    }

    #[test]
    fn ordinary_results_page_is_not_blocked() {
        let body = r#"<ul data-testid="results"><li><a href="/share/x/1">x</a></li></ul>"#;
        assert!(!looks_blocked(body));
    }
}
