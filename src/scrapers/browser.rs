use crate::error::FetchError;
use crate::scrapers::traits::{FetchStrategy, Fetcher, RawPayload};
use crate::scrapers::types::SearchParams;
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

const ACCEPT_COOKIES_JS: &str = r#"
    const button = document.querySelector('button[id*="accept"], button[data-testid*="accept"], #didomi-notice-agree-button');
    if (button) button.click();
"#;

const SETTLE: Duration = Duration::from_secs(8);
const COOKIE_SETTLE: Duration = Duration::from_secs(2);

/// Browser-based fetcher using headless Chrome
pub struct BrowserFetcher {
    base_url: Url,
    timeout: Duration,
}

impl BrowserFetcher {
    /// `timeout` bounds every Chrome call and the fixed settle waits, so the
    /// blocking render ends soon after the caller stops waiting for it.
    pub fn new(base_url: Url, timeout: Duration) -> Self {
        Self { base_url, timeout }
    }
}

/// Sleeps taken while rendering, shrunk so together they use at most half of `timeout`.
fn settle_waits(timeout: Duration) -> (Duration, Duration) {
    let budget = timeout / 2;
    let settle = SETTLE.min(budget * 4 / 5);
    let cookies = COOKIE_SETTLE.min(budget - settle);
    (settle, cookies)
}

fn browser_error(context: &str, err: impl std::fmt::Display) -> FetchError {
    FetchError::Network(format!("{}: {}", context, err))
}

/// Blocking: launches Chrome, renders the page and returns its outer HTML.
fn render(url: &Url, timeout: Duration) -> Result<String, FetchError> {
    info!("Launching headless Chrome...");

    let options = LaunchOptions::default_builder()
        .headless(true)
        .idle_browser_timeout(timeout)
        .build()
        .map_err(|e| browser_error("Failed to build launch options", e))?;

    let browser =
        Browser::new(options).map_err(|e| browser_error("Failed to launch Chrome browser", e))?;
    let tab = browser
        .new_tab()
        .map_err(|e| browser_error("Failed to open tab", e))?;
    tab.set_default_timeout(timeout);

    let (settle, cookie_settle) = settle_waits(timeout);

    tab.navigate_to(url.as_str())
        .map_err(|e| browser_error("Navigation failed", e))?;
    tab.wait_until_navigated()
        .map_err(|e| browser_error("Navigation did not complete", e))?;

    debug!(?settle, "Waiting for page to settle");
    thread::sleep(settle);

    if let Err(e) = tab.evaluate(ACCEPT_COOKIES_JS, false) {
        debug!(error = %e, "Cookie banner script failed");
    }
    thread::sleep(cookie_settle);

    let html_result = tab
        .evaluate("document.documentElement.outerHTML", false)
        .map_err(|e| browser_error("Could not read page HTML", e))?;

    match html_result.value.as_ref().and_then(|value| value.as_str()) {
        Some(html) => Ok(html.to_string()),
        None => {
            warn!("Could not get HTML from page");
            Ok(String::new())
        }
    }
}

#[async_trait]
impl Fetcher for BrowserFetcher {
    async fn fetch(&self, params: &SearchParams) -> Result<RawPayload, FetchError> {
        let url = params
            .search_url(&self.base_url)
            .map_err(|e| FetchError::Parse(format!("bad search URL: {}", e)))?;
        let timeout = self.timeout;

        info!(url = %url, "Rendering search page in browser");

        let target = url.clone();
        let html = tokio::task::spawn_blocking(move || render(&target, timeout))
            .await
            .map_err(|e| FetchError::Network(format!("browser task failed: {}", e)))??;

        debug!(bytes = html.len(), "Captured rendered HTML");

        if crate::scrapers::html::looks_blocked(&html) {
            return Err(FetchError::Blocked("anti-bot challenge page".to_string()));
        }

        RawPayload::html(FetchStrategy::Browser, url.as_str(), html).ensure_not_empty()
    }

    fn strategy(&self) -> FetchStrategy {
        FetchStrategy::Browser
    }
}
