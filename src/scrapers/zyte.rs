use crate::error::FetchError;
use crate::scrapers::traits::{FetchStrategy, Fetcher, RawPayload};
use crate::scrapers::types::SearchParams;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

const ZYTE_EXTRACT_URL: &str = "https://api.zyte.com/v1/extract";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExtractRequest<'a> {
    url: &'a str,
    browser_html: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExtractResponse {
    #[serde(default)]
    browser_html: Option<String>,
}

/// Renders the search page through the Zyte extraction API
pub struct ZyteFetcher {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl ZyteFetcher {
    pub fn new(api_key: String, base_url: Url, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Network(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            base_url,
        })
    }
}

fn rendered_html(body: &str) -> Result<String, FetchError> {
    let parsed: ExtractResponse = serde_json::from_str(body)
        .map_err(|e| FetchError::Parse(format!("Zyte response: {}", e)))?;
    Ok(parsed.browser_html.unwrap_or_default())
}

#[async_trait]
impl Fetcher for ZyteFetcher {
    async fn fetch(&self, params: &SearchParams) -> Result<RawPayload, FetchError> {
        let target = params
            .search_url(&self.base_url)
            .map_err(|e| FetchError::Parse(format!("bad search URL: {}", e)))?;

        info!(url = %target, "Rendering search page through Zyte");

        let response = self
            .client
            .post(ZYTE_EXTRACT_URL)
            .basic_auth(&self.api_key, Some(""))
            .json(&ExtractRequest {
                url: target.as_str(),
                browser_html: true,
            })
            .send()
            .await?;

        let status = response.status();
        // Zyte reports a ban on the target site as 520
        if status.as_u16() == 520 {
            return Err(FetchError::Blocked("Zyte could not bypass the site".to_string()));
        }
        if !status.is_success() {
            warn!(%status, "Zyte returned error status");
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let html = rendered_html(&body)?;
        debug!(bytes = html.len(), "Received rendered HTML");

        RawPayload::html(FetchStrategy::Zyte, target.as_str(), html).ensure_not_empty()
    }

    fn strategy(&self) -> FetchStrategy {
        FetchStrategy::Zyte
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_browser_html_field() {
        let html = rendered_html(r#"{"url":"x","browserHtml":"<html></html>"}"#).unwrap();
        assert_eq!(html, "<html></html>");
    }

    #[test]
    fn missing_browser_html_is_empty() {
        let html = rendered_html(r#"{"url":"x"}"#).unwrap();
        assert!(html.is_empty());
    }

    #[test]
    fn non_json_response_is_parse_error() {
        assert!(matches!(
            rendered_html("<html>"),
            Err(FetchError::Parse(_))
        ));
    }
}
