use crate::error::FetchError;
use crate::scrapers::html::USER_AGENT;
use crate::scrapers::traits::{FetchStrategy, Fetcher, RawPayload};
use crate::scrapers::types::SearchParams;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, warn};

const PAGE_SIZE: u32 = 50;

/// The site's internal JSON search API, as used by its own frontend
pub struct GatewayFetcher {
    client: Client,
    endpoint: String,
}

impl GatewayFetcher {
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::Network(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client, endpoint })
    }

    fn request_body(params: &SearchParams) -> Value {
        json!({
            "section": params.category,
            "filters": [
                { "name": "adState", "values": ["published"] }
            ],
            "ranges": [
                {
                    "name": "rentalPrice",
                    "from": params.min_price.to_string(),
                    "to": params.max_price.to_string()
                }
            ],
            "paging": { "from": "0", "pageSize": PAGE_SIZE.to_string() },
            "geoFilter": {
                "storedShapeIds": [params.location],
                "geoSearchType": "STORED_SHAPES"
            },
            "terms": ""
        })
    }
}

#[async_trait]
impl Fetcher for GatewayFetcher {
    async fn fetch(&self, params: &SearchParams) -> Result<RawPayload, FetchError> {
        info!(endpoint = %self.endpoint, section = %params.category, "Querying listings API");

        let response = self
            .client
            .post(&self.endpoint)
            .header("platform", "web")
            .header("brand", "daft")
            .json(&Self::request_body(params))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "Listings API returned error status");
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        debug!(bytes = body.len(), "Received listings API response");

        RawPayload::json(FetchStrategy::Gateway, self.endpoint.as_str(), body).ensure_not_empty()
    }

    fn strategy(&self) -> FetchStrategy {
        FetchStrategy::Gateway
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_carries_price_range_and_section() {
        let params = SearchParams {
            location: "dublin-city".to_string(),
            category: "sharing".to_string(),
            min_price: 900,
            max_price: 1500,
        };

        let body = GatewayFetcher::request_body(&params);

        assert_eq!(body["section"], "sharing");
        assert_eq!(body["ranges"][0]["from"], "900");
        assert_eq!(body["ranges"][0]["to"], "1500");
        assert_eq!(body["geoFilter"]["storedShapeIds"][0], "dublin-city");
    }
}
