use crate::error::NotifyError;
use crate::models::ListingRecord;
use crate::notify::Notifier;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::info;

/// POSTs each new listing as JSON to a configured URL
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: String, timeout: Duration) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotifyError::Transport(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client, url })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, listing: &ListingRecord) -> Result<(), NotifyError> {
        let payload = json!({
            "event": "new_listing",
            "sent_at": Utc::now(),
            "listing": listing,
        });

        let resp = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(NotifyError::from_status(status, body));
        }

        info!(id = %listing.id, "Webhook delivered");
        Ok(())
    }

    fn channel_name(&self) -> &'static str {
        "webhook"
    }
}
