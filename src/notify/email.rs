use crate::error::NotifyError;
use crate::models::ListingRecord;
use crate::notify::Notifier;
use async_trait::async_trait;
use chrono::{DateTime, Local};
use maud::{html, Markup, DOCTYPE};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::info;

pub const DEFAULT_EMAIL_API_URL: &str = "https://api.brevo.com/v3/smtp/email";

#[derive(Debug, Clone)]
pub struct EmailSettings {
    pub api_url: String,
    pub api_key: String,
    pub sender: String,
    pub recipient: String,
}

#[derive(Serialize)]
struct Contact<'a> {
    name: &'a str,
    email: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MailPayload<'a> {
    sender: Contact<'a>,
    to: Vec<Contact<'a>>,
    subject: &'a str,
    html_content: String,
}

/// Subject and HTML body for one listing alert
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub subject: String,
    pub html: String,
}

pub fn subject_line(listing: &ListingRecord) -> String {
    format!("🏠 New Room: €{} - {}", listing.price, listing.address)
}

fn detail_row(label: &str, value: &str) -> Markup {
    html! {
        p style="margin: 10px 0;" { strong { (label) ":" } " " (value) }
    }
}

fn body(listing: &ListingRecord, sent_at: DateTime<Local>) -> Markup {
    html! {
        (DOCTYPE)
        html {
            body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;" {
                h2 style="color: #2c3e50;" { "New Room Available!" }

                div style="background-color: #f8f9fa; padding: 20px; border-radius: 5px; margin: 20px 0;" {
                    p style="margin: 10px 0;" {
                        strong { "Price:" } " "
                        span style="color: #27ae60; font-size: 18px;" { "€" (listing.price.to_string()) "/month" }
                    }
                    (detail_row("Address", &listing.address))
                    (detail_row("Available", listing.availability_or_default()))
                    @if let Some(property_type) = &listing.property_type {
                        (detail_row("Property Type", property_type))
                    }
                    @if let Some(bedrooms) = &listing.bedrooms {
                        (detail_row("Bedrooms", bedrooms))
                    }
                }

                div style="margin: 30px 0;" {
                    a href=(listing.link)
                        style="background-color: #3498db; color: white; padding: 12px 30px; text-decoration: none; border-radius: 5px; display: inline-block; font-weight: bold;"
                    { "View Full Listing" }
                }

                hr style="border: none; border-top: 1px solid #ddd; margin: 30px 0;";

                p style="font-size: 12px; color: #7f8c8d;" {
                    "This is an automated notification from your room scout." br;
                    "Listing ID: " (listing.id) br;
                    "Sent: " (sent_at.format("%Y-%m-%d %H:%M:%S").to_string())
                }
            }
        }
    }
}

pub fn compose(listing: &ListingRecord, sent_at: DateTime<Local>) -> EmailMessage {
    EmailMessage {
        subject: subject_line(listing),
        html: body(listing, sent_at).into_string(),
    }
}

/// Sends alerts through a transactional mail HTTP API
pub struct EmailNotifier {
    client: Client,
    settings: EmailSettings,
}

impl EmailNotifier {
    pub fn new(settings: EmailSettings, timeout: Duration) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotifyError::Transport(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client, settings })
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn notify(&self, listing: &ListingRecord) -> Result<(), NotifyError> {
        let message = compose(listing, Local::now());

        let payload = MailPayload {
            sender: Contact {
                name: "Room Scout",
                email: &self.settings.sender,
            },
            to: vec![Contact {
                name: &self.settings.recipient,
                email: &self.settings.recipient,
            }],
            subject: &message.subject,
            html_content: message.html,
        };

        let resp = self
            .client
            .post(&self.settings.api_url)
            .header("api-key", &self.settings.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let error_body = resp.text().await.unwrap_or_default();
            return Err(NotifyError::from_status(status, error_body));
        }

        info!(id = %listing.id, "Email sent");
        Ok(())
    }

    fn channel_name(&self) -> &'static str {
        "email"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Price;
    use chrono::TimeZone;

    fn listing(price: Price) -> ListingRecord {
        ListingRecord {
            id: "5712345".to_string(),
            price,
            address: "Rathmines Road, Dublin 6".to_string(),
            title: "Double room".to_string(),
            link: "https://www.daft.ie/share/rathmines/5712345".to_string(),
            bedrooms: Some("1 Bed".to_string()),
            property_type: None,
            availability: None,
        }
    }

    fn sent_at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 2, 9, 10, 30, 0).unwrap()
    }

    #[test]
    fn subject_carries_price_and_address() {
        let message = compose(&listing(Price::Amount(1200)), sent_at());
        assert_eq!(message.subject, "🏠 New Room: €1200 - Rathmines Road, Dublin 6");
    }

    #[test]
    fn unknown_price_renders() {
        let message = compose(&listing(Price::Unknown), sent_at());
        assert!(message.subject.contains("€N/A"));
        assert!(message.html.contains("€N/A/month"));
    }

    #[test]
    fn body_lists_details_and_skips_missing_ones() {
        let message = compose(&listing(Price::Amount(1200)), sent_at());

        assert!(message.html.contains("Available now"));
        assert!(message.html.contains("1 Bed"));
        assert!(!message.html.contains("Property Type"));
        assert!(message.html.contains(r#"href="https://www.daft.ie/share/rathmines/5712345""#));
        assert!(message.html.contains("Listing ID: 5712345"));
        assert!(message.html.contains("Sent: 2025-02-09 10:30:00"));
    }

    #[test]
    fn listing_text_is_escaped() {
        let mut record = listing(Price::Amount(1200));
        record.address = "<script>alert(1)</script>".to_string();

        let message = compose(&record, sent_at());

        assert!(!message.html.contains("<script>"));
        assert!(message.html.contains("&lt;script&gt;"));
    }
}
