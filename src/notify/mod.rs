pub mod email;
pub mod webhook;

use crate::config::NotifierSettings;
use crate::error::NotifyError;
use crate::models::ListingRecord;
use async_trait::async_trait;
use std::time::Duration;

pub use email::{EmailNotifier, EmailSettings};
pub use webhook::WebhookNotifier;

/// Delivery channel for new-listing alerts.
/// `Ok` means the channel confirmed the message; anything else leaves the listing unseen.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, listing: &ListingRecord) -> Result<(), NotifyError>;

    fn channel_name(&self) -> &'static str;
}

/// Instantiate the notification channel selected by configuration.
pub fn build_notifier(
    settings: &NotifierSettings,
    timeout: Duration,
) -> Result<Box<dyn Notifier>, NotifyError> {
    let notifier: Box<dyn Notifier> = match settings {
        NotifierSettings::Email(email) => Box::new(EmailNotifier::new(email.clone(), timeout)?),
        NotifierSettings::Webhook { url } => Box::new(WebhookNotifier::new(url.clone(), timeout)?),
    };
    Ok(notifier)
}
