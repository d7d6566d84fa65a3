use serde::{Deserialize, Serialize};
use url::Url;

/// Search parameters handed to every fetch strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchParams {
    /// Location tag, e.g. `dublin-city`
    pub location: String,
    /// Site section, e.g. `sharing` or `property-for-rent`
    pub category: String,
    /// Minimum monthly rent (EUR)
    pub min_price: i64,
    /// Maximum monthly rent (EUR)
    pub max_price: i64,
}

impl SearchParams {
    /// Public search page for these parameters under `base_url`.
    pub fn search_url(&self, base_url: &Url) -> Result<Url, url::ParseError> {
        let mut url = base_url.join(&format!("/{}/{}", self.category, self.location))?;
        url.query_pairs_mut()
            .append_pair("rentalPrice_from", &self.min_price.to_string())
            .append_pair("rentalPrice_to", &self.max_price.to_string());
        Ok(url)
    }
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            location: "dublin-city".to_string(),
            category: "sharing".to_string(),
            min_price: 1000,
            max_price: 1700,
        }
    }
}
