use serde::{Deserialize, Serialize};
use std::fmt;

/// Monthly rent as advertised, or unknown when the source text carries no digits
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Price {
    Amount(i64),
    Unknown,
}

impl Price {
    pub fn amount(&self) -> Option<i64> {
        match self {
            Price::Amount(value) => Some(*value),
            Price::Unknown => None,
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Price::Amount(value) => write!(f, "{}", value),
            Price::Unknown => write!(f, "N/A"),
        }
    }
}

/// Inclusive rent range a listing must fall into to be notified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceWindow {
    min: i64,
    max: i64,
}

impl PriceWindow {
    pub fn new(min: i64, max: i64) -> Option<Self> {
        (min <= max).then_some(Self { min, max })
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    /// An unknown price is never grounds for exclusion.
    pub fn admits(&self, price: &Price) -> bool {
        match price {
            Price::Amount(value) => (self.min..=self.max).contains(value),
            Price::Unknown => true,
        }
    }
}

/// Canonical listing produced by the extractor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListingRecord {
    pub id: String,
    pub price: Price,
    pub address: String,
    pub title: String,
    /// Always absolute
    pub link: String,
    pub bedrooms: Option<String>,
    pub property_type: Option<String>,
    pub availability: Option<String>,
}

impl ListingRecord {
    pub fn availability_or_default(&self) -> &str {
        self.availability.as_deref().unwrap_or("Available now")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_bounds_are_inclusive() {
        let window = PriceWindow::new(1000, 1700).unwrap();

        assert!(window.admits(&Price::Amount(1000)));
        assert!(window.admits(&Price::Amount(1700)));
        assert!(!window.admits(&Price::Amount(999)));
        assert!(!window.admits(&Price::Amount(1701)));
    }

    #[test]
    fn unknown_price_is_admitted() {
        let window = PriceWindow::new(1000, 1700).unwrap();
        assert!(window.admits(&Price::Unknown));
    }

    #[test]
    fn inverted_window_is_rejected() {
        assert!(PriceWindow::new(1700, 1000).is_none());
        assert!(PriceWindow::new(1200, 1200).is_some());
    }

    #[test]
    fn unknown_price_formats_without_panicking() {
        assert_eq!(Price::Unknown.to_string(), "N/A");
        assert_eq!(Price::Amount(1450).to_string(), "1450");
    }
}
