//! Field-level normalization shared by every payload mapper.
//!
//! Mappers reduce their source shape to a [`RawListing`] of loose text fields;
//! [`normalize`] turns that into a [`ListingRecord`] or explains why it can't.

use crate::models::{ListingRecord, Price};
use std::collections::HashSet;
use url::Url;

/// Loosely-typed fields as found in one source entry
#[derive(Debug, Clone, Default)]
pub struct RawListing {
    pub explicit_id: Option<String>,
    pub href: Option<String>,
    pub title: Option<String>,
    pub address: Option<String>,
    pub price_text: Option<String>,
    pub bedrooms: Option<String>,
    pub property_type: Option<String>,
    pub availability: Option<String>,
}

const ADDRESS_UNAVAILABLE: &str = "Address not available";

/// First run of digits once thousands separators are removed.
/// A run too long for `i64` saturates; only a text without digits is unknown.
pub fn parse_price(text: &str) -> Price {
    let stripped: String = text.chars().filter(|c| *c != ',').collect();

    let digits: String = stripped
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();

    if digits.is_empty() {
        return Price::Unknown;
    }

    Price::Amount(digits.parse::<i64>().unwrap_or(i64::MAX))
}

/// Trailing numeric path segment of the link, or the whole link when there is none.
pub fn listing_id_from_url(link: &Url) -> String {
    let trailing = link
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last());

    match trailing {
        Some(segment) if segment.chars().all(|c| c.is_ascii_digit()) => segment.to_string(),
        _ => link.to_string(),
    }
}

/// Resolve a possibly relative href against the source's base URL.
pub fn resolve_link(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let url = base.join(href).ok()?;
    matches!(url.scheme(), "http" | "https").then_some(url)
}

/// Collapse runs of whitespace; `None` when nothing is left.
pub fn clean_text(text: &str) -> Option<String> {
    let cleaned = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!cleaned.is_empty()).then_some(cleaned)
}

pub fn normalize(raw: RawListing, base: &Url) -> Result<ListingRecord, String> {
    let href = raw.href.ok_or_else(|| "missing link".to_string())?;
    let link = resolve_link(base, &href).ok_or_else(|| format!("unresolvable link '{}'", href))?;

    let id = raw
        .explicit_id
        .and_then(|id| clean_text(&id))
        .unwrap_or_else(|| listing_id_from_url(&link));

    let title = raw.title.and_then(|t| clean_text(&t));
    let address = raw
        .address
        .and_then(|a| clean_text(&a))
        .or_else(|| title.clone())
        .unwrap_or_else(|| ADDRESS_UNAVAILABLE.to_string());
    let title = title.unwrap_or_else(|| address.clone());

    let price = raw
        .price_text
        .map(|text| parse_price(&text))
        .unwrap_or(Price::Unknown);

    Ok(ListingRecord {
        id,
        price,
        address,
        title,
        link: link.to_string(),
        bedrooms: raw.bedrooms.and_then(|b| clean_text(&b)),
        property_type: raw.property_type.and_then(|p| clean_text(&p)),
        availability: raw.availability.and_then(|a| clean_text(&a)),
    })
}

/// Keep the first record for each id, preserving source order.
pub fn collapse_duplicates(records: Vec<ListingRecord>) -> (Vec<ListingRecord>, usize) {
    let mut seen = HashSet::new();
    let before = records.len();

    let unique: Vec<ListingRecord> = records
        .into_iter()
        .filter(|record| seen.insert(record.id.clone()))
        .collect();

    let dropped = before - unique.len();
    (unique, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://www.daft.ie").unwrap()
    }

    #[test]
    fn price_strips_thousands_separator() {
        assert_eq!(parse_price("€1,200 per month"), Price::Amount(1200));
        assert_eq!(parse_price("From €950"), Price::Amount(950));
    }

    #[test]
    fn price_takes_first_digit_run_only() {
        assert_eq!(parse_price("€1,450 per month (2 rooms)"), Price::Amount(1450));
    }

    #[test]
    fn price_without_digits_is_unknown() {
        assert_eq!(parse_price("Price on application"), Price::Unknown);
        assert_eq!(parse_price(""), Price::Unknown);
    }

    #[test]
    fn oversized_price_saturates_instead_of_becoming_unknown() {
        let price = parse_price("€99999999999999999999 per month");

        assert_eq!(price, Price::Amount(i64::MAX));
        assert!(!crate::models::PriceWindow::new(1000, 1700)
            .unwrap()
            .admits(&price));
    }

    #[test]
    fn id_is_trailing_numeric_segment() {
        let link = Url::parse("https://www.daft.ie/share/room-rathmines-dublin-6/5712345").unwrap();
        assert_eq!(listing_id_from_url(&link), "5712345");

        let with_slash = Url::parse("https://www.daft.ie/share/room/5712345/?ref=x").unwrap();
        assert_eq!(listing_id_from_url(&with_slash), "5712345");
    }

    #[test]
    fn id_falls_back_to_full_url() {
        let link = Url::parse("https://www.daft.ie/share/room-rathmines").unwrap();
        assert_eq!(listing_id_from_url(&link), "https://www.daft.ie/share/room-rathmines");
    }

    #[test]
    fn relative_links_resolve_against_base() {
        let link = resolve_link(&base(), "/share/room-x/42").unwrap();
        assert_eq!(link.as_str(), "https://www.daft.ie/share/room-x/42");

        let absolute = resolve_link(&base(), "https://other.example/a/1").unwrap();
        assert_eq!(absolute.as_str(), "https://other.example/a/1");
    }

    #[test]
    fn non_http_links_are_rejected() {
        assert!(resolve_link(&base(), "javascript:void(0)").is_none());
        assert!(resolve_link(&base(), "   ").is_none());
    }

    #[test]
    fn address_falls_back_to_title() {
        let raw = RawListing {
            href: Some("/share/x/7".to_string()),
            title: Some("  Double room,\n Rathmines ".to_string()),
            ..Default::default()
        };

        let record = normalize(raw, &base()).unwrap();

        assert_eq!(record.id, "7");
        assert_eq!(record.address, "Double room, Rathmines");
        assert_eq!(record.title, record.address);
        assert_eq!(record.price, Price::Unknown);
    }

    #[test]
    fn explicit_id_wins_over_link() {
        let raw = RawListing {
            explicit_id: Some("998".to_string()),
            href: Some("/share/x/7".to_string()),
            ..Default::default()
        };

        assert_eq!(normalize(raw, &base()).unwrap().id, "998");
    }

    #[test]
    fn missing_link_is_malformed() {
        let raw = RawListing {
            title: Some("No link here".to_string()),
            ..Default::default()
        };

        assert!(normalize(raw, &base()).is_err());
    }

    #[test]
    fn duplicates_collapse_to_first_occurrence() {
        let make = |id: &str, title: &str| ListingRecord {
            id: id.to_string(),
            price: Price::Unknown,
            address: title.to_string(),
            title: title.to_string(),
            link: format!("https://www.daft.ie/share/{}", id),
            bedrooms: None,
            property_type: None,
            availability: None,
        };

        let (unique, dropped) =
            collapse_duplicates(vec![make("1", "first"), make("2", "b"), make("1", "second")]);

        assert_eq!(dropped, 1);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].title, "first");
        assert_eq!(unique[1].id, "2");
    }
}
