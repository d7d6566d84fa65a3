use crate::extract::normalize::RawListing;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    #[serde(default)]
    listings: Option<Vec<Value>>,
    #[serde(default)]
    paging: Option<Paging>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Paging {
    total_results: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiListing {
    id: Option<Value>,
    title: Option<String>,
    seo_friendly_path: Option<String>,
    price: Option<Value>,
    num_bedrooms: Option<Value>,
    property_type: Option<String>,
    #[serde(default)]
    available_from: Option<String>,
}

/// Entries found in an API response. Entries that don't fit the
/// listing shape come back as `Err` with a reason.
pub struct JsonBatch {
    pub entries: Vec<Result<RawListing, String>>,
    pub reports_empty: bool,
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn entry_to_raw(entry: Value) -> Result<RawListing, String> {
    let listing = match entry {
        Value::Object(mut map) => map
            .remove("listing")
            .ok_or_else(|| "entry has no 'listing' object".to_string())?,
        other => return Err(format!("entry is not an object: {}", other)),
    };

    let listing: ApiListing =
        serde_json::from_value(listing).map_err(|e| format!("unexpected listing shape: {}", e))?;

    Ok(RawListing {
        explicit_id: listing.id.as_ref().and_then(scalar_text),
        href: listing.seo_friendly_path,
        title: listing.title,
        address: None,
        price_text: listing.price.as_ref().and_then(scalar_text),
        bedrooms: listing.num_bedrooms.as_ref().and_then(scalar_text),
        property_type: listing.property_type,
        availability: listing.available_from,
    })
}

/// Map a listings API response to raw entries in response order.
pub fn parse_listings(body: &str) -> Result<JsonBatch, String> {
    let response: SearchResponse =
        serde_json::from_str(body).map_err(|e| format!("invalid listings JSON: {}", e))?;

    let total = response.paging.and_then(|p| p.total_results);
    let reports_empty = match (&response.listings, total) {
        (_, Some(0)) => true,
        (Some(listings), None) => listings.is_empty(),
        _ => false,
    };

    Ok(JsonBatch {
        entries: response
            .listings
            .unwrap_or_default()
            .into_iter()
            .map(entry_to_raw)
            .collect(),
        reports_empty,
    })
}
