use crate::extract::normalize::RawListing;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// Entries found in a results page, plus whether the page says there are none.
pub struct HtmlBatch {
    pub entries: Vec<RawListing>,
    pub reports_empty: bool,
}

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("static selector must parse")
}

fn text_of(card: &ElementRef, css: &'static str) -> Option<String> {
    card.select(&selector(css))
        .next()
        .map(|el| el.text().collect::<Vec<_>>().join(" "))
}

fn card_to_raw(card: &ElementRef) -> RawListing {
    let href = card
        .select(&selector("a[href]"))
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(str::to_string);

    let title = text_of(card, "[data-testid='title']")
        .or_else(|| text_of(card, "h2"))
        .or_else(|| text_of(card, "h3"));

    RawListing {
        explicit_id: card.value().attr("data-listing-id").map(str::to_string),
        href,
        title,
        address: text_of(card, "[data-testid='address']"),
        price_text: text_of(card, "[data-testid='price']"),
        bedrooms: text_of(card, "[data-testid='beds']"),
        property_type: text_of(card, "[data-testid='property-type']"),
        availability: text_of(card, "[data-testid='available-from']"),
    }
}

/// Map a search results page to raw entries in page order.
pub fn parse_cards(body: &str) -> HtmlBatch {
    let document = Html::parse_document(body);

    let results_list = selector("ul[data-testid='results']");
    let list_cards = selector("ul[data-testid='results'] > li");
    let result_cards = selector("[data-testid='result']");

    let mut cards: Vec<ElementRef> = document.select(&list_cards).collect();
    if cards.is_empty() {
        cards = document.select(&result_cards).collect();
    }
    debug!(cards = cards.len(), "Found listing cards");

    let reports_empty = cards.is_empty()
        && (document.select(&selector("[data-testid='no-results']")).next().is_some()
            || document.select(&results_list).next().is_some());

    HtmlBatch {
        entries: cards.iter().map(card_to_raw).collect(),
        reports_empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
        <ul data-testid="results">
          <li>
            <a href="/share/double-room-rathmines-dublin-6/5712345">
              <h2 data-testid="title">Double room in Rathmines</h2>
              <p data-testid="address">Rathmines Road, Dublin 6</p>
              <div data-testid="price">€1,200 per month</div>
              <span data-testid="beds">1 Bed</span>
              <span data-testid="property-type">House</span>
            </a>
          </li>
          <li><div data-testid="price">€900 per month</div></li>
          <li>
            <a href="https://www.daft.ie/share/room-d8/5799999"><h3>Room, Dublin 8</h3></a>
          </li>
        </ul>
        </body></html>
    "#;

    #[test]
    fn maps_cards_in_page_order() {
        let batch = parse_cards(PAGE);

        assert_eq!(batch.entries.len(), 3);
        assert!(!batch.reports_empty);

        let first = &batch.entries[0];
        assert_eq!(
            first.href.as_deref(),
            Some("/share/double-room-rathmines-dublin-6/5712345")
        );
        assert_eq!(first.title.as_deref(), Some("Double room in Rathmines"));
        assert_eq!(first.address.as_deref(), Some("Rathmines Road, Dublin 6"));
        assert_eq!(first.price_text.as_deref(), Some("€1,200 per month"));
        assert_eq!(first.bedrooms.as_deref(), Some("1 Bed"));

        assert!(batch.entries[1].href.is_none());

        let third = &batch.entries[2];
        assert_eq!(third.title.as_deref(), Some("Room, Dublin 8"));
        assert!(third.address.is_none());
    }

    #[test]
    fn falls_back_to_result_testid() {
        let page = r#"<div><div data-testid="result"><a href="/share/a/1">A</a></div></div>"#;
        let batch = parse_cards(page);
        assert_eq!(batch.entries.len(), 1);
    }

    #[test]
    fn empty_results_list_is_an_explicit_empty() {
        let batch = parse_cards(r#"<ul data-testid="results"></ul>"#);
        assert!(batch.entries.is_empty());
        assert!(batch.reports_empty);

        let batch = parse_cards(r#"<div data-testid="no-results">No results</div>"#);
        assert!(batch.reports_empty);
    }

    #[test]
    fn unknown_markup_is_not_an_explicit_empty() {
        let batch = parse_cards("<html><body><p>Something changed</p></body></html>");
        assert!(batch.entries.is_empty());
        assert!(!batch.reports_empty);
    }
}
