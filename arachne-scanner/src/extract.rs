//! Title and anchor extraction over a parsed HTML document.

use crate::error::{Result, ScanError};
use crate::result::ParsedPage;
use scraper::{Html, Selector};
use std::collections::HashSet;

/// Parses a fetched body and runs both extractors over it.
///
/// `html5ever` recovers from any malformed markup, so the only body rejected
/// here is one with no content at all.
pub fn parse_page(url: &str, body: &str) -> Result<ParsedPage> {
    if body.trim().is_empty() {
        return Err(ScanError::Parse {
            url: url.to_string(),
            reason: "empty document".to_string(),
        });
    }

    let document = Html::parse_document(body);

    Ok(ParsedPage {
        title: extract_title(&document),
        links: extract_links(&document),
    })
}

/// Returns the text of the first `<title>` in document order, verbatim.
///
/// Later or deeper title elements are ignored. A title without a text child
/// yields an empty string.
pub fn extract_title(document: &Html) -> String {
    let Ok(selector) = Selector::parse("title") else {
        return String::new();
    };

    document
        .select(&selector)
        .next()
        .and_then(|title| title.first_child())
        .and_then(|child| child.value().as_text().map(|text| String::from(&**text)))
        .unwrap_or_default()
}

/// Returns the raw `href` of every anchor, first occurrence wins.
pub fn extract_links(document: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&selector) {
        if let Some(href) = element.value().attr("href")
            && seen.insert(href)
        {
            links.push(href.to_string());
        }
    }

    links
}
