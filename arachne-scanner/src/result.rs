use serde::{Deserialize, Serialize};

/// One visited page as reported by a listing: its title and its URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageEntry {
    pub page_title: String,
    pub page_url: String,
}

impl PageEntry {
    pub fn new(page_title: impl Into<String>, page_url: impl Into<String>) -> Self {
        Self {
            page_title: page_title.into(),
            page_url: page_url.into(),
        }
    }
}

/// What a page yielded once fetched and parsed.
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    pub title: String,
    pub links: Vec<String>,
}

/// Summary returned when a traversal ends, either naturally or by cancellation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    pub pages_visited: usize,
    pub failures: usize,
    pub cancelled: bool,
}
