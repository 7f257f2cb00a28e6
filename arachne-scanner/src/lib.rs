pub mod crawler;
pub mod error;
pub mod extract;
pub mod fetcher;
pub mod result;
pub mod state;

pub use crawler::{Crawler, LinkPolicy, resolve_link};
pub use error::ScanError;
pub use extract::{extract_links, extract_title, parse_page};
pub use fetcher::{FetchOptions, HttpFetcher, PageFetcher};
pub use result::{CrawlSummary, PageEntry, ParsedPage};
pub use state::{CrawlPhase, CrawlState};
