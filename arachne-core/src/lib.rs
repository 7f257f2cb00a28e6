pub mod control;
pub mod protocol;
pub mod report;
pub mod url;

pub use control::{ControlError, ControlPlane, CrawlOptions, PageStream, StartedCrawl};
pub use report::ReportFormat;
pub use crate::url::{UrlError, normalize_url};
