use crate::protocol::{StartResponse, StatusResponse, StopResponse};
use crate::url::{UrlError, normalize_url};
use arachne_scanner::{
    CrawlState, CrawlSummary, Crawler, FetchOptions, HttpFetcher, LinkPolicy, PageEntry,
    PageFetcher, ScanError,
};
use futures::stream::{self, Iter};
use std::sync::Arc;
use std::vec::IntoIter;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::info;

#[derive(Error, Debug)]
pub enum ControlError {
    #[error("Invalid start URL: {0}")]
    InvalidUrl(#[from] UrlError),

    #[error("Failed to build page fetcher: {0}")]
    Fetcher(#[from] ScanError),
}

/// Options for configuring the crawls a control plane launches
#[derive(Debug, Clone, Default)]
pub struct CrawlOptions {
    pub fetch: FetchOptions,
    pub link_policy: LinkPolicy,
}

/// Lazy listing of visited pages, taken from a snapshot.
pub type PageStream = Iter<IntoIter<PageEntry>>;

/// A crawl that `start` launched in the background.
pub struct StartedCrawl {
    pub state: Arc<CrawlState>,
    pub handle: JoinHandle<CrawlSummary>,
}

impl StartedCrawl {
    pub fn root(&self) -> &str {
        self.state.root()
    }

    pub fn response(&self) -> StartResponse {
        StartResponse {
            message: format!("Web crawler started...\n root = {}", self.root()),
        }
    }
}

/// Owns the current crawl and serves Start, Stop, List and Status.
///
/// Only the most recently started crawl is addressable. Starting another one
/// replaces it without cancelling it; the old traversal keeps running until it
/// finishes on its own.
pub struct ControlPlane<F> {
    crawler: Crawler<F>,
    current: RwLock<Option<Arc<CrawlState>>>,
}

impl ControlPlane<HttpFetcher> {
    pub fn from_options(options: &CrawlOptions) -> Result<Self, ControlError> {
        let fetcher = HttpFetcher::new(&options.fetch)?;
        let crawler = Crawler::new(Arc::new(fetcher)).with_link_policy(options.link_policy);
        Ok(Self::new(crawler))
    }
}

impl<F: PageFetcher> ControlPlane<F> {
    pub fn new(crawler: Crawler<F>) -> Self {
        Self {
            crawler,
            current: RwLock::new(None),
        }
    }

    /// Validates `start_url`, installs a fresh crawl state and spawns its
    /// traversal. Returns as soon as the task is spawned.
    pub async fn start(&self, start_url: &str) -> Result<StartedCrawl, ControlError> {
        let root = normalize_url(start_url)?;
        let state = Arc::new(CrawlState::new(root));

        let previous = self.current.write().await.replace(state.clone());
        if let Some(previous) = previous {
            info!(
                "Replacing crawl of {} ({}) with {}",
                previous.root(),
                previous.phase(),
                state.root()
            );
        }

        let handle = {
            let crawler = self.crawler.clone();
            let state = state.clone();
            tokio::spawn(async move { crawler.crawl(&state).await })
        };

        info!("Web crawler started at {}", state.root());
        Ok(StartedCrawl { state, handle })
    }

    /// Requests cancellation of the current crawl. `stop_url` is echoed back
    /// and is not compared with the root.
    pub async fn stop(&self, stop_url: &str) -> StopResponse {
        let Some(state) = self.current().await else {
            info!("Stop requested for {} with no crawl in progress", stop_url);
            return StopResponse {
                message: format!("No crawl in progress...\n url = {}", stop_url),
            };
        };

        if state.cancel() {
            info!("Web crawler for {} stopped", state.root());
        } else {
            info!("Web crawler for {} already {}", state.root(), state.phase());
        }

        StopResponse {
            message: format!("Web crawler stopped...\n url = {}", stop_url),
        }
    }

    /// Every visited page of the current crawl, in map order.
    pub async fn list(&self) -> PageStream {
        stream::iter(self.entries().await)
    }

    pub async fn entries(&self) -> Vec<PageEntry> {
        match self.current().await {
            Some(state) => state.snapshot().await,
            None => Vec::new(),
        }
    }

    pub async fn status(&self) -> StatusResponse {
        let Some(state) = self.current().await else {
            return StatusResponse::idle();
        };

        StatusResponse {
            root: Some(state.root().to_string()),
            phase: state.phase(),
            visited: state.visited_count().await,
            failures: state.failures(),
            started_at: Some(state.started_at()),
        }
    }

    /// The crawl state that Stop and List currently address.
    pub async fn current(&self) -> Option<Arc<CrawlState>> {
        self.current.read().await.clone()
    }
}
