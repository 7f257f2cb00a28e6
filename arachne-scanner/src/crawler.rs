use crate::error::{Result, ScanError};
use crate::extract::parse_page;
use crate::fetcher::PageFetcher;
use crate::result::CrawlSummary;
use crate::state::CrawlState;
use std::sync::Arc;
use std::vec::IntoIter;
use tracing::{debug, info, trace, warn};
use url::Url;

/// How raw `href` values are turned into candidate URLs before the
/// same-site prefix check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LinkPolicy {
    /// Join against the page the link was found on and drop the fragment.
    #[default]
    Resolve,
    /// Compare the `href` exactly as written; relative links never match.
    Raw,
}

/// Outgoing links of one visited page, consumed in extraction order.
struct LinkCursor {
    page_url: String,
    links: IntoIter<String>,
}

impl LinkCursor {
    fn next_link(&mut self, policy: LinkPolicy) -> Option<String> {
        for href in self.links.by_ref() {
            match resolve_link(&self.page_url, &href, policy) {
                Ok(link) => return Some(link),
                Err(e) => debug!("Skipping link on {}: {}", self.page_url, e),
            }
        }
        None
    }
}

pub struct Crawler<F> {
    fetcher: Arc<F>,
    link_policy: LinkPolicy,
}

impl<F> Clone for Crawler<F> {
    fn clone(&self) -> Self {
        Self {
            fetcher: self.fetcher.clone(),
            link_policy: self.link_policy,
        }
    }
}

impl<F: PageFetcher> Crawler<F> {
    pub fn new(fetcher: Arc<F>) -> Self {
        Self {
            fetcher,
            link_policy: LinkPolicy::default(),
        }
    }

    pub fn with_link_policy(mut self, policy: LinkPolicy) -> Self {
        self.link_policy = policy;
        self
    }

    /// Crawls the state's root, restricted to URLs prefixed by that root.
    ///
    /// Under `LinkPolicy::Resolve` the root is first put in the same
    /// serialized form as resolved links (lowercase host, `/` path), so a
    /// link back to the home page matches the root's visited key.
    pub async fn crawl(&self, state: &CrawlState) -> CrawlSummary {
        let root = self.root_key(state.root());
        self.traverse(state, &root, &root).await
    }

    fn root_key(&self, root: &str) -> String {
        match resolve_link(root, root, self.link_policy) {
            Ok(key) => key,
            Err(e) => {
                debug!("Keeping root {} as given: {}", root, e);
                root.to_string()
            }
        }
    }

    /// Depth-first walk from `url` over every link that starts with
    /// `base_url` and is not yet visited.
    ///
    /// Pages are visited in the order a recursive pre-order walk would visit
    /// them: a link is only checked against the visited map once the
    /// subtrees of its earlier siblings are done. Cancellation is checked
    /// before every fetch and before every link; an in-flight fetch is
    /// allowed to finish and its page is still recorded.
    pub async fn traverse(&self, state: &CrawlState, url: &str, base_url: &str) -> CrawlSummary {
        info!("Starting crawl of {} (links must start with {})", url, base_url);

        let mut summary = CrawlSummary::default();
        let mut stack: Vec<LinkCursor> = Vec::new();

        if let Some(cursor) = self.visit(state, url, &mut summary).await {
            stack.push(cursor);
        }

        while !stack.is_empty() {
            if state.is_cancelled() {
                debug!("Cancellation observed with {} pages open", stack.len());
                break;
            }

            let Some(cursor) = stack.last_mut() else {
                break;
            };
            let Some(link) = cursor.next_link(self.link_policy) else {
                stack.pop();
                continue;
            };

            if !link.starts_with(base_url) {
                trace!("Off-site link skipped: {}", link);
                continue;
            }

            if state.is_visited(&link).await {
                continue;
            }

            if let Some(cursor) = self.visit(state, &link, &mut summary).await {
                stack.push(cursor);
            }
        }

        summary.cancelled = state.is_cancelled();
        state.finish();

        info!(
            "Crawl of {} {}. Visited {} pages, {} failures",
            url,
            if summary.cancelled { "cancelled" } else { "complete" },
            summary.pages_visited,
            summary.failures
        );

        summary
    }

    /// Fetches, parses and records one page. Returns its links, or `None`
    /// when cancelled or when the page failed.
    async fn visit(
        &self,
        state: &CrawlState,
        url: &str,
        summary: &mut CrawlSummary,
    ) -> Option<LinkCursor> {
        if state.is_cancelled() {
            return None;
        }

        let parsed = self
            .fetcher
            .fetch(url)
            .await
            .and_then(|body| parse_page(url, &body));

        let page = match parsed {
            Ok(page) => page,
            Err(e) => {
                warn!("Crawl error for {}: {}", url, e);
                state.record_failure();
                summary.failures += 1;
                return None;
            }
        };

        debug!(
            "Visited {} ({:?}, {} links)",
            url,
            page.title,
            page.links.len()
        );

        if state.mark_visited(url, page.title).await {
            summary.pages_visited += 1;
        }

        Some(LinkCursor {
            page_url: url.to_string(),
            links: page.links.into_iter(),
        })
    }
}

/// Turns an `href` found on `page_url` into the string compared against the
/// crawl root.
pub fn resolve_link(page_url: &str, href: &str, policy: LinkPolicy) -> Result<String> {
    match policy {
        LinkPolicy::Raw => Ok(href.to_string()),
        LinkPolicy::Resolve => {
            let base = Url::parse(page_url)
                .map_err(|e| ScanError::InvalidUrl(format!("{}: {}", page_url, e)))?;
            let mut joined = base.join(href).map_err(|source| ScanError::Join {
                href: href.to_string(),
                source,
            })?;
            joined.set_fragment(None);
            Ok(joined.into())
        }
    }
}
