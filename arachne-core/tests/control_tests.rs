// Tests for the crawl control plane

use arachne_core::control::{ControlError, ControlPlane, CrawlOptions};
use arachne_core::url::UrlError;
use arachne_scanner::{CrawlPhase, Crawler, PageEntry, PageFetcher, ScanError};
use futures::StreamExt;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

/// In-memory site with an optional per-fetch delay.
#[derive(Default)]
struct FakeSite {
    pages: HashMap<String, String>,
    delay: Option<Duration>,
}

impl FakeSite {
    fn page(mut self, url: &str, title: &str, links: &[&str]) -> Self {
        let anchors: String = links
            .iter()
            .map(|href| format!(r#"<a href="{}">x</a>"#, href))
            .collect();
        self.pages.insert(
            url.to_string(),
            format!("<html><head><title>{}</title></head><body>{}</body></html>", title, anchors),
        );
        self
    }

    /// A chain of `len` pages starting at `{base}/`, each linking to the next.
    fn chain(base: &str, len: usize, delay: Duration) -> Self {
        let mut site = FakeSite {
            delay: Some(delay),
            ..FakeSite::default()
        };
        for i in 0..len {
            let url = if i == 0 {
                format!("{}/", base)
            } else {
                format!("{}/{}", base, i)
            };
            let next = format!("{}/{}", base, i + 1);
            site = site.page(&url, &format!("Page {}", i), &[next.as_str()]);
        }
        site
    }
}

impl PageFetcher for FakeSite {
    async fn fetch(&self, url: &str) -> Result<String, ScanError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.pages.get(url).cloned().ok_or_else(|| ScanError::HttpStatus {
            url: url.to_string(),
            status: 404,
        })
    }
}

fn control(site: FakeSite) -> ControlPlane<FakeSite> {
    ControlPlane::new(Crawler::new(Arc::new(site)))
}

async fn listed(plane: &ControlPlane<FakeSite>) -> Vec<PageEntry> {
    plane.list().await.collect().await
}

// ============================================================================
// Start Tests
// ============================================================================

#[tokio::test]
async fn test_start_acknowledges_normalized_root() {
    let plane = control(
        FakeSite::default()
            .page("https://test.local/", "Home", &["/", "/a"])
            .page("https://test.local/a", "A", &["/"]),
    );

    let started = plane.start("test.local").await.unwrap();

    assert_eq!(started.root(), "https://test.local");
    assert_eq!(
        started.response().message,
        "Web crawler started...\n root = https://test.local"
    );

    let summary = started.handle.await.unwrap();
    assert_eq!(summary.pages_visited, 2);

    // The home page is listed once, under the same key as links back to `/`.
    let mut entries = listed(&plane).await;
    entries.sort_by(|a, b| a.page_url.cmp(&b.page_url));
    assert_eq!(
        entries,
        vec![
            PageEntry::new("Home", "https://test.local/"),
            PageEntry::new("A", "https://test.local/a"),
        ]
    );
}

#[tokio::test]
async fn test_start_rejects_invalid_url() {
    let plane = control(FakeSite::default());

    let err = plane.start("not a url").await.err().unwrap();

    assert!(matches!(
        err,
        ControlError::InvalidUrl(UrlError::Whitespace(_))
    ));
    assert!(plane.current().await.is_none());
}

#[tokio::test]
async fn test_same_site_crawl_end_to_end() {
    let plane = control(
        FakeSite::default()
            .page(
                "http://test.local/",
                "Home",
                &["http://test.local/a", "http://other.com/b"],
            )
            .page("http://test.local/a", "A", &[])
            .page("http://other.com/b", "Other", &[]),
    );

    let started = plane.start("http://test.local/").await.unwrap();
    let summary = started.handle.await.unwrap();

    assert_eq!(summary.pages_visited, 2);
    let urls: HashSet<String> = listed(&plane)
        .await
        .into_iter()
        .map(|e| e.page_url)
        .collect();
    assert_eq!(
        urls,
        HashSet::from([
            "http://test.local/".to_string(),
            "http://test.local/a".to_string()
        ])
    );

    let status = plane.status().await;
    assert_eq!(status.phase, CrawlPhase::Finished);
    assert_eq!(status.visited, 2);
    assert_eq!(status.root.as_deref(), Some("http://test.local/"));
}

// ============================================================================
// Stop Tests
// ============================================================================

#[tokio::test]
async fn test_stop_without_crawl() {
    let plane = control(FakeSite::default());

    let response = plane.stop("https://example.com").await;

    assert_eq!(
        response.message,
        "No crawl in progress...\n url = https://example.com"
    );
}

#[tokio::test]
async fn test_start_then_stop() {
    let plane = control(FakeSite::chain(
        "http://test.local",
        200,
        Duration::from_millis(5),
    ));

    let started = plane.start("http://test.local/").await.unwrap();
    tokio::time::sleep(Duration::from_millis(30)).await;

    let response = plane.stop("http://anything.else").await;
    assert_eq!(
        response.message,
        "Web crawler stopped...\n url = http://anything.else"
    );
    assert!(started.state.is_cancelled());

    let summary = started.handle.await.unwrap();
    assert!(summary.cancelled);
    assert!(summary.pages_visited < 200);

    // Nothing is added once the traversal has returned.
    let after_stop = listed(&plane).await.len();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(listed(&plane).await.len(), after_stop);
    assert_eq!(plane.status().await.phase, CrawlPhase::Finished);
}

#[tokio::test]
async fn test_stop_is_idempotent() {
    let plane = control(FakeSite::chain(
        "http://test.local",
        50,
        Duration::from_millis(5),
    ));
    let started = plane.start("http://test.local/").await.unwrap();

    plane.stop("http://test.local/").await;
    plane.stop("http://test.local/").await;

    assert!(started.state.is_cancelled());
    assert!(started.handle.await.unwrap().cancelled);
}

// ============================================================================
// List Tests
// ============================================================================

#[tokio::test]
async fn test_list_before_start_is_empty() {
    let plane = control(FakeSite::default());
    assert!(listed(&plane).await.is_empty());
    assert_eq!(plane.status().await.phase, CrawlPhase::Idle);
}

#[tokio::test]
async fn test_list_while_crawling() {
    let plane = control(FakeSite::chain(
        "http://test.local",
        30,
        Duration::from_millis(2),
    ));
    let started = plane.start("http://test.local/").await.unwrap();

    let mut previous = 0;
    while !started.handle.is_finished() {
        let entries = listed(&plane).await;
        let unique: HashSet<_> = entries.iter().map(|e| e.page_url.as_str()).collect();
        assert_eq!(unique.len(), entries.len());
        // Append-only: a later listing never shrinks.
        assert!(entries.len() >= previous);
        previous = entries.len();
        tokio::time::sleep(Duration::from_millis(3)).await;
    }

    // The chain's last link points at a page that does not exist.
    let summary = started.handle.await.unwrap();
    assert_eq!(summary.failures, 1);
}

#[tokio::test]
async fn test_new_start_supersedes_previous_crawl() {
    let plane = control(
        FakeSite::chain("http://slow.local", 40, Duration::from_millis(5))
            .page("http://fast.local/", "Fast", &[]),
    );

    let first = plane.start("http://slow.local/").await.unwrap();
    let second = plane.start("http://fast.local/").await.unwrap();
    second.handle.await.unwrap();

    assert_eq!(
        listed(&plane).await,
        vec![PageEntry::new("Fast", "http://fast.local/")]
    );

    // Stop addresses the new crawl; the old one was never cancelled.
    plane.stop("http://fast.local/").await;
    assert!(!first.state.is_cancelled());
    first.state.cancel();
    first.handle.await.unwrap();
}

// ============================================================================
// HTTP Fetcher Integration
// ============================================================================

#[tokio::test]
async fn test_control_plane_over_http() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<html><head><title>Root</title></head><body><a href="/docs">Docs</a></body></html>"#,
            "text/html",
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/docs"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "<html><head><title>Docs</title></head><body></body></html>",
            "text/html",
        ))
        .mount(&mock_server)
        .await;

    let plane = ControlPlane::from_options(&CrawlOptions::default()).unwrap();
    let root = format!("{}/", mock_server.uri());

    let started = plane.start(&root).await.unwrap();
    started.handle.await.unwrap();

    let mut entries: Vec<PageEntry> = plane.list().await.collect().await;
    entries.sort_by(|a, b| a.page_url.cmp(&b.page_url));
    assert_eq!(
        entries,
        vec![
            PageEntry::new("Root", root.clone()),
            PageEntry::new("Docs", format!("{}docs", root)),
        ]
    );
}
