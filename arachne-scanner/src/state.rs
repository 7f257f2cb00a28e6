//! Shared record of one crawl run.
//!
//! The traversal task is the only writer of the visited map; control
//! operations read it, or flip the cancellation token, from other tasks.

use crate::result::PageEntry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

/// Lifecycle of a crawl state. `Idle` only describes "no crawl yet" at the
/// control plane level; a `CrawlState` is born `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrawlPhase {
    Idle,
    Running,
    Cancelled,
    Finished,
}

impl CrawlPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Cancelled => "cancelled",
            Self::Finished => "finished",
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Running,
            2 => Self::Cancelled,
            3 => Self::Finished,
            _ => Self::Idle,
        }
    }

    fn to_u8(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Running => 1,
            Self::Cancelled => 2,
            Self::Finished => 3,
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub struct CrawlState {
    root: String,
    started_at: DateTime<Utc>,
    visited: RwLock<HashMap<String, String>>,
    cancel: CancellationToken,
    phase: AtomicU8,
    failures: AtomicUsize,
}

impl CrawlState {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            started_at: Utc::now(),
            visited: RwLock::new(HashMap::new()),
            cancel: CancellationToken::new(),
            phase: AtomicU8::new(CrawlPhase::Running.to_u8()),
            failures: AtomicUsize::new(0),
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn phase(&self) -> CrawlPhase {
        CrawlPhase::from_u8(self.phase.load(Ordering::Acquire))
    }

    /// Requests cancellation. Returns `true` if this call moved a running
    /// crawl to `Cancelled`; repeated calls and calls after the traversal
    /// finished are no-ops.
    pub fn cancel(&self) -> bool {
        self.cancel.cancel();
        self.phase
            .compare_exchange(
                CrawlPhase::Running.to_u8(),
                CrawlPhase::Cancelled.to_u8(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub(crate) fn finish(&self) {
        self.phase
            .store(CrawlPhase::Finished.to_u8(), Ordering::Release);
    }

    pub(crate) fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn failures(&self) -> usize {
        self.failures.load(Ordering::Relaxed)
    }

    pub async fn is_visited(&self, url: &str) -> bool {
        self.visited.read().await.contains_key(url)
    }

    /// Records a page title. An existing entry is never replaced, so the
    /// map stays append-only. Returns `true` when the URL was new.
    pub(crate) async fn mark_visited(&self, url: &str, title: String) -> bool {
        let mut visited = self.visited.write().await;
        if visited.contains_key(url) {
            return false;
        }
        visited.insert(url.to_string(), title);
        true
    }

    pub async fn visited_count(&self) -> usize {
        self.visited.read().await.len()
    }

    pub async fn title_of(&self, url: &str) -> Option<String> {
        self.visited.read().await.get(url).cloned()
    }

    /// Copies the visited map out under a read lock, in map order.
    pub async fn snapshot(&self) -> Vec<PageEntry> {
        self.visited
            .read()
            .await
            .iter()
            .map(|(url, title)| PageEntry::new(title.clone(), url.clone()))
            .collect()
    }
}
