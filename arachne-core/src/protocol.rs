//! Messages exchanged between the `arachne` client and `arachne-server`.
//!
//! Every request and reply is a JSON object. `GET /list` answers with one
//! [`PageEntry`] per line (`application/x-ndjson`).

use arachne_scanner::CrawlPhase;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use arachne_scanner::PageEntry;

pub const DEFAULT_PORT: u16 = 50051;
pub const DEFAULT_ADDR: &str = "localhost:50051";

pub const START_PATH: &str = "/start";
pub const STOP_PATH: &str = "/stop";
pub const LIST_PATH: &str = "/list";
pub const STATUS_PATH: &str = "/status";

pub const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartRequest {
    pub start_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartResponse {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopRequest {
    pub stop_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopResponse {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Snapshot of the crawl the server currently addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub root: Option<String>,
    pub phase: CrawlPhase,
    pub visited: usize,
    pub failures: usize,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub started_at: Option<DateTime<Utc>>,
}

impl StatusResponse {
    pub fn idle() -> Self {
        Self {
            root: None,
            phase: CrawlPhase::Idle,
            visited: 0,
            failures: 0,
            started_at: None,
        }
    }
}

/// Encodes one listing entry as an NDJSON line, newline included.
pub fn encode_entry_line(entry: &PageEntry) -> serde_json::Result<String> {
    let mut line = serde_json::to_string(entry)?;
    line.push('\n');
    Ok(line)
}

/// Decodes one NDJSON line. Blank lines yield `None`.
pub fn decode_entry_line(line: &str) -> serde_json::Result<Option<PageEntry>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(line).map(Some)
}
