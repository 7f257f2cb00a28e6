use arachne_core::protocol::{
    ErrorResponse, LIST_PATH, PageEntry, START_PATH, STATUS_PATH, STOP_PATH, StartRequest,
    StartResponse, StatusResponse, StopRequest, StopResponse, decode_entry_line,
};
use arachne_core::report::ListingWriter;
use arachne_core::url::{UrlError, normalize_url};
use colored::Colorize;
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::io::{self, Write};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Could not connect to {addr}: {source}")]
    Connect {
        addr: String,
        source: reqwest::Error,
    },

    #[error("Server answered {status}: {message}")]
    Rpc { status: u16, message: String },

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed listing data: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Listing is not valid UTF-8")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("Failed to write output: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, ClientError>;

/// Normalizes a URL given on the command line before it is sent.
pub fn parse_url_arg(input: &str) -> std::result::Result<String, UrlError> {
    normalize_url(input)
}

/// Turns `host:port` into the server's base URL. An explicit scheme is kept.
pub fn base_url(addr: &str) -> String {
    let addr = addr.trim().trim_end_matches('/');
    if addr.contains("://") {
        addr.to_string()
    } else {
        format!("http://{}", addr)
    }
}

/// Splits a byte stream into NDJSON listing entries.
///
/// Chunks may end mid-line or mid-character; bytes are buffered until a
/// newline arrives.
#[derive(Debug, Default)]
pub struct NdjsonLines {
    buffer: Vec<u8>,
}

impl NdjsonLines {
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<PageEntry>> {
        self.buffer.extend_from_slice(chunk);

        let mut entries = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(entry) = decode_entry_line(std::str::from_utf8(&line)?)? {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    /// Decodes whatever is left once the stream has ended.
    pub fn finish(self) -> Result<Option<PageEntry>> {
        let rest = std::str::from_utf8(&self.buffer)?;
        Ok(decode_entry_line(rest)?)
    }
}

/// Speaks the crawl server's JSON-over-HTTP protocol.
pub struct RpcClient {
    client: Client,
    addr: String,
    base: String,
}

impl RpcClient {
    pub fn new(addr: &str) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self {
            client,
            addr: addr.to_string(),
            base: base_url(addr),
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub async fn start(&self, start_url: &str) -> Result<StartResponse> {
        let request = StartRequest {
            start_url: start_url.to_string(),
        };
        let response = self.send(self.client.post(self.url(START_PATH)).json(&request)).await?;
        read_json(response).await
    }

    pub async fn stop(&self, stop_url: &str) -> Result<StopResponse> {
        let request = StopRequest {
            stop_url: stop_url.to_string(),
        };
        let response = self.send(self.client.post(self.url(STOP_PATH)).json(&request)).await?;
        read_json(response).await
    }

    pub async fn status(&self) -> Result<StatusResponse> {
        let response = self.send(self.client.get(self.url(STATUS_PATH))).await?;
        read_json(response).await
    }

    /// Streams the listing into `writer`, entry by entry, and returns how
    /// many entries were written. The total line is left to the caller.
    pub async fn list<W: Write>(&self, writer: &mut ListingWriter<W>) -> Result<usize> {
        let response = self.send(self.client.get(self.url(LIST_PATH))).await?;
        let response = check_status(response).await?;

        let mut lines = NdjsonLines::default();
        let mut chunks = response.bytes_stream();

        while let Some(chunk) = chunks.next().await {
            for entry in lines.push(&chunk?)? {
                writer.write_entry(&entry)?;
            }
        }
        if let Some(entry) = lines.finish()? {
            writer.write_entry(&entry)?;
        }

        debug!("Received {} listing entries", writer.total());
        Ok(writer.total())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Response> {
        request.send().await.map_err(|e| {
            if e.is_connect() {
                ClientError::Connect {
                    addr: self.addr.clone(),
                    source: e,
                }
            } else {
                ClientError::Http(e)
            }
        })
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|e| e.error)
        .unwrap_or(body);

    Err(ClientError::Rpc {
        status: status.as_u16(),
        message,
    })
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    Ok(check_status(response).await?.json().await?)
}

// Command handlers

fn spinner(quiet: bool, message: String) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message);
    pb
}

pub async fn handle_start(client: &RpcClient, url: &str, quiet: bool) -> Result<()> {
    let pb = spinner(quiet, format!("Asking {} to crawl {}", client.base(), url));
    let result = client.start(url).await;
    pb.finish_and_clear();

    let response = result?;
    if quiet {
        println!("{}", response.message);
    } else {
        println!("{} {}", "✓".green().bold(), response.message);
    }
    Ok(())
}

pub async fn handle_stop(client: &RpcClient, url: &str, quiet: bool) -> Result<()> {
    let pb = spinner(quiet, format!("Asking {} to stop", client.base()));
    let result = client.stop(url).await;
    pb.finish_and_clear();

    let response = result?;
    if quiet {
        println!("{}", response.message);
    } else {
        println!("{} {}", "■".yellow().bold(), response.message);
    }
    Ok(())
}

/// Prints every visited page as `<title>:\n\t <url>` (or NDJSON), then the
/// total for the text format.
pub async fn handle_list<W: Write>(client: &RpcClient, mut writer: ListingWriter<W>) -> Result<()> {
    client.list(&mut writer).await?;
    writer.finish()?;
    Ok(())
}

pub async fn handle_status(client: &RpcClient) -> Result<()> {
    let status = client.status().await?;

    let Some(root) = status.root else {
        println!("{} No crawl started", "→".blue());
        return Ok(());
    };

    println!("{} {}", "Root:".bright_white().bold(), root);
    println!("{} {}", "Phase:".bright_white().bold(), status.phase);
    println!("{} {}", "Visited:".bright_white().bold(), status.visited);
    println!("{} {}", "Failures:".bright_white().bold(), status.failures);
    if let Some(started_at) = status.started_at {
        println!(
            "{} {}",
            "Started:".bright_white().bold(),
            started_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }
    Ok(())
}
