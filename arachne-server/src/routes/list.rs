//! Streaming listing endpoint.
//!
//! GET /list
//!
//! Writes one JSON object per visited page, newline separated, then closes
//! the body. The listing is a snapshot of the visited map taken when the
//! request arrives, so a crawl can keep writing while it streams.

use arachne_core::protocol::{NDJSON_CONTENT_TYPE, encode_entry_line};
use arachne_scanner::PageFetcher;
use axum::{
    body::Body,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use futures::stream::{Stream, StreamExt};
use tracing::debug;

use crate::app::AppState;

pub async fn list_handler<F: PageFetcher>(State(state): State<AppState<F>>) -> Response {
    let pages = state.control.list().await;
    debug!("Streaming {} visited pages", pages.size_hint().0);

    let lines = pages.map(|entry| encode_entry_line(&entry));

    (
        [(header::CONTENT_TYPE, NDJSON_CONTENT_TYPE)],
        Body::from_stream(lines),
    )
        .into_response()
}
