use arachne_core::protocol::StatusResponse;
use arachne_scanner::PageFetcher;
use axum::{Json, extract::State};

use crate::app::AppState;

/// GET /status
pub async fn status_handler<F: PageFetcher>(
    State(state): State<AppState<F>>,
) -> Json<StatusResponse> {
    Json(state.control.status().await)
}
