use arachne_core::protocol::{StartRequest, StartResponse};
use arachne_scanner::PageFetcher;
use axum::{Json, extract::State};
use tracing::{info, warn};

use super::ApiError;
use crate::app::AppState;

/// POST /start
///
/// Launches a crawl in the background and acknowledges with its root.
/// An invalid URL is answered with `400` and nothing is replaced.
pub async fn start_handler<F: PageFetcher>(
    State(state): State<AppState<F>>,
    Json(request): Json<StartRequest>,
) -> Result<Json<StartResponse>, ApiError> {
    info!("Start requested for '{}'", request.start_url);

    let started = state.control.start(&request.start_url).await.map_err(|e| {
        warn!("Rejected start request: {}", e);
        ApiError::from(e)
    })?;

    Ok(Json(started.response()))
}
