use arachne_core::protocol::{StopRequest, StopResponse};
use arachne_scanner::PageFetcher;
use axum::{Json, extract::State};

use crate::app::AppState;

/// POST /stop
pub async fn stop_handler<F: PageFetcher>(
    State(state): State<AppState<F>>,
    Json(request): Json<StopRequest>,
) -> Json<StopResponse> {
    Json(state.control.stop(&request.stop_url).await)
}
