use arachne_core::ControlPlane;
use arachne_core::protocol::{LIST_PATH, START_PATH, STATUS_PATH, STOP_PATH};
use arachne_scanner::PageFetcher;
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::routes::{list_handler, start_handler, status_handler, stop_handler};

/// Shared state handed to every route.
pub struct AppState<F> {
    pub control: Arc<ControlPlane<F>>,
}

impl<F> Clone for AppState<F> {
    fn clone(&self) -> Self {
        Self {
            control: self.control.clone(),
        }
    }
}

/// Build the Axum application router
pub fn build_app<F: PageFetcher>(control: Arc<ControlPlane<F>>) -> Router {
    Router::new()
        .route(START_PATH, post(start_handler::<F>))
        .route(STOP_PATH, post(stop_handler::<F>))
        .route(LIST_PATH, get(list_handler::<F>))
        .route(STATUS_PATH, get(status_handler::<F>))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { control })
}
