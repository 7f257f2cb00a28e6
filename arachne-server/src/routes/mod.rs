// HTTP routes
pub mod list;
pub mod start;
pub mod status;
pub mod stop;

pub use list::*;
pub use start::*;
pub use status::*;
pub use stop::*;

use arachne_core::ControlError;
use arachne_core::protocol::ErrorResponse;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Control plane failure rendered as a JSON error body.
pub struct ApiError(pub ControlError);

impl From<ControlError> for ApiError {
    fn from(error: ControlError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            ControlError::InvalidUrl(_) => StatusCode::BAD_REQUEST,
            ControlError::Fetcher(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorResponse {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
