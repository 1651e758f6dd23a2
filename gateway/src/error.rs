use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use balloon_tracking::TrackingError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("No hour of the balloon feed could be retrieved")]
    FeedUnavailable,
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Invalid snapshot: {0}")]
    Snapshot(#[from] TrackingError),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::FeedUnavailable | Self::Http(_) => StatusCode::BAD_GATEWAY,
            Self::Snapshot(_) => StatusCode::BAD_REQUEST,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        tracing::error!("{}", self);
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
