//! HTTP error mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use proximity_core::ProximityError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Client input rejected before any telemetry I/O
    #[error("{0}")]
    BadRequest(String),

    /// A telemetry link could not be opened
    #[error("{0}")]
    LinkUnavailable(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::LinkUnavailable(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<ProximityError> for ApiError {
    fn from(err: ProximityError) -> Self {
        match err {
            ProximityError::MissingConnection | ProximityError::InvalidThreshold { .. } => {
                ApiError::BadRequest(err.to_string())
            }
            ProximityError::Link(link) => ApiError::LinkUnavailable(link.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
