//! API routes for the proximity server.

pub mod error;
pub mod monitor;
pub mod request_id;

use axum::{middleware, routing::get, Router};
use std::sync::Arc;

use proximity_core::LinkConnector;

use crate::state::AppState;

/// Create the API router.
pub fn routes<C: LinkConnector>() -> Router<Arc<AppState<C>>> {
    Router::new()
        .route("/api/v1/monitor", get(monitor::check_proximity::<C>))
        .route("/health", get(|| async { "OK" }))
        .layer(middleware::from_fn(request_id::ensure_request_id))
}
