//! On-demand proximity check endpoint.

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;

use proximity_core::{
    LinkConnector, ProximityError, ProximityMonitor, ProximityResult, SeparationThresholds,
};

use crate::api::error::ApiError;
use crate::api::request_id::RequestId;
use crate::state::AppState;

/// Query params for a single check. Thresholds stay strings so that a
/// non-numeric value gets our JSON error instead of a bare extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub struct MonitorQuery {
    pub conn1: Option<String>,
    pub conn2: Option<String>,
    pub hthresh: Option<String>,
    pub vthresh: Option<String>,
}

/// A validated check request.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckRequest {
    pub conn1: String,
    pub conn2: String,
    pub thresholds: SeparationThresholds,
}

impl MonitorQuery {
    /// Validate the query; runs before any link is opened.
    pub fn validate(self, defaults: SeparationThresholds) -> Result<CheckRequest, ApiError> {
        let (Some(conn1), Some(conn2)) = (non_blank(self.conn1), non_blank(self.conn2)) else {
            return Err(ProximityError::MissingConnection.into());
        };

        let horizontal_m = parse_threshold("hthresh", self.hthresh, defaults.horizontal_m)?;
        let vertical_m = parse_threshold("vthresh", self.vthresh, defaults.vertical_m)?;
        let thresholds = SeparationThresholds::new(horizontal_m, vertical_m)?;

        Ok(CheckRequest {
            conn1,
            conn2,
            thresholds,
        })
    }
}

/// Run one proximity check between two vehicles.
/// GET /api/v1/monitor?conn1=udp:127.0.0.1:14540&conn2=udp:127.0.0.1:14541
pub async fn check_proximity<C: LinkConnector>(
    State(state): State<Arc<AppState<C>>>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<MonitorQuery>,
) -> Result<Json<ProximityResult>, ApiError> {
    let request = query.validate(state.config.default_thresholds)?;

    let mut monitor = ProximityMonitor::connect(
        &state.connector,
        &request.conn1,
        &request.conn2,
        request.thresholds,
    )
    .await
    .inspect_err(|err| {
        tracing::warn!(request_id = request_id.as_str(), "Telemetry link unavailable: {err}")
    })?;

    let result = monitor.check_once(state.config.read_timeout).await;
    // Release the ports before answering so the caller can check again at once.
    monitor.close().await;

    tracing::info!(
        request_id = request_id.as_str(),
        conn1 = %request.conn1,
        conn2 = %request.conn2,
        status = %result.status,
        horizontal_m = ?result.horizontal_distance_m,
        vertical_m = ?result.vertical_distance_m,
        "Proximity check complete"
    );
    Ok(Json(result))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn parse_threshold(name: &str, raw: Option<String>, default: f64) -> Result<f64, ApiError> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(default),
        Some(raw) => raw
            .parse::<f64>()
            .map_err(|_| ApiError::BadRequest(format!("Invalid {name}: `{raw}` is not a number"))),
    }
}
