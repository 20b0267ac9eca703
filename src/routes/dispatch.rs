//! Map-dispatch helpers: geocode an address, estimate a drive.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::app_state::AppState;
use crate::services::geocode::GeocodeResult;
use crate::services::routing::{Coordinates, RouteEstimate};

#[derive(Debug, Deserialize, Validate)]
pub struct GeocodeRequest {
    #[garde(length(min = 3, max = 500))]
    pub address: String,
}

/// POST /api/v1/geocode — resolve a free-text address.
/// 502 when neither the primary nor the fallback provider resolves it.
pub async fn geocode(
    State(state): State<AppState>,
    Json(payload): Json<GeocodeRequest>,
) -> Result<Json<GeocodeResult>, StatusCode> {
    payload.validate().map_err(|_| StatusCode::BAD_REQUEST)?;

    let result = state.geocoder.geocode(&payload.address).await.map_err(|e| {
        tracing::warn!(error = %e, "geocode failed on both providers");
        StatusCode::BAD_GATEWAY
    })?;

    Ok(Json(result))
}

#[derive(Debug, Deserialize, Validate)]
pub struct RouteRequest {
    #[garde(skip)]
    pub from: Coordinates,

    #[garde(skip)]
    pub to: Coordinates,

    #[garde(skip)]
    pub depart_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct RouteResponse {
    #[serde(flatten)]
    pub estimate: RouteEstimate,
    pub depart_at: DateTime<Utc>,
}

/// POST /api/v1/route — drive estimate between two points.
/// Missing departure time means "now". An uncomputable route yields the
/// straight-line estimate, not an error.
pub async fn route(
    State(state): State<AppState>,
    Json(payload): Json<RouteRequest>,
) -> Result<Json<RouteResponse>, StatusCode> {
    payload.validate().map_err(|_| StatusCode::BAD_REQUEST)?;

    let depart_at = payload.depart_at.unwrap_or_else(Utc::now);
    let estimate = state
        .router
        .route(payload.from, payload.to, depart_at)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "routing request failed");
            StatusCode::BAD_GATEWAY
        })?;

    Ok(Json(RouteResponse { estimate, depart_at }))
}
