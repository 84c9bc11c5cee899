//! HTTP Handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crypto_guidance::{GuidanceError, TrackerSnapshot, TrackerUpdate};

use crate::state::AppState;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub provider: String,
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct AddAssetRequest {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct WatchlistResponse {
    pub ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn cycle_error(e: &GuidanceError) -> ApiError {
    tracing::error!("Refresh cycle failed: {}", e);
    (
        StatusCode::BAD_GATEWAY,
        Json(ErrorResponse {
            error: e.user_message(),
            code: "SNAPSHOT_FAILED".into(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let snapshot = state.tracker.snapshot().await;

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        provider: state.tracker.provider_name().to_string(),
        last_updated: snapshot.last_updated,
    })
}

/// Current watchlist ids
pub async fn list_watchlist(State(state): State<AppState>) -> Json<WatchlistResponse> {
    Json(WatchlistResponse {
        ids: state.tracker.watchlist().await,
    })
}

/// Add an id to the watchlist and run a cycle
pub async fn add_asset(
    State(state): State<AppState>,
    Json(payload): Json<AddAssetRequest>,
) -> Result<Json<TrackerUpdate>, ApiError> {
    state
        .tracker
        .add(&payload.id)
        .await
        .map(Json)
        .map_err(|e| cycle_error(&e))
}

/// Remove an id and its guidance, then run a cycle
pub async fn remove_asset(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TrackerUpdate>, ApiError> {
    state
        .tracker
        .remove(&id)
        .await
        .map(Json)
        .map_err(|e| cycle_error(&e))
}

/// Manual refresh
pub async fn refresh(State(state): State<AppState>) -> Result<Json<TrackerUpdate>, ApiError> {
    state
        .tracker
        .refresh()
        .await
        .map(Json)
        .map_err(|e| cycle_error(&e))
}

/// Retained guidance records plus watchlist and cycle status
pub async fn guidance(State(state): State<AppState>) -> Json<TrackerSnapshot> {
    Json(state.tracker.snapshot().await)
}
