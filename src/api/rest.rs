use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use alloy::primitives::Address;
use serde::Serialize;
use std::sync::Arc;

use crate::models::StakingRecord;
use crate::services::{RefreshReport, StakingRefresher, StakingStore};
use super::ApiError;

pub const UPDATED_MESSAGE: &str = "All staking data updated successfully";

pub struct AppState {
    pub store: StakingStore,
    pub refresher: Arc<StakingRefresher>,
}

#[derive(Serialize)]
struct UpdateResponse {
    message: &'static str,
    #[serde(flatten)]
    report: RefreshReport,
}

/// Path values may come in any hex casing; rows are keyed by the
/// checksummed form.
fn normalize_address(raw: &str) -> String {
    raw.parse::<Address>()
        .map(|addr| addr.to_checksum(None))
        .unwrap_or_else(|_| raw.to_string())
}

/// GET /staking
async fn list_staking(State(state): State<Arc<AppState>>) -> Result<Json<Vec<StakingRecord>>, ApiError> {
    Ok(Json(state.store.find_all().await?))
}

/// GET /staking/protocol/:id_protocol
async fn staking_by_protocol(
    State(state): State<Arc<AppState>>,
    Path(id_protocol): Path<String>,
) -> Result<Json<Vec<StakingRecord>>, ApiError> {
    Ok(Json(state.store.find_by_protocol(&id_protocol).await?))
}

/// GET /staking/address/:address
async fn staking_by_address(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> Result<Json<StakingRecord>, ApiError> {
    state
        .store
        .find_by_token_address(&normalize_address(&address))
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// GET /staking/:key - hex addresses go to the token lookup (404 when
/// missing); anything else is a protocol id and always answers an array.
async fn staking_by_key(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Response, ApiError> {
    let Ok(address) = key.parse::<Address>() else {
        let by_protocol = state.store.find_by_protocol(&key).await?;
        return Ok(Json(by_protocol).into_response());
    };

    state
        .store
        .find_by_token_address(&address.to_checksum(None))
        .await?
        .map(|record| Json(record).into_response())
        .ok_or(ApiError::NotFound)
}

/// POST /staking/update
///
/// Always answers 200 with the success message; per-token failures are
/// only visible in `failed` / `results` and in the log.
async fn update_staking(State(state): State<Arc<AppState>>) -> Json<UpdateResponse> {
    let report = state.refresher.refresh_all().await;
    if report.failed > 0 {
        tracing::warn!("Staking refresh: {}/{} tokens failed", report.failed, report.results.len());
    }

    Json(UpdateResponse {
        message: UPDATED_MESSAGE,
        report,
    })
}

/// GET /health
async fn health() -> &'static str {
    "OK"
}

/// GET /stats
async fn stats(State(state): State<Arc<AppState>>) -> Result<Json<serde_json::Value>, ApiError> {
    let records = state.store.count().await?;

    Ok(Json(serde_json::json!({
        "records": records,
        "source": state.refresher.source_name(),
        "last_refresh": state.refresher.last_report(),
    })))
}

pub fn create_rest_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/staking", get(list_staking))
        .route("/staking/update", post(update_staking))
        .route("/staking/protocol/:id_protocol", get(staking_by_protocol))
        .route("/staking/address/:address", get(staking_by_address))
        .route("/staking/:key", get(staking_by_key))
        .route("/health", get(health))
        .route("/stats", get(stats))
        .with_state(state)
}
