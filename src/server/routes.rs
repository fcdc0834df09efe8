//! Route handlers
//!
//! - `POST /scan` - Single- or multi-page scan
//! - `POST /scan/fix` - Fix-code suggestion for one issue
//! - `GET /api/health` - Liveness and API key status

use crate::analysis::{FixRequest, FixSuggestion};
use crate::output::ReportEnvelope;
use crate::scan::ScanRequest;
use crate::server::error::{ApiError, ApiResult};
use crate::server::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Json, Response},
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    status: String,
    timestamp: String,
    api_key_configured: bool,
}

#[derive(Debug, Serialize)]
pub struct FixResponse {
    success: bool,
    fix: FixSuggestion,
}

fn bad_json(rejection: JsonRejection) -> ApiError {
    ApiError::BadRequest(rejection.body_text())
}

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "UX Scanner API is running".to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        api_key_configured: state.api_key_configured,
    })
}

/// POST /scan
pub async fn scan(
    State(state): State<AppState>,
    payload: Result<Json<ScanRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(request) = payload.map_err(bad_json)?;
    let report = state.scanner.scan(&request).await?;
    Ok(Json(ReportEnvelope::new(&report)).into_response())
}

/// POST /scan/fix
pub async fn fix(
    State(state): State<AppState>,
    payload: Result<Json<FixRequest>, JsonRejection>,
) -> ApiResult<Json<FixResponse>> {
    let Json(request) = payload.map_err(bad_json)?;
    let fix = state.scanner.generate_fix(&request).await?;
    Ok(Json(FixResponse { success: true, fix }))
}
