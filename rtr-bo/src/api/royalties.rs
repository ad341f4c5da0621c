//! Usage, statement and payout API handlers

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use rtr_common::uuid_utils::parse_id;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::models::{Caller, Payout, PayoutMethod, RoyaltyStatement, UsageRecord};
use crate::services::{EarningsSummary, GenerationSummary};
use crate::AppState;

/// POST /api/usage request
#[derive(Debug, Deserialize)]
pub struct IngestUsageRequest {
    pub records: Vec<UsageRecord>,
}

/// POST /api/usage response
#[derive(Debug, Serialize)]
pub struct IngestUsageResponse {
    pub ingested: u64,
}

/// POST /api/statements/generate request
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
}

/// POST /api/statements/:id/payout request. The body is optional.
#[derive(Debug, Default, Deserialize)]
pub struct CreatePayoutRequest {
    #[serde(default)]
    pub scheduled_for: Option<NaiveDate>,
    #[serde(default)]
    pub method: Option<String>,
}

/// POST /api/usage
pub async fn ingest_usage(
    State(state): State<AppState>,
    caller: Caller,
    payload: Result<Json<IngestUsageRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<IngestUsageResponse>)> {
    let Json(request) = payload?;
    let ingested = state.usage.ingest(&request.records).await?;

    info!(records = ingested, caller = %caller, "Usage records ingested");

    Ok((StatusCode::CREATED, Json(IngestUsageResponse { ingested })))
}

/// POST /api/statements/generate
///
/// Runs to completion within the request. Server shutdown cancels the run
/// between artists; the summary reports who was skipped.
pub async fn generate_statements(
    State(state): State<AppState>,
    caller: Caller,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> ApiResult<Json<GenerationSummary>> {
    let Json(request) = payload?;
    let cancel_token = state.shutdown.child_token();
    let summary = state
        .royalty
        .generate_statements(&caller, request.period_start, request.period_end, &cancel_token)
        .await?;
    Ok(Json(summary))
}

/// GET /api/statements/:id
pub async fn get_statement(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<RoyaltyStatement>> {
    let id = parse_id("statement", &id)?;
    Ok(Json(state.statements.get_statement(id).await?))
}

/// GET /api/artists/:artist_id/statements
pub async fn list_statements(
    State(state): State<AppState>,
    Path(artist_id): Path<String>,
) -> ApiResult<Json<Vec<RoyaltyStatement>>> {
    Ok(Json(state.statements.list_statements(&artist_id).await?))
}

/// POST /api/statements/:id/finalize
pub async fn finalize_statement(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<Json<RoyaltyStatement>> {
    let id = parse_id("statement", &id)?;
    Ok(Json(state.statements.finalize(&caller, id).await?))
}

/// POST /api/statements/:id/payout
pub async fn create_payout(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Payout>)> {
    let statement_id = parse_id("statement", &id)?;
    let request: CreatePayoutRequest = if body.iter().all(u8::is_ascii_whitespace) {
        CreatePayoutRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::BadRequest(format!("Invalid payout request: {}", e)))?
    };
    let method = request
        .method
        .as_deref()
        .map(str::parse::<PayoutMethod>)
        .transpose()?;

    let payout = state
        .statements
        .create_payout(&caller, statement_id, request.scheduled_for, method)
        .await?;
    Ok((StatusCode::CREATED, Json(payout)))
}

/// GET /api/payouts/:id
pub async fn get_payout(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Payout>> {
    let id = parse_id("payout", &id)?;
    Ok(Json(state.statements.get_payout(id).await?))
}

/// GET /api/artists/:artist_id/payouts
pub async fn list_payouts(
    State(state): State<AppState>,
    Path(artist_id): Path<String>,
) -> ApiResult<Json<Vec<Payout>>> {
    Ok(Json(state.statements.list_payouts(&artist_id).await?))
}

/// POST /api/payouts/:id/paid
pub async fn mark_payout_paid(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<Json<Payout>> {
    let id = parse_id("payout", &id)?;
    Ok(Json(state.statements.mark_payout_paid(&caller, id).await?))
}

/// GET /api/artists/:artist_id/earnings
pub async fn earnings_summary(
    State(state): State<AppState>,
    Path(artist_id): Path<String>,
) -> ApiResult<Json<EarningsSummary>> {
    Ok(Json(state.statements.earnings_summary(&artist_id).await?))
}

/// Build usage, statement and payout routes
pub fn royalty_routes() -> Router<AppState> {
    Router::new()
        .route("/api/usage", post(ingest_usage))
        .route("/api/statements/generate", post(generate_statements))
        .route("/api/statements/:id", get(get_statement))
        .route("/api/artists/:artist_id/statements", get(list_statements))
        .route("/api/statements/:id/finalize", post(finalize_statement))
        .route("/api/statements/:id/payout", post(create_payout))
        .route("/api/payouts/:id", get(get_payout))
        .route("/api/artists/:artist_id/payouts", get(list_payouts))
        .route("/api/payouts/:id/paid", post(mark_payout_paid))
        .route("/api/artists/:artist_id/earnings", get(earnings_summary))
}
