//! Release API handlers
//!
//! POST /api/releases, GET /api/releases/:id, GET /api/artists/:artist_id/releases,
//! POST /api/releases/:id/tracks, POST /api/releases/:id/qc,
//! GET /api/releases/:id/readiness, PUT /api/releases/:id/status

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use rtr_common::uuid_utils::parse_id;
use serde::Deserialize;

use crate::error::ApiResult;
use crate::models::{Caller, NewRelease, NewTrack, ReadinessReport, Release, ReleaseStatus};
use crate::services::AddTracksOutcome;
use crate::AppState;

/// POST /api/releases/:id/tracks request
#[derive(Debug, Deserialize)]
pub struct AddTracksRequest {
    pub tracks: Vec<NewTrack>,
}

/// PUT /api/releases/:id/status request
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: String,
}

/// POST /api/releases
pub async fn create_release(
    State(state): State<AppState>,
    caller: Caller,
    payload: Result<Json<NewRelease>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Release>)> {
    let Json(request) = payload?;
    let release = state.releases.create_release(&caller, request).await?;
    Ok((StatusCode::CREATED, Json(release)))
}

/// GET /api/releases/:id
pub async fn get_release(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Release>> {
    let id = parse_id("release", &id)?;
    Ok(Json(state.releases.get_release(id).await?))
}

/// GET /api/artists/:artist_id/releases
pub async fn list_releases(
    State(state): State<AppState>,
    Path(artist_id): Path<String>,
) -> ApiResult<Json<Vec<Release>>> {
    Ok(Json(state.releases.list_releases(&artist_id).await?))
}

/// POST /api/releases/:id/tracks
///
/// Response carries the updated release plus split warnings.
pub async fn add_tracks(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    payload: Result<Json<AddTracksRequest>, JsonRejection>,
) -> ApiResult<Json<AddTracksOutcome>> {
    let id = parse_id("release", &id)?;
    let Json(request) = payload?;
    let outcome = state.releases.add_tracks(&caller, id, request.tracks).await?;
    Ok(Json(outcome))
}

/// POST /api/releases/:id/qc
pub async fn run_qc(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<Json<Release>> {
    let id = parse_id("release", &id)?;
    Ok(Json(state.releases.run_qc(&caller, id).await?))
}

/// GET /api/releases/:id/readiness
pub async fn check_readiness(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ReadinessReport>> {
    let id = parse_id("release", &id)?;
    Ok(Json(state.releases.check_readiness(id).await?))
}

/// PUT /api/releases/:id/status
pub async fn set_status(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    payload: Result<Json<SetStatusRequest>, JsonRejection>,
) -> ApiResult<Json<Release>> {
    let id = parse_id("release", &id)?;
    let Json(request) = payload?;
    let status: ReleaseStatus = request.status.parse()?;
    Ok(Json(state.releases.set_status(&caller, id, status).await?))
}

/// Build release routes
pub fn release_routes() -> Router<AppState> {
    Router::new()
        .route("/api/releases", post(create_release))
        .route("/api/releases/:id", get(get_release))
        .route("/api/artists/:artist_id/releases", get(list_releases))
        .route("/api/releases/:id/tracks", post(add_tracks))
        .route("/api/releases/:id/qc", post(run_qc))
        .route("/api/releases/:id/readiness", get(check_readiness))
        .route("/api/releases/:id/status", put(set_status))
}
