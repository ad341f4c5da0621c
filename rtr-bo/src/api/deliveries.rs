//! Delivery API handlers

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{post, put},
    Json, Router,
};
use rtr_common::uuid_utils::parse_id;
use serde::Deserialize;

use crate::error::ApiResult;
use crate::models::{Caller, Delivery, DeliveryStatus};
use crate::AppState;

/// POST /api/releases/:id/deliveries request
#[derive(Debug, Deserialize)]
pub struct QueueDeliveriesRequest {
    pub dsps: Vec<String>,
}

/// PUT /api/deliveries/:id/status request
#[derive(Debug, Deserialize)]
pub struct UpdateDeliveryStatusRequest {
    pub status: String,
    #[serde(default)]
    pub error: Option<String>,
}

/// POST /api/releases/:id/deliveries
pub async fn queue_deliveries(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    payload: Result<Json<QueueDeliveriesRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Vec<Delivery>>)> {
    let release_id = parse_id("release", &id)?;
    let Json(request) = payload?;
    let deliveries = state
        .deliveries
        .queue_deliveries(&caller, release_id, &request.dsps)
        .await?;
    Ok((StatusCode::CREATED, Json(deliveries)))
}

/// GET /api/releases/:id/deliveries
pub async fn get_deliveries(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Delivery>>> {
    let release_id = parse_id("release", &id)?;
    Ok(Json(state.deliveries.get_deliveries(release_id).await?))
}

/// PUT /api/deliveries/:id/status
pub async fn update_delivery_status(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    payload: Result<Json<UpdateDeliveryStatusRequest>, JsonRejection>,
) -> ApiResult<Json<Delivery>> {
    let delivery_id = parse_id("delivery", &id)?;
    let Json(request) = payload?;
    let status: DeliveryStatus = request.status.parse()?;
    let delivery = state
        .deliveries
        .update_delivery_status(&caller, delivery_id, status, request.error)
        .await?;
    Ok(Json(delivery))
}

/// Build delivery routes
pub fn delivery_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/releases/:id/deliveries",
            post(queue_deliveries).get(get_deliveries),
        )
        .route("/api/deliveries/:id/status", put(update_delivery_status))
}
