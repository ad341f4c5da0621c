//! HTTP API tests through the full router

mod helpers;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use helpers::setup;
use rtr_bo::build_router;
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot`

const CALLER: &str = "ops-user-1";

fn app(ctx: &helpers::TestContext) -> Router {
    build_router(ctx.state.clone())
}

fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-caller-id", CALLER);
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Should parse JSON")
    };
    (status, body)
}

async fn create_ready_release(app: &Router) -> String {
    let (status, release) = send(
        app,
        request(
            "POST",
            "/api/releases",
            Some(json!({
                "artist_id": "artist-1",
                "title": "Album",
                "primary_artist": "The Testers",
                "upc": "012345678905",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = release["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        app,
        request(
            "POST",
            &format!("/api/releases/{}/tracks", id),
            Some(json!({"tracks": [{"title": "T1", "isrc": "USRC001", "duration_seconds": 180}]})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, release) = send(app, request("POST", &format!("/api/releases/{}/qc", id), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(release["status"], "ready_for_delivery");
    assert_eq!(release["qc_result"]["score"], 100);
    id
}

#[tokio::test]
async fn test_health_endpoint() {
    let ctx = setup().await;
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(&app(&ctx), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "rtr-bo");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_mutation_without_caller_is_unauthenticated() {
    let ctx = setup().await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/releases")
        .header("content-type", "application/json")
        .body(Body::from(json!({"artist_id": "a", "title": "t"}).to_string()))
        .unwrap();
    let (status, body) = send(&app(&ctx), request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn test_release_flow_over_http() {
    let ctx = setup().await;
    let app = app(&ctx);
    let id = create_ready_release(&app).await;

    let (status, release) = send(&app, request("GET", &format!("/api/releases/{}", id), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(release["tracks"].as_array().unwrap().len(), 1);

    let (status, list) = send(&app, request("GET", "/api/artists/artist-1/releases", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, report) =
        send(&app, request("GET", &format!("/api/releases/{}/readiness", id), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["ready"], false);

    let (status, deliveries) = send(
        &app,
        request(
            "POST",
            &format!("/api/releases/{}/deliveries", id),
            Some(json!({"dsps": ["spotify", "tiktok"]})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let deliveries = deliveries.as_array().unwrap().clone();
    assert_eq!(deliveries.len(), 2);
    assert_eq!(deliveries[0]["status"], "QUEUED");

    let delivery_id = deliveries[0]["id"].as_str().unwrap();
    let (status, delivery) = send(
        &app,
        request(
            "PUT",
            &format!("/api/deliveries/{}/status", delivery_id),
            Some(json!({"status": "FAILED", "error": "timeout"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(delivery["last_error"], "timeout");

    let (status, release) = send(
        &app,
        request(
            "PUT",
            &format!("/api/releases/{}/status", id),
            Some(json!({"status": "delivered"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(release["status"], "delivered");

    let (status, body) = send(&app, request("POST", &format!("/api/releases/{}/qc", id), None)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "INVALID_OPERATION");
}

#[tokio::test]
async fn test_error_statuses() {
    let ctx = setup().await;
    let app = app(&ctx);

    let (status, body) = send(&app, request("GET", "/api/releases/not-a-uuid", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let missing = uuid::Uuid::new_v4();
    let (status, body) = send(&app, request("GET", &format!("/api/releases/{}", missing), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, _) = send(
        &app,
        request("POST", "/api/releases", Some(json!({"artist_id": "a", "title": ""}))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        request("POST", "/api/releases", Some(json!({"title": 5}))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let id = create_ready_release(&app).await;
    let (status, body) = send(
        &app,
        request(
            "POST",
            &format!("/api/releases/{}/deliveries", id),
            Some(json!({"dsps": ["napster"]})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "UNSUPPORTED_DSP");
    assert_eq!(body["error"]["message"], "Unsupported DSP: napster");

    let (status, _) = send(
        &app,
        request(
            "PUT",
            &format!("/api/releases/{}/status", id),
            Some(json!({"status": "archived"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_royalty_flow_over_http() {
    let ctx = setup().await;
    let app = app(&ctx);

    let records: Vec<Value> = [500.0, 300.0, 1200.0]
        .iter()
        .map(|revenue| {
            json!({
                "artist_id": "artist-1",
                "release_id": "ext-1",
                "track_id": "trk-1",
                "track_title": "T1",
                "source": "spotify",
                "territory": "US",
                "streams": 1000,
                "revenue": revenue,
                "usage_date": "2024-01-15",
            })
        })
        .collect();
    let (status, body) = send(&app, request("POST", "/api/usage", Some(json!({"records": records})))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["ingested"], 3);

    let (status, summary) = send(
        &app,
        request(
            "POST",
            "/api/statements/generate",
            Some(json!({"period_start": "2024-01-01", "period_end": "2024-01-31"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["statements_created"], 1);
    assert_eq!(summary["total_gross_revenue"], 2000.0);
    assert_eq!(summary["total_distributor_cut"], 400.0);
    assert_eq!(summary["total_net_to_artists"], 1600.0);
    let statement_id = summary["statement_ids"][0].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        request("POST", &format!("/api/statements/{}/payout", statement_id), None),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, statement) = send(
        &app,
        request("POST", &format!("/api/statements/{}/finalize", statement_id), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(statement["status"], "Finalized");

    let (status, payout) = send(
        &app,
        request(
            "POST",
            &format!("/api/statements/{}/payout", statement_id),
            Some(json!({"scheduled_for": "2024-02-15", "method": "paypal"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(payout["amount"], 1600.0);
    assert_eq!(payout["method"], "paypal");
    assert_eq!(payout["status"], "Pending");
    let payout_id = payout["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        request("POST", &format!("/api/statements/{}/payout", statement_id), None),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("payout already exists"));

    let (status, earnings) = send(&app, request("GET", "/api/artists/artist-1/earnings", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(earnings["lifetime_earnings"], 1600.0);
    assert_eq!(earnings["pending_payouts"], 1600.0);

    let (status, paid) = send(&app, request("POST", &format!("/api/payouts/{}/paid", payout_id), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paid["status"], "Paid");

    let (status, payouts) = send(&app, request("GET", "/api/artists/artist-1/payouts", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payouts.as_array().unwrap().len(), 1);

    let (status, statements) = send(&app, request("GET", "/api/artists/artist-1/statements", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(statements[0]["status"], "Paid");

    let (status, fetched) = send(&app, request("GET", &format!("/api/payouts/{}", payout_id), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], payout_id.as_str());
}

#[tokio::test]
async fn test_generate_rejects_bad_period() {
    let ctx = setup().await;
    let (status, _) = send(
        &app(&ctx),
        request(
            "POST",
            "/api/statements/generate",
            Some(json!({"period_start": "2024-02-01", "period_end": "2024-01-01"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
