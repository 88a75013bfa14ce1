use super::common::*;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::monitoring::router::{add_handler, list_handler, ReadingRouterState};
use crate::monitoring::{FilterCriteria, NewReading, ReadingQueryService, DEFAULT_TOP_LIMIT};

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, payload: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&payload).unwrap()))
        .unwrap()
}

fn response_ids(body: &Value) -> Vec<&str> {
    body.as_array()
        .expect("array body")
        .iter()
        .map(|row| row["readingId"].as_str().expect("reading id"))
        .collect()
}

#[tokio::test]
async fn list_route_applies_query_filters() {
    let router = router_with_sample_tree();

    let response = router
        .oneshot(get("/api/water-quality/readings?minWaterQualityScore=50"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(response_ids(&body), vec!["-K004", "-K003", "-K001"]);
}

#[tokio::test]
async fn list_route_parses_flag_filters() {
    let router = router_with_sample_tree();

    let response = router
        .oneshot(get("/api/water-quality/readings?safeForFishing=true&minTemp=18"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(response_ids(&body), vec!["-K001"]);
}

#[tokio::test]
async fn reading_route_returns_reading_or_not_found() {
    let router = router_with_sample_tree();

    let response = router
        .clone()
        .oneshot(get("/api/water-quality/readings/-K001"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["location"], json!("Lakeview"));
    assert_eq!(body["qualityScore"], json!(100.0));
    assert_eq!(body["safeForSwimming"], json!(true));

    let response = router
        .oneshot(get("/api/water-quality/readings/-K999"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = read_json_body(response).await;
    assert_eq!(body["error"], json!("reading -K999 not found"));
}

#[tokio::test]
async fn safety_and_score_routes_describe_one_reading() {
    let router = router_with_sample_tree();

    let response = router
        .clone()
        .oneshot(get("/api/water-quality/readings/-K003/safety"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        read_json_body(response).await,
        json!({ "safeForSwimming": false, "safeForFishing": true })
    );

    let response = router
        .clone()
        .oneshot(get("/api/water-quality/readings/-K004/water-quality-score"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["readingId"], json!("-K004"));
    assert_eq!(body["qualityScore"], json!(75.0));
    assert_eq!(body["qualityLevel"], json!("Good"));

    let response = router
        .oneshot(get("/api/water-quality/readings/-K999/safety"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn location_route_returns_empty_list_for_unknown_location() {
    let router = router_with_sample_tree();

    let response = router
        .clone()
        .oneshot(get("/api/water-quality/readings/location/River%20Bend"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_ids(&read_json_body(response).await), vec!["-K003"]);

    let response = router
        .oneshot(get("/api/water-quality/readings/location/Harbor"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json_body(response).await, json!([]));
}

#[tokio::test]
async fn safety_analysis_route_returns_summaries() {
    let router = router_with_sample_tree();

    let response = router
        .oneshot(get("/api/water-quality/safety-analysis?safeForSwimming=true"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(
        body,
        json!([{
            "readingId": "-K001",
            "location": "Lakeview",
            "safeForSwimming": true,
            "safeForFishing": true,
            "qualityScore": 100.0,
            "timestamp": "2024-05-01 08:00:00"
        }])
    );
}

#[tokio::test]
async fn top_readings_route_uses_limit_or_default() {
    let router = router_with_sample_tree();

    let response = router
        .clone()
        .oneshot(get("/api/water-quality/top-readings?limit=2"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response_ids(&read_json_body(response).await),
        vec!["-K001", "-K003"]
    );

    let response = router
        .oneshot(get("/api/water-quality/top-readings"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response_ids(&read_json_body(response).await),
        vec!["-K001", "-K003", "-K004", "-K002"]
    );
}

#[tokio::test]
async fn top_readings_route_honours_configured_default() {
    let (service, _) = build_service();
    let router = crate::monitoring::reading_router(Arc::new(service), 1);

    let response = router
        .oneshot(get("/api/water-quality/top-readings"))
        .await
        .unwrap();

    assert_eq!(response_ids(&read_json_body(response).await), vec!["-K001"]);
}

#[tokio::test]
async fn history_routes_keep_store_order_and_reject_empty_location() {
    let router = router_with_sample_tree();

    let response = router
        .clone()
        .oneshot(get("/api/water-quality/history/all"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response_ids(&read_json_body(response).await),
        vec!["-K001", "-K002", "-K003", "-K004"]
    );

    let response = router
        .clone()
        .oneshot(get("/api/water-quality/history/Lakeview"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response_ids(&read_json_body(response).await),
        vec!["-K004", "-K002", "-K001"]
    );

    let response = router
        .oneshot(get("/api/water-quality/history/Harbor"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = read_json_body(response).await;
    assert_eq!(body["error"], json!("no history for location Harbor"));
}

#[tokio::test]
async fn add_route_creates_reading() {
    let (service, _) = build_service();
    let router = crate::monitoring::reading_router(Arc::new(service), DEFAULT_TOP_LIMIT);

    let response = router
        .clone()
        .oneshot(post_json(
            "/api/water-quality/readings",
            json!({
                "location": "North Shore",
                "temperature": 21.0,
                "ph": 7.4,
                "turbidity": 1.0,
                "dissolvedOxygen": 8.8,
                "timestamp": "2024-06-02 07:15:00"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json_body(response).await;
    assert_eq!(body["status"], json!("success"));
    let reading_id = body["readingId"].as_str().expect("reading id").to_string();

    let response = router
        .oneshot(get(&format!("/api/water-quality/readings/{reading_id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["location"], json!("North Shore"));
    assert_eq!(body["safeForSwimming"], json!(true));
}

#[tokio::test]
async fn add_route_rejects_blank_location() {
    let router = router_with_sample_tree();

    let response = router
        .oneshot(post_json(
            "/api/water-quality/readings",
            json!({ "location": " ", "ph": 7.0 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert_eq!(body["status"], json!("error"));
    assert_eq!(
        body["message"],
        json!("reading payload: field `location` is required")
    );
}

#[tokio::test]
async fn add_handler_returns_bad_gateway_when_store_fails() {
    let state = ReadingRouterState {
        service: Arc::new(ReadingQueryService::new(Arc::new(UnavailableStore))),
        top_limit: DEFAULT_TOP_LIMIT,
    };
    let reading: NewReading =
        serde_json::from_value(json!({ "location": "Lakeview", "ph": 7.0 })).unwrap();

    let response = add_handler::<UnavailableStore>(State(state), axum::Json(reading)).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = read_json_body(response).await;
    assert_eq!(
        body,
        json!({ "status": "error", "message": "Failed to add reading" })
    );
}

#[tokio::test]
async fn list_handler_maps_store_failures_to_bad_gateway() {
    let state = ReadingRouterState {
        service: Arc::new(ReadingQueryService::new(Arc::new(CancelledStore))),
        top_limit: DEFAULT_TOP_LIMIT,
    };

    let response = list_handler::<CancelledStore>(
        State(state),
        axum::extract::Query(FilterCriteria::default()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = read_json_body(response).await;
    assert_eq!(body["error"], json!("reading store unavailable"));
}

#[tokio::test]
async fn malformed_documents_answer_internal_error() {
    let mut tree = sample_tree();
    tree.locations[0].readings[0]
        .1
        .insert("ph".to_string(), json!("acidic"));
    let service = ReadingQueryService::new(Arc::new(
        crate::monitoring::InMemoryReadingStore::new(tree),
    ));
    let router = crate::monitoring::reading_router(Arc::new(service), DEFAULT_TOP_LIMIT);

    let response = router
        .clone()
        .oneshot(get("/api/water-quality/history/all"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let response = router
        .clone()
        .oneshot(get("/api/water-quality/history/River%20Bend"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let response = router
        .clone()
        .oneshot(get("/api/water-quality/readings/location/River%20Bend"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let response = router
        .oneshot(get("/api/water-quality/readings/-K003"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn reading_handler_accepts_path_extractor() {
    let (service, _) = build_service();
    let state = ReadingRouterState {
        service: Arc::new(service),
        top_limit: DEFAULT_TOP_LIMIT,
    };

    let response = crate::monitoring::router::reading_handler::<
        crate::monitoring::InMemoryReadingStore,
    >(State(state), Path("-K002".to_string()))
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["safeForFishing"], json!(false));
}
