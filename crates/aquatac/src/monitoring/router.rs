use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::domain::{NewReading, ReadingId};
use super::filter::FilterCriteria;
use super::service::{ReadingQueryService, ReadingServiceError};
use super::store::ReadingStore;

/// Limit applied to `/top-readings` when the caller does not pass one.
pub const DEFAULT_TOP_LIMIT: usize = 10;

/// Shared state behind the reading routes.
pub struct ReadingRouterState<S> {
    pub service: Arc<ReadingQueryService<S>>,
    pub top_limit: usize,
}

impl<S> Clone for ReadingRouterState<S> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            top_limit: self.top_limit,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TopReadingsQuery {
    limit: Option<usize>,
}

/// Router builder exposing the water-quality read and write endpoints.
pub fn reading_router<S>(service: Arc<ReadingQueryService<S>>, top_limit: usize) -> Router
where
    S: ReadingStore + 'static,
{
    let state = ReadingRouterState { service, top_limit };

    Router::new()
        .route(
            "/api/water-quality/readings",
            get(list_handler::<S>).post(add_handler::<S>),
        )
        .route(
            "/api/water-quality/readings/location/:location_name",
            get(by_location_handler::<S>),
        )
        .route(
            "/api/water-quality/readings/:reading_id",
            get(reading_handler::<S>),
        )
        .route(
            "/api/water-quality/readings/:reading_id/safety",
            get(safety_handler::<S>),
        )
        .route(
            "/api/water-quality/readings/:reading_id/water-quality-score",
            get(quality_handler::<S>),
        )
        .route(
            "/api/water-quality/safety-analysis",
            get(safety_analysis_handler::<S>),
        )
        .route(
            "/api/water-quality/top-readings",
            get(top_readings_handler::<S>),
        )
        .route("/api/water-quality/history/all", get(history_handler::<S>))
        .route(
            "/api/water-quality/history/:location_name",
            get(location_history_handler::<S>),
        )
        .with_state(state)
}

pub(crate) async fn list_handler<S>(
    State(state): State<ReadingRouterState<S>>,
    Query(criteria): Query<FilterCriteria>,
) -> Response
where
    S: ReadingStore + 'static,
{
    match state.service.list(&criteria).await {
        Ok(readings) => (StatusCode::OK, Json(readings)).into_response(),
        Err(err) => failure_response(err),
    }
}

pub(crate) async fn reading_handler<S>(
    State(state): State<ReadingRouterState<S>>,
    Path(reading_id): Path<String>,
) -> Response
where
    S: ReadingStore + 'static,
{
    let id = ReadingId(reading_id);
    match state.service.get(&id).await {
        Ok(Some(reading)) => (StatusCode::OK, Json(reading)).into_response(),
        Ok(None) => not_found(&id),
        Err(err) => failure_response(err),
    }
}

pub(crate) async fn safety_handler<S>(
    State(state): State<ReadingRouterState<S>>,
    Path(reading_id): Path<String>,
) -> Response
where
    S: ReadingStore + 'static,
{
    let id = ReadingId(reading_id);
    match state.service.safety(&id).await {
        Ok(Some(flags)) => (StatusCode::OK, Json(flags)).into_response(),
        Ok(None) => not_found(&id),
        Err(err) => failure_response(err),
    }
}

pub(crate) async fn quality_handler<S>(
    State(state): State<ReadingRouterState<S>>,
    Path(reading_id): Path<String>,
) -> Response
where
    S: ReadingStore + 'static,
{
    let id = ReadingId(reading_id);
    match state.service.quality(&id).await {
        Ok(Some(report)) => (StatusCode::OK, Json(report)).into_response(),
        Ok(None) => not_found(&id),
        Err(err) => failure_response(err),
    }
}

pub(crate) async fn by_location_handler<S>(
    State(state): State<ReadingRouterState<S>>,
    Path(location_name): Path<String>,
) -> Response
where
    S: ReadingStore + 'static,
{
    match state.service.by_location(&location_name).await {
        Ok(readings) => (StatusCode::OK, Json(readings)).into_response(),
        Err(err) => failure_response(err),
    }
}

pub(crate) async fn safety_analysis_handler<S>(
    State(state): State<ReadingRouterState<S>>,
    Query(criteria): Query<FilterCriteria>,
) -> Response
where
    S: ReadingStore + 'static,
{
    match state.service.safety_analysis(&criteria).await {
        Ok(rows) => (StatusCode::OK, Json(rows)).into_response(),
        Err(err) => failure_response(err),
    }
}

pub(crate) async fn top_readings_handler<S>(
    State(state): State<ReadingRouterState<S>>,
    Query(query): Query<TopReadingsQuery>,
) -> Response
where
    S: ReadingStore + 'static,
{
    let limit = query.limit.unwrap_or(state.top_limit);
    match state.service.top_readings(limit).await {
        Ok(rows) => (StatusCode::OK, Json(rows)).into_response(),
        Err(err) => failure_response(err),
    }
}

pub(crate) async fn history_handler<S>(State(state): State<ReadingRouterState<S>>) -> Response
where
    S: ReadingStore + 'static,
{
    match state.service.history().await {
        Ok(readings) => (StatusCode::OK, Json(readings)).into_response(),
        Err(err) => failure_response(err),
    }
}

/// Unlike the location listing, an empty history answers 404.
pub(crate) async fn location_history_handler<S>(
    State(state): State<ReadingRouterState<S>>,
    Path(location_name): Path<String>,
) -> Response
where
    S: ReadingStore + 'static,
{
    match state.service.location_history(&location_name).await {
        Ok(readings) if readings.is_empty() => {
            let payload = json!({
                "error": format!("no history for location {location_name}"),
            });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        Ok(readings) => (StatusCode::OK, Json(readings)).into_response(),
        Err(err) => failure_response(err),
    }
}

pub(crate) async fn add_handler<S>(
    State(state): State<ReadingRouterState<S>>,
    Json(reading): Json<NewReading>,
) -> Response
where
    S: ReadingStore + 'static,
{
    match state.service.add_reading(reading).await {
        Ok(reading_id) => {
            let payload = json!({
                "status": "success",
                "readingId": reading_id,
            });
            (StatusCode::CREATED, Json(payload)).into_response()
        }
        Err(ReadingServiceError::Malformed(err)) => {
            let payload = json!({
                "status": "error",
                "message": err.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        Err(ReadingServiceError::Store(err)) => {
            error!(error = %err, "failed to add reading");
            let payload = json!({
                "status": "error",
                "message": "Failed to add reading",
            });
            (StatusCode::BAD_GATEWAY, Json(payload)).into_response()
        }
    }
}

fn not_found(reading_id: &ReadingId) -> Response {
    let payload = json!({
        "error": format!("reading {reading_id} not found"),
    });
    (StatusCode::NOT_FOUND, Json(payload)).into_response()
}

/// Upstream failures answer with a generic body; details only go to the log.
fn failure_response(err: ReadingServiceError) -> Response {
    match err {
        ReadingServiceError::Store(err) => {
            error!(error = %err, "reading store request failed");
            let payload = json!({ "error": "reading store unavailable" });
            (StatusCode::BAD_GATEWAY, Json(payload)).into_response()
        }
        ReadingServiceError::Malformed(err) => {
            error!(error = %err, "stored reading is malformed");
            let payload = json!({ "error": "stored reading is malformed" });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}
