use std::sync::Arc;

use async_trait::async_trait;
use axum::response::Response;
use serde_json::{json, Value};

use crate::monitoring::domain::{
    LocationNode, LocationTree, RawDocument, Reading, ReadingId, WaterSample,
};
use crate::monitoring::store::{InMemoryReadingStore, ReadingStore, StoreError};
use crate::monitoring::{reading_router, ReadingQueryService, DEFAULT_TOP_LIMIT};

pub(super) fn document(value: Value) -> RawDocument {
    match value {
        Value::Object(map) => map,
        other => panic!("fixture must be an object, got {other}"),
    }
}

pub(super) fn id(raw: &str) -> ReadingId {
    ReadingId(raw.to_string())
}

/// Two location nodes; the last reading names "lakeview" but is stored under `river_bend`.
pub(super) fn sample_tree() -> LocationTree {
    LocationTree {
        locations: vec![
            LocationNode {
                key: "lakeview".to_string(),
                readings: vec![
                    (
                        id("-K001"),
                        document(json!({
                            "location": "Lakeview",
                            "temperature": 20.0,
                            "ph": 7.5,
                            "turbidity": 2.0,
                            "dissolved_oxygen": 9.0,
                            "timestamp": "2024-05-01 08:00:00",
                            "id": 1
                        })),
                    ),
                    (
                        id("-K002"),
                        document(json!({
                            "location": "Lakeview",
                            "temperature": 25.0,
                            "ph": 9.5,
                            "turbidity": 15.0,
                            "dissolved_oxygen": 3.0,
                            "timestamp": "2024-05-03 08:00:00"
                        })),
                    ),
                ],
            },
            LocationNode {
                key: "river_bend".to_string(),
                readings: vec![
                    (
                        id("-K003"),
                        document(json!({
                            "location": "River Bend",
                            "temperature": 16.0,
                            "ph": 7.0,
                            "turbidity": 8.0,
                            "dissolved_oxygen": 6.0,
                            "timestamp": "2024-05-02 09:30:00"
                        })),
                    ),
                    (
                        id("-K004"),
                        document(json!({
                            "location": "lakeview",
                            "temperature": null,
                            "ph": 7.2,
                            "turbidity": 3.0,
                            "dissolved_oxygen": 8.5,
                            "timestamp": "2024-05-04 10:00:00"
                        })),
                    ),
                ],
            },
        ],
    }
}

pub(super) fn reading(raw_id: &str, sample: WaterSample, timestamp: &str) -> Reading {
    Reading::new(id(raw_id), "Lakeview", sample, timestamp, None)
}

pub(super) fn ideal_sample() -> WaterSample {
    WaterSample::new(Some(20.0), Some(7.5), Some(2.0), Some(9.0))
}

pub(super) fn ids(readings: &[Reading]) -> Vec<&str> {
    readings
        .iter()
        .map(|reading| reading.reading_id().as_str())
        .collect()
}

pub(super) fn build_service() -> (
    ReadingQueryService<InMemoryReadingStore>,
    Arc<InMemoryReadingStore>,
) {
    let store = Arc::new(InMemoryReadingStore::new(sample_tree()));
    let service = ReadingQueryService::new(store.clone());
    (service, store)
}

pub(super) fn router_with_sample_tree() -> axum::Router {
    let (service, _) = build_service();
    reading_router(Arc::new(service), DEFAULT_TOP_LIMIT)
}

pub(super) struct UnavailableStore;

#[async_trait]
impl ReadingStore for UnavailableStore {
    async fn snapshot(&self) -> Result<LocationTree, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn fetch(&self, _reading_id: &ReadingId) -> Result<Option<RawDocument>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn push(
        &self,
        _location_key: &str,
        _document: RawDocument,
    ) -> Result<ReadingId, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

pub(super) struct CancelledStore;

#[async_trait]
impl ReadingStore for CancelledStore {
    async fn snapshot(&self) -> Result<LocationTree, StoreError> {
        Err(StoreError::Cancelled)
    }

    async fn fetch(&self, _reading_id: &ReadingId) -> Result<Option<RawDocument>, StoreError> {
        Err(StoreError::Cancelled)
    }

    async fn push(
        &self,
        _location_key: &str,
        _document: RawDocument,
    ) -> Result<ReadingId, StoreError> {
        Err(StoreError::Cancelled)
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
