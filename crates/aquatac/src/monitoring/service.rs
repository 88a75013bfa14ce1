use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use serde_json::Value;
use tracing::{debug, warn};

use super::aggregation::{flatten_all, flatten_by_location, sort_by_timestamp_descending, top_n};
use super::domain::{
    location_key, LocationTree, NewReading, QualityReport, RawDocument, Reading, ReadingId,
    SafetyFlags, SafetySummary, TIMESTAMP_FORMAT,
};
use super::filter::{filter_readings, FilterCriteria};
use super::mapper::{
    insert_number, map_document, MalformedDocument, FIELD_DISSOLVED_OXYGEN, FIELD_ID,
    FIELD_LOCATION, FIELD_PH, FIELD_TEMPERATURE, FIELD_TIMESTAMP, FIELD_TURBIDITY,
};
use super::store::{ReadingStore, StoreError};

/// Query operations over the reading store. Each call fetches once, then evaluates the snapshot
/// synchronously; nothing is cached between calls.
pub struct ReadingQueryService<S> {
    store: Arc<S>,
}

impl<S> ReadingQueryService<S>
where
    S: ReadingStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Every reading, filtered, newest first.
    pub async fn list(
        &self,
        criteria: &FilterCriteria,
    ) -> Result<Vec<Reading>, ReadingServiceError> {
        let tree = self.snapshot().await?;
        let readings = filter_readings(flatten_all(&tree)?, criteria);
        Ok(sort_by_timestamp_descending(readings))
    }

    pub async fn get(
        &self,
        reading_id: &ReadingId,
    ) -> Result<Option<Reading>, ReadingServiceError> {
        let document = self.store.fetch(reading_id).await.map_err(|err| {
            warn!(%reading_id, error = %err, "reading fetch failed");
            err
        })?;

        match document {
            Some(document) => Ok(Some(map_document(&document, reading_id)?)),
            None => {
                debug!(%reading_id, "reading not found");
                Ok(None)
            }
        }
    }

    pub async fn safety(
        &self,
        reading_id: &ReadingId,
    ) -> Result<Option<SafetyFlags>, ReadingServiceError> {
        Ok(self.get(reading_id).await?.map(|reading| reading.safety()))
    }

    pub async fn quality(
        &self,
        reading_id: &ReadingId,
    ) -> Result<Option<QualityReport>, ReadingServiceError> {
        Ok(self.get(reading_id).await?.map(|reading| reading.quality_report()))
    }

    /// Readings recorded for `location_name`, matched case-insensitively, newest first.
    pub async fn by_location(
        &self,
        location_name: &str,
    ) -> Result<Vec<Reading>, ReadingServiceError> {
        let tree = self.snapshot().await?;
        Ok(flatten_by_location(&tree, location_name)?)
    }

    /// Physical bounds narrow the set first, derived safety/score bounds after classification.
    /// Rows keep store order.
    pub async fn safety_analysis(
        &self,
        criteria: &FilterCriteria,
    ) -> Result<Vec<SafetySummary>, ReadingServiceError> {
        let tree = self.snapshot().await?;
        let measured = filter_readings(flatten_all(&tree)?, &criteria.physical_only());
        let classified = filter_readings(measured, &criteria.derived_only());
        Ok(classified.iter().map(Reading::summary).collect())
    }

    pub async fn top_readings(
        &self,
        limit: usize,
    ) -> Result<Vec<SafetySummary>, ReadingServiceError> {
        let tree = self.snapshot().await?;
        let ranked = top_n(flatten_all(&tree)?, limit);
        Ok(ranked.iter().map(Reading::summary).collect())
    }

    /// Full history in store order: locations as stored, readings oldest-first within each.
    pub async fn history(&self) -> Result<Vec<Reading>, ReadingServiceError> {
        let tree = self.snapshot().await?;
        Ok(flatten_all(&tree)?)
    }

    pub async fn location_history(
        &self,
        location_name: &str,
    ) -> Result<Vec<Reading>, ReadingServiceError> {
        self.by_location(location_name).await
    }

    /// Validates and stores a new reading under its location node, returning the push key.
    pub async fn add_reading(
        &self,
        reading: NewReading,
    ) -> Result<ReadingId, ReadingServiceError> {
        let node_key = location_key(&reading.location);
        let document = build_document(reading)?;
        let reading_id = self.store.push(&node_key, document).await.map_err(|err| {
            warn!(location = %node_key, error = %err, "reading write failed");
            err
        })?;
        debug!(%reading_id, location = %node_key, "reading stored");
        Ok(reading_id)
    }

    async fn snapshot(&self) -> Result<LocationTree, ReadingServiceError> {
        let tree = self.store.snapshot().await.map_err(|err| {
            warn!(error = %err, "snapshot fetch failed");
            err
        })?;
        debug!(
            locations = tree.locations.len(),
            readings = tree.reading_count(),
            "snapshot fetched"
        );
        Ok(tree)
    }
}

fn build_document(reading: NewReading) -> Result<RawDocument, MalformedDocument> {
    let location = reading.location.trim();
    if location.is_empty() {
        return Err(MalformedDocument::payload(FIELD_LOCATION, "is required"));
    }

    let timestamp = match reading.timestamp.as_deref().map(str::trim) {
        None | Some("") => Local::now().format(TIMESTAMP_FORMAT).to_string(),
        Some(raw) => {
            NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT).map_err(|err| {
                MalformedDocument::payload(
                    FIELD_TIMESTAMP,
                    format!("'{raw}' is not yyyy-MM-dd HH:mm:ss ({err})"),
                )
            })?;
            raw.to_string()
        }
    };

    let mut document = RawDocument::new();
    document.insert(FIELD_LOCATION.to_string(), Value::String(location.to_string()));
    insert_number(&mut document, FIELD_TEMPERATURE, reading.temperature);
    insert_number(&mut document, FIELD_PH, reading.ph);
    insert_number(&mut document, FIELD_TURBIDITY, reading.turbidity);
    insert_number(&mut document, FIELD_DISSOLVED_OXYGEN, reading.dissolved_oxygen);
    document.insert(FIELD_TIMESTAMP.to_string(), Value::String(timestamp));
    if let Some(id) = reading.id {
        document.insert(FIELD_ID.to_string(), Value::Number(id.into()));
    }
    Ok(document)
}

/// Error raised by the reading query service.
#[derive(Debug, thiserror::Error)]
pub enum ReadingServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Malformed(#[from] MalformedDocument),
}
