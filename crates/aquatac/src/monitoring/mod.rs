//! Water-quality evaluation and reading queries.
//!
//! Raw documents from the reading store are mapped into [`Reading`] values, which carry the
//! composite quality score and swim/fish safety flags derived at construction. Filtering and
//! aggregation operate on those values; [`ReadingQueryService`] composes them per request and
//! [`reading_router`] exposes the service over HTTP.

pub mod aggregation;
pub mod domain;
pub mod filter;
pub mod import;
pub mod mapper;
pub mod router;
pub mod safety;
pub mod scoring;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use domain::{
    location_key, LocationNode, LocationTree, NewReading, QualityReport, RawDocument, Reading,
    ReadingId, SafetyFlags, SafetySummary, WaterSample, TIMESTAMP_FORMAT,
};
pub use filter::{filter_readings, FilterCriteria};
pub use import::{ImportError, SnapshotImporter};
pub use mapper::{map_document, MalformedDocument};
pub use router::{reading_router, ReadingRouterState, DEFAULT_TOP_LIMIT};
pub use scoring::{quality_score, QualityLevel};
pub use service::{ReadingQueryService, ReadingServiceError};
pub use store::{InMemoryReadingStore, ReadingStore, StoreError};
