use aquatac::error::AppError;
use aquatac::monitoring::{InMemoryReadingStore, LocationTree, SnapshotImporter};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Loads the snapshot at `path` into a fresh in-memory store, or an empty store without one.
pub(crate) fn seeded_store(path: Option<&Path>) -> Result<InMemoryReadingStore, AppError> {
    let Some(path) = path else {
        return Ok(InMemoryReadingStore::default());
    };

    let tree = load_snapshot(path)?;
    info!(
        path = %path.display(),
        locations = tree.locations.len(),
        readings = tree.reading_count(),
        "reading store seeded"
    );
    Ok(InMemoryReadingStore::new(tree))
}

pub(crate) fn load_snapshot(path: &Path) -> Result<LocationTree, AppError> {
    Ok(SnapshotImporter::from_path(path)?)
}
