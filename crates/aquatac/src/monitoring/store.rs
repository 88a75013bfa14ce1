use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::domain::{LocationTree, RawDocument, ReadingId};

/// Remote tree store holding location nodes and the readings pushed beneath them.
///
/// Each call is a single request/response round trip. Timeouts and retries belong to the
/// implementation.
#[async_trait]
pub trait ReadingStore: Send + Sync {
    /// One materialized copy of the whole tree.
    async fn snapshot(&self) -> Result<LocationTree, StoreError>;

    /// A single reading document, wherever it is stored.
    async fn fetch(&self, reading_id: &ReadingId) -> Result<Option<RawDocument>, StoreError>;

    /// Writes a document under `location_key` and returns the push key assigned to it.
    async fn push(
        &self,
        location_key: &str,
        document: RawDocument,
    ) -> Result<ReadingId, StoreError>;
}

/// Failure reported by the store collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store request cancelled")]
    Cancelled,
}

/// Process-local tree store. Push keys come from an atomic sequence, so keys sort in write order.
#[derive(Debug, Default, Clone)]
pub struct InMemoryReadingStore {
    tree: Arc<RwLock<LocationTree>>,
    sequence: Arc<AtomicU64>,
}

const PUSH_KEY_PREFIX: &str = "-R";

impl InMemoryReadingStore {
    /// Pushes continue after the highest push key already in `tree`.
    pub fn new(tree: LocationTree) -> Self {
        let next = next_sequence(&tree);
        Self {
            tree: Arc::new(RwLock::new(tree)),
            sequence: Arc::new(AtomicU64::new(next)),
        }
    }

    fn next_key(&self) -> ReadingId {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        ReadingId(format!("{PUSH_KEY_PREFIX}{sequence:016}"))
    }
}

fn next_sequence(tree: &LocationTree) -> u64 {
    tree.locations
        .iter()
        .flat_map(|node| node.readings.iter())
        .filter_map(|(key, _)| key.as_str().strip_prefix(PUSH_KEY_PREFIX))
        .filter_map(|digits| digits.parse::<u64>().ok())
        .max()
        .map_or(0, |highest| highest.saturating_add(1))
}

#[async_trait]
impl ReadingStore for InMemoryReadingStore {
    async fn snapshot(&self) -> Result<LocationTree, StoreError> {
        Ok(self.tree.read().await.clone())
    }

    async fn fetch(&self, reading_id: &ReadingId) -> Result<Option<RawDocument>, StoreError> {
        Ok(self.tree.read().await.find(reading_id).cloned())
    }

    async fn push(
        &self,
        location_key: &str,
        document: RawDocument,
    ) -> Result<ReadingId, StoreError> {
        let mut tree = self.tree.write().await;
        let key = self.next_key();
        tree.node_mut(location_key)
            .readings
            .push((key.clone(), document));
        Ok(key)
    }
}
