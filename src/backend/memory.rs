use crate::backend::BulkInsert;
use crate::domain::record::{Batch, Record};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::trace;

/// Keeps inserted rows in a shared vector. Clones share the same rows.
#[derive(Clone, Default)]
pub struct InMemoryTable {
    rows: Arc<Mutex<Vec<Record>>>,
    latency: Option<Duration>,
}

impl InMemoryTable {
    pub fn new() -> Self {
        InMemoryTable::default()
    }

    /// Sleeps for `latency` on every insert to mimic a round trip to a store.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub async fn len(&self) -> usize {
        self.rows.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.lock().await.is_empty()
    }

    pub async fn rows(&self) -> Vec<Record> {
        self.rows.lock().await.clone()
    }
}

impl BulkInsert for InMemoryTable {
    async fn insert_batch(&self, batch: Batch) -> anyhow::Result<()> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        trace!("inserting {} rows", batch.len());
        self.rows.lock().await.extend(batch);
        Ok(())
    }
}
