use crate::domain::record::Batch;
use std::future::Future;

pub mod memory;
pub mod sql_script;

/// Trait which defines how a batch of records is written to a store in one bulk operation.
/// Implementations are cloned into every concurrently running insert task, so
/// connection pooling and retries live behind this trait.
pub trait BulkInsert: Clone + Send + Sync + 'static {
    fn insert_batch(&self, batch: Batch) -> impl Future<Output = anyhow::Result<()>> + Send;
}
