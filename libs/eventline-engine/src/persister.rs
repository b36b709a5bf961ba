use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use eventline_api::error::PipelineError;
use eventline_api::event::{Event, StoredItem};
use eventline_api::record::LogRecord;

use crate::delivery::RecordHandler;
use crate::store::KeyedStore;

/// Persister stage: decodes a delivered log record and upserts it into the
/// keyed store. Idempotent per id; retries belong to the delivery loop.
pub struct Persister {
    store: Arc<KeyedStore>,
}

impl Persister {
    pub fn new(store: Arc<KeyedStore>) -> Self {
        Self { store }
    }

    pub fn apply(&self, record: &LogRecord) -> Result<StoredItem, PipelineError> {
        let event: Event = serde_json::from_slice(&record.payload).map_err(|e| {
            PipelineError::decode(format!(
                "record {}/{}: {e}",
                record.partition_key, record.sequence
            ))
        })?;
        // A log payload failing field validation is a malformed internal
        // record, not client input.
        event
            .validate()
            .map_err(|e| PipelineError::decode(e.message))?;

        let item = StoredItem::from(event);
        tracing::debug!(id = %item.id, sequence = record.sequence, "persisting item");
        self.store.upsert(item.clone());
        Ok(item)
    }
}

impl RecordHandler<LogRecord> for Persister {
    fn handle(
        &self,
        record: &LogRecord,
    ) -> Pin<Box<dyn Future<Output = Result<(), PipelineError>> + Send + '_>> {
        let result = self.apply(record).map(|_| ());
        Box::pin(async move { result })
    }
}
