use std::sync::Arc;

use eventline_api::error::PipelineError;
use eventline_api::event::Event;
use eventline_api::record::{LogRecord, RecordPublisher};

/// Ingress stage: validates an inbound request body and publishes exactly
/// one record to the ordered log, keyed by the event id.
pub struct Ingress {
    publisher: Arc<dyn RecordPublisher>,
    stream_name: String,
}

impl Ingress {
    pub fn new(publisher: Arc<dyn RecordPublisher>, stream_name: impl Into<String>) -> Self {
        Self {
            publisher,
            stream_name: stream_name.into(),
        }
    }

    /// Decode → validate → publish. On any failure before the publish call,
    /// zero records are published. Publish failures are retryable by the
    /// caller: downstream persistence is idempotent on the event id.
    pub async fn accept(&self, body: &[u8]) -> Result<LogRecord, PipelineError> {
        let event: Event = serde_json::from_slice(body).map_err(|e| {
            PipelineError::validation(format!("failed to decode request body: {e}"))
        })?;
        event.validate()?;

        // Canonical serialization, the payload carried on the log.
        let payload = serde_json::to_vec(&event)
            .map_err(|e| PipelineError::downstream(format!("failed to serialize payload: {e}")))?;

        let record = self
            .publisher
            .publish(event.id.clone(), payload)
            .await
            .map_err(|e| {
                e.with_context(format!(
                    "failed to publish record to stream '{}'",
                    self.stream_name
                ))
            })?;

        tracing::info!(id = %event.id, sequence = record.sequence, "event accepted");
        Ok(record)
    }
}
