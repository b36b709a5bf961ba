use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// A record on the ordered log. `payload` is opaque bytes; the log never
/// interprets them. Records sharing a `partition_key` are delivered in
/// publish order; records with different keys have no relative order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Routes the record to a partition and therefore its ordering group.
    pub partition_key: String,
    /// Assigned by the log shard at append time.
    pub sequence: u64,
    /// Canonical serialization of the event.
    pub payload: Vec<u8>,
}

/// Publisher seam between the ingress stage and the ordered log.
pub trait RecordPublisher: Send + Sync {
    /// Publish one record; returns the record with its assigned sequence.
    fn publish(
        &self,
        partition_key: String,
        payload: Vec<u8>,
    ) -> Pin<Box<dyn Future<Output = Result<LogRecord, PipelineError>> + Send + '_>>;
}
