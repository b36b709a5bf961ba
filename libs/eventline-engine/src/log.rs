use std::future::Future;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::pin::Pin;
use std::sync::Arc;

use eventline_api::error::PipelineError;
use eventline_api::record::{LogRecord, RecordPublisher};

use crate::journal::Journal;

/// Named, sharded ordered log.
///
/// The partition key routes a record to a shard; within a shard delivery is
/// strict FIFO, across shards there is no relative ordering. Sequence
/// numbers are per shard and assigned at append time.
pub struct EventLog {
    name: String,
    shards: Vec<Arc<Journal<LogRecord>>>,
}

impl EventLog {
    pub fn new(name: impl Into<String>, shard_count: usize) -> Self {
        let shards = (0..shard_count.max(1))
            .map(|_| Arc::new(Journal::new()))
            .collect();
        Self {
            name: name.into(),
            shards,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    pub fn shard(&self, index: usize) -> Arc<Journal<LogRecord>> {
        self.shards[index].clone()
    }

    /// Which shard a partition key routes to.
    pub fn shard_for(&self, partition_key: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        partition_key.hash(&mut hasher);
        (hasher.finish() % self.shards.len() as u64) as usize
    }

    /// Append one record to the shard owned by its partition key.
    pub fn append(&self, partition_key: String, payload: Vec<u8>) -> LogRecord {
        let shard = &self.shards[self.shard_for(&partition_key)];
        shard.append_with(move |sequence| LogRecord {
            partition_key,
            sequence,
            payload,
        })
    }
}

impl RecordPublisher for EventLog {
    fn publish(
        &self,
        partition_key: String,
        payload: Vec<u8>,
    ) -> Pin<Box<dyn Future<Output = Result<LogRecord, PipelineError>> + Send + '_>> {
        Box::pin(async move { Ok(self.append(partition_key, payload)) })
    }
}
