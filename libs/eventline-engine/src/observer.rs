use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use eventline_api::change::ChangeNotification;
use eventline_api::error::PipelineError;
use eventline_api::event::StoredItem;
use eventline_api::metric::{LatencyMetric, MetricsSink};
use eventline_api::now_secs;

use crate::delivery::RecordHandler;
use crate::journal::Journal;

/// Which image an audit entry was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditTag {
    Old,
    New,
}

impl AuditTag {
    pub fn as_str(self) -> &'static str {
        match self {
            AuditTag::Old => "old",
            AuditTag::New => "new",
        }
    }
}

/// One audit line per image present on a change notification.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEntry {
    pub tag: AuditTag,
    pub item: StoredItem,
}

/// Observer stage: extracts before/after images from change notifications,
/// records them to the audit journal, and emits the end-to-end latency
/// metric derived from the new image.
pub struct Observer {
    metrics: Arc<dyn MetricsSink>,
    audit: Arc<Journal<AuditEntry>>,
    clock: fn() -> i64,
}

impl Observer {
    pub fn new(metrics: Arc<dyn MetricsSink>, audit: Arc<Journal<AuditEntry>>) -> Self {
        Self::with_clock(metrics, audit, now_secs)
    }

    pub fn with_clock(
        metrics: Arc<dyn MetricsSink>,
        audit: Arc<Journal<AuditEntry>>,
        clock: fn() -> i64,
    ) -> Self {
        Self {
            metrics,
            audit,
            clock,
        }
    }

    pub async fn observe(&self, notification: &ChangeNotification) -> Result<(), PipelineError> {
        if let Some(image) = &notification.new_image {
            let item = image.extract()?;
            self.record_audit(AuditTag::New, &item);

            // Whole seconds, UTC, no clamping: the value may be negative if
            // clocks disagree.
            let latency = (self.clock)() - item.timestamp;
            if let Err(e) = self.metrics.emit(LatencyMetric::latency(latency)).await {
                // Latency reporting is best-effort: the only failure in the
                // pipeline that is deliberately swallowed.
                tracing::warn!(id = %item.id, error = %e, "failed to emit latency metric");
            }
        }

        if let Some(image) = &notification.old_image {
            let item = image.extract()?;
            self.record_audit(AuditTag::Old, &item);
        }

        Ok(())
    }

    fn record_audit(&self, tag: AuditTag, item: &StoredItem) {
        tracing::info!(
            tag = tag.as_str(),
            id = %item.id,
            message = %item.message,
            timestamp = item.timestamp,
            "observed image"
        );
        self.audit.append(AuditEntry {
            tag,
            item: item.clone(),
        });
    }
}

impl RecordHandler<ChangeNotification> for Observer {
    fn handle(
        &self,
        record: &ChangeNotification,
    ) -> Pin<Box<dyn Future<Output = Result<(), PipelineError>> + Send + '_>> {
        let record = record.clone();
        Box::pin(async move { self.observe(&record).await })
    }
}
