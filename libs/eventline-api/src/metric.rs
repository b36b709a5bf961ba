use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Fixed namespace for the pipeline latency metric.
pub const METRIC_NAMESPACE: &str = "eventline/pipeline";
/// Fixed metric name.
pub const METRIC_NAME: &str = "Latency";
/// The unit is a plain count, not a time unit. Consuming dashboards depend
/// on this, so it stays a count even though the value is seconds.
pub const METRIC_UNIT: &str = "Count";

/// One scalar latency datum, derived from a change-feed `new_image`.
/// Never persisted by the pipeline itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencyMetric {
    pub namespace: String,
    pub name: String,
    pub unit: String,
    /// `observation time − event origin timestamp`, whole seconds.
    /// May be negative if clocks disagree; no clamping.
    pub value: i64,
}

impl LatencyMetric {
    pub fn latency(value: i64) -> Self {
        Self {
            namespace: METRIC_NAMESPACE.to_string(),
            name: METRIC_NAME.to_string(),
            unit: METRIC_UNIT.to_string(),
            value,
        }
    }
}

/// Metrics sink seam. Emission is best-effort: callers log failures and
/// keep going.
pub trait MetricsSink: Send + Sync {
    fn emit(
        &self,
        metric: LatencyMetric,
    ) -> Pin<Box<dyn Future<Output = Result<(), PipelineError>> + Send + '_>>;
}
