use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use eventline_api::error::PipelineError;
use eventline_api::metric::{LatencyMetric, MetricsSink};

/// Default sink: one structured log line per datum.
pub struct TracingMetricsSink;

impl MetricsSink for TracingMetricsSink {
    fn emit(
        &self,
        metric: LatencyMetric,
    ) -> Pin<Box<dyn Future<Output = Result<(), PipelineError>> + Send + '_>> {
        Box::pin(async move {
            tracing::info!(
                namespace = %metric.namespace,
                metric = %metric.name,
                unit = %metric.unit,
                value = metric.value,
                "metric datum"
            );
            Ok(())
        })
    }
}

/// Push sink: POSTs each datum as JSON to the configured alternate endpoint.
pub struct HttpMetricsSink {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpMetricsSink {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

impl MetricsSink for HttpMetricsSink {
    fn emit(
        &self,
        metric: LatencyMetric,
    ) -> Pin<Box<dyn Future<Output = Result<(), PipelineError>> + Send + '_>> {
        Box::pin(async move {
            let response = self
                .client
                .post(&self.endpoint)
                .json(&metric)
                .send()
                .await
                .map_err(|e| PipelineError::metric(format!("post {}: {e}", self.endpoint)))?;
            if !response.status().is_success() {
                return Err(PipelineError::metric(format!(
                    "{} returned {}",
                    self.endpoint,
                    response.status()
                )));
            }
            Ok(())
        })
    }
}

/// Buffering sink with a failure switch. Used by tests and available as the
/// `memory` config option.
#[derive(Default)]
pub struct MemoryMetricsSink {
    emitted: Mutex<Vec<LatencyMetric>>,
    failing: AtomicBool,
}

impl MemoryMetricsSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emitted(&self) -> Vec<LatencyMetric> {
        self.emitted
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl MetricsSink for MemoryMetricsSink {
    fn emit(
        &self,
        metric: LatencyMetric,
    ) -> Pin<Box<dyn Future<Output = Result<(), PipelineError>> + Send + '_>> {
        Box::pin(async move {
            if self.failing.load(Ordering::SeqCst) {
                return Err(PipelineError::metric("sink unavailable"));
            }
            self.emitted
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .push(metric);
            Ok(())
        })
    }
}
