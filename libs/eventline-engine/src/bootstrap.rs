use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use eventline_api::change::ChangeNotification;
use eventline_api::metric::MetricsSink;
use eventline_api::record::LogRecord;

use crate::config::{EventlineConfig, MetricsConfig};
use crate::delivery::{DeliveryOptions, spawn_delivery};
use crate::error::EngineError;
use crate::ingress::Ingress;
use crate::journal::Journal;
use crate::log::EventLog;
use crate::metrics::{HttpMetricsSink, MemoryMetricsSink, TracingMetricsSink};
use crate::observer::{AuditEntry, Observer};
use crate::persister::Persister;
use crate::store::KeyedStore;

/// The running pipeline: log, store, stages and their delivery tasks.
///
/// Every service handle is constructed once here and injected into the
/// stages as a constructor parameter; nothing lives in global state.
pub struct Engine {
    log: Arc<EventLog>,
    store: Arc<KeyedStore>,
    ingress: Arc<Ingress>,
    audit: Arc<Journal<AuditEntry>>,
    record_dead_letters: Arc<Journal<LogRecord>>,
    change_dead_letters: Arc<Journal<ChangeNotification>>,
    tasks: Vec<JoinHandle<()>>,
    token: CancellationToken,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("stream", &self.log.name())
            .field("table", &self.store.name())
            .finish()
    }
}

impl Engine {
    /// Bootstrap the pipeline from a parsed configuration.
    ///
    /// Spawns one persister delivery task per log shard (parallel across
    /// partitions, sequential within) and one observer task on the change
    /// feed. Must be called inside a tokio runtime.
    pub fn bootstrap(config: &EventlineConfig) -> Result<Self, EngineError> {
        if config.stream.shards == 0 {
            return Err(EngineError::Config(
                "stream.shards must be at least 1".to_string(),
            ));
        }

        let metrics = create_metrics_sink(&config.metrics)?;
        let log = Arc::new(EventLog::new(
            config.stream.name.clone(),
            config.stream.shards,
        ));
        let store = Arc::new(KeyedStore::new(config.table.name.clone()));
        let ingress = Arc::new(Ingress::new(log.clone(), config.stream.name.clone()));
        let audit = Arc::new(Journal::new());
        let record_dead_letters = Arc::new(Journal::new());
        let change_dead_letters = Arc::new(Journal::new());

        let opts = DeliveryOptions {
            batch_size: config.delivery.batch_size,
            max_attempts: config.delivery.max_attempts,
            retry_delay: Duration::from_millis(config.delivery.retry_delay_ms),
        };
        let token = CancellationToken::new();
        let mut tasks = Vec::new();

        let persister = Arc::new(Persister::new(store.clone()));
        for shard in 0..log.shard_count() {
            tasks.push(spawn_delivery(
                format!("persister[{shard}]"),
                log.shard(shard),
                persister.clone(),
                record_dead_letters.clone(),
                opts,
                token.child_token(),
            ));
        }

        let observer = Arc::new(Observer::new(metrics, audit.clone()));
        tasks.push(spawn_delivery(
            "observer".to_string(),
            store.feed(),
            observer,
            change_dead_letters.clone(),
            opts,
            token.child_token(),
        ));

        tracing::info!(
            stream = %config.stream.name,
            shards = config.stream.shards,
            table = %config.table.name,
            metrics = %config.metrics.sink,
            "pipeline started"
        );

        Ok(Self {
            log,
            store,
            ingress,
            audit,
            record_dead_letters,
            change_dead_letters,
            tasks,
            token,
        })
    }

    pub fn log(&self) -> Arc<EventLog> {
        self.log.clone()
    }

    pub fn store(&self) -> Arc<KeyedStore> {
        self.store.clone()
    }

    pub fn ingress(&self) -> Arc<Ingress> {
        self.ingress.clone()
    }

    pub fn audit(&self) -> Arc<Journal<AuditEntry>> {
        self.audit.clone()
    }

    /// Log records that exhausted their redelivery budget in the persister.
    pub fn record_dead_letters(&self) -> Arc<Journal<LogRecord>> {
        self.record_dead_letters.clone()
    }

    /// Change notifications that exhausted their redelivery budget in the
    /// observer.
    pub fn change_dead_letters(&self) -> Arc<Journal<ChangeNotification>> {
        self.change_dead_letters.clone()
    }

    /// Graceful shutdown: cancel all delivery tasks and wait for them.
    pub async fn shutdown(self) {
        self.token.cancel();
        for task in self.tasks {
            let _ = task.await;
        }
        tracing::info!("engine shut down");
    }
}

fn create_metrics_sink(config: &MetricsConfig) -> Result<Arc<dyn MetricsSink>, EngineError> {
    match config.sink.as_str() {
        "log" => Ok(Arc::new(TracingMetricsSink)),
        "memory" => Ok(Arc::new(MemoryMetricsSink::new())),
        "http" => {
            let endpoint = config.endpoint.as_deref().ok_or_else(|| {
                EngineError::Config("metrics sink 'http' requires metrics.endpoint".to_string())
            })?;
            Ok(Arc::new(HttpMetricsSink::new(endpoint)))
        }
        other => Err(EngineError::Config(format!(
            "unknown metrics sink: '{other}'"
        ))),
    }
}
