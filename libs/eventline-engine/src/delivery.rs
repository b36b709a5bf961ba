use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use eventline_api::error::{ErrorKind, PipelineError};

use crate::journal::Journal;

/// One stage's per-record entry point, driven by a delivery task.
pub trait RecordHandler<T>: Send + Sync {
    fn handle(
        &self,
        record: &T,
    ) -> Pin<Box<dyn Future<Output = Result<(), PipelineError>> + Send + '_>>;
}

#[derive(Debug, Clone, Copy)]
pub struct DeliveryOptions {
    /// How many records to read per batch.
    pub batch_size: usize,
    /// Redelivery budget for Decode/Extraction failures before the record
    /// is dead-lettered.
    pub max_attempts: u32,
    /// Pause before redelivering a failed record.
    pub retry_delay: Duration,
}

impl Default for DeliveryOptions {
    fn default() -> Self {
        Self {
            batch_size: 32,
            max_attempts: 5,
            retry_delay: Duration::from_millis(500),
        }
    }
}

/// Drive a handler over a journal with at-least-once, in-order delivery and
/// per-record acknowledgment.
///
/// A record that keeps failing decode/extraction is redelivered up to
/// `max_attempts` times and then moved to the dead-letter journal so it
/// never blocks its partition. Downstream failures are retried indefinitely
/// with a delay; the handlers are idempotent, so re-application is safe.
pub fn spawn_delivery<T>(
    name: String,
    journal: Arc<Journal<T>>,
    handler: Arc<dyn RecordHandler<T>>,
    dead_letter: Arc<Journal<T>>,
    opts: DeliveryOptions,
    token: CancellationToken,
) -> JoinHandle<()>
where
    T: Clone + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut notify_rx = journal.subscribe_notify();
        let mut offset: u64 = 0;
        // Consecutive failures of the record currently at `offset`.
        let mut attempts: u32 = 0;

        'deliver: loop {
            let batch = journal.read_from(offset, opts.batch_size);
            if batch.is_empty() {
                tokio::select! {
                    result = notify_rx.recv() => {
                        // Lagged just means we re-read from our own offset.
                        if matches!(result, Err(broadcast::error::RecvError::Closed)) {
                            break 'deliver;
                        }
                    }
                    _ = token.cancelled() => break 'deliver,
                }
                continue;
            }

            for record in &batch {
                if token.is_cancelled() {
                    break 'deliver;
                }

                match handler.handle(record).await {
                    Ok(()) => {
                        offset += 1;
                        attempts = 0;
                    }
                    Err(e) if matches!(e.kind(), ErrorKind::Decode | ErrorKind::Extraction) => {
                        attempts += 1;
                        if attempts >= opts.max_attempts {
                            tracing::error!(
                                task = %name,
                                offset,
                                attempts,
                                error = %e,
                                "record exhausted its redelivery budget, dead-lettering"
                            );
                            dead_letter.append(record.clone());
                            offset += 1;
                            attempts = 0;
                            continue;
                        }
                        tracing::warn!(
                            task = %name,
                            offset,
                            attempt = attempts,
                            error = %e,
                            "record failed, redelivering"
                        );
                        tokio::select! {
                            _ = tokio::time::sleep(opts.retry_delay) => {}
                            _ = token.cancelled() => break 'deliver,
                        }
                        continue 'deliver;
                    }
                    Err(e) => {
                        tracing::error!(task = %name, offset, error = %e, "downstream failure, retrying");
                        tokio::select! {
                            _ = tokio::time::sleep(opts.retry_delay) => {}
                            _ = token.cancelled() => break 'deliver,
                        }
                        continue 'deliver;
                    }
                }
            }
        }

        tracing::info!(task = %name, "stopped");
    })
}
