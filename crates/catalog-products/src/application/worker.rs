//! Background propagation from the event store to the read model.
//!
//! The worker polls the global commit log from its checkpoint, projects each
//! event, and only then advances the checkpoint. A crash between the two
//! re-delivers the event on the next run, which the projector ignores.

use std::sync::Arc;
use std::time::Duration;

use catalog_core::repository::EventRepository;
use tokio::sync::{Mutex, Notify, watch};
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::projection::{Applied, ProductProjector, ProjectionError};

/// Polling parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerConfig {
    /// Sleep between polls when nothing nudges the worker.
    pub poll_interval: Duration,
    /// Maximum events fetched per round trip.
    pub batch_size: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            batch_size: 256,
        }
    }
}

/// Keeps a read model in step with the event store.
pub struct ProjectionWorker {
    events: Arc<dyn EventRepository>,
    projector: ProductProjector,
    config: WorkerConfig,
    /// Position of the last event projected; also serializes batches.
    checkpoint: Mutex<i64>,
    wake: Arc<Notify>,
}

impl ProjectionWorker {
    /// Creates a worker starting from the beginning of the log.
    #[must_use]
    pub fn new(
        events: Arc<dyn EventRepository>,
        projector: ProductProjector,
        config: WorkerConfig,
    ) -> Self {
        Self {
            events,
            projector,
            config,
            checkpoint: Mutex::new(0),
            wake: Arc::new(Notify::new()),
        }
    }

    /// Handle that wakes the worker before its next poll is due.
    #[must_use]
    pub fn waker(&self) -> Arc<Notify> {
        Arc::clone(&self.wake)
    }

    /// Position of the last projected event.
    pub async fn checkpoint(&self) -> i64 {
        *self.checkpoint.lock().await
    }

    /// Projects every event committed so far and returns how many changed
    /// the read model.
    ///
    /// # Errors
    ///
    /// Returns the first error that could not be repaired; the checkpoint
    /// stays at the last successfully projected event.
    #[instrument(skip(self))]
    pub async fn catch_up(&self) -> Result<usize, ProjectionError> {
        let mut checkpoint = self.checkpoint.lock().await;
        let mut updated = 0;
        loop {
            let batch = self
                .events
                .load_committed_after(*checkpoint, self.config.batch_size)
                .await?;
            if batch.is_empty() {
                return Ok(updated);
            }
            for committed in batch {
                let applied = match self.projector.apply(&committed.event).await {
                    Err(ProjectionError::SequenceGap { product_id, .. }) => {
                        self.repair(product_id).await?;
                        self.projector.apply(&committed.event).await?
                    }
                    other => other?,
                };
                if applied == Applied::Updated {
                    updated += 1;
                }
                *checkpoint = committed.position;
            }
        }
    }

    /// Replays one product's full stream so a gapped view catches up.
    async fn repair(&self, product_id: Uuid) -> Result<(), ProjectionError> {
        warn!(%product_id, "sequence gap in read model, replaying stream");
        for stored in self.events.load_events(product_id).await? {
            self.projector.apply(&stored).await?;
        }
        Ok(())
    }

    /// Runs until `shutdown` flips to `true` or its sender is dropped.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        info!(
            poll_interval = ?self.config.poll_interval,
            batch_size = self.config.batch_size,
            "projection worker started"
        );
        loop {
            if let Err(err) = self.catch_up().await {
                warn!(error = %err, "projection batch failed, will retry on next poll");
            }
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                () = self.wake.notified() => {}
                () = tokio::time::sleep(self.config.poll_interval) => {}
            }
        }
        info!("projection worker stopped");
    }

    /// Spawns `run` on the current Tokio runtime.
    #[must_use]
    pub fn spawn(self: Arc<Self>, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }
}
