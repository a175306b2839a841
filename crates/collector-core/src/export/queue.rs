//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Bounded send queue for the exporter delivery core
//!
//! Decouples the pipeline's consume path from endpoint latency: offers
//! enqueue without waiting, a worker drains the queue through the inner
//! exporter. Memory is bounded by the queue capacity; when full, offers
//! fail fast with a transient error. Shutdown stops intake, drains what
//! is already queued, and records precise drop counts.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::component::Host;
use crate::error::{CollectorError, CollectorResult};
use crate::metrics::record_items_dropped;
use crate::traits::{ConsumeContext, ExportError, ExportResult, TelemetryExporter};
use crate::types::TelemetryBatch;

/// Send queue configuration
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Maximum number of batches held in the queue
    pub capacity: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self { capacity: 512 }
    }
}

/// Queued front for an exporter.
///
/// `export` enqueues and returns; delivery outcomes surface through the
/// drop counter and internal metrics rather than the caller's result.
pub struct QueuedExporter {
    name: String,
    inner: Arc<dyn TelemetryExporter>,
    tx: Mutex<Option<mpsc::Sender<Arc<TelemetryBatch>>>>,
    rx: Mutex<Option<mpsc::Receiver<Arc<TelemetryBatch>>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    dropped: Arc<AtomicU64>,
}

impl QueuedExporter {
    /// Wrap an exporter behind a bounded queue
    pub fn new(config: QueueConfig, inner: Arc<dyn TelemetryExporter>) -> Self {
        let (tx, rx) = mpsc::channel(config.capacity);
        Self {
            name: inner.name().to_string(),
            inner,
            tx: Mutex::new(Some(tx)),
            rx: Mutex::new(Some(rx)),
            worker: Mutex::new(None),
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Items dropped by the drain worker so far
    pub fn dropped_items(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl TelemetryExporter for QueuedExporter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&self, host: Arc<dyn Host>) -> CollectorResult<()> {
        self.inner.start(host).await?;

        let mut rx = self
            .rx
            .lock()
            .await
            .take()
            .ok_or_else(|| CollectorError::start(format!("queue for {} already started", self.name)))?;

        let inner = Arc::clone(&self.inner);
        let dropped = Arc::clone(&self.dropped);
        let name = self.name.clone();

        let worker = tokio::spawn(async move {
            while let Some(batch) = rx.recv().await {
                let items = batch.item_count();
                if let Err(e) = inner.export(&ConsumeContext::background(), batch).await {
                    warn!(
                        exporter = %name,
                        error = %e,
                        items,
                        "queued send failed, items dropped"
                    );
                    dropped.fetch_add(e.dropped as u64, Ordering::Relaxed);
                    record_items_dropped(&name, e.dropped as u64);
                }
            }
        });
        *self.worker.lock().await = Some(worker);

        Ok(())
    }

    async fn export(
        &self,
        _cx: &ConsumeContext,
        batch: Arc<TelemetryBatch>,
    ) -> Result<ExportResult, ExportError> {
        let items = batch.item_count();

        let guard = self.tx.lock().await;
        let Some(tx) = guard.as_ref() else {
            return Err(ExportError::new(
                items,
                CollectorError::stopped(format!("exporter {} stopped", self.name)),
            ));
        };

        match tx.try_send(batch) {
            Ok(()) => Ok(ExportResult::delivered(items, 0)),
            Err(mpsc::error::TrySendError::Full(_)) => Err(ExportError::transient(
                items,
                format!("send queue for {} is full", self.name),
            )),
            Err(mpsc::error::TrySendError::Closed(_)) => Err(ExportError::new(
                items,
                CollectorError::stopped(format!("exporter {} stopped", self.name)),
            )),
        }
    }

    async fn shutdown(&self) -> CollectorResult<()> {
        // Stop intake; the worker drains whatever is already queued.
        self.tx.lock().await.take();

        if let Some(worker) = self.worker.lock().await.take() {
            if let Err(e) = worker.await {
                warn!(exporter = %self.name, error = %e, "queue worker panicked");
            }
        }

        let dropped = self.dropped.load(Ordering::Relaxed);
        if dropped > 0 {
            info!(
                exporter = %self.name,
                dropped,
                "exporter queue shut down with dropped items"
            );
        }

        self.inner.shutdown().await
    }
}
