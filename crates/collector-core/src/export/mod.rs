//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Exporter delivery core for the rheo collector
//!
//! This module provides the machinery shared by every endpoint-backed
//! exporter: a connection manager with background reconnection, a retry
//! loop with server-directed throttling, and an optional bounded send
//! queue. Wire-protocol clients plug in through the `ExportChannel`
//! contract and inherit the full delivery behavior.

pub mod connection;
pub mod mock;
pub mod queue;
pub mod retry;
pub mod status;

// Re-export commonly used types
pub use connection::{ConnectionManager, ConnectionState, ReconnectConfig};
pub use queue::{QueueConfig, QueuedExporter};
pub use retry::{BackoffSchedule, RetryConfig};
pub use status::{SendCode, SendFailure};

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::component::Host;
use crate::error::{CollectorError, CollectorResult};
use crate::metrics::record_send_attempt;
use crate::traits::{ConsumeContext, ExportError, ExportResult, ExporterStats, TelemetryExporter};
use crate::types::TelemetryBatch;

/// One send attempt over an established logical connection.
///
/// Implementations wrap the actual wire client (gRPC, HTTP, ...). The
/// delivery core owns classification, retries, throttling, and drop
/// accounting; the channel only connects and sends.
#[async_trait]
pub trait ExportChannel: Send + Sync {
    /// Establish the logical connection to the endpoint.
    async fn connect(&self) -> CollectorResult<()>;

    /// Perform one send attempt. Classification of the failure drives the
    /// retry loop.
    async fn send(&self, batch: &TelemetryBatch) -> Result<(), SendFailure>;
}

/// Delivery core configuration
#[derive(Debug, Clone)]
pub struct DeliveryConfig {
    /// Exporter name for logs and metrics
    pub name: String,

    /// Retry schedule for the send path
    pub retry: RetryConfig,

    /// Reconnect schedule for the background connection worker
    pub reconnect: ReconnectConfig,
}

impl DeliveryConfig {
    /// Configuration with default retry and reconnect schedules
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            retry: RetryConfig::default(),
            reconnect: ReconnectConfig::default(),
        }
    }
}

/// Endpoint-backed exporter built around an `ExportChannel`.
///
/// Start attempts an eager connection but never blocks on its success;
/// the component counts as started once the background connection worker
/// is scheduled. The send path refuses batches while disconnected and
/// otherwise drives the retry loop until success, a fatal code, budget
/// exhaustion, cancellation, or stop.
pub struct DeliveryCore {
    name: String,
    channel: Arc<dyn ExportChannel>,
    connection: Arc<ConnectionManager>,
    retry: RetryConfig,
    stop: CancellationToken,
    stats: Arc<RwLock<ExporterStats>>,
}

impl DeliveryCore {
    /// Create a delivery core over the given channel
    pub fn new(config: DeliveryConfig, channel: Arc<dyn ExportChannel>) -> Self {
        let connection = Arc::new(ConnectionManager::new(
            config.name.clone(),
            Arc::clone(&channel),
            config.reconnect,
        ));

        Self {
            name: config.name,
            channel,
            connection,
            retry: config.retry,
            stop: CancellationToken::new(),
            stats: Arc::new(RwLock::new(ExporterStats::default())),
        }
    }

    /// Current connection state
    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    /// Exporter statistics snapshot
    pub async fn stats(&self) -> ExporterStats {
        self.stats.read().await.clone()
    }

    async fn record_success(&self, items: usize) {
        let mut stats = self.stats.write().await;
        stats.total_batches += 1;
        stats.total_records += items as u64;
        stats.last_export_time = Some(chrono::Utc::now());
    }

    async fn record_failure(&self, dropped: usize) {
        let mut stats = self.stats.write().await;
        stats.total_batches += 1;
        stats.dropped_records += dropped as u64;
        stats.error_count += 1;
        stats.last_export_time = Some(chrono::Utc::now());
    }
}

#[async_trait]
impl TelemetryExporter for DeliveryCore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&self, host: Arc<dyn Host>) -> CollectorResult<()> {
        self.connection.start(host).await
    }

    async fn export(
        &self,
        cx: &ConsumeContext,
        batch: Arc<TelemetryBatch>,
    ) -> Result<ExportResult, ExportError> {
        let items = batch.item_count();
        let started = Instant::now();

        if !self.connection.is_connected() {
            self.record_failure(items).await;
            return Err(ExportError::transient(
                items,
                format!("exporter {} is disconnected", self.name),
            ));
        }

        let mut backoff = BackoffSchedule::new(&self.retry);

        loop {
            record_send_attempt(&self.name);

            let failure = match self.channel.send(batch.as_ref()).await {
                Ok(()) => {
                    self.record_success(items).await;
                    return Ok(ExportResult::delivered(
                        items,
                        started.elapsed().as_millis() as u64,
                    ));
                }
                Err(failure) => failure,
            };

            if failure.code.is_ok() {
                // An OK-like non-error status is still success.
                self.record_success(items).await;
                return Ok(ExportResult::delivered(
                    items,
                    started.elapsed().as_millis() as u64,
                ));
            }

            if !failure.code.is_retryable() {
                warn!(
                    exporter = %self.name,
                    code = ?failure.code,
                    "fatal error sending to server, dropping batch"
                );
                self.record_failure(items).await;
                return Err(ExportError::new(
                    items,
                    CollectorError::permanent_with_source(
                        format!("fatal error sending to {}", self.name),
                        failure,
                    ),
                ));
            }

            self.connection.observe_send_failure(&failure);

            // A structured throttle hint from the server overrides the
            // backoff schedule.
            let wait = match failure.throttle_hint {
                Some(hint) => Some(hint),
                None => backoff.next_interval(),
            };

            let Some(wait) = wait else {
                self.record_failure(items).await;
                return Err(ExportError::new(
                    items,
                    CollectorError::timeout(format!(
                        "retry budget exhausted sending to {}",
                        self.name
                    )),
                ));
            };

            debug!(
                exporter = %self.name,
                wait_ms = wait.as_millis() as u64,
                "retrying send after backoff"
            );

            tokio::select! {
                _ = self.stop.cancelled() => {
                    self.record_failure(items).await;
                    return Err(ExportError::new(
                        items,
                        CollectorError::stopped(format!("exporter {} stopped", self.name)),
                    ));
                }
                _ = cx.cancellation().cancelled() => {
                    self.record_failure(items).await;
                    return Err(ExportError::new(
                        items,
                        CollectorError::cancelled("send cancelled by caller"),
                    ));
                }
                _ = tokio::time::sleep(wait) => {}
            }
        }
    }

    async fn shutdown(&self) -> CollectorResult<()> {
        self.stop.cancel();
        self.connection.stop().await
    }
}
