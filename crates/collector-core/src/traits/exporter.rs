//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Telemetry exporter contract for the rheo collector core
//!
//! The core requires of every exporter a push-with-drop-count contract:
//! on any error path the exporter reports how many items it failed to
//! deliver, so upstream accounting stays exact. Connection handling,
//! retries, and queueing live behind this contract in the delivery core.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use super::consumer::ConsumeContext;
use crate::component::Host;
use crate::error::{CollectorError, CollectorResult};
use crate::types::TelemetryBatch;

/// Successful export outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportResult {
    /// Items delivered downstream
    pub records_exported: usize,

    /// Export duration in milliseconds
    pub duration_ms: u64,

    /// Completion timestamp
    pub timestamp: DateTime<Utc>,
}

impl ExportResult {
    /// Build a result for a fully delivered batch
    pub fn delivered(records_exported: usize, duration_ms: u64) -> Self {
        Self {
            records_exported,
            duration_ms,
            timestamp: Utc::now(),
        }
    }
}

/// Failed export outcome carrying the drop count.
///
/// `dropped` is the number of items that were not delivered, in
/// `[0, batch.item_count()]`. Whether the emitter may re-offer the batch
/// is decided by the wrapped error's classification.
#[derive(Debug, Error)]
#[error("{error} ({dropped} item(s) not delivered)")]
pub struct ExportError {
    /// Items not delivered
    pub dropped: usize,

    /// Underlying error
    pub error: CollectorError,
}

impl ExportError {
    /// Wrap an error with its drop count
    pub fn new(dropped: usize, error: CollectorError) -> Self {
        Self { dropped, error }
    }

    /// Transient failure; the caller may re-offer the batch
    pub fn transient(dropped: usize, message: impl Into<String>) -> Self {
        Self::new(dropped, CollectorError::transient(message))
    }

    /// Permanent failure; the items are lost
    pub fn permanent(dropped: usize, message: impl Into<String>) -> Self {
        Self::new(dropped, CollectorError::permanent(message))
    }
}

/// Telemetry exporter contract.
#[async_trait]
pub trait TelemetryExporter: Send + Sync {
    /// Exporter name for logs and error reports
    fn name(&self) -> &str;

    /// Invoked during service startup. May begin connecting but must not
    /// block on connection success.
    async fn start(&self, host: Arc<dyn Host>) -> CollectorResult<()> {
        let _ = host;
        Ok(())
    }

    /// Push a batch downstream, reporting drops on failure.
    async fn export(
        &self,
        cx: &ConsumeContext,
        batch: Arc<TelemetryBatch>,
    ) -> Result<ExportResult, ExportError>;

    /// Invoked during service shutdown. Drains in-flight work. Idempotent.
    async fn shutdown(&self) -> CollectorResult<()> {
        Ok(())
    }
}

/// Exporter statistics
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExporterStats {
    /// Total batches offered
    pub total_batches: u64,

    /// Total items delivered
    pub total_records: u64,

    /// Total items dropped
    pub dropped_records: u64,

    /// Error count
    pub error_count: u64,

    /// Last export timestamp
    pub last_export_time: Option<DateTime<Utc>>,
}
