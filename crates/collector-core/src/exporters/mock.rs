//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Mock exporter for testing the rheo collector core
//!
//! Records every batch it receives, can be scripted to fail upcoming
//! exports, and counts lifecycle calls so tests can assert start and
//! shutdown discipline. The factory caches one instance per
//! `(data type, name)` so tests can reach the instances the assembler
//! wired into pipelines.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::component::Host;
use crate::error::CollectorResult;
use crate::traits::{
    ConsumeContext, ExportError, ExportResult, ExporterFactory, TelemetryExporter,
};
use crate::types::{DataType, TelemetryBatch};

/// Recording mock exporter
pub struct MockExporter {
    name: String,
    received: Mutex<Vec<Arc<TelemetryBatch>>>,
    fail_next: AtomicU64,
    started: AtomicBool,
    shutdown_calls: AtomicU64,
}

impl MockExporter {
    /// Create a mock exporter
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            received: Mutex::new(Vec::new()),
            fail_next: AtomicU64::new(0),
            started: AtomicBool::new(false),
            shutdown_calls: AtomicU64::new(0),
        }
    }

    /// Batches received so far
    pub async fn received_batches(&self) -> Vec<Arc<TelemetryBatch>> {
        self.received.lock().await.clone()
    }

    /// Total items across received batches
    pub async fn received_items(&self) -> usize {
        self.received
            .lock()
            .await
            .iter()
            .map(|b| b.item_count())
            .sum()
    }

    /// Fail the next `count` export calls with a permanent error
    pub fn fail_next(&self, count: u64) {
        self.fail_next.store(count, Ordering::SeqCst);
    }

    /// Whether `start` has been called without a later `shutdown`
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Number of `shutdown` calls observed
    pub fn shutdown_calls(&self) -> u64 {
        self.shutdown_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TelemetryExporter for MockExporter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&self, _host: Arc<dyn Host>) -> CollectorResult<()> {
        self.started.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn export(
        &self,
        _cx: &ConsumeContext,
        batch: Arc<TelemetryBatch>,
    ) -> Result<ExportResult, ExportError> {
        let items = batch.item_count();

        let remaining = self.fail_next.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fail_next.store(remaining - 1, Ordering::SeqCst);
            return Err(ExportError::permanent(items, "scripted export failure"));
        }

        self.received.lock().await.push(batch);
        Ok(ExportResult::delivered(items, 0))
    }

    async fn shutdown(&self) -> CollectorResult<()> {
        self.shutdown_calls.fetch_add(1, Ordering::SeqCst);
        self.started.store(false, Ordering::SeqCst);
        Ok(())
    }
}

/// Factory for mock exporters
pub struct MockExporterFactory {
    instances: Mutex<HashMap<(DataType, String), Arc<MockExporter>>>,
}

impl MockExporterFactory {
    /// Create the factory
    pub fn new() -> Self {
        Self {
            instances: Mutex::new(HashMap::new()),
        }
    }

    /// The cached instance for a data type and name, if one was created
    pub async fn instance(&self, data_type: DataType, name: &str) -> Option<Arc<MockExporter>> {
        self.instances
            .lock()
            .await
            .get(&(data_type, name.to_string()))
            .cloned()
    }
}

impl Default for MockExporterFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExporterFactory for MockExporterFactory {
    fn type_name(&self) -> &str {
        "mock"
    }

    fn default_config(&self) -> serde_json::Value {
        serde_json::json!({})
    }

    async fn create_exporter(
        &self,
        name: &str,
        _config: &serde_json::Value,
        data_type: DataType,
    ) -> CollectorResult<Arc<dyn TelemetryExporter>> {
        let mut instances = self.instances.lock().await;
        let exporter = instances
            .entry((data_type, name.to_string()))
            .or_insert_with(|| Arc::new(MockExporter::named(name)))
            .clone();
        Ok(exporter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{InstrumentationScope, Resource, ScopeSpans, Span, TracesBatch};

    fn trace_batch(spans: usize) -> Arc<TelemetryBatch> {
        Arc::new(TelemetryBatch::Traces(TracesBatch::new(
            Resource::default(),
            vec![ScopeSpans {
                scope: InstrumentationScope::new("test"),
                spans: (0..spans).map(|i| Span::named(format!("s{}", i))).collect(),
            }],
        )))
    }

    #[tokio::test]
    async fn test_records_batches() {
        let exporter = MockExporter::named("e1");
        exporter
            .export(&ConsumeContext::background(), trace_batch(3))
            .await
            .unwrap();

        assert_eq!(exporter.received_batches().await.len(), 1);
        assert_eq!(exporter.received_items().await, 3);
    }

    #[tokio::test]
    async fn test_scripted_failure_reports_drops() {
        let exporter = MockExporter::named("e1");
        exporter.fail_next(1);

        let err = exporter
            .export(&ConsumeContext::background(), trace_batch(4))
            .await
            .unwrap_err();
        assert_eq!(err.dropped, 4);
        assert!(err.error.is_permanent());

        // The failure script is consumed.
        exporter
            .export(&ConsumeContext::background(), trace_batch(1))
            .await
            .unwrap();
    }
}
