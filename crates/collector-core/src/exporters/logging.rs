//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Logging exporter for the rheo collector core
//!
//! A terminal sink that logs a summary of every batch it receives. It
//! never fails and never drops, which makes it the default sink for
//! demos and smoke configurations.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::error::CollectorResult;
use crate::traits::{
    ConsumeContext, ExportError, ExportResult, ExporterFactory, TelemetryExporter,
};
use crate::types::{DataType, TelemetryBatch};

/// Logging exporter
pub struct LoggingExporter {
    name: String,
}

impl LoggingExporter {
    /// Create a logging exporter
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl TelemetryExporter for LoggingExporter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn export(
        &self,
        _cx: &ConsumeContext,
        batch: Arc<TelemetryBatch>,
    ) -> Result<ExportResult, ExportError> {
        info!(
            exporter = %self.name,
            batch_id = %batch.id(),
            data_type = %batch.data_type(),
            items = batch.item_count(),
            "exporting batch"
        );
        Ok(ExportResult::delivered(batch.item_count(), 0))
    }
}

/// Factory for logging exporters
pub struct LoggingExporterFactory;

impl LoggingExporterFactory {
    /// Create the factory
    pub fn new() -> Self {
        Self
    }
}

impl Default for LoggingExporterFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExporterFactory for LoggingExporterFactory {
    fn type_name(&self) -> &str {
        "logging"
    }

    fn default_config(&self) -> serde_json::Value {
        serde_json::json!({})
    }

    async fn create_exporter(
        &self,
        name: &str,
        _config: &serde_json::Value,
        _data_type: DataType,
    ) -> CollectorResult<Arc<dyn TelemetryExporter>> {
        Ok(Arc::new(LoggingExporter::new(name)))
    }
}
