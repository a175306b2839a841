//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Telemetry batch structures for the rheo collector core
//!
//! This module provides the unit of data flowing through the pipeline
//! graph. A batch is exactly one of three variants, carries the resource
//! that emitted it, and knows its own item count for drop accounting.
//! Batches are treated as immutable along branches that do not mutate;
//! a mutating branch must obtain its own deep copy (`Clone`).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::{LogsBatch, MetricsBatch, TracesBatch};
use crate::error::CollectorError;

/// Telemetry data types a pipeline can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Traces,
    Metrics,
    Logs,
}

impl DataType {
    /// All data types, in a stable order
    pub const ALL: [DataType; 3] = [DataType::Traces, DataType::Metrics, DataType::Logs];

    /// The string form used in configuration and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Traces => "traces",
            DataType::Metrics => "metrics",
            DataType::Logs => "logs",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = CollectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "traces" => Ok(DataType::Traces),
            "metrics" => Ok(DataType::Metrics),
            "logs" => Ok(DataType::Logs),
            other => Err(CollectorError::configuration(format!(
                "unknown data type: {}",
                other
            ))),
        }
    }
}

/// Resource descriptor identifying the emitting entity
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Resource {
    /// Resource attributes
    pub attributes: HashMap<String, String>,
}

impl Resource {
    /// Create a new resource descriptor
    pub fn new(attributes: HashMap<String, String>) -> Self {
        Self { attributes }
    }

    /// Check if the resource carries no attributes
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

/// Instrumentation scope grouping items inside a batch
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstrumentationScope {
    /// Scope name
    pub name: String,

    /// Scope version
    pub version: Option<String>,
}

impl InstrumentationScope {
    /// Create a new instrumentation scope
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
        }
    }
}

/// Telemetry batch flowing through the pipeline graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TelemetryBatch {
    /// Trace batch
    Traces(TracesBatch),

    /// Metric batch
    Metrics(MetricsBatch),

    /// Log batch
    Logs(LogsBatch),
}

impl TelemetryBatch {
    /// The data type of this batch
    pub fn data_type(&self) -> DataType {
        match self {
            TelemetryBatch::Traces(_) => DataType::Traces,
            TelemetryBatch::Metrics(_) => DataType::Metrics,
            TelemetryBatch::Logs(_) => DataType::Logs,
        }
    }

    /// Unique batch identifier
    pub fn id(&self) -> uuid::Uuid {
        match self {
            TelemetryBatch::Traces(b) => b.id,
            TelemetryBatch::Metrics(b) => b.id,
            TelemetryBatch::Logs(b) => b.id,
        }
    }

    /// Number of leaf items (spans, data points, log records)
    pub fn item_count(&self) -> usize {
        match self {
            TelemetryBatch::Traces(b) => b.span_count(),
            TelemetryBatch::Metrics(b) => b.metric_count(),
            TelemetryBatch::Logs(b) => b.record_count(),
        }
    }

    /// Check if the batch carries no items
    pub fn is_empty(&self) -> bool {
        self.item_count() == 0
    }

    /// The resource descriptor of the emitting entity
    pub fn resource(&self) -> &Resource {
        match self {
            TelemetryBatch::Traces(b) => &b.resource,
            TelemetryBatch::Metrics(b) => &b.resource,
            TelemetryBatch::Logs(b) => &b.resource,
        }
    }

    /// Mutable access to the resource descriptor
    pub fn resource_mut(&mut self) -> &mut Resource {
        match self {
            TelemetryBatch::Traces(b) => &mut b.resource,
            TelemetryBatch::Metrics(b) => &mut b.resource,
            TelemetryBatch::Logs(b) => &mut b.resource,
        }
    }
}
