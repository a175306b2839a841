//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Telemetry data structures for the rheo collector core
//!
//! This module provides the data model flowing through the pipeline graph:
//! batches of traces, metrics, and logs, each grouped by resource and
//! instrumentation scope.

pub mod logs;
pub mod metrics;
pub mod telemetry;
pub mod traces;

// Re-export commonly used types
pub use logs::{LogLevel, LogRecord, LogsBatch, ScopeLogs};
pub use metrics::{HistogramBucket, MetricData, MetricType, MetricValue, MetricsBatch, ScopeMetrics};
pub use telemetry::{DataType, InstrumentationScope, Resource, TelemetryBatch};
pub use traces::{ScopeSpans, Span, SpanKind, SpanStatus, StatusCode, TracesBatch};
