//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Metric data structures for the rheo collector core
//!
//! This module provides metric-specific data structures including metric
//! data points, scope groupings, and metric batches used throughout the
//! collector.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use super::{InstrumentationScope, Resource};

/// Metric data structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricData {
    /// Metric name
    pub name: String,

    /// Metric description
    pub description: Option<String>,

    /// Metric unit
    pub unit: Option<String>,

    /// Metric type
    pub metric_type: MetricType,

    /// Metric value
    pub value: MetricValue,

    /// Metric labels
    pub labels: HashMap<String, String>,

    /// Metric timestamp
    pub timestamp: DateTime<Utc>,
}

impl MetricData {
    /// Create a gauge data point with the given name and value
    pub fn gauge(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            description: None,
            unit: None,
            metric_type: MetricType::Gauge,
            value: MetricValue::Gauge(value),
            labels: HashMap::new(),
            timestamp: Utc::now(),
        }
    }
}

/// Metric types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum MetricType {
    Counter,
    Gauge,
    Histogram,
}

/// Metric values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MetricValue {
    /// Counter value
    Counter(f64),

    /// Gauge value
    Gauge(f64),

    /// Histogram buckets and sum
    Histogram {
        buckets: Vec<HistogramBucket>,
        sum: f64,
        count: u64,
    },
}

/// Histogram bucket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistogramBucket {
    /// Bucket upper bound
    pub upper_bound: f64,

    /// Bucket count
    pub count: u64,
}

/// Metric data points grouped under one instrumentation scope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeMetrics {
    /// Instrumentation scope
    pub scope: InstrumentationScope,

    /// Metric data points emitted by the scope
    pub metrics: Vec<MetricData>,
}

/// Metrics batch flowing through metric pipelines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsBatch {
    /// Batch ID
    pub id: Uuid,

    /// Batch timestamp
    pub timestamp: DateTime<Utc>,

    /// Emitting resource
    pub resource: Resource,

    /// Scope groupings
    pub scopes: Vec<ScopeMetrics>,

    /// Batch metadata
    pub metadata: HashMap<String, String>,
}

impl MetricsBatch {
    /// Create a new metrics batch
    pub fn new(resource: Resource, scopes: Vec<ScopeMetrics>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            resource,
            scopes,
            metadata: HashMap::new(),
        }
    }

    /// Total number of data points across all scopes
    pub fn metric_count(&self) -> usize {
        self.scopes.iter().map(|s| s.metrics.len()).sum()
    }
}
