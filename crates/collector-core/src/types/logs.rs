//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Log data structures for the rheo collector core
//!
//! This module provides log-specific data structures including log records,
//! scope groupings, and log batches used throughout the collector.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use super::{InstrumentationScope, Resource};

/// Log record structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    /// Record timestamp
    pub timestamp: DateTime<Utc>,

    /// Log level
    pub level: LogLevel,

    /// Log message
    pub message: String,

    /// Record attributes
    pub attributes: HashMap<String, String>,

    /// Severity number
    pub severity_number: Option<u32>,

    /// Severity text
    pub severity_text: Option<String>,
}

impl LogRecord {
    /// Create an info-level record with the given message
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level: LogLevel::Info,
            message: message.into(),
            attributes: HashMap::new(),
            severity_number: None,
            severity_text: None,
        }
    }
}

/// Log levels
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

/// Log records grouped under one instrumentation scope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeLogs {
    /// Instrumentation scope
    pub scope: InstrumentationScope,

    /// Log records emitted by the scope
    pub records: Vec<LogRecord>,
}

/// Logs batch flowing through log pipelines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsBatch {
    /// Batch ID
    pub id: Uuid,

    /// Batch timestamp
    pub timestamp: DateTime<Utc>,

    /// Emitting resource
    pub resource: Resource,

    /// Scope groupings
    pub scopes: Vec<ScopeLogs>,

    /// Batch metadata
    pub metadata: HashMap<String, String>,
}

impl LogsBatch {
    /// Create a new logs batch
    pub fn new(resource: Resource, scopes: Vec<ScopeLogs>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            resource,
            scopes,
            metadata: HashMap::new(),
        }
    }

    /// Total number of records across all scopes
    pub fn record_count(&self) -> usize {
        self.scopes.iter().map(|s| s.records.len()).sum()
    }
}
