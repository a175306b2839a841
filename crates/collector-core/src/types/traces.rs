//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Trace data structures for the rheo collector core
//!
//! This module provides trace-specific data structures including spans,
//! scope groupings, and trace batches used throughout the collector.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use super::{InstrumentationScope, Resource};

/// Span data structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Span {
    /// Trace ID
    pub trace_id: String,

    /// Span ID
    pub span_id: String,

    /// Parent span ID
    pub parent_span_id: Option<String>,

    /// Span name
    pub name: String,

    /// Span kind
    pub kind: SpanKind,

    /// Span start time
    pub start_time: DateTime<Utc>,

    /// Span end time
    pub end_time: Option<DateTime<Utc>>,

    /// Span status
    pub status: SpanStatus,

    /// Span attributes
    pub attributes: HashMap<String, String>,
}

impl Span {
    /// Create a span with the given name and generated identifiers
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            trace_id: Uuid::new_v4().simple().to_string(),
            span_id: Uuid::new_v4().simple().to_string()[..16].to_string(),
            parent_span_id: None,
            name: name.into(),
            kind: SpanKind::Internal,
            start_time: Utc::now(),
            end_time: None,
            status: SpanStatus {
                code: StatusCode::Unset,
                message: None,
            },
            attributes: HashMap::new(),
        }
    }
}

/// Span kinds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SpanKind {
    Internal,
    Server,
    Client,
    Producer,
    Consumer,
}

/// Span status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpanStatus {
    /// Status code
    pub code: StatusCode,

    /// Status message
    pub message: Option<String>,
}

/// Status codes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StatusCode {
    Ok,
    Error,
    Unset,
}

/// Spans grouped under one instrumentation scope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeSpans {
    /// Instrumentation scope
    pub scope: InstrumentationScope,

    /// Spans emitted by the scope
    pub spans: Vec<Span>,
}

/// Traces batch flowing through trace pipelines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TracesBatch {
    /// Batch ID
    pub id: Uuid,

    /// Batch timestamp
    pub timestamp: DateTime<Utc>,

    /// Emitting resource
    pub resource: Resource,

    /// Scope groupings
    pub scopes: Vec<ScopeSpans>,

    /// Batch metadata
    pub metadata: HashMap<String, String>,
}

impl TracesBatch {
    /// Create a new traces batch
    pub fn new(resource: Resource, scopes: Vec<ScopeSpans>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            resource,
            scopes,
            metadata: HashMap::new(),
        }
    }

    /// Total number of spans across all scopes
    pub fn span_count(&self) -> usize {
        self.scopes.iter().map(|s| s.spans.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_count_across_scopes() {
        let batch = TracesBatch::new(
            Resource::default(),
            vec![
                ScopeSpans {
                    scope: InstrumentationScope::new("a"),
                    spans: vec![Span::named("x"), Span::named("y")],
                },
                ScopeSpans {
                    scope: InstrumentationScope::new("b"),
                    spans: vec![Span::named("z")],
                },
            ],
        );

        assert_eq!(batch.span_count(), 3);
    }
}
