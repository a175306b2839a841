//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Telemetry processor contract for the rheo collector core
//!
//! Processors are constructed with their downstream consumer and execute
//! inline on the caller's task. The `mutates_data` capability decides
//! whether fan-out junctions upstream must hand the pipeline a deep copy.

use async_trait::async_trait;
use std::sync::Arc;

use super::consumer::{ConsumeContext, Consumer};
use crate::component::Host;
use crate::error::CollectorResult;
use crate::types::TelemetryBatch;

/// Telemetry processor contract.
#[async_trait]
pub trait TelemetryProcessor: Send + Sync {
    /// Processor name for logs and error reports
    fn name(&self) -> &str;

    /// Whether this processor's `process` call may modify the batch.
    ///
    /// Declared once at construction; the assembler ORs the flags of a
    /// pipeline's chain to select the fan-out variant upstream.
    fn mutates_data(&self) -> bool {
        false
    }

    /// Process a batch and forward it (or a derived batch) downstream.
    async fn process(
        &self,
        cx: &ConsumeContext,
        batch: Arc<TelemetryBatch>,
    ) -> CollectorResult<()>;

    /// Invoked during service startup.
    async fn start(&self, host: Arc<dyn Host>) -> CollectorResult<()> {
        let _ = host;
        Ok(())
    }

    /// Invoked during service shutdown.
    async fn shutdown(&self) -> CollectorResult<()> {
        Ok(())
    }
}

/// Adapter exposing a processor as a pipeline consumer stage.
pub struct ProcessorStage {
    processor: Arc<dyn TelemetryProcessor>,
}

impl ProcessorStage {
    /// Wrap a processor for use as a consumer
    pub fn new(processor: Arc<dyn TelemetryProcessor>) -> Self {
        Self { processor }
    }
}

#[async_trait]
impl Consumer for ProcessorStage {
    async fn consume(
        &self,
        cx: &ConsumeContext,
        batch: Arc<TelemetryBatch>,
    ) -> CollectorResult<()> {
        self.processor.process(cx, batch).await
    }
}

/// Take ownership of a batch for in-place mutation.
///
/// When the caller holds the only reference this is free; otherwise the
/// batch is deep-copied, preserving isolation between branches.
pub fn into_owned(batch: Arc<TelemetryBatch>) -> TelemetryBatch {
    Arc::try_unwrap(batch).unwrap_or_else(|shared| (*shared).clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Resource, ScopeSpans, Span, TracesBatch};
    use crate::types::InstrumentationScope;

    fn trace_batch(name: &str) -> Arc<TelemetryBatch> {
        Arc::new(TelemetryBatch::Traces(TracesBatch::new(
            Resource::default(),
            vec![ScopeSpans {
                scope: InstrumentationScope::new("test"),
                spans: vec![Span::named(name)],
            }],
        )))
    }

    #[test]
    fn test_into_owned_unique_keeps_allocation() {
        let batch = trace_batch("a");
        let id = batch.id();
        let owned = into_owned(batch);
        assert_eq!(owned.id(), id);
    }

    #[test]
    fn test_into_owned_shared_deep_copies() {
        let batch = trace_batch("a");
        let other = Arc::clone(&batch);

        let mut owned = into_owned(batch);
        if let TelemetryBatch::Traces(b) = &mut owned {
            b.scopes[0].spans[0].name = "mutated".to_string();
        }

        if let TelemetryBatch::Traces(b) = other.as_ref() {
            assert_eq!(b.scopes[0].spans[0].name, "a");
        }
    }
}
