//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Consumer contract for the rheo collector core
//!
//! A consumer is any pipeline stage that accepts a telemetry batch: the
//! head of a processor chain, a fan-out junction, or an exporter adapter.
//! Batches travel as `Arc<TelemetryBatch>`; stages that do not mutate
//! share the allocation, stages that mutate take ownership of their own
//! deep copy.

use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::error::CollectorResult;
use crate::types::TelemetryBatch;

/// Per-call context carried by every consume call.
///
/// Fan-out junctions forward the context unchanged; retry loops and
/// connection managers treat cancellation of the handle as an immediate
/// return.
#[derive(Debug, Clone)]
pub struct ConsumeContext {
    cancellation: CancellationToken,
}

impl ConsumeContext {
    /// Context with a fresh, never-cancelled handle
    pub fn background() -> Self {
        Self {
            cancellation: CancellationToken::new(),
        }
    }

    /// Context carrying the given cancellation handle
    pub fn with_cancellation(cancellation: CancellationToken) -> Self {
        Self { cancellation }
    }

    /// The cancellation handle for this call
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Check whether the call has been cancelled
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

impl Default for ConsumeContext {
    fn default() -> Self {
        Self::background()
    }
}

/// A pipeline stage that accepts telemetry batches.
#[async_trait]
pub trait Consumer: Send + Sync {
    /// Consume a batch, synchronously from the caller's perspective.
    async fn consume(
        &self,
        cx: &ConsumeContext,
        batch: Arc<TelemetryBatch>,
    ) -> CollectorResult<()>;
}
