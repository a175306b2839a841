//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Telemetry receiver contract for the rheo collector core
//!
//! Wire-protocol servers live outside the core; all the core requires of a
//! receiver is the start/stop contract. A receiver is bound to its head
//! consumer(s) by the factory at assembly time and pushes batches into
//! them for as long as it runs.

use async_trait::async_trait;
use std::sync::Arc;

use crate::component::Host;
use crate::error::CollectorResult;

/// Telemetry receiver contract.
///
/// One receiver instance may serve several pipelines and several data
/// types; the assembler hands it one fan-out consumer per data type.
#[async_trait]
pub trait TelemetryReceiver: Send + Sync {
    /// Start serving. Must not block on connection establishment; errors
    /// discovered later are reported through the host.
    async fn start(&self, host: Arc<dyn Host>) -> CollectorResult<()>;

    /// Stop serving and release resources. Idempotent.
    async fn shutdown(&self) -> CollectorResult<()>;
}
