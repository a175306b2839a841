//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Memory limiter processor for the rheo collector core
//!
//! Applies backpressure based on process heap usage. A background worker
//! samples allocation every check interval, subtracts the configured
//! ballast, and drives a two-state machine: once usage crosses the soft
//! threshold (`limit - spike`) the processor refuses every batch with a
//! forced-drop error until usage falls back below it. Receivers translate
//! the forced drop into protocol-level backpressure.
//!
//! Thresholds are either fixed byte counts or percentages of total system
//! memory, resolved once at construction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use sysinfo::System;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::component::Host;
use crate::error::{CollectorError, CollectorResult};
use crate::metrics::{record_items_refused, record_throttling_state};
use crate::traits::{
    ConsumeContext, Consumer, ProcessorFactory, TelemetryProcessor,
};
use crate::types::{DataType, TelemetryBatch};

/// Memory limiter configuration.
///
/// Fixed mode (`limit_bytes`/`spike_bytes`) and percentage mode
/// (`limit_percentage`/`spike_percentage`) are mutually exclusive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryLimiterConfig {
    /// Sampler interval in milliseconds, must be positive
    #[serde(default)]
    pub check_interval_ms: u64,

    /// Hard limit on effective allocation in bytes
    #[serde(default)]
    pub limit_bytes: Option<u64>,

    /// Soft margin below the hard limit in bytes
    #[serde(default)]
    pub spike_bytes: Option<u64>,

    /// Hard limit as a percentage of total system memory
    #[serde(default)]
    pub limit_percentage: Option<u8>,

    /// Soft margin as a percentage of total system memory
    #[serde(default)]
    pub spike_percentage: Option<u8>,

    /// Bytes subtracted from observed allocation before comparison
    #[serde(default)]
    pub ballast_bytes: u64,
}

impl MemoryLimiterConfig {
    /// Resolve the configured thresholds against total system memory.
    pub fn resolve_decision(&self, total_memory: u64) -> CollectorResult<DropDecision> {
        if self.check_interval_ms == 0 {
            return Err(CollectorError::configuration(
                "memory limiter check_interval_ms must be positive",
            ));
        }

        match (self.limit_bytes, self.limit_percentage) {
            (Some(_), Some(_)) => Err(CollectorError::configuration(
                "memory limiter limit_bytes and limit_percentage are mutually exclusive",
            )),
            (Some(limit), None) => DropDecision::fixed(limit, self.spike_bytes.unwrap_or(0)),
            (None, Some(pct)) => DropDecision::percentage(
                total_memory,
                pct,
                self.spike_percentage.unwrap_or(0),
            ),
            (None, None) => Err(CollectorError::configuration(
                "memory limiter requires limit_bytes or limit_percentage",
            )),
        }
    }
}

/// Resolved drop thresholds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropDecision {
    /// Hard limit on effective allocation
    pub limit: u64,

    /// Soft margin below the hard limit
    pub spike: u64,
}

impl DropDecision {
    /// Thresholds from fixed byte counts
    pub fn fixed(limit: u64, spike: u64) -> CollectorResult<Self> {
        if limit == 0 {
            return Err(CollectorError::configuration(
                "memory limit must be positive",
            ));
        }
        if spike >= limit {
            return Err(CollectorError::configuration(
                "memory spike limit must be smaller than the memory limit",
            ));
        }
        Ok(Self { limit, spike })
    }

    /// Thresholds from percentages of total system memory
    pub fn percentage(total_memory: u64, limit_pct: u8, spike_pct: u8) -> CollectorResult<Self> {
        if limit_pct == 0 || limit_pct > 100 {
            return Err(CollectorError::configuration(
                "memory limit percentage must be in (0, 100]",
            ));
        }
        if spike_pct > 100 {
            return Err(CollectorError::configuration(
                "memory spike percentage must be in [0, 100]",
            ));
        }
        Self::fixed(
            total_memory / 100 * limit_pct as u64,
            total_memory / 100 * spike_pct as u64,
        )
    }

    /// Soft threshold at which throttling engages
    fn soft_threshold(&self) -> u64 {
        self.limit - self.spike
    }
}

/// Sampler of current process heap allocation in bytes
pub type MemorySampler = Arc<dyn Fn() -> u64 + Send + Sync>;

/// Default sampler reading the process's resident memory
fn process_memory_sampler() -> MemorySampler {
    Arc::new(|| {
        let Ok(pid) = sysinfo::get_current_pid() else {
            return 0;
        };
        let mut sys = System::new();
        sys.refresh_process(pid);
        sys.process(pid).map(|p| p.memory()).unwrap_or(0)
    })
}

/// Total system memory in bytes, read once at construction
fn total_system_memory() -> u64 {
    let mut sys = System::new();
    sys.refresh_memory();
    sys.total_memory()
}

/// Memory limiter processor
pub struct MemoryLimiterProcessor {
    name: String,
    decision: DropDecision,
    ballast_bytes: u64,
    check_interval: Duration,
    sampler: MemorySampler,
    throttling: Arc<AtomicBool>,
    next: Arc<dyn Consumer>,
    stop: CancellationToken,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl MemoryLimiterProcessor {
    /// Create a memory limiter with the default process-memory sampler
    pub fn new(
        name: impl Into<String>,
        config: MemoryLimiterConfig,
        next: Arc<dyn Consumer>,
    ) -> CollectorResult<Self> {
        let decision = config.resolve_decision(total_system_memory())?;
        Ok(Self {
            name: name.into(),
            decision,
            ballast_bytes: config.ballast_bytes,
            check_interval: Duration::from_millis(config.check_interval_ms),
            sampler: process_memory_sampler(),
            throttling: Arc::new(AtomicBool::new(false)),
            next,
            stop: CancellationToken::new(),
            worker: Mutex::new(None),
        })
    }

    /// Replace the allocation sampler. Tests inject deterministic values.
    pub fn with_sampler(mut self, sampler: MemorySampler) -> Self {
        self.sampler = sampler;
        self
    }

    /// Whether admission is currently refused
    pub fn is_throttling(&self) -> bool {
        self.throttling.load(Ordering::Acquire)
    }

    /// Run one sampler tick immediately.
    pub fn check_now(&self) {
        evaluate(
            &self.name,
            &self.decision,
            self.ballast_bytes,
            &self.throttling,
            (self.sampler)(),
        );
    }
}

fn evaluate(
    name: &str,
    decision: &DropDecision,
    ballast_bytes: u64,
    throttling: &AtomicBool,
    observed_alloc: u64,
) {
    let effective = observed_alloc.saturating_sub(ballast_bytes);
    let was_throttling = throttling.load(Ordering::Acquire);

    if effective < decision.soft_threshold() {
        if was_throttling {
            info!(
                processor = %name,
                effective_alloc = effective,
                "memory usage back below soft limit, resuming admission"
            );
            throttling.store(false, Ordering::Release);
            record_throttling_state(false);
        }
        return;
    }

    if !was_throttling {
        warn!(
            processor = %name,
            effective_alloc = effective,
            limit = decision.limit,
            "memory usage crossed soft limit, refusing data"
        );
        throttling.store(true, Ordering::Release);
        record_throttling_state(true);
    }

    if effective >= decision.limit {
        // Above the hard limit every tick: ask the allocator to give
        // memory back. There is no collector to force here; the event is
        // surfaced so an allocator-specific build can hook it.
        warn!(
            processor = %name,
            effective_alloc = effective,
            limit = decision.limit,
            "memory usage above hard limit, requesting reclaim"
        );
    }
}

#[async_trait]
impl TelemetryProcessor for MemoryLimiterProcessor {
    fn name(&self) -> &str {
        &self.name
    }

    fn mutates_data(&self) -> bool {
        false
    }

    async fn process(
        &self,
        cx: &ConsumeContext,
        batch: Arc<TelemetryBatch>,
    ) -> CollectorResult<()> {
        if self.is_throttling() {
            record_items_refused(&self.name, batch.item_count() as u64);
            return Err(CollectorError::forced_drop());
        }
        self.next.consume(cx, batch).await
    }

    async fn start(&self, _host: Arc<dyn Host>) -> CollectorResult<()> {
        let name = self.name.clone();
        let decision = self.decision.clone();
        let ballast = self.ballast_bytes;
        let throttling = Arc::clone(&self.throttling);
        let sampler = Arc::clone(&self.sampler);
        let stop = self.stop.clone();
        let interval = self.check_interval;

        let worker = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        evaluate(&name, &decision, ballast, &throttling, sampler());
                    }
                    _ = stop.cancelled() => {
                        debug!(processor = %name, "memory limiter sampler stopping");
                        break;
                    }
                }
            }
        });
        *self.worker.lock().await = Some(worker);

        Ok(())
    }

    async fn shutdown(&self) -> CollectorResult<()> {
        self.stop.cancel();
        if let Some(worker) = self.worker.lock().await.take() {
            if let Err(e) = worker.await {
                warn!(processor = %self.name, error = %e, "sampler task panicked");
            }
        }
        Ok(())
    }
}

/// Factory for memory limiter processors
pub struct MemoryLimiterFactory;

impl MemoryLimiterFactory {
    /// Create the factory
    pub fn new() -> Self {
        Self
    }
}

impl Default for MemoryLimiterFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProcessorFactory for MemoryLimiterFactory {
    fn type_name(&self) -> &str {
        "memory_limiter"
    }

    fn default_config(&self) -> serde_json::Value {
        serde_json::json!({
            "check_interval_ms": 1000,
            "ballast_bytes": 0,
        })
    }

    async fn create_processor(
        &self,
        name: &str,
        config: &serde_json::Value,
        _data_type: DataType,
        next: Arc<dyn Consumer>,
    ) -> CollectorResult<Arc<dyn TelemetryProcessor>> {
        let config: MemoryLimiterConfig = serde_json::from_value(config.clone())?;
        Ok(Arc::new(MemoryLimiterProcessor::new(name, config, next)?))
    }
}
