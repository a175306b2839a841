//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Connection manager for the exporter delivery core
//!
//! Maintains one logical connection to the endpoint. The first connection
//! is attempted eagerly at start but start never blocks on its success: a
//! background worker reattempts at exponentially increasing intervals
//! until stop. The send path reads the state through an atomic; the
//! worker is the only writer apart from the send path flagging an
//! observed disconnect.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::status::{SendCode, SendFailure};
use super::ExportChannel;
use crate::component::Host;
use crate::error::{CollectorError, CollectorResult};
use crate::metrics::record_reconnect_attempt;

/// Connection lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectionState {
    Created = 0,
    Connecting = 1,
    Connected = 2,
    Disconnected = 3,
    Stopping = 4,
    Stopped = 5,
}

impl ConnectionState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => ConnectionState::Created,
            1 => ConnectionState::Connecting,
            2 => ConnectionState::Connected,
            3 => ConnectionState::Disconnected,
            4 => ConnectionState::Stopping,
            _ => ConnectionState::Stopped,
        }
    }
}

/// Reconnect schedule for the background worker
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Initial reconnect interval in milliseconds
    pub initial_interval_ms: u64,

    /// Interval multiplier applied after each failed attempt
    pub multiplier: f64,

    /// Cap on the reconnect interval in milliseconds
    pub max_interval_ms: u64,

    /// Jitter factor (0.0 to 1.0) applied to each interval
    pub jitter_factor: f64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_interval_ms: 500,
            multiplier: 1.5,
            max_interval_ms: 60_000,
            jitter_factor: 0.2,
        }
    }
}

/// Manager of one logical endpoint connection
pub struct ConnectionManager {
    name: String,
    channel: Arc<dyn ExportChannel>,
    config: ReconnectConfig,
    state: Arc<AtomicU8>,
    disconnected: Arc<Notify>,
    stop: CancellationToken,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl ConnectionManager {
    /// Create a manager in the `Created` state
    pub fn new(name: String, channel: Arc<dyn ExportChannel>, config: ReconnectConfig) -> Self {
        Self {
            name,
            channel,
            config,
            state: Arc::new(AtomicU8::new(ConnectionState::Created as u8)),
            disconnected: Arc::new(Notify::new()),
            stop: CancellationToken::new(),
            worker: Mutex::new(None),
        }
    }

    /// Current connection state
    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Whether the logical connection is established
    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Start: one eager connect attempt, then schedule the background
    /// worker. The component counts as started once the worker is
    /// scheduled, regardless of the eager attempt's outcome.
    pub async fn start(&self, host: Arc<dyn Host>) -> CollectorResult<()> {
        if self.state() != ConnectionState::Created {
            return Err(CollectorError::start(format!(
                "connection manager for {} already started",
                self.name
            )));
        }

        self.state
            .store(ConnectionState::Connecting as u8, Ordering::Release);

        match self.channel.connect().await {
            Ok(()) => {
                info!(exporter = %self.name, "connected to endpoint");
                self.state
                    .store(ConnectionState::Connected as u8, Ordering::Release);
            }
            Err(e) => {
                warn!(exporter = %self.name, error = %e, "initial connection failed");
                self.state
                    .store(ConnectionState::Disconnected as u8, Ordering::Release);
            }
        }

        let worker = tokio::spawn(background_connection_loop(
            self.name.clone(),
            Arc::clone(&self.channel),
            self.config.clone(),
            Arc::clone(&self.state),
            Arc::clone(&self.disconnected),
            self.stop.clone(),
            host,
        ));
        *self.worker.lock().await = Some(worker);

        Ok(())
    }

    /// Flag a disconnect observed on the send path so the worker probes
    /// the endpoint again.
    pub fn observe_send_failure(&self, failure: &SendFailure) {
        if failure.code == SendCode::Unavailable && self.is_connected() {
            warn!(exporter = %self.name, "endpoint became unavailable");
            self.state
                .store(ConnectionState::Disconnected as u8, Ordering::Release);
            self.disconnected.notify_one();
        }
    }

    /// Stop the manager. Idempotent; blocks until the background worker
    /// has exited.
    pub async fn stop(&self) -> CollectorResult<()> {
        let current = self.state();
        if current == ConnectionState::Stopped || current == ConnectionState::Stopping {
            return Ok(());
        }

        self.state
            .store(ConnectionState::Stopping as u8, Ordering::Release);
        self.stop.cancel();

        if let Some(worker) = self.worker.lock().await.take() {
            if let Err(e) = worker.await {
                error!(exporter = %self.name, error = %e, "connection worker panicked");
            }
        }

        self.state
            .store(ConnectionState::Stopped as u8, Ordering::Release);
        Ok(())
    }
}

async fn background_connection_loop(
    name: String,
    channel: Arc<dyn ExportChannel>,
    config: ReconnectConfig,
    state: Arc<AtomicU8>,
    disconnected: Arc<Notify>,
    stop: CancellationToken,
    host: Arc<dyn Host>,
) {
    let mut interval_ms = config.initial_interval_ms as f64;

    loop {
        if ConnectionState::from_u8(state.load(Ordering::Acquire)) == ConnectionState::Connected {
            tokio::select! {
                _ = stop.cancelled() => break,
                _ = disconnected.notified() => continue,
            }
        }

        let jitter = interval_ms * config.jitter_factor * (rand::random::<f64>() * 2.0 - 1.0);
        let wait = Duration::from_millis((interval_ms + jitter).max(1.0) as u64);

        tokio::select! {
            _ = stop.cancelled() => break,
            _ = tokio::time::sleep(wait) => {}
        }

        state.store(ConnectionState::Connecting as u8, Ordering::Release);
        record_reconnect_attempt(&name);

        match channel.connect().await {
            Ok(()) => {
                info!(exporter = %name, "reconnected to endpoint");
                state.store(ConnectionState::Connected as u8, Ordering::Release);
                interval_ms = config.initial_interval_ms as f64;
            }
            Err(e) if e.is_permanent() => {
                error!(exporter = %name, error = %e, "unrecoverable connection error");
                state.store(ConnectionState::Disconnected as u8, Ordering::Release);
                host.report_fatal_error(e);
                break;
            }
            Err(e) => {
                warn!(exporter = %name, error = %e, "reconnection attempt failed");
                state.store(ConnectionState::Disconnected as u8, Ordering::Release);
                interval_ms = (interval_ms * config.multiplier).min(config.max_interval_ms as f64);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::mock::MockChannel;
    use crate::service::CollectorHost;

    fn fast_reconnect() -> ReconnectConfig {
        ReconnectConfig {
            initial_interval_ms: 5,
            multiplier: 1.5,
            max_interval_ms: 20,
            jitter_factor: 0.0,
        }
    }

    #[tokio::test]
    async fn test_eager_connect_success() {
        let channel = Arc::new(MockChannel::new());
        let manager = ConnectionManager::new("test".into(), channel, fast_reconnect());
        let (host, _fatal) = CollectorHost::new();

        manager.start(host).await.unwrap();
        assert!(manager.is_connected());
        manager.stop().await.unwrap();
        assert_eq!(manager.state(), ConnectionState::Stopped);
    }

    #[tokio::test]
    async fn test_start_does_not_block_on_failure() {
        let channel = Arc::new(MockChannel::new());
        channel.fail_connects(1);
        let manager = ConnectionManager::new(
            "test".into(),
            Arc::clone(&channel) as Arc<dyn ExportChannel>,
            fast_reconnect(),
        );
        let (host, _fatal) = CollectorHost::new();

        manager.start(host).await.unwrap();
        assert!(!manager.is_connected());

        // The background worker recovers on its own.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(manager.is_connected());

        manager.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let channel = Arc::new(MockChannel::new());
        let manager = ConnectionManager::new("test".into(), channel, fast_reconnect());
        let (host, _fatal) = CollectorHost::new();

        manager.start(host).await.unwrap();
        manager.stop().await.unwrap();
        manager.stop().await.unwrap();
        assert_eq!(manager.state(), ConnectionState::Stopped);
    }

    #[tokio::test]
    async fn test_double_start_fails() {
        let channel = Arc::new(MockChannel::new());
        let manager = ConnectionManager::new("test".into(), channel, fast_reconnect());
        let (host, _fatal) = CollectorHost::new();

        manager.start(Arc::clone(&host) as Arc<dyn Host>).await.unwrap();
        assert!(manager.start(host).await.is_err());
        manager.stop().await.unwrap();
    }
}
