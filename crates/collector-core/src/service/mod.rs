//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Lifecycle coordination for the rheo collector core
//!
//! Serializes startup and shutdown of the assembled graph. Startup runs
//! sinks-first (extensions, exporters, processors tail-to-head,
//! receivers) so a component never starts before its downstream; any
//! failure rolls the already-started prefix back in reverse. Shutdown
//! runs sources-first, attempts every component even when one fails,
//! bounds each call with a deadline, and aggregates all failures.

pub mod host;

// Re-export commonly used types
pub use host::CollectorHost;

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tracing::{error, info, warn};

use crate::builder::Assembly;
use crate::component::{ComponentDescriptor, Host};
use crate::error::{CollectorError, CollectorResult};
use crate::traits::{Extension, TelemetryExporter, TelemetryProcessor, TelemetryReceiver};

/// Service-level settings
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    /// Deadline for each component's shutdown call in milliseconds
    pub shutdown_timeout_ms: u64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            shutdown_timeout_ms: 5_000,
        }
    }
}

/// One startable component of the graph
#[derive(Clone)]
enum Component {
    Extension(Arc<dyn Extension>),
    Exporter(Arc<dyn TelemetryExporter>),
    Processor(Arc<dyn TelemetryProcessor>),
    Receiver(Arc<dyn TelemetryReceiver>),
}

impl Component {
    async fn start(&self, host: Arc<dyn Host>) -> CollectorResult<()> {
        match self {
            Component::Extension(c) => c.start(host).await,
            Component::Exporter(c) => c.start(host).await,
            Component::Processor(c) => c.start(host).await,
            Component::Receiver(c) => c.start(host).await,
        }
    }

    async fn shutdown(&self) -> CollectorResult<()> {
        match self {
            Component::Extension(c) => c.shutdown().await,
            Component::Exporter(c) => c.shutdown().await,
            Component::Processor(c) => c.shutdown().await,
            Component::Receiver(c) => c.shutdown().await,
        }
    }
}

/// The running collector service
pub struct CollectorService {
    assembly: Assembly,
    settings: ServiceSettings,
    host: Arc<CollectorHost>,
    fatal_rx: Mutex<mpsc::UnboundedReceiver<CollectorError>>,
    started: Mutex<Vec<(ComponentDescriptor, Component)>>,
}

impl CollectorService {
    /// Create a service over an assembled graph
    pub fn new(assembly: Assembly, settings: ServiceSettings) -> Self {
        let (host, fatal_rx) = CollectorHost::new();
        Self {
            assembly,
            settings,
            host,
            fatal_rx: Mutex::new(fatal_rx),
            started: Mutex::new(Vec::new()),
        }
    }

    /// The host components run under
    pub fn host(&self) -> Arc<CollectorHost> {
        Arc::clone(&self.host)
    }

    /// Startup order: extensions, exporters, processors in pipeline
    /// reverse order, receivers.
    fn startup_order(&self) -> Vec<(ComponentDescriptor, Component)> {
        let mut order = Vec::new();

        for (descriptor, extension) in &self.assembly.extensions {
            order.push((descriptor.clone(), Component::Extension(Arc::clone(extension))));
        }
        for (descriptor, exporter) in &self.assembly.exporters {
            order.push((descriptor.clone(), Component::Exporter(Arc::clone(exporter))));
        }
        for pipeline in &self.assembly.pipelines {
            for (descriptor, processor) in pipeline.processors.iter().rev() {
                order.push((descriptor.clone(), Component::Processor(Arc::clone(processor))));
            }
        }
        for (descriptor, receiver) in &self.assembly.receivers {
            order.push((descriptor.clone(), Component::Receiver(Arc::clone(receiver))));
        }

        order
    }

    /// Start every component. On failure the already-started prefix is
    /// shut down in reverse and the startup error is returned.
    pub async fn start(&self) -> CollectorResult<()> {
        info!("Starting collector service");

        let mut started = self.started.lock().await;
        if !started.is_empty() {
            return Err(CollectorError::start("collector service already started"));
        }

        for (descriptor, component) in self.startup_order() {
            info!(component = %descriptor, "Component is starting...");

            let result = component
                .start(Arc::clone(&self.host) as Arc<dyn Host>)
                .await;

            // Start returned; the component owes us a shutdown either way.
            started.push((descriptor.clone(), component));

            if let Err(e) = result {
                error!(component = %descriptor, error = %e, "Component failed to start");

                let to_rollback = std::mem::take(&mut *started);
                drop(started);
                self.shutdown_components(to_rollback).await;

                return Err(CollectorError::start_with_source(
                    format!("cannot start component {}", descriptor),
                    e,
                ));
            }

            info!(component = %descriptor, "Component started.");
        }

        info!("Collector service started");
        Ok(())
    }

    /// Stop every started component in reverse start order. All
    /// components are attempted; failures are aggregated.
    pub async fn shutdown(&self) -> CollectorResult<()> {
        info!("Stopping collector service");

        // Cancel the process-wide handle first so background work and
        // in-flight consume calls unwind promptly.
        self.host.cancel();

        let components = std::mem::take(&mut *self.started.lock().await);
        let errors = self.shutdown_components(components).await;

        info!("Collector service stopped");
        CollectorError::shutdown(errors)
    }

    /// Wait for the first fatal error reported by a component, or forever
    /// if the channel closes without one.
    pub async fn wait_for_fatal_error(&self) -> Option<CollectorError> {
        self.fatal_rx.lock().await.recv().await
    }

    async fn shutdown_components(
        &self,
        mut components: Vec<(ComponentDescriptor, Component)>,
    ) -> Vec<CollectorError> {
        let deadline = Duration::from_millis(self.settings.shutdown_timeout_ms);
        let mut errors = Vec::new();

        components.reverse();
        for (descriptor, component) in components {
            info!(component = %descriptor, "Component is stopping...");

            match tokio::time::timeout(deadline, component.shutdown()).await {
                Ok(Ok(())) => {
                    info!(component = %descriptor, "Component stopped.");
                }
                Ok(Err(e)) => {
                    warn!(component = %descriptor, error = %e, "Component failed to stop");
                    errors.push(CollectorError::internal_with_source(
                        format!("cannot stop component {}", descriptor),
                        e,
                    ));
                }
                Err(_) => {
                    warn!(component = %descriptor, "Component shutdown timed out");
                    errors.push(CollectorError::timeout(format!(
                        "shutdown of component {} timed out",
                        descriptor
                    )));
                }
            }
        }

        errors
    }
}
