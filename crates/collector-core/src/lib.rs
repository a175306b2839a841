//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! rheo collector core
//!
//! This crate provides the pipeline engine of the rheo telemetry
//! collector: declarative configuration becomes a live graph of
//! receivers, processors, and exporters with data-type-aware fan-out,
//! retry/throttle-aware delivery, memory-pressure admission control, and
//! ordered lifecycle management.

pub mod builder;
pub mod component;
pub mod config;
pub mod error;
pub mod export;
pub mod exporters;
pub mod extensions;
pub mod fanout;
pub mod metrics;
pub mod processors;
pub mod receivers;
pub mod registry;
pub mod service;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use component::{ComponentDescriptor, ComponentKind, Host};
pub use config::ServiceConfig;
pub use error::{CollectorError, CollectorResult};
pub use types::{
    DataType, LogsBatch, MetricsBatch, Resource, TelemetryBatch, TracesBatch,
};

// Re-export the pipeline surface
pub use builder::{Assembly, BuiltPipeline, PipelineGraphBuilder};
pub use fanout::FanOutTarget;
pub use registry::FactoryRegistry;
pub use service::{CollectorService, ServiceSettings};

// Re-export component traits
pub use traits::{
    ConsumeContext, Consumer, Extension, TelemetryExporter, TelemetryProcessor, TelemetryReceiver,
};

/// Collector version information
pub const COLLECTOR_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Collector name
pub const COLLECTOR_NAME: &str = "rheo";

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "config/collector.yaml";

/// Register the in-tree component factories.
///
/// Embedding processes register vendor receiver and exporter factories
/// the same way before assembly.
pub fn default_registry() -> CollectorResult<FactoryRegistry> {
    use std::sync::Arc;

    let mut registry = FactoryRegistry::new();
    registry.register_receiver(Arc::new(receivers::MockReceiverFactory::new()))?;
    registry.register_processor(Arc::new(processors::MemoryLimiterFactory::new()))?;
    registry.register_processor(Arc::new(processors::ResourceProcessorFactory::new()))?;
    registry.register_processor(Arc::new(processors::MockProcessorFactory::new()))?;
    registry.register_exporter(Arc::new(exporters::LoggingExporterFactory::new()))?;
    registry.register_exporter(Arc::new(exporters::MockExporterFactory::new()))?;
    registry.register_extension(Arc::new(extensions::MockExtensionFactory::new()))?;
    Ok(registry)
}
