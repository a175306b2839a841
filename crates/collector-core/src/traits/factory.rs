//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Component factory contracts for the rheo collector core
//!
//! Factories turn configuration into component instances during assembly.
//! A factory may not support every data type; returning
//! `CollectorError::DataTypeNotSupported` is a configuration error only
//! when a pipeline actually requires that combination.
//!
//! A receiver factory asked to create the same named receiver for several
//! data types must return the same instance each time; the assembler
//! enforces this with pointer equality.

use async_trait::async_trait;
use std::sync::Arc;

use super::consumer::Consumer;
use super::exporter::TelemetryExporter;
use super::extension::Extension;
use super::processor::TelemetryProcessor;
use super::receiver::TelemetryReceiver;
use crate::error::CollectorResult;
use crate::types::DataType;

/// Factory for telemetry receivers.
#[async_trait]
pub trait ReceiverFactory: Send + Sync {
    /// The configuration type name this factory serves
    fn type_name(&self) -> &str;

    /// Default configuration for this component type
    fn default_config(&self) -> serde_json::Value;

    /// Create (or return the cached) receiver named `name`, bound to
    /// `next` for batches of `data_type`.
    async fn create_receiver(
        &self,
        name: &str,
        config: &serde_json::Value,
        data_type: DataType,
        next: Arc<dyn Consumer>,
    ) -> CollectorResult<Arc<dyn TelemetryReceiver>>;
}

/// Factory for telemetry processors.
#[async_trait]
pub trait ProcessorFactory: Send + Sync {
    /// The configuration type name this factory serves
    fn type_name(&self) -> &str;

    /// Default configuration for this component type
    fn default_config(&self) -> serde_json::Value;

    /// Create a processor named `name` with `next` as its downstream.
    async fn create_processor(
        &self,
        name: &str,
        config: &serde_json::Value,
        data_type: DataType,
        next: Arc<dyn Consumer>,
    ) -> CollectorResult<Arc<dyn TelemetryProcessor>>;
}

/// Factory for telemetry exporters.
#[async_trait]
pub trait ExporterFactory: Send + Sync {
    /// The configuration type name this factory serves
    fn type_name(&self) -> &str;

    /// Default configuration for this component type
    fn default_config(&self) -> serde_json::Value;

    /// Create an exporter named `name` for batches of `data_type`.
    async fn create_exporter(
        &self,
        name: &str,
        config: &serde_json::Value,
        data_type: DataType,
    ) -> CollectorResult<Arc<dyn TelemetryExporter>>;
}

/// Factory for service extensions.
#[async_trait]
pub trait ExtensionFactory: Send + Sync {
    /// The configuration type name this factory serves
    fn type_name(&self) -> &str;

    /// Default configuration for this component type
    fn default_config(&self) -> serde_json::Value;

    /// Create an extension named `name`.
    async fn create_extension(
        &self,
        name: &str,
        config: &serde_json::Value,
    ) -> CollectorResult<Arc<dyn Extension>>;
}
