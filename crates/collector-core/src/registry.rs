//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Factory registry for the rheo collector core
//!
//! The registry maps `(kind, type)` to the factory that builds instances
//! of that component type. It is populated during process init, before
//! assembly, and read-only afterwards.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{CollectorError, CollectorResult};
use crate::traits::{ExporterFactory, ExtensionFactory, ProcessorFactory, ReceiverFactory};

/// Registry of component factories, keyed by type name per kind
#[derive(Default)]
pub struct FactoryRegistry {
    receivers: HashMap<String, Arc<dyn ReceiverFactory>>,
    processors: HashMap<String, Arc<dyn ProcessorFactory>>,
    exporters: HashMap<String, Arc<dyn ExporterFactory>>,
    extensions: HashMap<String, Arc<dyn ExtensionFactory>>,
}

impl FactoryRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a receiver factory. Called only during init.
    pub fn register_receiver(&mut self, factory: Arc<dyn ReceiverFactory>) -> CollectorResult<()> {
        let type_name = factory.type_name().to_string();
        if self.receivers.insert(type_name.clone(), factory).is_some() {
            return Err(CollectorError::configuration(format!(
                "duplicate receiver factory registered for type: {}",
                type_name
            )));
        }
        Ok(())
    }

    /// Register a processor factory. Called only during init.
    pub fn register_processor(
        &mut self,
        factory: Arc<dyn ProcessorFactory>,
    ) -> CollectorResult<()> {
        let type_name = factory.type_name().to_string();
        if self.processors.insert(type_name.clone(), factory).is_some() {
            return Err(CollectorError::configuration(format!(
                "duplicate processor factory registered for type: {}",
                type_name
            )));
        }
        Ok(())
    }

    /// Register an exporter factory. Called only during init.
    pub fn register_exporter(&mut self, factory: Arc<dyn ExporterFactory>) -> CollectorResult<()> {
        let type_name = factory.type_name().to_string();
        if self.exporters.insert(type_name.clone(), factory).is_some() {
            return Err(CollectorError::configuration(format!(
                "duplicate exporter factory registered for type: {}",
                type_name
            )));
        }
        Ok(())
    }

    /// Register an extension factory. Called only during init.
    pub fn register_extension(
        &mut self,
        factory: Arc<dyn ExtensionFactory>,
    ) -> CollectorResult<()> {
        let type_name = factory.type_name().to_string();
        if self.extensions.insert(type_name.clone(), factory).is_some() {
            return Err(CollectorError::configuration(format!(
                "duplicate extension factory registered for type: {}",
                type_name
            )));
        }
        Ok(())
    }

    /// Look up a receiver factory by type name
    pub fn receiver_factory(&self, type_name: &str) -> CollectorResult<Arc<dyn ReceiverFactory>> {
        self.receivers.get(type_name).cloned().ok_or_else(|| {
            CollectorError::configuration(format!(
                "receiver factory not found for type: {}",
                type_name
            ))
        })
    }

    /// Look up a processor factory by type name
    pub fn processor_factory(
        &self,
        type_name: &str,
    ) -> CollectorResult<Arc<dyn ProcessorFactory>> {
        self.processors.get(type_name).cloned().ok_or_else(|| {
            CollectorError::configuration(format!(
                "processor factory not found for type: {}",
                type_name
            ))
        })
    }

    /// Look up an exporter factory by type name
    pub fn exporter_factory(&self, type_name: &str) -> CollectorResult<Arc<dyn ExporterFactory>> {
        self.exporters.get(type_name).cloned().ok_or_else(|| {
            CollectorError::configuration(format!(
                "exporter factory not found for type: {}",
                type_name
            ))
        })
    }

    /// Look up an extension factory by type name
    pub fn extension_factory(
        &self,
        type_name: &str,
    ) -> CollectorResult<Arc<dyn ExtensionFactory>> {
        self.extensions.get(type_name).cloned().ok_or_else(|| {
            CollectorError::configuration(format!(
                "extension factory not found for type: {}",
                type_name
            ))
        })
    }
}
