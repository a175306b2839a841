//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Mock extension for testing the rheo collector core
//!
//! Records lifecycle calls so tests can assert that extensions start
//! before and stop after every pipeline component.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::component::Host;
use crate::error::CollectorResult;
use crate::traits::{Extension, ExtensionFactory};

/// Lifecycle-recording mock extension
pub struct MockExtension {
    name: String,
    started: AtomicBool,
    shutdown_calls: AtomicU64,
}

impl MockExtension {
    /// Create a mock extension
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            started: AtomicBool::new(false),
            shutdown_calls: AtomicU64::new(0),
        }
    }

    /// Whether `start` has been called without a later `shutdown`
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Number of `shutdown` calls observed
    pub fn shutdown_calls(&self) -> u64 {
        self.shutdown_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Extension for MockExtension {
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&self, _host: Arc<dyn Host>) -> CollectorResult<()> {
        self.started.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn shutdown(&self) -> CollectorResult<()> {
        self.shutdown_calls.fetch_add(1, Ordering::SeqCst);
        self.started.store(false, Ordering::SeqCst);
        Ok(())
    }
}

/// Factory for mock extensions
pub struct MockExtensionFactory {
    instances: Mutex<HashMap<String, Arc<MockExtension>>>,
}

impl MockExtensionFactory {
    /// Create the factory
    pub fn new() -> Self {
        Self {
            instances: Mutex::new(HashMap::new()),
        }
    }

    /// The cached instance for an extension name, if one was created
    pub async fn instance(&self, name: &str) -> Option<Arc<MockExtension>> {
        self.instances.lock().await.get(name).cloned()
    }
}

impl Default for MockExtensionFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExtensionFactory for MockExtensionFactory {
    fn type_name(&self) -> &str {
        "mock"
    }

    fn default_config(&self) -> serde_json::Value {
        serde_json::json!({})
    }

    async fn create_extension(
        &self,
        name: &str,
        _config: &serde_json::Value,
    ) -> CollectorResult<Arc<dyn Extension>> {
        let mut instances = self.instances.lock().await;
        let extension = instances
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(MockExtension::named(name)))
            .clone();
        Ok(extension)
    }
}
