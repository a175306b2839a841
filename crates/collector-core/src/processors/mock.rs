//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Mock processor for testing the rheo collector core
//!
//! A scriptable processor: optionally renames every span, optionally
//! fails every batch, and declares its mutation capability from
//! configuration so fan-out variants can be exercised.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::{CollectorError, CollectorResult};
use crate::traits::processor::into_owned;
use crate::traits::{
    ConsumeContext, Consumer, ProcessorFactory, TelemetryProcessor,
};
use crate::types::{DataType, TelemetryBatch};

/// Mock processor configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MockProcessorConfig {
    /// Declared mutation capability
    #[serde(default)]
    pub mutates_data: bool,

    /// Rename every span in trace batches to this name
    #[serde(default)]
    pub set_span_name: Option<String>,

    /// Fail every batch with a permanent error carrying this message
    #[serde(default)]
    pub fail_with: Option<String>,

    /// Fail the `start` call, for lifecycle rollback tests
    #[serde(default)]
    pub fail_start: bool,
}

/// Mock processor
pub struct MockProcessor {
    name: String,
    config: MockProcessorConfig,
    next: Arc<dyn Consumer>,
    processed: AtomicU64,
}

impl MockProcessor {
    /// Create a mock processor
    pub fn new(
        name: impl Into<String>,
        config: MockProcessorConfig,
        next: Arc<dyn Consumer>,
    ) -> Self {
        Self {
            name: name.into(),
            config,
            next,
            processed: AtomicU64::new(0),
        }
    }

    /// Number of batches processed
    pub fn processed_batches(&self) -> u64 {
        self.processed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TelemetryProcessor for MockProcessor {
    fn name(&self) -> &str {
        &self.name
    }

    fn mutates_data(&self) -> bool {
        self.config.mutates_data
    }

    async fn process(
        &self,
        cx: &ConsumeContext,
        batch: Arc<TelemetryBatch>,
    ) -> CollectorResult<()> {
        self.processed.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = &self.config.fail_with {
            return Err(CollectorError::permanent(message.clone()));
        }

        let renamed = match &self.config.set_span_name {
            Some(new_name) => {
                let mut owned = into_owned(batch);
                if let TelemetryBatch::Traces(traces) = &mut owned {
                    for scope in &mut traces.scopes {
                        for span in &mut scope.spans {
                            span.name = new_name.clone();
                        }
                    }
                }
                Arc::new(owned)
            }
            None => batch,
        };

        self.next.consume(cx, renamed).await
    }

    async fn start(&self, _host: Arc<dyn crate::component::Host>) -> CollectorResult<()> {
        if self.config.fail_start {
            return Err(CollectorError::start(format!(
                "processor {} refused to start",
                self.name
            )));
        }
        Ok(())
    }
}

/// Factory for mock processors
pub struct MockProcessorFactory;

impl MockProcessorFactory {
    /// Create the factory
    pub fn new() -> Self {
        Self
    }
}

impl Default for MockProcessorFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProcessorFactory for MockProcessorFactory {
    fn type_name(&self) -> &str {
        "mock"
    }

    fn default_config(&self) -> serde_json::Value {
        serde_json::json!({ "mutates_data": false })
    }

    async fn create_processor(
        &self,
        name: &str,
        config: &serde_json::Value,
        _data_type: DataType,
        next: Arc<dyn Consumer>,
    ) -> CollectorResult<Arc<dyn TelemetryProcessor>> {
        let config: MockProcessorConfig = serde_json::from_value(config.clone())?;
        Ok(Arc::new(MockProcessor::new(name, config, next)))
    }
}
