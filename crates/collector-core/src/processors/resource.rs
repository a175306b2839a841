//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Resource processor for the rheo collector core
//!
//! Merges configured attributes into each batch's resource descriptor.
//! Configured attributes win over attributes already present. With an
//! empty attribute set the processor forwards unchanged and declares no
//! mutation, so upstream fan-outs keep sharing the batch.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::CollectorResult;
use crate::traits::processor::into_owned;
use crate::traits::{
    ConsumeContext, Consumer, ProcessorFactory, TelemetryProcessor,
};
use crate::types::{DataType, TelemetryBatch};

/// Resource processor configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceProcessorConfig {
    /// Attributes merged into each batch's resource
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

/// Resource processor
pub struct ResourceProcessor {
    name: String,
    attributes: HashMap<String, String>,
    next: Arc<dyn Consumer>,
}

impl ResourceProcessor {
    /// Create a resource processor
    pub fn new(
        name: impl Into<String>,
        config: ResourceProcessorConfig,
        next: Arc<dyn Consumer>,
    ) -> Self {
        Self {
            name: name.into(),
            attributes: config.attributes,
            next,
        }
    }
}

#[async_trait]
impl TelemetryProcessor for ResourceProcessor {
    fn name(&self) -> &str {
        &self.name
    }

    fn mutates_data(&self) -> bool {
        !self.attributes.is_empty()
    }

    async fn process(
        &self,
        cx: &ConsumeContext,
        batch: Arc<TelemetryBatch>,
    ) -> CollectorResult<()> {
        if self.attributes.is_empty() {
            return self.next.consume(cx, batch).await;
        }

        let mut owned = into_owned(batch);
        for (key, value) in &self.attributes {
            owned
                .resource_mut()
                .attributes
                .insert(key.clone(), value.clone());
        }

        self.next.consume(cx, Arc::new(owned)).await
    }
}

/// Factory for resource processors
pub struct ResourceProcessorFactory;

impl ResourceProcessorFactory {
    /// Create the factory
    pub fn new() -> Self {
        Self
    }
}

impl Default for ResourceProcessorFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProcessorFactory for ResourceProcessorFactory {
    fn type_name(&self) -> &str {
        "resource"
    }

    fn default_config(&self) -> serde_json::Value {
        serde_json::json!({ "attributes": {} })
    }

    async fn create_processor(
        &self,
        name: &str,
        config: &serde_json::Value,
        _data_type: DataType,
        next: Arc<dyn Consumer>,
    ) -> CollectorResult<Arc<dyn TelemetryProcessor>> {
        let config: ResourceProcessorConfig = serde_json::from_value(config.clone())?;
        Ok(Arc::new(ResourceProcessor::new(name, config, next)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{InstrumentationScope, Resource, ScopeSpans, Span, TracesBatch};
    use tokio::sync::Mutex;

    struct RecordingConsumer {
        received: Mutex<Vec<Arc<TelemetryBatch>>>,
    }

    impl RecordingConsumer {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                received: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Consumer for RecordingConsumer {
        async fn consume(
            &self,
            _cx: &ConsumeContext,
            batch: Arc<TelemetryBatch>,
        ) -> CollectorResult<()> {
            self.received.lock().await.push(batch);
            Ok(())
        }
    }

    fn trace_batch_with_resource(attrs: HashMap<String, String>) -> Arc<TelemetryBatch> {
        Arc::new(TelemetryBatch::Traces(TracesBatch::new(
            Resource::new(attrs),
            vec![ScopeSpans {
                scope: InstrumentationScope::new("test"),
                spans: vec![Span::named("a")],
            }],
        )))
    }

    #[tokio::test]
    async fn test_attributes_are_merged() {
        let sink = RecordingConsumer::new();
        let processor = ResourceProcessor::new(
            "resource",
            ResourceProcessorConfig {
                attributes: HashMap::from([
                    ("deployment".to_string(), "prod".to_string()),
                    ("region".to_string(), "eu-west-1".to_string()),
                ]),
            },
            sink.clone(),
        );
        assert!(processor.mutates_data());

        let batch = trace_batch_with_resource(HashMap::from([
            ("service".to_string(), "api".to_string()),
            ("region".to_string(), "local".to_string()),
        ]));

        processor
            .process(&ConsumeContext::background(), batch)
            .await
            .unwrap();

        let received = sink.received.lock().await;
        let attrs = &received[0].resource().attributes;
        assert_eq!(attrs.get("service").unwrap(), "api");
        assert_eq!(attrs.get("deployment").unwrap(), "prod");
        // Configured attributes win.
        assert_eq!(attrs.get("region").unwrap(), "eu-west-1");
    }

    #[tokio::test]
    async fn test_empty_config_shares_batch() {
        let sink = RecordingConsumer::new();
        let processor = ResourceProcessor::new(
            "resource",
            ResourceProcessorConfig::default(),
            sink.clone(),
        );
        assert!(!processor.mutates_data());

        let batch = trace_batch_with_resource(HashMap::new());
        processor
            .process(&ConsumeContext::background(), Arc::clone(&batch))
            .await
            .unwrap();

        let received = sink.received.lock().await;
        assert!(Arc::ptr_eq(&received[0], &batch));
    }
}
