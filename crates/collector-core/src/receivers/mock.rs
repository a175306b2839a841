//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Mock receiver for testing the rheo collector core
//!
//! A push-driven receiver: tests feed batches in with `push` and the
//! receiver forwards them to the consumer the assembler attached for the
//! batch's data type. The factory caches one instance per configured
//! name so a receiver serving several data types is the same object for
//! each, as the assembler requires; a misbehaving variant returns fresh
//! instances to exercise the rejection path.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::component::Host;
use crate::error::{CollectorError, CollectorResult};
use crate::traits::{ConsumeContext, Consumer, ReceiverFactory, TelemetryReceiver};
use crate::types::{DataType, TelemetryBatch};

/// Push-driven mock receiver
pub struct MockReceiver {
    name: String,
    consumers: RwLock<HashMap<DataType, Arc<dyn Consumer>>>,
    started: AtomicBool,
}

impl MockReceiver {
    /// Create a mock receiver with no attached consumers
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            consumers: RwLock::new(HashMap::new()),
            started: AtomicBool::new(false),
        }
    }

    /// Receiver name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attach the consumer serving one data type
    pub async fn attach(&self, data_type: DataType, consumer: Arc<dyn Consumer>) {
        self.consumers.write().await.insert(data_type, consumer);
    }

    /// Whether the receiver is currently started
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Feed one batch through the pipeline(s) attached for its data type.
    pub async fn push(
        &self,
        cx: &ConsumeContext,
        batch: Arc<TelemetryBatch>,
    ) -> CollectorResult<()> {
        if !self.is_started() {
            return Err(CollectorError::internal(format!(
                "receiver {} is not started",
                self.name
            )));
        }

        let data_type = batch.data_type();
        let consumer = {
            let consumers = self.consumers.read().await;
            consumers.get(&data_type).cloned()
        };

        match consumer {
            Some(consumer) => consumer.consume(cx, batch).await,
            None => Err(CollectorError::internal(format!(
                "receiver {} has no pipeline for {}",
                self.name, data_type
            ))),
        }
    }
}

#[async_trait]
impl TelemetryReceiver for MockReceiver {
    async fn start(&self, _host: Arc<dyn Host>) -> CollectorResult<()> {
        debug!(receiver = %self.name, "mock receiver starting");
        self.started.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn shutdown(&self) -> CollectorResult<()> {
        debug!(receiver = %self.name, "mock receiver stopping");
        self.started.store(false, Ordering::SeqCst);
        Ok(())
    }
}

/// Factory for mock receivers
pub struct MockReceiverFactory {
    instances: Mutex<HashMap<String, Arc<MockReceiver>>>,
    misbehave: bool,
}

impl MockReceiverFactory {
    /// A well-behaved factory: one cached instance per receiver name
    pub fn new() -> Self {
        Self {
            instances: Mutex::new(HashMap::new()),
            misbehave: false,
        }
    }

    /// A misbehaving factory returning a fresh instance on every call.
    ///
    /// Used to verify the assembler rejects receivers whose factory does
    /// not return the same instance across data types.
    pub fn misbehaving() -> Self {
        Self {
            instances: Mutex::new(HashMap::new()),
            misbehave: true,
        }
    }

    /// The cached instance for a receiver name, if one was created
    pub async fn instance(&self, name: &str) -> Option<Arc<MockReceiver>> {
        self.instances.lock().await.get(name).cloned()
    }
}

impl Default for MockReceiverFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReceiverFactory for MockReceiverFactory {
    fn type_name(&self) -> &str {
        "mock"
    }

    fn default_config(&self) -> serde_json::Value {
        serde_json::json!({})
    }

    async fn create_receiver(
        &self,
        name: &str,
        _config: &serde_json::Value,
        data_type: DataType,
        next: Arc<dyn Consumer>,
    ) -> CollectorResult<Arc<dyn TelemetryReceiver>> {
        if self.misbehave {
            let receiver = Arc::new(MockReceiver::new(name));
            receiver.attach(data_type, next).await;
            return Ok(receiver);
        }

        let mut instances = self.instances.lock().await;
        let receiver = instances
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(MockReceiver::new(name)))
            .clone();
        receiver.attach(data_type, next).await;
        Ok(receiver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::CollectorHost;
    use crate::types::{InstrumentationScope, Resource, ScopeSpans, Span, TracesBatch};

    struct CountingConsumer {
        count: std::sync::atomic::AtomicU64,
    }

    #[async_trait]
    impl Consumer for CountingConsumer {
        async fn consume(
            &self,
            _cx: &ConsumeContext,
            _batch: Arc<TelemetryBatch>,
        ) -> CollectorResult<()> {
            self.count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn trace_batch() -> Arc<TelemetryBatch> {
        Arc::new(TelemetryBatch::Traces(TracesBatch::new(
            Resource::default(),
            vec![ScopeSpans {
                scope: InstrumentationScope::new("test"),
                spans: vec![Span::named("a")],
            }],
        )))
    }

    #[tokio::test]
    async fn test_push_requires_start() {
        let receiver = MockReceiver::new("in");
        let err = receiver
            .push(&ConsumeContext::background(), trace_batch())
            .await;
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn test_push_routes_by_data_type() {
        let receiver = MockReceiver::new("in");
        let consumer = Arc::new(CountingConsumer {
            count: std::sync::atomic::AtomicU64::new(0),
        });
        receiver.attach(DataType::Traces, consumer.clone()).await;

        let (host, _fatal) = CollectorHost::new();
        receiver.start(host).await.unwrap();

        receiver
            .push(&ConsumeContext::background(), trace_batch())
            .await
            .unwrap();
        assert_eq!(consumer.count.load(Ordering::SeqCst), 1);

        receiver.shutdown().await.unwrap();
        assert!(!receiver.is_started());
    }

    #[tokio::test]
    async fn test_factory_caches_instance_per_name() {
        let factory = MockReceiverFactory::new();
        let consumer = Arc::new(CountingConsumer {
            count: std::sync::atomic::AtomicU64::new(0),
        });

        let a = factory
            .create_receiver("in", &serde_json::json!({}), DataType::Traces, consumer.clone())
            .await
            .unwrap();
        let b = factory
            .create_receiver("in", &serde_json::json!({}), DataType::Metrics, consumer)
            .await
            .unwrap();

        assert!(Arc::ptr_eq(&a, &b));
    }
}
