//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! End-to-end pipeline scenarios
//!
//! Each test assembles a collector from declarative configuration with
//! the in-tree mock components and drives real batches through the
//! resulting graph.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use collector_core::builder::PipelineGraphBuilder;
use collector_core::config::ServiceConfig;
use collector_core::export::{
    DeliveryConfig, DeliveryCore, ReconnectConfig, RetryConfig, SendCode, SendFailure,
};
use collector_core::export::mock::MockChannel;
use collector_core::exporters::mock::MockExporterFactory;
use collector_core::processors::memory_limiter::{MemoryLimiterConfig, MemoryLimiterProcessor};
use collector_core::processors::mock::MockProcessorFactory;
use collector_core::receivers::mock::MockReceiverFactory;
use collector_core::service::{CollectorHost, CollectorService};
use collector_core::traits::{ConsumeContext, Consumer, TelemetryExporter, TelemetryProcessor};
use collector_core::types::{
    DataType, InstrumentationScope, Resource, ScopeSpans, Span, TelemetryBatch, TracesBatch,
};
use collector_core::{CollectorError, CollectorResult, FactoryRegistry, ServiceSettings};

struct Harness {
    receivers: Arc<MockReceiverFactory>,
    exporters: Arc<MockExporterFactory>,
    service: CollectorService,
}

async fn assemble(config_yaml: &str) -> Harness {
    let config = ServiceConfig::from_yaml(config_yaml).expect("config parses");

    let receivers = Arc::new(MockReceiverFactory::new());
    let exporters = Arc::new(MockExporterFactory::new());

    let mut registry = FactoryRegistry::new();
    registry
        .register_receiver(Arc::clone(&receivers) as _)
        .unwrap();
    registry
        .register_processor(Arc::new(MockProcessorFactory::new()))
        .unwrap();
    registry
        .register_exporter(Arc::clone(&exporters) as _)
        .unwrap();

    let assembly = PipelineGraphBuilder::new(&config, &registry)
        .build()
        .await
        .expect("assembly succeeds");

    Harness {
        receivers,
        exporters,
        service: CollectorService::new(assembly, ServiceSettings::default()),
    }
}

fn trace_batch(span_names: &[&str]) -> Arc<TelemetryBatch> {
    Arc::new(TelemetryBatch::Traces(TracesBatch::new(
        Resource::default(),
        vec![ScopeSpans {
            scope: InstrumentationScope::new("scenario"),
            spans: span_names.iter().map(|n| Span::named(*n)).collect(),
        }],
    )))
}

fn span_names(batch: &TelemetryBatch) -> Vec<String> {
    match batch {
        TelemetryBatch::Traces(b) => b
            .scopes
            .iter()
            .flat_map(|s| s.spans.iter().map(|span| span.name.clone()))
            .collect(),
        _ => panic!("expected a traces batch"),
    }
}

/// S1: one receiver fanning out to two exporters with no processors.
/// Both exporters observe the same batch object and nothing is dropped.
#[tokio::test]
async fn fanout_without_mutation_shares_the_batch() {
    let harness = assemble(
        r#"
receivers:
  r1:
    type: mock
exporters:
  e1:
    type: mock
  e2:
    type: mock
service:
  pipelines:
    traces:
      receivers: [r1]
      exporters: [e1, e2]
"#,
    )
    .await;
    harness.service.start().await.unwrap();

    let receiver = harness.receivers.instance("r1").await.unwrap();
    receiver
        .push(&ConsumeContext::background(), trace_batch(&["a", "b", "c"]))
        .await
        .unwrap();

    let e1 = harness.exporters.instance(DataType::Traces, "e1").await.unwrap();
    let e2 = harness.exporters.instance(DataType::Traces, "e2").await.unwrap();

    let seen_e1 = e1.received_batches().await;
    let seen_e2 = e2.received_batches().await;
    assert_eq!(seen_e1.len(), 1);
    assert_eq!(seen_e2.len(), 1);
    assert!(Arc::ptr_eq(&seen_e1[0], &seen_e2[0]));

    let total = e1.received_items().await + e2.received_items().await;
    assert_eq!(total, 6);

    harness.service.shutdown().await.unwrap();
}

/// S2: two pipelines share a receiver; one mutates span names. The
/// mutating branch sees its own copy, the other branch the original.
#[tokio::test]
async fn cloning_fanout_isolates_the_mutating_branch() {
    let harness = assemble(
        r#"
receivers:
  r1:
    type: mock
processors:
  rename:
    type: mock
    mutates_data: true
    set_span_name: X
exporters:
  e1:
    type: mock
  e2:
    type: mock
service:
  pipelines:
    traces:
      receivers: [r1]
      processors: [rename]
      exporters: [e1]
    traces/passthrough:
      receivers: [r1]
      exporters: [e2]
"#,
    )
    .await;
    harness.service.start().await.unwrap();

    let receiver = harness.receivers.instance("r1").await.unwrap();
    receiver
        .push(&ConsumeContext::background(), trace_batch(&["Y"]))
        .await
        .unwrap();

    let e1 = harness.exporters.instance(DataType::Traces, "e1").await.unwrap();
    let e2 = harness.exporters.instance(DataType::Traces, "e2").await.unwrap();

    assert_eq!(span_names(&e1.received_batches().await[0]), vec!["X"]);
    assert_eq!(span_names(&e2.received_batches().await[0]), vec!["Y"]);

    harness.service.shutdown().await.unwrap();
}

fn scripted_delivery(channel: Arc<MockChannel>, initial_backoff_ms: u64) -> DeliveryCore {
    DeliveryCore::new(
        DeliveryConfig {
            name: "e1".to_string(),
            retry: RetryConfig {
                initial_backoff_ms,
                multiplier: 1.5,
                max_backoff_ms: 10_000,
                max_elapsed_ms: 60_000,
                jitter_factor: 0.0,
            },
            reconnect: ReconnectConfig::default(),
        },
        channel,
    )
}

/// S3: the endpoint answers UNAVAILABLE twice and then accepts. The
/// batch is delivered on the third attempt after two backoff waits.
#[tokio::test]
async fn retry_on_unavailable_then_success() {
    let channel = Arc::new(MockChannel::new());
    channel.script_failure(SendFailure::new(SendCode::Unavailable, "server busy"));
    channel.script_failure(SendFailure::new(SendCode::Unavailable, "server busy"));

    let core = scripted_delivery(Arc::clone(&channel), 50);
    let (host, _fatal) = CollectorHost::new();
    core.start(host).await.unwrap();

    let started = Instant::now();
    let result = core
        .export(
            &ConsumeContext::background(),
            trace_batch(&["a", "b", "c", "d", "e"]),
        )
        .await
        .unwrap();
    let elapsed = started.elapsed();

    assert_eq!(result.records_exported, 5);
    assert_eq!(channel.send_attempts(), 3);
    // At least the first two backoff intervals: 50ms + 75ms.
    assert!(elapsed >= Duration::from_millis(125), "elapsed {:?}", elapsed);

    core.shutdown().await.unwrap();
}

/// S4: the endpoint answers INVALID_ARGUMENT. Exactly one attempt is
/// made and the whole batch counts as dropped.
#[tokio::test]
async fn permanent_error_drops_everything_without_retry() {
    let channel = Arc::new(MockChannel::new());
    channel.always_fail(SendFailure::new(SendCode::InvalidArgument, "bad payload"));

    let core = scripted_delivery(Arc::clone(&channel), 50);
    let (host, _fatal) = CollectorHost::new();
    core.start(host).await.unwrap();

    let err = core
        .export(
            &ConsumeContext::background(),
            trace_batch(&["a", "b", "c", "d"]),
        )
        .await
        .unwrap_err();

    assert_eq!(err.dropped, 4);
    assert!(err.error.is_permanent());
    assert_eq!(channel.send_attempts(), 1);

    core.shutdown().await.unwrap();
}

struct CountingConsumer {
    consumed: AtomicU64,
}

#[async_trait::async_trait]
impl Consumer for CountingConsumer {
    async fn consume(
        &self,
        _cx: &ConsumeContext,
        _batch: Arc<TelemetryBatch>,
    ) -> CollectorResult<()> {
        self.consumed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// S5: the memory limiter flips between admitting and refusing as the
/// sampled allocation crosses the limit.
#[tokio::test]
async fn memory_limiter_trips_and_recovers() {
    let alloc = Arc::new(AtomicU64::new(800));
    let sampler_alloc = Arc::clone(&alloc);

    let sink = Arc::new(CountingConsumer {
        consumed: AtomicU64::new(0),
    });

    let limiter = MemoryLimiterProcessor::new(
        "memory_limiter",
        MemoryLimiterConfig {
            check_interval_ms: 10,
            limit_bytes: Some(1024),
            ..Default::default()
        },
        sink.clone(),
    )
    .unwrap()
    .with_sampler(Arc::new(move || sampler_alloc.load(Ordering::SeqCst)));

    let (host, _fatal) = CollectorHost::new();
    limiter.start(host).await.unwrap();
    let cx = ConsumeContext::background();

    tokio::time::sleep(Duration::from_millis(50)).await;
    for _ in 0..3 {
        limiter.process(&cx, trace_batch(&["a"])).await.unwrap();
    }
    assert_eq!(sink.consumed.load(Ordering::SeqCst), 3);

    alloc.store(1800, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(50)).await;
    for _ in 0..3 {
        let err = limiter.process(&cx, trace_batch(&["a"])).await.unwrap_err();
        assert!(matches!(err, CollectorError::ForcedDrop));
    }
    assert_eq!(sink.consumed.load(Ordering::SeqCst), 3);

    alloc.store(800, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(50)).await;
    limiter.process(&cx, trace_batch(&["a"])).await.unwrap();
    assert_eq!(sink.consumed.load(Ordering::SeqCst), 4);

    limiter.shutdown().await.unwrap();
}

/// S6: a receiver configured but referenced by no pipeline is skipped:
/// assembly succeeds, only the used receiver is started and stopped.
#[tokio::test]
async fn unused_receiver_is_skipped() {
    let harness = assemble(
        r#"
receivers:
  r1:
    type: mock
  r2:
    type: mock
exporters:
  e1:
    type: mock
service:
  pipelines:
    traces:
      receivers: [r1]
      exporters: [e1]
"#,
    )
    .await;
    harness.service.start().await.unwrap();

    let r1 = harness.receivers.instance("r1").await.unwrap();
    assert!(r1.is_started());

    // r2 was never built, let alone started.
    assert!(harness.receivers.instance("r2").await.is_none());

    harness.service.shutdown().await.unwrap();
    assert!(!r1.is_started());
}

/// Consume errors from an exporter surface at the receiver through the
/// fan-out, while the healthy branch still receives the batch.
#[tokio::test]
async fn exporter_failure_propagates_to_the_receiver() {
    let harness = assemble(
        r#"
receivers:
  r1:
    type: mock
exporters:
  e1:
    type: mock
  e2:
    type: mock
service:
  pipelines:
    traces:
      receivers: [r1]
      exporters: [e1, e2]
"#,
    )
    .await;
    harness.service.start().await.unwrap();

    let e1 = harness.exporters.instance(DataType::Traces, "e1").await.unwrap();
    e1.fail_next(1);

    let receiver = harness.receivers.instance("r1").await.unwrap();
    let result = receiver
        .push(&ConsumeContext::background(), trace_batch(&["a", "b"]))
        .await;

    assert!(result.is_err());

    let e2 = harness.exporters.instance(DataType::Traces, "e2").await.unwrap();
    assert_eq!(e2.received_items().await, 2);

    harness.service.shutdown().await.unwrap();
}
