//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Fan-out junctions for the rheo collector core
//!
//! A junction forwards one inbound batch to N downstream consumers. When
//! no downstream mutates, every downstream shares the same allocation.
//! When some downstream mutates, mutating downstreams receive their own
//! deep copy so no branch ever observes another branch's mutation. One
//! mutating downstream is handed the junction's own reference and is
//! invoked after every other branch; its ownership take then skips the
//! copy, best-effort, when no other branch retained its reference past
//! its consume call.
//!
//! All downstreams are invoked regardless of individual failures; the
//! junction succeeds only if every downstream succeeds.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::{CollectorError, CollectorResult};
use crate::traits::{ConsumeContext, Consumer};
use crate::types::TelemetryBatch;

/// A downstream branch of a fan-out junction
#[derive(Clone)]
pub struct FanOutTarget {
    /// The branch's head consumer
    pub consumer: Arc<dyn Consumer>,

    /// Whether any stage in the branch mutates consumed data
    pub mutates_data: bool,
}

impl FanOutTarget {
    /// Create a fan-out target
    pub fn new(consumer: Arc<dyn Consumer>, mutates_data: bool) -> Self {
        Self {
            consumer,
            mutates_data,
        }
    }
}

/// Build the fan-out consumer for the given branches.
///
/// A single branch needs no junction: the branch head is returned
/// unchanged. Otherwise the variant is selected by whether any branch
/// mutates consumed data.
pub fn build(targets: Vec<FanOutTarget>) -> Arc<dyn Consumer> {
    if targets.len() == 1 {
        return targets.into_iter().next().expect("one target").consumer;
    }

    let any_mutates = targets.iter().any(|t| t.mutates_data);
    if any_mutates {
        Arc::new(CloningFanOutConsumer { targets })
    } else {
        Arc::new(FanOutConsumer {
            consumers: targets.into_iter().map(|t| t.consumer).collect(),
        })
    }
}

/// Shared-batch fan-out: every downstream receives the same allocation.
///
/// Used only when no downstream branch mutates; downstreams treat the
/// batch as read-only.
pub struct FanOutConsumer {
    consumers: Vec<Arc<dyn Consumer>>,
}

#[async_trait]
impl Consumer for FanOutConsumer {
    async fn consume(
        &self,
        cx: &ConsumeContext,
        batch: Arc<TelemetryBatch>,
    ) -> CollectorResult<()> {
        let mut errors = Vec::new();

        for consumer in &self.consumers {
            if let Err(e) = consumer.consume(cx, Arc::clone(&batch)).await {
                errors.push(e);
            }
        }

        CollectorError::combine(errors)
    }
}

/// Cloning fan-out: mutating downstreams receive independent deep copies.
///
/// Non-mutating downstreams share the original allocation. One mutating
/// downstream is designated to receive the junction's own reference and
/// is invoked after all other branches; by then every other handoff has
/// been dropped, so its ownership take needs no copy. If some branch
/// retained its reference past its consume call (a queuing exporter,
/// say) the take deep-copies instead. Isolation never depends on this:
/// a still-shared allocation is copied at the point of mutation.
pub struct CloningFanOutConsumer {
    targets: Vec<FanOutTarget>,
}

#[async_trait]
impl Consumer for CloningFanOutConsumer {
    async fn consume(
        &self,
        cx: &ConsumeContext,
        batch: Arc<TelemetryBatch>,
    ) -> CollectorResult<()> {
        let designated = self.targets.iter().rposition(|t| t.mutates_data);

        let mut errors = Vec::new();

        // Every branch except the designated one first: deep copies for
        // mutating branches, shared references for read-only branches.
        // Each handoff is dropped as its consume call returns.
        for (i, target) in self.targets.iter().enumerate() {
            if Some(i) == designated {
                continue;
            }

            let handoff = if target.mutates_data {
                Arc::new(batch.as_ref().clone())
            } else {
                Arc::clone(&batch)
            };
            if let Err(e) = target.consumer.consume(cx, handoff).await {
                errors.push(e);
            }
        }

        // The designated mutating branch runs last with the junction's
        // own reference.
        if let Some(i) = designated {
            if let Err(e) = self.targets[i].consumer.consume(cx, batch).await {
                errors.push(e);
            }
        }

        CollectorError::combine(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::processor::into_owned;
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

    struct RenamingConsumer {
        new_name: String,
        sink: Arc<RecordingConsumer>,
    }

    #[async_trait]
    impl Consumer for RenamingConsumer {
        async fn consume(
            &self,
            cx: &ConsumeContext,
            batch: Arc<TelemetryBatch>,
        ) -> CollectorResult<()> {
            let mut owned = into_owned(batch);
            if let TelemetryBatch::Traces(b) = &mut owned {
                for scope in &mut b.scopes {
                    for span in &mut scope.spans {
                        span.name = self.new_name.clone();
                    }
                }
            }
            self.sink.consume(cx, Arc::new(owned)).await
        }
    }

    struct DiscardingConsumer;

    #[async_trait]
    impl Consumer for DiscardingConsumer {
        async fn consume(
            &self,
            _cx: &ConsumeContext,
            _batch: Arc<TelemetryBatch>,
        ) -> CollectorResult<()> {
            Ok(())
        }
    }

    struct UniqueOwnershipProbe {
        observed_unique: std::sync::atomic::AtomicBool,
    }

    #[async_trait]
    impl Consumer for UniqueOwnershipProbe {
        async fn consume(
            &self,
            _cx: &ConsumeContext,
            batch: Arc<TelemetryBatch>,
        ) -> CollectorResult<()> {
            self.observed_unique.store(
                Arc::strong_count(&batch) == 1,
                std::sync::atomic::Ordering::SeqCst,
            );
            Ok(())
        }
    }

    struct FailingConsumer;

    #[async_trait]
    impl Consumer for FailingConsumer {
        async fn consume(
            &self,
            _cx: &ConsumeContext,
            _batch: Arc<TelemetryBatch>,
        ) -> CollectorResult<()> {
            Err(CollectorError::transient("downstream unavailable"))
        }
    }

    fn trace_batch(span_name: &str) -> Arc<TelemetryBatch> {
        Arc::new(TelemetryBatch::Traces(TracesBatch::new(
            Resource::default(),
            vec![ScopeSpans {
                scope: InstrumentationScope::new("test"),
                spans: vec![Span::named(span_name)],
            }],
        )))
    }

    fn first_span_name(batch: &TelemetryBatch) -> String {
        match batch {
            TelemetryBatch::Traces(b) => b.scopes[0].spans[0].name.clone(),
            _ => panic!("expected traces"),
        }
    }

    #[tokio::test]
    async fn test_single_target_is_identity() {
        let sink = RecordingConsumer::new();
        let consumer: Arc<dyn Consumer> = sink.clone();
        let junction = build(vec![FanOutTarget::new(consumer.clone(), false)]);
        assert!(Arc::ptr_eq(&junction, &consumer));
    }

    #[tokio::test]
    async fn test_shared_fanout_shares_allocation() {
        let a = RecordingConsumer::new();
        let b = RecordingConsumer::new();
        let junction = build(vec![
            FanOutTarget::new(a.clone(), false),
            FanOutTarget::new(b.clone(), false),
        ]);

        let batch = trace_batch("shared");
        junction
            .consume(&ConsumeContext::background(), batch)
            .await
            .unwrap();

        let seen_a = a.received.lock().await;
        let seen_b = b.received.lock().await;
        assert_eq!(seen_a.len(), 1);
        assert_eq!(seen_b.len(), 1);
        assert!(Arc::ptr_eq(&seen_a[0], &seen_b[0]));
    }

    #[tokio::test]
    async fn test_cloning_fanout_isolates_mutation() {
        let mutated_sink = RecordingConsumer::new();
        let shared_sink = RecordingConsumer::new();

        let renamer = Arc::new(RenamingConsumer {
            new_name: "X".to_string(),
            sink: mutated_sink.clone(),
        });

        let junction = build(vec![
            FanOutTarget::new(renamer, true),
            FanOutTarget::new(shared_sink.clone(), false),
        ]);

        junction
            .consume(&ConsumeContext::background(), trace_batch("Y"))
            .await
            .unwrap();

        let mutated = mutated_sink.received.lock().await;
        let shared = shared_sink.received.lock().await;
        assert_eq!(first_span_name(&mutated[0]), "X");
        assert_eq!(first_span_name(&shared[0]), "Y");
    }

    #[tokio::test]
    async fn test_two_mutating_branches_are_isolated() {
        let sink_a = RecordingConsumer::new();
        let sink_b = RecordingConsumer::new();

        let junction = build(vec![
            FanOutTarget::new(
                Arc::new(RenamingConsumer {
                    new_name: "A".to_string(),
                    sink: sink_a.clone(),
                }),
                true,
            ),
            FanOutTarget::new(
                Arc::new(RenamingConsumer {
                    new_name: "B".to_string(),
                    sink: sink_b.clone(),
                }),
                true,
            ),
        ]);

        junction
            .consume(&ConsumeContext::background(), trace_batch("orig"))
            .await
            .unwrap();

        assert_eq!(first_span_name(&sink_a.received.lock().await[0]), "A");
        assert_eq!(first_span_name(&sink_b.received.lock().await[0]), "B");
    }

    #[tokio::test]
    async fn test_designated_mutator_runs_last_with_sole_reference() {
        let probe = Arc::new(UniqueOwnershipProbe {
            observed_unique: std::sync::atomic::AtomicBool::new(false),
        });

        // The mutating branch is listed first but invoked last; the
        // non-mutating branch drops its handoff on return, so the probe
        // sees a uniquely-owned allocation.
        let junction = build(vec![
            FanOutTarget::new(probe.clone(), true),
            FanOutTarget::new(Arc::new(DiscardingConsumer), false),
        ]);

        junction
            .consume(&ConsumeContext::background(), trace_batch("x"))
            .await
            .unwrap();

        assert!(probe
            .observed_unique
            .load(std::sync::atomic::Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_all_downstreams_invoked_despite_errors() {
        let sink = RecordingConsumer::new();
        let junction = build(vec![
            FanOutTarget::new(Arc::new(FailingConsumer), false),
            FanOutTarget::new(sink.clone(), false),
        ]);

        let result = junction
            .consume(&ConsumeContext::background(), trace_batch("x"))
            .await;

        assert!(result.is_err());
        assert_eq!(sink.received.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_errors_are_combined() {
        let junction = build(vec![
            FanOutTarget::new(Arc::new(FailingConsumer), false),
            FanOutTarget::new(Arc::new(FailingConsumer), false),
        ]);

        let result = junction
            .consume(&ConsumeContext::background(), trace_batch("x"))
            .await;

        match result {
            Err(CollectorError::Multiple { errors }) => assert_eq!(errors.len(), 2),
            other => panic!("expected Multiple, got {:?}", other),
        }
    }
}
