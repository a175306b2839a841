//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Pipeline graph builder for the rheo collector core
//!
//! Turns a validated service configuration into the live graph:
//! exporters first, then each pipeline's processor chain walked in
//! reverse so every stage is constructed with its downstream consumer,
//! then receivers with one fan-out junction per data type. Nothing is
//! started here; the lifecycle coordinator owns ordering.
//!
//! A receiver configured but referenced by no pipeline is skipped with a
//! log line, as is an unused exporter. A receiver factory that returns
//! different instances for different data types is rejected.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::component::{ComponentDescriptor, ComponentKind};
use crate::config::{parse_pipeline_id, ServiceConfig};
use crate::error::{CollectorError, CollectorResult};
use crate::fanout::{self, FanOutTarget};
use crate::metrics::{record_items_accepted, record_items_dropped};
use crate::registry::FactoryRegistry;
use crate::traits::processor::ProcessorStage;
use crate::traits::{
    ConsumeContext, Consumer, Extension, TelemetryExporter, TelemetryProcessor, TelemetryReceiver,
};
use crate::types::{DataType, TelemetryBatch};

use async_trait::async_trait;

/// A materialized pipeline
pub struct BuiltPipeline {
    /// Pipeline id from configuration
    pub id: String,

    /// Data type the pipeline carries
    pub data_type: DataType,

    /// Head consumer: what receivers feed
    pub head: Arc<dyn Consumer>,

    /// OR of the `mutates_data` capability of every processor in the chain
    pub mutates_data: bool,

    /// Processor chain in pipeline (forward) order
    pub processors: Vec<(ComponentDescriptor, Arc<dyn TelemetryProcessor>)>,
}

/// The assembled component graph, ready for the lifecycle coordinator
pub struct Assembly {
    /// Extensions in configured order
    pub extensions: Vec<(ComponentDescriptor, Arc<dyn Extension>)>,

    /// Exporter instances, one per `(data type, name)` actually required
    pub exporters: Vec<(ComponentDescriptor, Arc<dyn TelemetryExporter>)>,

    /// Built pipelines
    pub pipelines: Vec<BuiltPipeline>,

    /// Receiver instances to start, one per used receiver name
    pub receivers: Vec<(ComponentDescriptor, Arc<dyn TelemetryReceiver>)>,
}

impl std::fmt::Debug for Assembly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assembly")
            .field("extensions", &self.extensions.len())
            .field("exporters", &self.exporters.len())
            .field("pipelines", &self.pipelines.len())
            .field("receivers", &self.receivers.len())
            .finish()
    }
}

/// Adapter exposing an exporter as a pipeline tail consumer.
///
/// Translates the push-with-drop-count contract into the consume
/// contract and keeps the accepted/dropped counters exact.
pub struct ExporterConsumer {
    exporter: Arc<dyn TelemetryExporter>,
}

impl ExporterConsumer {
    /// Wrap an exporter for use as a consumer
    pub fn new(exporter: Arc<dyn TelemetryExporter>) -> Self {
        Self { exporter }
    }
}

#[async_trait]
impl Consumer for ExporterConsumer {
    async fn consume(
        &self,
        cx: &ConsumeContext,
        batch: Arc<TelemetryBatch>,
    ) -> CollectorResult<()> {
        match self.exporter.export(cx, batch).await {
            Ok(result) => {
                record_items_accepted(self.exporter.name(), result.records_exported as u64);
                Ok(())
            }
            Err(e) => {
                warn!(
                    exporter = %self.exporter.name(),
                    dropped = e.dropped,
                    error = %e.error,
                    "export failed"
                );
                record_items_dropped(self.exporter.name(), e.dropped as u64);
                Err(e.error)
            }
        }
    }
}

/// Builder assembling the component graph from configuration
pub struct PipelineGraphBuilder<'a> {
    config: &'a ServiceConfig,
    registry: &'a FactoryRegistry,
}

impl<'a> PipelineGraphBuilder<'a> {
    /// Create a builder over a validated configuration
    pub fn new(config: &'a ServiceConfig, registry: &'a FactoryRegistry) -> Self {
        Self { config, registry }
    }

    /// Assemble the full graph. Fails before anything is started.
    pub async fn build(self) -> CollectorResult<Assembly> {
        self.config.validate_structure()?;

        let extensions = self.build_extensions().await?;
        let exporters = self.build_exporters().await?;
        let pipelines = self.build_pipelines(&exporters).await?;
        let receivers = self.build_receivers(&pipelines).await?;

        Ok(Assembly {
            extensions,
            exporters: exporters
                .into_iter()
                .map(|((data_type, name), exporter)| {
                    let type_name = self.config.exporters[&name].type_name.clone();
                    let descriptor = ComponentDescriptor::new(
                        ComponentKind::Exporter,
                        type_name,
                        format!("{}/{}", name, data_type),
                    );
                    (descriptor, exporter)
                })
                .collect(),
            pipelines,
            receivers,
        })
    }

    async fn build_extensions(
        &self,
    ) -> CollectorResult<Vec<(ComponentDescriptor, Arc<dyn Extension>)>> {
        let mut extensions = Vec::new();

        for name in &self.config.service.extensions {
            let settings = &self.config.extensions[name];
            let factory = self.registry.extension_factory(&settings.type_name)?;
            let extension = factory
                .create_extension(name, &settings.options_value())
                .await?;

            debug!(extension = %name, "extension is enabled");
            extensions.push((
                ComponentDescriptor::new(ComponentKind::Extension, &settings.type_name, name),
                extension,
            ));
        }

        Ok(extensions)
    }

    /// Data types each exporter name must serve, from pipeline wiring
    fn required_exporter_types(&self) -> HashMap<&str, Vec<DataType>> {
        let mut required: HashMap<&str, Vec<DataType>> = HashMap::new();

        for (id, pipeline) in &self.config.service.pipelines {
            let data_type = parse_pipeline_id(id).expect("validated pipeline id");
            for name in &pipeline.exporters {
                let types = required.entry(name.as_str()).or_default();
                if !types.contains(&data_type) {
                    types.push(data_type);
                }
            }
        }

        required
    }

    async fn build_exporters(
        &self,
    ) -> CollectorResult<HashMap<(DataType, String), Arc<dyn TelemetryExporter>>> {
        let required = self.required_exporter_types();
        let mut built = HashMap::new();

        for (name, settings) in &self.config.exporters {
            let Some(data_types) = required.get(name.as_str()) else {
                warn!(
                    exporter = %name,
                    "Ignoring exporter as it is not used by any pipeline"
                );
                continue;
            };

            let factory = self.registry.exporter_factory(&settings.type_name)?;

            for data_type in DataType::ALL {
                if !data_types.contains(&data_type) {
                    continue;
                }

                let exporter = factory
                    .create_exporter(name, &settings.options_value(), data_type)
                    .await
                    .map_err(|e| match e {
                        CollectorError::DataTypeNotSupported { .. } => {
                            CollectorError::configuration(format!(
                                "exporter {} does not support {} but it was used in a {} pipeline",
                                name, data_type, data_type
                            ))
                        }
                        other => other,
                    })?;

                debug!(exporter = %name, data_type = %data_type, "exporter is enabled");
                built.insert((data_type, name.clone()), exporter);
            }
        }

        Ok(built)
    }

    async fn build_pipelines(
        &self,
        exporters: &HashMap<(DataType, String), Arc<dyn TelemetryExporter>>,
    ) -> CollectorResult<Vec<BuiltPipeline>> {
        let mut pipelines = Vec::new();

        for (id, pipeline_cfg) in &self.config.service.pipelines {
            let data_type = parse_pipeline_id(id).expect("validated pipeline id");

            // Tail: fan out over the pipeline's exporters.
            let tail_targets = pipeline_cfg
                .exporters
                .iter()
                .map(|name| {
                    let exporter = exporters
                        .get(&(data_type, name.clone()))
                        .expect("exporter built for every referencing pipeline");
                    let consumer: Arc<dyn Consumer> =
                        Arc::new(ExporterConsumer::new(Arc::clone(exporter)));
                    FanOutTarget::new(consumer, false)
                })
                .collect::<Vec<_>>();
            let tail = fanout::build(tail_targets);

            // Walk the processor chain in reverse so each stage is
            // constructed with its downstream.
            let mut next = tail;
            let mut mutates_data = false;
            let mut processors = Vec::new();

            for name in pipeline_cfg.processors.iter().rev() {
                let settings = &self.config.processors[name];
                let factory = self.registry.processor_factory(&settings.type_name)?;
                let processor = factory
                    .create_processor(name, &settings.options_value(), data_type, next)
                    .await
                    .map_err(|e| match e {
                        CollectorError::DataTypeNotSupported { .. } => {
                            CollectorError::configuration(format!(
                                "processor {} does not support {} but it was used in pipeline {}",
                                name, data_type, id
                            ))
                        }
                        other => other,
                    })?;

                mutates_data = mutates_data || processor.mutates_data();
                processors.push((
                    ComponentDescriptor::new(ComponentKind::Processor, &settings.type_name, name),
                    Arc::clone(&processor),
                ));
                next = Arc::new(ProcessorStage::new(processor));
            }

            // Collected tail-first; pipeline order is forward.
            processors.reverse();

            info!(pipeline = %id, data_type = %data_type, "pipeline is enabled");
            pipelines.push(BuiltPipeline {
                id: id.clone(),
                data_type,
                head: next,
                mutates_data,
                processors,
            });
        }

        Ok(pipelines)
    }

    async fn build_receivers(
        &self,
        pipelines: &[BuiltPipeline],
    ) -> CollectorResult<Vec<(ComponentDescriptor, Arc<dyn TelemetryReceiver>)>> {
        let mut receivers = Vec::new();

        for (name, settings) in &self.config.receivers {
            // Pipelines attached to this receiver, grouped by data type.
            let mut attached: HashMap<DataType, Vec<&BuiltPipeline>> = HashMap::new();
            for pipeline in pipelines {
                let pipeline_cfg = &self.config.service.pipelines[&pipeline.id];
                if pipeline_cfg.receivers.contains(name) {
                    attached.entry(pipeline.data_type).or_default().push(pipeline);
                }
            }

            if attached.is_empty() {
                warn!(
                    receiver = %name,
                    "Ignoring receiver as it is not used by any pipeline"
                );
                continue;
            }

            let factory = self.registry.receiver_factory(&settings.type_name)?;
            let mut created: Option<Arc<dyn TelemetryReceiver>> = None;

            for data_type in DataType::ALL {
                let Some(attached_pipelines) = attached.get(&data_type) else {
                    continue;
                };

                let junction = fanout::build(
                    attached_pipelines
                        .iter()
                        .map(|p| FanOutTarget::new(Arc::clone(&p.head), p.mutates_data))
                        .collect(),
                );

                let receiver = factory
                    .create_receiver(name, &settings.options_value(), data_type, junction)
                    .await
                    .map_err(|e| match e {
                        CollectorError::DataTypeNotSupported { .. } => {
                            CollectorError::configuration(format!(
                                "receiver {} does not support {} but it was used in a {} pipeline",
                                name, data_type, data_type
                            ))
                        }
                        other => other,
                    })?;

                match &created {
                    None => created = Some(receiver),
                    Some(existing) => {
                        // The same receiver serves several data types; the
                        // factory must hand back the same instance.
                        if !Arc::ptr_eq(existing, &receiver) {
                            return Err(CollectorError::configuration(format!(
                                "factory for receiver {} must return the same instance \
                                 when creating receivers of different data types",
                                name
                            )));
                        }
                    }
                }

                info!(receiver = %name, data_type = %data_type, "receiver is enabled");
            }

            let receiver = created.expect("at least one data type attached");
            receivers.push((
                ComponentDescriptor::new(ComponentKind::Receiver, &settings.type_name, name),
                receiver,
            ));
        }

        Ok(receivers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServiceConfig;
    use crate::exporters::mock::MockExporterFactory;
    use crate::processors::memory_limiter::MemoryLimiterFactory;
    use crate::processors::mock::MockProcessorFactory;
    use crate::receivers::mock::MockReceiverFactory;
    use crate::traits::{ExportError, ExportResult};
    use crate::types::{InstrumentationScope, Resource, ScopeSpans, Span, TracesBatch};
    use mockall::mock;

    mock! {
        TestExporter {}

        #[async_trait]
        impl TelemetryExporter for TestExporter {
            fn name(&self) -> &str;

            async fn export(
                &self,
                cx: &ConsumeContext,
                batch: Arc<TelemetryBatch>,
            ) -> Result<ExportResult, ExportError>;
        }
    }

    fn trace_batch(spans: usize) -> Arc<TelemetryBatch> {
        Arc::new(TelemetryBatch::Traces(TracesBatch::new(
            Resource::default(),
            vec![ScopeSpans {
                scope: InstrumentationScope::new("test"),
                spans: (0..spans).map(|i| Span::named(format!("s{}", i))).collect(),
            }],
        )))
    }

    #[tokio::test]
    async fn test_exporter_consumer_translates_failures() {
        let mut exporter = MockTestExporter::new();
        exporter.expect_name().return_const("e1".to_string());
        exporter
            .expect_export()
            .times(1)
            .returning(|_, batch| Err(ExportError::permanent(batch.item_count(), "scripted")));

        let consumer = ExporterConsumer::new(Arc::new(exporter));
        let err = consumer
            .consume(&ConsumeContext::background(), trace_batch(3))
            .await
            .unwrap_err();
        assert!(err.is_permanent());
    }

    #[tokio::test]
    async fn test_exporter_consumer_passes_successes() {
        let mut exporter = MockTestExporter::new();
        exporter.expect_name().return_const("e1".to_string());
        exporter
            .expect_export()
            .times(1)
            .returning(|_, batch| Ok(ExportResult::delivered(batch.item_count(), 0)));

        let consumer = ExporterConsumer::new(Arc::new(exporter));
        consumer
            .consume(&ConsumeContext::background(), trace_batch(2))
            .await
            .unwrap();
    }

    fn registry() -> FactoryRegistry {
        let mut registry = FactoryRegistry::new();
        registry
            .register_receiver(Arc::new(MockReceiverFactory::new()))
            .unwrap();
        registry
            .register_processor(Arc::new(MockProcessorFactory::new()))
            .unwrap();
        registry
            .register_processor(Arc::new(MemoryLimiterFactory::new()))
            .unwrap();
        registry
            .register_exporter(Arc::new(MockExporterFactory::new()))
            .unwrap();
        registry
    }

    #[tokio::test]
    async fn test_build_simple_pipeline() {
        let config = ServiceConfig::from_yaml(
            r#"
receivers:
  in:
    type: mock
exporters:
  out:
    type: mock
service:
  pipelines:
    traces:
      receivers: [in]
      exporters: [out]
"#,
        )
        .unwrap();
        let registry = registry();

        let assembly = PipelineGraphBuilder::new(&config, &registry)
            .build()
            .await
            .unwrap();

        assert_eq!(assembly.pipelines.len(), 1);
        assert_eq!(assembly.receivers.len(), 1);
        assert_eq!(assembly.exporters.len(), 1);
        assert!(!assembly.pipelines[0].mutates_data);
    }

    #[tokio::test]
    async fn test_mutating_processor_marks_pipeline() {
        let config = ServiceConfig::from_yaml(
            r#"
receivers:
  in:
    type: mock
processors:
  rename:
    type: mock
    mutates_data: true
    set_span_name: X
exporters:
  out:
    type: mock
service:
  pipelines:
    traces:
      receivers: [in]
      processors: [rename]
      exporters: [out]
"#,
        )
        .unwrap();
        let registry = registry();

        let assembly = PipelineGraphBuilder::new(&config, &registry)
            .build()
            .await
            .unwrap();

        assert!(assembly.pipelines[0].mutates_data);
        assert_eq!(assembly.pipelines[0].processors.len(), 1);
    }

    #[tokio::test]
    async fn test_unused_receiver_is_skipped() {
        let config = ServiceConfig::from_yaml(
            r#"
receivers:
  in:
    type: mock
  spare:
    type: mock
exporters:
  out:
    type: mock
service:
  pipelines:
    traces:
      receivers: [in]
      exporters: [out]
"#,
        )
        .unwrap();
        let registry = registry();

        let assembly = PipelineGraphBuilder::new(&config, &registry)
            .build()
            .await
            .unwrap();

        assert_eq!(assembly.receivers.len(), 1);
        assert_eq!(assembly.receivers[0].0.name, "in");
    }

    #[tokio::test]
    async fn test_unknown_exporter_type_fails() {
        let config = ServiceConfig::from_yaml(
            r#"
receivers:
  in:
    type: mock
exporters:
  out:
    type: unheard_of
service:
  pipelines:
    traces:
      receivers: [in]
      exporters: [out]
"#,
        )
        .unwrap();
        let registry = registry();

        let result = PipelineGraphBuilder::new(&config, &registry).build().await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_shared_receiver_across_data_types_is_one_instance() {
        let config = ServiceConfig::from_yaml(
            r#"
receivers:
  in:
    type: mock
exporters:
  out:
    type: mock
service:
  pipelines:
    traces:
      receivers: [in]
      exporters: [out]
    metrics:
      receivers: [in]
      exporters: [out]
"#,
        )
        .unwrap();
        let registry = registry();

        let assembly = PipelineGraphBuilder::new(&config, &registry)
            .build()
            .await
            .unwrap();

        // One receiver instance serving two data types, two exporter
        // instances (one per data type).
        assert_eq!(assembly.receivers.len(), 1);
        assert_eq!(assembly.exporters.len(), 2);
    }

    #[tokio::test]
    async fn test_misbehaving_receiver_factory_is_rejected() {
        let config = ServiceConfig::from_yaml(
            r#"
receivers:
  in:
    type: mock
exporters:
  out:
    type: mock
service:
  pipelines:
    traces:
      receivers: [in]
      exporters: [out]
    metrics:
      receivers: [in]
      exporters: [out]
"#,
        )
        .unwrap();

        let mut registry = FactoryRegistry::new();
        registry
            .register_receiver(Arc::new(MockReceiverFactory::misbehaving()))
            .unwrap();
        registry
            .register_exporter(Arc::new(MockExporterFactory::new()))
            .unwrap();

        let err = PipelineGraphBuilder::new(&config, &registry)
            .build()
            .await
            .unwrap_err();
        assert!(err.to_string().contains("same instance"));
    }
}
